//! Toroidal grid snapshot: cell resources, distances, adjacency.
//!
//! The [`GameGrid`] is the spatial backbone of a turn. It stores the
//! resource level of every cell in row-major order and answers the pure
//! geometric queries the rest of the core relies on. Coordinates wrap at
//! every edge, so every query normalises its input first.

use prospector_types::{Cell, Direction, Position};

use crate::error::WorldError;

/// Per-turn snapshot of the toroidal grid.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "GridParts")]
pub struct GameGrid {
    /// Width in cells.
    width: u32,
    /// Height in cells.
    height: u32,
    /// Resource per cell, row-major (`y * width + x`).
    resources: Vec<u32>,
}

/// Wire shape of a grid, checked by [`GameGrid::new`] on the way in.
#[derive(serde::Deserialize)]
struct GridParts {
    width: u32,
    height: u32,
    resources: Vec<u32>,
}

impl TryFrom<GridParts> for GameGrid {
    type Error = WorldError;

    fn try_from(parts: GridParts) -> Result<Self, Self::Error> {
        Self::new(parts.width, parts.height, parts.resources)
    }
}

impl GameGrid {
    /// Build a grid from row-major resource levels.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either side is zero or
    /// too large to address, or [`WorldError::CellCountMismatch`] if
    /// `resources` does not hold exactly `width * height` values.
    pub fn new(width: u32, height: u32, resources: Vec<u32>) -> Result<Self, WorldError> {
        if width == 0
            || height == 0
            || i32::try_from(width).is_err()
            || i32::try_from(height).is_err()
        {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        let expected = usize::try_from(width)
            .ok()
            .and_then(|w| usize::try_from(height).ok().and_then(|h| w.checked_mul(h)))
            .ok_or(WorldError::InvalidDimensions { width, height })?;
        if resources.len() != expected {
            return Err(WorldError::CellCountMismatch {
                expected,
                actual: resources.len(),
            });
        }
        Ok(Self {
            width,
            height,
            resources,
        })
    }

    /// A grid where every cell holds `level`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] for unusable dimensions.
    pub fn uniform(width: u32, height: u32, level: u32) -> Result<Self, WorldError> {
        let count = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .map_err(|_overflow| WorldError::InvalidDimensions { width, height })?;
        Self::new(width, height, vec![level; count])
    }

    /// Grid width in cells.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    pub fn cell_count(&self) -> usize {
        self.resources.len()
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// Wrap a position into grid bounds.
    pub fn normalize(&self, pos: Position) -> Position {
        Position {
            x: wrap(pos.x, self.width),
            y: wrap(pos.y, self.height),
        }
    }

    /// The normalised neighbour of `pos` in `direction`.
    pub fn offset(&self, pos: Position, direction: Direction) -> Position {
        self.normalize(pos.directional_offset(direction))
    }

    /// The four cardinal neighbours of `pos`, in [`Direction::ALL`] order.
    pub fn neighbors(&self, pos: Position) -> [Position; 4] {
        Direction::ALL.map(|direction| self.offset(pos, direction))
    }

    /// Toroidal Manhattan distance between two positions.
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        let a = self.normalize(a);
        let b = self.normalize(b);
        axis_distance(a.x, b.x, self.width).saturating_add(axis_distance(a.y, b.y, self.height))
    }

    /// Directions that bring `from` closer to `to`, x axis first.
    ///
    /// Each axis contributes at most one direction: the shorter way around
    /// the torus, preferring the positive direction when both ways are
    /// equally long. Returns an empty list when the positions coincide.
    pub fn approach_directions(&self, from: Position, to: Position) -> Vec<Direction> {
        let from = self.normalize(from);
        let to = self.normalize(to);
        let mut moves = Vec::with_capacity(2);
        if let Some(direction) =
            axis_direction(from.x, to.x, self.width, Direction::East, Direction::West)
        {
            moves.push(direction);
        }
        if let Some(direction) =
            axis_direction(from.y, to.y, self.height, Direction::South, Direction::North)
        {
            moves.push(direction);
        }
        moves
    }

    /// Iterate all positions in x-major order (`x` outer, `y` inner).
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = i32::try_from(self.width).unwrap_or(0);
        let height = i32::try_from(self.height).unwrap_or(0);
        (0..width).flat_map(move |x| (0..height).map(move |y| Position::new(x, y)))
    }

    // -------------------------------------------------------------------
    // Resources
    // -------------------------------------------------------------------

    /// Resource currently on the cell at `pos`.
    pub fn resource_at(&self, pos: Position) -> u32 {
        self.index_of(pos)
            .and_then(|i| self.resources.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Immutable view of the cell at `pos`.
    pub fn cell(&self, pos: Position) -> Cell {
        let position = self.normalize(pos);
        Cell {
            position,
            resource_level: self.resource_at(position),
        }
    }

    /// Total resource on the grid.
    pub fn total_resource(&self) -> u64 {
        self.resources.iter().map(|&r| u64::from(r)).sum()
    }

    /// Overwrite the resource on a cell.
    pub fn set_resource(&mut self, pos: Position, level: u32) {
        if let Some(slot) = self.index_of(pos).and_then(|i| self.resources.get_mut(i)) {
            *slot = level;
        }
    }

    /// Add resource to a cell (saturating).
    pub fn add_resource(&mut self, pos: Position, amount: u32) {
        if let Some(slot) = self.index_of(pos).and_then(|i| self.resources.get_mut(i)) {
            *slot = slot.saturating_add(amount);
        }
    }

    /// Remove up to `amount` from a cell and return what was removed.
    pub fn take_resource(&mut self, pos: Position, amount: u32) -> u32 {
        let Some(slot) = self.index_of(pos).and_then(|i| self.resources.get_mut(i)) else {
            return 0;
        };
        let taken = amount.min(*slot);
        *slot = slot.saturating_sub(taken);
        taken
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        let pos = self.normalize(pos);
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }
}

/// Euclidean remainder of `value` by `size`.
fn wrap(value: i32, size: u32) -> i32 {
    let Ok(size) = i32::try_from(size) else {
        return value;
    };
    value.checked_rem_euclid(size).unwrap_or(0)
}

/// Shortest wrapped distance along one axis of length `size`.
fn axis_distance(a: i32, b: i32, size: u32) -> u32 {
    let direct = a.abs_diff(b);
    direct.min(size.saturating_sub(direct))
}

/// The direction along one axis that reduces wrapped distance.
fn axis_direction(
    from: i32,
    to: i32,
    size: u32,
    positive: Direction,
    negative: Direction,
) -> Option<Direction> {
    if from == to {
        return None;
    }
    let direct = from.abs_diff(to);
    let wrapped = size.saturating_sub(direct);
    let forward = to > from;
    // Going the direct way when it is no longer than the wrap-around way.
    let toward_positive = if direct <= wrapped { forward } else { !forward };
    Some(if toward_positive { positive } else { negative })
}
