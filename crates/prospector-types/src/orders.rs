//! Unit orders: a primary directive followed by its backups.
//!
//! An [`Order`] is a short, tagged-variant list. The first [`Directive`] is
//! the primary intent; each following directive is the fallback executed
//! when the previous one cannot act this turn (its destination is already
//! claimed, the unit cannot afford the move, or no path was found).
//!
//! Chains are validated when built:
//!
//! - at most [`MAX_ORDER_DEPTH`] directives,
//! - [`Directive::ReturnHome`] and [`Directive::BuildDropoff`] are terminal
//!   and must be last,
//! - never empty.
//!
//! Because every constructor validates, an `Order` value in hand is always
//! finite and executing it always terminates.

use serde::{Deserialize, Serialize};

use crate::structs::Position;

/// Maximum number of directives in one order (primary plus backups).
pub const MAX_ORDER_DEPTH: usize = 4;

/// One step of intent for a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// Travel to `target` and mine it.
    Mine {
        /// The cell to mine.
        target: Position,
    },
    /// Travel to `target`.
    MoveTo {
        /// The destination.
        target: Position,
    },
    /// Stay on the current cell.
    Hold,
    /// Step in a random affordable, unclaimed direction.
    RandomStep,
    /// Head home disregarding collisions on the home cell.
    ReturnHome,
    /// Build a dropoff at `target`. Accepted but never executed.
    BuildDropoff {
        /// Where the dropoff would go.
        target: Position,
    },
}

impl Directive {
    /// Whether this directive must end its chain.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::ReturnHome | Self::BuildDropoff { .. })
    }

    /// The destination cell for positional directives.
    pub const fn target(&self) -> Option<Position> {
        match self {
            Self::Mine { target } | Self::MoveTo { target } | Self::BuildDropoff { target } => {
                Some(*target)
            }
            Self::Hold | Self::RandomStep | Self::ReturnHome => None,
        }
    }

    /// Short lowercase tag for logs.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Mine { .. } => "mine",
            Self::MoveTo { .. } => "move",
            Self::Hold => "hold",
            Self::RandomStep => "rand",
            Self::ReturnHome => "done",
            Self::BuildDropoff { .. } => "drop",
        }
    }
}

/// Errors raised when an order chain is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The chain holds no directive at all.
    #[error("order chain is empty")]
    Empty,

    /// The chain is longer than [`MAX_ORDER_DEPTH`].
    #[error("order chain depth {depth} exceeds maximum of {max}")]
    TooDeep {
        /// Attempted depth.
        depth: usize,
        /// Allowed depth.
        max: usize,
    },

    /// A terminal directive was followed by a backup.
    #[error("directive `{tag}` cannot carry a backup")]
    BackupAfterTerminal {
        /// Tag of the terminal directive.
        tag: &'static str,
    },
}

/// A validated chain of directives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Directive>", into = "Vec<Directive>")]
pub struct Order {
    chain: Vec<Directive>,
}

impl Order {
    /// An order consisting of a single directive with no backup.
    pub fn new(primary: Directive) -> Self {
        Self {
            chain: vec![primary],
        }
    }

    /// Append a backup directive.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::BackupAfterTerminal`] if the current last
    /// directive is terminal, or [`OrderError::TooDeep`] if the chain is full.
    pub fn then(mut self, backup: Directive) -> Result<Self, OrderError> {
        if let Some(last) = self.chain.last()
            && last.is_terminal()
        {
            return Err(OrderError::BackupAfterTerminal { tag: last.tag() });
        }
        if self.chain.len() >= MAX_ORDER_DEPTH {
            return Err(OrderError::TooDeep {
                depth: self.chain.len().saturating_add(1),
                max: MAX_ORDER_DEPTH,
            });
        }
        self.chain.push(backup);
        Ok(self)
    }

    /// Build an order from an explicit chain, primary first.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if the chain breaks any chain rule.
    pub fn from_chain(chain: Vec<Directive>) -> Result<Self, OrderError> {
        validate_chain(&chain)?;
        Ok(Self { chain })
    }

    /// Mine `target`, falling back to a random step and then a hold.
    pub fn mining(target: Position) -> Self {
        Self {
            chain: vec![
                Directive::Mine { target },
                Directive::RandomStep,
                Directive::Hold,
            ],
        }
    }

    /// Travel to the home base, falling back to a hold and then a random step.
    pub fn returning(home: Position) -> Self {
        Self {
            chain: vec![
                Directive::MoveTo { target: home },
                Directive::Hold,
                Directive::RandomStep,
            ],
        }
    }

    /// Stay put, stepping aside if the cell is already taken.
    pub fn holding() -> Self {
        Self {
            chain: vec![Directive::Hold, Directive::RandomStep],
        }
    }

    /// End-of-game recall toward the home base.
    pub fn recall() -> Self {
        Self::new(Directive::ReturnHome)
    }

    /// The primary directive.
    pub fn primary(&self) -> &Directive {
        // `chain` is never empty: every constructor guarantees one directive.
        self.chain.first().unwrap_or(&Directive::Hold)
    }

    /// The backups in execution order.
    pub fn backups(&self) -> &[Directive] {
        self.chain.get(1..).unwrap_or(&[])
    }

    /// All directives, primary first.
    pub fn directives(&self) -> &[Directive] {
        &self.chain
    }

    /// Number of directives in the chain.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}

impl TryFrom<Vec<Directive>> for Order {
    type Error = OrderError;

    fn try_from(chain: Vec<Directive>) -> Result<Self, Self::Error> {
        Self::from_chain(chain)
    }
}

impl From<Order> for Vec<Directive> {
    fn from(order: Order) -> Self {
        order.chain
    }
}

impl core::fmt::Display for Order {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for directive in &self.chain {
            if !first {
                write!(f, " -> ")?;
            }
            first = false;
            match directive.target() {
                Some(target) => write!(f, "{} {target}", directive.tag())?,
                None => write!(f, "{}", directive.tag())?,
            }
        }
        Ok(())
    }
}

/// Check a raw chain against the chain rules.
///
/// # Errors
///
/// Returns the first rule the chain breaks.
pub fn validate_chain(chain: &[Directive]) -> Result<(), OrderError> {
    if chain.is_empty() {
        return Err(OrderError::Empty);
    }
    if chain.len() > MAX_ORDER_DEPTH {
        return Err(OrderError::TooDeep {
            depth: chain.len(),
            max: MAX_ORDER_DEPTH,
        });
    }
    let body = chain.get(..chain.len().saturating_sub(1)).unwrap_or(&[]);
    if let Some(terminal) = body.iter().find(|d| d.is_terminal()) {
        return Err(OrderError::BackupAfterTerminal {
            tag: terminal.tag(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_chains_are_valid() {
        let target = Position::new(3, 4);
        for order in [
            Order::mining(target),
            Order::returning(target),
            Order::holding(),
            Order::recall(),
        ] {
            assert!(validate_chain(order.directives()).is_ok());
            assert!(order.depth() <= 3);
        }
    }

    #[test]
    fn then_appends_backups() {
        let order = Order::new(Directive::Hold).then(Directive::RandomStep);
        assert!(order.is_ok());
        let order = order.unwrap_or_else(|_| Order::holding());
        assert_eq!(order.primary(), &Directive::Hold);
        assert_eq!(order.backups(), &[Directive::RandomStep]);
    }

    #[test]
    fn chain_depth_is_capped() {
        let mut order = Ok(Order::new(Directive::Hold));
        for _ in 1..MAX_ORDER_DEPTH {
            order = order.and_then(|o| o.then(Directive::RandomStep));
        }
        assert!(order.is_ok());
        let overflow = order.and_then(|o| o.then(Directive::Hold));
        assert_eq!(
            overflow.err(),
            Some(OrderError::TooDeep {
                depth: MAX_ORDER_DEPTH + 1,
                max: MAX_ORDER_DEPTH
            })
        );
    }

    #[test]
    fn terminal_directives_reject_backups() {
        let err = Order::recall().then(Directive::Hold).err();
        assert_eq!(err, Some(OrderError::BackupAfterTerminal { tag: "done" }));

        let chain = vec![
            Directive::BuildDropoff {
                target: Position::new(0, 0),
            },
            Directive::Hold,
        ];
        assert!(Order::from_chain(chain).is_err());
    }

    #[test]
    fn terminal_directive_may_be_a_backup() {
        let chain = vec![Directive::Hold, Directive::ReturnHome];
        assert!(Order::from_chain(chain).is_ok());
    }

    #[test]
    fn empty_chain_rejected() {
        assert_eq!(Order::from_chain(Vec::new()).err(), Some(OrderError::Empty));
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Order, _> =
            serde_json::from_str(r#"[{"kind":"mine","target":{"x":1,"y":2}},{"kind":"hold"}]"#);
        assert!(ok.is_ok());

        let bad: Result<Order, _> =
            serde_json::from_str(r#"[{"kind":"return_home"},{"kind":"hold"}]"#);
        assert!(bad.is_err());

        let unknown: Result<Order, _> = serde_json::from_str(r#"[{"kind":"teleport"}]"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn display_lists_chain() {
        let order = Order::mining(Position::new(1, 2));
        assert_eq!(order.to_string(), "mine (1, 2) -> rand -> hold");
    }
}
