//! Type-safe identifier wrappers.
//!
//! Unit identifiers are assigned by the game engine, never by the core, so
//! the wrappers hold the engine's integer rather than generating their own
//! values. Keeping them as distinct types prevents mixing a unit id with a
//! plain counter at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an engine-assigned `u32` with
/// standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw engine identifier.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a unit (ship) in the controlled fleet.
    UnitId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_raw_value() {
        let id = UnitId::new(17);
        assert_eq!(id.to_string(), "17");
        assert_eq!(u32::from(id), 17);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&UnitId::new(5)).ok();
        assert_eq!(json.as_deref(), Some("5"));
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(UnitId::new(2) < UnitId::new(10));
    }
}
