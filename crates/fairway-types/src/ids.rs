//! Type-safe identifier wrappers around `u32` indices.
//!
//! Players and pairings are identified by small dense indices rather than
//! random identifiers so that two runs with the same seed produce the same
//! identifiers, the same ordering, and byte-identical save files.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from its raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the raw index.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// Return the raw index as a `usize`, for slot and table lookups.
            pub fn index(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
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
    /// Identifier of a player on the roster, assigned in roster order.
    PlayerId
}

define_id! {
    /// Identifier of a pairing within a round; equal to its build order.
    PairingId
}
