//! Opaque ID newtypes for NoC entities.
//!
//! [`NocRouterId`], [`NocLinkId`], [`TrafficFlowId`] and [`RouterBlockId`]
//! are thin `u32` wrappers used as [`Arena`](noc_common::Arena) indices.
//! Each reserves `u32::MAX` as an `INVALID` sentinel that never indexes an
//! entity.

use noc_common::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// The sentinel value, distinct from every valid index.
            pub const INVALID: Self = Self(u32::MAX);

            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns `true` unless this is the `INVALID` sentinel.
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    f.write_str("<invalid>")
                }
            }
        }
    };
}

define_id!(
    /// ID of a physical NoC router.
    NocRouterId
);

define_id!(
    /// ID of a unidirectional NoC link.
    NocLinkId
);

define_id!(
    /// ID of a traffic flow.
    TrafficFlowId
);

define_id!(
    /// ID of a logical router block (the unit the placer moves).
    RouterBlockId
);
