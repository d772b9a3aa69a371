//! Shared foundational types for the NoC routing and placement crates.
//!
//! Provides dense ID-indexed storage, the internal error type used for
//! invariant violations, interned names for router blocks and traffic flows,
//! and a stable hash over entity IDs.

#![warn(missing_docs)]

pub mod arena;
pub mod hash;
pub mod ident;
pub mod result;

pub use arena::{Arena, ArenaId};
pub use hash::stable_id_hash;
pub use ident::{Ident, Interner};
pub use result::{InternalError, NocResult};
