//! Deadlock-free routing of NoC traffic flows.
//!
//! A [`TurnModel`] restricts which turns a route may take; [`route`] walks
//! a flow from its source router to its destination one hop at a time under
//! those restrictions. The [`ChannelDependencyGraph`] built from the
//! resulting routes proves (or refutes) that the configuration cannot
//! deadlock.

#![warn(missing_docs)]

pub mod cdg;
pub mod direction;
pub mod engine;
pub mod error;
mod models;
pub mod turn_model;

pub use cdg::{routes_have_cycles, ChannelDependencyGraph};
pub use direction::{Direction, DirectionSet};
pub use engine::route;
pub use error::{CdgError, RoutingError};
pub use models::{
    create_turn_model, NegativeFirstRouting, NorthLastRouting, OddEvenRouting, WestFirstRouting,
    XyRouting,
};
pub use turn_model::{select_by_tie_break, TurnModel};
