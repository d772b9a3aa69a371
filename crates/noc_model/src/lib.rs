//! NoC data layer.
//!
//! Holds the physical fabric ([`NocStorage`]), the traffic flows and their
//! routes ([`TrafficFlows`]), and the placement of logical router blocks on
//! physical routers ([`RouterBlocks`]). No routing or cost logic lives here.

#![warn(missing_docs)]

pub mod blocks;
pub mod error;
pub mod ids;
pub mod storage;
pub mod traffic;

pub use blocks::{RouterBlock, RouterBlocks};
pub use error::ModelError;
pub use ids::{NocLinkId, NocRouterId, RouterBlockId, TrafficFlowId};
pub use storage::{GridLoc, MeshParams, NocLink, NocRouter, NocStorage};
pub use traffic::{TrafficFlow, TrafficFlows};
