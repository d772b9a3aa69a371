//! Incremental NoC route and cost management for placement.
//!
//! The placer hands [`NocRouteManager`] one move at a time. The manager
//! reroutes only the traffic flows the move touches, reports the change in
//! aggregate-bandwidth and latency cost, and either commits or undoes the
//! move on request. Full cost recomputation and channel dependency graph
//! checks are available for periodic verification.

#![warn(missing_docs)]

pub mod cost;
pub mod error;
pub mod manager;
pub mod place_file;
pub mod swap;
pub mod transaction;

pub use cost::{
    NocCostModel, NocCostTerms, MAX_INV_NOC_AGGREGATE_BANDWIDTH_COST, MAX_INV_NOC_LATENCY_COST,
    MIN_EXPECTED_NOC_LATENCY_COST,
};
pub use error::{CostTerm, NocError};
pub use manager::{update_link_usage, LinkUsageUpdate, NocRouteManager};
pub use place_file::{write_noc_placement, write_noc_placement_file};
pub use swap::{check_for_router_swap, propose_router_swap};
pub use transaction::{MovedRouterBlock, NocMoveDelta};
