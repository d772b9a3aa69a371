//! The error type surfaced to the placement loop.

use noc_common::InternalError;
use noc_model::ModelError;
use noc_routing::{CdgError, RoutingError};

/// Which running cost total a drift report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostTerm {
    /// Total aggregate-bandwidth cost.
    AggregateBandwidth,
    /// Total latency cost.
    Latency,
}

impl std::fmt::Display for CostTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CostTerm::AggregateBandwidth => "aggregate bandwidth",
            CostTerm::Latency => "latency",
        })
    }
}

/// Errors from NoC route and cost management.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NocError {
    /// A traffic flow could not be routed.
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The channel dependency graph could not be built from the routes.
    #[error(transparent)]
    Cdg(#[from] CdgError),

    /// The NoC model handed to the manager is malformed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A bookkeeping invariant was broken.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// An incrementally maintained cost total disagrees with a full
    /// recomputation.
    #[error(
        "{term} cost drifted: incremental total {incremental} vs recomputed {recomputed}"
    )]
    CostDrift {
        /// The drifting total.
        term: CostTerm,
        /// The running total.
        incremental: f64,
        /// The total recomputed from the current routes.
        recomputed: f64,
    },

    /// A move or query does not match the current NoC state.
    #[error("inconsistent NoC state: {0}")]
    Inconsistent(String),
}
