//! Errors raised by the routing engine and the channel dependency graph.

use noc_model::{NocLinkId, NocRouterId, TrafficFlowId};

/// A traffic flow could not be routed.
///
/// Routing is a pure function of the topology and the turn model, so none of
/// these is transient: the placement run cannot continue with this topology.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// No legal direction with an available link remained before reaching
    /// the destination.
    #[error(
        "traffic flow {flow} is unroutable from router {src} to router {dst}: \
         no legal direction at router {stuck_at}"
    )]
    Unroutable {
        /// The flow being routed.
        flow: TrafficFlowId,
        /// Source router.
        src: NocRouterId,
        /// Destination router.
        dst: NocRouterId,
        /// Router at which routing stalled.
        stuck_at: NocRouterId,
    },

    /// The route grew longer than the number of routers in the NoC.
    #[error(
        "traffic flow {flow} exceeded {limit} hops routing from router {src} to router {dst}"
    )]
    HopLimitExceeded {
        /// The flow being routed.
        flow: TrafficFlowId,
        /// Source router.
        src: NocRouterId,
        /// Destination router.
        dst: NocRouterId,
        /// The hop limit.
        limit: usize,
    },

    /// An endpoint does not name a router of this NoC.
    #[error("router {0} is not part of the NoC")]
    InvalidRouter(NocRouterId),
}

/// A channel dependency graph could not be built from the given routes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CdgError {
    /// A route references a link outside the graph.
    #[error("route references link {link} but the NoC has {link_count} links")]
    LinkOutOfRange {
        /// The offending link.
        link: NocLinkId,
        /// Number of links the graph was built for.
        link_count: usize,
    },

    /// A route uses the same link twice in a row.
    #[error("route uses link {0} twice in a row")]
    SelfDependency(NocLinkId),
}
