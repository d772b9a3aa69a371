//! Undo buffer for the one move the placer may have in flight.

use noc_model::{NocLinkId, NocRouterId, RouterBlockId, TrafficFlowId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One router block relocation within a placer move.
///
/// A swap is two of these with mirrored `from`/`to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovedRouterBlock {
    /// The block being moved.
    pub block: RouterBlockId,
    /// The physical router it occupied before the move.
    pub from: NocRouterId,
    /// The physical router it occupies after the move.
    pub to: NocRouterId,
}

/// Result of rerouting the flows touched by a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NocMoveDelta {
    /// Number of distinct flows that were rerouted.
    pub flows_rerouted: usize,
    /// Change in total aggregate-bandwidth cost if the move is committed.
    pub aggregate_bandwidth_delta: f64,
    /// Change in total latency cost if the move is committed.
    pub latency_delta: f64,
}

/// What must be restored if the pending move is rejected.
#[derive(Debug, Clone, Default)]
pub(crate) struct MoveTransaction {
    pub(crate) moves: Vec<MovedRouterBlock>,
    /// Routes replaced by the move, in the order they were replaced.
    pub(crate) old_routes: Vec<(TrafficFlowId, Vec<NocLinkId>)>,
    /// Usage of every link touched by the move, as it was before the first
    /// touch.
    pub(crate) old_usage: BTreeMap<NocLinkId, f64>,
}

impl MoveTransaction {
    pub(crate) fn new(moves: &[MovedRouterBlock]) -> Self {
        Self {
            moves: moves.to_vec(),
            ..Self::default()
        }
    }

    /// Records `usage` for `link` unless it was already recorded.
    pub(crate) fn save_usage(&mut self, link: NocLinkId, usage: f64) {
        self.old_usage.entry(link).or_insert(usage);
    }

    pub(crate) fn flows_rerouted(&self) -> usize {
        self.old_routes.len()
    }

    pub(crate) fn rerouted_flows(&self) -> impl Iterator<Item = TrafficFlowId> + '_ {
        self.old_routes.iter().map(|(flow, _)| *flow)
    }
}
