//! The turn-model abstraction shared by every routing variant.

use crate::direction::{Direction, DirectionSet};
use noc_common::stable_id_hash;
use noc_config::TieBreak;
use noc_model::{GridLoc, NocRouterId, TrafficFlowId};

/// A turn-restriction routing variant.
///
/// A turn model forbids enough of the eight 90-degree turns to break every
/// cycle of channel dependencies on a mesh. The routing engine asks it, hop
/// by hop, which directions are legal and then lets it choose one.
pub trait TurnModel: Send + Sync {
    /// The configuration name of the variant.
    fn name(&self) -> &'static str;

    /// Returns the directions a packet at `curr` may take toward `dst`.
    ///
    /// The result is a subset of the Manhattan-reducing directions and never
    /// contains a direction whose use at `curr` would require a forbidden
    /// turn on some minimal continuation of the route. `src` matters only
    /// to variants (odd-even) whose rules differ at the source router.
    fn legal_directions(&self, src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet;

    /// Returns `true` if arriving at `at` travelling `incoming` and leaving
    /// travelling `outgoing` is a forbidden turn.
    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, at: GridLoc) -> bool;

    /// The tie-break this instance was configured with.
    fn tie_break(&self) -> TieBreak;

    /// Picks one direction out of `legal`. Returns `None` only when `legal`
    /// is empty.
    fn select_next_direction(
        &self,
        legal: DirectionSet,
        src: NocRouterId,
        dst: NocRouterId,
        curr: NocRouterId,
        flow: TrafficFlowId,
    ) -> Option<Direction> {
        select_by_tie_break(self.tie_break(), legal, src, dst, curr, flow)
    }
}

/// Picks one direction out of `legal` according to `tie_break`.
///
/// [`TieBreak::Priority`] takes the first legal direction in
/// [`Direction::PRIORITY`]. [`TieBreak::Hashed`] hashes the flow and the
/// three router IDs so that different flows spread over the available
/// minimal paths while the same inputs always give the same answer.
pub fn select_by_tie_break(
    tie_break: TieBreak,
    legal: DirectionSet,
    src: NocRouterId,
    dst: NocRouterId,
    curr: NocRouterId,
    flow: TrafficFlowId,
) -> Option<Direction> {
    match legal.len() {
        0 => None,
        1 => legal.first(),
        n => match tie_break {
            TieBreak::Priority => legal.first(),
            TieBreak::Hashed => {
                let hash = stable_id_hash(&[
                    flow.as_raw(),
                    src.as_raw(),
                    dst.as_raw(),
                    curr.as_raw(),
                ]);
                legal.nth((hash % n as u64) as usize)
            }
        },
    }
}
