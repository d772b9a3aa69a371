//! Hop-by-hop turn-model routing.
//!
//! At each router the engine intersects three sets: the directions that
//! bring the packet closer to the destination, the directions the turn model
//! allows, and the directions in which the router actually has an outgoing
//! link. The turn model then picks one direction from what is left and the
//! engine follows the nearest link in that direction.

use crate::direction::{Direction, DirectionSet};
use crate::error::RoutingError;
use crate::turn_model::TurnModel;
use noc_model::{GridLoc, NocLinkId, NocRouterId, NocStorage, TrafficFlowId};

/// Computes the route of `flow` from `src` to `dst`.
///
/// The result is contiguous: its first link leaves `src`, each link enters
/// the router the next one leaves, and the last link enters `dst`. Routing
/// the same flow between the same routers on the same NoC always yields the
/// same route. `src == dst` gives an empty route.
pub fn route(
    noc: &NocStorage,
    model: &dyn TurnModel,
    src: NocRouterId,
    dst: NocRouterId,
    flow: TrafficFlowId,
) -> Result<Vec<NocLinkId>, RoutingError> {
    let src_loc = noc
        .try_router(src)
        .ok_or(RoutingError::InvalidRouter(src))?
        .loc;
    let dst_loc = noc
        .try_router(dst)
        .ok_or(RoutingError::InvalidRouter(dst))?
        .loc;

    let unroutable = |stuck_at| RoutingError::Unroutable {
        flow,
        src,
        dst,
        stuck_at,
    };
    if src != dst && src_loc.layer != dst_loc.layer {
        return Err(unroutable(src));
    }

    let limit = noc.router_count();
    let mut route = Vec::new();
    let mut curr = src;
    let mut incoming: Option<Direction> = None;

    while curr != dst {
        if route.len() >= limit {
            return Err(RoutingError::HopLimitExceeded {
                flow,
                src,
                dst,
                limit,
            });
        }
        let curr_loc = noc.router(curr).loc;

        let mut next_link: [Option<NocLinkId>; 4] = [None; 4];
        let mut legal = DirectionSet::toward(curr_loc, dst_loc)
            & model.legal_directions(src_loc, curr_loc, dst_loc);
        for dir in legal.iter() {
            match nearest_link(noc, curr, curr_loc, dst_loc, dir) {
                Some(link) => next_link[slot(dir)] = Some(link),
                None => legal.remove(dir),
            }
        }

        let dir = model
            .select_next_direction(legal, src, dst, curr, flow)
            .ok_or_else(|| unroutable(curr))?;
        debug_assert!(legal.contains(dir), "{} picked illegal {dir}", model.name());
        if let Some(prev) = incoming {
            debug_assert!(
                !model.forbids_turn(prev, dir, curr_loc),
                "{} took forbidden turn {prev} -> {dir} at router {curr}",
                model.name()
            );
        }

        let link = next_link[slot(dir)].ok_or_else(|| unroutable(curr))?;
        route.push(link);
        curr = noc.link(link).dst;
        incoming = Some(dir);
    }

    Ok(route)
}

fn slot(dir: Direction) -> usize {
    match dir {
        Direction::West => 0,
        Direction::South => 1,
        Direction::East => 2,
        Direction::North => 3,
    }
}

/// Returns the outgoing link of `curr` that moves strictly in `dir` by the
/// smallest distance without passing the destination's coordinate on that
/// axis. Ties go to the link created first.
fn nearest_link(
    noc: &NocStorage,
    curr: NocRouterId,
    curr_loc: GridLoc,
    dst_loc: GridLoc,
    dir: Direction,
) -> Option<NocLinkId> {
    noc.outgoing_links(curr)
        .iter()
        .copied()
        .filter_map(|link| {
            let to = noc.router(noc.link(link).dst).loc;
            if !dir.points_from(curr_loc, to) {
                return None;
            }
            let overshoots = match dir {
                Direction::West => to.x < dst_loc.x,
                Direction::East => to.x > dst_loc.x,
                Direction::South => to.y < dst_loc.y,
                Direction::North => to.y > dst_loc.y,
            };
            (!overshoots).then(|| (curr_loc.manhattan(to), link))
        })
        .min_by_key(|&(distance, link)| (distance, link))
        .map(|(_, link)| link)
}
