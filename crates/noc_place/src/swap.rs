//! Router block swap proposals for the placer's move generator.

use crate::transaction::MovedRouterBlock;
use noc_model::{NocStorage, RouterBlockId, RouterBlocks};
use rand::Rng;

/// Returns `true` with probability `swap_percentage / 100`.
///
/// The placer calls this once per move to decide whether the move should be
/// a router block swap rather than one of its own.
pub fn check_for_router_swap(swap_percentage: u32, rng: &mut impl Rng) -> bool {
    swap_percentage > 0 && rng.gen_range(0..100) < swap_percentage
}

/// Proposes moving a random router block to a random physical router at
/// most `rlim` columns and rows away on the same layer.
///
/// If the target router holds another block the two are swapped. Returns
/// `None` when there is no block or no candidate router.
pub fn propose_router_swap(
    blocks: &RouterBlocks,
    noc: &NocStorage,
    rlim: u32,
    rng: &mut impl Rng,
) -> Option<Vec<MovedRouterBlock>> {
    if blocks.is_empty() {
        return None;
    }
    let block = RouterBlockId::from_raw(rng.gen_range(0..blocks.len()) as u32);
    let from = blocks.router_of(block);
    let here = noc.router(from).loc;

    let candidates: Vec<_> = noc
        .routers()
        .filter(|r| {
            r.id != from
                && r.loc.layer == here.layer
                && r.loc.x.abs_diff(here.x) <= rlim
                && r.loc.y.abs_diff(here.y) <= rlim
        })
        .map(|r| r.id)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let to = candidates[rng.gen_range(0..candidates.len())];

    let mut moves = vec![MovedRouterBlock { block, from, to }];
    if let Some(other) = blocks.occupant(to) {
        moves.push(MovedRouterBlock {
            block: other,
            from: to,
            to: from,
        });
    }
    Some(moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noc_common::Interner;
    use noc_model::{MeshParams, NocRouterId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn placed(cols: u32, rows: u32, occupied: &[u32]) -> (NocStorage, RouterBlocks) {
        let noc = NocStorage::mesh(cols, rows, MeshParams::default());
        let interner = Interner::new();
        let mut blocks = RouterBlocks::new(noc.router_count());
        for &i in occupied {
            blocks
                .add_block(interner.get_or_intern(&format!("rb{i}")), NocRouterId::from_raw(i))
                .unwrap();
        }
        (noc, blocks)
    }

    #[test]
    fn swap_percentage_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| !check_for_router_swap(0, &mut rng)));
        assert!((0..1000).all(|_| check_for_router_swap(100, &mut rng)));
        let hits = (0..10_000).filter(|_| check_for_router_swap(30, &mut rng)).count();
        assert!((2_500..3_500).contains(&hits), "{hits}");
    }

    #[test]
    fn proposals_stay_within_range() {
        let (noc, blocks) = placed(6, 6, &[0, 7, 14, 21, 35]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let moves = propose_router_swap(&blocks, &noc, 1, &mut rng).unwrap();
            let first = moves[0];
            let (a, b) = (noc.router(first.from).loc, noc.router(first.to).loc);
            assert!(a.x.abs_diff(b.x) <= 1 && a.y.abs_diff(b.y) <= 1);
            assert_ne!(first.from, first.to);
            assert_eq!(blocks.router_of(first.block), first.from);
        }
    }

    #[test]
    fn occupied_target_becomes_swap() {
        // two blocks side by side on a 2x1 mesh: every proposal is a swap
        let (noc, blocks) = placed(2, 1, &[0, 1]);
        let mut rng = StdRng::seed_from_u64(7);
        let moves = propose_router_swap(&blocks, &noc, 1, &mut rng).unwrap();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].from, moves[1].to);
        assert_eq!(moves[0].to, moves[1].from);
    }

    #[test]
    fn no_candidates() {
        let (noc, blocks) = placed(1, 1, &[0]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(propose_router_swap(&blocks, &noc, 3, &mut rng).is_none());
        let (noc, blocks) = placed(2, 2, &[]);
        assert!(propose_router_swap(&blocks, &noc, 3, &mut rng).is_none());
    }
}
