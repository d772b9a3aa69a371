//! Negative-first turn model.

use crate::direction::{Direction, DirectionSet};
use crate::turn_model::TurnModel;
use noc_config::TieBreak;
use noc_model::GridLoc;

/// Negative-first routing: all travel in negative directions (West, South)
/// completes before any travel in positive directions (East, North). A turn
/// from a positive direction into a negative one is never taken.
#[derive(Debug, Clone, Copy)]
pub struct NegativeFirstRouting {
    tie_break: TieBreak,
}

impl NegativeFirstRouting {
    /// Creates the model.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl TurnModel for NegativeFirstRouting {
    fn name(&self) -> &'static str {
        "negative_first"
    }

    fn legal_directions(&self, _src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet {
        let toward = DirectionSet::toward(curr, dst);
        let negative: DirectionSet = toward.iter().filter(|d| d.is_negative()).collect();
        if negative.is_empty() {
            toward
        } else {
            negative
        }
    }

    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, _at: GridLoc) -> bool {
        !incoming.is_negative() && outgoing.is_negative()
    }

    fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(set: DirectionSet) -> Vec<Direction> {
        set.iter().collect()
    }

    #[test]
    fn negative_before_positive() {
        let model = NegativeFirstRouting::new(TieBreak::Priority);
        let o = GridLoc::new(0, 0);
        // south-east destination: South first, East afterwards
        assert_eq!(
            dirs(model.legal_directions(o, GridLoc::new(1, 3), GridLoc::new(3, 1))),
            vec![Direction::South]
        );
        assert_eq!(
            dirs(model.legal_directions(o, GridLoc::new(1, 1), GridLoc::new(3, 1))),
            vec![Direction::East]
        );
    }

    #[test]
    fn fully_negative_or_positive_is_adaptive() {
        let model = NegativeFirstRouting::new(TieBreak::Priority);
        let o = GridLoc::new(0, 0);
        assert_eq!(
            dirs(model.legal_directions(o, GridLoc::new(3, 3), GridLoc::new(0, 0))),
            vec![Direction::West, Direction::South]
        );
        assert_eq!(
            dirs(model.legal_directions(o, GridLoc::new(0, 0), GridLoc::new(3, 3))),
            vec![Direction::East, Direction::North]
        );
    }

    #[test]
    fn forbidden_turns() {
        let model = NegativeFirstRouting::new(TieBreak::Priority);
        let at = GridLoc::new(1, 1);
        assert!(model.forbids_turn(Direction::East, Direction::South, at));
        assert!(model.forbids_turn(Direction::North, Direction::West, at));
        assert!(!model.forbids_turn(Direction::West, Direction::North, at));
        assert!(!model.forbids_turn(Direction::South, Direction::East, at));
    }
}
