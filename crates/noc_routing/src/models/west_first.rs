//! West-first turn model.

use crate::direction::{Direction, DirectionSet};
use crate::turn_model::TurnModel;
use noc_config::TieBreak;
use noc_model::GridLoc;

/// West-first routing: all westward travel happens before anything else, so
/// no turn ever leads into West.
#[derive(Debug, Clone, Copy)]
pub struct WestFirstRouting {
    tie_break: TieBreak,
}

impl WestFirstRouting {
    /// Creates the model.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl TurnModel for WestFirstRouting {
    fn name(&self) -> &'static str {
        "west_first"
    }

    fn legal_directions(&self, _src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet {
        let toward = DirectionSet::toward(curr, dst);
        if toward.contains(Direction::West) {
            DirectionSet::EMPTY.with(Direction::West)
        } else {
            toward
        }
    }

    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, _at: GridLoc) -> bool {
        outgoing == Direction::West && incoming != Direction::West
    }

    fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
