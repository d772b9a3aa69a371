//! North-last turn model.

use crate::direction::{Direction, DirectionSet};
use crate::turn_model::TurnModel;
use noc_config::TieBreak;
use noc_model::GridLoc;

/// North-last routing: northward travel happens only once the destination
/// column is reached, so no turn ever leads out of North.
#[derive(Debug, Clone, Copy)]
pub struct NorthLastRouting {
    tie_break: TieBreak,
}

impl NorthLastRouting {
    /// Creates the model.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl TurnModel for NorthLastRouting {
    fn name(&self) -> &'static str {
        "north_last"
    }

    fn legal_directions(&self, _src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet {
        let mut toward = DirectionSet::toward(curr, dst);
        if toward.len() > 1 {
            toward.remove(Direction::North);
        }
        toward
    }

    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, _at: GridLoc) -> bool {
        incoming == Direction::North && outgoing != Direction::North
    }

    fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
