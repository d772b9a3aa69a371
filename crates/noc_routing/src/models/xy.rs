//! XY dimension-order routing.

use crate::direction::{Direction, DirectionSet};
use crate::turn_model::TurnModel;
use noc_config::TieBreak;
use noc_model::GridLoc;

/// Dimension-order routing: travel along x until the destination column is
/// reached, then along y. Only one direction is ever legal.
#[derive(Debug, Clone, Copy)]
pub struct XyRouting {
    tie_break: TieBreak,
}

impl XyRouting {
    /// Creates the model.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

impl TurnModel for XyRouting {
    fn name(&self) -> &'static str {
        "xy"
    }

    fn legal_directions(&self, _src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet {
        let toward = DirectionSet::toward(curr, dst);
        let horizontal: DirectionSet = toward.iter().filter(|d| d.is_horizontal()).collect();
        if horizontal.is_empty() {
            toward
        } else {
            horizontal
        }
    }

    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, _at: GridLoc) -> bool {
        !incoming.is_horizontal() && outgoing.is_horizontal()
    }

    fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_before_y() {
        let model = XyRouting::new(TieBreak::Priority);
        let legal = model.legal_directions(GridLoc::new(0, 0), GridLoc::new(0, 0), GridLoc::new(2, 3));
        assert_eq!(legal.iter().collect::<Vec<_>>(), vec![Direction::East]);
        let legal = model.legal_directions(GridLoc::new(0, 0), GridLoc::new(2, 0), GridLoc::new(2, 3));
        assert_eq!(legal.iter().collect::<Vec<_>>(), vec![Direction::North]);
    }

    #[test]
    fn no_turn_back_to_x() {
        let model = XyRouting::new(TieBreak::Priority);
        let at = GridLoc::new(1, 1);
        assert!(model.forbids_turn(Direction::North, Direction::East, at));
        assert!(model.forbids_turn(Direction::South, Direction::West, at));
        assert!(!model.forbids_turn(Direction::East, Direction::South, at));
    }
}
