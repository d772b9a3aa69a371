//! Odd-even turn model.

use crate::direction::{Direction, DirectionSet};
use crate::turn_model::TurnModel;
use noc_config::TieBreak;
use noc_model::GridLoc;

/// Chiu's odd-even turn model.
///
/// East-to-North and East-to-South turns are forbidden in even columns;
/// North-to-West and South-to-West turns are forbidden in odd columns.
#[derive(Debug, Clone, Copy)]
pub struct OddEvenRouting {
    tie_break: TieBreak,
}

impl OddEvenRouting {
    /// Creates the model.
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }
}

fn is_odd_column(x: i32) -> bool {
    x.rem_euclid(2) == 1
}

impl TurnModel for OddEvenRouting {
    fn name(&self) -> &'static str {
        "odd_even"
    }

    fn legal_directions(&self, src: GridLoc, curr: GridLoc, dst: GridLoc) -> DirectionSet {
        let dx = dst.x - curr.x;
        let dy = dst.y - curr.y;
        let vertical = match dy.signum() {
            1 => Some(Direction::North),
            -1 => Some(Direction::South),
            _ => None,
        };

        let mut legal = DirectionSet::EMPTY;
        if dx == 0 {
            if let Some(v) = vertical {
                legal.insert(v);
            }
        } else if dx > 0 {
            match vertical {
                None => legal.insert(Direction::East),
                Some(v) => {
                    if is_odd_column(curr.x) || curr.x == src.x {
                        legal.insert(v);
                    }
                    // an eastbound packet may not arrive at an even
                    // destination column still needing a vertical turn
                    if is_odd_column(dst.x) || dx != 1 {
                        legal.insert(Direction::East);
                    }
                }
            }
        } else {
            legal.insert(Direction::West);
            if let Some(v) = vertical {
                if !is_odd_column(curr.x) {
                    legal.insert(v);
                }
            }
        }
        legal
    }

    fn forbids_turn(&self, incoming: Direction, outgoing: Direction, at: GridLoc) -> bool {
        let vertical = |d: Direction| !d.is_horizontal();
        if is_odd_column(at.x) {
            vertical(incoming) && outgoing == Direction::West
        } else {
            incoming == Direction::East && vertical(outgoing)
        }
    }

    fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
