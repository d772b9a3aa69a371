//! Compass directions on the mesh and an allocation-free set of them.

use noc_model::GridLoc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// A direction of travel in the x/y plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Decreasing x.
    West,
    /// Decreasing y.
    South,
    /// Increasing x.
    East,
    /// Increasing y.
    North,
}

impl Direction {
    /// Fixed priority order used for iteration and priority tie-breaks.
    pub const PRIORITY: [Direction; 4] = [
        Direction::West,
        Direction::South,
        Direction::East,
        Direction::North,
    ];

    fn bit(self) -> u8 {
        match self {
            Direction::West => 0b0001,
            Direction::South => 0b0010,
            Direction::East => 0b0100,
            Direction::North => 0b1000,
        }
    }

    /// Returns `true` for West and South.
    pub fn is_negative(self) -> bool {
        matches!(self, Direction::West | Direction::South)
    }

    /// Returns `true` for West and East.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::West | Direction::East)
    }

    /// Returns the reverse direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    /// Returns `true` if `to` lies strictly in this direction from `from`,
    /// on the same row or column and the same layer.
    pub fn points_from(self, from: GridLoc, to: GridLoc) -> bool {
        if from.layer != to.layer {
            return false;
        }
        match self {
            Direction::West => to.y == from.y && to.x < from.x,
            Direction::East => to.y == from.y && to.x > from.x,
            Direction::South => to.x == from.x && to.y < from.y,
            Direction::North => to.x == from.x && to.y > from.y,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::West => "west",
            Direction::South => "south",
            Direction::East => "east",
            Direction::North => "north",
        })
    }
}

/// A set of [`Direction`]s stored as a 4-bit mask.
///
/// Iteration always follows [`Direction::PRIORITY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);
    /// All four directions.
    pub const ALL: Self = Self(0b1111);

    /// Returns the directions that reduce the Manhattan distance from `curr`
    /// to `dst`.
    pub fn toward(curr: GridLoc, dst: GridLoc) -> Self {
        let mut set = Self::EMPTY;
        if dst.x < curr.x {
            set.insert(Direction::West);
        } else if dst.x > curr.x {
            set.insert(Direction::East);
        }
        if dst.y < curr.y {
            set.insert(Direction::South);
        } else if dst.y > curr.y {
            set.insert(Direction::North);
        }
        set
    }

    /// Adds a direction.
    pub fn insert(&mut self, dir: Direction) {
        self.0 |= dir.bit();
    }

    /// Removes a direction.
    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !dir.bit();
    }

    /// Returns a copy of this set with `dir` added.
    pub fn with(mut self, dir: Direction) -> Self {
        self.insert(dir);
        self
    }

    /// Returns `true` if `dir` is in the set.
    pub fn contains(self, dir: Direction) -> bool {
        self.0 & dir.bit() != 0
    }

    /// Returns `true` if the set holds no direction.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of directions in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates in priority order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::PRIORITY.into_iter().filter(move |d| self.contains(*d))
    }

    /// Returns the highest-priority direction in the set.
    pub fn first(self) -> Option<Direction> {
        self.iter().next()
    }

    /// Returns the `n`th direction in priority order.
    pub fn nth(self, n: usize) -> Option<Direction> {
        self.iter().nth(n)
    }
}

impl BitAnd for DirectionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for DirectionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<T: IntoIterator<Item = Direction>>(iter: T) -> Self {
        let mut set = Self::EMPTY;
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, dir) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dir}")?;
        }
        f.write_str("}")
    }
}
