//! Grid geometry: coordinates, neighbour directions and distance metrics.
//!
//! The y axis grows downward, so `Direction::UP` is `(0, -1)`. Neighbour
//! enumeration order is fixed (clockwise from up) and both propagation
//! algorithms depend on it for deterministic output.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::SenseError;

/// Integer grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Position one step away in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        Coord::new(self.x + dir.dx, self.y + dir.dy)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A unit step on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const UP: Direction = Direction { dx: 0, dy: -1 };
    pub const UP_RIGHT: Direction = Direction { dx: 1, dy: -1 };
    pub const RIGHT: Direction = Direction { dx: 1, dy: 0 };
    pub const DOWN_RIGHT: Direction = Direction { dx: 1, dy: 1 };
    pub const DOWN: Direction = Direction { dx: 0, dy: 1 };
    pub const DOWN_LEFT: Direction = Direction { dx: -1, dy: 1 };
    pub const LEFT: Direction = Direction { dx: -1, dy: 0 };
    pub const UP_LEFT: Direction = Direction { dx: -1, dy: -1 };
}

const CARDINALS: [Direction; 4] = [
    Direction::UP,
    Direction::RIGHT,
    Direction::DOWN,
    Direction::LEFT,
];

const DIAGONALS: [Direction; 4] = [
    Direction::UP_RIGHT,
    Direction::DOWN_RIGHT,
    Direction::DOWN_LEFT,
    Direction::UP_LEFT,
];

/// Clockwise from up.
const EIGHT_WAY: [Direction; 8] = [
    Direction::UP,
    Direction::UP_RIGHT,
    Direction::RIGHT,
    Direction::DOWN_RIGHT,
    Direction::DOWN,
    Direction::DOWN_LEFT,
    Direction::LEFT,
    Direction::UP_LEFT,
];

/// Which cells count as neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdjacencyRule {
    Cardinals,
    Diagonals,
    EightWay,
}

impl AdjacencyRule {
    /// Neighbour offsets in their fixed enumeration order.
    pub fn directions(self) -> &'static [Direction] {
        match self {
            AdjacencyRule::Cardinals => &CARDINALS,
            AdjacencyRule::Diagonals => &DIAGONALS,
            AdjacencyRule::EightWay => &EIGHT_WAY,
        }
    }
}

/// Distance metric; also decides the shape of a source's radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Distance {
    /// `max(|dx|, |dy|)`: square radius.
    Chebyshev,
    /// `sqrt(dx² + dy²)`: circular radius.
    #[default]
    Euclidean,
    /// `|dx| + |dy|`: diamond radius.
    Manhattan,
}

impl Distance {
    pub const ALL: [Distance; 3] = [Distance::Chebyshev, Distance::Euclidean, Distance::Manhattan];

    /// Length of the offset `(dx, dy)` under this metric.
    #[inline]
    pub fn calculate(self, dx: i32, dy: i32) -> f64 {
        let dx = dx.unsigned_abs() as f64;
        let dy = dy.unsigned_abs() as f64;
        match self {
            Distance::Chebyshev => dx.max(dy),
            Distance::Euclidean => (dx * dx + dy * dy).sqrt(),
            Distance::Manhattan => dx + dy,
        }
    }

    /// Distance between two positions.
    pub fn between(self, a: Coord, b: Coord) -> f64 {
        self.calculate(b.x - a.x, b.y - a.y)
    }

    /// The neighbourhood under which this metric is a walking distance.
    pub fn adjacency(self) -> AdjacencyRule {
        match self {
            Distance::Manhattan => AdjacencyRule::Cardinals,
            Distance::Chebyshev | Distance::Euclidean => AdjacencyRule::EightWay,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Distance::Chebyshev => "chebyshev",
            Distance::Euclidean => "euclidean",
            Distance::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distance {
    type Err = SenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distance::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SenseError::UnknownDistance { name: s.to_string() })
    }
}
