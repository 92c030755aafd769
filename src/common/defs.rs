use serde::{Deserialize, Serialize};
use std::fmt;

pub type Discrete = i32;
pub type Continous = f64;

/// Fixed enumeration order used for tie-breaking in every solver.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Action {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Unit step. Up is `+y`.
    pub fn delta(self) -> (Discrete, Discrete) {
        match self {
            Action::Up => (0, 1),
            Action::Right => (1, 0),
            Action::Down => (0, -1),
            Action::Left => (-1, 0),
        }
    }

    pub fn arrow(self) -> char {
        match self {
            Action::Up => '^',
            Action::Right => '>',
            Action::Down => 'v',
            Action::Left => '<',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Action::Up => "Up",
            Action::Right => "Right",
            Action::Down => "Down",
            Action::Left => "Left",
        };
        write!(f, "{}", name)
    }
}

/// Grid cell. Serialised as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(Discrete, Discrete)", into = "(Discrete, Discrete)")]
pub struct Coord {
    pub x: Discrete,
    pub y: Discrete,
}

impl Coord {
    pub const fn new(x: Discrete, y: Discrete) -> Self {
        Self { x, y }
    }

    pub fn step(self, a: Action) -> Self {
        let (dx, dy) = a.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Coord) -> Discrete {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(Discrete, Discrete)> for Coord {
    fn from((x, y): (Discrete, Discrete)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coord> for (Discrete, Discrete) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_serialises_as_pair() {
        let c: Coord = serde_json::from_str("[3, 2]").unwrap();
        assert_eq!(c, Coord::new(3, 2));
        assert_eq!(serde_json::to_string(&c).unwrap(), "[3,2]");
    }

    #[test]
    fn up_increases_y() {
        assert_eq!(Coord::new(1, 1).step(Action::Up), Coord::new(1, 2));
        assert_eq!(Coord::new(1, 1).step(Action::Left), Coord::new(0, 1));
    }
}
