use std::fmt;
use std::ops::{Index, IndexMut};

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Logical thrust directions
// ---------------------------------------------------------------------------

/// One of the six body-frame thrust axes. A thruster in the `Forward` pool
/// pushes the vehicle forward (its nozzle faces backward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Back,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Back,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Back => 1,
            Direction::Up => 2,
            Direction::Down => 3,
            Direction::Left => 4,
            Direction::Right => 5,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Integer body-frame unit vector (+X right, +Y up, +Z backward).
    pub const fn unit(self) -> [i8; 3] {
        match self {
            Direction::Forward => [0, 0, -1],
            Direction::Back => [0, 0, 1],
            Direction::Up => [0, 1, 0],
            Direction::Down => [0, -1, 0],
            Direction::Left => [-1, 0, 0],
            Direction::Right => [1, 0, 0],
        }
    }

    pub const fn from_unit(v: [i8; 3]) -> Option<Direction> {
        match v {
            [0, 0, -1] => Some(Direction::Forward),
            [0, 0, 1] => Some(Direction::Back),
            [0, 1, 0] => Some(Direction::Up),
            [0, -1, 0] => Some(Direction::Down),
            [-1, 0, 0] => Some(Direction::Left),
            [1, 0, 0] => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn body_vector(self) -> Vector3<f64> {
        let [x, y, z] = self.unit();
        Vector3::new(x as f64, y as f64, z as f64)
    }

    /// This axis of `orientation` in world space.
    pub fn world_vector(self, orientation: &Rotation3<f64>) -> Vector3<f64> {
        orientation * self.body_vector()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Fixed-size per-direction storage
// ---------------------------------------------------------------------------

/// One value per [`Direction`], stored in a single array so the six entries
/// cannot drift out of sync.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionMap<T>([T; 6]);

impl<T: Copy> DirectionMap<T> {
    pub fn splat(value: T) -> Self {
        Self([value; 6])
    }

    pub fn fill(&mut self, value: T) {
        self.0 = [value; 6];
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, T)> + '_ {
        Direction::ALL.iter().map(move |&d| (d, self.0[d.index()]))
    }
}

impl<T> Index<Direction> for DirectionMap<T> {
    type Output = T;

    fn index(&self, d: Direction) -> &T {
        &self.0[d.index()]
    }
}

impl<T> IndexMut<Direction> for DirectionMap<T> {
    fn index_mut(&mut self, d: Direction) -> &mut T {
        &mut self.0[d.index()]
    }
}

// ---------------------------------------------------------------------------
// Thrust power levels
// ---------------------------------------------------------------------------

/// Coarse thrust request, as a fraction of a pool's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThrustPower {
    None,
    TenPercent,
    Full,
    Fraction(f64),
}

impl ThrustPower {
    pub fn fraction(self) -> f64 {
        match self {
            ThrustPower::None => 0.0,
            ThrustPower::TenPercent => 0.1,
            ThrustPower::Full => 1.0,
            ThrustPower::Fraction(f) if f.is_finite() => f.clamp(0.0, 1.0),
            ThrustPower::Fraction(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for d in Direction::ALL {
            assert_ne!(d, d.opposite());
            assert_eq!(d, d.opposite().opposite());
            let sum = d.body_vector() + d.opposite().body_vector();
            assert_eq!(sum, Vector3::zeros());
        }
    }

    #[test]
    fn unit_round_trips() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_unit(d.unit()), Some(d));
        }
        assert_eq!(Direction::from_unit([1, 1, 0]), None);
    }

    #[test]
    fn direction_map_indexes_independently() {
        let mut m = DirectionMap::splat(0.0);
        m[Direction::Up] = 3.0;
        m[Direction::Left] += 1.5;
        assert_eq!(m[Direction::Up], 3.0);
        assert_eq!(m[Direction::Left], 1.5);
        assert_eq!(m.iter().map(|(_, v)| v).sum::<f64>(), 4.5);
        m.fill(0.0);
        assert_eq!(m, DirectionMap::splat(0.0));
    }
}
