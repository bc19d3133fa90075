use serde::{Deserialize, Serialize};

use super::direction::Direction;

// ---------------------------------------------------------------------------
// Axis remap: the 24 rotations of a cube
// ---------------------------------------------------------------------------

/// Which physical axes serve as the logical Forward and Up.
///
/// Variant names read `<physical forward>Forward<physical up>Up`, so
/// `UpForwardBackUp` flies "nose up" with the old back as the new up.
/// `ForwardForwardUpUp` is the unrotated frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisRemap {
    #[default]
    ForwardForwardUpUp,
    ForwardForwardDownUp,
    ForwardForwardLeftUp,
    ForwardForwardRightUp,
    BackForwardUpUp,
    BackForwardDownUp,
    BackForwardLeftUp,
    BackForwardRightUp,
    UpForwardForwardUp,
    UpForwardBackUp,
    UpForwardLeftUp,
    UpForwardRightUp,
    DownForwardForwardUp,
    DownForwardBackUp,
    DownForwardLeftUp,
    DownForwardRightUp,
    LeftForwardUpUp,
    LeftForwardDownUp,
    LeftForwardForwardUp,
    LeftForwardBackUp,
    RightForwardUpUp,
    RightForwardDownUp,
    RightForwardForwardUp,
    RightForwardBackUp,
}

use AxisRemap::*;
use Direction::{Back as B, Down as D, Forward as F, Left as L, Right as R, Up as U};

/// (physical forward, physical up) per variant, in declaration order.
const AXES: [(Direction, Direction); 24] = [
    (F, U), (F, D), (F, L), (F, R),
    (B, U), (B, D), (B, L), (B, R),
    (U, F), (U, B), (U, L), (U, R),
    (D, F), (D, B), (D, L), (D, R),
    (L, U), (L, D), (L, F), (L, B),
    (R, U), (R, D), (R, F), (R, B),
];

const fn cross(a: [i8; 3], b: [i8; 3]) -> [i8; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

const fn build_table() -> [[Direction; 6]; 24] {
    let mut table = [[F; 6]; 24];
    let mut i = 0;
    while i < 24 {
        let (fwd, up) = AXES[i];
        // right = forward x up in a right-handed frame with forward = -Z
        let right = match Direction::from_unit(cross(fwd.unit(), up.unit())) {
            Some(d) => d,
            None => panic!("forward and up must be perpendicular"),
        };
        table[i][F.index()] = fwd;
        table[i][B.index()] = fwd.opposite();
        table[i][U.index()] = up;
        table[i][D.index()] = up.opposite();
        table[i][L.index()] = right.opposite();
        table[i][R.index()] = right;
        i += 1;
    }
    table
}

/// Logical direction -> physical pool, per remap. Built at compile time.
const REMAP_TABLE: [[Direction; 6]; 24] = build_table();

impl AxisRemap {
    pub const ALL: [AxisRemap; 24] = [
        ForwardForwardUpUp, ForwardForwardDownUp, ForwardForwardLeftUp, ForwardForwardRightUp,
        BackForwardUpUp, BackForwardDownUp, BackForwardLeftUp, BackForwardRightUp,
        UpForwardForwardUp, UpForwardBackUp, UpForwardLeftUp, UpForwardRightUp,
        DownForwardForwardUp, DownForwardBackUp, DownForwardLeftUp, DownForwardRightUp,
        LeftForwardUpUp, LeftForwardDownUp, LeftForwardForwardUp, LeftForwardBackUp,
        RightForwardUpUp, RightForwardDownUp, RightForwardForwardUp, RightForwardBackUp,
    ];

    /// The unrotated frame.
    pub const IDENTITY: AxisRemap = ForwardForwardUpUp;

    /// Physical pool that serves `logical` under this remap.
    pub fn resolve(self, logical: Direction) -> Direction {
        REMAP_TABLE[self as usize][logical.index()]
    }

    pub fn forward(self) -> Direction {
        AXES[self as usize].0
    }

    pub fn up(self) -> Direction {
        AXES[self as usize].1
    }

    /// Remap with the given physical forward and up, if they are
    /// perpendicular.
    pub fn from_axes(forward: Direction, up: Direction) -> Option<AxisRemap> {
        AXES.iter()
            .position(|&(f, u)| f == forward && u == up)
            .map(|i| Self::ALL[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_remap_resolves_to_itself() {
        for d in Direction::ALL {
            assert_eq!(AxisRemap::IDENTITY.resolve(d), d);
        }
        assert_eq!(AxisRemap::default(), AxisRemap::IDENTITY);
    }

    #[test]
    fn every_remap_is_a_permutation_preserving_opposites() {
        for remap in AxisRemap::ALL {
            let images: HashSet<Direction> = Direction::ALL.iter().map(|&d| remap.resolve(d)).collect();
            assert_eq!(images.len(), 6, "{:?} is not a permutation", remap);
            for d in Direction::ALL {
                assert_eq!(remap.resolve(d.opposite()), remap.resolve(d).opposite());
            }
        }
    }

    #[test]
    fn all_remaps_are_distinct() {
        let rows: HashSet<Vec<Direction>> = AxisRemap::ALL
            .iter()
            .map(|r| Direction::ALL.iter().map(|&d| r.resolve(d)).collect())
            .collect();
        assert_eq!(rows.len(), 24);
    }

    #[test]
    fn all_remaps_are_proper_rotations() {
        for remap in AxisRemap::ALL {
            let f = remap.resolve(Direction::Forward).body_vector();
            let u = remap.resolve(Direction::Up).body_vector();
            let r = remap.resolve(Direction::Right).body_vector();
            assert_eq!(f.cross(&u), r, "{:?} is a reflection", remap);
        }
    }

    #[test]
    fn nose_up_remap() {
        // New forward is the old up; new up is the old back.
        let r = AxisRemap::UpForwardBackUp;
        assert_eq!(r.resolve(Direction::Forward), Direction::Up);
        assert_eq!(r.resolve(Direction::Up), Direction::Back);
        assert_eq!(r.resolve(Direction::Down), Direction::Forward);
        assert_eq!(r.resolve(Direction::Right), Direction::Right);
        assert_eq!(AxisRemap::from_axes(Direction::Up, Direction::Back), Some(r));
        assert_eq!(AxisRemap::from_axes(Direction::Up, Direction::Down), None);
    }
}
