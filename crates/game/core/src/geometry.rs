//! World-space and grid-space coordinates.
//!
//! The game world is continuous on the horizontal `x,z` plane; the walkable
//! layout is a grid of square cells. [`WorldPoint`] lives in the former,
//! [`CellPos`] in the latter, and [`crate::GridMap`] converts between them.

use std::f32::consts::PI;
use std::fmt;

/// Continuous position on the horizontal plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    pub x: f32,
    pub z: f32,
}

impl WorldPoint {
    pub const ORIGIN: Self = Self { x: 0.0, z: 0.0 };

    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn distance(self, other: WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx * dx + dz * dz
    }

    /// Returns this point moved by `distance` along the unit vector `(dx, dz)`.
    pub fn offset(self, (dx, dz): (f32, f32), distance: f32) -> WorldPoint {
        WorldPoint::new(self.x + dx * distance, self.z + dz * distance)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.z)
    }
}

/// Discrete grid position: `x` is the column, `y` the row.
///
/// Rows run along the world `z` axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Orthogonal neighbours in a fixed order (N, E, S, W).
    pub fn neighbors4(self) -> [CellPos; 4] {
        [
            CellPos::new(self.x, self.y - 1),
            CellPos::new(self.x + 1, self.y),
            CellPos::new(self.x, self.y + 1),
            CellPos::new(self.x - 1, self.y),
        ]
    }

    /// All eight surrounding cells, row-major.
    pub fn neighbors8(self) -> impl Iterator<Item = CellPos> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1)
                .filter(move |&dx| dx != 0 || dy != 0)
                .map(move |dx| CellPos::new(self.x + dx, self.y + dy))
        })
    }

    pub fn manhattan(self, other: CellPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev distance, i.e. which concentric square ring `other` sits on.
    pub fn ring_distance(self, other: CellPos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// How facing angles map onto the `x,z` plane.
///
/// The game reports the player's and the boss's facing as a single angle;
/// commands carry absolute target headings in the same convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AngleConvention {
    /// Heading is `atan2(dx, dz)`; facing `θ` points along `(sin θ, cos θ)`.
    #[default]
    Atan2XZ,
    /// Heading is `atan2(dz, dx)`; facing `θ` points along `(cos θ, sin θ)`.
    Atan2ZX,
}

impl AngleConvention {
    /// Heading that points from `from` towards `to`.
    pub fn heading(self, from: WorldPoint, to: WorldPoint) -> f32 {
        let dx = to.x - from.x;
        let dz = to.z - from.z;
        match self {
            AngleConvention::Atan2XZ => dx.atan2(dz),
            AngleConvention::Atan2ZX => dz.atan2(dx),
        }
    }

    /// Unit vector `(dx, dz)` for the given facing angle.
    pub fn forward(self, angle: f32) -> (f32, f32) {
        match self {
            AngleConvention::Atan2XZ => (angle.sin(), angle.cos()),
            AngleConvention::Atan2ZX => (angle.cos(), angle.sin()),
        }
    }
}

/// Wraps an angle into `(-π, π]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Signed smallest rotation taking `from` to `to`.
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn heading_and_forward_agree() {
        for convention in [AngleConvention::Atan2XZ, AngleConvention::Atan2ZX] {
            let from = WorldPoint::new(1.0, 1.0);
            let to = WorldPoint::new(4.0, -3.0);
            let heading = convention.heading(from, to);
            let (dx, dz) = convention.forward(heading);
            let expected = WorldPoint::new(0.6, -0.8);
            assert!((dx - expected.x).abs() < EPS, "{convention}");
            assert!((dz - expected.z).abs() < EPS, "{convention}");
        }
    }

    #[test]
    fn default_convention_points_east_at_half_pi() {
        let heading = AngleConvention::default()
            .heading(WorldPoint::ORIGIN, WorldPoint::new(5.0, 0.0));
        assert!((heading - PI / 2.0).abs() < EPS);
    }

    #[test]
    fn normalize_wraps_into_half_open_range() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-PI) - PI).abs() < EPS);
        assert!((angle_delta(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-4);
    }

    #[test]
    fn ring_distance_is_chebyshev() {
        let origin = CellPos::new(0, 0);
        assert_eq!(origin.ring_distance(CellPos::new(3, -2)), 3);
        assert_eq!(origin.manhattan(CellPos::new(3, -2)), 5);
        assert_eq!(origin.neighbors8().count(), 8);
    }
}
