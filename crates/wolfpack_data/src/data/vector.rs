use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Magnitudes below this are treated as zero when normalizing.
pub const EPSILON: f64 = 1e-9;

/// A 3D vector used for positions, velocities and steering forces.
///
/// The zero vector doubles as the "no opinion" force: a behavior that has
/// nothing to say for a tick returns [`Vec3::ZERO`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Point on the ground plane (`y == 0`).
    #[must_use]
    pub const fn flat(x: f64, z: f64) -> Self {
        Self { x, y: 0.0, z }
    }

    #[must_use]
    pub fn magnitude_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.magnitude_squared() < EPSILON * EPSILON
    }

    /// Unit vector in the same direction, or zero for a (near) zero input.
    #[must_use]
    pub fn normalize(self) -> Self {
        let mag = self.magnitude();
        if mag < EPSILON || !mag.is_finite() {
            Self::ZERO
        } else {
            self * (1.0 / mag)
        }
    }

    /// Clamps the magnitude to `max`, preserving direction.
    #[must_use]
    pub fn limit(self, max: f64) -> Self {
        let max = max.max(0.0);
        let mag_sq = self.magnitude_squared();
        if mag_sq > max * max {
            self.normalize() * max
        } else {
            self
        }
    }

    #[must_use]
    pub fn distance_to(self, other: Vec3) -> f64 {
        (other - self).magnitude()
    }

    #[must_use]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Heading on the x/z plane in radians, measured from +x towards +z.
    #[must_use]
    pub fn bearing(self) -> f64 {
        self.z.atan2(self.x)
    }

    /// Unit vector on the x/z plane for a heading in radians.
    #[must_use]
    pub fn from_bearing(angle: f64) -> Self {
        Self::flat(angle.cos(), angle.sin())
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::iter::Sum for Vec3 {
    fn sum<I: Iterator<Item = Vec3>>(iter: I) -> Vec3 {
        iter.fold(Vec3::ZERO, |acc, v| acc + v)
    }
}
