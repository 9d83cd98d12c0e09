//! Permissible attack area: the rectangle every drone is confined to.

use bevy::prelude::*;
use rand::Rng;

/// Axis-aligned rectangle on the plane `z = height`.
///
/// Invariant: `min <= max` component-wise.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct AttackArea {
    pub min: Vec2,
    pub max: Vec2,
    /// Reference height of the movement plane.
    pub height: f32,
}

impl AttackArea {
    pub fn new(min: Vec2, max: Vec2, height: f32) -> Self {
        debug_assert!(min.cmple(max).all(), "AttackArea min must not exceed max");
        Self { min, max, height }
    }

    pub fn from_center_size(center: Vec3, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        let c = center.truncate();
        Self::new(c - half, c + half, center.z)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        ((self.min + self.max) * 0.5).extend(self.height)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Inside means on the plane and within the rectangle (edges included).
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.z == self.height && p.truncate().cmpge(self.min).all() && p.truncate().cmple(self.max).all()
    }

    /// Project `p` onto the plane, then snap it to the nearest point of the rectangle.
    ///
    /// Points already inside come back unchanged.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        let projected = p.with_z(self.height);
        if self.contains(projected) {
            return projected;
        }
        projected.truncate().clamp(self.min, self.max).extend(self.height)
    }

    /// Uniform random point inside the rectangle, on the plane.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        let x = rng.gen_range(self.min.x..=self.max.x);
        let y = rng.gen_range(self.min.y..=self.max.y);
        Vec3::new(x, y, self.height)
    }
}

/// Clamp into `area` when one exists; without an area, drones move unconstrained.
#[inline]
pub fn constrain(area: Option<&AttackArea>, p: Vec3) -> Vec3 {
    match area {
        Some(area) => area.clamp(p),
        None => p,
    }
}
