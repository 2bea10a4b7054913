use bevy::math::Vec2;

/// Axis-aligned rectangle with its origin at the bottom-left corner,
/// matching the scene's Y-up coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// AABB overlap test. Touching edges do not count as overlapping.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x < b.x + b.w && a.y < b.y + b.h && a.x + a.w > b.x && a.y + a.h > b.y
}

pub fn vector_from_angle(radians: f32) -> Vec2 {
    Vec2::new(radians.cos(), radians.sin())
}

pub fn vector_to_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}
