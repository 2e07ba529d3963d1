/// A closed range of ray parameters `[min, max]`.
///
/// Primitives only report intersections whose parameter lies strictly
/// inside the interval, which keeps secondary rays from re-hitting the
/// surface they start on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Offset applied to secondary rays leaving a surface.
    pub const SELF_HIT_EPSILON: f32 = 1e-3;

    /// Every hit in front of the ray origin, excluding the origin itself.
    pub const FORWARD: Interval = Interval {
        min: Self::SELF_HIT_EPSILON,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }
}
