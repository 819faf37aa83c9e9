//! Conversion between screen pixels and physics meters.
//!
//! Both spaces share the same origin (top left) and orientation (y grows
//! downwards), so the mapping is a single uniform scale.

use rapier2d::prelude::*;

/// Screen size and the fixed pixel scale of the physics world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub screen_width_px: u32,
    pub screen_height_px: u32,
    pub world_width_m: f32,
    meters_per_pixel: f32,
}

impl WorldConfig {
    /// `world_width_m` meters span `screen_width_px` pixels.
    ///
    /// Callers validate that both are positive; the configuration loader
    /// refuses anything else.
    pub fn new(screen_width_px: u32, screen_height_px: u32, world_width_m: f32) -> Self {
        Self {
            screen_width_px,
            screen_height_px,
            world_width_m,
            meters_per_pixel: world_width_m / screen_width_px as f32,
        }
    }

    pub fn meters_per_pixel(&self) -> f32 {
        self.meters_per_pixel
    }

    /// Height of the arena in meters.
    pub fn world_height_m(&self) -> f32 {
        self.to_meters(self.screen_height_px as i32)
    }

    pub fn to_pixels(&self, meters: f32) -> i32 {
        (meters / self.meters_per_pixel).round() as i32
    }

    pub fn to_meters(&self, pixels: i32) -> f32 {
        pixels as f32 * self.meters_per_pixel
    }

    /// Converts a world position into a pixel position.
    pub fn point_to_pixels(&self, point: &Vector<Real>) -> (i32, i32) {
        (self.to_pixels(point.x), self.to_pixels(point.y))
    }

    /// Converts a pixel position into a world position.
    pub fn point_to_meters(&self, x: i32, y: i32) -> Vector<Real> {
        vector![self.to_meters(x), self.to_meters(y)]
    }
}
