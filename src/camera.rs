#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fixed viewport dimensions in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0 }
    }
}

/// Camera state for pan/zoom over the infinite world plane.
///
/// `x` / `y` are the world-space focal point rendered at the viewport center.
/// `zoom` is a scale factor bounded to `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a world-space point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: Point, viewport: Viewport) -> Point {
        Point {
            x: viewport.width / 2.0 + (world.x - self.x) * self.zoom,
            y: viewport.height / 2.0 + (world.y - self.y) * self.zoom,
        }
    }

    /// Convert a screen-space point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point, viewport: Viewport) -> Point {
        Point {
            x: self.x + (screen.x - viewport.width / 2.0) / self.zoom,
            y: self.y + (screen.y - viewport.height / 2.0) / self.zoom,
        }
    }

    /// Convert a screen-space distance to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the focal point by a screen-space delta (drag-to-pan).
    ///
    /// Dragging the pointer right moves the world right under the cursor,
    /// so the focal point moves left.
    pub fn pan_by(&mut self, screen_dx: f64, screen_dy: f64) {
        self.x -= screen_dx / self.zoom;
        self.y -= screen_dy / self.zoom;
    }

    /// Multiply zoom by `factor`, clamped to `[MIN_ZOOM, MAX_ZOOM]`, keeping
    /// the world point under `screen` stationary on screen.
    pub fn zoom_at(&mut self, screen: Point, factor: f64, viewport: Viewport) {
        let anchor = self.screen_to_world(screen, viewport);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.x = anchor.x - (screen.x - viewport.width / 2.0) / self.zoom;
        self.y = anchor.y - (screen.y - viewport.height / 2.0) / self.zoom;
    }
}
