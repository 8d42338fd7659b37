//! Camera module for pan/zoom transforms.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 10.0;

/// Camera manages the view transform for the canvas.
///
/// `(x, y)` is the world-space point under the viewport center and `z` is the
/// zoom scale (world units * z = screen pixels). The transforms are pure
/// functions of the camera and the viewport's current on-screen bounds, so a
/// viewport that moves or resizes between calls needs no invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World x under the viewport center.
    pub x: f64,
    /// World y under the viewport center.
    pub y: f64,
    /// Zoom scale, always positive.
    pub z: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the origin with 100% zoom.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a screen point to world coordinates.
    ///
    /// `viewport` is the viewport's bounding box in screen coordinates.
    /// A degenerate viewport (zero or negative size) is a caller error; the
    /// result is meaningless but finite as long as `z > 0`.
    pub fn screen_to_world(&self, screen: Point, viewport: Rect) -> Point {
        let center = viewport.center();
        Point::new(
            (screen.x - center.x) / self.z + self.x,
            (screen.y - center.y) / self.z + self.y,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world: Point, viewport: Rect) -> Point {
        let center = viewport.center();
        Point::new(
            (world.x - self.x) * self.z + center.x,
            (world.y - self.y) * self.z + center.y,
        )
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.x -= screen_delta.x / self.z;
        self.y -= screen_delta.y / self.z;
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen: Point, viewport: Rect, factor: f64) {
        let new_z = (self.z * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_z - self.z).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_world(screen, viewport);
        self.z = new_z;

        // Move the camera so the anchor stays under the cursor.
        let drifted = self.screen_to_world(screen, viewport);
        self.x += anchor.x - drifted.x;
        self.y += anchor.y - drifted.y;
    }

    /// Reset to the origin at 100% zoom.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
