//! Pinhole camera used for screen/world mapping
//!
//! Screen space follows the convention of the input layer: x right and y up
//! in pixels from the bottom-left corner, z is the distance in front of the
//! camera along its forward axis.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Viewing direction (normalized on use)
    pub forward: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, -4.0),
            forward: Vec3::new(0.0, -0.45, 1.0),
            fov_y: 60f32.to_radians(),
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Camera {
    fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward.normalize_or(Vec3::Z), Vec3::Y)
    }

    fn half_extents(&self, depth: f32) -> (f32, f32) {
        let half_h = (self.fov_y * 0.5).tan() * depth;
        (half_h * self.width / self.height.max(1.0), half_h)
    }

    /// Normalized forward direction
    pub fn forward(&self) -> Vec3 {
        self.forward.normalize_or(Vec3::Z)
    }

    /// Project a world point to (pixel x, pixel y, depth)
    pub fn world_to_screen(&self, point: Vec3) -> Vec3 {
        let v = self.view().transform_point3(point);
        let depth = -v.z;
        if depth <= f32::EPSILON {
            return Vec3::new(self.width * 0.5, self.height * 0.5, depth);
        }
        let (half_w, half_h) = self.half_extents(depth);
        let ndc_x = v.x / half_w;
        let ndc_y = v.y / half_h;
        Vec3::new(
            (ndc_x + 1.0) * 0.5 * self.width,
            (ndc_y + 1.0) * 0.5 * self.height,
            depth,
        )
    }

    /// Unproject (pixel x, pixel y, depth) back to world space
    pub fn screen_to_world(&self, screen: Vec3) -> Vec3 {
        let depth = screen.z;
        let (half_w, half_h) = self.half_extents(depth);
        let ndc_x = screen.x / self.width.max(1.0) * 2.0 - 1.0;
        let ndc_y = screen.y / self.height.max(1.0) * 2.0 - 1.0;
        let v = Vec3::new(ndc_x * half_w, ndc_y * half_h, -depth);
        self.view().inverse().transform_point3(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_on_axis_maps_to_screen_center() {
        let camera = Camera {
            position: Vec3::ZERO,
            forward: Vec3::Z,
            ..Default::default()
        };
        let screen = camera.world_to_screen(Vec3::new(0.0, 0.0, 5.0));
        assert!((screen.x - 640.0).abs() < 1e-3);
        assert!((screen.y - 360.0).abs() < 1e-3);
        assert!((screen.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_unproject_recovers_world_point() {
        let camera = Camera::default();
        let world = Vec3::new(0.4, 1.5, 0.0);
        let screen = camera.world_to_screen(world);
        let back = camera.screen_to_world(screen);
        assert!((back - world).length() < 1e-3, "{back:?} != {world:?}");
    }

    #[test]
    fn test_sliding_screen_x_keeps_depth() {
        let camera = Camera::default();
        let anchor = camera.world_to_screen(Vec3::new(0.0, 1.5, 0.0));
        let moved = camera.screen_to_world(Vec3::new(anchor.x + 200.0, anchor.y, anchor.z));
        let reprojected = camera.world_to_screen(moved);
        assert!((reprojected.z - anchor.z).abs() < 1e-3);
        assert!((reprojected.y - anchor.y).abs() < 1e-2);
        assert!((reprojected.x - anchor.x - 200.0).abs() < 1e-2);
    }
}
