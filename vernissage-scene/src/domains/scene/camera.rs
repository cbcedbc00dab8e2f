//! Perspective camera and picking rays.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::infra::device::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, viewport: &Viewport) -> Self {
        Self {
            position,
            target,
            fov_y: 60f32.to_radians(),
            aspect: viewport.aspect(),
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(0.1), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Reflow after the surface changed size.
    pub fn resize(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    /// World-space ray through a point in normalized device coordinates
    /// (`x`, `y` in `[-1, 1]`, `y` up).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Ray {
            origin: self.position,
            direction: (far - near).normalize_or(self.forward()),
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Project a world point to pixel coordinates (origin top-left).
    /// Returns `None` for points behind the camera.
    pub fn world_to_screen(&self, point: Vec3, viewport: &Viewport) -> Option<Vec2> {
        let clip = self.view_proj() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width as f32,
            (1.0 - ndc.y) * 0.5 * viewport.height as f32,
        ))
    }

    /// Vertical extent of the view frustum at a distance from the camera.
    pub fn frustum_height_at(&self, distance: f32) -> f32 {
        2.0 * distance * (self.fov_y * 0.5).tan()
    }
}

/// Convert pixel coordinates (origin top-left) to NDC.
pub fn screen_to_ndc(x: f32, y: f32, viewport: &Viewport) -> Vec2 {
    let width = (viewport.width as f32).max(1.0);
    let height = (viewport.height as f32).max(1.0);
    Vec2::new(x / width * 2.0 - 1.0, -(y / height * 2.0 - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, &Viewport::new(800, 600, 1.0))
    }

    #[test]
    fn center_ray_points_at_target() {
        let ray = camera().ray_from_ndc(Vec2::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn projection_and_picking_agree() {
        let camera = camera();
        let viewport = Viewport::new(800, 600, 1.0);
        let point = Vec3::new(2.0, -1.0, 0.0);
        let screen = camera.world_to_screen(point, &viewport).unwrap();
        let ray = camera.ray_from_ndc(screen_to_ndc(screen.x, screen.y, &viewport));
        let t = (point.z - ray.origin.z) / ray.direction.z;
        assert!((ray.at(t) - point).length() < 1e-3);
    }

    #[test]
    fn points_behind_are_not_projected() {
        let camera = camera();
        let viewport = Viewport::new(800, 600, 1.0);
        assert!(camera.world_to_screen(Vec3::new(0.0, 0.0, 20.0), &viewport).is_none());
    }
}
