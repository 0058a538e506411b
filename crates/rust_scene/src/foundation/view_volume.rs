//! Camera view volumes
//!
//! A view volume is described in camera space (eye at the origin looking
//! down -Z) and placed in the world by a camera-to-world matrix.

use serde::{Deserialize, Serialize};

use super::line::{Frustum, Plane};
use super::math::{Mat4, Mat4Ext, Vec2, Vec3};

/// Kind of projection a view volume uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    /// Parallel projection
    Orthographic,
    /// Pinhole projection through the eye point
    Perspective,
}

/// Camera frustum placed in world space
#[derive(Debug, Clone, PartialEq)]
pub struct ViewVolume {
    projection: ProjectionType,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
    camera_to_world: Mat4,
}

impl ViewVolume {
    /// Perspective volume with vertical field of view `fov_y` (radians)
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_y * 0.5).tan();
        let right = top * aspect;
        Self {
            projection: ProjectionType::Perspective,
            left: -right,
            right,
            bottom: -top,
            top,
            near,
            far,
            camera_to_world: Mat4::identity(),
        }
    }
    
    /// Orthographic volume with the given near-plane rectangle
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            projection: ProjectionType::Orthographic,
            left,
            right,
            bottom,
            top,
            near,
            far,
            camera_to_world: Mat4::identity(),
        }
    }
    
    /// Projection type
    pub fn projection_type(&self) -> ProjectionType {
        self.projection
    }
    
    /// Distance from the eye to the near plane
    pub fn near_distance(&self) -> f32 {
        self.near
    }
    
    /// Distance from the eye to the far plane
    pub fn far_distance(&self) -> f32 {
        self.far
    }
    
    /// Width and height of the near-plane rectangle
    pub fn near_size(&self) -> Vec2 {
        Vec2::new(self.right - self.left, self.top - self.bottom)
    }
    
    /// Camera-to-world placement
    pub fn camera_to_world(&self) -> &Mat4 {
        &self.camera_to_world
    }
    
    /// Place the volume in the world
    pub fn set_camera_to_world(&mut self, matrix: Mat4) {
        self.camera_to_world = matrix;
    }
    
    /// Apply `matrix` after the current placement
    pub fn transform(&mut self, matrix: &Mat4) {
        self.camera_to_world = matrix * self.camera_to_world;
    }
    
    /// World position of the eye
    pub fn projection_point(&self) -> Vec3 {
        self.camera_to_world.mult_point(&Vec3::zeros())
    }
    
    /// World viewing direction
    pub fn projection_direction(&self) -> Vec3 {
        self.camera_to_world.mult_dir(&-Vec3::z()).normalize()
    }
    
    /// World-to-camera matrix; identity if the placement is singular
    pub fn view_matrix(&self) -> Mat4 {
        self.camera_to_world.try_inverse().unwrap_or_else(Mat4::identity)
    }
    
    /// Camera-to-clip matrix (OpenGL conventions, depth in -1..1)
    pub fn projection_matrix(&self) -> Mat4 {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        match self.projection {
            ProjectionType::Perspective => Mat4::new(
                2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
                0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
                0.0, 0.0, -(f + n) / (f - n), -2.0 * f * n / (f - n),
                0.0, 0.0, -1.0, 0.0,
            ),
            ProjectionType::Orthographic => Mat4::new(
                2.0 / (r - l), 0.0, 0.0, -(r + l) / (r - l),
                0.0, 2.0 / (t - b), 0.0, -(t + b) / (t - b),
                0.0, 0.0, -2.0 / (f - n), -(f + n) / (f - n),
                0.0, 0.0, 0.0, 1.0,
            ),
        }
    }
    
    /// Camera-space point on the near plane for a normalized (0..1) position
    fn near_point(&self, point: &Vec2) -> Vec3 {
        Vec3::new(
            self.left + point.x * (self.right - self.left),
            self.bottom + point.y * (self.top - self.bottom),
            -self.near,
        )
    }
    
    /// Camera-space far-plane point matching a near-plane point
    fn far_point(&self, near_point: &Vec3) -> Vec3 {
        match self.projection {
            ProjectionType::Perspective => near_point * (self.far / self.near),
            ProjectionType::Orthographic => Vec3::new(near_point.x, near_point.y, -self.far),
        }
    }
    
    /// World-space segment from the near to the far plane through a
    /// normalized (0..1, origin lower left) position on the view plane
    pub fn project_point_to_segment(&self, point: &Vec2) -> (Vec3, Vec3) {
        let near = self.near_point(point);
        let far = self.far_point(&near);
        (
            self.camera_to_world.mult_point(&near),
            self.camera_to_world.mult_point(&far),
        )
    }
    
    /// Sub-volume covering the normalized rectangle `min..max` of the view plane
    pub fn narrow(&self, min: &Vec2, max: &Vec2) -> ViewVolume {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        ViewVolume {
            left: self.left + min.x * width,
            right: self.left + max.x * width,
            bottom: self.bottom + min.y * height,
            top: self.bottom + max.y * height,
            ..self.clone()
        }
    }
    
    /// World-space corners: near plane (ll, lr, ul, ur) then far plane
    pub fn world_corners(&self) -> [Vec3; 8] {
        let near = [
            self.near_point(&Vec2::new(0.0, 0.0)),
            self.near_point(&Vec2::new(1.0, 0.0)),
            self.near_point(&Vec2::new(0.0, 1.0)),
            self.near_point(&Vec2::new(1.0, 1.0)),
        ];
        std::array::from_fn(|i| {
            let camera_point = if i < 4 { near[i] } else { self.far_point(&near[i - 4]) };
            self.camera_to_world.mult_point(&camera_point)
        })
    }
    
    /// World-space frustum with inward-facing planes
    pub fn frustum(&self) -> Frustum {
        let c = self.world_corners();
        let center = c.iter().fold(Vec3::zeros(), |sum, p| sum + p) / 8.0;
        let planes = [
            Plane::from_points(&c[0], &c[2], &c[4]),
            Plane::from_points(&c[1], &c[5], &c[3]),
            Plane::from_points(&c[0], &c[4], &c[1]),
            Plane::from_points(&c[2], &c[3], &c[6]),
            Plane::from_points(&c[0], &c[1], &c[2]),
            Plane::from_points(&c[4], &c[6], &c[5]),
        ]
        .map(|plane| {
            if plane.distance_to_point(&center) < 0.0 {
                Plane { normal: -plane.normal, distance: -plane.distance }
            } else {
                plane
            }
        });
        Frustum::new(planes)
    }
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self::orthographic(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0)
    }
}
