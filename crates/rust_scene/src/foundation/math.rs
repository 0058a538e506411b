//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the few matrix helpers the scene graph
//! needs. Matrices follow the column-vector convention: `p' = M * p`.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;
    
    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
    
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;
    
    /// Create a rotation matrix around the Y axis  
    fn rotation_y(angle: f32) -> Mat4;
    
    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;
    
    /// Transform a point (w = 1), dividing by w when the matrix is projective
    fn mult_point(&self, point: &Vec3) -> Vec3;
    
    /// Transform a direction (w = 0)
    fn mult_dir(&self, dir: &Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }
    
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }
    
    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }
    
    fn mult_point(&self, point: &Vec3) -> Vec3 {
        let h = self * Vec4::new(point.x, point.y, point.z, 1.0);
        if h.w != 0.0 && h.w != 1.0 {
            Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        } else {
            h.xyz()
        }
    }
    
    fn mult_dir(&self, dir: &Vec3) -> Vec3 {
        self.fixed_view::<3, 3>(0, 0) * dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    
    #[test]
    fn test_mult_point_applies_translation() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(m.mult_point(&Vec3::zeros()), Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(m.mult_dir(&Vec3::x()), Vec3::x());
    }
    
    #[test]
    fn test_rotation_y_quarter_turn() {
        let m = Mat4::rotation_y(constants::HALF_PI);
        assert_relative_eq!(m.mult_dir(&Vec3::x()), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }
    
    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 0.0, 1.0));
        assert!(m.try_inverse().is_none());
    }
}
