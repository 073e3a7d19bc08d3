//! Math utilities and types
//!
//! Provides the nalgebra aliases used throughout the crate and the
//! decomposed translation/rotation/scale representation of a transform.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

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

/// Scale components below this magnitude are treated as collapsed axes
pub const SCALE_EPSILON: f32 = 1e-8;

/// Decomposed transform: position, rotation and scale channels
///
/// Composes in TRS order (`translation * rotation * scale`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three channels
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Create a transform from a transformation matrix
    ///
    /// Shear is discarded. A collapsed (zero) scale axis keeps an identity
    /// basis column so the rotation stays well defined.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let position = translation_of(&matrix);

        let scale_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31).magnitude();
        let scale_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32).magnitude();
        let scale_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33).magnitude();
        let scale = Vec3::new(scale_x, scale_y, scale_z);

        let divisor = |s: f32| if s.abs() < SCALE_EPSILON { 1.0 } else { s };
        let (dx, dy, dz) = (divisor(scale_x), divisor(scale_y), divisor(scale_z));

        let rotation_matrix = Mat3::new(
            matrix.m11 / dx, matrix.m12 / dy, matrix.m13 / dz,
            matrix.m21 / dx, matrix.m22 / dy, matrix.m23 / dz,
            matrix.m31 / dx, matrix.m32 / dy, matrix.m33 / dz,
        );
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Combine this transform with another (`self` is the parent)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Translation column of an affine matrix
pub fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Component-wise division that leaves collapsed divisor axes untouched
pub fn safe_component_div(value: &Vec3, divisor: &Vec3) -> Vec3 {
    Vec3::new(
        if divisor.x.abs() < SCALE_EPSILON { value.x } else { value.x / divisor.x },
        if divisor.y.abs() < SCALE_EPSILON { value.y } else { value.y / divisor.y },
        if divisor.z.abs() < SCALE_EPSILON { value.z } else { value.z / divisor.z },
    )
}
