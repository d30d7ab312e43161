//! Matrix and quaternion helpers shared by the transform caches
//!
//! All matrices are column-major `glam` matrices. The translation of a
//! transform lives in `w_axis`.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Axis used when a bone has no usable direction
pub const FALLBACK_AXIS: Vec3 = Vec3::Y;

/// Translation component of an affine transform
#[inline]
pub fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Copy of `m` with its translation column zeroed
#[inline]
pub fn without_translation(m: &Mat4) -> Mat4 {
    let mut stripped = *m;
    stripped.w_axis = glam::Vec4::W;
    stripped
}

/// Rotation held by an affine transform.
///
/// The translation is removed first; quaternion extraction only reads a pure
/// rotation block. The result is normalized.
pub fn rotation_of(m: &Mat4) -> Quat {
    let stripped = without_translation(m);
    normalized(Quat::from_mat3(&Mat3::from_mat4(stripped))).unwrap_or(Quat::IDENTITY)
}

/// Unit-length copy of `q`, or `None` when it has no usable direction
pub fn normalized(q: Quat) -> Option<Quat> {
    let len = q.length();
    (len.is_finite() && len > f32::EPSILON).then(|| q / len)
}

/// Pure rotation matrix for a quaternion; degenerate input maps to identity
#[inline]
pub fn rotation_matrix(q: Quat) -> Mat4 {
    Mat4::from_quat(normalized(q).unwrap_or(Quat::IDENTITY))
}

/// Rotation of `angle` radians about `axis`, falling back to
/// [`FALLBACK_AXIS`] for a zero-length axis
pub fn axis_angle(axis: Vec3, angle: f32) -> Quat {
    let axis = axis.try_normalize().unwrap_or(FALLBACK_AXIS);
    Quat::from_axis_angle(axis, angle)
}

/// Whether two quaternions describe the same rotation (q and -q are equal)
pub fn same_rotation(a: Quat, b: Quat, epsilon: f32) -> bool {
    a.dot(b).abs() >= 1.0 - epsilon
}

/// Rotation angle in radians, in `[0, PI]`
pub fn rotation_angle(q: Quat) -> f32 {
    let w = q.normalize().w.abs().min(1.0);
    2.0 * w.acos()
}

/// Whether `m` is finite with a determinant large enough to invert
pub fn is_invertible(m: &Mat4, epsilon: f32) -> bool {
    let det = m.determinant();
    m.is_finite() && det.is_finite() && det.abs() > epsilon
}
