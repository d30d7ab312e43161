//! Formatting utilities

use glam::{Quat, Vec3};

/// Format a point or vector with three decimals
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a rotation as angle in degrees about its axis
pub fn format_rotation(q: Quat) -> String {
    let (axis, angle) = q.to_axis_angle();
    let degrees = angle.to_degrees();
    if degrees.abs() < 0.05 {
        "identity".to_string()
    } else {
        format!("{degrees:.1}° about {}", format_vec3(axis))
    }
}

/// Format an optional parent index, `-` for roots
pub fn format_parent(parent: Option<usize>) -> String {
    parent.map_or_else(|| "-".to_string(), |p| p.to_string())
}
