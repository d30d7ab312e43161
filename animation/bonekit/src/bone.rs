//! Bone segments for drawing and ray picking
//!
//! A bone runs from the parent's current position (the joint's frame origin
//! for roots) to the joint's current position.

use glam::{Mat4, Quat, Vec3};

use crate::math::FALLBACK_AXIS;
use crate::skeleton::Skeleton;

/// Current world-space segment of one bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSegment {
    pub joint: usize,
    pub start: Vec3,
    pub end: Vec3,
}

impl BoneSegment {
    /// Segment of joint `index`, `None` if it does not exist
    pub fn of(skeleton: &Skeleton, index: usize) -> Option<Self> {
        let joint = skeleton.joint(index)?;
        let start = match joint.parent() {
            Some(parent) => skeleton.joints()[parent].position(),
            None => joint.origin(),
        };
        Some(Self {
            joint: index,
            start,
            end: joint.position(),
        })
    }

    /// Segments of every joint in index order
    pub fn all(skeleton: &Skeleton) -> Vec<Self> {
        (0..skeleton.len())
            .filter_map(|index| Self::of(skeleton, index))
            .collect()
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit direction from start to end
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start)
            .try_normalize()
            .unwrap_or(FALLBACK_AXIS)
    }

    /// Transform taking a unit cylinder (radius 1, height `[0, 1]` along `+Y`)
    /// onto this bone
    pub fn cylinder_transform(&self, radius: f32) -> Mat4 {
        let rotation = Quat::from_rotation_arc(Vec3::Y, self.direction());
        Mat4::from_scale_rotation_translation(
            Vec3::new(radius, self.length(), radius),
            rotation,
            self.start,
        )
    }

    /// Ray parameter of the nearest intersection with this bone's cylinder.
    ///
    /// `direction` must be normalized. Rays running parallel to the bone never
    /// hit; neither do zero-length bones.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3, radius: f32) -> Option<f32> {
        let height = self.length();
        if height <= f32::EPSILON {
            return None;
        }
        let axis = self.direction();

        let w = origin - self.start;
        let d_perp = direction - direction.dot(axis) * axis;
        let w_perp = w - w.dot(axis) * axis;

        let a = d_perp.length_squared();
        if a <= 1e-12 {
            return None;
        }
        let b = 2.0 * d_perp.dot(w_perp);
        let c = w_perp.length_squared() - radius * radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
            .into_iter()
            .filter(|&t| t >= 0.0)
            .find(|&t| {
                let along = (w + t * direction).dot(axis);
                (0.0..=height).contains(&along)
            })
    }
}

/// Index of the bone closest along the ray, if any is hit
pub fn pick_bone(skeleton: &Skeleton, origin: Vec3, direction: Vec3, radius: f32) -> Option<usize> {
    let direction = direction.try_normalize()?;
    BoneSegment::all(skeleton)
        .iter()
        .filter_map(|bone| {
            bone.intersect_ray(origin, direction, radius)
                .map(|t| (bone.joint, t))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(joint, _)| joint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointSpec;

    fn skeleton() -> Skeleton {
        Skeleton::new(&[
            JointSpec::root(0, Vec3::new(0.0, 1.0, 0.0)),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
            JointSpec::child(2, Vec3::new(1.0, 2.0, 0.0), 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_segments_follow_parents() {
        let bones = BoneSegment::all(&skeleton());
        assert!(bones[0].start.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(bones[0].end.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(bones[2].start.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-6));
        assert!(bones[2].direction().abs_diff_eq(Vec3::X, 1e-6));
        assert!((bones[2].length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cylinder_transform_maps_ends() {
        let bone = BoneSegment::of(&skeleton(), 2).unwrap();
        let m = bone.cylinder_transform(0.1);
        assert!(m.transform_point3(Vec3::ZERO).abs_diff_eq(bone.start, 1e-6));
        assert!(m.transform_point3(Vec3::Y).abs_diff_eq(bone.end, 1e-5));
        assert!((m.transform_vector3(Vec3::X).length() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_pick_nearest_bone() {
        let skeleton = skeleton();
        // Looking down -Z at the middle of bone 1
        let hit = pick_bone(&skeleton, Vec3::new(0.0, 1.5, 5.0), -Vec3::Z, 0.1);
        assert_eq!(hit, Some(1));

        let hit = pick_bone(&skeleton, Vec3::new(0.5, 2.0, 5.0), -Vec3::Z, 0.1);
        assert_eq!(hit, Some(2));

        let miss = pick_bone(&skeleton, Vec3::new(3.0, 3.0, 5.0), -Vec3::Z, 0.1);
        assert_eq!(miss, None);
    }

    #[test]
    fn test_parallel_ray_skipped() {
        let bone = BoneSegment::of(&skeleton(), 1).unwrap();
        assert_eq!(
            bone.intersect_ray(Vec3::new(0.0, -5.0, 0.0), Vec3::Y, 0.1),
            None
        );
    }

    #[test]
    fn test_picking_follows_pose() {
        let mut skeleton = skeleton();
        skeleton
            .apply_rotation(0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
            .unwrap();
        // Bone 0 now points along -X
        let hit = pick_bone(&skeleton, Vec3::new(-0.5, 0.0, 5.0), -Vec3::Z, 0.1);
        assert_eq!(hit, Some(0));
    }
}
