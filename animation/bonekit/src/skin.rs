//! Vertex to joint bindings carried alongside a skeleton
//!
//! The engine never edits skin data. It validates it against a skeleton and
//! offers a CPU reference for linear blend skinning.

use glam::Vec3;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;

/// Up to two joint influences on one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SkinBinding {
    /// Bind-pose vertex position
    pub vertex: Vec3,
    /// Primary joint
    pub joint0: usize,
    /// Secondary joint, if the vertex is shared
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub joint1: Option<usize>,
    /// Weight of `joint0`; `joint1` gets the rest
    pub weight0: f32,
}

impl SkinBinding {
    /// Vertex bound to a single joint
    pub const fn rigid(vertex: Vec3, joint: usize) -> Self {
        Self {
            vertex,
            joint0: joint,
            joint1: None,
            weight0: 1.0,
        }
    }

    /// Weight given to `joint1`
    pub fn weight1(&self) -> f32 {
        if self.joint1.is_some() {
            1.0 - self.weight0
        } else {
            0.0
        }
    }

    /// Check joint references and weight against a skeleton
    pub fn validate(&self, skeleton: &Skeleton) -> Result<()> {
        for joint in std::iter::once(self.joint0).chain(self.joint1) {
            if joint >= skeleton.len() {
                return Err(RigError::SkinBinding(format!(
                    "joint {joint} not in skeleton of {} joints",
                    skeleton.len()
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.weight0) {
            return Err(RigError::SkinBinding(format!("weight {} outside [0, 1]", self.weight0)));
        }
        Ok(())
    }

    /// Vertex relative to the primary joint's bind position
    pub fn offset_from_joint0(&self, skeleton: &Skeleton) -> Option<Vec3> {
        skeleton
            .joint(self.joint0)
            .map(|joint| self.vertex - joint.bind_position())
    }

    /// Vertex relative to the secondary joint's bind position
    pub fn offset_from_joint1(&self, skeleton: &Skeleton) -> Option<Vec3> {
        let joint = skeleton.joint(self.joint1?)?;
        Some(self.vertex - joint.bind_position())
    }
}

/// Deformed position of one bound vertex under the skeleton's current pose.
///
/// Each influencing joint maps the bind vertex through `D · U⁻¹`; the results
/// are blended linearly by weight.
pub fn skin_vertex(skeleton: &Skeleton, binding: &SkinBinding) -> Result<Vec3> {
    binding.validate(skeleton)?;

    let skinned = |index: usize| {
        skeleton.joints()[index]
            .skinning_transform()
            .transform_point3(binding.vertex)
    };

    let mut position = skinned(binding.joint0) * binding.weight0;
    match binding.joint1 {
        Some(joint1) => position += skinned(joint1) * binding.weight1(),
        // A lone joint with weight below one keeps the rest in bind pose
        None => position += binding.vertex * (1.0 - binding.weight0),
    }
    Ok(position)
}

/// Validate every binding, reporting the first bad one by its index
pub fn validate_all(skeleton: &Skeleton, bindings: &[SkinBinding]) -> Result<()> {
    for (index, binding) in bindings.iter().enumerate() {
        binding.validate(skeleton).map_err(|err| match err {
            RigError::SkinBinding(message) => {
                RigError::SkinBinding(format!("vertex {index}: {message}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointSpec;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn skeleton() -> Skeleton {
        Skeleton::new(&[
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
        ])
        .unwrap()
    }

    #[test]
    fn test_bind_pose_is_identity() {
        let skeleton = skeleton();
        let binding = SkinBinding {
            vertex: Vec3::new(0.2, 1.5, 0.0),
            joint0: 0,
            joint1: Some(1),
            weight0: 0.3,
        };
        let skinned = skin_vertex(&skeleton, &binding).unwrap();
        assert!(skinned.abs_diff_eq(binding.vertex, 1e-6));
    }

    #[test]
    fn test_rigid_binding_follows_joint() {
        let mut skeleton = skeleton();
        skeleton
            .apply_rotation(0, Quat::from_rotation_z(FRAC_PI_2))
            .unwrap();
        let binding = SkinBinding::rigid(Vec3::Y, 0);
        let skinned = skin_vertex(&skeleton, &binding).unwrap();
        assert!(skinned.abs_diff_eq(skeleton.joints()[0].position(), 1e-5));
    }

    #[test]
    fn test_offsets() {
        let skeleton = skeleton();
        let binding = SkinBinding {
            vertex: Vec3::new(1.0, 2.0, 0.0),
            joint0: 0,
            joint1: Some(1),
            weight0: 0.5,
        };
        assert_eq!(
            binding.offset_from_joint0(&skeleton),
            Some(Vec3::new(1.0, 1.0, 0.0))
        );
        assert_eq!(binding.offset_from_joint1(&skeleton), Some(Vec3::X));
        assert_eq!(
            SkinBinding::rigid(Vec3::ZERO, 0).offset_from_joint1(&skeleton),
            None
        );
    }

    #[test]
    fn test_validation_errors() {
        let skeleton = skeleton();
        let unknown = SkinBinding::rigid(Vec3::ZERO, 4);
        assert!(matches!(unknown.validate(&skeleton), Err(RigError::SkinBinding(_))));

        let heavy = SkinBinding {
            weight0: 1.5,
            ..SkinBinding::rigid(Vec3::ZERO, 0)
        };
        assert!(heavy.validate(&skeleton).is_err());

        let err =
            validate_all(&skeleton, &[SkinBinding::rigid(Vec3::ZERO, 1), unknown]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Skin binding error: vertex 1: joint 4 not in skeleton of 2 joints"
        );
    }
}
