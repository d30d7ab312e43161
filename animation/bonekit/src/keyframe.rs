//! Captured full-skeleton poses
//!
//! A [`Keyframe`] is a deep copy of every joint's transform state. The
//! [`KeyframeStore`] keeps them in capture order; indices shift down on
//! removal and any index held outside the store must be reselected.

use glam::{Mat4, Quat};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};
use crate::skeleton::Skeleton;

/// Tolerance when checking a keyframe's bind transforms against a skeleton
pub const BIND_POSE_TOLERANCE: f32 = 1e-4;

/// Opaque handle to a rendered thumbnail owned by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(pub u64);

/// Transform state of one joint inside a keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct JointPose {
    /// Local rotation `T`
    pub local_rotation: Mat4,
    /// Current transform `D`
    pub current_transform: Mat4,
    /// Bind transform `U`
    pub bind_transform: Mat4,
    /// World orientation
    pub orientation: Quat,
    /// Orientation relative to the parent
    pub relative_orientation: Quat,
    /// Accumulated roll about the bone axis
    #[cfg_attr(feature = "serde-support", serde(default = "identity"))]
    pub total_roll: Mat4,
}

#[cfg(feature = "serde-support")]
fn identity() -> Mat4 {
    Mat4::IDENTITY
}

impl JointPose {
    /// Rotation of `D · U⁻¹`, the world orientation relative to the bind pose
    pub fn world_rotation(&self) -> Quat {
        crate::math::rotation_of(&(self.current_transform * self.bind_transform.inverse()))
    }

    /// Roll as a quaternion
    pub fn roll_rotation(&self) -> Quat {
        crate::math::rotation_of(&self.total_roll)
    }
}

/// Snapshot of a whole skeleton's pose
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Keyframe {
    joints: Vec<JointPose>,
    #[cfg_attr(feature = "serde-support", serde(skip))]
    preview: Option<PreviewHandle>,
}

impl Keyframe {
    /// Copy the current pose of every joint, in index order
    pub fn capture(skeleton: &Skeleton) -> Self {
        let joints = skeleton
            .joints()
            .iter()
            .map(|joint| JointPose {
                local_rotation: *joint.local_rotation(),
                current_transform: *joint.current_transform(),
                bind_transform: *joint.bind_transform(),
                orientation: joint.orientation(),
                relative_orientation: joint.relative_orientation(),
                total_roll: *joint.total_roll(),
            })
            .collect();

        Self {
            joints,
            preview: None,
        }
    }

    /// Build a keyframe from stored joint poses
    pub fn from_joints(joints: Vec<JointPose>) -> Self {
        Self {
            joints,
            preview: None,
        }
    }

    pub fn joints(&self) -> &[JointPose] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&JointPose> {
        self.joints.get(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.preview
    }

    pub fn set_preview(&mut self, preview: Option<PreviewHandle>) {
        self.preview = preview;
    }

    /// Check that this keyframe was captured from a skeleton with the same
    /// joints and bind pose
    pub fn check_compatible(&self, skeleton: &Skeleton) -> Result<()> {
        if self.joints.len() != skeleton.len() {
            return Err(RigError::JointCountMismatch {
                expected: skeleton.len(),
                found: self.joints.len(),
            });
        }

        for (index, (pose, joint)) in self.joints.iter().zip(skeleton.joints()).enumerate() {
            if !pose
                .bind_transform
                .abs_diff_eq(*joint.bind_transform(), BIND_POSE_TOLERANCE)
            {
                return Err(RigError::BindPoseMismatch { joint: index });
            }
        }

        Ok(())
    }
}

impl Skeleton {
    /// Write a keyframe's pose onto this skeleton and refresh every joint.
    ///
    /// The keyframe is validated first; on error the skeleton is untouched.
    /// Bind transforms are compared, never written, so `U` stays as loaded.
    pub fn apply_keyframe(&mut self, keyframe: &Keyframe) -> Result<()> {
        keyframe.check_compatible(self)?;

        for (index, pose) in keyframe.joints.iter().enumerate() {
            let joint = self.joint_mut(index);
            joint.t = pose.local_rotation;
            joint.d = pose.current_transform;
            joint.orientation = pose.orientation;
            joint.rel_orientation = pose.relative_orientation;
            joint.total_roll = pose.total_roll;
        }

        // Several joints changed at once, so cascade over the whole skeleton
        self.refresh_all();
        Ok(())
    }
}

/// Ordered sequence of captured keyframes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(transparent))]
pub struct KeyframeStore {
    keyframes: Vec<Keyframe>,
}

impl KeyframeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-built keyframes, e.g. ones restored from disk
    pub fn from_keyframes(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// Append the skeleton's current pose and return its index
    pub fn capture(&mut self, skeleton: &Skeleton) -> usize {
        self.keyframes.push(Keyframe::capture(skeleton));
        let index = self.keyframes.len() - 1;
        log::debug!("Captured keyframe {index} ({} joints)", skeleton.len());
        index
    }

    /// Recapture the skeleton's current pose over an existing keyframe
    pub fn overwrite(&mut self, index: usize, skeleton: &Skeleton) -> Result<()> {
        self.check_index(index)?;
        let preview = self.keyframes[index].preview;
        let mut keyframe = Keyframe::capture(skeleton);
        keyframe.preview = preview;
        self.keyframes[index] = keyframe;
        log::debug!("Overwrote keyframe {index}");
        Ok(())
    }

    /// Remove a keyframe; later keyframes move down by one
    pub fn remove(&mut self, index: usize) -> Result<Keyframe> {
        self.check_index(index)?;
        let removed = self.keyframes.remove(index);
        log::debug!(
            "Removed keyframe {index}, {} remaining",
            self.keyframes.len()
        );
        Ok(removed)
    }

    /// Pose the skeleton as stored at `index`
    pub fn apply_to_skeleton(&self, index: usize, skeleton: &mut Skeleton) -> Result<()> {
        skeleton.apply_keyframe(self.checked(index)?)?;
        log::trace!("Applied keyframe {index}");
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Keyframe> {
        self.keyframes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe> {
        self.keyframes.iter()
    }

    /// Replace the whole sequence, returning the previous one
    pub fn replace_all(&mut self, keyframes: Vec<Keyframe>) -> Vec<Keyframe> {
        std::mem::replace(&mut self.keyframes, keyframes)
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        self.checked(index).map(|_| ())
    }

    pub(crate) fn checked(&self, index: usize) -> Result<&Keyframe> {
        self.keyframes.get(index).ok_or(RigError::KeyframeIndex {
            index,
            len: self.keyframes.len(),
        })
    }
}

impl<'a> IntoIterator for &'a KeyframeStore {
    type Item = &'a Keyframe;
    type IntoIter = std::slice::Iter<'a, Keyframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.keyframes.iter()
    }
}
