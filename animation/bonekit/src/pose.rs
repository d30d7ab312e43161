//! Interactive joint rotation and rolling
//!
//! Edits touch a single joint's local rotation `T` (or its accumulated roll)
//! and then cascade forward kinematics through that joint's subtree only.

use glam::{Mat4, Quat};

use crate::error::Result;
use crate::math;
use crate::options::BindSeed;
use crate::skeleton::Skeleton;

impl Skeleton {
    /// Rotate a joint by `delta`, expressed in world-relative axes.
    ///
    /// The delta is composed on the left (`T = delta · T`), so the rotation
    /// axis stays fixed relative to the viewer rather than the bone. The
    /// joint's relative orientation is re-extracted from the new `T`, and the
    /// joint and all descendants are recomputed parents first.
    ///
    /// A delta without a usable direction (zero length or NaN) leaves the pose
    /// untouched.
    pub fn apply_rotation(&mut self, index: usize, delta: Quat) -> Result<()> {
        self.check_joint(index)?;
        let Some(delta) = math::normalized(delta) else {
            log::warn!("Ignoring degenerate rotation {delta:?} for joint {index}");
            return Ok(());
        };

        let orthonormalize = self.options().orthonormalize;
        let joint = self.joint_mut(index);
        let t = Mat4::from_quat(delta) * joint.t;
        let rel = math::rotation_of(&t);
        joint.t = if orthonormalize {
            Mat4::from_quat(rel)
        } else {
            t
        };
        joint.rel_orientation = rel;

        self.update_subtree(index);
        log::trace!("Rotated joint {index} by {delta:?}");
        Ok(())
    }

    /// Twist a joint's bone about its own current axis by `angle` radians.
    ///
    /// The twist accumulates into the joint's total roll. With the default
    /// parent-seeded frames the axis is the bone as currently swung by `T`, so
    /// the bone end stays put while descendants twist around it. With
    /// own-position frames the axis is the fixed bone from the parent.
    pub fn apply_roll(&mut self, index: usize, angle: f32) -> Result<()> {
        self.check_joint(index)?;
        if !angle.is_finite() {
            log::warn!("Ignoring non-finite roll for joint {index}");
            return Ok(());
        }

        let bind_seed = self.options().bind_seed;
        let orthonormalize = self.options().orthonormalize;
        let joint = self.joint_mut(index);

        let axis = if joint.degenerate {
            math::FALLBACK_AXIS
        } else {
            match bind_seed {
                BindSeed::ParentPosition => {
                    (joint.total_roll * joint.t).transform_vector3(joint.bone)
                }
                BindSeed::OwnPosition => joint.bone,
            }
        };

        let roll = Mat4::from_quat(math::axis_angle(axis, angle)) * joint.total_roll;
        joint.total_roll = if orthonormalize {
            Mat4::from_quat(math::rotation_of(&roll))
        } else {
            roll
        };

        self.update_subtree(index);
        log::trace!("Rolled joint {index} by {angle} rad");
        Ok(())
    }

    /// Replace a joint's local rotation outright
    pub fn set_local_rotation(&mut self, index: usize, rotation: Quat) -> Result<()> {
        self.check_joint(index)?;
        self.assign_local(index, rotation, Quat::IDENTITY, false);
        self.update_subtree(index);
        Ok(())
    }

    /// Return every joint to the bind pose
    pub fn reset_pose(&mut self) {
        for index in 0..self.len() {
            self.assign_local(index, Quat::IDENTITY, Quat::IDENTITY, true);
        }
        self.refresh_all();
    }

    /// Set `T` and the relative orientation from a quaternion, optionally the
    /// roll too. Forward kinematics is left to the caller.
    pub(crate) fn assign_local(
        &mut self,
        index: usize,
        rotation: Quat,
        roll: Quat,
        set_roll: bool,
    ) {
        let rotation = math::normalized(rotation).unwrap_or(Quat::IDENTITY);
        let joint = self.joint_mut(index);
        joint.t = Mat4::from_quat(rotation);
        joint.rel_orientation = rotation;
        if set_roll {
            joint.total_roll = math::rotation_matrix(roll);
        }
    }
}
