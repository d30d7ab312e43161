//! Blending between two keyframes and mapping play time onto them

use glam::Quat;

use crate::error::{Result, RigError};
use crate::keyframe::{Keyframe, KeyframeStore};
use crate::skeleton::Skeleton;

/// Pose the skeleton between keyframes `a` and `b`.
///
/// Per joint the relative orientation and the accumulated roll are blended by
/// spherical interpolation. The blended relative orientation becomes the
/// joint's local rotation `T`, then the whole skeleton is recomputed parents
/// first. `t` is clamped to `[0, 1]`.
///
/// At `t = 0` and `t = 1` the matching keyframe is applied as stored, so a
/// drifted `T` saved without orthonormalization comes back bit for bit.
pub fn interpolate(skeleton: &mut Skeleton, a: &Keyframe, b: &Keyframe, t: f32) -> Result<()> {
    a.check_compatible(skeleton)?;
    b.check_compatible(skeleton)?;
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    if t == 0.0 {
        return skeleton.apply_keyframe(a);
    }
    if t == 1.0 {
        return skeleton.apply_keyframe(b);
    }

    for (index, (from, to)) in a.joints().iter().zip(b.joints()).enumerate() {
        let rotation = from.relative_orientation.slerp(to.relative_orientation, t);
        let roll = from.roll_rotation().slerp(to.roll_rotation(), t);
        skeleton.assign_local(index, rotation, roll, true);
    }

    skeleton.refresh_all();
    log::trace!("Interpolated {} joints at t = {t}", skeleton.len());
    Ok(())
}

/// Per-joint blend of the two keyframes' world orientations (`D · U⁻¹`).
///
/// Handy for previews; the posed skeleton does not depend on it.
pub fn blend_world_orientations(a: &Keyframe, b: &Keyframe, t: f32) -> Result<Vec<Quat>> {
    if a.len() != b.len() {
        return Err(RigError::JointCountMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    Ok(a.joints()
        .iter()
        .zip(b.joints())
        .map(|(from, to)| from.world_rotation().slerp(to.world_rotation(), t))
        .collect())
}

/// What a play time resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSample {
    /// Show one keyframe as stored
    Hold(usize),
    /// Blend between two adjacent keyframes
    Blend {
        from: usize,
        to: usize,
        fraction: f32,
    },
}

impl FrameSample {
    /// Index of the keyframe at or before the sample
    pub fn base(&self) -> usize {
        match *self {
            Self::Hold(index) => index,
            Self::Blend { from, .. } => from,
        }
    }
}

/// Maps continuous play time onto keyframe indices; one time unit per
/// keyframe gap
pub struct PlaybackCursor;

impl PlaybackCursor {
    /// Resolve `play_time` against `count` keyframes.
    ///
    /// Times at or before zero hold the first keyframe, times at or past the
    /// last keyframe hold it. Returns `None` without keyframes.
    pub fn resolve(play_time: f32, count: usize) -> Option<FrameSample> {
        if count == 0 {
            return None;
        }
        let last = count - 1;

        if play_time.is_nan() || play_time <= 0.0 {
            return Some(FrameSample::Hold(0));
        }

        let frame = play_time.floor();
        if frame >= last as f32 {
            return Some(FrameSample::Hold(last));
        }

        let from = frame as usize;
        Some(FrameSample::Blend {
            from,
            to: from + 1,
            fraction: play_time - frame,
        })
    }

    /// Largest meaningful play time for `count` keyframes
    pub fn duration(count: usize) -> f32 {
        count.saturating_sub(1) as f32
    }
}

impl KeyframeStore {
    /// Blend stored keyframes `from` and `to` onto the skeleton
    pub fn interpolate(
        &self,
        from: usize,
        to: usize,
        t: f32,
        skeleton: &mut Skeleton,
    ) -> Result<()> {
        let a = self.checked(from)?;
        let b = self.checked(to)?;
        interpolate(skeleton, a, b, t)
    }

    /// Pose the skeleton for a play time and report what was shown.
    ///
    /// An empty store leaves the skeleton untouched and yields `None`.
    pub fn sample(&self, play_time: f32, skeleton: &mut Skeleton) -> Result<Option<FrameSample>> {
        let Some(sample) = PlaybackCursor::resolve(play_time, self.len()) else {
            return Ok(None);
        };

        match sample {
            FrameSample::Hold(index) => self.apply_to_skeleton(index, skeleton)?,
            FrameSample::Blend { from, to, fraction } => {
                self.interpolate(from, to, fraction, skeleton)?;
            }
        }
        Ok(Some(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointSpec;
    use crate::math;
    use crate::options::RigOptions;
    use glam::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn two_poses() -> (Skeleton, Keyframe, Keyframe) {
        let mut skeleton = Skeleton::new(&[
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
        ])
        .unwrap();
        let a = Keyframe::capture(&skeleton);
        skeleton
            .apply_rotation(0, Quat::from_rotation_z(FRAC_PI_2))
            .unwrap();
        skeleton.apply_roll(1, 0.5).unwrap();
        let b = Keyframe::capture(&skeleton);
        skeleton.reset_pose();
        (skeleton, a, b)
    }

    #[test]
    fn test_endpoints_reproduce_keyframes() {
        let (mut skeleton, a, b) = two_poses();

        interpolate(&mut skeleton, &a, &b, 0.0).unwrap();
        for (joint, pose) in skeleton.joints().iter().zip(a.joints()) {
            assert!(
                joint
                    .current_transform()
                    .abs_diff_eq(pose.current_transform, 1e-5)
            );
        }

        interpolate(&mut skeleton, &a, &b, 1.0).unwrap();
        for (joint, pose) in skeleton.joints().iter().zip(b.joints()) {
            assert!(
                joint
                    .current_transform()
                    .abs_diff_eq(pose.current_transform, 1e-5)
            );
            assert!(math::same_rotation(joint.orientation(), pose.orientation, 1e-5));
        }
    }

    #[test]
    fn test_endpoints_keep_drifted_local_rotation() {
        let options = RigOptions {
            orthonormalize: false,
            ..RigOptions::default()
        };
        let mut skeleton = Skeleton::from_specs(
            &[
                JointSpec::root(0, Vec3::Y),
                JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
                JointSpec::child(2, Vec3::new(1.0, 2.0, 0.0), 1),
            ],
            options,
        )
        .unwrap();
        let a = Keyframe::capture(&skeleton);

        let drag = Quat::from_euler(glam::EulerRot::XYZ, 0.013, -0.029, 0.041);
        for step in 0..2000 {
            skeleton.apply_rotation(step % 3, drag).unwrap();
        }
        let b = Keyframe::capture(&skeleton);
        skeleton.reset_pose();

        interpolate(&mut skeleton, &a, &b, 1.0).unwrap();
        assert_eq!(Keyframe::capture(&skeleton), b);
        for (joint, pose) in skeleton.joints().iter().zip(b.joints()) {
            assert_eq!(*joint.local_rotation(), pose.local_rotation);
        }

        interpolate(&mut skeleton, &a, &b, 0.0).unwrap();
        assert_eq!(Keyframe::capture(&skeleton), a);
    }

    #[test]
    fn test_midpoint_is_half_angle() {
        let (mut skeleton, a, b) = two_poses();
        interpolate(&mut skeleton, &a, &b, 0.5).unwrap();
        let angle = math::rotation_angle(skeleton.joints()[0].relative_orientation());
        assert!((angle - FRAC_PI_2 / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_t_is_clamped() {
        let (mut skeleton, a, b) = two_poses();
        interpolate(&mut skeleton, &a, &b, 3.0).unwrap();
        let over = Keyframe::capture(&skeleton);
        interpolate(&mut skeleton, &a, &b, 1.0).unwrap();
        let end = Keyframe::capture(&skeleton);
        assert_eq!(over, end);
    }

    #[test]
    fn test_world_blend() {
        let (_, a, b) = two_poses();
        let blended = blend_world_orientations(&a, &b, 0.5).unwrap();
        assert_eq!(blended.len(), 2);
        assert!(math::same_rotation(blended[0], Quat::from_rotation_z(FRAC_PI_2 / 2.0), 1e-5));
    }

    #[test]
    fn test_resolve_play_time() {
        assert_eq!(PlaybackCursor::resolve(0.5, 0), None);
        assert_eq!(PlaybackCursor::resolve(-1.0, 3), Some(FrameSample::Hold(0)));
        assert_eq!(PlaybackCursor::resolve(0.0, 3), Some(FrameSample::Hold(0)));
        assert_eq!(
            PlaybackCursor::resolve(1.25, 3),
            Some(FrameSample::Blend {
                from: 1,
                to: 2,
                fraction: 0.25
            })
        );
        assert_eq!(PlaybackCursor::resolve(2.0, 3), Some(FrameSample::Hold(2)));
        assert_eq!(PlaybackCursor::resolve(7.5, 3), Some(FrameSample::Hold(2)));
        assert_eq!(PlaybackCursor::resolve(0.7, 1), Some(FrameSample::Hold(0)));
        assert_eq!(
            PlaybackCursor::resolve(f32::NAN, 2),
            Some(FrameSample::Hold(0))
        );
        assert_eq!(PlaybackCursor::duration(4), 3.0);
    }

    #[test]
    fn test_store_sample() {
        let (mut skeleton, a, b) = two_poses();
        let store = KeyframeStore::from_keyframes(vec![a, b.clone()]);

        let sample = store.sample(9.0, &mut skeleton).unwrap();
        assert_eq!(sample, Some(FrameSample::Hold(1)));
        assert_eq!(Keyframe::capture(&skeleton), b);

        assert!(store.interpolate(0, 2, 0.5, &mut skeleton).is_err());
        assert_eq!(
            KeyframeStore::new().sample(1.0, &mut skeleton).unwrap(),
            None
        );
    }
}
