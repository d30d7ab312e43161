//! Interactive editing state
//!
//! An [`EditSession`] owns the live skeleton and its keyframes together with
//! everything the input layer used to keep globally: the selected joint and
//! keyframe, the play time and whether playback runs. Pose changes are
//! reported to registered [`PoseObserver`]s.

use glam::Quat;

use crate::error::{Result, RigError};
use crate::interpolate::{FrameSample, PlaybackCursor};
use crate::keyframe::KeyframeStore;
use crate::skeleton::{PoseCache, Skeleton};

/// Something that changed the pose or the keyframe sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseEvent {
    JointRotated { joint: usize },
    JointRolled { joint: usize },
    KeyframeCaptured { index: usize },
    KeyframeOverwritten { index: usize },
    KeyframeRemoved { index: usize },
    KeyframeApplied { index: usize },
    PlaybackSampled { time: f32, sample: FrameSample },
}

/// Receiver of pose change notifications, typically a renderer that needs to
/// re-upload joint transforms or refresh a keyframe preview
pub trait PoseObserver {
    fn pose_changed(&mut self, event: &PoseEvent);
}

impl<F: FnMut(&PoseEvent)> PoseObserver for F {
    fn pose_changed(&mut self, event: &PoseEvent) {
        self(event);
    }
}

/// Live skeleton, keyframes and selection state of one editing session
pub struct EditSession {
    skeleton: Skeleton,
    keyframes: KeyframeStore,
    selected_joint: Option<usize>,
    selected_keyframe: Option<usize>,
    play_time: f32,
    playing: bool,
    pose_dirty: bool,
    observers: Vec<Box<dyn PoseObserver>>,
}

impl EditSession {
    pub fn new(skeleton: Skeleton) -> Self {
        Self::with_keyframes(skeleton, KeyframeStore::new())
    }

    /// Session over previously saved keyframes
    pub fn with_keyframes(skeleton: Skeleton, keyframes: KeyframeStore) -> Self {
        Self {
            skeleton,
            keyframes,
            selected_joint: None,
            selected_keyframe: None,
            play_time: 0.0,
            playing: false,
            pose_dirty: true,
            observers: Vec::new(),
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn keyframes(&self) -> &KeyframeStore {
        &self.keyframes
    }

    /// Give back the skeleton and keyframes
    pub fn into_parts(self) -> (Skeleton, KeyframeStore) {
        (self.skeleton, self.keyframes)
    }

    pub fn add_observer(&mut self, observer: impl PoseObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, event: PoseEvent) {
        for observer in &mut self.observers {
            observer.pose_changed(&event);
        }
    }

    fn pose_changed(&mut self, event: PoseEvent) {
        self.pose_dirty = true;
        self.notify(event);
    }

    // Joint selection

    pub fn selected_joint(&self) -> Option<usize> {
        self.selected_joint
    }

    pub fn select_joint(&mut self, joint: usize) -> Result<()> {
        if joint >= self.skeleton.len() {
            return Err(RigError::JointIndex {
                index: joint,
                len: self.skeleton.len(),
            });
        }
        self.selected_joint = Some(joint);
        Ok(())
    }

    pub fn clear_joint_selection(&mut self) {
        self.selected_joint = None;
    }

    /// Select the following joint, wrapping to the first
    pub fn select_next_joint(&mut self) -> usize {
        let count = self.skeleton.len();
        let next = self.selected_joint.map_or(0, |joint| (joint + 1) % count);
        self.selected_joint = Some(next);
        next
    }

    /// Select the preceding joint, wrapping to the last
    pub fn select_previous_joint(&mut self) -> usize {
        let count = self.skeleton.len();
        let previous = self
            .selected_joint
            .map_or(count - 1, |joint| (joint + count - 1) % count);
        self.selected_joint = Some(previous);
        previous
    }

    // Posing

    /// Rotate a joint by a world-relative delta
    pub fn apply_rotation(&mut self, joint: usize, delta: Quat) -> Result<()> {
        self.skeleton.apply_rotation(joint, delta)?;
        self.pose_changed(PoseEvent::JointRotated { joint });
        Ok(())
    }

    /// Twist a joint about its bone by `angle` radians
    pub fn apply_roll(&mut self, joint: usize, angle: f32) -> Result<()> {
        self.skeleton.apply_roll(joint, angle)?;
        self.pose_changed(PoseEvent::JointRolled { joint });
        Ok(())
    }

    /// Rotate the selected joint; returns whether a joint was selected
    pub fn rotate_selected(&mut self, delta: Quat) -> Result<bool> {
        match self.selected_joint {
            Some(joint) => self.apply_rotation(joint, delta).map(|()| true),
            None => Ok(false),
        }
    }

    /// Roll the selected joint; returns whether a joint was selected
    pub fn roll_selected(&mut self, angle: f32) -> Result<bool> {
        match self.selected_joint {
            Some(joint) => self.apply_roll(joint, angle).map(|()| true),
            None => Ok(false),
        }
    }

    // Keyframes

    pub fn selected_keyframe(&self) -> Option<usize> {
        self.selected_keyframe
    }

    /// Append the current pose as a new keyframe
    pub fn capture_keyframe(&mut self) -> usize {
        let index = self.keyframes.capture(&self.skeleton);
        self.notify(PoseEvent::KeyframeCaptured { index });
        index
    }

    /// Recapture the current pose over keyframe `index`
    pub fn overwrite_keyframe(&mut self, index: usize) -> Result<()> {
        self.keyframes.overwrite(index, &self.skeleton)?;
        self.notify(PoseEvent::KeyframeOverwritten { index });
        Ok(())
    }

    /// Select a keyframe and pose the skeleton as stored there
    pub fn select_keyframe(&mut self, index: usize) -> Result<()> {
        self.keyframes.apply_to_skeleton(index, &mut self.skeleton)?;
        self.selected_keyframe = Some(index);
        self.pose_changed(PoseEvent::KeyframeApplied { index });
        Ok(())
    }

    /// Delete a keyframe. The keyframe selection is always cleared since
    /// later indices shift down.
    pub fn delete_keyframe(&mut self, index: usize) -> Result<()> {
        self.keyframes.remove(index)?;
        self.selected_keyframe = None;
        self.notify(PoseEvent::KeyframeRemoved { index });
        Ok(())
    }

    // Playback

    pub fn play_time(&self) -> f32 {
        self.play_time
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play time of the last keyframe
    pub fn duration(&self) -> f32 {
        PlaybackCursor::duration(self.keyframes.len())
    }

    /// Start playback, rewinding first if already at the end
    pub fn play(&mut self) {
        if self.keyframes.is_empty() {
            return;
        }
        if self.play_time >= self.duration() {
            self.play_time = 0.0;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Jump to a play time and pose the skeleton for it
    pub fn set_play_time(&mut self, time: f32) -> Result<Option<FrameSample>> {
        self.play_time = if time.is_finite() { time } else { 0.0 };
        self.sample()
    }

    /// Move play time forward by `dt` while playing. Playback stops once the
    /// last keyframe is reached.
    pub fn advance(&mut self, dt: f32) -> Result<Option<FrameSample>> {
        if !self.playing {
            return Ok(None);
        }
        self.play_time += dt;
        let duration = self.duration();
        if self.play_time >= duration {
            self.play_time = duration;
            self.playing = false;
        }
        self.sample()
    }

    /// Pose the skeleton for the play time. A held keyframe becomes the
    /// selection; a blend clears it since the pose matches no single keyframe.
    fn sample(&mut self) -> Result<Option<FrameSample>> {
        let time = self.play_time;
        let sample = self.keyframes.sample(time, &mut self.skeleton)?;
        if let Some(sample) = sample {
            self.selected_keyframe = match sample {
                FrameSample::Hold(index) => Some(index),
                FrameSample::Blend { .. } => None,
            };
            self.pose_changed(PoseEvent::PlaybackSampled { time, sample });
        }
        Ok(sample)
    }

    // Rendering

    /// Whether the pose changed since the last [`EditSession::pose_cache`]
    pub fn is_pose_dirty(&self) -> bool {
        self.pose_dirty
    }

    /// World translations and rotations of the current pose, refreshed first
    /// if anything changed
    pub fn pose_cache(&mut self) -> &PoseCache {
        if self.skeleton.is_cache_stale() {
            self.skeleton.refresh_cache();
        }
        self.pose_dirty = false;
        self.skeleton.pose_cache()
    }
}
