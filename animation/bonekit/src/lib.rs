//! Skeletal transform engine for rigged meshes.
//!
//! The crate keeps a joint hierarchy with its bind-pose and current-pose
//! transform caches, applies interactive rotations and rolls to single
//! joints, captures full-skeleton keyframes and blends between them.
//!
//! # Examples
//!
//! ```
//! use bonekit::{JointSpec, KeyframeStore, Skeleton};
//! use glam::{Quat, Vec3};
//!
//! let mut skeleton = Skeleton::new(&[
//!     JointSpec::root(0, Vec3::Y),
//!     JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
//! ])?;
//!
//! let mut keyframes = KeyframeStore::new();
//! keyframes.capture(&skeleton);
//!
//! skeleton.apply_rotation(0, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))?;
//! keyframes.capture(&skeleton);
//!
//! // Halfway between the two poses
//! keyframes.interpolate(0, 1, 0.5, &mut skeleton)?;
//! println!("tip at {:?}", skeleton.joints()[1].position());
//! # Ok::<(), bonekit::RigError>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod bone;
pub mod error;
pub mod interpolate;
pub mod joint;
pub mod keyframe;
pub mod math;
pub mod options;
mod pose;
pub mod rig;
pub mod session;
pub mod skeleton;
pub mod skin;

pub use bone::{BoneSegment, pick_bone};
pub use error::{Result, RigError};
pub use interpolate::{FrameSample, PlaybackCursor, blend_world_orientations, interpolate};
pub use joint::{Joint, JointSpec};
pub use keyframe::{JointPose, Keyframe, KeyframeStore, PreviewHandle};
pub use options::{BindSeed, DegenerateBonePolicy, RigOptions};
pub use rig::RigDescription;
pub use session::{EditSession, PoseEvent, PoseObserver};
pub use skeleton::{PoseCache, Skeleton};
pub use skin::{SkinBinding, skin_vertex};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
