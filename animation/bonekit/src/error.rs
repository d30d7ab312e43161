//! Error handling for skeleton construction and pose editing

use thiserror::Error;

/// Errors that can occur when building or posing a skeleton
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RigError {
    /// The joint stream was empty
    #[error("Load error: skeleton has no joints")]
    EmptySkeleton,

    /// Joint ids must arrive as 0, 1, 2, ... in stream order
    #[error("Load error: expected joint id {expected}, found {found}")]
    NonSequentialJoint { expected: usize, found: usize },

    /// A joint referenced a parent that has not been registered yet
    #[error("Load error: joint {joint} references unregistered parent {parent}")]
    UnknownParent { joint: usize, parent: usize },

    /// A bind position contained NaN or infinity
    #[error("Load error: joint {joint} has a non-finite bind position")]
    NonFinitePosition { joint: usize },

    /// The bind-pose transform of a joint could not be inverted, which happens
    /// when accumulated bind offsets overflow
    #[error("Load error: bind transform of joint {joint} cannot be inverted")]
    SingularBindPose { joint: usize },

    /// A joint shares its bind position with its parent (zero-length bone)
    #[error("Degenerate geometry: joint {joint} coincides with its parent {parent}")]
    DegenerateBone { joint: usize, parent: usize },

    /// Keyframe index outside the stored sequence
    #[error("Keyframe index {index} out of range (count: {len})")]
    KeyframeIndex { index: usize, len: usize },

    /// Joint index outside the skeleton
    #[error("Joint index {index} out of range (count: {len})")]
    JointIndex { index: usize, len: usize },

    /// A keyframe was captured from a skeleton with a different joint count
    #[error("Keyframe holds {found} joints, skeleton has {expected}")]
    JointCountMismatch { expected: usize, found: usize },

    /// A keyframe's bind transform disagrees with the live skeleton
    #[error("Keyframe bind pose of joint {joint} does not match the skeleton")]
    BindPoseMismatch { joint: usize },

    /// Skin binding data references joints or weights the skeleton cannot honour
    #[error("Skin binding error: {0}")]
    SkinBinding(String),
}

impl RigError {
    /// Whether this error aborts skeleton construction
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::EmptySkeleton
                | Self::NonSequentialJoint { .. }
                | Self::UnknownParent { .. }
                | Self::NonFinitePosition { .. }
                | Self::SingularBindPose { .. }
                | Self::DegenerateBone { .. }
        )
    }

    /// Whether this error is an index rejection the caller can recover from
    pub fn is_index_error(&self) -> bool {
        matches!(self, Self::KeyframeIndex { .. } | Self::JointIndex { .. })
    }
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;
