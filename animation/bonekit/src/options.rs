//! Options controlling how a skeleton is built and posed

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Where a joint's bind frame is anchored at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(rename_all = "snake_case"))]
pub enum BindSeed {
    /// Non-root joints are anchored at their parent's declared position and
    /// roots at the origin, so a joint's frame sits at the start of its bone.
    /// Rotating a joint then swings the segment from its parent to itself.
    /// Keep this to stay compatible with previously saved animations.
    #[default]
    ParentPosition,
    /// Every joint is anchored at its own declared position. Rotating a joint
    /// swings its children but leaves the joint itself in place.
    OwnPosition,
}

/// What to do with zero-length bones found at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(rename_all = "snake_case"))]
pub enum DegenerateBonePolicy {
    /// Abort construction with [`crate::RigError::DegenerateBone`]
    #[default]
    Reject,
    /// Keep the joint and use [`crate::math::FALLBACK_AXIS`] wherever its bone
    /// direction is needed
    SubstituteAxis,
}

/// Options for skeleton construction and interactive posing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct RigOptions {
    /// Bind frame anchoring convention
    pub bind_seed: BindSeed,
    /// Zero-length bone handling
    pub degenerate_bones: DegenerateBonePolicy,
    /// Distance below which two bind positions are treated as coincident
    pub epsilon: f32,
    /// Rebuild the local rotation from its quaternion after every interactive
    /// edit so that repeated drags cannot accumulate shear or scale
    pub orthonormalize: bool,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            bind_seed: BindSeed::default(),
            degenerate_bones: DegenerateBonePolicy::default(),
            epsilon: 1e-6,
            orthonormalize: true,
        }
    }
}

impl RigOptions {
    /// Options with a different anchoring convention
    pub fn with_bind_seed(mut self, bind_seed: BindSeed) -> Self {
        self.bind_seed = bind_seed;
        self
    }

    /// Options with a different zero-length bone policy
    pub fn with_degenerate_bones(mut self, policy: DegenerateBonePolicy) -> Self {
        self.degenerate_bones = policy;
        self
    }
}
