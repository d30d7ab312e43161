//! Joint records stored in the skeleton arena

use glam::{Mat4, Quat, Vec3};

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// One entry of the joint stream handed over by a model loader.
///
/// Streams must list parents before their children.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct JointSpec {
    /// Joint id, equal to its position in the stream
    pub id: usize,
    /// Declared bind-pose world position
    pub position: Vec3,
    /// Parent id, `None` for a root
    pub parent: Option<usize>,
}

impl JointSpec {
    /// Create a root joint entry
    pub const fn root(id: usize, position: Vec3) -> Self {
        Self {
            id,
            position,
            parent: None,
        }
    }

    /// Create a child joint entry
    pub const fn child(id: usize, position: Vec3, parent: usize) -> Self {
        Self {
            id,
            position,
            parent: Some(parent),
        }
    }
}

/// A joint of a loaded skeleton together with its transform caches.
///
/// Parent and children are plain indices into the owning skeleton. The bind
/// transform `U` and its inverse are fixed at load time; everything else is
/// rederived by forward kinematics.
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) index: usize,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    /// Declared bind position (the bone end)
    pub(crate) init_position: Vec3,
    /// Bind frame origin (the bone start)
    pub(crate) init_wcoord: Vec3,
    /// Bind frame origin relative to the parent's bind frame origin
    pub(crate) init_rel_position: Vec3,
    /// Declared bone, parent's declared position (origin for roots) to own
    pub(crate) bone: Vec3,

    /// Current bone start
    pub(crate) wcoord: Vec3,
    /// Current bone end
    pub(crate) position: Vec3,
    /// World rotation relative to the bind pose
    pub(crate) orientation: Quat,
    /// Rotation relative to the parent, extracted from `t`
    pub(crate) rel_orientation: Quat,

    pub(crate) t: Mat4,
    pub(crate) d: Mat4,
    pub(crate) u: Mat4,
    pub(crate) u_inverse: Mat4,
    pub(crate) total_roll: Mat4,
    /// Whether the declared bone has zero length
    pub(crate) degenerate: bool,
}

impl Joint {
    pub(crate) fn new(
        index: usize,
        parent: Option<usize>,
        init_position: Vec3,
        init_wcoord: Vec3,
    ) -> Self {
        Self {
            index,
            parent,
            children: Vec::new(),
            init_position,
            init_wcoord,
            init_rel_position: init_wcoord,
            bone: init_position - init_wcoord,
            wcoord: init_wcoord,
            position: init_position,
            orientation: Quat::IDENTITY,
            rel_orientation: Quat::IDENTITY,
            t: Mat4::IDENTITY,
            d: Mat4::IDENTITY,
            u: Mat4::IDENTITY,
            u_inverse: Mat4::IDENTITY,
            total_roll: Mat4::IDENTITY,
            degenerate: false,
        }
    }

    /// Index of this joint in the skeleton
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parent index, `None` for a root
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Child indices in registration order
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Declared bind-pose world position
    pub fn bind_position(&self) -> Vec3 {
        self.init_position
    }

    /// Origin of the bind frame in world space
    pub fn bind_origin(&self) -> Vec3 {
        self.init_wcoord
    }

    /// Bind frame origin relative to the parent's bind frame origin
    pub fn bind_offset(&self) -> Vec3 {
        self.init_rel_position
    }

    /// Declared bone vector: from the parent's declared position (the origin
    /// for roots) to this joint's
    pub fn bind_bone(&self) -> Vec3 {
        self.bone
    }

    /// Current origin of this joint's frame (the bone start)
    pub fn origin(&self) -> Vec3 {
        self.wcoord
    }

    /// Current world position (the bone end)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current world rotation relative to the bind pose
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Current rotation relative to the parent
    pub fn relative_orientation(&self) -> Quat {
        self.rel_orientation
    }

    /// Local joint rotation `T`
    pub fn local_rotation(&self) -> &Mat4 {
        &self.t
    }

    /// Current cumulative transform `D`
    pub fn current_transform(&self) -> &Mat4 {
        &self.d
    }

    /// Bind-pose cumulative transform `U`
    pub fn bind_transform(&self) -> &Mat4 {
        &self.u
    }

    /// Inverse of `U`, computed once at load time
    pub fn inverse_bind_transform(&self) -> &Mat4 {
        &self.u_inverse
    }

    /// Accumulated twist about the bone axis
    pub fn total_roll(&self) -> &Mat4 {
        &self.total_roll
    }

    /// Skinning transform `D · U⁻¹`
    pub fn skinning_transform(&self) -> Mat4 {
        self.d * self.u_inverse
    }

    /// Whether this joint's bone has zero length
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}
