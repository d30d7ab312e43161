//! Joint hierarchy construction and forward kinematics
//!
//! A [`Skeleton`] is a flat arena of [`Joint`]s. Parents always precede their
//! children, so index order is a valid parent-before-child traversal and a
//! single forward pass refreshes the whole pose.
//!
//! Per joint the engine maintains:
//!
//! - `U`, the bind transform: `U = parent.U · Translate(bind offset)`, fixed at
//!   load time
//! - `D`, the current transform:
//!   `D = parent.D · Translate(bind offset) · totalRoll · T`
//! - world state derived from `D · U⁻¹`: bone end position, bone start and
//!   world orientation

use glam::{Mat4, Quat, Vec3};

use crate::error::{Result, RigError};
use crate::joint::{Joint, JointSpec};
use crate::math;
use crate::options::{BindSeed, DegenerateBonePolicy, RigOptions};

/// Read-only projection of the current pose for rendering: one world
/// translation and one world rotation per joint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseCache {
    translations: Vec<Vec3>,
    rotations: Vec<Quat>,
}

impl PoseCache {
    /// World translation of every joint
    pub fn translations(&self) -> &[Vec3] {
        &self.translations
    }

    /// World rotation of every joint
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

/// Tree of joints with bind-pose and current-pose transform caches
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
    options: RigOptions,
    cache: PoseCache,
    cache_stale: bool,
}

impl Skeleton {
    /// Build a skeleton with default options
    pub fn new(specs: &[JointSpec]) -> Result<Self> {
        Self::from_specs(specs, RigOptions::default())
    }

    /// Build a skeleton from a parent-before-child joint stream.
    ///
    /// Construction is all-or-nothing: any malformed entry aborts it.
    pub fn from_specs(specs: &[JointSpec], options: RigOptions) -> Result<Self> {
        if specs.is_empty() {
            return Err(RigError::EmptySkeleton);
        }

        let mut skeleton = Self {
            joints: Vec::with_capacity(specs.len()),
            options,
            cache: PoseCache::default(),
            cache_stale: true,
        };

        for spec in specs {
            skeleton.register(spec)?;
        }

        skeleton.refresh_cache();

        log::debug!(
            "Built skeleton with {} joints ({} roots, {:?})",
            skeleton.joints.len(),
            skeleton.roots().count(),
            skeleton.options.bind_seed
        );

        Ok(skeleton)
    }

    fn register(&mut self, spec: &JointSpec) -> Result<()> {
        let index = self.joints.len();
        if spec.id != index {
            return Err(RigError::NonSequentialJoint {
                expected: index,
                found: spec.id,
            });
        }
        if !spec.position.is_finite() {
            return Err(RigError::NonFinitePosition { joint: index });
        }

        let epsilon = self.options.epsilon;
        let (init_wcoord, bone) = match spec.parent {
            None => {
                let origin = match self.options.bind_seed {
                    BindSeed::ParentPosition => Vec3::ZERO,
                    BindSeed::OwnPosition => spec.position,
                };
                (origin, spec.position)
            }
            Some(parent) => {
                let Some(parent_joint) = self.joints.get(parent) else {
                    return Err(RigError::UnknownParent {
                        joint: index,
                        parent,
                    });
                };
                // Seeded from the parent's current position, which right after
                // loading is its declared coordinate
                let origin = match self.options.bind_seed {
                    BindSeed::ParentPosition => parent_joint.position,
                    BindSeed::OwnPosition => spec.position,
                };
                (origin, spec.position - parent_joint.init_position)
            }
        };

        let degenerate = bone.length() <= epsilon;
        if degenerate && let Some(parent) = spec.parent {
            match self.options.degenerate_bones {
                DegenerateBonePolicy::Reject => {
                    return Err(RigError::DegenerateBone {
                        joint: index,
                        parent,
                    });
                }
                DegenerateBonePolicy::SubstituteAxis => {
                    log::warn!(
                        "Joint {index} coincides with parent {parent}; using fallback bone axis"
                    );
                }
            }
        }

        let mut joint = Joint::new(index, spec.parent, spec.position, init_wcoord);
        joint.bone = bone;
        joint.degenerate = degenerate;
        joint.init_rel_position = match spec.parent {
            None => init_wcoord,
            Some(parent) => init_wcoord - self.joints[parent].init_wcoord,
        };

        // U is memoized once from the parent's already-final U. Being a chain
        // of translations it only fails to invert once an offset overflows.
        let offset = Mat4::from_translation(joint.init_rel_position);
        joint.u = match spec.parent {
            None => offset,
            Some(parent) => self.joints[parent].u * offset,
        };
        joint.u_inverse = joint.u.inverse();
        if !math::is_invertible(&joint.u, epsilon) || !joint.u_inverse.is_finite() {
            return Err(RigError::SingularBindPose { joint: index });
        }

        self.joints.push(joint);
        if let Some(parent) = spec.parent {
            self.joints[parent].children.push(index);
        }

        self.update_joint(index);
        log::trace!(
            "Registered joint {index} (parent {:?}) at {:?}",
            spec.parent,
            spec.position
        );
        Ok(())
    }

    /// All joints in index order (parents before children)
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Options the skeleton was built with
    pub fn options(&self) -> &RigOptions {
        &self.options
    }

    /// Indices of all root joints
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.joints.iter().filter(|j| j.is_root()).map(Joint::index)
    }

    /// Number of ancestors above a joint
    pub fn depth(&self, index: usize) -> Option<usize> {
        let mut joint = self.joints.get(index)?;
        let mut depth = 0;
        while let Some(parent) = joint.parent {
            joint = &self.joints[parent];
            depth += 1;
        }
        Some(depth)
    }

    /// A joint followed by all its descendants, parents before children and
    /// siblings in registration order
    pub fn subtree(&self, index: usize) -> Result<Vec<usize>> {
        self.check_joint(index)?;
        let mut order = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.joints[current].children.iter().rev());
        }
        Ok(order)
    }

    pub(crate) fn check_joint(&self, index: usize) -> Result<()> {
        if index < self.joints.len() {
            Ok(())
        } else {
            Err(RigError::JointIndex {
                index,
                len: self.joints.len(),
            })
        }
    }

    pub(crate) fn joint_mut(&mut self, index: usize) -> &mut Joint {
        &mut self.joints[index]
    }

    /// Bind-pose transform `U` recomputed from the ancestor chain.
    ///
    /// Matches the memoized value; walks the chain iteratively so deep
    /// hierarchies cannot exhaust the stack.
    pub fn compute_bind_transform(&self, index: usize) -> Result<Mat4> {
        self.check_joint(index)?;
        Ok(self
            .chain(index)
            .iter()
            .rev()
            .fold(Mat4::IDENTITY, |acc, &j| {
                acc * Mat4::from_translation(self.joints[j].init_rel_position)
            }))
    }

    /// Current transform `D` recomputed from the ancestor chain without
    /// reading any cached `D`
    pub fn compute_current_transform(&self, index: usize) -> Result<Mat4> {
        self.check_joint(index)?;
        Ok(self
            .chain(index)
            .iter()
            .rev()
            .fold(Mat4::IDENTITY, |acc, &j| acc * self.local_link(j)))
    }

    /// Joint index followed by its ancestors up to the root
    fn chain(&self, index: usize) -> Vec<usize> {
        let mut chain = vec![index];
        let mut current = index;
        while let Some(parent) = self.joints[current].parent {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// `Translate(bind offset) · totalRoll · T`
    fn local_link(&self, index: usize) -> Mat4 {
        let joint = &self.joints[index];
        Mat4::from_translation(joint.init_rel_position) * joint.total_roll * joint.t
    }

    /// Recompute `D` of one joint from its parent's cached `D`, then its
    /// world state. The parent must already be current.
    fn update_joint(&mut self, index: usize) {
        let link = self.local_link(index);
        let d = match self.joints[index].parent {
            None => link,
            Some(parent) => self.joints[parent].d * link,
        };

        let joint = &mut self.joints[index];
        joint.d = d;

        let skin = joint.d * joint.u_inverse;
        joint.position = skin.transform_point3(joint.init_position);
        joint.wcoord = skin.transform_point3(joint.init_wcoord);
        joint.orientation = math::rotation_of(&skin);

        self.cache_stale = true;
    }

    /// Recompute a joint and every descendant, parents first
    pub(crate) fn update_subtree(&mut self, index: usize) {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            self.update_joint(current);
            stack.extend(self.joints[current].children.iter().rev());
        }
    }

    /// Recompute `D` and world state of every joint in one parent-before-child
    /// pass. Needed whenever several joints changed at once.
    pub fn refresh_all(&mut self) {
        for index in 0..self.joints.len() {
            self.update_joint(index);
        }
        log::trace!("Refreshed world state of {} joints", self.joints.len());
    }

    /// Whether the pose cache lags behind the joints
    pub fn is_cache_stale(&self) -> bool {
        self.cache_stale
    }

    /// Copy world translations and rotations into the pose cache
    pub fn refresh_cache(&mut self) {
        let mut cache = std::mem::take(&mut self.cache);
        self.write_cache(&mut cache);
        self.cache = cache;
        self.cache_stale = false;
    }

    /// Copy world translations and rotations into an external cache
    pub fn write_cache(&self, target: &mut PoseCache) {
        target.translations.clear();
        target.rotations.clear();
        target
            .translations
            .extend(self.joints.iter().map(|j| j.position));
        target
            .rotations
            .extend(self.joints.iter().map(|j| j.orientation));
    }

    /// Pose cache as of the last [`Skeleton::refresh_cache`]
    pub fn pose_cache(&self) -> &PoseCache {
        &self.cache
    }

    /// `D · U⁻¹` of every joint, ready for skinning
    pub fn skinning_transforms(&self) -> Vec<Mat4> {
        self.joints.iter().map(Joint::skinning_transform).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BindSeed;
    use std::f32::consts::FRAC_PI_2;

    fn chain_specs() -> Vec<JointSpec> {
        vec![
            JointSpec::root(0, Vec3::new(0.0, 1.0, 0.0)),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
            JointSpec::child(2, Vec3::new(1.0, 2.0, 0.0), 1),
        ]
    }

    #[test]
    fn test_bind_pose_positions() {
        let skeleton = Skeleton::new(&chain_specs()).unwrap();
        for (joint, spec) in skeleton.joints().iter().zip(chain_specs()) {
            assert!(joint.position().abs_diff_eq(spec.position, 1e-6));
            assert!(math::same_rotation(joint.orientation(), Quat::IDENTITY, 1e-6));
        }
    }

    #[test]
    fn test_parent_seeded_origins() {
        let skeleton = Skeleton::new(&chain_specs()).unwrap();
        assert_eq!(skeleton.joints()[0].bind_origin(), Vec3::ZERO);
        assert_eq!(skeleton.joints()[1].bind_origin(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(skeleton.joints()[2].bind_origin(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(skeleton.joints()[2].bind_offset(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_own_position_origins() {
        let options = RigOptions::default().with_bind_seed(BindSeed::OwnPosition);
        let skeleton = Skeleton::from_specs(&chain_specs(), options).unwrap();
        assert_eq!(skeleton.joints()[0].bind_origin(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(skeleton.joints()[2].bind_offset(), Vec3::new(1.0, 0.0, 0.0));
        for (joint, spec) in skeleton.joints().iter().zip(chain_specs()) {
            assert!(joint.position().abs_diff_eq(spec.position, 1e-6));
        }
    }

    #[test]
    fn test_children_registration_order() {
        let specs = vec![
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(1.0, 1.0, 0.0), 0),
            JointSpec::child(2, Vec3::new(-1.0, 1.0, 0.0), 0),
            JointSpec::child(3, Vec3::new(1.0, 2.0, 0.0), 1),
        ];
        let skeleton = Skeleton::new(&specs).unwrap();
        assert_eq!(skeleton.joints()[0].children(), &[1, 2]);
        assert_eq!(skeleton.subtree(0).unwrap(), vec![0, 1, 3, 2]);
        assert_eq!(skeleton.depth(3), Some(2));
        assert_eq!(skeleton.roots().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_memoized_matches_recomputed() {
        let mut skeleton = Skeleton::new(&chain_specs()).unwrap();
        skeleton.joint_mut(1).t = Mat4::from_quat(Quat::from_rotation_z(FRAC_PI_2));
        skeleton.refresh_all();

        for index in 0..skeleton.len() {
            let u = skeleton.compute_bind_transform(index).unwrap();
            let d = skeleton.compute_current_transform(index).unwrap();
            assert!(u.abs_diff_eq(*skeleton.joints()[index].bind_transform(), 1e-6));
            assert!(d.abs_diff_eq(*skeleton.joints()[index].current_transform(), 1e-6));
        }
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let specs = vec![
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
            JointSpec::child(2, Vec3::new(0.0, 3.0, 0.0), 5),
        ];
        let err = Skeleton::new(&specs).unwrap_err();
        assert_eq!(
            err,
            RigError::UnknownParent {
                joint: 2,
                parent: 5
            }
        );
    }

    #[test]
    fn test_overflowing_bind_offset_rejected() {
        let options = RigOptions::default().with_bind_seed(BindSeed::OwnPosition);
        let specs = vec![
            JointSpec::root(0, Vec3::new(-3.0e38, 0.0, 0.0)),
            JointSpec::child(1, Vec3::new(3.0e38, 0.0, 0.0), 0),
        ];
        let err = Skeleton::from_specs(&specs, options).unwrap_err();
        assert_eq!(err, RigError::SingularBindPose { joint: 1 });
        assert!(err.is_load_error());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Skeleton::new(&[]).unwrap_err(), RigError::EmptySkeleton);
    }

    #[test]
    fn test_non_sequential_rejected() {
        let specs = vec![JointSpec::root(0, Vec3::Y), JointSpec::child(4, Vec3::X, 0)];
        assert_eq!(
            Skeleton::new(&specs).unwrap_err(),
            RigError::NonSequentialJoint {
                expected: 1,
                found: 4
            }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let specs = vec![JointSpec::root(0, Vec3::new(f32::NAN, 0.0, 0.0))];
        assert_eq!(
            Skeleton::new(&specs).unwrap_err(),
            RigError::NonFinitePosition { joint: 0 }
        );
    }

    #[test]
    fn test_degenerate_bone_policy() {
        let specs = vec![JointSpec::root(0, Vec3::Y), JointSpec::child(1, Vec3::Y, 0)];
        assert_eq!(
            Skeleton::new(&specs).unwrap_err(),
            RigError::DegenerateBone {
                joint: 1,
                parent: 0
            }
        );

        let options =
            RigOptions::default().with_degenerate_bones(DegenerateBonePolicy::SubstituteAxis);
        let skeleton = Skeleton::from_specs(&specs, options).unwrap();
        assert!(skeleton.joints()[1].is_degenerate());
        assert!(skeleton.joints()[1].position().is_finite());
    }

    #[test]
    fn test_pose_cache_refresh() {
        let mut skeleton = Skeleton::new(&chain_specs()).unwrap();
        assert!(!skeleton.is_cache_stale());
        assert_eq!(skeleton.pose_cache().len(), 3);

        skeleton.joint_mut(0).t = Mat4::from_quat(Quat::from_rotation_x(0.5));
        skeleton.update_subtree(0);
        assert!(skeleton.is_cache_stale());

        skeleton.refresh_cache();
        assert!(!skeleton.is_cache_stale());
        assert_eq!(
            skeleton.pose_cache().translations()[2],
            skeleton.joints()[2].position()
        );
    }

    #[test]
    fn test_invalid_joint_index() {
        let skeleton = Skeleton::new(&chain_specs()).unwrap();
        assert_eq!(
            skeleton.compute_current_transform(7).unwrap_err(),
            RigError::JointIndex { index: 7, len: 3 }
        );
    }
}
