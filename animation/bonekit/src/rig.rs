//! Everything a model loader hands over about a rigged mesh

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::joint::JointSpec;
use crate::options::RigOptions;
use crate::skeleton::Skeleton;
use crate::skin::{self, SkinBinding};

/// Joint stream, skin bindings and build options of one rig
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct RigDescription {
    pub joints: Vec<JointSpec>,
    pub skin: Vec<SkinBinding>,
    pub options: RigOptions,
}

impl RigDescription {
    pub fn new(joints: Vec<JointSpec>) -> Self {
        Self {
            joints,
            ..Self::default()
        }
    }

    pub fn with_skin(mut self, skin: Vec<SkinBinding>) -> Self {
        self.skin = skin;
        self
    }

    pub fn with_options(mut self, options: RigOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the skeleton and check the skin bindings against it
    pub fn build(&self) -> Result<Skeleton> {
        let skeleton = Skeleton::from_specs(&self.joints, self.options.clone())?;
        skin::validate_all(&skeleton, &self.skin)?;
        log::debug!(
            "Built rig with {} joints and {} skinned vertices",
            skeleton.len(),
            self.skin.len()
        );
        Ok(skeleton)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RigError;
    use glam::Vec3;

    #[test]
    fn test_build_checks_skin() {
        let rig = RigDescription::new(vec![
            JointSpec::root(0, Vec3::Y),
            JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
        ]);
        assert_eq!(rig.build().unwrap().len(), 2);

        let bad = rig.with_skin(vec![SkinBinding::rigid(Vec3::ZERO, 9)]);
        assert!(matches!(bad.build(), Err(RigError::SkinBinding(_))));
    }

    #[test]
    fn test_build_propagates_load_errors() {
        let rig = RigDescription::new(Vec::new());
        assert_eq!(rig.build().unwrap_err(), RigError::EmptySkeleton);
    }
}
