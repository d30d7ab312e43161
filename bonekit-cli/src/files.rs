//! Rig, edit script and animation files
//!
//! Files ending in `.yaml` or `.yml` are read as YAML, everything else as
//! JSON. Animations are always written as JSON.

use anyhow::{Context, Result, bail};
use bonekit::{JointSpec, KeyframeStore, RigDescription, RigOptions, SkinBinding};
use glam::Vec3;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Serialization format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value = match FileFormat::from_path(path) {
        FileFormat::Json => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))?,
        FileFormat::Yaml => serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Failed to parse {} as YAML", path.display()))?,
    };
    Ok(value)
}

/// One joint as written in a rig file; roots have parent `-1`
#[derive(Debug, Clone, Deserialize)]
pub struct JointEntry {
    pub id: usize,
    pub position: [f32; 3],
    #[serde(default = "no_parent")]
    pub parent: i64,
}

fn no_parent() -> i64 {
    -1
}

impl JointEntry {
    fn to_spec(&self) -> Result<JointSpec> {
        let position = Vec3::from_array(self.position);
        match self.parent {
            -1 => Ok(JointSpec::root(self.id, position)),
            parent if parent >= 0 => Ok(JointSpec::child(self.id, position, parent as usize)),
            parent => bail!("Joint {} has invalid parent {parent}", self.id),
        }
    }
}

/// Rig file contents
#[derive(Debug, Clone, Deserialize)]
pub struct RigFile {
    pub joints: Vec<JointEntry>,
    #[serde(default)]
    pub skin: Vec<SkinBinding>,
    #[serde(default)]
    pub options: RigOptions,
}

impl RigFile {
    pub fn into_description(self) -> Result<RigDescription> {
        let joints = self
            .joints
            .iter()
            .map(JointEntry::to_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(RigDescription::new(joints)
            .with_skin(self.skin)
            .with_options(self.options))
    }
}

/// Read a rig description from disk
pub fn load_rig(path: &Path) -> Result<RigDescription> {
    let file: RigFile = read_document(path)?;
    log::info!(
        "Loaded rig {} with {} joints",
        path.display(),
        file.joints.len()
    );
    file.into_description()
}

/// One step of an edit script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Rotate a joint about a world axis
    Rotate {
        joint: usize,
        axis: [f32; 3],
        degrees: f32,
    },
    /// Twist a joint about its bone
    Roll { joint: usize, degrees: f32 },
    /// Append the current pose as a keyframe
    Capture,
    /// Recapture the current pose over a keyframe
    Overwrite { keyframe: usize },
    /// Pose the skeleton as stored in a keyframe
    Select { keyframe: usize },
    /// Delete a keyframe
    Delete { keyframe: usize },
}

/// Read an edit script from disk
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    read_document(path)
}

/// Read saved keyframes
pub fn load_animation(path: &Path) -> Result<KeyframeStore> {
    let store: KeyframeStore = read_document(path)?;
    log::info!("Loaded {} keyframes from {}", store.len(), path.display());
    Ok(store)
}

/// Write keyframes as JSON
pub fn save_animation(path: &Path, store: &KeyframeStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("Failed to serialize keyframes")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {} keyframes to {}", store.len(), path.display());
    Ok(())
}
