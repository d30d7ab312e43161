//! Command implementations

pub mod info;
pub mod play;
pub mod pose;
pub mod script;

use anyhow::{Context, Result};
use bonekit::{BindSeed, DegenerateBonePolicy, Skeleton};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::files;
use crate::utils::pose_table;

/// Rig file plus the options that may override its settings
#[derive(Args, Debug, Clone)]
pub struct RigArgs {
    /// Path to the rig file (JSON or YAML)
    pub rig: PathBuf,

    /// Anchor each joint's bind frame at its own position instead of its
    /// parent's
    #[arg(long)]
    pub own_position: bool,

    /// Tolerate zero-length bones by substituting a fixed axis
    #[arg(long)]
    pub allow_degenerate: bool,
}

impl RigArgs {
    /// Load the rig and build its skeleton
    pub fn load(&self) -> Result<Skeleton> {
        let mut rig = files::load_rig(&self.rig)?;
        if self.own_position {
            rig.options.bind_seed = BindSeed::OwnPosition;
        }
        if self.allow_degenerate {
            rig.options.degenerate_bones = DegenerateBonePolicy::SubstituteAxis;
        }
        rig.build()
            .with_context(|| format!("Failed to build skeleton from {}", self.rig.display()))
    }
}

/// How a pose is printed
#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    /// Print the pose as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JointReport {
    joint: usize,
    parent: Option<usize>,
    position: [f32; 3],
    rotation: [f32; 4],
}

/// Print every joint's world position and rotation
pub fn print_pose(skeleton: &Skeleton, output: OutputArgs) -> Result<()> {
    if output.json {
        let report: Vec<JointReport> = skeleton
            .joints()
            .iter()
            .map(|joint| JointReport {
                joint: joint.index(),
                parent: joint.parent(),
                position: joint.position().to_array(),
                rotation: joint.orientation().to_array(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        pose_table(skeleton).printstd();
    }
    Ok(())
}
