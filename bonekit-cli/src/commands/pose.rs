//! One-shot posing from the command line

use anyhow::{Context, Result};
use bonekit::math;
use clap::Args;
use glam::{Quat, Vec3};

use super::{OutputArgs, RigArgs, print_pose};

/// `JOINT:AX,AY,AZ:DEGREES`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateEdit {
    pub joint: usize,
    pub axis: Vec3,
    pub degrees: f32,
}

impl RotateEdit {
    pub fn rotation(&self) -> Quat {
        math::axis_angle(self.axis, self.degrees.to_radians())
    }
}

/// `JOINT:DEGREES`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollEdit {
    pub joint: usize,
    pub degrees: f32,
}

fn parse_joint(text: &str) -> Result<usize, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("invalid joint index '{text}'"))
}

fn parse_degrees(text: &str) -> Result<f32, String> {
    text.trim()
        .parse::<f32>()
        .ok()
        .filter(|d| d.is_finite())
        .ok_or_else(|| format!("invalid angle '{text}'"))
}

pub fn parse_rotate(text: &str) -> Result<RotateEdit, String> {
    let parts: Vec<&str> = text.split(':').collect();
    let [joint, axis, degrees] = parts.as_slice() else {
        return Err(format!("expected JOINT:AX,AY,AZ:DEGREES, got '{text}'"));
    };

    let components = axis
        .split(',')
        .map(|c| c.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("invalid axis '{axis}'"))?;
    let [x, y, z] = components.as_slice() else {
        return Err(format!("axis needs three components, got '{axis}'"));
    };
    let axis = Vec3::new(*x, *y, *z);
    if !axis.is_finite() || axis.length_squared() == 0.0 {
        return Err(format!("axis '{axis}' has no direction"));
    }

    Ok(RotateEdit {
        joint: parse_joint(joint)?,
        axis,
        degrees: parse_degrees(degrees)?,
    })
}

pub fn parse_roll(text: &str) -> Result<RollEdit, String> {
    let Some((joint, degrees)) = text.split_once(':') else {
        return Err(format!("expected JOINT:DEGREES, got '{text}'"));
    };
    Ok(RollEdit {
        joint: parse_joint(joint)?,
        degrees: parse_degrees(degrees)?,
    })
}

#[derive(Args, Debug)]
pub struct PoseArgs {
    #[command(flatten)]
    pub rig: RigArgs,

    /// Rotate a joint about a world axis, e.g. `1:0,0,1:45`
    #[arg(short, long, value_name = "JOINT:AX,AY,AZ:DEG", value_parser = parse_rotate)]
    pub rotate: Vec<RotateEdit>,

    /// Roll a joint about its bone, e.g. `2:30`. Applied after all rotations.
    #[arg(long, value_name = "JOINT:DEG", value_parser = parse_roll)]
    pub roll: Vec<RollEdit>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute(args: PoseArgs) -> Result<()> {
    let mut skeleton = args.rig.load()?;

    for edit in &args.rotate {
        skeleton
            .apply_rotation(edit.joint, edit.rotation())
            .with_context(|| format!("Failed to rotate joint {}", edit.joint))?;
        log::info!(
            "Rotated joint {} by {}° about {}",
            edit.joint,
            edit.degrees,
            edit.axis
        );
    }
    for edit in &args.roll {
        skeleton
            .apply_roll(edit.joint, edit.degrees.to_radians())
            .with_context(|| format!("Failed to roll joint {}", edit.joint))?;
        log::info!("Rolled joint {} by {}°", edit.joint, edit.degrees);
    }

    print_pose(&skeleton, args.output)
}
