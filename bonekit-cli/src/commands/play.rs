//! Playback evaluation of saved keyframes

use anyhow::{Result, bail};
use bonekit::{EditSession, FrameSample};
use clap::Args;
use std::path::PathBuf;

use super::{OutputArgs, RigArgs, print_pose};
use crate::files;

#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    pub rig: RigArgs,

    /// Saved keyframes (JSON)
    pub animation: PathBuf,

    /// Play time; one unit per keyframe gap
    #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub time: f32,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let skeleton = args.rig.load()?;
    let keyframes = files::load_animation(&args.animation)?;
    let mut session = EditSession::with_keyframes(skeleton, keyframes);

    let Some(sample) = session.set_play_time(args.time)? else {
        bail!("{} holds no keyframes", args.animation.display());
    };

    if !args.output.json {
        match sample {
            FrameSample::Hold(index) => println!("t = {}: keyframe {index}", args.time),
            FrameSample::Blend { from, to, fraction } => println!(
                "t = {}: keyframes {from} -> {to} at {fraction:.3}",
                args.time
            ),
        }
    }

    print_pose(session.skeleton(), args.output)
}
