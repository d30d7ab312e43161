//! Root CLI structure for bonekit

use clap::{Parser, Subcommand};

use crate::commands::{info::InfoArgs, play::PlayArgs, pose::PoseArgs, script::ScriptArgs};

#[derive(Parser)]
#[command(name = "bonekit")]
#[command(about = "Pose, keyframe and play back rigged skeletons", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Log level requested on the command line, `None` to defer to `RUST_LOG`
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        match (self.verbose, self.quiet) {
            (0, false) => None,
            (0, true) => Some(log::LevelFilter::Error),
            (1, _) => Some(log::LevelFilter::Info),
            (2, _) => Some(log::LevelFilter::Debug),
            _ => Some(log::LevelFilter::Trace),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the joint hierarchy of a rig
    Info(InfoArgs),

    /// Apply rotations and rolls to a rig and print the resulting pose
    Pose(PoseArgs),

    /// Run an edit script and optionally save the captured keyframes
    Script(ScriptArgs),

    /// Evaluate saved keyframes at a play time
    Play(PlayArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
