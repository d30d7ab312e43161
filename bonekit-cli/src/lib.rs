//! bonekit CLI library
//!
//! Loading of rig, script and animation files plus the subcommands that
//! drive the skeletal transform engine from the command line.

pub mod cli;
pub mod commands;
pub mod files;
pub mod utils;
