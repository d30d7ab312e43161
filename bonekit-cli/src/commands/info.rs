//! Rig information

use anyhow::Result;
use bonekit::BoneSegment;
use clap::Args;

use super::RigArgs;
use crate::utils::{TreeNode, TreeOptions, create_table, format_vec3, render_tree};

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub rig: RigArgs,

    /// Maximum tree depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Show metadata inline
    #[arg(short, long)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Also list bone segments
    #[arg(short, long)]
    pub bones: bool,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let skeleton = args.rig.load()?;
    let name = args
        .rig
        .rig
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("rig");

    let options = TreeOptions {
        max_depth: args.depth,
        no_color: args.no_color,
        show_metadata: true,
        compact: args.compact,
    };
    let tree = TreeNode::from_skeleton(name, &skeleton);
    print!("{}", render_tree(&tree, &options));

    if args.bones {
        let mut table = create_table(&["Bone", "Start", "End", "Length"]);
        for bone in BoneSegment::all(&skeleton) {
            table.add_row(prettytable::row![
                bone.joint,
                format_vec3(bone.start),
                format_vec3(bone.end),
                format!("{:.3}", bone.length())
            ]);
        }
        println!();
        table.printstd();
    }

    Ok(())
}
