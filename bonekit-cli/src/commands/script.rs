//! Scripted edit sessions

use anyhow::{Context, Result};
use bonekit::{EditSession, KeyframeStore, PoseEvent, math};
use clap::Args;
use glam::Vec3;
use std::path::PathBuf;

use super::{OutputArgs, RigArgs, print_pose};
use crate::files::{self, ScriptStep};

#[derive(Args, Debug)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub rig: RigArgs,

    /// Edit script (JSON or YAML list of steps)
    pub script: PathBuf,

    /// Keyframes to start from
    #[arg(short, long)]
    pub animation: Option<PathBuf>,

    /// Where to save the resulting keyframes
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the final pose
    #[arg(short, long)]
    pub pose: bool,

    #[command(flatten)]
    pub format: OutputArgs,
}

/// Run script steps through a session, stopping at the first failing step
pub fn run_steps(session: &mut EditSession, steps: &[ScriptStep]) -> Result<()> {
    for (number, step) in steps.iter().enumerate() {
        let result = match *step {
            ScriptStep::Rotate {
                joint,
                axis,
                degrees,
            } => session.apply_rotation(
                joint,
                math::axis_angle(Vec3::from_array(axis), degrees.to_radians()),
            ),
            ScriptStep::Roll { joint, degrees } => session.apply_roll(joint, degrees.to_radians()),
            ScriptStep::Capture => {
                session.capture_keyframe();
                Ok(())
            }
            ScriptStep::Overwrite { keyframe } => session.overwrite_keyframe(keyframe),
            ScriptStep::Select { keyframe } => session.select_keyframe(keyframe),
            ScriptStep::Delete { keyframe } => session.delete_keyframe(keyframe),
        };
        result.with_context(|| format!("Script step {} ({step:?}) failed", number + 1))?;
    }
    Ok(())
}

pub fn execute(args: ScriptArgs) -> Result<()> {
    let skeleton = args.rig.load()?;
    let steps = files::load_script(&args.script)?;
    let keyframes = match &args.animation {
        Some(path) => files::load_animation(path)?,
        None => KeyframeStore::new(),
    };

    let mut session = EditSession::with_keyframes(skeleton, keyframes);
    session.add_observer(|event: &PoseEvent| log::debug!("{event:?}"));
    run_steps(&mut session, &steps)?;

    println!(
        "Ran {} steps, {} keyframes",
        steps.len(),
        session.keyframes().len()
    );

    if let Some(output) = &args.output {
        files::save_animation(output, session.keyframes())
            .with_context(|| format!("Failed to save animation to {}", output.display()))?;
        println!("Saved keyframes to {}", output.display());
    }

    if args.pose {
        print_pose(session.skeleton(), args.format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonekit::{JointSpec, Skeleton};

    fn session() -> EditSession {
        EditSession::new(
            Skeleton::new(&[
                JointSpec::root(0, Vec3::Y),
                JointSpec::child(1, Vec3::new(0.0, 2.0, 0.0), 0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_run_steps() {
        let mut session = session();
        let steps = vec![
            ScriptStep::Capture,
            ScriptStep::Rotate {
                joint: 0,
                axis: [0.0, 0.0, 1.0],
                degrees: 90.0,
            },
            ScriptStep::Capture,
            ScriptStep::Select { keyframe: 0 },
            ScriptStep::Delete { keyframe: 0 },
        ];
        run_steps(&mut session, &steps).unwrap();

        assert_eq!(session.keyframes().len(), 1);
        assert_eq!(session.selected_keyframe(), None);
        // The pose of the selected keyframe stays on the skeleton
        assert!(
            session.skeleton().joints()[1]
                .position()
                .abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5)
        );
    }

    #[test]
    fn test_failing_step_reports_number() {
        let mut session = session();
        let err = run_steps(&mut session, &[ScriptStep::Overwrite { keyframe: 0 }]).unwrap_err();
        assert!(err.to_string().contains("Script step 1"));
    }
}
