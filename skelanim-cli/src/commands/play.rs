//! `skelanim play`

use anyhow::{Result, bail};
use log::{info, warn};
use serde::Serialize;
use skelanim::{AnimatedModel, Animator, AnimatorConfig, ClipSelector};

use super::load_model;
use crate::cli::{OutputFormat, PlayArgs};
use crate::utils::{add_table_row, create_table, format_vec3};

#[derive(Debug, Serialize)]
struct FrameReport {
    frame: u32,
    elapsed: f32,
    /// Column-major joint matrices
    palette: Vec<[f32; 16]>,
}

#[derive(Debug, Serialize)]
struct PlayReport<'a> {
    clip: Option<&'a str>,
    skin: Option<usize>,
    fps: f32,
    frames: Vec<FrameReport>,
}

pub fn execute(args: &PlayArgs) -> Result<()> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        bail!("--fps must be a positive number, got {}", args.fps);
    }

    let mut model = load_model(&args.scene)?;

    if let Some(name) = &args.clip
        && model.clip_index(name).is_none()
    {
        let available: Vec<&str> = model.clips().iter().map(|c| c.name.as_str()).collect();
        bail!("Clip '{}' not found (available: {})", name, available.join(", "));
    }

    if model.skins().is_empty() {
        warn!("Scene has no skins, the palette will be empty");
    } else if args.skin >= model.skins().len() {
        bail!(
            "Skin {} does not exist, the scene has {} skins",
            args.skin,
            model.skins().len()
        );
    }

    let config = AnimatorConfig {
        max_joints: args.max_joints,
        default_clip: args.clip.clone().map(ClipSelector::Name),
        skin: Some(args.skin),
        ..Default::default()
    };
    let mut animator = Animator::new(&model, config);
    let dt = 1.0 / args.fps;

    info!(
        "Playing {} frames at {} fps (clip {:?})",
        args.frames,
        args.fps,
        animator.active_clip()
    );

    let mut frames = Vec::new();
    for frame in 0..args.frames {
        animator.update(&mut model, dt);
        if args.format == OutputFormat::Json {
            frames.push(FrameReport {
                frame,
                elapsed: animator.elapsed(),
                palette: animator.palette().as_cols_arrays(),
            });
        }
    }

    match args.format {
        OutputFormat::Json => {
            let report = PlayReport {
                clip: animator
                    .active_clip()
                    .and_then(|i| model.clip(i))
                    .map(|c| c.name.as_str()),
                skin: animator.bound_skin(),
                fps: args.fps,
                frames,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => print_palette(&model, &animator),
    }

    Ok(())
}

fn print_palette(model: &AnimatedModel, animator: &Animator) {
    let clip = animator
        .active_clip()
        .and_then(|i| model.clip(i))
        .map_or("<none>", |c| c.name.as_str());
    println!(
        "Clip: {}  elapsed: {:.3}s  palette: {}/{} joints",
        clip,
        animator.elapsed(),
        animator.palette().len(),
        animator.palette().capacity()
    );

    let joints = animator
        .bound_skin()
        .and_then(|i| model.skins().get(i))
        .map(|skin| skin.joints.as_slice())
        .unwrap_or_default();

    let mut table = create_table(&["Slot", "Joint", "Translation", "X axis", "Y axis", "Z axis"]);
    for (slot, m) in animator.palette().as_cols_arrays().iter().enumerate() {
        let joint = joints
            .get(slot)
            .and_then(|&j| model.nodes().get(j))
            .map_or_else(|| "?".to_string(), |node| node.label());
        add_table_row(
            &mut table,
            vec![
                slot.to_string(),
                joint,
                format_vec3([m[12], m[13], m[14]]),
                format_vec3([m[0], m[1], m[2]]),
                format_vec3([m[4], m[5], m[6]]),
                format_vec3([m[8], m[9], m[10]]),
            ],
        );
    }
    table.printstd();
}
