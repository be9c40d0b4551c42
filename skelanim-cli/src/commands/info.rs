//! `skelanim info`

use anyhow::Result;
use skelanim::AnimatedModel;
use std::path::Path;

use super::load_model;
use crate::utils::{add_table_row, create_table};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    println!("Loading scene: {}", path.display());
    let model = load_model(path)?;

    println!("\n=== Scene Information ===");
    println!("Nodes:     {}", model.nodes().len());
    println!("Roots:     {}", model.nodes().roots().len());
    println!("Submeshes: {}", model.submeshes().len());
    println!("Vertices:  {}", model.vertices().len());
    println!("Indices:   {}", model.indices().len());
    println!("Skins:     {}", model.skins().len());
    println!("Clips:     {}", model.clips().len());

    if !model.clips().is_empty() {
        println!();
        let mut table = create_table(&["#", "Clip", "Duration (s)", "Channels"]);
        for (i, clip) in model.clips().iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    clip.name.clone(),
                    format!("{:.3}", clip.duration),
                    clip.channels.len().to_string(),
                ],
            );
        }
        table.printstd();
    }

    if detailed {
        print_details(&model);
    }

    Ok(())
}

fn print_details(model: &AnimatedModel) {
    println!("\n=== Skins ===");
    for (i, skin) in model.skins().iter().enumerate() {
        let joints: Vec<String> = skin
            .joints
            .iter()
            .map(|&joint| {
                model
                    .nodes()
                    .get(joint)
                    .map_or_else(|| joint.to_string(), |node| node.label())
            })
            .collect();
        println!(
            "[{}] {} ({} joints): {}",
            i,
            skin.name.as_deref().unwrap_or("<unnamed>"),
            skin.joint_count(),
            joints.join(", ")
        );
    }

    println!("\n=== Channels ===");
    let mut table = create_table(&["Clip", "Node", "Property", "Mode", "Keys", "End (s)"]);
    for clip in model.clips() {
        for channel in &clip.channels {
            let node = model
                .nodes()
                .get(channel.target)
                .map_or_else(|| channel.target.to_string(), |node| node.label());
            add_table_row(
                &mut table,
                vec![
                    clip.name.clone(),
                    node,
                    format!("{:?}", channel.property()),
                    format!("{:?}", channel.sampler.mode()),
                    channel.sampler.times().len().to_string(),
                    format!("{:.3}", channel.sampler.end_time()),
                ],
            );
        }
    }
    table.printstd();
}
