//! `skelanim tree`

use anyhow::Result;
use skelanim::{AnimatedModel, Node};
use std::collections::HashSet;
use std::path::Path;

use super::load_model;
use crate::utils::{NodeType, TreeNode, TreeOptions, format_vec3, render_tree};

pub fn execute(path: &Path, depth: Option<usize>, no_color: bool, compact: bool) -> Result<()> {
    let model = load_model(path)?;

    let scene_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let root = build_tree(&model, scene_name);
    let options = TreeOptions {
        max_depth: depth,
        no_color,
        show_metadata: true,
        compact,
    };

    print!("{}", render_tree(&root, &options));
    Ok(())
}

/// Build the display tree for every root of the node table
pub fn build_tree(model: &AnimatedModel, scene_name: String) -> TreeNode {
    let joints: HashSet<usize> = model
        .skins()
        .iter()
        .flat_map(|skin| skin.joints.iter().copied())
        .collect();

    model
        .nodes()
        .roots()
        .iter()
        .filter_map(|&index| model.nodes().get(index))
        .fold(TreeNode::new(scene_name, NodeType::Scene), |tree, node| {
            tree.add_child(node_subtree(model, node, &joints))
        })
}

fn node_subtree(model: &AnimatedModel, node: &Node, joints: &HashSet<usize>) -> TreeNode {
    let node_type = if joints.contains(&node.index()) {
        NodeType::Joint
    } else {
        NodeType::Node
    };

    let rest = node.rest;
    let mut tree = TreeNode::new(node.label(), node_type)
        .with_metadata("t", &format_vec3(rest.translation.to_array()))
        .with_metadata("r", &format!("{:.3?}", rest.rotation.to_array()))
        .with_metadata("s", &format_vec3(rest.scale.to_array()));

    for child in node.children().iter().filter_map(|&c| model.nodes().get(c)) {
        tree = tree.add_child(node_subtree(model, child, joints));
    }
    tree
}
