//! Command implementations

pub mod info;
pub mod play;
pub mod tree;

use anyhow::{Context, Result};
use skelanim::{AnimatedModel, build_model, load_scene};
use std::path::Path;

/// Load a scene file and build its model
pub fn load_model(path: &Path) -> Result<AnimatedModel> {
    let scene = load_scene(path)
        .with_context(|| format!("Failed to load scene from {}", path.display()))?;
    build_model(&scene).with_context(|| format!("Failed to build model from {}", path.display()))
}
