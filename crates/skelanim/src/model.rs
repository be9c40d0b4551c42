//! The animated model aggregate
//!
//! An [`AnimatedModel`] owns everything built from one asset: the render
//! buffers, the node table, the skins and the clips. Skins and clips are
//! read-only once the model exists; only node poses and matrices change from
//! frame to frame.

use crate::clip::AnimationClip;
use crate::error::{AnimError, Result};
use crate::hierarchy::NodeTable;
use crate::skinning::Skin;

/// Vertex layout handed to the renderer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Palette slots of up to four influencing joints
    pub joints: [u16; 4],
    /// Influence weights, expected to sum to about 1
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    /// Vertex rigidly bound to palette slot 0
    pub fn from_position(position: [f32; 3]) -> Self {
        Self {
            position,
            normal: [0.0; 3],
            uv: [0.0; 2],
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Range of one primitive inside the flat vertex and index buffers
///
/// Indices are relative to `base_vertex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submesh {
    pub mesh: usize,
    pub base_vertex: u32,
    pub first_index: u32,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct AnimatedModel {
    nodes: NodeTable,
    skins: Vec<Skin>,
    clips: Vec<AnimationClip>,
    vertices: Vec<SkinnedVertex>,
    indices: Vec<u16>,
    submeshes: Vec<Submesh>,
}

impl AnimatedModel {
    /// Assemble a model, checking that skins and clips only reference
    /// existing nodes
    pub fn new(
        nodes: NodeTable,
        skins: Vec<Skin>,
        clips: Vec<AnimationClip>,
        vertices: Vec<SkinnedVertex>,
        indices: Vec<u16>,
        submeshes: Vec<Submesh>,
    ) -> Result<Self> {
        let node_count = nodes.len();

        for (i, skin) in skins.iter().enumerate() {
            if let Some(&joint) = skin.joints.iter().find(|&&j| j >= node_count) {
                return Err(AnimError::InvalidReference(format!(
                    "skin {i} references node {joint}, but there are only {node_count} nodes"
                )));
            }
        }

        for clip in &clips {
            if let Some(channel) = clip.channels.iter().find(|c| c.target >= node_count) {
                return Err(AnimError::InvalidReference(format!(
                    "clip '{}' targets node {}, but there are only {} nodes",
                    clip.name, channel.target, node_count
                )));
            }
        }

        Ok(Self {
            nodes,
            skins,
            clips,
            vertices,
            indices,
            submeshes,
        })
    }

    pub fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    /// Mutable access to node poses
    pub fn nodes_mut(&mut self) -> &mut NodeTable {
        &mut self.nodes
    }

    pub fn skins(&self) -> &[Skin] {
        &self.skins
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index)
    }

    /// Find a clip by name
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }

    pub fn vertices(&self) -> &[SkinnedVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Split borrow used by the per-frame pipeline
    pub(crate) fn pose_parts(&mut self) -> (&mut NodeTable, &[Skin], &[AnimationClip]) {
        (&mut self.nodes, &self.skins, &self.clips)
    }
}
