//! Construction of an [`AnimatedModel`] from decoded scene data
//!
//! All validation happens here, once, so the per-frame pipeline can work on
//! the result without any further checks.

use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3, Vec4};
use log::{debug, info};

use crate::clip::{AnimationClip, Channel};
use crate::decoded::{
    Accessor, DecodedAnimation, DecodedMesh, DecodedNode, DecodedPrimitive, DecodedScene,
    DecodedSkin, Interpolation, NodeId, Semantic, TargetPath,
};
use crate::error::{AnimError, Result};
use crate::hierarchy::{Node, NodeTable, Transform};
use crate::model::{AnimatedModel, SkinnedVertex, Submesh};
use crate::sampler::{InterpolationMode, Keyframes, Property, Sampler};
use crate::skinning::Skin;

/// Largest vertex count addressable with 16-bit indices
const MAX_PRIMITIVE_VERTICES: usize = u16::MAX as usize + 1;

/// Build an animated model from everything the decoder extracted
pub fn build_model(scene: &DecodedScene) -> Result<AnimatedModel> {
    let (nodes, ids) = build_nodes(&scene.nodes)?;

    let mut meshes = MeshBuffers::default();
    for (mesh_index, mesh) in scene.meshes.iter().enumerate() {
        meshes.append_mesh(mesh_index, mesh)?;
    }

    let skins = scene
        .skins
        .iter()
        .enumerate()
        .map(|(i, skin)| build_skin(i, skin, &ids))
        .collect::<Result<Vec<_>>>()?;

    let clips = scene
        .animations
        .iter()
        .enumerate()
        .map(|(i, animation)| build_clip(i, animation, &ids))
        .collect::<Result<Vec<_>>>()?;

    let model = AnimatedModel::new(
        nodes,
        skins,
        clips,
        meshes.vertices,
        meshes.indices,
        meshes.submeshes,
    )?;

    info!(
        "Built animated model: {} nodes, {} vertices, {} indices, {} skins, {} clips",
        model.nodes().len(),
        model.vertices().len(),
        model.indices().len(),
        model.skins().len(),
        model.clips().len()
    );

    Ok(model)
}

/// Mapping from decoder node ids to node table indices
#[derive(Debug, Default)]
struct NodeIds(HashMap<NodeId, usize>);

impl NodeIds {
    fn resolve(&self, id: NodeId, context: &str) -> Result<usize> {
        self.0.get(&id).copied().ok_or_else(|| {
            AnimError::InvalidReference(format!("{context} references unknown node id {id}"))
        })
    }
}

fn node_transform(node: &DecodedNode) -> Transform {
    Transform {
        translation: Vec3::from(node.translation),
        rotation: Vec4::from(node.rotation)
            .try_normalize()
            .map_or(Quat::IDENTITY, Quat::from_vec4),
        scale: Vec3::from(node.scale),
    }
}

fn build_nodes(decoded: &[DecodedNode]) -> Result<(NodeTable, NodeIds)> {
    let mut ids = NodeIds::default();
    for (index, node) in decoded.iter().enumerate() {
        if ids.0.insert(node.id, index).is_some() {
            return Err(AnimError::InvalidHierarchy(format!(
                "node id {} appears more than once",
                node.id
            )));
        }
    }

    let mut nodes: Vec<Node> = decoded
        .iter()
        .enumerate()
        .map(|(index, d)| {
            let mut node = Node::new(index, node_transform(d));
            node.name.clone_from(&d.name);
            node
        })
        .collect();

    for (parent, d) in decoded.iter().enumerate() {
        for &child_id in &d.children {
            let child = ids.resolve(child_id, &format!("node {}", d.id))?;
            if let Some(existing) = nodes[child].parent {
                return Err(AnimError::InvalidHierarchy(format!(
                    "node id {} is a child of both node {} and node {}",
                    child_id, decoded[existing].id, d.id
                )));
            }
            nodes[child].parent = Some(parent);
            nodes[parent].children.push(child);
        }
    }

    let table = NodeTable::new(nodes)?;
    debug!(
        "Resolved {} nodes into {} root(s)",
        table.len(),
        table.roots().len()
    );
    Ok((table, ids))
}

/// Flat render buffers accumulated over all primitives
#[derive(Debug, Default)]
struct MeshBuffers {
    vertices: Vec<SkinnedVertex>,
    indices: Vec<u16>,
    submeshes: Vec<Submesh>,
}

/// Look up an optional attribute and check it has one element per vertex
fn optional_attribute<'a, T>(
    primitive: &'a DecodedPrimitive,
    semantic: &Semantic,
    vertex_count: usize,
    extract: fn(&'a Accessor) -> Option<&'a [T]>,
) -> Result<Option<&'a [T]>> {
    let Some(accessor) = primitive.attribute(semantic) else {
        return Ok(None);
    };
    let Some(values) = extract(accessor) else {
        return Err(AnimError::MalformedAccessor(format!(
            "{semantic:?} attribute has element type {}",
            accessor.kind()
        )));
    };
    if values.len() != vertex_count {
        return Err(AnimError::MalformedAccessor(format!(
            "{semantic:?} attribute has {} elements but the primitive has {} vertices",
            values.len(),
            vertex_count
        )));
    }
    Ok(Some(values))
}

impl MeshBuffers {
    fn append_mesh(&mut self, mesh_index: usize, mesh: &DecodedMesh) -> Result<()> {
        let mesh_name = mesh
            .name
            .clone()
            .unwrap_or_else(|| format!("mesh_{mesh_index}"));

        for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
            self.append_primitive(mesh_index, &mesh_name, primitive_index, primitive)?;
        }
        Ok(())
    }

    fn append_primitive(
        &mut self,
        mesh_index: usize,
        mesh_name: &str,
        primitive_index: usize,
        primitive: &DecodedPrimitive,
    ) -> Result<()> {
        let Some(position) = primitive.attribute(&Semantic::Position) else {
            return Err(AnimError::MissingRequiredAttribute {
                mesh: mesh_name.to_string(),
                primitive: primitive_index,
                attribute: "POSITION",
            });
        };
        let Accessor::Vec3(positions) = position else {
            return Err(AnimError::MalformedAccessor(format!(
                "mesh '{mesh_name}' primitive {primitive_index} has {} positions",
                position.kind()
            )));
        };

        let vertex_count = positions.len();
        if vertex_count > MAX_PRIMITIVE_VERTICES {
            return Err(AnimError::IndexSpaceOverflow {
                mesh: mesh_name.to_string(),
                primitive: primitive_index,
                vertex_count,
            });
        }

        let normals = optional_attribute(primitive, &Semantic::Normal, vertex_count, |a| {
            match a {
                Accessor::Vec3(v) => Some(v.as_slice()),
                _ => None,
            }
        })?;
        let uvs = optional_attribute(primitive, &Semantic::TexCoord(0), vertex_count, |a| {
            match a {
                Accessor::Vec2(v) => Some(v.as_slice()),
                _ => None,
            }
        })?;
        let joints = optional_attribute(primitive, &Semantic::Joints(0), vertex_count, |a| {
            match a {
                Accessor::Joints(v) => Some(v.as_slice()),
                _ => None,
            }
        })?;
        let weights = optional_attribute(primitive, &Semantic::Weights(0), vertex_count, |a| {
            match a {
                Accessor::Vec4(v) => Some(v.as_slice()),
                _ => None,
            }
        })?;

        let base_vertex = self.vertices.len() as u32;
        let first_index = self.indices.len() as u32;

        self.vertices
            .extend(positions.iter().enumerate().map(|(i, &position)| {
                let mut vertex = SkinnedVertex::from_position(position);
                if let Some(normals) = normals {
                    vertex.normal = normals[i];
                }
                if let Some(uvs) = uvs {
                    vertex.uv = uvs[i];
                }
                if let Some(joints) = joints {
                    vertex.joints = joints[i];
                }
                if let Some(weights) = weights {
                    vertex.weights = weights[i];
                }
                vertex
            }));

        match &primitive.indices {
            None => self.indices.extend((0..vertex_count).map(|i| i as u16)),
            Some(Accessor::Indices(indices)) => {
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(AnimError::MalformedAccessor(format!(
                        "mesh '{mesh_name}' primitive {primitive_index} index {bad} is out of range for {vertex_count} vertices"
                    )));
                }
                self.indices.extend(indices.iter().map(|&i| i as u16));
            }
            Some(other) => {
                return Err(AnimError::MalformedAccessor(format!(
                    "mesh '{mesh_name}' primitive {primitive_index} has {} indices",
                    other.kind()
                )));
            }
        }

        let index_count = self.indices.len() as u32 - first_index;
        self.submeshes.push(Submesh {
            mesh: mesh_index,
            base_vertex,
            first_index,
            index_count,
        });

        debug!(
            "Mesh '{}' primitive {}: {} vertices, {} indices",
            mesh_name, primitive_index, vertex_count, index_count
        );
        Ok(())
    }
}

fn build_skin(skin_index: usize, skin: &DecodedSkin, ids: &NodeIds) -> Result<Skin> {
    let context = format!("skin {skin_index}");
    let joints = skin
        .joints
        .iter()
        .map(|&id| ids.resolve(id, &context))
        .collect::<Result<Vec<_>>>()?;

    let inverse_bind_matrices = match &skin.inverse_bind_matrices {
        None => vec![Mat4::IDENTITY; joints.len()],
        Some(Accessor::Mat4(matrices)) => matrices.iter().map(Mat4::from_cols_array).collect(),
        Some(other) => {
            return Err(AnimError::MalformedAccessor(format!(
                "{context} inverse bind matrices have element type {}",
                other.kind()
            )));
        }
    };

    Skin::new(skin.name.clone(), joints, inverse_bind_matrices)
}

/// Output values laid out contiguously, one sample after another
///
/// The element type has to match the property: `vec4` for rotations, `vec3`
/// for translation and scale. Flat scalar buffers are accepted for both.
fn flatten_output(property: Property, accessor: &Accessor) -> Option<Vec<f32>> {
    match (property, accessor) {
        (_, Accessor::Scalar(v)) => Some(v.clone()),
        (Property::Translation | Property::Scale, Accessor::Vec3(v)) => {
            Some(v.iter().flatten().copied().collect())
        }
        (Property::Rotation, Accessor::Vec4(v)) => Some(v.iter().flatten().copied().collect()),
        _ => None,
    }
}

fn build_clip(index: usize, animation: &DecodedAnimation, ids: &NodeIds) -> Result<AnimationClip> {
    let name = animation
        .name
        .clone()
        .unwrap_or_else(|| format!("clip_{index}"));

    let mut channels = Vec::with_capacity(animation.channels.len());
    for (channel_index, channel) in animation.channels.iter().enumerate() {
        let context = format!("clip '{name}' channel {channel_index}");

        let property = match channel.path {
            TargetPath::Translation => Property::Translation,
            TargetPath::Rotation => Property::Rotation,
            TargetPath::Scale => Property::Scale,
            TargetPath::Weights => {
                debug!("Skipping {context}: morph target weights are not animated");
                continue;
            }
        };

        let Some(sampler) = animation.samplers.get(channel.sampler) else {
            return Err(AnimError::InvalidReference(format!(
                "{context} uses sampler {} of {}",
                channel.sampler,
                animation.samplers.len()
            )));
        };

        let mode = match sampler.interpolation {
            Interpolation::Linear => InterpolationMode::Linear,
            Interpolation::Step => InterpolationMode::Step,
            Interpolation::CubicSpline => {
                return Err(AnimError::UnsupportedInterpolation(format!(
                    "{context} uses cubic spline interpolation"
                )));
            }
        };

        let Accessor::Scalar(times) = &sampler.input else {
            return Err(AnimError::MalformedAccessor(format!(
                "{context} input times have element type {}",
                sampler.input.kind()
            )));
        };
        let Some(output) = flatten_output(property, &sampler.output) else {
            return Err(AnimError::MalformedAccessor(format!(
                "{context} output has element type {} for {:?}",
                sampler.output.kind(),
                property
            )));
        };

        let keyframes = Keyframes::from_flat(property, &output)?;
        let target = ids.resolve(channel.target_node, &context)?;
        channels.push(Channel {
            target,
            sampler: Sampler::new(times.clone(), keyframes, mode)?,
        });
    }

    let clip = AnimationClip::new(name, channels);
    debug!(
        "Clip '{}': {} channels, {:.3}s",
        clip.name,
        clip.channels.len(),
        clip.duration
    );
    Ok(clip)
}
