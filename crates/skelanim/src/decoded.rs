//! Decoded scene data handed over by the asset container decoder
//!
//! These types mirror what a glTF-style decoder produces after it has resolved
//! buffers and accessors into typed arrays. The builder consumes them once at
//! load time; nothing in here is touched per frame.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identity of a node as assigned by the decoder
pub type NodeId = u32;

/// Typed accessor contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Accessor {
    Scalar(Vec<f32>),
    Vec2(Vec<[f32; 2]>),
    Vec3(Vec<[f32; 3]>),
    Vec4(Vec<[f32; 4]>),
    /// Column-major 4x4 matrices
    Mat4(Vec<[f32; 16]>),
    /// Four joint indices per element
    Joints(Vec<[u16; 4]>),
    Indices(Vec<u32>),
}

impl Accessor {
    /// Number of elements in the accessor
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(v) => v.len(),
            Self::Vec2(v) => v.len(),
            Self::Vec3(v) => v.len(),
            Self::Vec4(v) => v.len(),
            Self::Mat4(v) => v.len(),
            Self::Joints(v) => v.len(),
            Self::Indices(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short element type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) => "vec4",
            Self::Mat4(_) => "mat4",
            Self::Joints(_) => "joints",
            Self::Indices(_) => "indices",
        }
    }
}

/// Vertex attribute semantic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    TexCoord(u32),
    Color(u32),
    Joints(u32),
    Weights(u32),
    Custom(String),
}

/// One named attribute stream of a primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedAttribute<A = Accessor> {
    pub semantic: Semantic,
    pub accessor: A,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPrimitive<A = Accessor> {
    #[serde(default = "Vec::new")]
    pub attributes: Vec<DecodedAttribute<A>>,
    /// Index accessor; a missing one means sequential indices
    #[serde(default = "Option::default")]
    pub indices: Option<A>,
}

impl<A> Default for DecodedPrimitive<A> {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            indices: None,
        }
    }
}

impl<A> DecodedPrimitive<A> {
    /// Find the accessor for a semantic
    pub fn attribute(&self, semantic: &Semantic) -> Option<&A> {
        self.attributes
            .iter()
            .find(|a| &a.semantic == semantic)
            .map(|a| &a.accessor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedMesh<A = Accessor> {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "Vec::new")]
    pub primitives: Vec<DecodedPrimitive<A>>,
}

impl<A> Default for DecodedMesh<A> {
    fn default() -> Self {
        Self {
            name: None,
            primitives: Vec::new(),
        }
    }
}

fn default_translation() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A scene node with its default (rest) transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default = "default_translation")]
    pub translation: [f32; 3],
    /// Quaternion as x, y, z, w
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

impl DecodedNode {
    /// Node with identity transform and no children
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: None,
            children: Vec::new(),
            translation: default_translation(),
            rotation: default_rotation(),
            scale: default_scale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSkin<A = Accessor> {
    #[serde(default)]
    pub name: Option<String>,
    pub joints: Vec<NodeId>,
    /// Mat4 accessor; identity matrices when absent
    #[serde(default = "Option::default")]
    pub inverse_bind_matrices: Option<A>,
}

/// Property of a node targeted by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    /// Morph target weights
    Weights,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedSampler<A = Accessor> {
    /// Scalar keyframe times in seconds
    pub input: A,
    pub output: A,
    #[serde(default)]
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedChannel {
    pub sampler: usize,
    pub target_node: NodeId,
    pub path: TargetPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedAnimation<A = Accessor> {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub channels: Vec<DecodedChannel>,
    #[serde(default = "Vec::new")]
    pub samplers: Vec<DecodedSampler<A>>,
}

impl<A> Default for DecodedAnimation<A> {
    fn default() -> Self {
        Self {
            name: None,
            channels: Vec::new(),
            samplers: Vec::new(),
        }
    }
}

/// Everything the builder needs from one asset
///
/// The accessor type is [`Accessor`] once buffers are resolved; scene files
/// are first read with a source type that may still point into a buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedScene<A = Accessor> {
    #[serde(default)]
    pub nodes: Vec<DecodedNode>,
    #[serde(default = "Vec::new")]
    pub meshes: Vec<DecodedMesh<A>>,
    #[serde(default = "Vec::new")]
    pub skins: Vec<DecodedSkin<A>>,
    #[serde(default = "Vec::new")]
    pub animations: Vec<DecodedAnimation<A>>,
}

impl<A> Default for DecodedScene<A> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            animations: Vec::new(),
        }
    }
}

impl<A> DecodedScene<A> {
    /// Convert every accessor in the scene, stopping at the first error
    pub fn try_map_accessors<B>(
        self,
        mut f: impl FnMut(A) -> Result<B>,
    ) -> Result<DecodedScene<B>> {
        let meshes = self
            .meshes
            .into_iter()
            .map(|mesh| -> Result<DecodedMesh<B>> {
                let primitives = mesh
                    .primitives
                    .into_iter()
                    .map(|primitive| -> Result<DecodedPrimitive<B>> {
                        let attributes = primitive
                            .attributes
                            .into_iter()
                            .map(|attribute| -> Result<DecodedAttribute<B>> {
                                Ok(DecodedAttribute {
                                    semantic: attribute.semantic,
                                    accessor: f(attribute.accessor)?,
                                })
                            })
                            .collect::<Result<Vec<_>>>()?;
                        let indices = primitive.indices.map(&mut f).transpose()?;
                        Ok(DecodedPrimitive {
                            attributes,
                            indices,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(DecodedMesh {
                    name: mesh.name,
                    primitives,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let skins = self
            .skins
            .into_iter()
            .map(|skin| -> Result<DecodedSkin<B>> {
                Ok(DecodedSkin {
                    name: skin.name,
                    joints: skin.joints,
                    inverse_bind_matrices: skin.inverse_bind_matrices.map(&mut f).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let animations = self
            .animations
            .into_iter()
            .map(|animation| -> Result<DecodedAnimation<B>> {
                let samplers = animation
                    .samplers
                    .into_iter()
                    .map(|sampler| -> Result<DecodedSampler<B>> {
                        Ok(DecodedSampler {
                            input: f(sampler.input)?,
                            output: f(sampler.output)?,
                            interpolation: sampler.interpolation,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(DecodedAnimation {
                    name: animation.name,
                    channels: animation.channels,
                    samplers,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DecodedScene {
            nodes: self.nodes,
            meshes,
            skins,
            animations,
        })
    }
}
