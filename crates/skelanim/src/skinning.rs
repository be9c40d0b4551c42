//! Joint matrix palette computation and CPU vertex skinning
//!
//! The palette holds one matrix per skin joint, `global(joint) * inverse_bind`,
//! in the order the skin lists its joints. It is what a GPU skinning shader
//! consumes each frame. [`JointPalette::skin_vertex`] applies the same
//! linear-blend skinning on the CPU, which is handy for tools and for checking
//! the palette against direct joint transforms.

use glam::{Mat3, Mat4, Vec3};

use crate::error::{AnimError, Result};
use crate::hierarchy::NodeTable;
use crate::model::SkinnedVertex;

/// Default palette capacity
pub const DEFAULT_MAX_JOINTS: usize = 64;

/// Weights at or below this are ignored
const WEIGHT_THRESHOLD: f32 = 1e-6;

/// Inverse-transpose of the upper 3x3, which keeps normals perpendicular to
/// the surface under non-uniform scale. Singular matrices fall back to the
/// linear part as is.
fn normal_matrix(matrix: &Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(*matrix);
    if linear.determinant().abs() <= f32::EPSILON {
        return linear;
    }
    linear.inverse().transpose()
}

/// Binding of skeleton joints to inverse-bind matrices
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    pub name: Option<String>,
    /// Node table indices, palette slot order
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Mat4>,
}

impl Skin {
    pub fn new(
        name: Option<String>,
        joints: Vec<usize>,
        inverse_bind_matrices: Vec<Mat4>,
    ) -> Result<Self> {
        if joints.len() != inverse_bind_matrices.len() {
            return Err(AnimError::MalformedAccessor(format!(
                "skin has {} joints but {} inverse bind matrices",
                joints.len(),
                inverse_bind_matrices.len()
            )));
        }
        Ok(Self {
            name,
            joints,
            inverse_bind_matrices,
        })
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

/// Result of skinning one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedPoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Per-frame joint matrices for one skin
#[derive(Debug, Clone)]
pub struct JointPalette {
    matrices: Vec<Mat4>,
    capacity: usize,
}

impl JointPalette {
    pub fn new(capacity: usize) -> Self {
        Self {
            matrices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Recompute every slot from the current global matrices
    ///
    /// Joints past the palette capacity are dropped.
    pub fn compute(&mut self, skin: &Skin, nodes: &NodeTable) {
        self.matrices.clear();
        self.matrices.extend(
            skin.joints
                .iter()
                .zip(&skin.inverse_bind_matrices)
                .take(self.capacity)
                .map(|(&joint, inverse_bind)| nodes.global(joint) * *inverse_bind),
        );
    }

    /// Empty the palette (no skin bound)
    pub fn clear(&mut self) {
        self.matrices.clear();
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn get(&self, slot: usize) -> Option<&Mat4> {
        self.matrices.get(slot)
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Column-major matrices ready for upload
    pub fn as_cols_arrays(&self) -> Vec<[f32; 16]> {
        self.matrices.iter().map(Mat4::to_cols_array).collect()
    }

    /// Linear-blend skin a bind-pose vertex with the current palette
    ///
    /// Weights are renormalized over the influences that hit a palette slot.
    /// Normals go through each joint's normal matrix and are renormalized.
    /// A vertex with no usable influence keeps its bind-pose position.
    pub fn skin_vertex(&self, vertex: &SkinnedVertex) -> SkinnedPoint {
        let bind_position = Vec3::from(vertex.position);
        let bind_normal = Vec3::from(vertex.normal);

        let mut position = Vec3::ZERO;
        let mut normal = Vec3::ZERO;
        let mut total_weight = 0.0f32;

        for (&joint, &weight) in vertex.joints.iter().zip(&vertex.weights) {
            if weight <= WEIGHT_THRESHOLD {
                continue;
            }
            let Some(matrix) = self.matrices.get(joint as usize) else {
                continue;
            };
            position += matrix.transform_point3(bind_position) * weight;
            normal += normal_matrix(matrix) * bind_normal * weight;
            total_weight += weight;
        }

        if total_weight <= WEIGHT_THRESHOLD {
            return SkinnedPoint {
                position: bind_position,
                normal: bind_normal,
            };
        }

        SkinnedPoint {
            position: position / total_weight,
            normal: normal.normalize_or_zero(),
        }
    }
}

impl Default for JointPalette {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOINTS)
    }
}
