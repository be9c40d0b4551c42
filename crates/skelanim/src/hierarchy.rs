//! Node hierarchy and global transform evaluation
//!
//! Nodes live in a flat table and refer to each other by index. Evaluation
//! walks every root depth-first with an explicit stack, so parents are always
//! resolved before their children regardless of table order.

use glam::{Mat4, Quat, Vec3};

use crate::error::{AnimError, Result};

/// Translation, rotation and scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Local matrix `T * R * S`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One entry of the skeleton hierarchy
///
/// Links and matrices are only writable inside the crate; once a node sits in
/// a validated [`NodeTable`] callers can change its pose through
/// [`NodeTable::transform_mut`] and nothing else.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) index: usize,
    pub name: Option<String>,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    /// Current pose, written by the sampler
    pub transform: Transform,
    /// Pose the node was loaded with
    pub rest: Transform,
    pub(crate) local_matrix: Mat4,
    pub(crate) global_matrix: Mat4,
}

impl Node {
    pub fn new(index: usize, transform: Transform) -> Self {
        Self {
            index,
            name: None,
            parent: None,
            children: Vec::new(),
            transform,
            rest: transform,
            local_matrix: Mat4::IDENTITY,
            global_matrix: Mat4::IDENTITY,
        }
    }

    /// Set the parent link, checked when the node table is built
    pub fn with_parent(mut self, parent: Option<usize>) -> Self {
        self.parent = parent;
        self
    }

    /// Set the child links, checked when the node table is built
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    /// Position in the node table
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parent table index, `None` for roots
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    pub fn global_matrix(&self) -> Mat4 {
        self.global_matrix
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Display name, falling back to the table index
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("node_{}", self.index))
    }
}

/// Validated forest of nodes
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    /// Traversal scratch reused between frames
    stack: Vec<(usize, Option<Mat4>)>,
}

impl NodeTable {
    /// Build a table from nodes whose parent and child links are already set
    ///
    /// Fails unless every non-root node has exactly one parent that lists it
    /// exactly once, and every node is reachable from a root.
    pub fn new(mut nodes: Vec<Node>) -> Result<Self> {
        let count = nodes.len();
        for (index, node) in nodes.iter_mut().enumerate() {
            node.index = index;
        }

        for node in &nodes {
            if let Some(parent) = node.parent {
                let Some(parent_node) = nodes.get(parent) else {
                    return Err(AnimError::InvalidHierarchy(format!(
                        "node {} has parent {} outside of the table ({} nodes)",
                        node.index, parent, count
                    )));
                };
                let listed = parent_node
                    .children
                    .iter()
                    .filter(|&&c| c == node.index)
                    .count();
                if listed != 1 {
                    return Err(AnimError::InvalidHierarchy(format!(
                        "node {} is listed {} times as a child of its parent {}",
                        node.index, listed, parent
                    )));
                }
            }
            for &child in &node.children {
                match nodes.get(child) {
                    Some(c) if c.parent == Some(node.index) => {}
                    Some(_) => {
                        return Err(AnimError::InvalidHierarchy(format!(
                            "node {} lists child {} whose parent is different",
                            node.index, child
                        )));
                    }
                    None => {
                        return Err(AnimError::InvalidHierarchy(format!(
                            "node {} lists child {} outside of the table",
                            node.index, child
                        )));
                    }
                }
            }
        }

        let roots: Vec<usize> = nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.index)
            .collect();

        // Anything not reachable from a root sits on a cycle
        let mut visited = 0usize;
        let mut pending = roots.clone();
        while let Some(index) = pending.pop() {
            visited += 1;
            pending.extend_from_slice(&nodes[index].children);
        }
        if visited != count {
            return Err(AnimError::InvalidHierarchy(format!(
                "{} of {} nodes are part of a cycle",
                count - visited,
                count
            )));
        }

        let mut table = Self {
            nodes,
            roots,
            stack: Vec::with_capacity(count),
        };
        evaluate_hierarchy(&mut table);
        Ok(table)
    }

    /// Build a table from a parent list, children ordered by index
    pub fn from_parents(parents: &[Option<usize>], transforms: &[Transform]) -> Result<Self> {
        let mut nodes: Vec<Node> = parents
            .iter()
            .enumerate()
            .map(|(i, &parent)| {
                let mut node = Node::new(i, transforms.get(i).copied().unwrap_or_default());
                node.parent = parent;
                node
            })
            .collect();

        for (i, &parent) in parents.iter().enumerate() {
            if let Some(parent) = parent
                && let Some(parent_node) = nodes.get_mut(parent)
            {
                parent_node.children.push(i);
            }
        }

        Self::new(nodes)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// Mutable pose of a node; links stay as validated
    pub fn transform_mut(&mut self, index: usize) -> Option<&mut Transform> {
        self.nodes.get_mut(index).map(|n| &mut n.transform)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Global matrix of a node, identity for unknown indices
    pub fn global(&self, index: usize) -> Mat4 {
        self.nodes
            .get(index)
            .map_or(Mat4::IDENTITY, |n| n.global_matrix)
    }

    /// Put every node back into its rest pose (matrices are not updated)
    pub fn reset_to_rest(&mut self) {
        for node in &mut self.nodes {
            node.transform = node.rest;
        }
    }

    /// Find a node by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
    }
}

/// Recompute local and global matrices of every node from its current TRS
pub fn evaluate_hierarchy(table: &mut NodeTable) {
    let NodeTable {
        nodes,
        roots,
        stack,
    } = table;

    stack.clear();
    stack.extend(roots.iter().rev().map(|&r| (r, None)));

    while let Some((index, parent_global)) = stack.pop() {
        let node = &mut nodes[index];
        node.local_matrix = node.transform.to_matrix();
        node.global_matrix = match parent_global {
            Some(parent) => parent * node.local_matrix,
            None => node.local_matrix,
        };

        let global = node.global_matrix;
        stack.extend(node.children.iter().rev().map(|&c| (c, Some(global))));
    }
}
