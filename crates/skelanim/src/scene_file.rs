//! JSON scene files
//!
//! A scene file is the serialized form of [`DecodedScene`]. Any accessor may
//! be written inline:
//!
//! ```json
//! { "type": "vec3", "data": [[0.0, 1.0, 0.0]] }
//! ```
//!
//! or as a view into an external little-endian binary buffer, resolved
//! relative to the scene file:
//!
//! ```json
//! { "buffer": "skin.bin", "byte_offset": 64, "count": 12, "type": "mat4" }
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info};
use serde::Deserialize;

use crate::decoded::{Accessor, DecodedScene};
use crate::error::{AnimError, Result};

/// Element layout of a buffer view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ViewKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Joints,
    Indices,
    /// 16-bit indices, widened on load
    IndicesU16,
}

impl ViewKind {
    fn element_size(self) -> usize {
        match self {
            Self::Scalar | Self::Indices => 4,
            Self::Vec2 => 8,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
            Self::Joints => 8,
            Self::IndicesU16 => 2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BufferView {
    buffer: String,
    #[serde(default)]
    byte_offset: usize,
    count: usize,
    #[serde(rename = "type")]
    kind: ViewKind,
}

/// Binary buffers loaded so far, keyed by the name used in the scene
struct BufferCache {
    base_dir: PathBuf,
    buffers: HashMap<String, Vec<u8>>,
}

impl BufferCache {
    fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            buffers: HashMap::new(),
        }
    }

    fn load(&mut self, name: &str) -> Result<&[u8]> {
        let bytes = match self.buffers.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.base_dir.join(name);
                let bytes =
                    fs::read(&path).map_err(|source| AnimError::BufferLoad { path, source })?;
                debug!("Loaded buffer '{}' ({} bytes)", name, bytes.len());
                entry.insert(bytes)
            }
        };
        Ok(bytes.as_slice())
    }

    fn read_view(&mut self, view: &BufferView) -> Result<Accessor> {
        let bytes = self.load(&view.buffer)?;
        let start = view.byte_offset;
        let end = view
            .count
            .checked_mul(view.kind.element_size())
            .and_then(|size| start.checked_add(size))
            .filter(|&end| end <= bytes.len())
            .ok_or_else(|| {
                AnimError::BufferRange(format!(
                    "view of {} {:?} elements at offset {} exceeds buffer '{}' ({} bytes)",
                    view.count,
                    view.kind,
                    start,
                    view.buffer,
                    bytes.len()
                ))
            })?;

        let mut cursor = Cursor::new(&bytes[start..end]);
        let accessor = read_accessor(&mut cursor, view.kind, view.count).map_err(|e| {
            AnimError::BufferRange(format!("reading buffer '{}': {e}", view.buffer))
        })?;

        if let Some(position) = first_non_finite(&accessor) {
            return Err(AnimError::MalformedAccessor(format!(
                "{:?} view into buffer '{}' at offset {} has a non-finite value in element {}",
                view.kind, view.buffer, start, position
            )));
        }
        Ok(accessor)
    }
}

fn read_groups<const N: usize>(reader: &mut impl Read, count: usize) -> io::Result<Vec<[f32; N]>> {
    let mut groups = vec![[0.0; N]; count];
    for group in &mut groups {
        reader.read_f32_into::<LittleEndian>(group)?;
    }
    Ok(groups)
}

fn read_accessor(reader: &mut impl Read, kind: ViewKind, count: usize) -> io::Result<Accessor> {
    Ok(match kind {
        ViewKind::Scalar => {
            let mut values = vec![0.0; count];
            reader.read_f32_into::<LittleEndian>(&mut values)?;
            Accessor::Scalar(values)
        }
        ViewKind::Vec2 => Accessor::Vec2(read_groups(reader, count)?),
        ViewKind::Vec3 => Accessor::Vec3(read_groups(reader, count)?),
        ViewKind::Vec4 => Accessor::Vec4(read_groups(reader, count)?),
        ViewKind::Mat4 => Accessor::Mat4(read_groups(reader, count)?),
        ViewKind::Joints => {
            let mut joints = vec![[0u16; 4]; count];
            for element in &mut joints {
                reader.read_u16_into::<LittleEndian>(element)?;
            }
            Accessor::Joints(joints)
        }
        ViewKind::Indices => {
            let mut indices = vec![0u32; count];
            reader.read_u32_into::<LittleEndian>(&mut indices)?;
            Accessor::Indices(indices)
        }
        ViewKind::IndicesU16 => {
            let mut indices = vec![0u16; count];
            reader.read_u16_into::<LittleEndian>(&mut indices)?;
            Accessor::Indices(indices.into_iter().map(u32::from).collect())
        }
    })
}

/// Index of the first element holding a NaN or infinity
fn first_non_finite(accessor: &Accessor) -> Option<usize> {
    fn find<const N: usize>(groups: &[[f32; N]]) -> Option<usize> {
        groups.iter().position(|g| g.iter().any(|v| !v.is_finite()))
    }
    match accessor {
        Accessor::Scalar(v) => v.iter().position(|v| !v.is_finite()),
        Accessor::Vec2(v) => find(v),
        Accessor::Vec3(v) => find(v),
        Accessor::Vec4(v) => find(v),
        Accessor::Mat4(v) => find(v),
        Accessor::Joints(_) | Accessor::Indices(_) => None,
    }
}

/// An accessor as written in a scene file, before buffers are read
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccessorSource {
    Inline(Accessor),
    View(BufferView),
}

/// Parse a scene from JSON text, resolving buffers against `base_dir`
pub fn parse_scene(json: &str, base_dir: &Path) -> Result<DecodedScene> {
    let source: DecodedScene<AccessorSource> = serde_json::from_str(json)?;
    let mut buffers = BufferCache::new(base_dir);
    let scene = source.try_map_accessors(|accessor| match accessor {
        AccessorSource::Inline(accessor) => Ok(accessor),
        AccessorSource::View(view) => buffers.read_view(&view),
    })?;

    debug!(
        "Parsed scene: {} nodes, {} meshes, {} skins, {} animations, {} external buffers",
        scene.nodes.len(),
        scene.meshes.len(),
        scene.skins.len(),
        scene.animations.len(),
        buffers.buffers.len()
    );
    Ok(scene)
}

/// Load a scene file from disk
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<DecodedScene> {
    let path = path.as_ref();
    info!("Loading scene from {}", path.display());

    let text = fs::read_to_string(path).map_err(|source| AnimError::BufferLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&text, base_dir)
}
