//! glTF 2.0 (`.gltf` + external `.bin`) import.
//!
//! Only triangle-list primitives are imported. Morph targets and textures
//! are ignored. Skins and node animations (translation, rotation, scale) are
//! decoded; cubic-spline channels keep their keyframe values and play back
//! linearly.

use crate::animation::{AnimationChannel, AnimationClip, Interpolation, Keyframes};
use crate::error::AssetError;
use crate::scene::{MeshData, ModelAsset, Primitive, Scene, SceneNode, Skin};
use glam::{Mat4, Quat, Vec3};
use modelview_common::Transform;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;

const READ_CHUNK: usize = 64 * 1024;
const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
/// Upper bound on components for accessors that have no backing buffer.
const MAX_UNBACKED_COMPONENTS: usize = 1 << 26;

const COMPONENT_I8: u32 = 5120;
const COMPONENT_U8: u32 = 5121;
const COMPONENT_I16: u32 = 5122;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;
const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: AssetInfo,
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<SceneDef>,
    #[serde(default)]
    nodes: Vec<NodeDef>,
    #[serde(default)]
    meshes: Vec<MeshDef>,
    #[serde(default)]
    materials: Vec<MaterialDef>,
    #[serde(default)]
    skins: Vec<SkinDef>,
    #[serde(default)]
    accessors: Vec<AccessorDef>,
    #[serde(default)]
    buffer_views: Vec<BufferViewDef>,
    #[serde(default)]
    buffers: Vec<BufferDef>,
    #[serde(default)]
    animations: Vec<AnimationDef>,
}

#[derive(Debug, Deserialize)]
struct AssetInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct SceneDef {
    name: Option<String>,
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct NodeDef {
    name: Option<String>,
    #[serde(default)]
    children: Vec<usize>,
    mesh: Option<usize>,
    skin: Option<usize>,
    translation: Option<[f32; 3]>,
    rotation: Option<[f32; 4]>,
    scale: Option<[f32; 3]>,
    matrix: Option<[f32; 16]>,
}

#[derive(Debug, Deserialize)]
struct MeshDef {
    name: Option<String>,
    primitives: Vec<PrimitiveDef>,
}

#[derive(Debug, Deserialize)]
struct PrimitiveDef {
    attributes: BTreeMap<String, usize>,
    indices: Option<usize>,
    material: Option<usize>,
    mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDef {
    pbr_metallic_roughness: Option<PbrDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PbrDef {
    base_color_factor: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkinDef {
    #[serde(default)]
    joints: Vec<usize>,
    inverse_bind_matrices: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessorDef {
    buffer_view: Option<usize>,
    #[serde(default)]
    byte_offset: usize,
    component_type: u32,
    #[serde(default)]
    normalized: bool,
    count: usize,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewDef {
    buffer: usize,
    #[serde(default)]
    byte_offset: usize,
    byte_length: usize,
    byte_stride: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BufferDef {
    uri: Option<String>,
    byte_length: usize,
}

#[derive(Debug, Deserialize)]
struct AnimationDef {
    name: Option<String>,
    #[serde(default)]
    channels: Vec<ChannelDef>,
    #[serde(default)]
    samplers: Vec<SamplerDef>,
}

#[derive(Debug, Deserialize)]
struct ChannelDef {
    sampler: usize,
    target: TargetDef,
}

#[derive(Debug, Deserialize)]
struct TargetDef {
    node: Option<usize>,
    path: String,
}

#[derive(Debug, Deserialize)]
struct SamplerDef {
    input: usize,
    output: usize,
    interpolation: Option<String>,
}

/// Reports monotonic progress as a fraction of bytes read.
struct Progress<'a> {
    loaded: u64,
    total: u64,
    last: f32,
    report: &'a mut dyn FnMut(f32),
}

impl Progress<'_> {
    fn advance(&mut self, bytes: u64) {
        self.loaded += bytes;
        let fraction = if self.total == 0 {
            1.0
        } else {
            (self.loaded as f64 / self.total as f64).min(1.0) as f32
        };
        if fraction > self.last {
            self.last = fraction;
            (self.report)(fraction);
        }
    }
}

/// Load a `.gltf` model and its external buffers, blocking the caller.
///
/// `progress` receives non-decreasing fractions in `(0, 1]`.
pub fn load_gltf(
    path: impl AsRef<Path>,
    mut progress: impl FnMut(f32),
) -> Result<ModelAsset, AssetError> {
    let path = path.as_ref();
    let _span = tracing::info_span!("load_gltf", path = %path.display()).entered();

    let text = std::fs::read(path)?;
    let digest = hex_digest(&text);
    let doc: Document = serde_json::from_slice(&text)?;
    if !doc.asset.version.starts_with('2') {
        return Err(AssetError::GltfParse(format!(
            "unsupported glTF version {}",
            doc.asset.version
        )));
    }

    let declared: u64 = doc.buffers.iter().map(|b| b.byte_length as u64).sum();
    let mut progress = Progress {
        loaded: 0,
        total: text.len() as u64 + declared,
        last: 0.0,
        report: &mut progress,
    };
    progress.advance(text.len() as u64);

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut buffers = Vec::with_capacity(doc.buffers.len());
    for (i, buffer) in doc.buffers.iter().enumerate() {
        buffers.push(read_buffer(base_dir, i, buffer, &mut progress)?);
    }

    let meshes = doc
        .meshes
        .iter()
        .enumerate()
        .map(|(i, mesh)| decode_mesh(&doc, &buffers, i, mesh))
        .collect::<Result<Vec<_>, _>>()?;
    let skins = doc
        .skins
        .iter()
        .enumerate()
        .map(|(i, skin)| decode_skin(&doc, &buffers, i, skin))
        .collect::<Result<Vec<_>, _>>()?;
    let scene = build_scene(&doc)?;
    let animations = doc
        .animations
        .iter()
        .enumerate()
        .map(|(i, anim)| decode_animation(&doc, &buffers, i, anim))
        .collect::<Result<Vec<_>, _>>()?;

    // Guarantees a final 100% report even when buffers were over-declared.
    progress.advance(progress.total);

    tracing::debug!(
        nodes = scene.node_count(),
        meshes = meshes.len(),
        skins = skins.len(),
        animations = animations.len(),
        "glTF decoded"
    );
    Ok(ModelAsset {
        scene,
        meshes,
        skins,
        animations,
        digest,
    })
}

fn hex_digest(bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

fn read_buffer(
    base_dir: &Path,
    index: usize,
    def: &BufferDef,
    progress: &mut Progress<'_>,
) -> Result<Vec<u8>, AssetError> {
    let Some(uri) = def.uri.as_deref() else {
        return Err(AssetError::GltfParse(format!(
            "buffer {index} has no uri (binary glTF is not supported)"
        )));
    };
    if uri.starts_with("data:") {
        return Err(AssetError::UnsupportedUri(format!(
            "buffer {index} is an embedded data uri"
        )));
    }
    if uri.contains("://") {
        return Err(AssetError::UnsupportedUri(uri.to_string()));
    }

    let mut file = std::fs::File::open(base_dir.join(uri.replace("%20", " ")))?;
    let mut data = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        progress.advance(n as u64);
    }
    if data.len() < def.byte_length {
        return Err(AssetError::GltfParse(format!(
            "buffer {index} ({uri}) has {} bytes, expected {}",
            data.len(),
            def.byte_length
        )));
    }
    Ok(data)
}

fn component_size(component_type: u32) -> Option<usize> {
    match component_type {
        COMPONENT_I8 | COMPONENT_U8 => Some(1),
        COMPONENT_I16 | COMPONENT_U16 => Some(2),
        COMPONENT_U32 | COMPONENT_F32 => Some(4),
        _ => None,
    }
}

fn component_count(kind: &str) -> Option<usize> {
    match kind {
        "SCALAR" => Some(1),
        "VEC2" => Some(2),
        "VEC3" => Some(3),
        "VEC4" | "MAT2" => Some(4),
        "MAT3" => Some(9),
        "MAT4" => Some(16),
        _ => None,
    }
}

/// Read every component of an accessor as `f32`, honoring strides and the
/// `normalized` flag. Accessors without a buffer view read as zeros.
fn read_accessor(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<(Vec<f32>, usize), AssetError> {
    let err = |reason: String| AssetError::Accessor { index, reason };
    let acc = doc
        .accessors
        .get(index)
        .ok_or_else(|| err("does not exist".into()))?;
    let size = component_size(acc.component_type)
        .ok_or_else(|| err(format!("unknown component type {}", acc.component_type)))?;
    let comps =
        component_count(&acc.kind).ok_or_else(|| err(format!("unknown type {}", acc.kind)))?;
    let overflow = || err(format!("count {} overflows the address space", acc.count));
    let total = acc.count.checked_mul(comps).ok_or_else(overflow)?;

    let Some(view_index) = acc.buffer_view else {
        if total > MAX_UNBACKED_COMPONENTS {
            return Err(err(format!("count {} is too large", acc.count)));
        }
        return Ok((vec![0.0; total], comps));
    };
    let view = doc
        .buffer_views
        .get(view_index)
        .ok_or_else(|| err(format!("buffer view {view_index} does not exist")))?;
    let buffer = buffers
        .get(view.buffer)
        .ok_or_else(|| err(format!("buffer {} does not exist", view.buffer)))?;

    let element = size * comps;
    let stride = view.byte_stride.unwrap_or(element);
    if stride < element {
        return Err(err(format!("stride {stride} is shorter than element size {element}")));
    }
    let start = view
        .byte_offset
        .checked_add(acc.byte_offset)
        .ok_or_else(overflow)?;
    if acc.count > 0 {
        let end = stride
            .checked_mul(acc.count - 1)
            .and_then(|n| n.checked_add(element))
            .and_then(|n| n.checked_add(start))
            .ok_or_else(overflow)?;
        let view_end = view
            .byte_offset
            .checked_add(view.byte_length)
            .ok_or_else(overflow)?;
        if end > view_end || end > buffer.len() {
            return Err(err(format!(
                "reads bytes {start}..{end} past the end of its buffer view"
            )));
        }
    }

    let mut out = Vec::with_capacity(total);
    for i in 0..acc.count {
        let base = start + i * stride;
        for c in 0..comps {
            let at = base + c * size;
            let bytes = &buffer[at..at + size];
            out.push(decode_component(acc.component_type, acc.normalized, bytes));
        }
    }
    Ok((out, comps))
}

fn decode_component(component_type: u32, normalized: bool, bytes: &[u8]) -> f32 {
    match component_type {
        COMPONENT_F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        COMPONENT_U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32,
        COMPONENT_U16 => {
            let v = u16::from_le_bytes([bytes[0], bytes[1]]) as f32;
            if normalized { v / 65535.0 } else { v }
        }
        COMPONENT_I16 => {
            let v = i16::from_le_bytes([bytes[0], bytes[1]]) as f32;
            if normalized { (v / 32767.0).max(-1.0) } else { v }
        }
        COMPONENT_U8 => {
            let v = bytes[0] as f32;
            if normalized { v / 255.0 } else { v }
        }
        _ => {
            let v = bytes[0] as i8 as f32;
            if normalized { (v / 127.0).max(-1.0) } else { v }
        }
    }
}

/// Read an accessor as fixed-width elements of `N` components.
fn read_elements<const N: usize>(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<Vec<[f32; N]>, AssetError> {
    let (values, comps) = read_accessor(doc, buffers, index)?;
    if comps != N {
        return Err(AssetError::Accessor {
            index,
            reason: format!("expected {N} components, found {comps}"),
        });
    }
    Ok(values
        .chunks_exact(N)
        .map(|c| {
            let mut element = [0.0; N];
            element.copy_from_slice(c);
            element
        })
        .collect())
}

/// Vertex attributes must have one element per vertex.
fn expect_vertex_count(index: usize, found: usize, vertices: usize) -> Result<(), AssetError> {
    if found == vertices {
        return Ok(());
    }
    Err(AssetError::Accessor {
        index,
        reason: format!("has {found} elements but POSITION has {vertices}"),
    })
}

/// Index buffers are read as exact integers rather than through `f32`.
fn read_indices(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<Vec<u32>, AssetError> {
    let (values, comps) = read_accessor(doc, buffers, index)?;
    let component_type = doc.accessors[index].component_type;
    if comps != 1 || !matches!(component_type, COMPONENT_U8 | COMPONENT_U16 | COMPONENT_U32) {
        return Err(AssetError::Accessor {
            index,
            reason: "indices must be unsigned scalars".into(),
        });
    }
    if component_type != COMPONENT_U32 {
        return Ok(values.into_iter().map(|v| v as u32).collect());
    }
    // u32 values above 2^24 lose precision through f32; re-read them raw.
    // Bounds were validated by read_accessor with the same stride.
    let acc = &doc.accessors[index];
    let Some(view) = acc.buffer_view.and_then(|v| doc.buffer_views.get(v)) else {
        return Ok(vec![0; acc.count]);
    };
    let buffer = &buffers[view.buffer];
    let stride = view.byte_stride.unwrap_or(4);
    let start = view.byte_offset + acc.byte_offset;
    Ok((0..acc.count)
        .map(|i| {
            let at = start + i * stride;
            u32::from_le_bytes([buffer[at], buffer[at + 1], buffer[at + 2], buffer[at + 3]])
        })
        .collect())
}

fn read_joints(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<Vec<[u16; 4]>, AssetError> {
    let component_type = doc.accessors.get(index).map(|a| a.component_type);
    if !matches!(component_type, Some(COMPONENT_U8 | COMPONENT_U16)) {
        return Err(AssetError::Accessor {
            index,
            reason: "joint indices must be u8 or u16".into(),
        });
    }
    let joints = read_elements::<4>(doc, buffers, index)?;
    Ok(joints
        .into_iter()
        .map(|j| [j[0] as u16, j[1] as u16, j[2] as u16, j[3] as u16])
        .collect())
}

fn decode_mesh(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    def: &MeshDef,
) -> Result<MeshData, AssetError> {
    let name = def.name.clone().unwrap_or_else(|| format!("mesh_{index}"));
    let mut primitives = Vec::with_capacity(def.primitives.len());
    for prim in &def.primitives {
        let mode = prim.mode.unwrap_or(MODE_TRIANGLES);
        if mode != MODE_TRIANGLES {
            tracing::debug!("skipping primitive of {name} with mode {mode}");
            continue;
        }
        let Some(&position_index) = prim.attributes.get("POSITION") else {
            tracing::warn!("skipping primitive of {name} without POSITION");
            continue;
        };
        let positions = read_elements::<3>(doc, buffers, position_index)?;
        let vertices = positions.len();
        let indices = match prim.indices {
            Some(i) => read_indices(doc, buffers, i)?,
            None => (0..vertices as u32).collect(),
        };
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(AssetError::GltfParse(format!(
                "{name}: index {bad} out of range for {vertices} vertices"
            )));
        }
        let normals = match prim.attributes.get("NORMAL") {
            Some(&i) => {
                let normals = read_elements::<3>(doc, buffers, i)?;
                expect_vertex_count(i, normals.len(), vertices)?;
                normals
            }
            None => compute_normals(&positions, &indices),
        };
        let joint_attrs = (prim.attributes.get("JOINTS_0"), prim.attributes.get("WEIGHTS_0"));
        let (joints, weights) = match joint_attrs {
            (Some(&j), Some(&w)) => {
                let joints = read_joints(doc, buffers, j)?;
                expect_vertex_count(j, joints.len(), vertices)?;
                let weights = read_elements::<4>(doc, buffers, w)?;
                expect_vertex_count(w, weights.len(), vertices)?;
                (joints, weights)
            }
            _ => (Vec::new(), Vec::new()),
        };
        let base_color = prim
            .material
            .and_then(|m| doc.materials.get(m))
            .and_then(|m| m.pbr_metallic_roughness.as_ref())
            .and_then(|pbr| pbr.base_color_factor)
            .unwrap_or(DEFAULT_BASE_COLOR);
        primitives.push(Primitive {
            positions,
            normals,
            indices,
            base_color,
            joints,
            weights,
        });
    }
    Ok(MeshData { name, primitives })
}

/// Area-weighted vertex normals for meshes that omit them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            if n.length_squared() > 0.0 {
                n.normalize().to_array()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

fn decode_skin(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    def: &SkinDef,
) -> Result<Skin, AssetError> {
    if let Some(joint) = def.joints.iter().find(|&&j| j >= doc.nodes.len()) {
        return Err(AssetError::GltfParse(format!(
            "skin {index} references missing joint node {joint}"
        )));
    }
    let inverse_bind = match def.inverse_bind_matrices {
        Some(i) => read_elements::<16>(doc, buffers, i)?
            .iter()
            .map(Mat4::from_cols_array)
            .collect(),
        None => vec![Mat4::IDENTITY; def.joints.len()],
    };
    Ok(Skin {
        joints: def.joints.clone(),
        inverse_bind,
    })
}

fn node_transform(def: &NodeDef) -> Transform {
    if let Some(m) = def.matrix {
        let (scale, rotation, position) =
            Mat4::from_cols_array(&m).to_scale_rotation_translation();
        return Transform {
            position,
            rotation,
            scale,
        };
    }
    Transform {
        position: def.translation.map(Vec3::from_array).unwrap_or(Vec3::ZERO),
        rotation: def
            .rotation
            .map(|r| Quat::from_array(r).normalize())
            .unwrap_or(Quat::IDENTITY),
        scale: def.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE),
    }
}

fn build_scene(doc: &Document) -> Result<Scene, AssetError> {
    let (name, roots) = match doc.scenes.get(doc.scene.unwrap_or(0)) {
        Some(scene) => (scene.name.clone(), scene.nodes.clone()),
        None if doc.scenes.is_empty() => {
            // No scene declared: treat every unparented node as a root.
            let parented: HashSet<usize> =
                doc.nodes.iter().flat_map(|n| n.children.iter().copied()).collect();
            let roots = (0..doc.nodes.len()).filter(|i| !parented.contains(i)).collect();
            (None, roots)
        }
        None => {
            return Err(AssetError::GltfParse(format!(
                "default scene {:?} does not exist",
                doc.scene
            )));
        }
    };

    let mut path = Vec::new();
    let roots = roots
        .into_iter()
        .map(|i| build_node(doc, i, &mut path))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Scene { name, roots })
}

fn build_node(
    doc: &Document,
    index: usize,
    path: &mut Vec<usize>,
) -> Result<SceneNode, AssetError> {
    if path.contains(&index) {
        return Err(AssetError::GltfParse(format!("node {index} is its own ancestor")));
    }
    let def = doc
        .nodes
        .get(index)
        .ok_or_else(|| AssetError::GltfParse(format!("node {index} does not exist")))?;
    if let Some(mesh) = def.mesh {
        if mesh >= doc.meshes.len() {
            return Err(AssetError::GltfParse(format!(
                "node {index} references missing mesh {mesh}"
            )));
        }
    }
    if let Some(skin) = def.skin {
        if skin >= doc.skins.len() {
            return Err(AssetError::GltfParse(format!(
                "node {index} references missing skin {skin}"
            )));
        }
    }

    path.push(index);
    let children = def
        .children
        .iter()
        .map(|&c| build_node(doc, c, path))
        .collect::<Result<Vec<_>, _>>()?;
    path.pop();

    Ok(SceneNode {
        index,
        name: def.name.clone(),
        transform: node_transform(def),
        mesh: def.mesh,
        skin: def.skin,
        children,
    })
}

fn decode_animation(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    def: &AnimationDef,
) -> Result<AnimationClip, AssetError> {
    let name = def
        .name
        .clone()
        .unwrap_or_else(|| format!("animation_{index}"));
    let mut channels = Vec::with_capacity(def.channels.len());
    let mut duration = 0.0f32;
    for channel in &def.channels {
        let Some(node) = channel.target.node else {
            continue;
        };
        if node >= doc.nodes.len() {
            return Err(AssetError::GltfParse(format!(
                "{name}: channel targets missing node {node}"
            )));
        }
        let sampler = def.samplers.get(channel.sampler).ok_or_else(|| {
            AssetError::GltfParse(format!("{name}: missing sampler {}", channel.sampler))
        })?;
        let (interpolation, cubic) = match sampler.interpolation.as_deref() {
            None | Some("LINEAR") => (Interpolation::Linear, false),
            Some("STEP") => (Interpolation::Step, false),
            Some("CUBICSPLINE") => (Interpolation::Linear, true),
            Some(other) => {
                return Err(AssetError::GltfParse(format!(
                    "{name}: unknown interpolation {other}"
                )));
            }
        };

        let path = channel.target.path.as_str();
        if !matches!(path, "translation" | "rotation" | "scale") {
            tracing::debug!("{name}: skipping {path} channel");
            continue;
        }
        let times: Vec<f32> = read_elements::<1>(doc, buffers, sampler.input)?
            .into_iter()
            .map(|[t]| t)
            .collect();
        let values = match path {
            "rotation" => {
                let frames = keyframe_values::<4>(doc, buffers, sampler.output, cubic)?;
                Keyframes::Rotation(
                    frames
                        .into_iter()
                        .map(|q| Quat::from_array(q).normalize())
                        .collect(),
                )
            }
            "translation" => Keyframes::Translation(
                keyframe_values::<3>(doc, buffers, sampler.output, cubic)?
                    .into_iter()
                    .map(Vec3::from_array)
                    .collect(),
            ),
            _ => Keyframes::Scale(
                keyframe_values::<3>(doc, buffers, sampler.output, cubic)?
                    .into_iter()
                    .map(Vec3::from_array)
                    .collect(),
            ),
        };
        if values.len() != times.len() {
            return Err(AssetError::GltfParse(format!(
                "{name}: sampler {} has {} times but {} values",
                channel.sampler,
                times.len(),
                values.len()
            )));
        }
        duration = times.iter().copied().fold(duration, f32::max);
        channels.push(AnimationChannel {
            node,
            interpolation,
            times,
            values,
        });
    }
    Ok(AnimationClip {
        name,
        duration,
        channels,
    })
}

/// Sampler output values. Cubic-spline outputs store an in-tangent, value
/// and out-tangent per keyframe; only the value is kept.
fn keyframe_values<const N: usize>(
    doc: &Document,
    buffers: &[Vec<u8>],
    index: usize,
    cubic: bool,
) -> Result<Vec<[f32; N]>, AssetError> {
    let values = read_elements::<N>(doc, buffers, index)?;
    if !cubic {
        return Ok(values);
    }
    Ok(values.chunks_exact(3).map(|triple| triple[1]).collect())
}
