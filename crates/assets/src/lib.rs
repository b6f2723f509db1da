//! Asset loading: glTF 2.0 models, their scene graph, mesh geometry, skins
//! and animation clips.
//!
//! The renderer consumes a finished [`ModelAsset`]; nothing outside this
//! crate touches file paths or raw buffers.
//!
//! # Invariants
//! - A load reports exactly one terminal status (`Loaded` or `Failed`).
//! - Progress fractions are non-decreasing and within `[0, 1]`.

mod animation;
mod error;
mod gltf;
mod loader;
mod scene;

pub use animation::{
    AnimationChannel, AnimationClip, AnimationPlayer, Interpolation, Keyframes, NodeProperty,
};
pub use error::AssetError;
pub use gltf::load_gltf;
pub use loader::{GltfLoader, LoadHandle, LoadReporter, LoadStatus, load_channel};
pub use scene::{
    MeshData, MeshInstance, ModelAsset, ModelSummary, Primitive, Scene, SceneNode, Skin,
};

pub fn crate_info() -> &'static str {
    "modelview-assets v0.1.0"
}
