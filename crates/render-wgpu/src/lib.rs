//! wgpu render backend for the model viewer.
//!
//! Draws every mesh primitive of the loaded model, instanced once per scene
//! node that references it, lit by one directional light.
//!
//! # Invariants
//! - Renderer never mutates viewer state.
//! - GPU buffers are rebuilt only when a different model is synced.

mod camera;
mod gpu;
mod shaders;

pub use camera::Uniforms;
pub use gpu::WgpuRenderer;
