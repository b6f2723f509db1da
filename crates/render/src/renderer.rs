use glam::{Mat4, Vec3};
use modelview_common::CameraConfig;
use modelview_kernel::LoadedModel;
use std::fmt::Write;

/// Camera descriptor for rendering.
///
/// The camera sits at `eye` with a fixed orientation looking down −Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub eye: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::new(&CameraConfig::default(), 16.0 / 9.0)
    }
}

impl RenderView {
    /// View at the configured start position. A non-positive or non-finite
    /// `aspect` (a zero-sized window) falls back to square.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            tracing::warn!("invalid aspect ratio {aspect}, using 1.0");
            1.0
        };
        tracing::debug!(fov = config.fov_degrees, aspect, "render view created");
        Self {
            eye: config.initial_position(),
            fov_degrees: config.fov_degrees,
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// Copy of this view moved to `eye`.
    pub fn at(self, eye: Vec3) -> Self {
        Self { eye, ..self }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the model (if one is loaded) and a view, then produces
/// output. It never mutates either.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, model: Option<&LoadedModel>, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a frame, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, model: Option<&LoadedModel>, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Camera: eye=({:.3}, {:.3}, {:.3}) fov={:.0} aspect={:.2}",
            view.eye.x, view.eye.y, view.eye.z, view.fov_degrees, view.aspect
        );

        let Some(model) = model else {
            out.push_str("Model: none\n");
            return out;
        };

        let (x, y, z) = model
            .transform
            .rotation
            .to_euler(glam::EulerRot::XYZ);
        let _ = writeln!(out, "Model: rotation=({x:.3}, {y:.3}, {z:.3})");
        let summary = model.asset.summary();
        let _ = writeln!(
            out,
            "  nodes={} meshes={} triangles={}",
            summary.nodes, summary.meshes, summary.triangles
        );
        for instance in model.asset.scene.mesh_instances() {
            let name = model
                .asset
                .meshes
                .get(instance.mesh)
                .map(|m| m.name.as_str())
                .unwrap_or("?");
            let p = (model.transform.to_matrix() * instance.world).w_axis;
            let skinned = if instance.skin.is_some() { " skinned" } else { "" };
            let _ = writeln!(
                out,
                "  [{name}] pos=({:.2}, {:.2}, {:.2}){skinned}",
                p.x, p.y, p.z
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelview_assets::{MeshData, ModelAsset, Scene, SceneNode};
    use modelview_common::{RotationOffset, Transform};

    fn model(rotation: RotationOffset) -> LoadedModel {
        LoadedModel {
            asset: ModelAsset {
                scene: Scene {
                    name: None,
                    roots: vec![SceneNode {
                        name: Some("body".into()),
                        transform: Transform {
                            position: Vec3::new(0.0, 0.0, 1.0),
                            ..Transform::default()
                        },
                        mesh: Some(0),
                        ..SceneNode::default()
                    }],
                },
                meshes: vec![MeshData {
                    name: "figure".into(),
                    primitives: vec![],
                }],
                ..ModelAsset::default()
            },
            transform: Transform {
                rotation: rotation.to_quat(),
                ..Transform::default()
            },
        }
    }

    #[test]
    fn debug_renderer_without_model() {
        let output = DebugTextRenderer::new().render(None, &RenderView::default());
        assert!(output.contains("eye=(0.000, 0.750, 5.000)"));
        assert!(output.contains("Model: none"));
    }

    #[test]
    fn debug_renderer_applies_model_rotation() {
        let m = model(RotationOffset { x: 0.0, y: 1.0 });
        let output = DebugTextRenderer::new().render(Some(&m), &RenderView::default());
        assert!(output.contains(", 1.000, "), "{output}");
        assert!(output.contains("[figure] pos=(0.84, "), "{output}");
        assert!(output.contains(", 0.54)"), "{output}");
    }

    #[test]
    fn view_looks_down_negative_z() {
        let view = RenderView::default().at(Vec3::new(1.0, 2.0, 5.0));
        let in_front = view.view_matrix().transform_point3(Vec3::new(1.0, 2.0, 0.0));
        assert!((in_front - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);

        let clip = view.view_projection() * Vec3::new(1.0, 2.0, 0.0).extend(1.0);
        assert!((clip.w - 5.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let config = CameraConfig::default();
        assert_eq!(RenderView::new(&config, 0.0).aspect, 1.0);
        assert_eq!(RenderView::new(&config, f32::INFINITY).aspect, 1.0);
        assert_eq!(RenderView::new(&config, 1280.0 / 720.0).aspect, 1280.0 / 720.0);
    }

    #[test]
    fn render_view_defaults() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.near, 0.1);
        assert_eq!(view.far, 1000.0);
    }
}
