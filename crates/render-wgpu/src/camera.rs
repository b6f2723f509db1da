use bytemuck::{Pod, Zeroable};
use modelview_common::LightConfig;
use modelview_render::RenderView;

/// Per-frame uniform block shared by every draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz: unit direction towards the light, w: intensity.
    pub light: [f32; 4],
}

impl Uniforms {
    pub fn new(view: &RenderView, light: &LightConfig) -> Self {
        let dir = light.direction();
        Self {
            view_proj: view.view_projection().to_cols_array_2d(),
            light: [dir.x, dir.y, dir.z, light.intensity],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_finite() {
        let u = Uniforms::new(&RenderView::default(), &LightConfig::default());
        assert!(u.view_proj.iter().flatten().all(|v| v.is_finite()));
        let len = (u.light[0].powi(2) + u.light[1].powi(2) + u.light[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert_eq!(u.light[3], 1.0);
    }

    #[test]
    fn uniform_block_is_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
