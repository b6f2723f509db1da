use crate::camera::Uniforms;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use modelview_assets::ModelAsset;
use modelview_common::LightConfig;
use modelview_kernel::LoadedModel;
use modelview_render::RenderView;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

fn interleave(positions: &[[f32; 3]], normals: &[[f32; 3]]) -> Vec<Vertex> {
    positions
        .iter()
        .zip(normals)
        .map(|(p, n)| Vertex {
            position: *p,
            normal: *n,
        })
        .collect()
}

/// Uploaded geometry of one glTF primitive.
struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Where a mesh's primitive lives on the GPU.
struct Slot {
    /// Index into [`GpuModel::primitives`].
    primitive: usize,
    /// Index into the source mesh's primitives.
    source: usize,
    color: [f32; 4],
    skinned: bool,
}

/// GPU resources for the currently synced model.
struct GpuModel {
    digest: String,
    primitives: Vec<GpuPrimitive>,
    /// Primitive slots per mesh, indexed like the asset's meshes.
    mesh_slots: Vec<Vec<Slot>>,
    instance_buffer: wgpu::Buffer,
    /// Draws the instance buffer has room for. The scene's node structure
    /// never changes after load, so this is the per-frame draw count.
    capacity: usize,
}

impl GpuModel {
    fn upload(device: &wgpu::Device, asset: &ModelAsset) -> Self {
        let mut mesh_slots = Vec::with_capacity(asset.meshes.len());
        let mut primitives = Vec::new();
        for mesh in &asset.meshes {
            let mut slots = Vec::with_capacity(mesh.primitives.len());
            for (source, prim) in mesh.primitives.iter().enumerate() {
                let vertices = interleave(&prim.positions, &prim.normals);
                if vertices.is_empty() || prim.indices.is_empty() {
                    continue;
                }
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_vertex_buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    // Skinned primitives are rewritten every frame.
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("model_index_buffer"),
                    contents: bytemuck::cast_slice(&prim.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                slots.push(Slot {
                    primitive: primitives.len(),
                    source,
                    color: prim.base_color,
                    skinned: prim.is_skinned(),
                });
                primitives.push(GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: prim.indices.len() as u32,
                });
            }
            mesh_slots.push(slots);
        }

        let capacity: usize = asset
            .scene
            .mesh_instances()
            .iter()
            .filter_map(|instance| mesh_slots.get(instance.mesh))
            .map(Vec::len)
            .sum();
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("model_instance_buffer"),
            size: (capacity.max(1) * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        tracing::info!(
            primitives = primitives.len(),
            draws = capacity,
            skins = asset.skins.len(),
            "uploaded model geometry"
        );
        Self {
            digest: asset.digest.clone(),
            primitives,
            mesh_slots,
            instance_buffer,
            capacity,
        }
    }

    /// Pose skinned geometry and build this frame's draws as
    /// (primitive, instance) pairs.
    fn frame_draws(
        &self,
        queue: &wgpu::Queue,
        model: &LoadedModel,
    ) -> Vec<(usize, InstanceData)> {
        let asset = &model.asset;
        let model_matrix = model.transform.to_matrix();
        let joints = asset.joint_matrices();
        let mut draws = Vec::with_capacity(self.capacity);
        for instance in asset.scene.mesh_instances() {
            let Some(slots) = self.mesh_slots.get(instance.mesh) else {
                continue;
            };
            let skin = instance.skin.and_then(|s| joints.get(s));
            for slot in slots {
                let node_world = match skin {
                    Some(joint_matrices) if slot.skinned => {
                        self.write_skinned(queue, asset, instance.mesh, slot, joint_matrices);
                        // Skinned vertices are already in scene space.
                        Mat4::IDENTITY
                    }
                    _ => instance.world,
                };
                let data = InstanceData::new(model_matrix * node_world, slot.color);
                draws.push((slot.primitive, data));
            }
        }
        draws.truncate(self.capacity);
        draws
    }

    fn write_skinned(
        &self,
        queue: &wgpu::Queue,
        asset: &ModelAsset,
        mesh: usize,
        slot: &Slot,
        joint_matrices: &[Mat4],
    ) {
        let source = asset.meshes.get(mesh).and_then(|m| m.primitives.get(slot.source));
        let (Some(prim), Some(gpu)) = (source, self.primitives.get(slot.primitive)) else {
            return;
        };
        let (positions, normals) = prim.skinned(joint_matrices);
        let vertices = interleave(&positions, &normals);
        queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
    }
}

/// wgpu-based model renderer.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    light: LightConfig,
    model: Option<GpuModel>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        light: LightConfig,
    ) -> Self {
        let uniforms = Uniforms::new(&RenderView::default(), &light);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("model_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MODEL_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("model_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // glTF winding is not reliable across exporters
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            surface_format,
            light,
            model: None,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Upload the model's geometry if it differs from what is on the GPU.
    pub fn sync_model(&mut self, device: &wgpu::Device, model: Option<&LoadedModel>) {
        let current = self.model.as_ref().map(|gpu| gpu.digest.as_str());
        let wanted = model.map(|m| m.asset.digest.as_str());
        if current == wanted {
            return;
        }
        self.model = model.map(|m| GpuModel::upload(device, &m.asset));
    }

    /// Render one frame: the synced model under the given view.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        view: &RenderView,
        model: Option<&LoadedModel>,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(view, &self.light)),
        );

        let gpu_model = match (model, &self.model) {
            (Some(m), Some(gpu)) if gpu.capacity > 0 => Some((m, gpu)),
            _ => None,
        };

        let draws = match gpu_model {
            Some((m, gpu)) => gpu.frame_draws(queue, m),
            None => Vec::new(),
        };
        if let Some((_, gpu)) = gpu_model {
            let instances: Vec<InstanceData> = draws.iter().map(|(_, data)| *data).collect();
            queue.write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some((_, gpu)) = gpu_model {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(1, gpu.instance_buffer.slice(..));
                for (i, (primitive, _)) in draws.iter().enumerate() {
                    let Some(prim) = gpu.primitives.get(*primitive) else {
                        continue;
                    };
                    pass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                    pass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    let instance = i as u32;
                    pass.draw_indexed(0..prim.index_count, 0, instance..instance + 1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}
