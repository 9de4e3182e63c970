//! GPU pass that draws the image planes.
//!
//! [`PlanePass`] mirrors the effect's plane list on the GPU. Each plane gets
//! its own vertex buffer, uniform buffer and bind group (uniform block plus
//! texture). Every frame [`PlanePass::sync`] rewrites the vertex and uniform
//! data in place from [`HoverEffect`], so geometry follows the layout without
//! reallocating buffers.
//!
//! # Architecture
//!
//! The plane shader uses two bind groups:
//! - **Group 0**: Camera uniforms (view-projection, resolution, time)
//! - **Group 1**: Plane uniforms (`model`, `uMouse`, `uHover`, UV transform),
//!   `uTexture` and its sampler
//!
//! Planes all lie at z = 0, so there is no depth buffer; they are drawn in
//! document order with premultiplied alpha blending over a transparent clear.

use crate::effect::HoverEffect;
use crate::gpu::GpuContext;
use crate::material::PlaneUniforms;
use crate::plane::{PLANE_INDICES, PlaneVertex};
use crate::texture::Texture;

/// Camera uniforms for the plane shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Render target resolution in pixels `[width, height]`.
    pub resolution: [f32; 2],
    /// Elapsed time in seconds, for animated shaders.
    pub time: f32,
    /// Padding for 16-byte alignment.
    pub _pad: f32,
}

/// GPU resources of one plane.
struct PlaneResources {
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture: Option<Texture>,
    visible: bool,
}

/// Draws every plane of a [`HoverEffect`].
pub struct PlanePass {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    plane_bind_group_layout: wgpu::BindGroupLayout,
    index_buffer: wgpu::Buffer,
    placeholder: Texture,
    planes: Vec<PlaneResources>,
}

impl PlanePass {
    /// Creates the pipeline and one set of GPU resources per plane.
    pub fn new(gpu: &GpuContext, effect: &HoverEffect) -> Self {
        use wgpu::util::DeviceExt;

        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Plane Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/plane.wgsl").into()),
        });

        // Camera uniform buffer (group 0)
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Plane uniforms + texture (group 1)
        let plane_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Plane Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Plane Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &plane_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Plane Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[PlaneVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Index Buffer"),
            contents: bytemuck::cast_slice(&PLANE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let placeholder = Texture::placeholder(gpu);

        let mut pass = Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            plane_bind_group_layout,
            index_buffer,
            placeholder,
            planes: Vec::new(),
        };

        let planes = effect
            .planes()
            .iter()
            .enumerate()
            .map(|(index, plane)| {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Plane {index} Vertices")),
                    contents: bytemuck::cast_slice(&plane.vertices()),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                let uniforms = plane.material.uniforms(plane.model_matrix());
                let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Plane {index} Uniforms")),
                    contents: bytemuck::cast_slice(&[uniforms]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
                let bind_group = pass.create_plane_bind_group(gpu, &uniform_buffer, None);
                PlaneResources {
                    vertex_buffer,
                    uniform_buffer,
                    bind_group,
                    texture: None,
                    visible: !plane.is_degenerate(),
                }
            })
            .collect();
        pass.planes = planes;

        pass
    }

    fn create_plane_bind_group(
        &self,
        gpu: &GpuContext,
        uniform_buffer: &wgpu::Buffer,
        texture: Option<&Texture>,
    ) -> wgpu::BindGroup {
        let texture = texture.unwrap_or(&self.placeholder);
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Plane Bind Group"),
            layout: &self.plane_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    /// Number of planes mirrored on the GPU.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Attach a loaded texture to plane `index`. Out-of-range indices are ignored.
    pub fn set_texture(&mut self, gpu: &GpuContext, index: usize, texture: Texture) {
        let Some(resources) = self.planes.get(index) else {
            log::warn!("texture for unknown plane {index} dropped");
            return;
        };
        let bind_group =
            self.create_plane_bind_group(gpu, &resources.uniform_buffer, Some(&texture));
        let resources = &mut self.planes[index];
        resources.bind_group = bind_group;
        resources.texture = Some(texture);
    }

    pub fn has_texture(&self, index: usize) -> bool {
        self.planes.get(index).is_some_and(|plane| plane.texture.is_some())
    }

    /// Upload this frame's camera, geometry and uniforms.
    pub fn sync(&mut self, gpu: &GpuContext, effect: &HoverEffect, time: f32) {
        let camera = effect.camera();
        let viewport = effect.viewport();
        let camera_uniforms = CameraUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            resolution: [viewport.width, viewport.height],
            time,
            _pad: 0.0,
        };
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniforms]));

        for (plane, resources) in effect.planes().iter().zip(&mut self.planes) {
            resources.visible = !plane.is_degenerate();
            if !resources.visible {
                continue;
            }
            gpu.queue.write_buffer(
                &resources.vertex_buffer,
                0,
                bytemuck::cast_slice(&plane.vertices()),
            );
            gpu.queue.write_buffer(
                &resources.uniform_buffer,
                0,
                bytemuck::cast_slice(&[plane.material.uniforms(plane.model_matrix())]),
            );
        }
    }

    /// Draw every visible plane into `render_pass`.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass) {
        if self.planes.is_empty() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        for resources in self.planes.iter().filter(|plane| plane.visible) {
            render_pass.set_bind_group(1, &resources.bind_group, &[]);
            render_pass.set_vertex_buffer(0, resources.vertex_buffer.slice(..));
            render_pass.draw_indexed(0..PLANE_INDICES.len() as u32, 0, 0..1);
        }
    }

    /// Sync, clear to transparent, draw and present one frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn draw_frame(
        &mut self,
        gpu: &GpuContext,
        effect: &HoverEffect,
        time: f32,
    ) -> crate::Result<()> {
        self.sync(gpu, effect, time);

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Plane Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Plane Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.render(&mut render_pass);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
