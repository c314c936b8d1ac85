//! GPU rendering implementation using wgpu
//!
//! Converts batched draws to actual GPU draw calls

use crate::error::{PetError, Result};
use crate::font::ATLAS_SIZE;
use crate::render::{BatchedDraw, GlyphInstance, RectInstance};
use crate::theme::{to_floats, Color};
use bytemuck::{Pod, Zeroable};
use std::ops::Range;
use std::sync::Arc;

/// Vertex data for rectangles
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RectVertex {
    pub position: [f32; 2],
    pub color: u32,
}

/// Vertex data for glyphs
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlyphVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
    pub color: u32,
}

/// Uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShaderUniforms {
    /// Physical size of the surface
    pub viewport_size: [f32; 2],
    /// 1.0 when the surface encodes to sRGB and colors must be linearized
    pub srgb_output: f32,
    pub _padding: f32, // Align to 16 bytes
}

/// Initial vertex buffer sizes; buffers grow on demand
const RECT_BUFFER_SIZE: u64 = 64 * 1024;
const GLYPH_BUFFER_SIZE: u64 = 256 * 1024;

/// One draw call over a range of an uploaded vertex buffer
enum DrawRange {
    Rects(Range<u32>),
    Glyphs(Range<u32>),
}

/// GPU renderer that executes batched draw commands
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,

    // Pipelines
    rect_pipeline: wgpu::RenderPipeline,
    glyph_pipeline: wgpu::RenderPipeline,

    // Uniform buffer
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    // Glyph atlas texture
    glyph_texture: wgpu::Texture,
    glyph_bind_group: wgpu::BindGroup,

    // Vertex buffers
    rect_vertex_buffer: wgpu::Buffer,
    glyph_vertex_buffer: wgpu::Buffer,
}

impl GpuRenderer {
    pub async fn new(window: Arc<winit::window::Window>) -> Result<Self> {
        // Create instance
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        // Create surface
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| PetError::Gpu(e.to_string()))?;

        // Get adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| PetError::Gpu(e.to_string()))?;

        // Create device and queue
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Pet Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| PetError::Gpu(e.to_string()))?;

        // Configure surface
        let size = window.inner_size();
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| PetError::Gpu("surface is not supported by the adapter".to_string()))?;
        surface.configure(&device, &config);
        log::info!(
            "GPU ready: {} ({:?}), surface format {:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format
        );

        // Load shaders from files
        let rect_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Rectangle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/rect.wgsl").into()),
        });

        let glyph_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Glyph Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/glyph.wgsl").into()),
        });

        // Glyph texture matches the font atlas size
        let glyph_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glyph Atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let glyph_texture_view = glyph_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Glyph quads sit on whole pixels, so sample without filtering
        let glyph_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Create uniform buffer for viewport size
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<ShaderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let glyph_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Glyph Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let glyph_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glyph Bind Group"),
            layout: &glyph_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&glyph_texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&glyph_sampler),
                },
            ],
        });

        let rect_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Rect Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let glyph_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Glyph Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout, &glyph_bind_group_layout],
                push_constant_ranges: &[],
            });

        let color_target = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let rect_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rect Pipeline"),
            layout: Some(&rect_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &rect_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &rect_shader,
                entry_point: Some("fs_main"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let glyph_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Glyph Pipeline"),
            layout: Some(&glyph_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &glyph_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &glyph_shader,
                entry_point: Some("fs_main"),
                targets: &color_target,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let rect_vertex_buffer = vertex_buffer(&device, "Rect Vertex Buffer", RECT_BUFFER_SIZE);
        let glyph_vertex_buffer = vertex_buffer(&device, "Glyph Vertex Buffer", GLYPH_BUFFER_SIZE);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            rect_pipeline,
            glyph_pipeline,
            uniform_buffer,
            uniform_bind_group,
            glyph_texture,
            glyph_bind_group,
            rect_vertex_buffer,
            glyph_vertex_buffer,
        })
    }

    /// Upload font atlas texture to GPU
    pub fn upload_font_atlas(&self, atlas_data: &[u8]) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.glyph_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas_data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(ATLAS_SIZE), // For R8 format, 1 byte per pixel
                rows_per_image: Some(ATLAS_SIZE),
            },
            wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Execute batched draw commands over a cleared frame
    pub fn render(&mut self, batches: &[BatchedDraw], clear: Color) {
        let srgb = self.config.format.is_srgb();
        let uniforms = ShaderUniforms {
            viewport_size: [self.config.width as f32, self.config.height as f32],
            srgb_output: if srgb { 1.0 } else { 0.0 },
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        // All vertices go up in one write per buffer; batches become ranges
        let mut rect_vertices = Vec::new();
        let mut glyph_vertices = Vec::new();
        let mut ranges = Vec::with_capacity(batches.len());
        for batch in batches {
            match batch {
                BatchedDraw::RectBatch { instances } => {
                    let start = rect_vertices.len() as u32;
                    push_rects(&mut rect_vertices, instances);
                    ranges.push(DrawRange::Rects(start..rect_vertices.len() as u32));
                }
                BatchedDraw::GlyphBatch { instances } => {
                    let start = glyph_vertices.len() as u32;
                    push_glyphs(&mut glyph_vertices, instances);
                    ranges.push(DrawRange::Glyphs(start..glyph_vertices.len() as u32));
                }
            }
        }
        let rect_bytes: &[u8] = bytemuck::cast_slice(&rect_vertices);
        let glyph_bytes: &[u8] = bytemuck::cast_slice(&glyph_vertices);
        self.ensure_capacity(rect_bytes.len() as u64, glyph_bytes.len() as u64);
        if !rect_bytes.is_empty() {
            self.queue.write_buffer(&self.rect_vertex_buffer, 0, rect_bytes);
        }
        if !glyph_bytes.is_empty() {
            self.queue.write_buffer(&self.glyph_vertex_buffer, 0, glyph_bytes);
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("Failed to get surface texture: {}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = to_floats(clear);
            let channel = |c: f32| f64::from(if srgb { srgb_to_linear(c) } else { c });
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: channel(r),
                            g: channel(g),
                            b: channel(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            for range in ranges {
                match range {
                    DrawRange::Rects(range) => {
                        render_pass.set_pipeline(&self.rect_pipeline);
                        render_pass.set_vertex_buffer(0, self.rect_vertex_buffer.slice(..));
                        render_pass.draw(range, 0..1);
                    }
                    DrawRange::Glyphs(range) => {
                        render_pass.set_pipeline(&self.glyph_pipeline);
                        render_pass.set_bind_group(1, &self.glyph_bind_group, &[]);
                        render_pass.set_vertex_buffer(0, self.glyph_vertex_buffer.slice(..));
                        render_pass.draw(range, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Grow vertex buffers so a frame's vertices fit
    fn ensure_capacity(&mut self, rect_bytes: u64, glyph_bytes: u64) {
        if rect_bytes > self.rect_vertex_buffer.size() {
            let size = rect_bytes.next_power_of_two();
            log::debug!("Growing rect vertex buffer to {} bytes", size);
            self.rect_vertex_buffer = vertex_buffer(&self.device, "Rect Vertex Buffer", size);
        }
        if glyph_bytes > self.glyph_vertex_buffer.size() {
            let size = glyph_bytes.next_power_of_two();
            log::debug!("Growing glyph vertex buffer to {} bytes", size);
            self.glyph_vertex_buffer = vertex_buffer(&self.device, "Glyph Vertex Buffer", size);
        }
    }

    /// Resize surface when window changes
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Two triangles per rect
fn push_rects(vertices: &mut Vec<RectVertex>, instances: &[RectInstance]) {
    vertices.reserve(instances.len() * 6);
    for instance in instances {
        let r = instance.rect;
        let (x1, y1, x2, y2) = (r.x, r.y, r.x + r.width, r.y + r.height);
        for position in [[x1, y1], [x2, y1], [x1, y2], [x2, y1], [x2, y2], [x1, y2]] {
            vertices.push(RectVertex {
                position,
                color: instance.color,
            });
        }
    }
}

/// Two textured triangles per glyph
fn push_glyphs(vertices: &mut Vec<GlyphVertex>, instances: &[GlyphInstance]) {
    vertices.reserve(instances.len() * 6);
    for instance in instances {
        let q = instance.quad;
        let (x1, y1, x2, y2) = (q.x, q.y, q.x + q.width, q.y + q.height);
        let [u0, v0, u1, v1] = q.tex_coords;
        let corners = [
            ([x1, y1], [u0, v0]),
            ([x2, y1], [u1, v0]),
            ([x1, y2], [u0, v1]),
            ([x2, y1], [u1, v0]),
            ([x2, y2], [u1, v1]),
            ([x1, y2], [u0, v1]),
        ];
        for (position, tex_coord) in corners {
            vertices.push(GlyphVertex {
                position,
                tex_coord,
                color: instance.color,
            });
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
