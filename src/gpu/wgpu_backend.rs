//! Production [`RenderBackend`] built on wgpu.
//!
//! Draws are recorded between `begin_frame`/`end_frame` and encoded in one
//! render pass at frame end. Per-draw uniform blocks are packed into a
//! single growable buffer and bound at 256-byte dynamic offsets, so a
//! frame costs one buffer write and one command submission regardless of
//! object count.

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::camera::DrawUniforms;
use crate::error::{MiradorError, ShaderStage};
use crate::gpu::backend::{BufferHandle, ProgramHandle, RenderBackend, UniformValue};
use crate::gpu::render_context::RenderContext;

/// Byte stride of one uniform block in the per-frame buffer. Matches the
/// default `min_uniform_buffer_offset_alignment`.
const UNIFORM_STRIDE: usize = size_of::<DrawUniforms>();

/// Initial uniform-buffer capacity, in draws.
const INITIAL_DRAW_CAPACITY: usize = 64;

const VERTEX_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 2] = [
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 0,
        }],
    },
    wgpu::VertexBufferLayout {
        array_stride: 12,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: 0,
            shader_location: 1,
        }],
    },
];

/// One recorded draw: a snapshot of the uniform block plus the buffer
/// bindings.
struct PendingDraw {
    program: ProgramHandle,
    uniforms: DrawUniforms,
    vertices: BufferHandle,
    normals: BufferHandle,
    indices: BufferHandle,
    index_count: u32,
}

/// wgpu implementation of [`RenderBackend`].
pub struct WgpuBackend {
    context: RenderContext,
    depth_texture: wgpu::Texture,
    offscreen_texture: Option<wgpu::Texture>,

    buffers: FxHashMap<BufferHandle, wgpu::Buffer>,
    pipelines: FxHashMap<ProgramHandle, wgpu::RenderPipeline>,
    next_buffer: u32,
    next_program: u32,

    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_capacity: usize,
    bind_group: wgpu::BindGroup,

    current_program: Option<ProgramHandle>,
    current_uniforms: DrawUniforms,
    clear_color: [f32; 4],
    pending: Vec<PendingDraw>,
}

impl WgpuBackend {
    /// Wrap an initialized render context.
    #[must_use]
    pub fn new(context: RenderContext) -> Self {
        let device = &context.device;

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Uniforms Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(UNIFORM_STRIDE as u64),
                    },
                    count: None,
                }],
            });

        let uniform_capacity = INITIAL_DRAW_CAPACITY * UNIFORM_STRIDE;
        let uniform_buffer = Self::make_uniform_buffer(device, uniform_capacity);
        let bind_group =
            Self::make_bind_group(device, &bind_group_layout, &uniform_buffer);

        let depth_texture =
            Self::make_depth_texture(device, context.config.width, context.config.height);
        let offscreen_texture = if context.has_surface() {
            None
        } else {
            Some(Self::make_offscreen_texture(&context))
        };

        Self {
            context,
            depth_texture,
            offscreen_texture,
            buffers: FxHashMap::default(),
            pipelines: FxHashMap::default(),
            next_buffer: 0,
            next_program: 0,
            bind_group_layout,
            uniform_buffer,
            uniform_capacity,
            bind_group,
            current_program: None,
            current_uniforms: DrawUniforms::new(),
            clear_color: [0.0; 4],
            pending: Vec::new(),
        }
    }

    /// The wrapped render context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn make_uniform_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniforms"),
            size: capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(UNIFORM_STRIDE as u64),
                }),
            }],
        })
    }

    fn make_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth"),
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
        })
    }

    fn make_offscreen_texture(context: &RenderContext) -> wgpu::Texture {
        context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: context.config.width.max(1),
                height: context.config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: context.format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        })
    }

    /// Grow the uniform buffer to hold `needed` bytes, recreating the bind
    /// group that references it.
    fn reserve_uniform_capacity(&mut self, needed: usize) {
        if needed <= self.uniform_capacity {
            return;
        }
        // 2x growth to amortize reallocation across frames.
        let new_capacity = (needed * 2).max(self.uniform_capacity);
        self.uniform_buffer = Self::make_uniform_buffer(&self.context.device, new_capacity);
        self.uniform_capacity = new_capacity;
        self.bind_group = Self::make_bind_group(
            &self.context.device,
            &self.bind_group_layout,
            &self.uniform_buffer,
        );
    }

    fn acquire_color_target(
        &self,
    ) -> Result<(Option<wgpu::SurfaceTexture>, wgpu::TextureView), MiradorError> {
        if self.context.has_surface() {
            let frame = match self.context.next_frame() {
                Ok(frame) => frame,
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    return Err(MiradorError::SurfaceLost);
                }
                Err(e) => {
                    return Err(MiradorError::Viewer(format!(
                        "surface acquire failed: {e}"
                    )));
                }
            };
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            Ok((Some(frame), view))
        } else {
            let view = self
                .offscreen_texture
                .as_ref()
                .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
                .ok_or(MiradorError::SurfaceLost)?;
            Ok((None, view))
        }
    }
}

/// Parse and validate one WGSL stage, mapping failures to
/// [`MiradorError::ShaderCompile`] with a readable log.
pub(crate) fn validate_stage(source: &str, stage: ShaderStage) -> Result<(), MiradorError> {
    let module =
        naga::front::wgsl::parse_str(source).map_err(|e| MiradorError::ShaderCompile {
            stage,
            log: e.emit_to_string(source),
        })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    match validator.validate(&module) {
        Ok(_) => Ok(()),
        Err(e) => Err(MiradorError::ShaderCompile {
            stage,
            log: e.into_inner().to_string(),
        }),
    }
}

impl RenderBackend for WgpuBackend {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle {
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Attributes"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let handle = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        let _ = self.buffers.insert(handle, buffer);
        handle
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> BufferHandle {
        let buffer = self
            .context
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Indices"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::INDEX,
            });
        let handle = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        let _ = self.buffers.insert(handle, buffer);
        handle
    }

    fn upload_vertex_buffer(&mut self, handle: BufferHandle, data: &[f32]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let Some(buffer) = self.buffers.get(&handle) else {
            log::warn!("upload to unknown buffer {handle:?} ignored");
            return;
        };
        if bytes.len() as u64 <= buffer.size() {
            self.context.queue.write_buffer(buffer, 0, bytes);
        } else {
            // Replacing with a larger payload: allocate a fresh buffer
            // under the same handle.
            let buffer = self
                .context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Attributes"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
            let _ = self.buffers.insert(handle, buffer);
        }
    }

    fn create_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ProgramHandle, MiradorError> {
        validate_stage(vertex_src, ShaderStage::Vertex)?;
        validate_stage(fragment_src, ShaderStage::Fragment)?;

        let device = &self.context.device;
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Stage"),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Stage"),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Viewer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &VERTEX_LAYOUTS,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.context.format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Sectioned models expose interiors; no face culling.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let handle = ProgramHandle::new(self.next_program);
        self.next_program += 1;
        let _ = self.pipelines.insert(handle, pipeline);
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if self.pipelines.contains_key(&program) {
            self.current_program = Some(program);
        } else {
            log::warn!("use_program on unknown program {program:?} ignored");
        }
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        let u = &mut self.current_uniforms;
        match (name, value) {
            ("view_proj", UniformValue::Mat4(m)) => u.view_proj = m.to_cols_array_2d(),
            ("view", UniformValue::Mat4(m)) => u.view = m.to_cols_array_2d(),
            ("normal_matrix", UniformValue::Mat3(m)) => u.set_normal_matrix(m),
            ("camera_position", UniformValue::Vec3(v)) => u.set_camera_position(v),
            ("x_section", UniformValue::Float(x)) => u.x_section = x,
            ("color", UniformValue::Vec4(c)) => u.color = c,
            _ => {
                log::warn!("unknown uniform {name:?} on program {program:?} ignored");
            }
        }
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
        self.pending.clear();
    }

    fn draw_indexed(
        &mut self,
        vertices: BufferHandle,
        normals: BufferHandle,
        indices: BufferHandle,
        index_count: u32,
    ) {
        let Some(program) = self.current_program else {
            log::warn!("draw without an active program ignored");
            return;
        };
        self.pending.push(PendingDraw {
            program,
            uniforms: self.current_uniforms,
            vertices,
            normals,
            indices,
            index_count,
        });
    }

    fn end_frame(&mut self) -> Result<(), MiradorError> {
        let draws = std::mem::take(&mut self.pending);

        if !draws.is_empty() {
            let blocks: Vec<DrawUniforms> = draws.iter().map(|d| d.uniforms).collect();
            let bytes: &[u8] = bytemuck::cast_slice(&blocks);
            self.reserve_uniform_capacity(bytes.len());
            self.context.queue.write_buffer(&self.uniform_buffer, 0, bytes);
        }

        let (frame, color_view) = self.acquire_color_target()?;
        let depth_view = self
            .depth_texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Viewer Encoder"),
                });
        {
            let clear = wgpu::Color {
                r: f64::from(self.clear_color[0]),
                g: f64::from(self.clear_color[1]),
                b: f64::from(self.clear_color[2]),
                a: f64::from(self.clear_color[3]),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewer Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (i, draw) in draws.iter().enumerate() {
                let Some(pipeline) = self.pipelines.get(&draw.program) else {
                    continue;
                };
                let (Some(vb), Some(nb), Some(ib)) = (
                    self.buffers.get(&draw.vertices),
                    self.buffers.get(&draw.normals),
                    self.buffers.get(&draw.indices),
                ) else {
                    log::warn!("draw with stale buffer handles skipped");
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.bind_group, &[(i * UNIFORM_STRIDE) as u32]);
                pass.set_vertex_buffer(0, vb.slice(..));
                pass.set_vertex_buffer(1, nb.slice(..));
                pass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        let _ = self.context.queue.submit(std::iter::once(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.depth_texture =
            Self::make_depth_texture(&self.context.device, width, height);
        if self.offscreen_texture.is_some() {
            self.offscreen_texture = Some(Self::make_offscreen_texture(&self.context));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::gpu;

    use super::*;

    #[test]
    fn embedded_shaders_validate() {
        for (src, stage) in [
            (gpu::BASIC_VERTEX_SHADER, ShaderStage::Vertex),
            (gpu::BASIC_FRAGMENT_SHADER, ShaderStage::Fragment),
            (gpu::SECTION_VERTEX_SHADER, ShaderStage::Vertex),
            (gpu::SECTION_FRAGMENT_SHADER, ShaderStage::Fragment),
        ] {
            assert!(
                validate_stage(src, stage).is_ok(),
                "embedded {stage} stage failed validation"
            );
        }
    }

    #[test]
    fn malformed_wgsl_reports_a_compile_error() {
        let err = validate_stage("fn broken( {", ShaderStage::Vertex).unwrap_err();
        match err {
            MiradorError::ShaderCompile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected ShaderCompile, got {other:?}"),
        }
    }

    #[test]
    fn well_formed_but_invalid_wgsl_is_rejected() {
        // Parses fine, fails validation: vertex entry returning a bare f32
        // without a position builtin.
        let src = "@vertex fn vs_main() -> @location(0) f32 { return 1.0; }";
        assert!(validate_stage(src, ShaderStage::Vertex).is_err());
    }
}
