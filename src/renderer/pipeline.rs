//! WebGPU canvas replay pipeline
//!
//! A persistent offscreen texture plays the role of the 2D canvas: each frame's recorded
//! commands are drawn into it with the blend state of their composite mode (so the
//! destination-out fade erases old content instead of clearing it), then the texture is
//! blitted to the surface.

use thiserror::Error;
use wgpu::util::DeviceExt;

use super::shapes::{BatchKind, FrameGeometry, pixel_to_ndc};
use super::vertex::{BACKGROUND, SpriteVertex, Vertex};
use crate::assets::SpriteImage;
use crate::canvas::{Composite, DrawList};

/// Canvas storage format; colors stay gamma-encoded like an HTML canvas
const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Renderer setup failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// Blend state for a canvas composite mode, on premultiplied color
fn blend_state(mode: Composite) -> wgpu::BlendState {
    let component = |src_factor, dst_factor| wgpu::BlendComponent {
        src_factor,
        dst_factor,
        operation: wgpu::BlendOperation::Add,
    };
    let c = match mode {
        Composite::SourceOver => component(
            wgpu::BlendFactor::One,
            wgpu::BlendFactor::OneMinusSrcAlpha,
        ),
        Composite::DestinationOut => component(
            wgpu::BlendFactor::Zero,
            wgpu::BlendFactor::OneMinusSrcAlpha,
        ),
        Composite::Lighter => component(wgpu::BlendFactor::One, wgpu::BlendFactor::One),
    };
    wgpu::BlendState { color: c, alpha: c }
}

fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn texture_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
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
    })
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vs: &str,
    fs: &str,
    buffers: &[wgpu::VertexBufferLayout],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Offscreen canvas texture and the bind group that samples it
struct CanvasTarget {
    view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

impl CanvasTarget {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("canvas_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CANVAS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let blit_bind_group = texture_bind_group(device, layout, &view, sampler, "blit_bind_group");
        Self {
            view,
            blit_bind_group,
        }
    }
}

/// Main render state
pub struct CanvasRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    /// Indexed by `Composite::index`
    color_pipelines: Vec<wgpu::RenderPipeline>,
    sprite_pipelines: Vec<wgpu::RenderPipeline>,
    blit_pipeline: wgpu::RenderPipeline,

    sprite_bind_group: wgpu::BindGroup,
    blit_layout: wgpu::BindGroupLayout,
    canvas_sampler: wgpu::Sampler,
    canvas: CanvasTarget,
    /// Canvas content is undefined until the first pass clears it
    canvas_dirty: bool,

    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl CanvasRenderer {
    /// Build the renderer. The smoke sprite must already be prepared.
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        smoke: &SpriteImage,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("fireworks-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        // Canvas colors are already gamma-encoded, so prefer a non-sRGB swapchain
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let canvas_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("canvas_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("canvas.wgsl").into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blit.wgsl").into()),
        });

        // Smoke sprite texture
        let smoke_texture = device.create_texture_with_data(
            &queue,
            &wgpu::TextureDescriptor {
                label: Some("smoke_texture"),
                size: wgpu::Extent3d {
                    width: smoke.width,
                    height: smoke.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &smoke.pixels,
        );
        let smoke_view = smoke_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let smoke_sampler = linear_sampler(&device, "smoke_sampler");

        let sprite_layout = texture_bind_group_layout(&device, "sprite_bind_group_layout");
        let sprite_bind_group = texture_bind_group(
            &device,
            &sprite_layout,
            &smoke_view,
            &smoke_sampler,
            "sprite_bind_group",
        );

        let blit_layout = texture_bind_group_layout(&device, "blit_bind_group_layout");
        let canvas_sampler = linear_sampler(&device, "canvas_sampler");
        let canvas = CanvasTarget::new(
            &device,
            &blit_layout,
            &canvas_sampler,
            config.width,
            config.height,
        );

        let color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("color_pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });
        let sprite_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite_pipeline_layout"),
            bind_group_layouts: &[&sprite_layout],
            immediate_size: 0,
        });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            immediate_size: 0,
        });

        let color_pipelines: Vec<wgpu::RenderPipeline> = Composite::ALL
            .iter()
            .map(|&mode| {
                create_pipeline(
                    &device,
                    "color_pipeline",
                    &color_layout,
                    &canvas_shader,
                    "vs_color",
                    "fs_color",
                    &[Vertex::desc()],
                    CANVAS_FORMAT,
                    Some(blend_state(mode)),
                )
            })
            .collect();
        let sprite_pipelines: Vec<wgpu::RenderPipeline> = Composite::ALL
            .iter()
            .map(|&mode| {
                create_pipeline(
                    &device,
                    "sprite_pipeline",
                    &sprite_pipeline_layout,
                    &canvas_shader,
                    "vs_sprite",
                    "fs_sprite",
                    &[SpriteVertex::desc()],
                    CANVAS_FORMAT,
                    Some(blend_state(mode)),
                )
            })
            .collect();
        let blit_pipeline = create_pipeline(
            &device,
            "blit_pipeline",
            &blit_pipeline_layout,
            &blit_shader,
            "vs_blit",
            "fs_blit",
            &[],
            config.format,
            None,
        );

        log::info!("Renderer ready: {}x{}", config.width, config.height);

        Ok(Self {
            surface,
            device,
            queue,
            size: (config.width, config.height),
            config,
            color_pipelines,
            sprite_pipelines,
            blit_pipeline,
            sprite_bind_group,
            blit_layout,
            canvas_sampler,
            canvas,
            canvas_dirty: true,
        })
    }

    /// Resize the surface; the canvas texture is recreated and cleared
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.canvas = CanvasTarget::new(
                &self.device,
                &self.blit_layout,
                &self.canvas_sampler,
                new_width,
                new_height,
            );
            self.canvas_dirty = true;
        }
    }

    /// Reconfigure the surface after it was lost or outdated
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Replay `frame` onto the canvas and present it
    pub fn render(&mut self, frame: &DrawList) -> Result<(), wgpu::SurfaceError> {
        let geometry = FrameGeometry::build(frame);

        let size = self.size;
        let color: Vec<Vertex> = geometry
            .color
            .iter()
            .map(|v| Vertex {
                position: pixel_to_ndc(v.position, size),
                color: v.color,
            })
            .collect();
        let sprites: Vec<SpriteVertex> = geometry
            .sprites
            .iter()
            .map(|v| SpriteVertex {
                position: pixel_to_ndc(v.position, size),
                ..*v
            })
            .collect();

        // Recreate buffers each frame (simple approach; particle counts are small)
        let color_buffer = (!color.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("color_vertices"),
                    contents: bytemuck::cast_slice(&color),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });
        let sprite_buffer = (!sprites.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sprite_vertices"),
                    contents: bytemuck::cast_slice(&sprites),
                    usage: wgpu::BufferUsages::VERTEX,
                })
        });

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let load = if self.canvas_dirty {
                wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
            } else {
                wgpu::LoadOp::Load
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("canvas_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for batch in &geometry.batches {
                let i = batch.composite.index();
                match batch.kind {
                    BatchKind::Color => {
                        let Some(buffer) = &color_buffer else { continue };
                        pass.set_pipeline(&self.color_pipelines[i]);
                        pass.set_vertex_buffer(0, buffer.slice(..));
                    }
                    BatchKind::Sprite => {
                        let Some(buffer) = &sprite_buffer else { continue };
                        pass.set_pipeline(&self.sprite_pipelines[i]);
                        pass.set_bind_group(0, &self.sprite_bind_group, &[]);
                        pass.set_vertex_buffer(0, buffer.slice(..));
                    }
                }
                pass.draw(batch.range.clone(), 0..1);
            }
        }
        self.canvas_dirty = false;

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.canvas.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
