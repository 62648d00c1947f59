//! Renderer: wgpu init + depth + one lit, indexed mesh.
//! wgpu = 23.x, winit = 0.30.x

pub mod draw;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use asset::Model;
use bytemuck::{Pod, Zeroable};
use corelib::{Camera, Mat4, Vec3, camera::aspect_ratio, vec3};
use wgpu::{
    BindGroup, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendState, Buffer,
    BufferBindingType, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor,
    CompositeAlphaMode,
    DepthBiasState, DepthStencilState, Device, DeviceDescriptor, Extent3d, Features, FragmentState,
    Instance, InstanceDescriptor, Limits, LoadOp, Operations, PipelineLayoutDescriptor,
    PowerPreference, PresentMode, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor, ShaderSource, ShaderStages,
    StoreOp, Surface, SurfaceConfiguration, SurfaceError, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, TextureView, TextureViewDescriptor, VertexState,
    util::DeviceExt,
};
use winit::{dpi::PhysicalSize, window::Window};

pub use draw::{DrawCommand, MeshBuffers, Primitive, Vertex, build_draw_list, build_mesh};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Fixed lighting and colors for one demo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub clear_color: [f64; 3],
    /// Used for faces without a resolvable material color.
    pub default_color: [f32; 3],
    /// Direction towards the light, in eye space.
    pub light_dir: Vec3,
    pub ambient: [f32; 3],
    pub cull_back_faces: bool,
}

impl RenderStyle {
    pub fn viewer() -> Self {
        Self {
            clear_color: [0.2, 0.2, 0.2],
            default_color: [0.8, 0.6, 0.4],
            light_dir: vec3(2.0, 2.0, 2.0),
            ambient: [0.1, 0.1, 0.1],
            cull_back_faces: true,
        }
    }

    pub fn cube() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
            default_color: [0.8, 0.8, 0.8],
            light_dir: vec3(1.0, 1.0, 1.0),
            ambient: [0.04, 0.04, 0.04],
            cull_back_faces: false,
        }
    }
}

/// Uniform block shared by both shader stages (see `shaders/lit.wgsl`).
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct Globals {
    mvp: [[f32; 4]; 4],
    model_view: [[f32; 4]; 4],
    light_dir: [f32; 4],
    ambient: [f32; 4],
}

impl Globals {
    fn new(camera: &Camera, model: Mat4, style: &RenderStyle) -> Self {
        let model_view = camera.view() * model;
        let mvp = camera.proj() * model_view;
        let [ar, ag, ab] = style.ambient;
        Self {
            mvp: mvp.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            light_dir: style.light_dir.normalize_or(Vec3::Z).extend(0.0).to_array(),
            ambient: [ar, ag, ab, 1.0],
        }
    }
}

pub struct GpuState {
    // Surface
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,

    // Device/queue
    device: Device,
    queue: Queue,

    // Pipeline & geometry
    pipeline: RenderPipeline,
    vertex_buf: Buffer,
    index_buf: Buffer,
    index_count: u32,

    globals_bg: BindGroup,
    globals_buf: Buffer,
    style: RenderStyle,

    // Depth
    depth_view: TextureView,

    // Size cache
    width: u32,
    height: u32,
}

impl GpuState {
    /// Create GPU state bound to an `Arc<Window>` and upload `model`.
    pub async fn new(
        window: Arc<Window>,
        backends: wgpu::Backends,
        model: &Model,
        style: RenderStyle,
    ) -> Result<Self> {
        let PhysicalSize { width, height } = window.inner_size();
        let width = width.max(1);
        let height = height.max(1);

        // Instance & surface
        let instance = Instance::new(InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface: Surface<'static> = instance
            .create_surface(window.clone())
            .context("create_surface failed")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapter for {backends:?}"))?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("meshview device"),
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("request_device failed")?;

        // Surface format (prefer sRGB)
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: PresentMode::AutoVsync,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, &surface_config);

        // ==== Shaders ====
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Lit WGSL"),
            source: ShaderSource::Wgsl(include_str!("shaders/lit.wgsl").into()),
        });

        // ==== Globals BGL/BG ====
        let globals_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("Globals BGL"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });

        let globals_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals UBO"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals BG"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });

        // ==== Pipeline ====
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("Lit PipelineLayout"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Lit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState {
                    format: surface_format,
                    blend: Some(BlendState::REPLACE),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: style.cull_back_faces.then_some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ==== Geometry ====
        let mesh = build_mesh(model, style.default_color)?;
        log::info!(
            "Uploading mesh: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.indices.len() / 3
        );
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model VB"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model IB"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        let index_count =
            u32::try_from(mesh.indices.len()).context("Too many indices for one draw call")?;

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline,
            vertex_buf,
            index_buf,
            index_count,
            globals_bg,
            globals_buf,
            style,
            depth_view,
            width,
            height,
        })
    }

    pub fn aspect(&self) -> f32 {
        aspect_ratio(self.width, self.height)
    }

    /// Resize: reconfigure surface & recreate depth view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.surface_config.width = self.width;
        self.surface_config.height = self.height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, &self.surface_config);
    }

    /// Render one frame: update uniforms + clear + draw.
    pub fn render(&mut self, camera: &Camera, model: Mat4) -> Result<(), SurfaceError> {
        let camera = camera.with_aspect(self.aspect());
        let globals = Globals::new(&camera, model, &self.style);
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));

        let frame = self.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("MainEncoder"),
            });

        {
            let [r, g, b] = self.style.clear_color;
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("MainPass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if self.index_count > 0 {
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, &self.globals_bg, &[]);
                rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
                rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..self.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn is_surface_lost(err: &SurfaceError) -> bool {
        matches!(err, SurfaceError::Lost | SurfaceError::Outdated)
    }

    pub fn recreate_surface(&mut self) {
        self.resize(self.width, self.height);
    }
}

/// First alpha mode the surface reports, or `Auto` when it reports none.
fn pick_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes.first().copied().unwrap_or(CompositeAlphaMode::Auto)
}

/// Create a depth texture view matching the surface config.
fn create_depth_view(device: &Device, sc: &SurfaceConfiguration) -> TextureView {
    let tex = device.create_texture(&TextureDescriptor {
        label: Some("DepthTex"),
        size: Extent3d {
            width: sc.width.max(1),
            height: sc.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_match_wgsl_layout() {
        // 2 x mat4x4<f32> + 2 x vec4<f32>
        assert_eq!(std::mem::size_of::<Globals>(), 160);
    }

    #[test]
    fn globals_light_dir_is_unit_length() {
        let cam = Camera::looking_at_origin(5.0, 4.0 / 3.0);
        let g = Globals::new(&cam, Mat4::IDENTITY, &RenderStyle::viewer());
        let [x, y, z, w] = g.light_dir;
        assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-6);
        assert_eq!(w, 0.0);
        assert!(g.mvp.iter().flatten().all(|f| f.is_finite()));
    }

    #[test]
    fn alpha_mode_falls_back_to_auto() {
        assert_eq!(pick_alpha_mode(&[]), CompositeAlphaMode::Auto);
        assert_eq!(
            pick_alpha_mode(&[CompositeAlphaMode::Opaque, CompositeAlphaMode::PreMultiplied]),
            CompositeAlphaMode::Opaque
        );
    }

    #[test]
    fn only_the_viewer_culls() {
        assert!(RenderStyle::viewer().cull_back_faces);
        assert!(!RenderStyle::cube().cull_back_faces);
    }
}
