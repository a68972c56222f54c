//! GPU layer over `wgpu`: window surface setup and the offscreen heatmap pass.
//!
//! The field itself is evaluated on the CPU; this crate only uploads it into an
//! `R32Float` texture and colormaps it into an sRGB target that the UI samples.

use std::borrow::Cow;

use anyhow::{ensure, Context, Result};
use bytemuck::{bytes_of, cast_slice};
use gabor_core::{GaborField, VisualizationConfig};
use gabor_shaders::render;
use wgpu::{
    util::DeviceExt, Backends, BindGroup, BindGroupDescriptor, BindGroupEntry,
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource,
    BindingType, BufferBindingType, BufferUsages, Color, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, Device, DeviceDescriptor, Extent3d, Features, FragmentState,
    Instance, InstanceDescriptor, Limits, LoadOp, MultisampleState, Operations,
    PipelineLayoutDescriptor, PowerPreference, PresentMode, PrimitiveState, Queue,
    RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor,
    RequestAdapterOptions, SamplerBindingType, SamplerDescriptor, ShaderStages, StoreOp, Surface,
    SurfaceConfiguration, Texture, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexState,
};
use winit::window::Window;

/// Format of the colormapped target handed to the UI.
pub const TARGET_FORMAT: TextureFormat = TextureFormat::Rgba8UnormSrgb;
const FIELD_FORMAT: TextureFormat = TextureFormat::R32Float;

pub struct GpuContext<'window> {
    pub surface: Surface<'window>,
    pub device: Device,
    pub queue: Queue,
    pub surface_config: SurfaceConfiguration,
}

/// Creates the instance, surface, device and swapchain configuration for `window`.
pub async fn init(window: &Window) -> Result<GpuContext<'_>> {
    let instance_desc = InstanceDescriptor {
        backends: Backends::all(),
        ..Default::default()
    };
    let instance = Instance::new(&instance_desc);

    let surface = instance
        .create_surface(window)
        .context("failed to create wgpu surface")?;

    let adapter = instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("no compatible GPU adapter found")?;
    let info = adapter.get_info();
    tracing::info!(adapter = %info.name, backend = ?info.backend, "selected GPU adapter");

    let device_desc = DeviceDescriptor {
        label: Some("Gabor Explorer Device"),
        required_features: Features::empty(),
        required_limits: Limits::downlevel_defaults().using_resolution(adapter.limits()),
        ..Default::default()
    };

    let (device, queue) = adapter
        .request_device(&device_desc, None)
        .await
        .context("failed to request wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = preferred_surface_format(&surface_caps.formats)
        .context("surface reports no supported formats")?;
    let size = window.inner_size();

    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let surface_config = SurfaceConfiguration {
        usage: TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: PresentMode::Fifo,
        alpha_mode,
        desired_maximum_frame_latency: 2,
        view_formats: vec![],
    };

    surface.configure(&device, &surface_config);

    Ok(GpuContext {
        surface,
        device,
        queue,
        surface_config,
    })
}

impl GpuContext<'_> {
    /// Reconfigures the swapchain after a resize; zero-sized windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }
}

fn preferred_surface_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn create_module(device: &Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    })
}

fn create_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("heatmap_bind_group_layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: false },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

fn create_pipeline(device: &Device, layout: &BindGroupLayout) -> RenderPipeline {
    let module = create_module(device, "visualize.wgsl", render::VISUALIZE);
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Heatmap Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Heatmap Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &module,
            entry_point: Some(render::VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &[],
        },
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        fragment: Some(FragmentState {
            module: &module,
            entry_point: Some(render::FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(ColorTargetState {
                format: TARGET_FORMAT,
                blend: None,
                write_mask: ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    })
}

fn create_texture(
    device: &Device,
    label: &str,
    resolution: u32,
    format: TextureFormat,
    usage: TextureUsages,
) -> Texture {
    let size = resolution.max(1);
    device.create_texture(&TextureDescriptor {
        label: Some(label),
        size: Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}

/// Textures and bind group that depend on the grid resolution.
#[derive(Debug)]
struct SizedResources {
    resolution: u32,
    field_texture: Texture,
    _field_view: TextureView,
    _target: Texture,
    target_view: TextureView,
    bind_group: BindGroup,
}

/// Offscreen heatmap renderer: field texture in, colormapped sRGB texture out.
#[derive(Debug)]
pub struct HeatmapRenderer {
    device: Device,
    queue: Queue,
    layout: BindGroupLayout,
    pipeline: RenderPipeline,
    uniform: wgpu::Buffer,
    sampler: wgpu::Sampler,
    sized: SizedResources,
}

impl HeatmapRenderer {
    pub fn new(context: &GpuContext<'_>, resolution: u32) -> Result<Self> {
        ensure!(resolution > 0, "heatmap resolution must be positive");
        let device = context.device.clone();
        let queue = context.queue.clone();
        let layout = create_bind_group_layout(&device);
        let pipeline = create_pipeline(&device, &layout);

        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("VisualizationConfig Uniform"),
            contents: bytes_of(&VisualizationConfig::default()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("Field Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let sized = create_sized_resources(&device, &layout, &sampler, &uniform, resolution);

        Ok(Self {
            device,
            queue,
            layout,
            pipeline,
            uniform,
            sampler,
            sized,
        })
    }

    /// Uploads a freshly evaluated field. Returns `true` when the target texture had to be
    /// recreated, in which case any UI handle to [`Self::target_view`] must be refreshed.
    pub fn upload_field(&mut self, field: &GaborField) -> Result<bool> {
        ensure!(
            field.width == field.height && field.width > 0,
            "heatmap expects a non-empty square field (got {}x{})",
            field.width,
            field.height
        );
        ensure!(
            field.values.len() == field.width as usize * field.height as usize,
            "field holds {} samples, expected {}",
            field.values.len(),
            field.width as usize * field.height as usize
        );

        let resized = field.width != self.sized.resolution;
        if resized {
            tracing::debug!(
                from = self.sized.resolution,
                to = field.width,
                "recreating heatmap textures"
            );
            self.sized = create_sized_resources(
                &self.device,
                &self.layout,
                &self.sampler,
                &self.uniform,
                field.width,
            );
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.sized.field_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            cast_slice(&field.values),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(field.bytes_per_row()),
                rows_per_image: Some(field.height),
            },
            Extent3d {
                width: field.width,
                height: field.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(resized)
    }

    pub fn update_visualization_config(&self, viz: &VisualizationConfig) {
        self.queue.write_buffer(&self.uniform, 0, bytes_of(viz));
    }

    /// Runs the colormap pass into the offscreen target and submits it.
    pub fn render(&self) {
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Heatmap Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("Heatmap Pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &self.sized.target_view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.sized.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    pub fn target_view(&self) -> &TextureView {
        &self.sized.target_view
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

fn create_sized_resources(
    device: &Device,
    layout: &BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniform: &wgpu::Buffer,
    resolution: u32,
) -> SizedResources {
    let field_texture = create_texture(
        device,
        "Field Texture",
        resolution,
        FIELD_FORMAT,
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
    );
    let field_view = field_texture.create_view(&TextureViewDescriptor::default());

    let target = create_texture(
        device,
        "Heatmap Target",
        resolution,
        TARGET_FORMAT,
        TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
    );
    let target_view = target.create_view(&TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("Heatmap Bind Group"),
        layout,
        entries: &[
            BindGroupEntry {
                binding: 0,
                resource: BindingResource::TextureView(&field_view),
            },
            BindGroupEntry {
                binding: 1,
                resource: BindingResource::Sampler(sampler),
            },
            BindGroupEntry {
                binding: 2,
                resource: uniform.as_entire_binding(),
            },
        ],
    });

    SizedResources {
        resolution,
        field_texture,
        _field_view: field_view,
        _target: target,
        target_view,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_srgb_surface_formats() {
        let formats = [TextureFormat::Bgra8Unorm, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            preferred_surface_format(&formats),
            Some(TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(
            preferred_surface_format(&[TextureFormat::Rgba16Float]),
            Some(TextureFormat::Rgba16Float)
        );
        assert_eq!(preferred_surface_format(&[]), None);
    }

    #[test]
    fn uniform_matches_shader_layout() {
        assert_eq!(
            std::mem::size_of::<VisualizationConfig>(),
            4 * std::mem::size_of::<u32>()
        );
    }
}
