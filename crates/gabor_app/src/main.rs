//! Winit + egui application shell for the Gabor function explorer.

mod cli;
mod panel;
mod state;

use std::{rc::Rc, time::Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::{Context as EguiContext, TextureId, ViewportId};
use egui_wgpu::{wgpu, ScreenDescriptor};
use egui_winit::State as EguiWinitState;
use gabor_core::{render::save_png, GaborParameters};
use gabor_gfx::{GpuContext, HeatmapRenderer};
use pollster::block_on;
use tracer::init_tracing;
use wgpu::SurfaceError;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};

use crate::{
    cli::Cli,
    state::{ExplorerState, Refresh},
};

const HEATMAP_FILTER: wgpu::FilterMode = wgpu::FilterMode::Linear;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    tracing::info!(version = gabor_core::version_string(), "starting gabor explorer");

    let mut params = match &cli.params {
        Some(path) => GaborParameters::load_preset(path)
            .with_context(|| format!("failed to load parameter preset {}", path.display()))?,
        None => GaborParameters::default(),
    };
    params.draw_sigma |= cli.draw_sigma;

    let grid = cli.grid();
    let heatmap = cli.heatmap_settings();

    if let Some(path) = &cli.export {
        save_png(path, &params, &grid, &heatmap)
            .with_context(|| format!("failed to export snapshot to {}", path.display()))?;
        return Ok(());
    }

    run_window(ExplorerState::new(params, heatmap, grid), cli.exit_after_ms)
}

fn run_window(mut state: ExplorerState, exit_after_ms: Option<u64>) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    #[allow(deprecated)]
    let window = event_loop
        .create_window(
            Window::default_attributes()
                .with_title(panel::TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(1100.0, 760.0)),
        )
        .context("failed to create window")?;

    let window = Rc::new(window);

    let mut gpu_context = block_on(gabor_gfx::init(window.as_ref()))?;
    let mut renderer = HeatmapRenderer::new(&gpu_context, state.grid.resolution)
        .context("failed to create heatmap renderer")?;
    state
        .sync(&mut renderer)
        .context("failed to render initial heatmap")?;

    let egui_ctx = EguiContext::default();
    let mut egui_state = EguiWinitState::new(
        egui_ctx.clone(),
        ViewportId::ROOT,
        window.as_ref(),
        Some(window.scale_factor() as f32),
        window.theme(),
        Some(gpu_context.device.limits().max_texture_dimension_2d as usize),
    );
    let mut egui_renderer = egui_wgpu::Renderer::new(
        renderer.device(),
        gpu_context.surface_config.format,
        None,
        1,
        false,
    );
    let heatmap_texture = egui_renderer.register_native_texture(
        renderer.device(),
        renderer.target_view(),
        HEATMAP_FILTER,
    );

    let app_start_time = Instant::now();
    let window_handle = Rc::clone(&window);

    #[allow(deprecated)]
    event_loop
        .run(move |event, target| {
            let window = window_handle.as_ref();
            match event {
                Event::WindowEvent {
                    window_id,
                    ref event,
                } if window_id == window.id() => {
                    let egui_response = egui_state.on_window_event(window, event);
                    if egui_response.repaint {
                        window.request_redraw();
                    }
                    if egui_response.consumed {
                        return;
                    }

                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::Resized(new_size) => {
                            gpu_context.resize(new_size.width, new_size.height);
                        }
                        WindowEvent::ScaleFactorChanged { .. } => {
                            let new_size = window.inner_size();
                            gpu_context.resize(new_size.width, new_size.height);
                        }
                        WindowEvent::RedrawRequested => {
                            if let Err(err) = render_frame(
                                window,
                                &egui_ctx,
                                &mut egui_state,
                                &mut egui_renderer,
                                &mut gpu_context,
                                &mut renderer,
                                &mut state,
                                heatmap_texture,
                            ) {
                                tracing::error!("frame render error: {err:?}");
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    if let Some(limit_ms) = exit_after_ms {
                        if app_start_time.elapsed().as_millis() as u64 >= limit_ms {
                            target.exit();
                            return;
                        }
                        // Keep the loop ticking so the deadline is observed without input.
                        window.request_redraw();
                    }
                }
                _ => {}
            }
        })
        .map_err(Into::into)
}

#[allow(clippy::too_many_arguments)]
fn render_frame(
    window: &Window,
    egui_ctx: &EguiContext,
    egui_state: &mut EguiWinitState,
    egui_renderer: &mut egui_wgpu::Renderer,
    gpu_context: &mut GpuContext<'_>,
    renderer: &mut HeatmapRenderer,
    state: &mut ExplorerState,
    heatmap_texture: TextureId,
) -> Result<()> {
    let raw_input = egui_state.take_egui_input(window);

    let full_output = egui_ctx.run(raw_input, |ctx| {
        egui::SidePanel::left("controls")
            .resizable(false)
            .min_width(280.0)
            .show(ctx, |ui| panel::controls(ui, state));
        egui::CentralPanel::default().show(ctx, |ui| panel::heatmap(ui, state, heatmap_texture));
    });

    egui_state.handle_platform_output(window, full_output.platform_output);

    // The panel was laid out with the previous value range; repaint once more so the
    // colorbar labels catch up with a fresh evaluation.
    if state.refresh() != Refresh::None {
        window.request_redraw();
    }
    if state
        .sync(renderer)
        .context("failed to refresh heatmap")?
    {
        egui_renderer.update_egui_texture_from_wgpu_texture(
            renderer.device(),
            renderer.target_view(),
            HEATMAP_FILTER,
            heatmap_texture,
        );
    }

    for (id, image_delta) in &full_output.textures_delta.set {
        egui_renderer.update_texture(renderer.device(), renderer.queue(), *id, image_delta);
    }
    for id in &full_output.textures_delta.free {
        egui_renderer.free_texture(id);
    }

    let surface_texture = match gpu_context.surface.get_current_texture() {
        Ok(surface_texture) => surface_texture,
        Err(SurfaceError::Outdated) | Err(SurfaceError::Lost) => {
            gpu_context
                .surface
                .configure(&gpu_context.device, &gpu_context.surface_config);
            return Ok(());
        }
        Err(SurfaceError::Timeout) | Err(SurfaceError::Other) => return Ok(()),
        Err(SurfaceError::OutOfMemory) => {
            tracing::error!("wgpu surface out of memory, skipping frame");
            return Ok(());
        }
    };

    let surface_view = surface_texture
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu_context
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Gabor Explorer Encoder"),
        });

    let pixels_per_point = window.scale_factor() as f32;
    let paint_jobs = egui_ctx.tessellate(full_output.shapes, pixels_per_point);
    let screen_descriptor = ScreenDescriptor {
        size_in_pixels: [
            gpu_context.surface_config.width,
            gpu_context.surface_config.height,
        ],
        pixels_per_point,
    };

    let egui_cmd_buffers = egui_renderer.update_buffers(
        renderer.device(),
        renderer.queue(),
        &mut encoder,
        &paint_jobs,
        &screen_descriptor,
    );

    {
        let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let mut render_pass = egui_pass.forget_lifetime();
        egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
    }

    let mut submissions = egui_cmd_buffers;
    submissions.push(encoder.finish());

    renderer.queue().submit(submissions);
    surface_texture.present();

    if full_output
        .viewport_output
        .get(&ViewportId::ROOT)
        .is_some_and(|viewport| viewport.repaint_delay.is_zero())
    {
        window.request_redraw();
    }

    Ok(())
}

mod tracer {
    use tracing_subscriber::EnvFilter;

    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }
}
