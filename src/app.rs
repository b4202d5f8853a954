//! Application event loop and render loop.
//!
//! Bootstraps the GPU context, then renders whatever the scene currently
//! holds on every redraw while the model pipeline runs in the background.
//! The pipeline's fetch task reports through user events on the winit event
//! loop, so the handler here is the only writer the scene ever sees.
//!
//! # Frame lifecycle
//!
//! 1. Render the scene (empty until the model arrives)
//! 2. Advance the orbit controller and rewrite the camera uniform
//! 3. Advance the entrance spin, if one is running
//! 4. Rewrite the per-draw transform buffers

use std::{iter, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    animation::EntranceSpin,
    assets,
    context::Context,
    load::{LoadEvent, MODEL_ASSET, ModelPipeline},
    scene::{
        graph::{DrawModel, ModelNode, Scene},
        texture::Texture,
    },
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Events delivered to the event loop from spawned tasks.
pub enum ViewerEvent {
    /// Async GPU initialization finished (web init path).
    #[allow(dead_code)]
    ContextReady(Context),
    /// An observation from the in-flight model fetch.
    Load(LoadEvent),
}

/// Viewer state bundle: GPU context, scene contents and pipeline status.
struct ViewerState {
    ctx: Context,
    scene: Scene,
    pipeline: ModelPipeline,
    entrance: Option<EntranceSpin>,
    is_surface_configured: bool,
}

impl ViewerState {
    fn new(ctx: Context) -> Self {
        Self {
            ctx,
            scene: Scene::new(),
            pipeline: ModelPipeline::new(),
            entrance: None,
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Consumes one pipeline observation. On the ready transition the
    /// prepared model is uploaded, attached and sent spinning.
    fn handle_load_event(&mut self, event: LoadEvent) {
        if let Some(model) = self.pipeline.observe(event) {
            let node = ModelNode::from_data(
                &self.ctx.device,
                &self.ctx.queue,
                &self.ctx.material_layout,
                &model,
            );
            self.scene.attach(node);
            self.entrance = Some(EntranceSpin::new());
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            if let Some(model) = self.scene.model() {
                render_pass.set_pipeline(&self.ctx.pipeline);
                render_pass.draw_model(
                    model,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    state: Option<ViewerState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>) -> Self {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new().unwrap();
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            last_time: Instant::now(),
        }
    }

    /// Kicks off the one fetch of the process. The task owns no scene
    /// state; it only reports observations back through the proxy.
    fn start_pipeline(&mut self) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if !state.pipeline.begin() {
            return;
        }
        let proxy = self.proxy.clone();

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(fetch_model(proxy));

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fetch_model(proxy));
    }
}

/// The fetch task: read bytes, decode, report. Every outcome is an event;
/// failures never escape this function.
async fn fetch_model(proxy: EventLoopProxy<ViewerEvent>) {
    let event = match assets::load_binary(MODEL_ASSET).await {
        Ok(bytes) => {
            let _ = proxy.send_event(ViewerEvent::Load(LoadEvent::Progress(100.0)));
            match assets::gltf::decode_model(bytes, MODEL_ASSET).await {
                Ok(model) => LoadEvent::Ready(model),
                Err(err) => LoadEvent::Failed(err),
            }
        }
        Err(err) => LoadEvent::Failed(err),
    };
    if proxy.send_event(ViewerEvent::Load(event)).is_err() {
        log::warn!("event loop closed before the model fetch finished");
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("vitrine");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "model-canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = match self.async_runtime.block_on(Context::new(window)) {
                Ok(ctx) => ctx,
                Err(e) => panic!("App initialization failed. Cannot create the main context: {e}"),
            };
            self.state = Some(ViewerState::new(ctx));
            self.start_pipeline();
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window)
                    .await
                    .expect("App initialization failed. Cannot create the main context");
                assert!(proxy.send_event(ViewerEvent::ContextReady(ctx)).is_ok());
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::ContextReady(ctx) => {
                // This is the message from our wasm `spawn_local`
                let mut state = ViewerState::new(ctx);

                // Trigger a resize and redraw now that we are initialized
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                state.ctx.window.request_redraw();

                self.state = Some(state);
                self.start_pipeline();
            }
            ViewerEvent::Load(load_event) => {
                if let Some(state) = &mut self.state {
                    state.handle_load_event(load_event);
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render() {
                    Ok(_) => {
                        // Update the camera
                        state
                            .ctx
                            .camera
                            .controller
                            .update(&mut state.ctx.camera.camera, dt);
                        state
                            .ctx
                            .camera
                            .uniform
                            .update_view_proj(&state.ctx.camera.camera, &state.ctx.projection);
                        state.ctx.queue.write_buffer(
                            &state.ctx.camera.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
                        );
                        // Advance the entrance spin
                        if let Some(spin) = &mut state.entrance {
                            let offset = spin.advance(dt);
                            if let Some(model) = state.scene.model_mut() {
                                model.set_spin(offset);
                            }
                            if spin.is_finished() {
                                state.entrance = None;
                            }
                        }
                        state.scene.write_to_buffers(&state.ctx.queue);
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop);

    event_loop.run_app(&mut app)?;

    Ok(())
}
