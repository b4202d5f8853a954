//! vitrine
//!
//! A small cross-platform viewer that stages exactly one glTF asset: fixed
//! studio lighting, an auto-rotating orbit camera and a one-shot entrance
//! spin, rendered with wgpu on native targets and the web. The asset is
//! fetched once, its materials are normalized to a standardized reflective
//! look, and the render loop simply draws whatever the scene holds.
//!
//! High-level modules
//! - `animation`: the one-shot entrance spin and its easing
//! - `app`: event loop, render loop and pipeline-event consumption
//! - `assets`: asset fetching and glTF decode
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipeline
//! - `load`: the model pipeline state machine and display staging
//! - `pipelines`: the model render pipeline and the studio light rig
//! - `scene`: decoded model data, materials, textures and the scene graph
//!

pub mod animation;
pub mod app;
pub mod assets;
pub mod camera;
pub mod context;
pub mod load;
pub mod pipelines;
pub mod scene;

pub use app::run;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

/// Web entry point; the canvas is looked up by id when the window is built.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::prelude::*;
    run().unwrap_throw();
}
