//! Orbit camera, controller and uniforms for view/projection.
//!
//! The camera circles a fixed target. It rotates on its own at a constant
//! rate and can be dragged with the left mouse button; drag input decays
//! with a damping factor so the orbit eases out after release. Zooming is
//! deliberately not wired up.

use instant::Duration;

use cgmath::{Matrix4, Point3, Rad, Vector3, perspective};
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Auto-rotation rate, one full turn roughly every 32 seconds.
pub const AUTO_ROTATE_DEG_PER_SEC: f32 = 11.4;
/// Fraction of the pending drag delta applied per frame.
pub const ORBIT_DAMPING: f32 = 0.05;
/// Pitch limit keeping the orbit off the poles.
const PITCH_LIMIT_DEG: f32 = 89.0;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera orbiting `target` at `distance`, described by yaw and pitch.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub distance: f32,
}

impl OrbitCamera {
    pub fn new<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        target: Point3<f32>,
        yaw: Y,
        pitch: P,
        distance: f32,
    ) -> Self {
        Self {
            target,
            yaw: yaw.into(),
            pitch: pitch.into(),
            distance,
        }
    }

    /// Eye position in world space.
    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let offset = Vector3::new(
            cos_pitch * cos_yaw,
            sin_pitch,
            cos_pitch * sin_yaw,
        ) * self.distance;
        self.target + offset
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }
}

/// Perspective projection tracking the surface dimensions.
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Keeps the aspect ratio equal to the surface's width/height.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Applies auto-rotation and damped drag input to an [`OrbitCamera`].
#[derive(Debug)]
pub struct OrbitController {
    auto_rotate: Rad<f32>,
    damping: f32,
    yaw_pending: f32,
    pitch_pending: f32,
    dragging: bool,
}

impl OrbitController {
    pub fn new(auto_rotate_deg_per_sec: f32, damping: f32) -> Self {
        Self {
            auto_rotate: cgmath::Deg(auto_rotate_deg_per_sec).into(),
            damping,
            yaw_pending: 0.0,
            pitch_pending: 0.0,
            dragging: false,
        }
    }

    /// Raw mouse motion. Only accumulates while the left button is down.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if !self.dragging {
            return;
        }
        self.yaw_pending += dx as f32 * 0.005;
        self.pitch_pending += dy as f32 * 0.005;
    }

    /// Tracks the drag state from window events.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } = event
        {
            self.dragging = *state == ElementState::Pressed;
        }
    }

    /// Advances the orbit by one frame: constant auto-rotation plus the
    /// damped share of any pending drag delta.
    pub fn update(&mut self, camera: &mut OrbitCamera, dt: Duration) {
        let dt = dt.as_secs_f32();
        camera.yaw += self.auto_rotate * dt;

        camera.yaw += Rad(self.yaw_pending * self.damping);
        camera.pitch += Rad(self.pitch_pending * self.damping);
        self.yaw_pending *= 1.0 - self.damping;
        self.pitch_pending *= 1.0 - self.damping;

        let limit = cgmath::Deg(PITCH_LIMIT_DEG).into();
        if camera.pitch > limit {
            camera.pitch = limit;
        } else if camera.pitch < -limit {
            camera.pitch = -limit;
        }
    }
}

/// View/projection data as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.eye().to_homogeneous().into();
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state bundled with its GPU resources.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
