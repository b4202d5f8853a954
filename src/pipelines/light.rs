//! The fixed studio light rig: ambient fill, a white key spot above and in
//! front of the model, and a red accent point light to the side.

use std::f32::consts::FRAC_PI_4;

use wgpu::util::DeviceExt;

/// Ambient fill intensity.
const AMBIENT_INTENSITY: f32 = 0.3;
/// Key spot: position, intensity and cone.
const SPOT_POSITION: [f32; 3] = [0.0, 5.0, 5.0];
const SPOT_INTENSITY: f32 = 4.0;
const SPOT_ANGLE: f32 = FRAC_PI_4;
const SPOT_PENUMBRA: f32 = 0.3;
/// Accent point light: deep red, off to the left.
const ACCENT_POSITION: [f32; 3] = [-3.0, 2.0, 3.0];
const ACCENT_COLOR: [f32; 3] = [0.796, 0.0, 0.0];
const ACCENT_INTENSITY: f32 = 2.0;
const ACCENT_RANGE: f32 = 10.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRigUniform {
    // rgb premultiplied by intensity; w unused
    ambient: [f32; 4],
    // xyz position; w holds the cosine of the outer cone angle
    spot_position: [f32; 4],
    // xyz direction; w holds the cosine of the inner cone angle
    spot_direction: [f32; 4],
    // rgb premultiplied by intensity; w unused
    spot_color: [f32; 4],
    // xyz position; w holds the range
    accent_position: [f32; 4],
    // rgb premultiplied by intensity; w unused
    accent_color: [f32; 4],
}

impl LightRigUniform {
    /// The rig the viewer always uses; nothing here is configurable.
    pub fn studio() -> Self {
        let [x, y, z] = SPOT_POSITION;
        // The spot aims at the origin, where the model sits
        let len = (x * x + y * y + z * z).sqrt();
        let direction = [-x / len, -y / len, -z / len];
        let cos_outer = SPOT_ANGLE.cos();
        let cos_inner = (SPOT_ANGLE * (1.0 - SPOT_PENUMBRA)).cos();

        Self {
            ambient: [
                AMBIENT_INTENSITY,
                AMBIENT_INTENSITY,
                AMBIENT_INTENSITY,
                0.0,
            ],
            spot_position: [x, y, z, cos_outer],
            spot_direction: [direction[0], direction[1], direction[2], cos_inner],
            spot_color: [SPOT_INTENSITY, SPOT_INTENSITY, SPOT_INTENSITY, 0.0],
            accent_position: [
                ACCENT_POSITION[0],
                ACCENT_POSITION[1],
                ACCENT_POSITION[2],
                ACCENT_RANGE,
            ],
            accent_color: [
                ACCENT_COLOR[0] * ACCENT_INTENSITY,
                ACCENT_COLOR[1] * ACCENT_INTENSITY,
                ACCENT_COLOR[2] * ACCENT_INTENSITY,
                0.0,
            ],
        }
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightRigUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, uniform: LightRigUniform) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightRigUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Rig Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: None,
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: None,
    })
}
