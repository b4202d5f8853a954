//! CPU-side model data: the decoded asset tree and per-vertex/per-draw types.
//!
//! Decoding produces plain data first; GPU buffers are created later when the
//! model is attached to the scene. Keeping the staging types free of device
//! handles lets the material pass and the loader be exercised without a GPU.

use std::ops::Mul;
use std::sync::Arc;

use cgmath::{One, SquareMatrix};

use crate::scene::material::Material;

/// Local transformation of a node: position, rotation (quaternion) and scale.
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> TransformRaw {
        let world_matrix = self.to_matrix();
        let handedness = world_matrix.determinant().signum();
        TransformRaw {
            model: world_matrix.into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
            handedness,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<&Transform> for &Transform {
    type Output = Transform;

    /// Composes `parent * local` the way scene hierarchies expect: the local
    /// position is scaled and rotated into the parent's frame first.
    fn mul(self, rhs: &Transform) -> Transform {
        let rotation = self.rotation * rhs.rotation;
        let scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_pos),
            rotation,
            scale,
        }
    }
}

/**
 * The raw transform is the per-draw data actually stored on the GPU.
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
}

/// Anything with a static vertex-buffer layout description.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

impl Vertex for TransformRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TransformRaw>() as wgpu::BufferAddress,
            // Advance per draw instance rather than per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // mat4 takes four vec4 slots
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // normal matrix as 3x3
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// One vertex of a decoded mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// One decoded mesh primitive: geometry plus a material reference.
///
/// The material starts out shared (several meshes may point at the same
/// source material); the normalization pass replaces it with a per-mesh
/// instance.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material: Arc<Material>,
}

/// One node of the decoded asset tree.
#[derive(Clone, Debug, Default)]
pub struct NodeData {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<MeshData>,
    pub children: Vec<NodeData>,
}

impl NodeData {
    fn for_each_mesh_mut(&mut self, f: &mut dyn FnMut(&mut MeshData)) {
        for mesh in &mut self.meshes {
            f(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(f);
        }
    }

    fn for_each_mesh(&self, f: &mut dyn FnMut(&MeshData)) {
        for mesh in &self.meshes {
            f(mesh);
        }
        for child in &self.children {
            child.for_each_mesh(f);
        }
    }
}

/// The decoded asset: a root transform over one or more node trees.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub label: String,
    pub transform: Transform,
    pub roots: Vec<NodeData>,
}

impl ModelData {
    /// Visits every mesh in the tree exactly once, in depth-first order.
    pub fn for_each_mesh_mut(&mut self, mut f: impl FnMut(&mut MeshData)) {
        for root in &mut self.roots {
            root.for_each_mesh_mut(&mut f);
        }
    }

    /// Visits every mesh without mutation.
    pub fn for_each_mesh(&self, mut f: impl FnMut(&MeshData)) {
        for root in &self.roots {
            root.for_each_mesh(&mut f);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(|_| count += 1);
        count
    }
}
