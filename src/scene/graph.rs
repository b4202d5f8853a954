//! The displayed scene: a single model slot plus the GPU-resident form of a
//! decoded model.
//!
//! [`ModelNode`] flattens the decoded node tree into a list of GPU meshes,
//! each carrying its model-space transform. The node's root transform (and
//! the entrance-spin offset composed onto it) stays mutable, so per-frame
//! updates only rewrite small per-draw buffers.

use cgmath::{Rad, Rotation3};
use wgpu::util::DeviceExt;

use crate::{
    pipelines::model::MaterialUniform,
    scene::{
        data::{MeshData, ModelData, NodeData, Transform},
        material::Material,
        texture::Texture,
    },
};

/// GPU resources of one material: uploaded channels, factor uniform and the
/// bind group tying them together.
#[derive(Debug)]
pub struct GpuMaterial {
    pub name: String,
    #[allow(unused)]
    pub base_color_map: Texture,
    #[allow(unused)]
    pub normal_map: Texture,
    #[allow(unused)]
    pub roughness_map: Texture,
    #[allow(unused)]
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material: &Material,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let base_color_map = match &material.base_color_map {
            Some(data) => Texture::from_data(device, queue, data, true, &material.name),
            None => Texture::create_default_white(device, queue),
        };
        let normal_map = match &material.normal_map {
            Some(data) => Texture::from_data(device, queue, data, false, &material.name),
            None => Texture::create_default_normal_map(device, queue),
        };
        let roughness_map = match &material.roughness_map {
            Some(data) => Texture::from_data(device, queue, data, false, &material.name),
            None => Texture::create_default_white(device, queue),
        };

        let uniform = MaterialUniform::new(material.tint, material.metalness, material.roughness);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&base_color_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&base_color_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&normal_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&roughness_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&roughness_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
            label: Some("material_bind_group"),
        });

        Self {
            name: material.name.clone(),
            base_color_map,
            normal_map,
            roughness_map,
            uniform_buffer,
            bind_group,
        }
    }
}

/// One mesh on the GPU: geometry buffers, its flattened model-space
/// transform, and the per-draw buffer that transform is written to.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub transform: Transform,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub transform_buffer: wgpu::Buffer,
    pub material: GpuMaterial,
}

impl GpuMesh {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        mesh: &MeshData,
        transform: Transform,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Transform Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&[transform.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let material = GpuMaterial::new(device, queue, &mesh.material, layout);

        Self {
            name: mesh.name.clone(),
            transform,
            vertex_buffer,
            index_buffer,
            num_elements: mesh.indices.len() as u32,
            transform_buffer,
            material,
        }
    }
}

/// A decoded model uploaded to the GPU, ready to attach to the scene.
#[derive(Debug)]
pub struct ModelNode {
    pub label: String,
    pub transform: Transform,
    spin: Rad<f32>,
    meshes: Vec<GpuMesh>,
}

impl ModelNode {
    /// Uploads `model` to the GPU, flattening the node hierarchy into
    /// model-space mesh transforms.
    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        model: &ModelData,
    ) -> Self {
        let mut meshes = Vec::new();
        for root in &model.roots {
            flatten(device, queue, layout, root, &Transform::default(), &mut meshes);
        }
        log::info!("uploaded model {} ({} meshes)", model.label, meshes.len());

        Self {
            label: model.label.clone(),
            transform: model.transform.clone(),
            spin: Rad(0.0),
            meshes,
        }
    }

    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }

    /// Sets the entrance-spin offset. Composed onto the root rotation at
    /// buffer-write time rather than overwriting it.
    pub fn set_spin(&mut self, offset: Rad<f32>) {
        self.spin = offset;
    }

    fn effective_root(&self) -> Transform {
        let mut root = self.transform.clone();
        root.rotation = cgmath::Quaternion::from_angle_y(self.spin) * root.rotation;
        root
    }

    /// Rewrites every mesh's per-draw buffer with the current root
    /// transform applied.
    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        let root = self.effective_root();
        for mesh in &self.meshes {
            let raw = (&root * &mesh.transform).to_raw();
            queue.write_buffer(&mesh.transform_buffer, 0, bytemuck::cast_slice(&[raw]));
        }
    }
}

fn flatten(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    node: &NodeData,
    parent: &Transform,
    out: &mut Vec<GpuMesh>,
) {
    let transform = parent * &node.transform;
    for mesh in &node.meshes {
        out.push(GpuMesh::new(device, queue, layout, mesh, transform.clone()));
    }
    for child in &node.children {
        flatten(device, queue, layout, child, &transform, out);
    }
}

/// The scene root. Holds at most one model; created empty at startup and
/// mutated exactly once, on successful load.
#[derive(Debug, Default)]
pub struct Scene {
    model: Option<ModelNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Attaches the loaded model. The slot is written once; a second attach
    /// is refused and logged.
    pub fn attach(&mut self, node: ModelNode) {
        if self.model.is_some() {
            log::warn!("scene already holds a model, ignoring attach of {}", node.label);
            return;
        }
        self.model = Some(node);
    }

    pub fn model(&self) -> Option<&ModelNode> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut ModelNode> {
        self.model.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_none()
    }

    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        if let Some(model) = &self.model {
            model.write_to_buffers(queue);
        }
    }
}

pub trait DrawModel<'a> {
    fn draw_model(
        &mut self,
        model: &'a ModelNode,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_model(
        &mut self,
        model: &'b ModelNode,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        for mesh in model.meshes() {
            self.set_bind_group(0, &mesh.material.bind_group, &[]);
            self.set_bind_group(1, camera_bind_group, &[]);
            self.set_bind_group(2, light_bind_group, &[]);
            self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            self.set_vertex_buffer(1, mesh.transform_buffer.slice(..));
            self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            self.draw_indexed(0..mesh.num_elements, 0, 0..1);
        }
    }
}
