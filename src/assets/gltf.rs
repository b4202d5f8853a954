//! glTF decode: from fetched bytes to a CPU-side [`ModelData`] tree.
//!
//! The async shell resolves external buffers and texture channels through
//! the same byte loader as the asset itself; `assemble` is pure and builds
//! the node tree from already-resolved data.

use std::{
    io::{BufReader, Cursor},
    sync::Arc,
};

use gltf::Gltf;

use crate::{
    assets::load_binary,
    scene::{
        data::{MeshData, ModelData, ModelVertex, NodeData, Transform},
        material::{Material, TextureData},
    },
};

/// Fetches and decodes one asset file.
pub async fn load_model(file_name: &str) -> anyhow::Result<ModelData> {
    let bytes = load_binary(file_name).await?;
    decode_model(bytes, file_name).await
}

/// Decodes already-fetched glTF bytes (binary or JSON form).
pub async fn decode_model(bytes: Vec<u8>, label: &str) -> anyhow::Result<ModelData> {
    let gltf_cursor = Cursor::new(bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = Gltf::from_reader(gltf_reader)?;

    let buffers = load_buffers(&gltf).await?;
    let materials = load_materials(&gltf, &buffers).await?;
    assemble(&gltf, &buffers, &materials, label)
}

/// Resolves buffer data: the embedded blob for .glb files, byte fetches for
/// external URIs.
async fn load_buffers(gltf: &Gltf) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.into());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }
    Ok(buffer_data)
}

/// Decodes one texture channel to RGBA8 pixels, wherever it lives.
async fn load_channel(
    texture: gltf::Texture<'_>,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Arc<TextureData>> {
    let bytes = match texture.source().source() {
        gltf::image::Source::View { view, .. } => {
            let buffer = &buffers[view.buffer().index()];
            buffer[view.offset()..view.offset() + view.length()].to_vec()
        }
        gltf::image::Source::Uri { uri, .. } => load_binary(uri).await?,
    };
    let img = image::load_from_memory(&bytes)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Arc::new(TextureData {
        pixels: rgba.into_raw(),
        width,
        height,
    }))
}

async fn optional_channel(
    texture: Option<gltf::Texture<'_>>,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Option<Arc<TextureData>>> {
    match texture {
        Some(texture) => Ok(Some(load_channel(texture, buffers).await?)),
        None => Ok(None),
    }
}

/// Builds the source-material table. Meshes index into this table, so
/// several meshes may share one entry here until normalization.
async fn load_materials(
    gltf: &Gltf,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Vec<Arc<Material>>> {
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let (base_color_map, normal_map, roughness_map) = futures::try_join!(
            optional_channel(pbr.base_color_texture().map(|info| info.texture()), buffers),
            optional_channel(
                material.normal_texture().map(|info| info.texture()),
                buffers
            ),
            optional_channel(
                pbr.metallic_roughness_texture().map(|info| info.texture()),
                buffers
            ),
        )?;

        materials.push(Arc::new(Material {
            name: material.name().unwrap_or("unnamed_material").to_string(),
            base_color_map,
            normal_map,
            roughness_map,
            tint: pbr.base_color_factor(),
            metalness: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
        }));
    }
    Ok(materials)
}

/// Pure assembly of the node tree from resolved buffers and materials.
pub fn assemble(
    gltf: &Gltf,
    buffers: &[Vec<u8>],
    materials: &[Arc<Material>],
    label: &str,
) -> anyhow::Result<ModelData> {
    let fallback = Arc::new(Material::default());
    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(read_node(node, buffers, materials, &fallback));
        }
    }

    Ok(ModelData {
        label: label.to_string(),
        transform: Transform::default(),
        roots,
    })
}

fn read_node(
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    materials: &[Arc<Material>],
    fallback: &Arc<Material>,
) -> NodeData {
    let mut meshes = Vec::new();
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            meshes.push(read_primitive(
                mesh.name().unwrap_or("unknown_mesh"),
                primitive,
                buffers,
                materials,
                fallback,
            ));
        }
    }

    let (position, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };

    let children = node
        .children()
        .map(|child| read_node(child, buffers, materials, fallback))
        .collect();

    NodeData {
        name: node.name().unwrap_or("unnamed_node").to_string(),
        transform,
        meshes,
        children,
    }
}

fn read_primitive(
    name: &str,
    primitive: gltf::Primitive,
    buffers: &[Vec<u8>],
    materials: &[Arc<Material>],
    fallback: &Arc<Material>,
) -> MeshData {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let mut vertices = Vec::new();
    if let Some(positions) = reader.read_positions() {
        positions.for_each(|position| {
            vertices.push(ModelVertex {
                position,
                ..Default::default()
            })
        });
    }
    if let Some(normals) = reader.read_normals() {
        for (i, normal) in normals.enumerate() {
            vertices[i].normal = normal;
        }
    }
    if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
        for (i, tex_coord) in tex_coords.enumerate() {
            vertices[i].tex_coords = tex_coord;
        }
    }
    if let Some(tangents) = reader.read_tangents() {
        for (i, tangent) in tangents.enumerate() {
            // glTF tangents are vec4; the 4th component gives the bitangent
            // its handedness
            let tangent: cgmath::Vector4<f32> = tangent.into();
            let normal: cgmath::Vector3<f32> = vertices[i].normal.into();
            vertices[i].tangent = tangent.truncate().into();
            vertices[i].bitangent = (normal.cross(tangent.truncate()) * tangent[3]).into();
        }
    }

    let mut indices = Vec::new();
    if let Some(raw) = reader.read_indices() {
        indices.append(&mut raw.into_u32().collect::<Vec<u32>>());
    }

    let material = primitive
        .material()
        .index()
        .and_then(|idx| materials.get(idx))
        .unwrap_or(fallback)
        .clone();

    MeshData {
        name: name.to_string(),
        vertices,
        indices,
        material,
    }
}
