//! Surface materials and the display-normalization pass.
//!
//! Assets arrive with arbitrary PBR parameters; for display every mesh is
//! rewritten to a standardized reflective material that keeps only the
//! source's texture channels. The rewrite is a pure mapping from source to
//! derived material, applied once per mesh right after decode.

use std::sync::Arc;

use crate::scene::data::ModelData;

/// Tint applied to every derived material, regardless of the source tint.
pub const NEUTRAL_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Fixed metalness of derived materials. High, so the rig's lights read as
/// reflections on the asset's surfaces.
pub const STANDARD_METALNESS: f32 = 0.7;
/// Fixed roughness of derived materials. Low, for sharper highlights.
pub const STANDARD_ROUGHNESS: f32 = 0.3;

/// Decoded RGBA8 image data for one texture channel.
///
/// Channels are reference-counted so several materials can share one decoded
/// image without copying pixels; sharing is observable via [`Arc::ptr_eq`].
#[derive(Clone, Debug)]
pub struct TextureData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    /// A single-color texture, used for missing channels and in tests.
    pub fn solid(rgba: [u8; 4], width: u32, height: u32) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Surface description of a mesh: three optional texture channels plus
/// scalar factors. Immutable once built.
#[derive(Clone, Debug)]
pub struct Material {
    pub name: String,
    pub base_color_map: Option<Arc<TextureData>>,
    pub normal_map: Option<Arc<TextureData>>,
    pub roughness_map: Option<Arc<TextureData>>,
    pub tint: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    /// Derives the standardized display material from `source`.
    ///
    /// Only the three map channels survive; the tint is reset to neutral and
    /// the scalar factors are pinned to the display constants. Everything
    /// else the source carried is dropped.
    pub fn standardized(source: &Material) -> Material {
        Material {
            name: source.name.clone(),
            base_color_map: source.base_color_map.clone(),
            normal_map: source.normal_map.clone(),
            roughness_map: source.roughness_map.clone(),
            tint: NEUTRAL_TINT,
            metalness: STANDARD_METALNESS,
            roughness: STANDARD_ROUGHNESS,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color_map: None,
            normal_map: None,
            roughness_map: None,
            tint: [1.0, 1.0, 1.0, 1.0],
            metalness: 1.0,
            roughness: 1.0,
        }
    }
}

/// Rewrites every mesh of `model` to its own standardized material instance.
///
/// Meshes that pointed at a shared source material each get a fresh
/// allocation, so no two meshes alias a material after this pass. Returns
/// the number of meshes visited.
pub fn normalize_materials(model: &mut ModelData) -> usize {
    let mut visited = 0;
    model.for_each_mesh_mut(|mesh| {
        mesh.material = Arc::new(Material::standardized(&mesh.material));
        visited += 1;
    });
    visited
}
