use std::sync::Arc;

use vitrine::scene::{
    data::{MeshData, ModelData, NodeData},
    material::{
        Material, NEUTRAL_TINT, STANDARD_METALNESS, STANDARD_ROUGHNESS, TextureData,
        normalize_materials,
    },
};

fn source_material() -> Arc<Material> {
    Arc::new(Material {
        name: "painted_metal".to_string(),
        base_color_map: Some(Arc::new(TextureData::solid([200, 180, 10, 255], 2, 2))),
        normal_map: Some(Arc::new(TextureData::solid([127, 127, 255, 255], 2, 2))),
        roughness_map: Some(Arc::new(TextureData::solid([0, 90, 0, 255], 2, 2))),
        tint: [0.2, 0.4, 0.6, 1.0],
        metalness: 0.05,
        roughness: 0.95,
    })
}

fn mesh(name: &str, material: Arc<Material>) -> MeshData {
    MeshData {
        name: name.to_string(),
        vertices: Vec::new(),
        indices: Vec::new(),
        material,
    }
}

/// A model with `n` meshes that all share one source material, spread over
/// a small node hierarchy.
fn mock_model(n: usize) -> ModelData {
    let shared = source_material();
    let mut root = NodeData {
        name: "root".to_string(),
        ..Default::default()
    };
    let mut child = NodeData {
        name: "child".to_string(),
        ..Default::default()
    };
    for i in 0..n {
        let m = mesh(&format!("mesh_{i}"), shared.clone());
        // alternate between the root and a nested child node
        if i % 2 == 0 {
            root.meshes.push(m);
        } else {
            child.meshes.push(m);
        }
    }
    root.children.push(child);
    ModelData {
        label: "mock".to_string(),
        roots: vec![root],
        ..Default::default()
    }
}

#[test]
fn visits_every_mesh_exactly_once() {
    for n in [0, 1, 5] {
        let mut model = mock_model(n);
        assert_eq!(model.mesh_count(), n);
        let visited = normalize_materials(&mut model);
        assert_eq!(visited, n, "expected {n} meshes visited");
        assert_eq!(model.mesh_count(), n);
    }
}

#[test]
fn every_mesh_gets_its_own_material_instance() {
    let mut model = mock_model(5);
    normalize_materials(&mut model);

    let mut materials: Vec<Arc<Material>> = Vec::new();
    model.for_each_mesh(|mesh| materials.push(mesh.material.clone()));
    assert_eq!(materials.len(), 5);
    for (i, a) in materials.iter().enumerate() {
        for b in materials.iter().skip(i + 1) {
            assert!(
                !Arc::ptr_eq(a, b),
                "two meshes still share a material after normalization"
            );
        }
    }
}

#[test]
fn tint_and_factors_are_pinned_to_the_display_constants() {
    let mut model = mock_model(3);
    normalize_materials(&mut model);

    model.for_each_mesh(|mesh| {
        assert_eq!(mesh.material.tint, NEUTRAL_TINT);
        assert_eq!(mesh.material.metalness, STANDARD_METALNESS);
        assert_eq!(mesh.material.roughness, STANDARD_ROUGHNESS);
    });
}

#[test]
fn map_channels_are_copied_by_reference() {
    let source = source_material();
    let derived = Material::standardized(&source);

    let expect_shared = |a: &Option<Arc<TextureData>>, b: &Option<Arc<TextureData>>| {
        match (a, b) {
            (Some(a), Some(b)) => assert!(Arc::ptr_eq(a, b), "channel was copied, not shared"),
            _ => panic!("channel went missing during derivation"),
        }
    };
    expect_shared(&derived.base_color_map, &source.base_color_map);
    expect_shared(&derived.normal_map, &source.normal_map);
    expect_shared(&derived.roughness_map, &source.roughness_map);
}

#[test]
fn missing_channels_stay_missing() {
    let bare = Arc::new(Material {
        name: "untextured".to_string(),
        ..Default::default()
    });
    let derived = Material::standardized(&bare);
    assert!(derived.base_color_map.is_none());
    assert!(derived.normal_map.is_none());
    assert!(derived.roughness_map.is_none());
    assert_eq!(derived.tint, NEUTRAL_TINT);
}

#[test]
fn source_materials_are_not_mutated() {
    let source = source_material();
    let _ = Material::standardized(&source);
    assert_eq!(source.tint, [0.2, 0.4, 0.6, 1.0]);
    assert_eq!(source.metalness, 0.05);
    assert_eq!(source.roughness, 0.95);
}
