use std::sync::Arc;

use vitrine::load::{
    DISPLAY_LIFT, DISPLAY_SCALE, LoadEvent, LoadPhase, ModelPipeline, stage_for_display,
};
use vitrine::scene::{
    data::{MeshData, ModelData, NodeData},
    material::{Material, NEUTRAL_TINT},
};

fn mock_model(meshes: usize) -> ModelData {
    let shared = Arc::new(Material {
        name: "shared".to_string(),
        tint: [0.1, 0.1, 0.1, 1.0],
        ..Default::default()
    });
    let root = NodeData {
        name: "root".to_string(),
        meshes: (0..meshes)
            .map(|i| MeshData {
                name: format!("mesh_{i}"),
                vertices: Vec::new(),
                indices: Vec::new(),
                material: shared.clone(),
            })
            .collect(),
        ..Default::default()
    };
    ModelData {
        label: "mock".to_string(),
        roots: vec![root],
        ..Default::default()
    }
}

#[test]
fn begin_fires_once_per_process() {
    let mut pipeline = ModelPipeline::new();
    assert_eq!(pipeline.phase(), LoadPhase::Idle);
    assert!(pipeline.begin());
    assert_eq!(pipeline.phase(), LoadPhase::Loading);
    assert!(!pipeline.begin());
    assert_eq!(pipeline.phase(), LoadPhase::Loading);
}

#[test]
fn progress_is_diagnostics_only() {
    let mut pipeline = ModelPipeline::new();
    pipeline.begin();
    for percent in [0.0, 12.5, 99.9] {
        assert!(pipeline.observe(LoadEvent::Progress(percent)).is_none());
        assert_eq!(pipeline.phase(), LoadPhase::Loading);
    }
}

#[test]
fn ready_yields_a_staged_normalized_model_exactly_once() {
    let mut pipeline = ModelPipeline::new();
    pipeline.begin();

    let model = pipeline
        .observe(LoadEvent::Ready(mock_model(5)))
        .expect("first Ready should yield the model");
    assert_eq!(pipeline.phase(), LoadPhase::Ready);

    // staged for display
    assert_eq!(model.transform.scale.x, DISPLAY_SCALE);
    assert_eq!(model.transform.scale.y, DISPLAY_SCALE);
    assert_eq!(model.transform.scale.z, DISPLAY_SCALE);
    assert_eq!(model.transform.position.y, DISPLAY_LIFT);
    // materials normalized on the way through
    model.for_each_mesh(|mesh| assert_eq!(mesh.material.tint, NEUTRAL_TINT));

    // `Ready` is terminal; a duplicate is dropped
    assert!(pipeline.observe(LoadEvent::Ready(mock_model(1))).is_none());
    assert_eq!(pipeline.phase(), LoadPhase::Ready);
}

#[test]
fn failure_is_terminal_and_never_yields_a_model() {
    let mut pipeline = ModelPipeline::new();
    pipeline.begin();

    let outcome = pipeline.observe(LoadEvent::Failed(anyhow::anyhow!("connection reset")));
    assert!(outcome.is_none());
    assert_eq!(pipeline.phase(), LoadPhase::Failed);

    // nothing after failure produces a model, so the scene stays untouched
    assert!(pipeline.observe(LoadEvent::Ready(mock_model(1))).is_none());
    assert!(pipeline.observe(LoadEvent::Progress(100.0)).is_none());
    assert_eq!(pipeline.phase(), LoadPhase::Failed);
}

#[test]
fn events_before_begin_are_dropped() {
    let mut pipeline = ModelPipeline::new();
    assert!(pipeline.observe(LoadEvent::Progress(10.0)).is_none());
    assert!(pipeline.observe(LoadEvent::Ready(mock_model(1))).is_none());
    assert_eq!(pipeline.phase(), LoadPhase::Idle);
}

#[test]
fn staging_applies_the_fixed_root_transform() {
    let mut model = mock_model(0);
    stage_for_display(&mut model);
    assert_eq!(model.transform.scale.x, 1.2);
    assert_eq!(model.transform.position.y, 0.8);
    assert_eq!(model.transform.position.x, 0.0);
    assert_eq!(model.transform.position.z, 0.0);
}
