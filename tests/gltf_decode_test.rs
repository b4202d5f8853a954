use futures::executor::block_on;
use vitrine::assets::gltf::decode_model;

/// A valid glTF 2.0 document with one empty node and no geometry.
const EMPTY_STAGE: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [0] } ],
    "nodes": [ { "name": "stage" } ]
}"#;

#[test]
fn a_meshless_document_decodes_to_an_empty_tree() {
    let model = block_on(decode_model(EMPTY_STAGE.as_bytes().to_vec(), "stage.gltf"))
        .expect("minimal document should decode");

    assert_eq!(model.label, "stage.gltf");
    assert_eq!(model.roots.len(), 1);
    assert_eq!(model.roots[0].name, "stage");
    assert_eq!(model.mesh_count(), 0);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let result = block_on(decode_model(b"definitely not a gltf".to_vec(), "junk.glb"));
    assert!(result.is_err());
}

#[test]
fn truncated_json_fails_to_decode() {
    let truncated = &EMPTY_STAGE[..EMPTY_STAGE.len() / 2];
    let result = block_on(decode_model(truncated.as_bytes().to_vec(), "half.gltf"));
    assert!(result.is_err());
}
