mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Framing, animated_glb, draco_glb, serve_once, temp_file};
use glbvis::animation::Property;
use glbvis::asset::{
    AssetLoader, DecodedGeometry, DracoLayout, LoadHandle, LoadRequest, LoadedAsset, MeshDecoder, decode_slice,
    load_asset,
};
use glbvis::error::LoadError;
use glbvis::shell::HeadlessShell;

async fn wait_for(handle: &mut LoadHandle, shell: &mut HeadlessShell) -> Result<LoadedAsset, LoadError> {
    for _ in 0..500 {
        if let Some(result) = handle.poll(shell) {
            return result;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("load did not finish in time");
}

/// Returns a fixed triangle whatever the payload.
struct FixedTriangle;

impl MeshDecoder for FixedTriangle {
    fn decode(&self, compressed: &[u8], layout: &DracoLayout) -> Result<DecodedGeometry, LoadError> {
        assert_eq!(compressed, &[0xD5, 0xAC, 0x00, 0x01]);
        assert_eq!(layout.vertex_count, 3);
        assert_eq!(layout.index_count, 3);
        Ok(DecodedGeometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            normals: None,
            indices: vec![0, 2, 1],
        })
    }
}

#[test]
fn glb_decodes_nodes_meshes_and_clips() {
    let asset = decode_slice(&animated_glb(), "animated.glb", None).unwrap();
    let mesh = &asset.mesh;

    assert_eq!(mesh.nodes.len(), 2);
    assert_eq!(mesh.roots, vec![0]);
    assert_eq!(mesh.nodes[1].parent, Some(0));
    assert_eq!(mesh.nodes[1].mesh, Some(0));
    assert_eq!(mesh.primitive_count(), 1);

    let primitive = &mesh.meshes[0].primitives[0];
    assert_eq!(primitive.indices, vec![0, 1, 2]);
    // normals were generated from the winding
    assert!((primitive.vertices[0].normal[2] - 1.0).abs() < 1e-5);
    assert!((primitive.material.base_color[0] - 0.8).abs() < 1e-6);

    let names: Vec<_> = asset.clips.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Spin", "Lift"]);
    assert_eq!(asset.clips[0].tracks[0].property, Property::Rotation);
    assert_eq!(asset.clips[1].tracks[0].property, Property::Translation);
    assert!((asset.clips[0].duration - 1.0).abs() < 1e-6);
}

#[test]
fn draco_primitive_needs_a_decoder() {
    let err = decode_slice(&draco_glb(), "packed.glb", None).unwrap_err();
    assert!(matches!(err, LoadError::DecoderUnavailable { primitive: 0, .. }), "{err}");
}

#[test]
fn draco_primitive_goes_through_the_decoder() {
    let asset = decode_slice(&draco_glb(), "packed.glb", Some(&FixedTriangle)).unwrap();
    let primitive = &asset.mesh.meshes[0].primitives[0];
    assert_eq!(primitive.indices, vec![0, 2, 1]);
    assert_eq!(primitive.vertices.len(), 3);
    assert!((primitive.vertices[1].normal[1] - 1.0).abs() < 1e-5);
}

#[tokio::test(flavor = "multi_thread")]
async fn local_file_loads_through_the_loader() {
    let path = temp_file("local.glb", &animated_glb());
    let loader = AssetLoader::new(tokio::runtime::Handle::current()).with_decoder(None);
    let mut handle = loader.load(LoadRequest::new(path.to_string_lossy()));
    let mut shell = HeadlessShell::new();

    let asset = wait_for(&mut handle, &mut shell).await.unwrap();
    assert!(asset.mesh.name.ends_with("local.glb"));
    assert_eq!(asset.clips.len(), 2);
    assert!(shell.loading.is_none());
    assert_eq!(shell.clear_count, 1);
    assert!(handle.poll(&mut shell).is_none());

    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_with_content_length_reports_increasing_progress() {
    let url = serve_once(200, animated_glb(), Framing::Length).await;
    let mut progress = Vec::new();
    let asset = load_asset(&LoadRequest::new(url), None, |p| progress.push(p.percent()))
        .await
        .unwrap();

    assert_eq!(asset.mesh.name, "animated.glb");
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] < w[1]), "{progress:?}");
    assert_eq!(progress.last(), Some(&100));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_without_length_reports_no_progress() {
    let url = serve_once(200, animated_glb(), Framing::Chunked).await;
    let loader = AssetLoader::new(tokio::runtime::Handle::current()).with_decoder(None);
    let mut handle = loader.load(LoadRequest::new(url));
    let mut shell = HeadlessShell::new();

    let asset = wait_for(&mut handle, &mut shell).await.unwrap();
    assert_eq!(asset.clips.len(), 2);
    assert!(shell.percent_history.is_empty());
    assert_eq!(shell.clear_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_error_status_is_a_failure() {
    let url = serve_once(404, b"not here".to_vec(), Framing::Length).await;
    let err = load_asset(&LoadRequest::new(url), None, |_| {}).await.unwrap_err();
    assert!(matches!(err, LoadError::HttpStatus { status: 404, .. }), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_file_fails_exactly_once() {
    let path = std::env::temp_dir().join(format!("glbvis-{}-does-not-exist.glb", std::process::id()));
    let loader = AssetLoader::new(tokio::runtime::Handle::current()).with_decoder(Some(Arc::new(FixedTriangle)));
    let mut handle = loader.load(LoadRequest::new(path.to_string_lossy()));
    let mut shell = HeadlessShell::new();

    let err = wait_for(&mut handle, &mut shell).await.unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "{err}");
    assert!(handle.is_finished());
    assert!(handle.poll(&mut shell).is_none());
    assert_eq!(shell.clear_count, 1);
    assert!(shell.percent_history.is_empty());
}
