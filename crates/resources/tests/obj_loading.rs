//! Integration tests for OBJ loading and deduplication.

use std::io::Cursor;

use glam::{Vec2, Vec3};
use vista_resources::{MeshBuilder, ResourceError};

const QUAD_OBJ: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

fn load(source: &str) -> MeshBuilder {
    MeshBuilder::from_obj_reader(&mut Cursor::new(source)).expect("valid OBJ")
}

#[test]
fn test_quad_shares_corner_vertices() {
    let builder = load(QUAD_OBJ);

    assert_eq!(builder.vertices.len(), 4);
    assert_eq!(builder.indices.len(), 6);
    assert!(builder.indices.iter().all(|&i| (i as usize) < builder.vertices.len()));
    assert_eq!(builder.checked_vertex_count().unwrap(), 4);
}

#[test]
fn test_attributes_follow_their_own_indices() {
    let builder = load(QUAD_OBJ);

    let corner = builder.vertices[builder.indices[2] as usize];
    assert_eq!(corner.position, Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(corner.normal, Vec3::Z);
    assert_eq!(corner.uv, Vec2::new(1.0, 1.0));
}

#[test]
fn test_missing_attributes_use_defaults() {
    let builder = load("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

    assert_eq!(builder.vertices.len(), 3);
    for vertex in &builder.vertices {
        assert_eq!(vertex.color, Vec3::ONE);
        assert_eq!(vertex.normal, Vec3::ZERO);
        assert_eq!(vertex.uv, Vec2::ZERO);
    }
}

#[test]
fn test_same_position_different_normal_is_distinct() {
    let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
    let builder = load(source);

    assert_eq!(builder.vertices.len(), 6);
    assert_eq!(builder.indices.len(), 6);
}

#[test]
fn test_dedup_never_grows_the_stream() {
    let builder = load(QUAD_OBJ);
    assert!(builder.vertices.len() <= builder.indices.len());
}

#[test]
fn test_missing_file_reports_path() {
    let err = MeshBuilder::from_obj_file("does/not/exist.obj").unwrap_err();
    match err {
        ResourceError::ObjLoad { path, .. } => {
            assert!(path.ends_with("exist.obj"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_source_is_too_small_for_a_mesh() {
    let builder = load("");
    assert!(builder.vertices.is_empty());
    assert!(matches!(
        builder.checked_vertex_count(),
        Err(ResourceError::TooFewVertices(0))
    ));
}

fn demo_model(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data/models")
        .join(name)
}

#[test]
fn test_smooth_vase_shares_ring_vertices() {
    let builder = MeshBuilder::from_obj_file(demo_model("smooth_vase.obj")).unwrap();

    // 8 rings of 24, 7 bands of 24 quads
    assert_eq!(builder.vertices.len(), 8 * 24);
    assert_eq!(builder.indices.len(), 7 * 24 * 6);
}

#[test]
fn test_flat_vase_splits_vertices_per_face() {
    let builder = MeshBuilder::from_obj_file(demo_model("flat_vase.obj")).unwrap();

    // Face normals keep every quad corner distinct
    assert_eq!(builder.vertices.len(), 7 * 24 * 4);
    assert_eq!(builder.indices.len(), 7 * 24 * 6);
    assert!(builder.indices.len() >= builder.vertices.len());
}
