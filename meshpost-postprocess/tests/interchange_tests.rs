//! Conversion behavior of the interchange adapter

mod common;

use common::*;
use meshpost_core::TriangleMesh;
use meshpost_postprocess::{
    InputShape, InterchangeAdapter, MeshRef, PlyFormat, PostprocessError, ValueExport,
};
use std::fs;

fn round_trip(adapter: &InterchangeAdapter, mesh: TriangleMesh) -> TriangleMesh {
    let imported = adapter.to_session_mesh(MeshRef::Value(mesh)).unwrap();
    adapter
        .to_value_mesh(imported.shape, imported.session)
        .unwrap()
        .into_value()
        .unwrap()
}

#[test]
fn test_round_trip_identity_binary() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path()).with_value_export(ValueExport::Extract);
    let adapter = InterchangeAdapter::new(config.clone());

    for mesh in [cube(), blob_with_island(), wavy_grid(7, 3)] {
        let back = round_trip(&adapter, mesh.clone());
        assert_eq!(back.vertex_count(), mesh.vertex_count());
        assert_eq!(back.face_count(), mesh.face_count());
        assert_eq!(back.faces, mesh.faces);
        assert_eq!(back.vertices, mesh.vertices);
    }
    assert_eq!(leftover_artifacts(&config), 0);
}

#[test]
fn test_round_trip_identity_ascii() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path())
        .with_value_export(ValueExport::Extract)
        .with_artifact_format(PlyFormat::Ascii);
    let adapter = InterchangeAdapter::new(config.clone());

    let mesh = wavy_grid(9, 9);
    let back = round_trip(&adapter, mesh.clone());
    assert_eq!(back.faces, mesh.faces);
    for (a, b) in back.vertices.iter().zip(&mesh.vertices) {
        approx::assert_relative_eq!(a.coords, b.coords, epsilon = 1e-6);
    }
    assert_eq!(leftover_artifacts(&config), 0);
}

#[test]
fn test_round_trip_through_every_artifact_format() {
    let root = tempfile::tempdir().unwrap();
    let mesh = blob_with_island();

    for format in [
        PlyFormat::BinaryLittleEndian,
        PlyFormat::BinaryBigEndian,
        PlyFormat::Ascii,
    ] {
        let config = config_in(root.path())
            .with_value_export(ValueExport::Extract)
            .with_artifact_format(format);
        let adapter = InterchangeAdapter::new(config.clone());

        let imported = adapter.to_session_mesh(MeshRef::Value(mesh.clone())).unwrap();
        let session_mesh = imported.session.current_mesh().unwrap();
        assert_eq!(session_mesh.face_count(), mesh.face_count(), "{:?}", format);
        assert_eq!(session_mesh.mesh().faces, mesh.faces, "{:?}", format);

        let back = adapter
            .to_value_mesh(imported.shape, imported.session)
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(back.faces, mesh.faces, "{:?}", format);
        for (a, b) in back.vertices.iter().zip(&mesh.vertices) {
            approx::assert_relative_eq!(a.coords, b.coords, epsilon = 1e-6);
        }
        assert_eq!(leftover_artifacts(&config), 0, "{:?}", format);
    }
}

#[test]
fn test_value_pass_through_is_default() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    assert_eq!(config.value_export, ValueExport::PassThrough);
    let adapter = InterchangeAdapter::new(config);

    let original = blob_with_island();
    let imported = adapter.to_session_mesh(MeshRef::Value(original.clone())).unwrap();
    let mut session = imported.session;

    // Whatever happens to the session, the caller gets its own matrices back
    session
        .current_mesh_mut()
        .unwrap()
        .replace_mesh(TriangleMesh::new());
    let out = adapter.to_value_mesh(imported.shape, session).unwrap();
    assert_eq!(out.into_value().unwrap(), original);
}

#[test]
fn test_path_round_trip_for_each_format() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    let adapter = InterchangeAdapter::new(config.clone());

    for name in ["cube.ply", "cube.obj"] {
        let path = root.path().join(name);
        meshpost_io::write_mesh(&cube(), &path).unwrap();

        let imported = adapter.to_session_mesh(MeshRef::Path(path.clone())).unwrap();
        assert!(matches!(imported.shape, InputShape::Path(ref p) if *p == path));

        let out = adapter
            .to_value_mesh(imported.shape, imported.session)
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(out, cube(), "{}", name);
    }
    assert_eq!(leftover_artifacts(&config), 0);
}

#[test]
fn test_gltf_scene_is_flattened() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    let adapter = InterchangeAdapter::new(config.clone());

    let path = root.path().join("parts.gltf");
    fs::write(&path, TWO_PART_GLTF).unwrap();

    let imported = adapter.to_session_mesh(MeshRef::Path(path)).unwrap();
    assert_eq!(imported.session.mesh_count(), 1);

    let mesh = adapter
        .to_value_mesh(imported.shape, imported.session)
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
    assert_eq!(mesh.vertices[3].x, 10.0);
    assert_eq!(leftover_artifacts(&config), 0);
}

#[test]
fn test_malformed_input_file_is_load_error() {
    let root = tempfile::tempdir().unwrap();
    let config = config_in(root.path());
    let adapter = InterchangeAdapter::new(config.clone());

    let path = root.path().join("garbage.ply");
    fs::write(&path, b"definitely not a ply file").unwrap();

    let err = adapter.to_session_mesh(MeshRef::Path(path.clone())).unwrap_err();
    match err {
        PostprocessError::Load { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(leftover_artifacts(&config), 0);
}

#[test]
fn test_temp_dir_failure() {
    let root = tempfile::tempdir().unwrap();
    let blocker = root.path().join("occupied");
    fs::write(&blocker, b"").unwrap();
    let adapter = InterchangeAdapter::new(config_in(root.path()).with_temp_dir(&blocker));

    let err = adapter.to_session_mesh(MeshRef::Value(cube())).unwrap_err();
    assert!(matches!(err, PostprocessError::TempDir { .. }));
}
