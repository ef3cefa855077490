use crate::gltf::test_support::write_triangle_scene;
use crate::*;
use approx::assert_relative_eq;
use meshpost_core::{Error, Point3f, TriangleMesh};

fn create_test_mesh() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
}

#[test]
fn test_format_classification() {
    assert_eq!(MeshFormat::from_path("a.ply").unwrap(), MeshFormat::Ply);
    assert_eq!(MeshFormat::from_path("a.OBJ").unwrap(), MeshFormat::Obj);
    assert_eq!(MeshFormat::from_path("dir/a.glb").unwrap(), MeshFormat::Gltf);
    assert_eq!(MeshFormat::from_path("a.gltf").unwrap(), MeshFormat::Gltf);

    assert!(MeshFormat::Ply.is_polygon_soup());
    assert!(MeshFormat::Obj.is_polygon_soup());
    assert!(!MeshFormat::Gltf.is_polygon_soup());
    assert!(!MeshFormat::Gltf.supports_writing());
}

#[test]
fn test_unsupported_format() {
    assert!(matches!(
        MeshFormat::from_path("mesh.stl"),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(matches!(
        MeshFormat::from_path("no_extension"),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(read_mesh("test.stl").is_err());
}

#[test]
fn test_auto_detect_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = create_test_mesh();

    for name in ["auto.ply", "auto.obj"] {
        let path = dir.path().join(name);
        write_mesh(&mesh, &path).unwrap();
        let loaded = read_mesh(&path).unwrap();

        assert_eq!(loaded.vertex_count(), mesh.vertex_count());
        assert_eq!(loaded.faces, mesh.faces);
        for (a, b) in loaded.vertices.iter().zip(&mesh.vertices) {
            assert_relative_eq!(a.x, b.x);
            assert_relative_eq!(a.y, b.y);
            assert_relative_eq!(a.z, b.z);
        }
    }
}

#[test]
fn test_write_gltf_is_unsupported() {
    let dir = tempfile::tempdir().unwrap();
    let result = write_mesh(&create_test_mesh(), dir.path().join("out.glb"));
    assert!(matches!(result, Err(Error::Unsupported(_))));
}

#[test]
fn test_read_scene_single_geometry_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.ply");
    write_mesh(&create_test_mesh(), &path).unwrap();

    let scene = read_scene(&path).unwrap();
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.geometries[0].name, "single");
    assert_eq!(scene.face_count(), 2);
}

#[test]
fn test_read_mesh_flattens_gltf_scene() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_scene(dir.path(), "triple", &[0.0, 2.0, 4.0]);

    let mesh = read_mesh(&path).unwrap();
    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.face_count(), 3);
    assert_eq!(mesh.faces[2], [6, 7, 8]);
}
