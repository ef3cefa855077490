#![allow(dead_code)]

use meshpost_core::{Point3f, TriangleMesh};
use meshpost_postprocess::{MeshSet, PostprocessConfig};
use std::fs;
use std::path::Path;

/// Two single-triangle meshes (`part_0`, `part_1`), the second shifted by 10
/// along x, with the buffer embedded as a data URI
pub const TWO_PART_GLTF: &str = r#"{"asset":{"version":"2.0"},"buffers":[{"uri":"data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAEAAAACAAAAAAAgQQAAAAAAAAAAAAAwQQAAAAAAAAAAAAAgQQAAgD8AAAAAAAAAAAEAAAACAAAA","byteLength":96}],"bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":12},{"buffer":0,"byteOffset":48,"byteLength":36},{"buffer":0,"byteOffset":84,"byteLength":12}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0,0],"max":[1.0,1,0]},{"bufferView":1,"componentType":5125,"count":3,"type":"SCALAR"},{"bufferView":2,"componentType":5126,"count":3,"type":"VEC3","min":[10.0,0,0],"max":[11.0,1,0]},{"bufferView":3,"componentType":5125,"count":3,"type":"SCALAR"}],"meshes":[{"name":"part_0","primitives":[{"attributes":{"POSITION":0},"indices":1}]},{"name":"part_1","primitives":[{"attributes":{"POSITION":2},"indices":3}]}]}"#;

pub fn config_in(dir: &Path) -> PostprocessConfig {
    PostprocessConfig::new().with_temp_dir(dir.join("scratch"))
}

/// Entries left in the configured temp directory (0 if it was never created)
pub fn leftover_artifacts(config: &PostprocessConfig) -> usize {
    fs::read_dir(&config.temp_dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

pub fn session_of(mesh: TriangleMesh) -> MeshSet {
    let mut session = MeshSet::new();
    session.add_mesh(mesh, "input");
    session
}

/// Closed, consistently wound unit cube: 8 vertices, 12 faces
pub fn cube() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, 1.0),
            Point3f::new(1.0, 1.0, 1.0),
            Point3f::new(0.0, 1.0, 1.0),
        ],
        vec![
            [0, 2, 1], [0, 3, 2],
            [4, 5, 6], [4, 6, 7],
            [0, 1, 5], [0, 5, 4],
            [1, 2, 6], [1, 6, 5],
            [2, 3, 7], [2, 7, 6],
            [3, 0, 4], [3, 4, 7],
        ],
    )
}

/// Height-field grid with `(nx - 1) * (ny - 1) * 2` faces, all connected
pub fn wavy_grid(nx: usize, ny: usize) -> TriangleMesh {
    let mut vertices = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        for x in 0..nx {
            let fx = x as f32 / (nx - 1) as f32 * std::f32::consts::PI;
            let fy = y as f32 / (ny - 1) as f32 * std::f32::consts::PI;
            vertices.push(Point3f::new(
                x as f32 * 0.1,
                y as f32 * 0.1,
                (fx.sin() * fy.sin()) * 0.5,
            ));
        }
    }
    let mut faces = Vec::with_capacity((nx - 1) * (ny - 1) * 2);
    for y in 0..(ny - 1) {
        for x in 0..(nx - 1) {
            let tl = y * nx + x;
            let tr = tl + 1;
            let bl = (y + 1) * nx + x;
            let br = bl + 1;
            faces.push([tl, bl, tr]);
            faces.push([tr, bl, br]);
        }
    }
    TriangleMesh::from_vertices_and_faces(vertices, faces)
}

/// One connected 1000-face surface
pub fn blob() -> TriangleMesh {
    wavy_grid(26, 21)
}

/// Three edge-connected triangles far away from the blob
pub fn island() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(50.0, 50.0, 50.0),
            Point3f::new(51.0, 50.0, 50.0),
            Point3f::new(51.0, 51.0, 50.0),
            Point3f::new(50.0, 51.0, 50.0),
            Point3f::new(49.0, 51.0, 50.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]],
    )
}

pub fn blob_with_island() -> TriangleMesh {
    let mut mesh = blob();
    mesh.append(&island());
    mesh
}
