//! glTF / GLB format support
//!
//! glTF is a scene-graph transmission format: one file may hold several
//! meshes. Each glTF mesh becomes one geometry of the returned [`Scene`], with
//! all of its triangle primitives merged. Node transforms are not applied.
//!
//! Writing glTF is not supported.

use meshpost_core::{Error, Point3f, Result, Scene, TriangleMesh};
use std::path::Path;

/// Load every mesh of a glTF or GLB file as a scene
pub fn read_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();

    let (document, buffers, _images) = ::gltf::import(path).map_err(|e| match e {
        ::gltf::Error::Io(io) => Error::Io(io),
        other => Error::InvalidData(format!(
            "Failed to load glTF {}: {}",
            path.display(),
            other
        )),
    })?;

    let mut scene = Scene::new();

    for mesh in document.meshes() {
        let mut geometry = TriangleMesh::new();

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<Point3f> = match reader.read_positions() {
                Some(positions) => positions
                    .map(|p| Point3f::new(p[0], p[1], p[2]))
                    .collect(),
                None => continue,
            };

            let indices: Vec<usize> = match reader.read_indices() {
                Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
                None => (0..positions.len()).collect(),
            };

            let faces = match primitive.mode() {
                ::gltf::mesh::Mode::Triangles => indices
                    .chunks_exact(3)
                    .map(|c| [c[0], c[1], c[2]])
                    .collect(),
                ::gltf::mesh::Mode::TriangleStrip => strip_to_triangles(&indices),
                ::gltf::mesh::Mode::TriangleFan => fan_to_triangles(&indices),
                // Points and lines carry no surface
                _ => continue,
            };

            let part = TriangleMesh::from_vertices_and_faces(positions, faces);
            part.validate()?;
            geometry.append(&part);
        }

        if geometry.is_empty() {
            continue;
        }

        let name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("geometry_{}", mesh.index()));
        scene.push(name, geometry);
    }

    if scene.is_empty() {
        return Err(Error::InvalidData(format!(
            "glTF file {} contains no triangle meshes",
            path.display()
        )));
    }

    Ok(scene)
}

fn strip_to_triangles(indices: &[usize]) -> Vec<[usize; 3]> {
    (0..indices.len().saturating_sub(2))
        .map(|i| {
            if i % 2 == 0 {
                [indices[i], indices[i + 1], indices[i + 2]]
            } else {
                // Odd triangles flip to keep a consistent winding
                [indices[i], indices[i + 2], indices[i + 1]]
            }
        })
        .collect()
}

fn fan_to_triangles(indices: &[usize]) -> Vec<[usize; 3]> {
    (1..indices.len().saturating_sub(1))
        .map(|i| [indices[0], indices[i], indices[i + 1]])
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Write a `.gltf` + `.bin` pair holding one single-triangle mesh per
    /// entry of `offsets`, each shifted along x.
    pub fn write_triangle_scene(dir: &Path, stem: &str, offsets: &[f32]) -> PathBuf {
        let mut bin = Vec::new();
        let mut buffer_views = Vec::new();
        let mut accessors = Vec::new();
        let mut meshes = Vec::new();

        for (i, &dx) in offsets.iter().enumerate() {
            let positions = [[dx, 0.0, 0.0], [dx + 1.0, 0.0, 0.0], [dx, 1.0, 0.0]];
            let pos_offset = bin.len();
            for p in &positions {
                for c in p {
                    bin.extend_from_slice(&c.to_le_bytes());
                }
            }
            let idx_offset = bin.len();
            for idx in [0u32, 1, 2] {
                bin.extend_from_slice(&idx.to_le_bytes());
            }

            buffer_views.push(format!(
                r#"{{"buffer":0,"byteOffset":{},"byteLength":36}}"#,
                pos_offset
            ));
            buffer_views.push(format!(
                r#"{{"buffer":0,"byteOffset":{},"byteLength":12}}"#,
                idx_offset
            ));
            accessors.push(format!(
                r#"{{"bufferView":{},"componentType":5126,"count":3,"type":"VEC3","min":[{},0,0],"max":[{},1,0]}}"#,
                2 * i,
                dx,
                dx + 1.0
            ));
            accessors.push(format!(
                r#"{{"bufferView":{},"componentType":5125,"count":3,"type":"SCALAR"}}"#,
                2 * i + 1
            ));
            meshes.push(format!(
                r#"{{"name":"part_{}","primitives":[{{"attributes":{{"POSITION":{}}},"indices":{}}}]}}"#,
                i,
                2 * i,
                2 * i + 1
            ));
        }

        let bin_name = format!("{}.bin", stem);
        fs::write(dir.join(&bin_name), &bin).unwrap();

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"buffers":[{{"uri":"{}","byteLength":{}}}],"bufferViews":[{}],"accessors":[{}],"meshes":[{}]}}"#,
            bin_name,
            bin.len(),
            buffer_views.join(","),
            accessors.join(","),
            meshes.join(",")
        );
        let path = dir.join(format!("{}.gltf", stem));
        fs::write(&path, json).unwrap();
        path
    }
}
