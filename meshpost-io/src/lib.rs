//! I/O operations for meshes
//!
//! This crate reads and writes the mesh container formats the pipeline
//! accepts: PLY (ASCII and binary, also used as the interchange format),
//! OBJ, and glTF/GLB scenes.

pub mod ply;
pub mod obj;
pub mod gltf;

pub use ply::{PlyFormat, PlyReader, PlyWriteOptions, PlyWriter};
pub use obj::{ObjReader, ObjWriter};

use meshpost_core::{Error, Result, Scene, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Container formats recognized by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Ply,
    Obj,
    /// `.gltf` or `.glb`
    Gltf,
}

impl MeshFormat {
    /// Classify a path by its (case-insensitive) extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "No file extension found: {}",
                    path.display()
                ))
            })?;

        match extension.as_str() {
            "ply" => Ok(MeshFormat::Ply),
            "obj" => Ok(MeshFormat::Obj),
            "glb" | "gltf" => Ok(MeshFormat::Gltf),
            other => Err(Error::UnsupportedFormat(format!(
                "Unsupported mesh format: {}",
                other
            ))),
        }
    }

    /// Formats that store a flat list of polygons rather than a scene graph
    pub fn is_polygon_soup(&self) -> bool {
        matches!(self, MeshFormat::Ply | MeshFormat::Obj)
    }

    pub fn supports_writing(&self) -> bool {
        self.is_polygon_soup()
    }
}

/// Auto-detect format and read mesh
///
/// Scenes are flattened into one mesh by concatenating their geometries.
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Ply => PlyReader::read_mesh(path),
        MeshFormat::Obj => ObjReader::read_mesh(path),
        MeshFormat::Gltf => Ok(gltf::read_scene(path)?.into_mesh()),
    }
}

/// Auto-detect format and read a scene
///
/// Single-geometry formats yield a one-geometry scene named after the file
/// stem.
pub fn read_scene<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Gltf => gltf::read_scene(path),
        _ => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("mesh")
                .to_string();
            Ok(Scene::from_mesh(name, read_mesh(path)?))
        }
    }
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Ply => PlyWriter::write_mesh(mesh, path),
        MeshFormat::Obj => ObjWriter::write_mesh(mesh, path),
        MeshFormat::Gltf => Err(Error::Unsupported(
            "Writing glTF is not supported".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests;
