//! Mesh sessions holding named sub-meshes

use crate::cleanup;
use crate::filters::Filter;
use crate::session_mesh::SessionMesh;
use meshpost_core::{Error, Result, TriangleMesh};
use meshpost_io::{MeshFormat, MeshWriter, ObjWriter, PlyWriteOptions, PlyWriter};
use std::path::Path;
use tracing::{debug, info};

/// A processing session: an ordered list of named sub-meshes with a cursor
/// on the current one.
///
/// Loading and adding meshes moves the cursor to the newest sub-mesh.
/// Filters and saving act on the current sub-mesh only.
#[derive(Debug, Clone, Default)]
pub struct MeshSet {
    meshes: Vec<SessionMesh>,
    current: Option<usize>,
    load_cleanup: bool,
}

impl MeshSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clean every loaded sub-mesh (duplicate vertices, degenerate and
    /// duplicate faces, unreferenced vertices) before adding it.
    ///
    /// Off by default, so loading preserves element counts exactly.
    pub fn with_load_cleanup(mut self, enabled: bool) -> Self {
        self.load_cleanup = enabled;
        self
    }

    pub fn load_cleanup(&self) -> bool {
        self.load_cleanup
    }

    /// Add a mesh as a new sub-mesh and make it current.
    ///
    /// Returns its index.
    pub fn add_mesh<S: Into<String>>(&mut self, mesh: TriangleMesh, name: S) -> usize {
        let index = self.meshes.len();
        self.meshes.push(SessionMesh::new(name, mesh));
        self.current = Some(index);
        index
    }

    /// Load every geometry of a mesh file as a new sub-mesh.
    ///
    /// PLY and OBJ files yield one sub-mesh; glTF/GLB files one per scene
    /// geometry. The last loaded sub-mesh becomes current.
    pub fn load_new_mesh<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let scene = meshpost_io::read_scene(path)?;

        for geometry in scene.geometries {
            let mut mesh = SessionMesh::new(geometry.name, geometry.mesh);
            if self.load_cleanup {
                let summary = cleanup::clean(&mut mesh);
                if summary.had_changes() {
                    debug!(
                        mesh = mesh.name(),
                        duplicate_vertices = summary.duplicate_vertices,
                        degenerate_faces = summary.degenerate_faces,
                        duplicate_faces = summary.duplicate_faces,
                        unreferenced_vertices = summary.unreferenced_vertices,
                        "load cleanup"
                    );
                }
            }
            self.meshes.push(mesh);
            self.current = Some(self.meshes.len() - 1);
        }

        debug!(path = %path.display(), meshes = self.meshes.len(), "mesh loaded");
        Ok(())
    }

    /// Save the current sub-mesh, choosing the format by extension.
    ///
    /// PLY is written as binary little-endian.
    pub fn save_current_mesh<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_current_mesh_with_options(path, &PlyWriteOptions::binary_little_endian())
    }

    /// Save the current sub-mesh with explicit PLY options. Non-PLY formats
    /// ignore `ply_options`.
    pub fn save_current_mesh_with_options<P: AsRef<Path>>(
        &self,
        path: P,
        ply_options: &PlyWriteOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let mesh = self.require_current()?.mesh();

        match MeshFormat::from_path(path)? {
            MeshFormat::Ply => PlyWriter::write_mesh_with_options(mesh, path, ply_options),
            MeshFormat::Obj => ObjWriter::write_mesh(mesh, path),
            MeshFormat::Gltf => Err(Error::Unsupported(
                "Saving glTF is not supported".to_string(),
            )),
        }
    }

    pub fn current_mesh(&self) -> Option<&SessionMesh> {
        self.current.and_then(|i| self.meshes.get(i))
    }

    pub fn current_mesh_mut(&mut self) -> Option<&mut SessionMesh> {
        match self.current {
            Some(i) => self.meshes.get_mut(i),
            None => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn set_current_mesh(&mut self, index: usize) -> Result<()> {
        if index >= self.meshes.len() {
            return Err(Error::InvalidData(format!(
                "Mesh index {} out of range for session with {} meshes",
                index,
                self.meshes.len()
            )));
        }
        self.current = Some(index);
        Ok(())
    }

    pub fn mesh(&self, index: usize) -> Option<&SessionMesh> {
        self.meshes.get(index)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn mesh_names(&self) -> Vec<&str> {
        self.meshes.iter().map(SessionMesh::name).collect()
    }

    /// Apply a filter to the current sub-mesh
    pub fn apply_filter(&mut self, filter: Filter) -> Result<()> {
        let name = filter.name();
        let mesh = match self.current {
            Some(i) => self.meshes.get_mut(i),
            None => None,
        }
        .ok_or_else(|| {
            Error::InvalidData(format!("Cannot apply {}: session has no current mesh", name))
        })?;

        let faces_before = mesh.face_count();
        let vertices_before = mesh.vertex_count();
        filter.apply(mesh)?;

        info!(
            filter = name,
            faces_before,
            faces_after = mesh.face_count(),
            vertices_before,
            vertices_after = mesh.vertex_count(),
            "filter applied"
        );
        Ok(())
    }

    fn require_current(&self) -> Result<&SessionMesh> {
        self.current_mesh()
            .ok_or_else(|| Error::InvalidData("Session has no current mesh".to_string()))
    }
}
