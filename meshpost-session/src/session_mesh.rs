//! A named sub-mesh of a session with selection state

use meshpost_core::TriangleMesh;
use nalgebra::DMatrix;

/// One sub-mesh of a [`MeshSet`](crate::MeshSet).
///
/// Selection masks always have one entry per face and per vertex; every
/// topology change goes through [`SessionMesh::retain`] so they stay in step
/// with the geometry.
#[derive(Debug, Clone)]
pub struct SessionMesh {
    name: String,
    mesh: TriangleMesh,
    face_selection: Vec<bool>,
    vertex_selection: Vec<bool>,
}

impl SessionMesh {
    pub fn new<S: Into<String>>(name: S, mesh: TriangleMesh) -> Self {
        let face_selection = vec![false; mesh.face_count()];
        let vertex_selection = vec![false; mesh.vertex_count()];
        Self {
            name: name.into(),
            mesh,
            face_selection,
            vertex_selection,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn face_count(&self) -> usize {
        self.mesh.face_count()
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// `V × 3` matrix of vertex positions
    pub fn vertex_matrix(&self) -> DMatrix<f32> {
        let vertices = &self.mesh.vertices;
        DMatrix::from_fn(vertices.len(), 3, |r, c| vertices[r].coords[c])
    }

    /// `F × 3` matrix of vertex indices
    pub fn face_matrix(&self) -> DMatrix<usize> {
        let faces = &self.mesh.faces;
        DMatrix::from_fn(faces.len(), 3, |r, c| faces[r][c])
    }

    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        self.mesh.clone()
    }

    pub fn face_selection(&self) -> &[bool] {
        &self.face_selection
    }

    pub fn vertex_selection(&self) -> &[bool] {
        &self.vertex_selection
    }

    pub fn selected_face_count(&self) -> usize {
        self.face_selection.iter().filter(|&&s| s).count()
    }

    pub fn selected_vertex_count(&self) -> usize {
        self.vertex_selection.iter().filter(|&&s| s).count()
    }

    /// Add the given faces to the face selection. Out-of-range indices are
    /// ignored.
    pub fn select_faces<I: IntoIterator<Item = usize>>(&mut self, faces: I) {
        for f in faces {
            if let Some(slot) = self.face_selection.get_mut(f) {
                *slot = true;
            }
        }
    }

    /// Add the given vertices to the vertex selection. Out-of-range indices
    /// are ignored.
    pub fn select_vertices<I: IntoIterator<Item = usize>>(&mut self, vertices: I) {
        for v in vertices {
            if let Some(slot) = self.vertex_selection.get_mut(v) {
                *slot = true;
            }
        }
    }

    pub(crate) fn vertex_selection_mut(&mut self) -> &mut [bool] {
        &mut self.vertex_selection
    }

    pub fn clear_selection(&mut self) {
        self.face_selection.iter_mut().for_each(|s| *s = false);
        self.vertex_selection.iter_mut().for_each(|s| *s = false);
    }

    /// Replace the geometry wholesale, resetting the selection
    pub fn replace_mesh(&mut self, mesh: TriangleMesh) {
        self.face_selection = vec![false; mesh.face_count()];
        self.vertex_selection = vec![false; mesh.vertex_count()];
        self.mesh = mesh;
    }

    /// Keep only the faces and vertices whose mask entry is `true`, then
    /// compact. Faces referencing a dropped vertex are dropped too.
    ///
    /// Returns `(faces_removed, vertices_removed)`.
    pub fn retain(&mut self, keep_faces: &[bool], keep_vertices: &[bool]) -> (usize, usize) {
        let vertex_count = self.mesh.vertex_count();
        let face_count = self.mesh.face_count();

        let mut remap = vec![usize::MAX; vertex_count];
        let mut next = 0usize;
        for (v, slot) in remap.iter_mut().enumerate() {
            if keep_vertices.get(v).copied().unwrap_or(false) {
                *slot = next;
                next += 1;
            }
        }

        let mut faces = Vec::with_capacity(face_count);
        let mut face_selection = Vec::with_capacity(face_count);
        for (fi, face) in self.mesh.faces.iter().enumerate() {
            if !keep_faces.get(fi).copied().unwrap_or(false) {
                continue;
            }
            let mapped = face.map(|v| remap[v]);
            if mapped.contains(&usize::MAX) {
                continue;
            }
            faces.push(mapped);
            face_selection.push(self.face_selection[fi]);
        }

        let keep = |v: &usize| remap[*v] != usize::MAX;
        let indices: Vec<usize> = (0..vertex_count).filter(keep).collect();

        let vertices = indices.iter().map(|&v| self.mesh.vertices[v]).collect();
        let normals = self
            .mesh
            .normals
            .as_ref()
            .map(|n| indices.iter().map(|&v| n[v]).collect());
        let colors = self
            .mesh
            .colors
            .as_ref()
            .map(|c| indices.iter().map(|&v| c[v]).collect());
        let vertex_selection = indices.iter().map(|&v| self.vertex_selection[v]).collect();

        let faces_removed = face_count - faces.len();
        let vertices_removed = vertex_count - indices.len();

        self.mesh = TriangleMesh {
            vertices,
            faces,
            normals,
            colors,
        };
        self.face_selection = face_selection;
        self.vertex_selection = vertex_selection;

        (faces_removed, vertices_removed)
    }

    /// Rewrite face indices through `remap` without touching the vertex list
    pub(crate) fn remap_faces(&mut self, remap: &[usize]) {
        for face in &mut self.mesh.faces {
            *face = face.map(|v| remap[v]);
        }
    }
}
