//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A triangle mesh with vertices and faces
///
/// This is the plain value-mesh handed between pipeline stages: vertex
/// positions plus triangle index triples, with optional per-vertex normals
/// and colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.normals = None;
        self.colors = None;
    }

    /// Check that every face index refers to an existing vertex and that
    /// attribute arrays match the vertex count.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&idx| idx >= vertex_count) {
                return Err(Error::InvalidData(format!(
                    "Face {} references vertex {} but mesh has {} vertices",
                    fi, bad, vertex_count
                )));
            }
        }
        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(Error::InvalidData(format!(
                    "Normal count {} does not match vertex count {}",
                    normals.len(),
                    vertex_count
                )));
            }
        }
        if let Some(colors) = &self.colors {
            if colors.len() != vertex_count {
                return Err(Error::InvalidData(format!(
                    "Color count {} does not match vertex count {}",
                    colors.len(),
                    vertex_count
                )));
            }
        }
        Ok(())
    }

    /// Append another mesh, offsetting its face indices past the current
    /// vertices. Shared positions are not merged.
    ///
    /// Per-vertex attributes survive only when both meshes carry them (or
    /// this mesh has no vertices yet).
    pub fn append(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len();
        let was_empty = offset == 0;

        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if was_empty => Some(theirs.clone()),
            _ => None,
        };
        self.colors = match (self.colors.take(), &other.colors) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if was_empty => Some(theirs.clone()),
            _ => None,
        };

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Axis-aligned bounding box as `(min, max)`
    pub fn bounding_box(&self) -> (Point3f, Point3f) {
        if self.vertices.is_empty() {
            return (Point3f::origin(), Point3f::origin());
        }

        let mut min = self.vertices[0];
        let mut max = self.vertices[0];

        for vertex in &self.vertices {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }

    /// Number of faces sharing each undirected edge
    pub fn edge_face_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::with_capacity(self.faces.len() * 3 / 2);
        for face in &self.faces {
            for j in 0..3 {
                let a = face[j];
                let b = face[(j + 1) % 3];
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// A mesh is watertight when every edge is shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        !self.faces.is_empty() && self.edge_face_counts().values().all(|&c| c == 2)
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
