//! Scene aggregate for multi-geometry containers

use crate::mesh::TriangleMesh;
use serde::{Deserialize, Serialize};

/// A named geometry inside a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGeometry {
    pub name: String,
    pub mesh: TriangleMesh,
}

/// An ordered collection of disjoint geometries loaded from one container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub geometries: Vec<SceneGeometry>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a single mesh as a one-geometry scene
    pub fn from_mesh<S: Into<String>>(name: S, mesh: TriangleMesh) -> Self {
        Self {
            geometries: vec![SceneGeometry {
                name: name.into(),
                mesh,
            }],
        }
    }

    /// Add a geometry at the end of the scene
    pub fn push<S: Into<String>>(&mut self, name: S, mesh: TriangleMesh) {
        self.geometries.push(SceneGeometry {
            name: name.into(),
            mesh,
        });
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Total faces across all geometries
    pub fn face_count(&self) -> usize {
        self.geometries.iter().map(|g| g.mesh.face_count()).sum()
    }

    /// Total vertices across all geometries
    pub fn vertex_count(&self) -> usize {
        self.geometries.iter().map(|g| g.mesh.vertex_count()).sum()
    }

    /// Flatten into one mesh by sequential concatenation in geometry order.
    ///
    /// Vertices are not deduplicated across geometries.
    pub fn concatenate(&self) -> TriangleMesh {
        let mut combined = TriangleMesh::new();
        for geometry in &self.geometries {
            combined.append(&geometry.mesh);
        }
        combined
    }

    /// Consume the scene, avoiding a copy when it holds a single geometry
    pub fn into_mesh(mut self) -> TriangleMesh {
        if self.geometries.len() == 1 {
            if let Some(only) = self.geometries.pop() {
                return only.mesh;
            }
        }
        self.concatenate()
    }
}
