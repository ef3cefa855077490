//! Mesh simplification and decimation algorithms
//!
//! This crate reduces mesh complexity toward a target face count while
//! preserving important geometric features:
//! - Quadric error metric helpers
//! - Half-edge edge collapse decimation with boundary, normal and
//!   topology safeguards

pub mod quadric_error;
pub mod edge_collapse;

pub use quadric_error::*;
pub use edge_collapse::*;

use meshpost_core::{Result, TriangleMesh};

/// Simplify a mesh by reducing the number of faces/vertices
pub trait MeshSimplifier {
    /// Collapse edges until the mesh has at most `target_face_count` faces,
    /// or no further collapse is allowed.
    fn simplify(&self, mesh: &TriangleMesh, target_face_count: usize) -> Result<TriangleMesh>;
}

/// Policy knobs for quadric edge collapse decimation
#[derive(Debug, Clone, PartialEq)]
pub struct DecimationParams {
    /// Collapses producing triangles below this shape quality (0..=1) are
    /// penalized. 0 disables the penalty.
    pub quality_threshold: f64,
    /// Never move vertices that lie on an open boundary
    pub preserve_boundary: bool,
    /// Extra cost added to collapses that touch an open boundary.
    ///
    /// Only takes effect with `preserve_boundary` off: a preserved boundary
    /// rejects those collapses outright, so the weight is never charged.
    pub boundary_weight: f64,
    /// Reject collapses that flip or flatten a surviving face
    pub preserve_normal: bool,
    /// Reject collapses that would fold a closed component flat
    pub preserve_topology: bool,
    /// Drop vertices left unreferenced after decimation
    pub autoclean: bool,
    /// Stop once the cheapest collapse exceeds this error
    pub error_threshold: Option<f64>,
}

impl Default for DecimationParams {
    fn default() -> Self {
        Self {
            quality_threshold: 0.3,
            preserve_boundary: true,
            boundary_weight: 1.0,
            preserve_normal: false,
            preserve_topology: true,
            autoclean: true,
            error_threshold: None,
        }
    }
}

/// Decimate `mesh` to at most `target_face_count` faces with the given policy
pub fn decimate(
    mesh: &TriangleMesh,
    target_face_count: usize,
    params: &DecimationParams,
) -> Result<TriangleMesh> {
    EdgeCollapseSimplifier::with_params(params.clone()).simplify(mesh, target_face_count)
}
