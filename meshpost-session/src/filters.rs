//! Named filters applied to the current sub-mesh of a session

use crate::cleanup;
use crate::components::small_component_faces;
use crate::session_mesh::SessionMesh;
use meshpost_core::{Error, Result};
use meshpost_simplification::{decimate, DecimationParams};
use tracing::debug;

/// A filter the session engine knows how to apply.
///
/// Filters mutate the current sub-mesh in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Quadric edge collapse decimation toward a face budget
    QuadricEdgeCollapse {
        target_face_count: usize,
        params: DecimationParams,
    },
    /// Select the faces of edge-connected components smaller than
    /// `face_ratio` of the total face count
    SelectSmallComponentsPerFace { face_ratio: f64 },
    /// Derive the vertex selection from the face selection. Non-inclusive
    /// transfer selects a vertex only when all its faces are selected.
    TransferFaceToVertexSelection { inclusive: bool },
    /// Delete selected faces, faces touching a selected vertex, and the
    /// selected vertices
    RemoveSelectedVerticesAndFaces,
    RemoveDegenerateFaces,
    RemoveDuplicateFaces,
    RemoveDuplicateVertices,
    RemoveUnreferencedVertices,
    ClearSelection,
}

impl Filter {
    /// Stable filter name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Filter::QuadricEdgeCollapse { .. } => "meshing_decimation_quadric_edge_collapse",
            Filter::SelectSmallComponentsPerFace { .. } => {
                "compute_selection_by_small_disconnected_components_per_face"
            }
            Filter::TransferFaceToVertexSelection { .. } => {
                "compute_selection_transfer_face_to_vertex"
            }
            Filter::RemoveSelectedVerticesAndFaces => "meshing_remove_selected_vertices_and_faces",
            Filter::RemoveDegenerateFaces => "meshing_remove_null_faces",
            Filter::RemoveDuplicateFaces => "meshing_remove_duplicate_faces",
            Filter::RemoveDuplicateVertices => "meshing_remove_duplicate_vertices",
            Filter::RemoveUnreferencedVertices => "meshing_remove_unreferenced_vertices",
            Filter::ClearSelection => "set_selection_none",
        }
    }

    pub(crate) fn apply(&self, mesh: &mut SessionMesh) -> Result<()> {
        match self {
            Filter::QuadricEdgeCollapse {
                target_face_count,
                params,
            } => {
                if *target_face_count == 0 {
                    return Err(Error::InvalidData(
                        "Target face count must be positive".to_string(),
                    ));
                }
                if mesh.face_count() <= *target_face_count {
                    debug!(
                        faces = mesh.face_count(),
                        target_faces = target_face_count,
                        "decimation skipped"
                    );
                    return Ok(());
                }
                let decimated = decimate(mesh.mesh(), *target_face_count, params)?;
                mesh.replace_mesh(decimated);
            }
            Filter::SelectSmallComponentsPerFace { face_ratio } => {
                if !(0.0..=1.0).contains(face_ratio) {
                    return Err(Error::InvalidData(format!(
                        "Face ratio must lie in [0, 1], got {}",
                        face_ratio
                    )));
                }
                let faces = small_component_faces(mesh.mesh(), *face_ratio);
                debug!(selected = faces.len(), "small components selected");
                mesh.select_faces(faces);
            }
            Filter::TransferFaceToVertexSelection { inclusive } => {
                transfer_face_to_vertex(mesh, *inclusive);
            }
            Filter::RemoveSelectedVerticesAndFaces => {
                remove_selected(mesh);
            }
            Filter::RemoveDegenerateFaces => {
                cleanup::remove_degenerate_faces(mesh);
            }
            Filter::RemoveDuplicateFaces => {
                cleanup::remove_duplicate_faces(mesh);
            }
            Filter::RemoveDuplicateVertices => {
                cleanup::remove_duplicate_vertices(mesh);
            }
            Filter::RemoveUnreferencedVertices => {
                cleanup::remove_unreferenced_vertices(mesh);
            }
            Filter::ClearSelection => mesh.clear_selection(),
        }
        Ok(())
    }
}

fn transfer_face_to_vertex(mesh: &mut SessionMesh, inclusive: bool) {
    let vertex_count = mesh.vertex_count();
    let faces = mesh.mesh().faces.clone();
    let face_selection = mesh.face_selection().to_vec();

    let mut selected = vec![false; vertex_count];
    for (face, &is_selected) in faces.iter().zip(&face_selection) {
        if is_selected {
            for &v in face {
                selected[v] = true;
            }
        }
    }
    if !inclusive {
        for (face, &is_selected) in faces.iter().zip(&face_selection) {
            if !is_selected {
                for &v in face {
                    selected[v] = false;
                }
            }
        }
    }

    mesh.vertex_selection_mut().copy_from_slice(&selected);
}

fn remove_selected(mesh: &mut SessionMesh) {
    let vertex_selection = mesh.vertex_selection().to_vec();
    let keep_faces: Vec<bool> = mesh
        .mesh()
        .faces
        .iter()
        .zip(mesh.face_selection())
        .map(|(face, &selected)| !selected && face.iter().all(|&v| !vertex_selection[v]))
        .collect();
    let keep_vertices: Vec<bool> = vertex_selection.iter().map(|&s| !s).collect();

    let (faces_removed, vertices_removed) = mesh.retain(&keep_faces, &keep_vertices);
    debug!(faces_removed, vertices_removed, "selection removed");
}
