//! Engine operations applied to a session
//!
//! Each operation consumes the session, runs one or more named filters on
//! its current mesh and returns it.

use crate::artifact::InterchangeArtifact;
use crate::config::PostprocessConfig;
use crate::error::{PostprocessError, Result};
use meshpost_session::{DecimationParams, Filter, MeshSet};
use tracing::{debug, info};

/// Face budget used by [`reduce_face`] callers that do not pick one
pub const DEFAULT_MAX_FACE_COUNT: usize = 200_000;

/// Components with fewer faces than this fraction of the mesh are floaters
pub const FLOATER_FACE_RATIO: f64 = 0.005;

/// Decimation policy for face reduction.
///
/// Boundaries are preserved, so `boundary_weight` is only charged if a
/// caller turns `preserve_boundary` off on the returned params.
pub fn reduce_face_params() -> DecimationParams {
    DecimationParams {
        quality_threshold: 1.0,
        preserve_boundary: true,
        boundary_weight: 3.0,
        preserve_normal: true,
        preserve_topology: true,
        autoclean: true,
        error_threshold: None,
    }
}

fn apply(session: &mut MeshSet, filter: Filter) -> Result<()> {
    let step = filter.name();
    session
        .apply_filter(filter)
        .map_err(|e| PostprocessError::operation(step, e))
}

/// Decimate the current mesh to at most `max_face_count` faces
pub fn reduce_face(mut session: MeshSet, max_face_count: usize) -> Result<MeshSet> {
    if max_face_count == 0 {
        return Err(PostprocessError::invalid_parameter(
            "reduce_face",
            "max_face_count must be positive",
        ));
    }

    apply(
        &mut session,
        Filter::QuadricEdgeCollapse {
            target_face_count: max_face_count,
            params: reduce_face_params(),
        },
    )?;
    Ok(session)
}

/// Delete small disconnected components and their vertices
pub fn remove_floater(mut session: MeshSet) -> Result<MeshSet> {
    apply(
        &mut session,
        Filter::SelectSmallComponentsPerFace {
            face_ratio: FLOATER_FACE_RATIO,
        },
    )?;
    apply(
        &mut session,
        Filter::TransferFaceToVertexSelection { inclusive: false },
    )?;
    apply(&mut session, Filter::RemoveSelectedVerticesAndFaces)?;
    Ok(session)
}

/// Clean the current mesh by saving it and reloading it into a fresh session
/// with load cleanup enabled.
///
/// The artifact used here is separate from the adapter's and is removed
/// whether or not the reload succeeds.
pub fn remove_degenerate_faces(session: MeshSet, config: &PostprocessConfig) -> Result<MeshSet> {
    const STEP: &str = "remove_degenerate_faces";
    let artifact = InterchangeArtifact::create(config, STEP)?;

    session
        .save_current_mesh_with_options(artifact.path(), &config.artifact_options())
        .map_err(|e| PostprocessError::conversion(STEP, e))?;

    let mut reloaded = MeshSet::new().with_load_cleanup(true);
    reloaded
        .load_new_mesh(artifact.path())
        .map_err(|e| PostprocessError::conversion(STEP, e))?;

    if let (Some(before), Some(after)) = (session.current_mesh(), reloaded.current_mesh()) {
        let removed = before.face_count().saturating_sub(after.face_count());
        if removed > 0 {
            info!(faces_removed = removed, "degenerate faces removed");
        } else {
            debug!("no degenerate faces found");
        }
    }
    Ok(reloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshpost_core::{Point3f, TriangleMesh};
    use std::fs;

    fn session_with(mesh: TriangleMesh) -> MeshSet {
        let mut session = MeshSet::new();
        session.add_mesh(mesh, "mesh");
        session
    }

    fn fan(center: Point3f, count: usize) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let c = mesh.add_vertex(center);
        let ring: Vec<usize> = (0..=count)
            .map(|i| {
                let a = i as f32 / count as f32 * std::f32::consts::PI;
                mesh.add_vertex(Point3f::new(center.x + a.cos(), center.y + a.sin(), center.z))
            })
            .collect();
        for pair in ring.windows(2) {
            mesh.add_face([c, pair[0], pair[1]]);
        }
        mesh
    }

    #[test]
    fn test_reduce_face_rejects_zero() {
        let err = reduce_face(session_with(fan(Point3f::origin(), 4)), 0).unwrap_err();
        assert!(matches!(
            err,
            PostprocessError::Operation { step: "reduce_face", source: None, .. }
        ));
    }

    #[test]
    fn test_reduce_face_under_budget_is_noop() {
        let mesh = fan(Point3f::origin(), 4);
        let session = reduce_face(session_with(mesh.clone()), 100).unwrap();
        assert_eq!(session.current_mesh().unwrap().to_triangle_mesh(), mesh);
    }

    #[test]
    fn test_reduce_face_on_empty_session() {
        let err = reduce_face(MeshSet::new(), 10).unwrap_err();
        assert_eq!(err.step(), Some("meshing_decimation_quadric_edge_collapse"));
    }

    #[test]
    fn test_remove_floater_keeps_large_component() {
        let mut mesh = fan(Point3f::origin(), 300);
        mesh.append(&fan(Point3f::new(10.0, 0.0, 0.0), 1));

        let session = remove_floater(session_with(mesh)).unwrap();
        let current = session.current_mesh().unwrap();
        assert_eq!(current.face_count(), 300);
        assert_eq!(current.vertex_count(), 302);
    }

    #[test]
    fn test_remove_degenerate_faces() {
        let root = tempfile::tempdir().unwrap();
        let config = PostprocessConfig::new().with_temp_dir(root.path());

        let mut mesh = fan(Point3f::origin(), 4);
        mesh.add_face([0, 0, 1]);
        mesh.add_face([1, 2, 0]);

        let session = remove_degenerate_faces(session_with(mesh), &config).unwrap();
        assert_eq!(session.current_mesh().unwrap().face_count(), 4);
        assert!(session.load_cleanup());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_remove_degenerate_faces_cleans_up_on_failure() {
        let root = tempfile::tempdir().unwrap();
        let config = PostprocessConfig::new().with_temp_dir(root.path());

        let err = remove_degenerate_faces(MeshSet::new(), &config).unwrap_err();
        assert!(matches!(
            err,
            PostprocessError::Conversion { step: "remove_degenerate_faces", .. }
        ));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
