//! Conversion between caller meshes and processing sessions
//!
//! Value-meshes enter a session through a temporary PLY artifact; mesh files
//! with a polygon-soup format are loaded directly, and scene files are
//! flattened first. On the way back the caller receives the same shape class
//! it handed in.

use crate::artifact::InterchangeArtifact;
use crate::config::{PostprocessConfig, ValueExport};
use crate::error::{PostprocessError, Result};
use meshpost_core::{Error, TriangleMesh};
use meshpost_io::{MeshFormat, PlyWriter};
use meshpost_session::MeshSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A mesh in any of the forms the pipeline accepts
#[derive(Debug, Clone)]
pub enum MeshRef {
    /// A mesh file on disk (`ply`, `obj`, `glb`, `gltf`)
    Path(PathBuf),
    /// A plain value-mesh
    Value(TriangleMesh),
    /// An already-open processing session
    Session(MeshSet),
}

impl MeshRef {
    pub fn kind(&self) -> &'static str {
        match self {
            MeshRef::Path(_) => "path",
            MeshRef::Value(_) => "value",
            MeshRef::Session(_) => "session",
        }
    }

    /// Face count of in-memory meshes. Paths are not opened.
    pub fn face_count(&self) -> Option<usize> {
        match self {
            MeshRef::Path(_) => None,
            MeshRef::Value(mesh) => Some(mesh.face_count()),
            MeshRef::Session(session) => session.current_mesh().map(|m| m.face_count()),
        }
    }

    pub fn as_value(&self) -> Option<&TriangleMesh> {
        match self {
            MeshRef::Value(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<TriangleMesh> {
        match self {
            MeshRef::Value(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn into_session(self) -> Option<MeshSet> {
        match self {
            MeshRef::Session(session) => Some(session),
            _ => None,
        }
    }
}

impl From<TriangleMesh> for MeshRef {
    fn from(mesh: TriangleMesh) -> Self {
        MeshRef::Value(mesh)
    }
}

impl From<MeshSet> for MeshRef {
    fn from(session: MeshSet) -> Self {
        MeshRef::Session(session)
    }
}

impl From<PathBuf> for MeshRef {
    fn from(path: PathBuf) -> Self {
        MeshRef::Path(path)
    }
}

impl From<&Path> for MeshRef {
    fn from(path: &Path) -> Self {
        MeshRef::Path(path.to_path_buf())
    }
}

/// What [`InterchangeAdapter::to_value_mesh`] needs to remember about the
/// original input
#[derive(Debug, Clone)]
pub enum InputShape {
    Path(PathBuf),
    Value(TriangleMesh),
    Session,
}

/// A caller mesh loaded into a session
#[derive(Debug)]
pub struct Imported {
    pub session: MeshSet,
    pub shape: InputShape,
}

/// Moves meshes between caller form and session form through interchange
/// artifacts in the configured temp directory
#[derive(Debug, Clone, Default)]
pub struct InterchangeAdapter {
    config: PostprocessConfig,
}

impl InterchangeAdapter {
    pub fn new(config: PostprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PostprocessConfig {
        &self.config
    }

    /// Load any accepted input into a session
    pub fn to_session_mesh(&self, input: MeshRef) -> Result<Imported> {
        match input {
            MeshRef::Path(path) => {
                let session = self.load_path(&path)?;
                Ok(Imported {
                    session,
                    shape: InputShape::Path(path),
                })
            }
            MeshRef::Value(mesh) => {
                let session = self.value_to_session(&mesh)?;
                Ok(Imported {
                    session,
                    shape: InputShape::Value(mesh),
                })
            }
            MeshRef::Session(session) => Ok(Imported {
                session,
                shape: InputShape::Session,
            }),
        }
    }

    /// Hand a processed session back in the shape class of the original input
    pub fn to_value_mesh(&self, shape: InputShape, session: MeshSet) -> Result<MeshRef> {
        match shape {
            InputShape::Session => Ok(MeshRef::Session(session)),
            InputShape::Value(original) => match self.config.value_export {
                ValueExport::PassThrough => Ok(MeshRef::Value(original)),
                ValueExport::Extract => {
                    let current = session.current_mesh().ok_or_else(|| {
                        PostprocessError::conversion(
                            "extract_value",
                            Error::InvalidData("Session has no current mesh".to_string()),
                        )
                    })?;
                    Ok(MeshRef::Value(current.to_triangle_mesh()))
                }
            },
            InputShape::Path(_) => Ok(MeshRef::Value(self.session_to_value(&session)?)),
        }
    }

    fn load_path(&self, path: &Path) -> Result<MeshSet> {
        let load_error = |source| PostprocessError::Load {
            path: path.to_path_buf(),
            source,
        };

        let format = MeshFormat::from_path(path).map_err(load_error)?;
        if format.is_polygon_soup() {
            let mut session = MeshSet::new();
            session.load_new_mesh(path).map_err(load_error)?;
            debug!(path = %path.display(), "loaded mesh file directly");
            return Ok(session);
        }

        let scene = meshpost_io::read_scene(path).map_err(load_error)?;
        debug!(
            path = %path.display(),
            geometries = scene.len(),
            "flattening scene"
        );
        self.value_to_session(&scene.concatenate())
    }

    fn value_to_session(&self, mesh: &TriangleMesh) -> Result<MeshSet> {
        const STEP: &str = "value_to_session";
        let artifact = InterchangeArtifact::create(&self.config, STEP)?;

        PlyWriter::write_mesh_with_options(mesh, artifact.path(), &self.config.artifact_options())
            .map_err(|e| PostprocessError::conversion(STEP, e))?;

        let mut session = MeshSet::new();
        session
            .load_new_mesh(artifact.path())
            .map_err(|e| PostprocessError::conversion(STEP, e))?;
        Ok(session)
    }

    fn session_to_value(&self, session: &MeshSet) -> Result<TriangleMesh> {
        const STEP: &str = "session_to_value";
        let artifact = InterchangeArtifact::create(&self.config, STEP)?;

        session
            .save_current_mesh_with_options(artifact.path(), &self.config.artifact_options())
            .map_err(|e| PostprocessError::conversion(STEP, e))?;

        let scene = meshpost_io::read_scene(artifact.path())
            .map_err(|e| PostprocessError::conversion(STEP, e))?;
        Ok(scene.concatenate())
    }
}
