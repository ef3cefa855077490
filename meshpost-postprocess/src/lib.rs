//! Post-processing for generated meshes
//!
//! Three operators clean up a freshly generated surface before it is handed
//! downstream:
//! - [`FaceReducer`] decimates to a face budget
//! - [`FloaterRemover`] deletes small disconnected fragments
//! - [`DegenerateFaceRemover`] drops degenerate and duplicate geometry
//!
//! Operators accept a mesh file path, a value-mesh or an open session
//! ([`MeshRef`]) and return the same shape class. Value-meshes travel into
//! the session engine through temporary PLY artifacts that are always
//! deleted before the call returns.
//!
//! ```no_run
//! use meshpost_postprocess::{MeshRef, Pipeline, PostprocessConfig};
//! use std::path::PathBuf;
//!
//! let pipeline = Pipeline::standard(PostprocessConfig::from_env());
//! let _cleaned = pipeline.run(MeshRef::Path(PathBuf::from("generated.glb")))?;
//! # Ok::<(), meshpost_postprocess::PostprocessError>(())
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod interchange;
pub mod operations;
pub mod postprocessors;

pub use artifact::InterchangeArtifact;
pub use config::{PostprocessConfig, ValueExport, TEMP_DIR_ENV};
pub use error::{PostprocessError, Result};
pub use interchange::{Imported, InputShape, InterchangeAdapter, MeshRef};
pub use operations::{
    reduce_face, reduce_face_params, remove_degenerate_faces, remove_floater,
    DEFAULT_MAX_FACE_COUNT, FLOATER_FACE_RATIO,
};
pub use postprocessors::{
    DegenerateFaceRemover, FaceReducer, FloaterRemover, MeshPostprocessor, Pipeline,
    DEFAULT_REDUCER_FACE_COUNT,
};

pub use meshpost_core::TriangleMesh;
pub use meshpost_io::PlyFormat;
pub use meshpost_session::MeshSet;
