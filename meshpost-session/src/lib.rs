//! Mesh processing sessions
//!
//! A [`MeshSet`] owns an ordered list of named sub-meshes, each carrying
//! per-face and per-vertex selection masks. Named [`Filter`]s mutate the
//! current sub-mesh in place, so operations compose by applying filters in
//! sequence.

pub mod cleanup;
pub mod components;
pub mod filters;
pub mod mesh_set;
pub mod session_mesh;

pub use filters::Filter;
pub use mesh_set::MeshSet;
pub use session_mesh::SessionMesh;

pub use meshpost_simplification::DecimationParams;
