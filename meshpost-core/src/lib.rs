//! Core data structures for meshpost
//! 
//! This crate provides the value-mesh type shared by every stage of the
//! post-processing pipeline, the scene aggregate produced by multi-geometry
//! containers, and the common error type.

pub mod point;
pub mod mesh;
pub mod scene;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use scene::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
