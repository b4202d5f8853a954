//! Scene representation: decoded model data, materials, GPU textures and
//! the displayed scene graph.
//!
//! - `data` holds the CPU-side model tree and vertex/transform types
//! - `material` holds surface materials and the display-normalization pass
//! - `texture` wraps GPU textures and channel uploads
//! - `graph` holds the scene root and GPU-resident model nodes

pub mod data;
pub mod graph;
pub mod material;
pub mod texture;
