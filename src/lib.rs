//! ovo-scene
//!
//! A small retained-mode scene engine for the OVO binary scene format. It
//! loads a node hierarchy with meshes, lights and materials from an OVO file
//! and renders it through an immediate-mode [`render::Driver`], lights first
//! and transparent meshes last.
//!
//! High-level modules
//! - `config`: engine settings loadable from TOML
//! - `context`: loads scenes and drives one frame at a time
//! - `data_structures`: scene graph, meshes, lights, cameras, materials, textures
//! - `object`: id and name shared by every scene entity
//! - `render`: render list ordering and the driver trait
//! - `resources`: OVO chunk reader and vertex packings
//! - `scene`: a loaded scene with its material table
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod object;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
