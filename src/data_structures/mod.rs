//! Engine data structures: scene graph, drawables and surface data.
//!
//! - `scene_graph` enables hierarchical scene organization
//! - `mesh` holds indexed triangle geometry
//! - `light` contains omni, directional and spot lights
//! - `camera` contains perspective and orthographic projections
//! - `material` holds Phong materials and the table that owns them
//! - `texture` references image files and decodes them

pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
