//! This module contains all logic for loading scenes from external files.

pub mod chunk;
pub mod ovo;
pub mod packing;

pub use ovo::{OvoError, load_scene, parse_scene};
