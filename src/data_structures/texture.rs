//! Texture references and image decoding.
//!
//! A [`Texture`] names an image file on disk. Pixels are decoded on demand
//! with the `image` crate and handed to a [`Driver`](crate::render::Driver),
//! which returns an opaque [`TextureHandle`] for later binds.

use std::path::{Path, PathBuf};

use anyhow::*;
use image::{ImageFormat, RgbaImage};

use crate::object::Object;

/// Opaque id of an uploaded texture. Only the driver that produced it knows
/// what it refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Image file reference owned by exactly one material.
#[derive(Debug)]
pub struct Texture {
    object: Object,
    file_path: PathBuf,
    handle: Option<TextureHandle>,
}

impl Texture {
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            object: Object::new(name),
            file_path: file_path.into(),
            handle: None,
        }
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// `None` until [`Scene::upload_textures`](crate::scene::Scene::upload_textures) succeeded for this texture.
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    pub fn set_handle(&mut self, handle: TextureHandle) {
        self.handle = Some(handle);
    }

    /// Decode the referenced file into 8-bit RGBA pixels.
    ///
    /// The format is taken from the file extension when it is known and
    /// guessed from the contents otherwise.
    pub fn load_image(&self) -> Result<RgbaImage> {
        let bytes = std::fs::read(&self.file_path)
            .with_context(|| format!("reading texture {}", self.file_path.display()))?;
        Self::decode(&bytes, ImageFormat::from_path(&self.file_path).ok())
    }

    pub fn decode(bytes: &[u8], format: Option<ImageFormat>) -> Result<RgbaImage> {
        let img = match format {
            None => image::load_from_memory(bytes)?,
            Some(fmt) => image::load_from_memory_with_format(bytes, fmt)?,
        };
        Ok(img.to_rgba8())
    }
}
