//! Surface materials and the table that owns them.

use std::collections::HashMap;

use cgmath::{Vector3, VectorSpace};

use crate::{data_structures::texture::Texture, object::Object};

/// Index of a material inside a [`MaterialTable`].
///
/// Meshes hold this instead of the material itself, so a material outlives
/// every mesh that points at it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Fixed-function Phong material.
///
/// `transparency` is an opacity in `[0, 1]`: `1.0` is fully opaque and
/// anything lower is composited in the transparent pass.
#[derive(Debug)]
pub struct Material {
    object: Object,
    emission: Vector3<f32>,
    ambient: Vector3<f32>,
    diffuse: Vector3<f32>,
    specular: Vector3<f32>,
    shininess: f32,
    transparency: f32,
    texture: Option<Texture>,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        emission: Vector3<f32>,
        ambient: Vector3<f32>,
        diffuse: Vector3<f32>,
        specular: Vector3<f32>,
        shininess: f32,
        transparency: f32,
    ) -> Self {
        Self {
            object: Object::new(name),
            emission,
            ambient,
            diffuse,
            specular,
            shininess: shininess.max(0.0),
            transparency: transparency.clamp(0.0, 1.0),
            texture: None,
        }
    }

    /// Converts the metal/roughness description OVO files carry into Phong
    /// terms: ambient is a tenth of the albedo, specular blends from a 4%
    /// dielectric reflectance towards the albedo by metalness, and shininess
    /// is `(1 - roughness)^4 * 128`.
    pub fn from_pbr(
        name: impl Into<String>,
        emission: Vector3<f32>,
        albedo: Vector3<f32>,
        roughness: f32,
        metalness: f32,
        alpha: f32,
    ) -> Self {
        let shininess = (1.0 - roughness).powi(4) * 128.0;
        let specular = Vector3::new(0.04, 0.04, 0.04).lerp(albedo, metalness);
        Self::new(
            name,
            emission,
            albedo * 0.1,
            albedo,
            specular,
            shininess,
            alpha,
        )
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }

    pub fn emission(&self) -> Vector3<f32> {
        self.emission
    }

    pub fn ambient(&self) -> Vector3<f32> {
        self.ambient
    }

    pub fn diffuse(&self) -> Vector3<f32> {
        self.diffuse
    }

    pub fn specular(&self) -> Vector3<f32> {
        self.specular
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    /// Anything short of full opacity goes through the transparent pass.
    pub fn is_transparent(&self) -> bool {
        self.transparency < 1.0
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn texture_mut(&mut self) -> Option<&mut Texture> {
        self.texture.as_mut()
    }

    pub fn set_emission(&mut self, emission: Vector3<f32>) {
        self.emission = emission;
    }

    pub fn set_ambient(&mut self, ambient: Vector3<f32>) {
        self.ambient = ambient;
    }

    pub fn set_diffuse(&mut self, diffuse: Vector3<f32>) {
        self.diffuse = diffuse;
    }

    pub fn set_specular(&mut self, specular: Vector3<f32>) {
        self.specular = specular;
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.shininess = shininess.max(0.0);
    }

    pub fn set_transparency(&mut self, transparency: f32) {
        self.transparency = transparency.clamp(0.0, 1.0);
    }

    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.texture = texture;
    }
}

/// Owns every material of a scene and resolves them by name or id.
///
/// Registering a second material under an existing name makes the name
/// resolve to the newer one; the older material stays reachable by id.
#[derive(Debug, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.by_name.insert(material.name().to_string(), id);
        self.materials.push(material);
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<MaterialId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Material> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(idx, material)| (MaterialId(idx), material))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MaterialId, &mut Material)> {
        self.materials
            .iter_mut()
            .enumerate()
            .map(|(idx, material)| (MaterialId(idx), material))
    }
}
