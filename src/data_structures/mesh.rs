//! Triangle meshes.

use cgmath::{Vector2, Vector3};
use thiserror::Error;

use crate::{
    data_structures::material::{MaterialId, MaterialTable},
    render::Driver,
};

/// Informational mesh flavour stored in OVO files. Rendering treats all of
/// them the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshSubtype {
    #[default]
    Default,
    NormalMapped,
    Tessellated,
    /// Any tag this reader does not know.
    Undefined(u8),
}

impl From<u8> for MeshSubtype {
    fn from(tag: u8) -> Self {
        match tag {
            0 => MeshSubtype::Default,
            1 => MeshSubtype::NormalMapped,
            2 => MeshSubtype::Tessellated,
            other => MeshSubtype::Undefined(other),
        }
    }
}

/// Axis aligned box plus bounding sphere radius, as exported with the mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub radius: f32,
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            radius: 0.0,
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("vertex attribute lengths differ: {vertices} positions, {normals} normals, {tex_coords} tex coords")]
    AttributeMismatch {
        vertices: usize,
        normals: usize,
        tex_coords: usize,
    },
    #[error("face {face} references vertex {index} but only {vertices} exist")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertices: usize,
    },
}

/// Indexed triangle geometry with per-vertex normal and texture coordinate.
///
/// `vertices`, `normals` and `tex_coords` are parallel arrays and every face
/// index is below `vertices.len()`. [`Mesh::set_geometry`] enforces both.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    normals: Vec<Vector3<f32>>,
    tex_coords: Vec<Vector2<f32>>,
    faces: Vec<[u32; 3]>,
    material: Option<MaterialId>,
    subtype: MeshSubtype,
    bounds: Bounds,
}

impl Mesh {
    pub fn new(material: Option<MaterialId>) -> Self {
        Self {
            material,
            ..Default::default()
        }
    }

    pub fn set_geometry(
        &mut self,
        vertices: Vec<Vector3<f32>>,
        normals: Vec<Vector3<f32>>,
        tex_coords: Vec<Vector2<f32>>,
        faces: Vec<[u32; 3]>,
    ) -> Result<(), GeometryError> {
        if normals.len() != vertices.len() || tex_coords.len() != vertices.len() {
            return Err(GeometryError::AttributeMismatch {
                vertices: vertices.len(),
                normals: normals.len(),
                tex_coords: tex_coords.len(),
            });
        }
        for (face, indices) in faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(GeometryError::IndexOutOfRange {
                    face,
                    index,
                    vertices: vertices.len(),
                });
            }
        }
        self.vertices = vertices;
        self.normals = normals;
        self.tex_coords = tex_coords;
        self.faces = faces;
        Ok(())
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[Vector2<f32>] {
        &self.tex_coords
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
    }

    pub fn subtype(&self) -> MeshSubtype {
        self.subtype
    }

    pub fn set_subtype(&mut self, subtype: MeshSubtype) {
        self.subtype = subtype;
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Binds the material (or none, if the id does not resolve) and submits
    /// the triangles. The caller has already loaded the model-view matrix.
    pub fn render(&self, materials: &MaterialTable, driver: &mut dyn Driver) {
        driver.bind_material(self.material.and_then(|id| materials.get(id)));
        driver.draw_mesh(self);
    }
}
