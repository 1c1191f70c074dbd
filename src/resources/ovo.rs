//! Reader for the OVO binary scene format.
//!
//! A file starts with a header section of OBJECT and MATERIAL chunks followed
//! by the node hierarchy, stored depth first: every node chunk declares how
//! many child chunks directly follow it.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use cgmath::Matrix4;
use log::{debug, info};
use thiserror::Error;

use crate::{
    data_structures::{
        light::Light,
        material::{Material, MaterialTable},
        mesh::{Bounds, GeometryError, Mesh, MeshSubtype},
        scene_graph::{Node, NodeId, NodeKind, SceneGraph},
        texture::Texture,
    },
    resources::{
        chunk::{ByteCursor, Chunk, ChunkReader, ChunkType},
        packing::{unpack_half_2x16, unpack_snorm_3x10_1x2},
    },
    scene::Scene,
};

/// Texture file name exported for material slots without a texture.
pub const NO_TEXTURE: &str = "[none]";

/// Size of the physics property block that precedes the convex hulls.
const PHYSICS_HEADER_SIZE: usize = 64;
/// Offset of the hull count inside the physics property block.
const PHYSICS_HULL_COUNT_OFFSET: usize = 40;

/// Deepest node nesting accepted before the load is refused.
pub const MAX_NODE_DEPTH: usize = 256;

#[derive(Debug, Error)]
pub enum OvoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk {chunk} truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        chunk: u32,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("stream ended inside a chunk header after {read} bytes")]
    TruncatedStream { read: usize },

    #[error("unexpected chunk tag {tag} in {phase}")]
    UnexpectedChunk { tag: u32, phase: &'static str },

    #[error("mesh '{mesh}' references unknown material '{material}'")]
    UnresolvedMaterial { mesh: String, material: String },

    #[error("light '{light}' has unknown subtype {subtype}")]
    UnknownLightSubtype { light: String, subtype: u8 },

    #[error("mesh '{mesh}' has invalid geometry: {source}")]
    InvalidGeometry {
        mesh: String,
        #[source]
        source: GeometryError,
    },

    #[error("file contains no root node")]
    MissingRoot,

    #[error("node '{node}' is nested deeper than {max} levels")]
    TooDeep { node: String, max: usize },
}

/// Opens and parses an OVO file. Texture file names are resolved against
/// `texture_dir`.
pub fn load_scene(
    path: impl AsRef<Path>,
    texture_dir: impl AsRef<Path>,
) -> Result<Scene, OvoError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let scene = parse_scene(BufReader::new(file), texture_dir)?;
    info!(
        "loaded {} with {} nodes and {} materials",
        path.display(),
        scene.graph.len(),
        scene.materials.len()
    );
    Ok(scene)
}

/// Parses an OVO stream. Data after the root's subtree is ignored.
pub fn parse_scene<R: Read>(reader: R, texture_dir: impl AsRef<Path>) -> Result<Scene, OvoError> {
    let mut chunks = ChunkReader::new(reader);
    let mut materials = MaterialTable::new();
    read_header(&mut chunks, &mut materials, texture_dir.as_ref())?;

    let mut loader = Loader {
        chunks,
        materials: &materials,
        graph: SceneGraph::new(),
    };
    let root = loader.read_node(0)?.ok_or(OvoError::MissingRoot)?;
    let graph = loader.graph;
    Ok(Scene::from_parts(graph, root, materials))
}

fn read_header<R: Read>(
    chunks: &mut ChunkReader<R>,
    materials: &mut MaterialTable,
    texture_dir: &Path,
) -> Result<(), OvoError> {
    loop {
        let Some(header) = chunks.peek_header()? else {
            return Err(OvoError::MissingRoot);
        };
        match header.kind {
            kind if kind.is_node() => return Ok(()),
            ChunkType::Object => {
                let chunk = next(chunks)?;
                let version = chunk.cursor().read_u32()?;
                debug!("OVO version {version}");
            }
            ChunkType::Material => {
                let chunk = next(chunks)?;
                let material = read_material(&chunk, texture_dir)?;
                debug!("material '{}'", material.name());
                materials.insert(material);
            }
            other => {
                return Err(OvoError::UnexpectedChunk {
                    tag: other.tag(),
                    phase: "header",
                });
            }
        }
    }
}

/// Next chunk after a successful peek.
fn next<R: Read>(chunks: &mut ChunkReader<R>) -> Result<Chunk, OvoError> {
    chunks.next_chunk()?.ok_or(OvoError::MissingRoot)
}

fn read_material(chunk: &Chunk, texture_dir: &Path) -> Result<Material, OvoError> {
    let mut cursor = chunk.cursor();
    let name = cursor.read_cstr()?;
    let emission = cursor.read_vec3()?;
    let albedo = cursor.read_vec3()?;
    let roughness = cursor.read_f32()?;
    let metalness = cursor.read_f32()?;
    let alpha = cursor.read_f32()?;
    let albedo_texture = cursor.read_cstr()?;
    // normal, height, roughness and metalness maps are not used
    for _ in 0..4 {
        cursor.read_cstr()?;
    }

    let mut material = Material::from_pbr(name, emission, albedo, roughness, metalness, alpha);
    if albedo_texture != NO_TEXTURE {
        let path = texture_dir.join(&albedo_texture);
        material.set_texture(Some(Texture::new(albedo_texture, path)));
    }
    Ok(material)
}

/// Fields every node chunk starts with.
struct NodeHeader {
    name: String,
    matrix: Matrix4<f32>,
    children: u32,
}

fn read_node_header(cursor: &mut ByteCursor<'_>) -> Result<NodeHeader, OvoError> {
    let name = cursor.read_cstr()?;
    let matrix = cursor.read_mat4()?;
    let children = cursor.read_u32()?;
    let _target = cursor.read_cstr()?;
    Ok(NodeHeader {
        name,
        matrix,
        children,
    })
}

struct Loader<'m, R> {
    chunks: ChunkReader<R>,
    materials: &'m MaterialTable,
    graph: SceneGraph,
}

impl<R: Read> Loader<'_, R> {
    /// Reads one node chunk and, recursively, the child chunks it declares.
    ///
    /// Bones and skinned meshes yield `None` and their payload is not
    /// decoded, so they claim no children of their own. Whatever chunks
    /// follow them fill the remaining child slots of their parent.
    fn read_node(&mut self, depth: usize) -> Result<Option<NodeId>, OvoError> {
        let Some(chunk) = self.chunks.next_chunk()? else {
            return Ok(None);
        };
        let kind = match chunk.kind {
            ChunkType::Bone | ChunkType::Skinned => {
                debug!("skipping {:?} chunk", chunk.kind);
                return Ok(None);
            }
            ChunkType::Node | ChunkType::Mesh | ChunkType::Light => chunk.kind,
            other => {
                return Err(OvoError::UnexpectedChunk {
                    tag: other.tag(),
                    phase: "node hierarchy",
                });
            }
        };
        let mut cursor = chunk.cursor();
        let header = read_node_header(&mut cursor)?;
        if depth >= MAX_NODE_DEPTH {
            return Err(OvoError::TooDeep {
                node: header.name,
                max: MAX_NODE_DEPTH,
            });
        }

        let kind = match kind {
            ChunkType::Mesh => NodeKind::Mesh(self.read_mesh(&header, &mut cursor)?),
            ChunkType::Light => NodeKind::Light(read_light(&header, &mut cursor)?),
            _ => NodeKind::Group,
        };
        debug!(
            "{:?} chunk '{}' with {} children",
            chunk.kind, header.name, header.children
        );

        let id = self
            .graph
            .insert(Node::new(header.name, kind).with_transform(header.matrix));
        for _ in 0..header.children {
            // declared children missing at the end of the stream are absent
            if self.chunks.peek_header()?.is_none() {
                break;
            }
            if let Some(child) = self.read_node(depth + 1)? {
                self.graph.add_child(id, child);
            }
        }
        Ok(Some(id))
    }

    fn read_mesh(
        &self,
        header: &NodeHeader,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<Mesh, OvoError> {
        let subtype = MeshSubtype::from(cursor.read_u8()?);
        let material_name = cursor.read_cstr()?;
        let bounds = Bounds {
            radius: cursor.read_f32()?,
            min: cursor.read_vec3()?,
            max: cursor.read_vec3()?,
        };

        if cursor.read_u8()? != 0 {
            skip_physics(cursor)?;
        }

        let _lods = cursor.read_u32()?;
        let vertex_count = cursor.read_u32()? as usize;
        let face_count = cursor.read_u32()? as usize;

        // 12 bytes position plus three packed u32s
        let vertex_bytes = vertex_count.saturating_mul(24);
        if vertex_bytes > cursor.remaining() {
            return Err(OvoError::Truncated {
                chunk: ChunkType::Mesh.tag(),
                offset: cursor.position(),
                needed: vertex_bytes,
                available: cursor.remaining(),
            });
        }
        let mut vertices = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut tex_coords = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push(cursor.read_vec3()?);
            normals.push(unpack_snorm_3x10_1x2(cursor.read_u32()?).truncate());
            tex_coords.push(unpack_half_2x16(cursor.read_u32()?));
            let _tangent = cursor.read_u32()?;
        }

        let mut faces = Vec::with_capacity(face_count.min(cursor.remaining() / 12));
        for _ in 0..face_count {
            faces.push([cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?]);
        }

        let material = self
            .materials
            .id_of(&material_name)
            .ok_or_else(|| OvoError::UnresolvedMaterial {
                mesh: header.name.clone(),
                material: material_name.clone(),
            })?;

        let mut mesh = Mesh::new(Some(material));
        mesh.set_subtype(subtype);
        mesh.set_bounds(bounds);
        mesh.set_geometry(vertices, normals, tex_coords, faces)
            .map_err(|source| OvoError::InvalidGeometry {
                mesh: header.name.clone(),
                source,
            })?;
        Ok(mesh)
    }
}

fn skip_physics(cursor: &mut ByteCursor<'_>) -> Result<(), OvoError> {
    cursor.skip(PHYSICS_HULL_COUNT_OFFSET)?;
    let hulls = cursor.read_u32()?;
    cursor.skip(PHYSICS_HEADER_SIZE - PHYSICS_HULL_COUNT_OFFSET - 4)?;
    for _ in 0..hulls {
        let vertices = cursor.read_u32()? as usize;
        let faces = cursor.read_u32()? as usize;
        // centroid, vertices, faces
        let bytes = vertices
            .saturating_add(faces)
            .saturating_add(1)
            .saturating_mul(12);
        cursor.skip(bytes)?;
    }
    Ok(())
}

fn read_light(header: &NodeHeader, cursor: &mut ByteCursor<'_>) -> Result<Light, OvoError> {
    let subtype = cursor.read_u8()?;
    let color = cursor.read_vec3()?;
    let radius = cursor.read_f32()?;
    let direction = cursor.read_vec3()?;
    let cutoff = cursor.read_f32()?;
    let exponent = cursor.read_f32()?;
    let _cast_shadows = cursor.read_u8()?;
    let _volumetric = cursor.read_u8()?;

    let light = match subtype {
        0 => {
            let mut light = Light::omni(&header.matrix, color, color, color);
            light.set_attenuation(radius_attenuation(1.0, radius));
            light
        }
        1 => Light::directional(color, color, color, direction),
        2 => {
            let mut light =
                Light::spot(&header.matrix, color, color, color, direction, cutoff, exponent);
            light.set_attenuation(radius_attenuation(10.0, radius));
            light
        }
        other => {
            return Err(OvoError::UnknownLightSubtype {
                light: header.name.clone(),
                subtype: other,
            });
        }
    };
    Ok(light)
}

/// `clamp(scale / radius, 0, 1)`; a zero radius gives no falloff.
fn radius_attenuation(scale: f32, radius: f32) -> f32 {
    let value = scale / radius;
    if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) }
}
