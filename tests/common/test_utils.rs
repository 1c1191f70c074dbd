use image::RgbaImage;
use ovo_scene::{
    Matrix4, SquareMatrix, Vector2, Vector3, Vector4,
    data_structures::{
        light::{LightParams, LightSlot},
        material::Material,
        mesh::Mesh,
        texture::{Texture, TextureHandle},
    },
    render::Driver,
    resources::packing::{pack_half_2x16, pack_snorm_3x10_1x2},
};

/// A single driver call as seen by [`RecordingDriver`].
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    SetProjection(Matrix4<f32>),
    LoadModelView(Matrix4<f32>),
    DisableLight(LightSlot),
    ConfigureLight(LightSlot, LightParams),
    /// Name of the bound material, `None` for unlit.
    BindMaterial(Option<String>),
    /// Draw call, tagged with the currently bound material name.
    Draw(String),
    BeginTransparent,
    EndTransparent,
    UploadTexture(String),
}

/// Driver that records every call in order.
#[derive(Default)]
pub struct RecordingDriver {
    pub events: Vec<Event>,
    bound: Option<String>,
    fail_uploads: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn draws(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Draw(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn configured_slots(&self) -> Vec<LightSlot> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::ConfigureLight(slot, _) => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn position_of(&self, wanted: &Event) -> Option<usize> {
        self.events.iter().position(|e| e == wanted)
    }
}

impl Driver for RecordingDriver {
    fn set_projection(&mut self, projection: &Matrix4<f32>) {
        self.events.push(Event::SetProjection(*projection));
    }

    fn load_model_view(&mut self, model_view: &Matrix4<f32>) {
        self.events.push(Event::LoadModelView(*model_view));
    }

    fn disable_light(&mut self, slot: LightSlot) {
        self.events.push(Event::DisableLight(slot));
    }

    fn configure_light(&mut self, slot: LightSlot, params: &LightParams) {
        self.events.push(Event::ConfigureLight(slot, *params));
    }

    fn bind_material(&mut self, material: Option<&Material>) {
        self.bound = material.map(|m| m.name().to_string());
        self.events.push(Event::BindMaterial(self.bound.clone()));
    }

    fn draw_mesh(&mut self, _: &Mesh) {
        let name = self.bound.clone().unwrap_or_else(|| "none".to_string());
        self.events.push(Event::Draw(name));
    }

    fn begin_transparent(&mut self) {
        self.events.push(Event::BeginTransparent);
    }

    fn end_transparent(&mut self) {
        self.events.push(Event::EndTransparent);
    }

    fn upload_texture(
        &mut self,
        texture: &Texture,
        _: &RgbaImage,
    ) -> anyhow::Result<TextureHandle> {
        if self.fail_uploads {
            anyhow::bail!("upload refused");
        }
        self.events
            .push(Event::UploadTexture(texture.name().to_string()));
        Ok(TextureHandle(self.events.len() as u32))
    }
}

/// Little-endian payload writer matching the OVO field encodings.
#[derive(Default)]
pub struct Payload(pub Vec<u8>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn vec3(self, v: [f32; 3]) -> Self {
        self.f32(v[0]).f32(v[1]).f32(v[2])
    }

    pub fn mat4(mut self, m: Matrix4<f32>) -> Self {
        let columns: &[[f32; 4]; 4] = m.as_ref();
        for column in columns {
            for v in column {
                self = self.f32(*v);
            }
        }
        self
    }

    pub fn cstr(mut self, s: &str) -> Self {
        self.0.extend_from_slice(s.as_bytes());
        self.0.push(0);
        self
    }

    pub fn zeros(mut self, count: usize) -> Self {
        self.0.resize(self.0.len() + count, 0);
        self
    }

    pub fn node_header(self, name: &str, matrix: Matrix4<f32>, children: u32) -> Self {
        self.cstr(name).mat4(matrix).u32(children).cstr("[none]")
    }
}

/// Convex hull stored in a mesh's physics block.
pub struct Hull {
    pub vertices: u32,
    pub faces: u32,
}

/// Mesh chunk description for [`OvoBuilder::mesh`].
pub struct MeshChunk<'a> {
    pub name: &'a str,
    pub matrix: Matrix4<f32>,
    pub children: u32,
    pub material: &'a str,
    pub vertices: &'a [[f32; 3]],
    pub faces: &'a [[u32; 3]],
    pub hulls: Option<&'a [Hull]>,
}

impl<'a> MeshChunk<'a> {
    pub fn triangle(name: &'a str, material: &'a str) -> Self {
        Self {
            name,
            matrix: Matrix4::identity(),
            children: 0,
            material,
            vertices: &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: &[[0, 1, 2]],
            hulls: None,
        }
    }
}

pub const NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
pub const UV: [f32; 2] = [0.5, 0.25];

/// Builds OVO byte streams chunk by chunk.
#[derive(Default)]
pub struct OvoBuilder {
    bytes: Vec<u8>,
}

impl OvoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunk(mut self, tag: u32, payload: Payload) -> Self {
        self.bytes.extend_from_slice(&tag.to_le_bytes());
        self.bytes
            .extend_from_slice(&(payload.0.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(&payload.0);
        self
    }

    pub fn object(self, version: u32) -> Self {
        self.chunk(0, Payload::new().u32(version))
    }

    pub fn material(self, name: &str, albedo: [f32; 3], alpha: f32, texture: &str) -> Self {
        let payload = Payload::new()
            .cstr(name)
            .vec3([0.0, 0.0, 0.0])
            .vec3(albedo)
            .f32(0.5)
            .f32(0.0)
            .f32(alpha)
            .cstr(texture)
            .cstr("[none]")
            .cstr("[none]")
            .cstr("[none]")
            .cstr("[none]");
        self.chunk(9, payload)
    }

    pub fn node(self, name: &str, matrix: Matrix4<f32>, children: u32) -> Self {
        self.chunk(1, Payload::new().node_header(name, matrix, children))
    }

    pub fn bone(self, name: &str, children: u32) -> Self {
        self.chunk(
            17,
            Payload::new().node_header(name, Matrix4::identity(), children),
        )
    }

    pub fn skinned(self, name: &str, children: u32) -> Self {
        self.chunk(
            19,
            Payload::new().node_header(name, Matrix4::identity(), children),
        )
    }

    pub fn mesh(self, mesh: MeshChunk<'_>) -> Self {
        self.chunk(18, mesh_payload(&mesh))
    }

    pub fn omni(self, name: &str, matrix: Matrix4<f32>, color: [f32; 3], radius: f32) -> Self {
        self.light(name, matrix, 0, 0, color, radius, [0.0, 0.0, -1.0], 180.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn light(
        self,
        name: &str,
        matrix: Matrix4<f32>,
        children: u32,
        subtype: u8,
        color: [f32; 3],
        radius: f32,
        direction: [f32; 3],
        cutoff: f32,
    ) -> Self {
        let payload = Payload::new()
            .node_header(name, matrix, children)
            .u8(subtype)
            .vec3(color)
            .f32(radius)
            .vec3(direction)
            .f32(cutoff)
            .f32(2.0)
            .u8(1)
            .u8(0);
        self.chunk(16, payload)
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn mesh_payload(mesh: &MeshChunk<'_>) -> Payload {
    let mut payload = Payload::new()
        .node_header(mesh.name, mesh.matrix, mesh.children)
        .u8(0)
        .cstr(mesh.material)
        .f32(1.0)
        .vec3([0.0, 0.0, 0.0])
        .vec3([1.0, 1.0, 0.0]);
    match mesh.hulls {
        None => payload = payload.u8(0),
        Some(hulls) => {
            payload = payload
                .u8(1)
                .zeros(40)
                .u32(hulls.len() as u32)
                .zeros(20);
            for hull in hulls {
                payload = payload
                    .u32(hull.vertices)
                    .u32(hull.faces)
                    .vec3([0.0, 0.0, 0.0])
                    .zeros(12 * (hull.vertices + hull.faces) as usize);
            }
        }
    }
    payload = payload
        .u32(1)
        .u32(mesh.vertices.len() as u32)
        .u32(mesh.faces.len() as u32);
    let normal = pack_snorm_3x10_1x2(Vector4::new(NORMAL[0], NORMAL[1], NORMAL[2], 0.0));
    let uv = pack_half_2x16(Vector2::new(UV[0], UV[1]));
    for v in mesh.vertices {
        payload = payload.vec3(*v).u32(normal).u32(uv).u32(0);
    }
    for f in mesh.faces {
        payload = payload.u32(f[0]).u32(f[1]).u32(f[2]);
    }
    payload
}

pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(x, y, z))
}
