//! Vertex attribute packings used by OVO meshes.
//!
//! Normals are stored as `snorm3x10_1x2`: three signed 10-bit components in
//! bits 0..30 (x lowest) plus a signed 2-bit w on top. Texture coordinates
//! are two IEEE 754 half floats with x in the low 16 bits.

use cgmath::{Vector2, Vector4};
use half::f16;

fn sign_extend(bits: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((bits << shift) as i32) >> shift
}

pub fn unpack_snorm_3x10_1x2(packed: u32) -> Vector4<f32> {
    let component = |offset: u32| {
        let value = sign_extend((packed >> offset) & 0x3FF, 10) as f32 / 511.0;
        value.clamp(-1.0, 1.0)
    };
    let w = (sign_extend(packed >> 30, 2) as f32).clamp(-1.0, 1.0);
    Vector4::new(component(0), component(10), component(20), w)
}

pub fn pack_snorm_3x10_1x2(v: Vector4<f32>) -> u32 {
    let component = |value: f32| ((value.clamp(-1.0, 1.0) * 511.0).round() as i32 as u32) & 0x3FF;
    let w = (v.w.clamp(-1.0, 1.0).round() as i32 as u32) & 0x3;
    component(v.x) | (component(v.y) << 10) | (component(v.z) << 20) | (w << 30)
}

pub fn unpack_half_2x16(packed: u32) -> Vector2<f32> {
    Vector2::new(
        f16::from_bits((packed & 0xFFFF) as u16).to_f32(),
        f16::from_bits((packed >> 16) as u16).to_f32(),
    )
}

pub fn pack_half_2x16(v: Vector2<f32>) -> u32 {
    u32::from(f16::from_f32(v.x).to_bits()) | (u32::from(f16::from_f32(v.y).to_bits()) << 16)
}
