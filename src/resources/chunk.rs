//! Low level access to OVO chunk streams.
//!
//! An OVO file is a flat sequence of chunks, each made of a little-endian
//! `u32` tag, a little-endian `u32` payload length and the payload itself.
//! [`ChunkReader`] splits a byte stream into chunks and [`ByteCursor`] reads
//! typed fields out of one payload.

use std::io::{ErrorKind, Read};

use cgmath::{Matrix4, Vector3};

use crate::resources::ovo::OvoError;

/// Size of the tag plus length prefix of every chunk.
pub const CHUNK_HEADER_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkType {
    Object,
    Node,
    Material,
    Light,
    Bone,
    Mesh,
    Skinned,
    Other(u32),
}

impl From<u32> for ChunkType {
    fn from(tag: u32) -> Self {
        match tag {
            0 => ChunkType::Object,
            1 => ChunkType::Node,
            9 => ChunkType::Material,
            16 => ChunkType::Light,
            17 => ChunkType::Bone,
            18 => ChunkType::Mesh,
            19 => ChunkType::Skinned,
            other => ChunkType::Other(other),
        }
    }
}

impl ChunkType {
    pub fn tag(self) -> u32 {
        match self {
            ChunkType::Object => 0,
            ChunkType::Node => 1,
            ChunkType::Material => 9,
            ChunkType::Light => 16,
            ChunkType::Bone => 17,
            ChunkType::Mesh => 18,
            ChunkType::Skinned => 19,
            ChunkType::Other(tag) => tag,
        }
    }

    /// Chunks that make up the node hierarchy.
    pub fn is_node(self) -> bool {
        matches!(
            self,
            ChunkType::Node
                | ChunkType::Mesh
                | ChunkType::Light
                | ChunkType::Bone
                | ChunkType::Skinned
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub kind: ChunkType,
    pub len: u32,
}

#[derive(Clone, Debug)]
pub struct Chunk {
    pub kind: ChunkType,
    pub payload: Vec<u8>,
}

impl Chunk {
    pub fn cursor(&self) -> ByteCursor<'_> {
        ByteCursor::new(self.kind, &self.payload)
    }
}

/// Splits a byte stream into chunks with one header of lookahead.
pub struct ChunkReader<R> {
    reader: R,
    peeked: Option<ChunkHeader>,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
        }
    }

    /// Header of the next chunk without consuming it. `None` at a clean end
    /// of stream.
    pub fn peek_header(&mut self) -> Result<Option<ChunkHeader>, OvoError> {
        if self.peeked.is_none() {
            self.peeked = self.read_header()?;
        }
        Ok(self.peeked)
    }

    /// Reads the next complete chunk. `None` at a clean end of stream.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, OvoError> {
        let header = match self.peeked.take() {
            Some(header) => header,
            None => match self.read_header()? {
                Some(header) => header,
                None => return Ok(None),
            },
        };
        let mut payload = Vec::with_capacity(header.len as usize);
        (&mut self.reader)
            .take(u64::from(header.len))
            .read_to_end(&mut payload)?;
        if payload.len() < header.len as usize {
            return Err(OvoError::Truncated {
                chunk: header.kind.tag(),
                offset: 0,
                needed: header.len as usize,
                available: payload.len(),
            });
        }
        Ok(Some(Chunk {
            kind: header.kind,
            payload,
        }))
    }

    fn read_header(&mut self) -> Result<Option<ChunkHeader>, OvoError> {
        let mut buf = [0u8; CHUNK_HEADER_SIZE];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            CHUNK_HEADER_SIZE => {
                let tag = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
                let len = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
                Ok(Some(ChunkHeader {
                    kind: ChunkType::from(tag),
                    len,
                }))
            }
            _ => Err(OvoError::TruncatedStream { read: filled }),
        }
    }
}

/// Bounds-checked little-endian reader over one chunk payload.
pub struct ByteCursor<'a> {
    chunk: ChunkType,
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(chunk: ChunkType, data: &'a [u8]) -> Self {
        Self {
            chunk,
            data,
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], OvoError> {
        if count > self.remaining() {
            return Err(OvoError::Truncated {
                chunk: self.chunk.tag(),
                offset: self.pos,
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], OvoError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, count: usize) -> Result<(), OvoError> {
        self.take(count).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, OvoError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, OvoError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, OvoError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_vec3(&mut self) -> Result<Vector3<f32>, OvoError> {
        Ok(Vector3::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    /// 16 floats, column after column.
    pub fn read_mat4(&mut self) -> Result<Matrix4<f32>, OvoError> {
        let mut m = [0.0f32; 16];
        for value in &mut m {
            *value = self.read_f32()?;
        }
        Ok(Matrix4::new(
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8], m[9], m[10], m[11], m[12],
            m[13], m[14], m[15],
        ))
    }

    /// NUL-terminated string. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_cstr(&mut self) -> Result<String, OvoError> {
        let rest = &self.data[self.pos..];
        let Some(len) = rest.iter().position(|&b| b == 0) else {
            return Err(OvoError::Truncated {
                chunk: self.chunk.tag(),
                offset: self.pos,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_bytes(tag: u32, payload: &[u8]) -> Vec<u8> {
        let mut out = tag.to_le_bytes().to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn should_peek_without_consuming() {
        let bytes = chunk_bytes(1, &[1, 2, 3]);
        let mut reader = ChunkReader::new(bytes.as_slice());
        let header = reader.peek_header().unwrap().unwrap();
        assert_eq!(header.kind, ChunkType::Node);
        assert_eq!(header.len, 3);
        let chunk = reader.next_chunk().unwrap().unwrap();
        assert_eq!(chunk.payload, vec![1, 2, 3]);
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn should_reject_partial_header() {
        let bytes = [1u8, 0, 0];
        let mut reader = ChunkReader::new(&bytes[..]);
        assert!(matches!(
            reader.next_chunk(),
            Err(OvoError::TruncatedStream { read: 3 })
        ));
    }

    #[test]
    fn should_reject_short_payload() {
        let mut bytes = chunk_bytes(18, &[0; 10]);
        bytes.truncate(12);
        let mut reader = ChunkReader::new(bytes.as_slice());
        assert!(matches!(
            reader.next_chunk(),
            Err(OvoError::Truncated { chunk: 18, .. })
        ));
    }

    #[test]
    fn should_read_typed_fields() {
        let mut payload = b"cube\0".to_vec();
        payload.extend_from_slice(&7u32.to_le_bytes());
        payload.extend_from_slice(&1.5f32.to_le_bytes());
        payload.push(2);
        let mut cursor = ByteCursor::new(ChunkType::Node, &payload);
        assert_eq!(cursor.read_cstr().unwrap(), "cube");
        assert_eq!(cursor.read_u32().unwrap(), 7);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert_eq!(cursor.read_u8().unwrap(), 2);
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.read_u8().is_err());
    }

    #[test]
    fn should_fail_on_unterminated_string() {
        let mut cursor = ByteCursor::new(ChunkType::Material, b"abc");
        assert!(cursor.read_cstr().is_err());
    }

    #[test]
    fn should_read_matrix_column_major() {
        let payload: Vec<u8> = (0..16)
            .flat_map(|i| (i as f32).to_le_bytes())
            .collect();
        let mut cursor = ByteCursor::new(ChunkType::Node, &payload);
        let m = cursor.read_mat4().unwrap();
        assert_eq!(m.x.y, 1.0);
        assert_eq!(m.w.x, 12.0);
    }
}
