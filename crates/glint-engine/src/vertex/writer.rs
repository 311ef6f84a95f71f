use crate::paint::Color;

/// Chainable byte-level vertex builder.
///
/// Callers emit attributes in their pipeline layout's declared order; the
/// writer does no layout checking, the stride validation at draw time catches
/// meshes whose byte length doesn't divide by the layout stride.
#[derive(Debug, Default)]
pub struct VertexWriter {
    bytes: Vec<u8>,
}

impl VertexWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    #[inline]
    pub fn position(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.bytes.extend_from_slice(&x.to_ne_bytes());
        self.bytes.extend_from_slice(&y.to_ne_bytes());
        self.bytes.extend_from_slice(&z.to_ne_bytes());
        self
    }

    #[inline]
    pub fn uv(&mut self, u: f32, v: f32) -> &mut Self {
        self.bytes.extend_from_slice(&u.to_ne_bytes());
        self.bytes.extend_from_slice(&v.to_ne_bytes());
        self
    }

    /// Emits the color as four normalized u8 channels.
    #[inline]
    pub fn color(&mut self, color: Color) -> &mut Self {
        self.bytes.extend_from_slice(&color.to_rgba_u8());
        self
    }

    #[inline]
    pub fn color_u8(&mut self, r: u8, g: u8, b: u8, a: u8) -> &mut Self {
        self.bytes.extend_from_slice(&[r, g, b, a]);
        self
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of complete vertices written, for the given layout stride.
    #[inline]
    pub fn vertex_count(&self, stride: u64) -> u32 {
        (self.bytes.len() as u64 / stride) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Drops written bytes, retaining the allocation for reuse.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }
}
