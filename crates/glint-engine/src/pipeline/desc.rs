use super::Topology;

/// Identity of a vertex layout.
///
/// Streams are shared per layout: every pipeline with the same layout id
/// uploads through the same growable ring. Hosts hand out ids; equal ids must
/// mean byte-identical layouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayoutId(pub u32);

/// Byte-level vertex layout, as much of it as the batching core needs.
///
/// The full attribute list is a backend/pipeline concern; the core only needs
/// the stride (append validation, slice sizing) and where the three `f32`
/// position components sit (quad depth sort).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub id: VertexLayoutId,
    /// Bytes per vertex. Must be non-zero.
    pub stride: u32,
    /// Byte offset of the `f32x3` position within a vertex.
    pub position_offset: u32,
}

impl VertexLayout {
    #[inline]
    pub const fn new(id: u32, stride: u32, position_offset: u32) -> Self {
        Self {
            id: VertexLayoutId(id),
            stride,
            position_offset,
        }
    }
}

/// Handle to a registered pipeline. Issued by [`crate::render::Overlay`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PipelineId(pub(crate) u32);

impl PipelineId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Descriptor registered per pipeline: shader identity is carried by `label`
/// plus whatever GPU object the backend associates with the returned
/// [`PipelineId`].
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub label: &'static str,
    pub layout: VertexLayout,
    pub topology: Topology,
}
