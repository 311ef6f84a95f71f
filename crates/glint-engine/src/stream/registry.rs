use std::collections::HashMap;

use crate::backend::{BufferId, BufferUse, GpuBackend};
use crate::pipeline::{IndexKind, VertexLayout, VertexLayoutId};

use super::{GrowPolicy, ReclaimQueue, RingStream, Slice, StreamError};

/// Registry of shared ring streams, keyed by vertex layout, index width and
/// uniform kind.
///
/// Owned by the render core and handed around explicitly — tests construct
/// isolated instances instead of sharing ambient statics. All producers using
/// the same key within a frame upload through the same stream.
#[derive(Debug)]
pub struct StreamSet {
    vertex: HashMap<VertexLayoutId, RingStream>,
    index: HashMap<IndexKind, RingStream>,
    uniform: RingStream,
    reclaim: ReclaimQueue,
}

impl StreamSet {
    pub fn new() -> Self {
        Self {
            vertex: HashMap::new(),
            index: HashMap::new(),
            uniform: RingStream::new(
                "glint uniform stream",
                BufferUse::Uniform,
                GrowPolicy::of(7, 1 << 12),
            ),
            reclaim: ReclaimQueue::new(),
        }
    }

    /// Uploads vertex bytes through the stream shared by `layout`.
    pub fn upload_vertex(
        &mut self,
        backend: &mut dyn GpuBackend,
        layout: VertexLayout,
        bytes: &[u8],
    ) -> Result<Slice, StreamError> {
        self.vertex
            .entry(layout.id)
            .or_insert_with(|| {
                RingStream::new(
                    format!("glint vertex stream #{}", layout.id.0),
                    BufferUse::Vertex,
                    // 8 KiB floor, 256-byte padding: vertex data dominates
                    // traffic and churns every frame.
                    GrowPolicy::of(8, 1 << 13),
                )
            })
            .upload(backend, &mut self.reclaim, bytes)
    }

    /// Uploads explicit index bytes through the stream shared by `kind`.
    pub fn upload_index(
        &mut self,
        backend: &mut dyn GpuBackend,
        kind: IndexKind,
        bytes: &[u8],
    ) -> Result<Slice, StreamError> {
        self.index
            .entry(kind)
            .or_insert_with(|| {
                let width = match kind {
                    IndexKind::U16 => "u16",
                    IndexKind::U32 => "u32",
                };
                RingStream::new(
                    format!("glint index stream {width}"),
                    BufferUse::Index,
                    GrowPolicy::default(),
                )
            })
            .upload(backend, &mut self.reclaim, bytes)
    }

    /// Uploads transient uniform bytes (per-draw transforms, one-off UBO
    /// values) through the shared uniform stream.
    pub fn upload_uniform(
        &mut self,
        backend: &mut dyn GpuBackend,
        bytes: &[u8],
    ) -> Result<Slice, StreamError> {
        self.uniform.upload(backend, &mut self.reclaim, bytes)
    }

    /// Parks non-ring buffers (e.g. a replaced sequential-index buffer) in
    /// the same deferred-release queue.
    pub(crate) fn retire(&mut self, buffers: impl IntoIterator<Item = BufferId>) {
        self.reclaim.retire(buffers);
    }

    /// Frame-boundary hook: blanket-rotate every stream so the next frame
    /// starts on fresh ring members, release whatever retired buffers are now
    /// safe, then let the backend advance its frame clock.
    pub fn end_frame(&mut self, backend: &mut dyn GpuBackend) {
        for stream in self.vertex.values_mut() {
            stream.rotate();
        }
        for stream in self.index.values_mut() {
            stream.rotate();
        }
        self.uniform.rotate();

        self.reclaim.cleanup(backend);
        backend.frame_ended();
    }

    /// Releases every buffer immediately. Teardown path only; the caller
    /// guarantees the GPU is idle.
    pub fn clear(&mut self, backend: &mut dyn GpuBackend) {
        for stream in self.vertex.values_mut() {
            stream.clear(backend);
        }
        for stream in self.index.values_mut() {
            stream.clear(backend);
        }
        self.uniform.clear(backend);
        self.reclaim.drain(backend);
    }

    #[cfg(test)]
    pub(crate) fn pending_reclaims(&self) -> usize {
        self.reclaim.pending()
    }
}

impl Default for StreamSet {
    fn default() -> Self {
        Self::new()
    }
}
