//! GPU backend abstraction.
//!
//! The streaming/batching core never touches a graphics API directly; it
//! allocates, writes and draws through [`GpuBackend`]. This keeps the buffer
//! lifecycle rules (including the reclaim safety predicate) portable across
//! backends and lets the core run under a recording backend in tests.

mod wgpu;

#[cfg(test)]
pub(crate) mod testing;

pub use self::wgpu::WgpuBackend;

use crate::pipeline::{IndexKind, PipelineId};
use crate::stream::{Slice, StreamError};

/// Opaque handle to a backend-owned physical buffer.
///
/// `BufferId::NULL` is reserved for zero-length slices that carry no buffer
/// identity; backends never issue it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u64);

impl BufferId {
    pub const NULL: Self = Self(0);
}

/// Opaque handle to a backend-registered texture binding (view + sampler).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// What a buffer will be bound as. Fixed at creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferUse {
    Vertex,
    Index,
    Uniform,
}

/// One fully-resolved indexed draw.
///
/// Every slice references data uploaded earlier in the same frame; slices are
/// consumed by the draw and must not be retained past it.
#[derive(Debug)]
pub struct DrawCall<'a> {
    pub pipeline: PipelineId,
    pub vertices: Slice,
    pub indices: Slice,
    pub index_kind: IndexKind,
    pub index_count: u32,
    /// Per-draw transform + modulation color uniform (std140 layout).
    pub transforms: Slice,
    /// Texture bindings by shader binding name.
    pub textures: &'a [(&'a str, TextureId)],
    /// Extra caller-provided uniform slices by binding name.
    pub uniforms: &'a [(&'a str, Slice)],
}

/// The capability surface the streaming core needs from a graphics API.
///
/// All methods are called from the single render thread. `is_safe_to_free` is
/// the injected reclaim predicate: it must only return `true` once no GPU
/// consumer of the buffer's prior contents can still be executing. How that is
/// established (fences, reference counts, frame delay) is the backend's
/// choice.
pub trait GpuBackend {
    /// Allocates a physical buffer. Failure is resource exhaustion and is
    /// treated as fatal for the pending mesh; it is never retried.
    fn create_buffer(
        &mut self,
        label: &str,
        usage: BufferUse,
        size: u64,
    ) -> Result<BufferId, StreamError>;

    /// Writes `bytes` at `offset`. The range is guaranteed in-bounds by the
    /// allocator.
    fn write_buffer(&mut self, buffer: BufferId, offset: u64, bytes: &[u8]);

    /// Reclaim safety predicate for a retired buffer.
    fn is_safe_to_free(&self, buffer: BufferId) -> bool;

    /// Releases a buffer. Only ever called after retirement with
    /// [`is_safe_to_free`](Self::is_safe_to_free) holding.
    fn free_buffer(&mut self, buffer: BufferId);

    /// Issues one indexed draw call.
    fn draw(&mut self, call: &DrawCall<'_>);

    /// Frame-boundary hook, called once per frame after reclaim cleanup has
    /// been scheduled. Backends advance whatever clock their safety predicate
    /// reads.
    fn frame_ended(&mut self);
}
