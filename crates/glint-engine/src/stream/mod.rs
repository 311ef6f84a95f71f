//! Streaming GPU buffer allocation.
//!
//! Three pieces:
//! - [`RingStream`]: a linear allocator over a small ring of physical buffers,
//!   growing wholesale when an upload doesn't fit any member.
//! - [`ReclaimQueue`]: retired buffers parked until the backend's safety
//!   predicate says the GPU is done with them.
//! - [`StreamSet`]: the registry of ring streams keyed by vertex layout,
//!   index width and uniform kind, owned by the render core (no statics).

mod reclaim;
mod registry;
mod ring;

pub use reclaim::ReclaimQueue;
pub use registry::StreamSet;
pub use ring::{GrowPolicy, RingStream, Slice, RING_MEMBERS};

/// Unrecoverable streaming failure.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// GPU buffer allocation failed during growth. Not retried; the pending
    /// mesh is discarded rather than drawn incorrectly.
    #[error("gpu buffer allocation failed for {label} ({size} bytes)")]
    Exhausted { label: String, size: u64 },
}
