//! Mesh finalization and submission.
//!
//! Turns finalized CPU-side mesh bytes into exactly one indexed draw call:
//! optional back-to-front quad sort, vertex/index/uniform upload through the
//! shared streams, then a [`crate::backend::DrawCall`]. No clipping or
//! culling happens here; that's the caller's job upstream.

mod sequential;
mod sort;
mod submit;

pub use sequential::SequentialIndices;
pub use sort::sort_quads_back_to_front;
pub use submit::{MeshSubmitter, Submission};
