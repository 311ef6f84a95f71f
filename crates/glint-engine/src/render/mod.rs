//! Render environment facade.
//!
//! [`Overlay`] ties the pieces together: pipeline registry, batch
//! accumulation, shared streams and mesh submission, over any
//! [`crate::backend::GpuBackend`].

mod env;

pub use env::Overlay;

use crate::stream::StreamError;

/// Error surfaced by [`Overlay::draw`].
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    /// Vertex bytes don't divide by the pipeline's vertex stride. Caller bug;
    /// the data is rejected rather than truncated.
    #[error("vertex data for pipeline {pipeline:?} is {len} bytes, not a multiple of stride {stride}")]
    Misuse {
        pipeline: &'static str,
        len: usize,
        stride: u32,
    },
    #[error(transparent)]
    Stream(#[from] StreamError),
}
