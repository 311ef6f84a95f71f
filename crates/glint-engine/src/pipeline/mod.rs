//! Pipeline identity.
//!
//! A "pipeline" here is a draw-state key: vertex layout + topology + shader
//! identity. Shader content and GPU pipeline objects live behind the backend;
//! this module only carries the descriptors the batching core needs to slot
//! vertex bytes into the right stream and index pattern.

mod desc;
mod topology;

pub use desc::{PipelineDesc, PipelineId, VertexLayout, VertexLayoutId};
pub use topology::{IndexKind, Topology};
