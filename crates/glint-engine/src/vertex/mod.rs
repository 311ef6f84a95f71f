//! CPU-side vertex assembly.

mod writer;

pub use writer::VertexWriter;
