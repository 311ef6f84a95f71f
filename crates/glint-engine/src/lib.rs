//! Glint engine crate.
//!
//! Streaming GPU buffer allocation and render batching for runtime-generated
//! geometry: overlays, world-space highlight boxes, lines, particles, widget
//! quads. Many independent producers append transient vertex bytes; this crate
//! coalesces them per draw-state key, uploads through a small set of growable
//! ring buffers, and issues one draw call per key — without stalling the GPU
//! and without freeing a buffer the GPU may still be reading.
//!
//! Entry point for consumers is [`render::Overlay`]. The GPU is reached only
//! through the [`backend::GpuBackend`] trait; [`backend::WgpuBackend`] is the
//! shipped implementation and [`device::Gpu`] bootstraps a wgpu device/surface
//! for hosts that don't already own one.

pub mod backend;
pub mod batch;
pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod pipeline;
pub mod render;
pub mod stream;
pub mod submit;
pub mod vertex;
