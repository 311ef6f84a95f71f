//! GPU device and surface bootstrap.
//!
//! Hosts that already own a wgpu device can construct a
//! [`crate::backend::WgpuBackend`] directly; this module is for standalone
//! use: instance/adapter/device/queue creation, surface (swapchain)
//! configuration and per-frame texture acquisition.

mod gpu;

pub use gpu::{Frame, Gpu, GpuInit, SurfaceAction};
