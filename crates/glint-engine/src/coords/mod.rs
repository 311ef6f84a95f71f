//! Minimal math types.
//!
//! Only what the streaming/batching core needs: a 3D vector for viewer
//! positions and depth sorting, and a column-major 4x4 matrix for the
//! per-draw transform uniform. Anything heavier belongs to the host.

mod mat4;
mod vec3;

pub use mat4::Mat4;
pub use vec3::Vec3;
