//! CPU-side draw batching.
//!
//! Many small draw requests issued between `begin_batch` and `end_batch`
//! coalesce into one upload + one draw call per draw-state key. Appending is
//! pure CPU work (amortized `Vec` growth); all GPU interaction happens at
//! commit time in [`crate::render::Overlay`].

mod accumulator;
mod scope;

pub use accumulator::{Accumulator, DrawKey};
pub use scope::{BatchState, Transition};
