//! Color types for draw modulation.

mod color;

pub use color::Color;
