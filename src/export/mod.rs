//! Frame-accurate export of an effect over a fixed duration.

pub mod sampler;
pub mod settings;
