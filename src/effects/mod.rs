//! Effect descriptors and reusable presets.

pub mod descriptor;
pub mod presets;
