//! CPU compositing: surfaces, per-effect rendering and effect stacks.

pub mod blur;
pub mod composite;
pub mod renderer;
pub mod sparkle;
pub mod stack;
pub mod surface;
