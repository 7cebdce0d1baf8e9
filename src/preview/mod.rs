//! Looping previews driven by a host frame scheduler.

pub mod clock;
pub mod driver;
pub mod scheduler;
