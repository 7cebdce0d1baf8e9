//! Frame sinks.
//!
//! Sinks consume exported frames in timeline order.

/// MP4 and WebM output via the system `ffmpeg`.
pub mod ffmpeg;
/// Animated GIF output.
pub mod gif;
/// Picking a sink from the output path.
pub mod output;
/// Sink trait and the built-in in-memory and PNG sequence sinks.
pub mod sink;
