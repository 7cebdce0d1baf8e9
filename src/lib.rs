//! framefx is a frame animation compositing engine.
//!
//! It takes a still image (or a short run of decoded video frames) plus one or more effect
//! descriptors and produces animated frames:
//!
//! - Render one effect at one point in time with [`FrameRenderer`]
//! - Layer several effects with [`EffectStack`]
//! - Loop a live preview on a host scheduler with [`PreviewDriver`]
//! - Sample a whole export in order into a [`FrameSink`] with [`ExportSampler`]
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod effects;
pub mod encode;
pub mod export;
pub mod foundation;
pub mod preview;
pub mod render;

pub use crate::animation::progress::{LoopShape, export_progress, preview_progress};
pub use crate::config::{EngineConfig, PreviewSettings, RenderSettings};
pub use crate::effects::descriptor::{Direction, EffectDescriptor, EffectKind, Keyframe};
pub use crate::effects::presets::{
    InMemoryPresetStore, JsonFilePresetStore, Preset, PresetStore, builtin_presets,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoCodec};
pub use crate::encode::gif::GifSink;
pub use crate::encode::output::{OutputFormat, sink_for_path};
pub use crate::encode::sink::{ExportFrame, FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::export::sampler::{CancelToken, ExportOutcome, ExportProgress, ExportSampler};
pub use crate::export::settings::{ExportSettings, Quality};
pub use crate::foundation::color::ColorRgba8;
pub use crate::foundation::core::{Affine, Fps, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{FramefxError, FramefxResult};
pub use crate::preview::clock::{Clock, ManualClock, SystemClock};
pub use crate::preview::driver::{PreviewDriver, PreviewState, SharedSource};
pub use crate::preview::scheduler::{CallbackId, FrameCallback, FrameScheduler, ManualScheduler};
pub use crate::render::renderer::FrameRenderer;
pub use crate::render::stack::EffectStack;
pub use crate::render::surface::{FrameRGBA, FrameSource, SourceImage, Surface, VideoFrame};
