use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    export::settings::Quality,
    foundation::{
        core::{Fps, unpremultiply_rgba8_in_place},
        error::{FramefxError, FramefxResult},
    },
    render::surface::FrameRGBA,
};

/// Handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub total_frames: u64,
    pub quality: Quality,
}

/// Where an exported frame sits on the output timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportFrame {
    pub index: u64,
    pub timestamp_us: u64,
    pub duration_us: u64,
    /// Effect progress this frame was rendered at.
    pub progress: f64,
}

/// Consumer of rendered frames (an encoder, a muxer, a test buffer).
///
/// `push_frame` is called in strictly increasing `index` order between `begin` and `end`.
/// When an export fails or is cancelled, `abort` is called instead of `end`.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> FramefxResult<()>;
    fn push_frame(&mut self, frame: ExportFrame, pixels: &FrameRGBA) -> FramefxResult<()>;
    fn end(&mut self) -> FramefxResult<()>;

    /// Discard anything produced so far.
    fn abort(&mut self) {}
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(ExportFrame, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn frames(&self) -> &[(ExportFrame, FrameRGBA)] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<(ExportFrame, FrameRGBA)> {
        self.frames
    }

    /// `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefxResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: ExportFrame, pixels: &FrameRGBA) -> FramefxResult<()> {
        self.frames.push((frame, pixels.clone()));
        Ok(())
    }

    fn end(&mut self) -> FramefxResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
    }
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
    cfg: Option<SinkConfig>,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
            cfg: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:05}.png"))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefxResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        self.written.clear();
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: ExportFrame, pixels: &FrameRGBA) -> FramefxResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FramefxError::render("png sink not started"))?;
        if pixels.width != cfg.width || pixels.height != cfg.height {
            return Err(FramefxError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                pixels.width, pixels.height, cfg.width, cfg.height
            )));
        }

        let mut rgba = pixels.data.clone();
        if pixels.premultiplied {
            unpremultiply_rgba8_in_place(&mut rgba);
        }
        let img = image::RgbaImage::from_raw(pixels.width, pixels.height, rgba)
            .ok_or_else(|| FramefxError::validation("frame data size mismatch"))?;

        let path = self.frame_path(frame.index);
        img.save(&path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> FramefxResult<()> {
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        self.cfg = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
