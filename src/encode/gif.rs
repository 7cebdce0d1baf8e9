use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};

use crate::{
    encode::{
        ffmpeg::ensure_parent_dir,
        sink::{ExportFrame, FrameSink, SinkConfig},
    },
    foundation::{
        core::unpremultiply_rgba8_in_place,
        error::{FramefxError, FramefxResult},
    },
    render::surface::FrameRGBA,
};

/// Looping animated GIF written with the `image` crate's encoder.
///
/// Every frame is shown for one frame period of the export's rate. GIF stores delays in
/// hundredths of a second, so rates above 50 fps play back slower than exported.
pub struct GifSink {
    out_path: PathBuf,
    /// Encoder speed, 1 (best palette) to 30 (fastest).
    speed: i32,
    encoder: Option<GifEncoder<BufWriter<File>>>,
    cfg: Option<SinkConfig>,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("out_path", &self.out_path)
            .field("speed", &self.speed)
            .field("open", &self.encoder.is_some())
            .finish()
    }
}

impl GifSink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            speed: 10,
            encoder: None,
            cfg: None,
        }
    }

    pub fn with_speed(mut self, speed: i32) -> Self {
        self.speed = speed.clamp(1, 30);
        self
    }

    pub fn out_path(&self) -> &std::path::Path {
        &self.out_path
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> FramefxResult<()> {
        if cfg.total_frames == 0 {
            return Err(FramefxError::validation("no frames to encode"));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(FramefxError::validation(format!(
                "{}x{} is too large for a gif",
                cfg.width, cfg.height
            )));
        }
        ensure_parent_dir(&self.out_path)?;
        let file = File::create(&self.out_path)
            .with_context(|| format!("create gif '{}'", self.out_path.display()))?;

        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), self.speed);
        encoder
            .set_repeat(Repeat::Infinite)
            .context("set gif loop count")?;
        self.encoder = Some(encoder);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, _frame: ExportFrame, pixels: &FrameRGBA) -> FramefxResult<()> {
        let (Some(cfg), Some(encoder)) = (self.cfg.as_ref(), self.encoder.as_mut()) else {
            return Err(FramefxError::render("gif sink not started"));
        };
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
        let delay =
            image::Delay::from_numer_denom_ms(cfg.fps.den.saturating_mul(1000), cfg.fps.num);
        encoder
            .encode_frame(image::Frame::from_parts(img, 0, 0, delay))
            .with_context(|| format!("encode gif frame into '{}'", self.out_path.display()))?;
        Ok(())
    }

    fn end(&mut self) -> FramefxResult<()> {
        // Dropping the encoder writes the trailer and flushes the file.
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| FramefxError::render("gif sink not started"))?;
        drop(encoder);
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        if self.encoder.take().is_some() {
            let _ = std::fs::remove_file(&self.out_path);
        }
        self.cfg = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
