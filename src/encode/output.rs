use std::path::{Path, PathBuf};

use crate::encode::{
    ffmpeg::{FfmpegSink, FfmpegSinkOpts},
    gif::GifSink,
    sink::{FrameSink, PngSequenceSink},
};

/// Export container, chosen from the output path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// A directory of numbered PNG files.
    PngSequence,
    Gif,
    Mp4,
    WebM,
}

impl OutputFormat {
    /// `.gif`, `.mp4` and `.webm` (any case) name files; every other path is a PNG directory.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("gif") => Self::Gif,
            Some("mp4") => Self::Mp4,
            Some("webm") => Self::WebM,
            _ => Self::PngSequence,
        }
    }

    /// Whether writing this format shells out to `ffmpeg`.
    pub fn needs_ffmpeg(self) -> bool {
        matches!(self, Self::Mp4 | Self::WebM)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PngSequence => "png",
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
        }
    }
}

/// A sink writing `path` in the format its extension names.
pub fn sink_for_path(path: impl Into<PathBuf>) -> Box<dyn FrameSink> {
    let path = path.into();
    match OutputFormat::from_path(&path) {
        OutputFormat::PngSequence => Box::new(PngSequenceSink::new(path)),
        OutputFormat::Gif => Box::new(GifSink::new(path)),
        OutputFormat::Mp4 | OutputFormat::WebM => {
            Box::new(FfmpegSink::new(FfmpegSinkOpts::new(path)))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/output.rs"]
mod tests;
