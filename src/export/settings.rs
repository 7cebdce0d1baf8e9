use serde::{Deserialize, Serialize};

use crate::{
    animation::progress::total_frames,
    foundation::{
        core::Fps,
        error::{FramefxError, FramefxResult},
    },
};

/// Duration used when the user's input can't be read as a positive number of seconds.
pub const DEFAULT_DURATION_SECS: f64 = 5.0;
pub const DEFAULT_FRAME_RATE: u32 = 24;

/// Encoder quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub fn bitrate_bps(self) -> u64 {
        match self {
            Self::Low => 1_000_000,
            Self::Medium => 2_500_000,
            Self::High => 5_000_000,
            Self::Ultra => 12_000_000,
        }
    }

    /// Nominal output size for this tier. See [`ExportSettings::fit_to_quality`].
    pub fn resolution(self) -> (u32, u32) {
        match self {
            Self::Low => (640, 360),
            Self::Medium => (1280, 720),
            Self::High => (1920, 1080),
            Self::Ultra => (3840, 2160),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = FramefxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            other => Err(FramefxError::validation(format!(
                "unknown quality '{other}' (expected low, medium, high or ultra)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub frame_rate: Fps,
    pub duration_secs: f64,
    #[serde(default)]
    pub quality: Quality,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            frame_rate: Fps {
                num: DEFAULT_FRAME_RATE,
                den: 1,
            },
            duration_secs: DEFAULT_DURATION_SECS,
            quality: Quality::default(),
        }
    }
}

impl ExportSettings {
    pub fn new(duration_secs: f64, frame_rate: Fps) -> Self {
        Self {
            frame_rate,
            duration_secs,
            quality: Quality::default(),
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Lenient duration parsing for free-text input; anything that isn't a positive finite
    /// number becomes [`DEFAULT_DURATION_SECS`].
    pub fn parse_duration(text: &str) -> f64 {
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => v,
            _ => DEFAULT_DURATION_SECS,
        }
    }

    /// Size that fits a `width x height` source inside the quality tier's resolution.
    ///
    /// Aspect ratio is kept (up or down scaling as needed) and both sides are rounded to
    /// even numbers, which yuv420p video requires.
    pub fn fit_to_quality(&self, width: u32, height: u32) -> FramefxResult<(u32, u32)> {
        if width == 0 || height == 0 {
            return Err(FramefxError::validation(format!(
                "cannot fit a {width}x{height} frame"
            )));
        }
        let (max_w, max_h) = self.quality.resolution();
        let scale =
            (f64::from(max_w) / f64::from(width)).min(f64::from(max_h) / f64::from(height));
        let even = |v: f64, max: u32| ((v.round() as u32).min(max) & !1).max(2);
        Ok((
            even(f64::from(width) * scale, max_w),
            even(f64::from(height) * scale, max_h),
        ))
    }

    /// `round(duration_secs * frame_rate)`. Zero when the duration is shorter than half a
    /// frame; the export is then an empty sequence.
    pub fn total_frames(&self) -> FramefxResult<u64> {
        if self.frame_rate.num == 0 || self.frame_rate.den == 0 {
            return Err(FramefxError::validation("frame rate must be > 0"));
        }
        total_frames(self.duration_secs, self.frame_rate)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settings.rs"]
mod tests;
