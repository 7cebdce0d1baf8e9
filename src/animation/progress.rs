use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::Fps,
    error::{FramefxError, FramefxResult},
};

/// How a looping preview folds elapsed time into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopShape {
    /// `(t mod d) / d`: ramps 0 to 1, then jumps back to 0.
    #[default]
    Sawtooth,
    /// `|sin(pi * t / d)|`: eases 0 to 1 and back to 0 once per duration.
    PingPong,
}

/// Progress for a looping preview after `elapsed` wall-clock time.
pub fn preview_progress(elapsed: Duration, duration: Duration, shape: LoopShape) -> f64 {
    let d = duration.as_secs_f64();
    if d <= 0.0 {
        return 0.0;
    }
    let t = elapsed.as_secs_f64();
    let p = match shape {
        LoopShape::Sawtooth => t.rem_euclid(d) / d,
        LoopShape::PingPong => (std::f64::consts::PI * t / d).sin().abs(),
    };
    p.clamp(0.0, 1.0)
}

/// Number of output frames for an export: `round(duration_secs * fps)`.
pub fn total_frames(duration_secs: f64, fps: Fps) -> FramefxResult<u64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(FramefxError::validation(format!(
            "export duration must be > 0 seconds, got {duration_secs}"
        )));
    }
    Ok(fps.secs_to_frames_round(duration_secs))
}

/// Progress of export frame `index` out of `total`: `index / (total - 1)`, or 0 for a
/// single-frame export.
pub fn export_progress(index: u64, total: u64) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    (index.min(total - 1) as f64) / ((total - 1) as f64)
}

/// All export progress values in frame order.
pub fn export_progress_values(total: u64) -> impl Iterator<Item = f64> {
    (0..total).map(move |i| export_progress(i, total))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/progress.rs"]
mod tests;
