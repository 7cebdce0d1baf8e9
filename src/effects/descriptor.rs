use serde::{Deserialize, Serialize};

use crate::foundation::{
    color::ColorRgba8,
    error::{FramefxError, FramefxResult},
};

/// Lowest intensity the editor lets a user pick.
pub const INTENSITY_MIN: u32 = 10;
/// Highest intensity the editor lets a user pick.
pub const INTENSITY_MAX: u32 = 100;

/// Which rendering algorithm an effect uses.
///
/// `Unsupported` is never constructed by hand; it is what an unknown `type` string
/// deserializes to, and it renders the source unmodified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    /// Opacity ramp.
    Fade,
    /// Scale about the surface center.
    Zoom,
    /// Rotation about the surface center.
    Rotate,
    /// Linear translation along one axis.
    Move,
    /// Gaussian-like softening.
    Blur,
    /// Tinted color overlay.
    Color,
    /// Twinkling glints over the source.
    Sparkle,
    /// Unrecognized effect type.
    #[serde(other)]
    Unsupported,
}

impl EffectKind {
    /// Every kind the renderer knows how to draw.
    pub const ALL: [EffectKind; 7] = [
        Self::Fade,
        Self::Zoom,
        Self::Rotate,
        Self::Move,
        Self::Blur,
        Self::Color,
        Self::Sparkle,
    ];

    /// Directions that mean something for this kind.
    pub fn valid_directions(self) -> &'static [Direction] {
        match self {
            Self::Fade | Self::Zoom => &[Direction::In, Direction::Out],
            Self::Rotate => &[Direction::Clockwise, Direction::Counterclockwise],
            Self::Move => &[
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ],
            Self::Blur | Self::Color | Self::Sparkle | Self::Unsupported => &[],
        }
    }

    /// Direction used when none (or an invalid one) is given.
    pub fn default_direction(self) -> Option<Direction> {
        match self {
            Self::Fade | Self::Zoom => Some(Direction::In),
            Self::Rotate => Some(Direction::Clockwise),
            Self::Move => Some(Direction::Right),
            Self::Blur | Self::Color | Self::Sparkle | Self::Unsupported => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Zoom => "zoom",
            Self::Rotate => "rotate",
            Self::Move => "move",
            Self::Blur => "blur",
            Self::Color => "color",
            Self::Sparkle => "sparkle",
            Self::Unsupported => "unsupported",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    Left,
    Right,
    Up,
    Down,
    Clockwise,
    Counterclockwise,
}

/// One point of an intensity curve. `position` is a percentage of the effect's duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: f64,
    pub intensity: f64,
}

/// Immutable description of one effect instance.
///
/// Descriptors are never mutated by the engine; edits produce a new value via the
/// `with_*` builders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub intensity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<Keyframe>>,
}

impl EffectDescriptor {
    pub fn new(kind: EffectKind, intensity: u32) -> Self {
        Self {
            kind,
            intensity,
            direction: None,
            color: None,
            keyframes: None,
        }
    }

    pub fn fade(direction: Direction, intensity: u32) -> Self {
        Self::new(EffectKind::Fade, intensity).with_direction(direction)
    }

    pub fn zoom(direction: Direction, intensity: u32) -> Self {
        Self::new(EffectKind::Zoom, intensity).with_direction(direction)
    }

    pub fn rotate(direction: Direction, intensity: u32) -> Self {
        Self::new(EffectKind::Rotate, intensity).with_direction(direction)
    }

    pub fn moving(direction: Direction, intensity: u32) -> Self {
        Self::new(EffectKind::Move, intensity).with_direction(direction)
    }

    pub fn blur(intensity: u32) -> Self {
        Self::new(EffectKind::Blur, intensity)
    }

    pub fn color(color: impl Into<String>, intensity: u32) -> Self {
        Self::new(EffectKind::Color, intensity).with_color(color)
    }

    pub fn sparkle(intensity: u32) -> Self {
        Self::new(EffectKind::Sparkle, intensity)
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_intensity(mut self, intensity: u32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = Some(keyframes);
        self
    }

    /// The direction the renderer will actually use: the given one if it is valid for this
    /// kind, otherwise the kind's default.
    pub fn resolved_direction(&self) -> Option<Direction> {
        match self.direction {
            Some(d) if self.kind.valid_directions().contains(&d) => Some(d),
            _ => self.kind.default_direction(),
        }
    }

    /// Overlay color for `Color` effects; `None` when missing or unparseable.
    pub fn resolved_color(&self) -> Option<ColorRgba8> {
        self.color
            .as_deref()
            .and_then(|c| ColorRgba8::parse(c).ok())
    }

    /// Effective intensity (0..=100) at `progress`.
    ///
    /// Keyframes, when present, are interpolated linearly and held flat beyond the first and
    /// last positions. Otherwise the base intensity applies.
    pub fn intensity_at(&self, progress: f64) -> f64 {
        let base = f64::from(self.intensity);
        let raw = match self.keyframes.as_deref() {
            Some(kfs) if !kfs.is_empty() => sample_keyframes(kfs, progress).unwrap_or(base),
            _ => base,
        };
        raw.clamp(0.0, f64::from(INTENSITY_MAX))
    }

    /// Strict check used when persisting presets or accepting user input.
    ///
    /// The renderer itself never calls this; it falls back to defaults instead.
    pub fn validate(&self) -> FramefxResult<()> {
        if self.kind == EffectKind::Unsupported {
            return Err(FramefxError::validation("unsupported effect type"));
        }
        if !(INTENSITY_MIN..=INTENSITY_MAX).contains(&self.intensity) {
            return Err(FramefxError::validation(format!(
                "{} intensity must be in {INTENSITY_MIN}..={INTENSITY_MAX}, got {}",
                self.kind.as_str(),
                self.intensity
            )));
        }
        if let Some(d) = self.direction
            && !self.kind.valid_directions().contains(&d)
        {
            return Err(FramefxError::validation(format!(
                "direction {d:?} is not valid for {} effects",
                self.kind.as_str()
            )));
        }
        if self.kind == EffectKind::Color {
            let Some(color) = self.color.as_deref() else {
                return Err(FramefxError::validation("color effect requires a color"));
            };
            ColorRgba8::parse(color)?;
        }
        if let Some(kfs) = self.keyframes.as_deref() {
            let mut prev = f64::NEG_INFINITY;
            for kf in kfs {
                if !kf.position.is_finite() || !(0.0..=100.0).contains(&kf.position) {
                    return Err(FramefxError::validation(
                        "keyframe position must be in 0..=100",
                    ));
                }
                if kf.position < prev {
                    return Err(FramefxError::validation(
                        "keyframe positions must be non-decreasing",
                    ));
                }
                if !kf.intensity.is_finite() {
                    return Err(FramefxError::validation(
                        "keyframe intensity must be finite",
                    ));
                }
                prev = kf.position;
            }
        }
        Ok(())
    }
}

fn sample_keyframes(kfs: &[Keyframe], progress: f64) -> Option<f64> {
    let pos = progress.clamp(0.0, 1.0) * 100.0;
    let first = kfs.first()?;
    let last = kfs.last()?;
    if !first.intensity.is_finite() || !last.intensity.is_finite() {
        return None;
    }
    if pos <= first.position {
        return Some(first.intensity);
    }
    if pos >= last.position {
        return Some(last.intensity);
    }

    let seg = kfs
        .windows(2)
        .find(|w| w[0].position <= pos && pos <= w[1].position)?;
    let (a, b) = (seg[0], seg[1]);
    let span = b.position - a.position;
    if span <= 0.0 {
        return Some(b.intensity);
    }
    let t = (pos - a.position) / span;
    let v = a.intensity + (b.intensity - a.intensity) * t;
    v.is_finite().then_some(v)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/descriptor.rs"]
mod tests;
