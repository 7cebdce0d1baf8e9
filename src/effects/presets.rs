use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    effects::descriptor::{Direction, EffectDescriptor},
    foundation::error::{FramefxError, FramefxResult},
};

/// A named, reusable effect configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: EffectDescriptor,
    pub duration_secs: f64,
}

impl Preset {
    pub fn validate(&self) -> FramefxResult<()> {
        if self.id.trim().is_empty() {
            return Err(FramefxError::preset("preset id must be non-empty"));
        }
        if self.name.trim().is_empty() {
            return Err(FramefxError::preset("preset name must be non-empty"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(FramefxError::preset(format!(
                "preset '{}' duration must be > 0",
                self.id
            )));
        }
        self.effect
            .validate()
            .map_err(|e| FramefxError::preset(format!("preset '{}': {e}", self.id)))
    }
}

/// Persistence capability for user presets.
pub trait PresetStore {
    /// Insert or replace (by id) a preset.
    fn save(&self, preset: Preset) -> FramefxResult<()>;
    /// All stored presets in insertion order.
    fn list(&self) -> FramefxResult<Vec<Preset>>;
}

#[derive(Debug, Default)]
pub struct InMemoryPresetStore {
    presets: Mutex<Vec<Preset>>,
}

impl InMemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetStore for InMemoryPresetStore {
    fn save(&self, preset: Preset) -> FramefxResult<()> {
        preset.validate()?;
        let mut presets = self
            .presets
            .lock()
            .map_err(|_| FramefxError::preset("preset store lock poisoned"))?;
        upsert(&mut presets, preset);
        Ok(())
    }

    fn list(&self) -> FramefxResult<Vec<Preset>> {
        let presets = self
            .presets
            .lock()
            .map_err(|_| FramefxError::preset("preset store lock poisoned"))?;
        Ok(presets.clone())
    }
}

/// Presets kept as a pretty-printed JSON array in a single file.
#[derive(Debug)]
pub struct JsonFilePresetStore {
    path: PathBuf,
}

impl JsonFilePresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> FramefxResult<Vec<Preset>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read preset store '{}'", self.path.display()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl PresetStore for JsonFilePresetStore {
    fn save(&self, preset: Preset) -> FramefxResult<()> {
        preset.validate()?;
        let mut presets = self.read_all()?;
        upsert(&mut presets, preset);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create preset dir '{}'", parent.display()))?;
        }
        let json = serde_json::to_vec_pretty(&presets)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write preset store '{}'", self.path.display()))?;
        Ok(())
    }

    fn list(&self) -> FramefxResult<Vec<Preset>> {
        self.read_all()
    }
}

fn upsert(presets: &mut Vec<Preset>, preset: Preset) {
    match presets.iter_mut().find(|p| p.id == preset.id) {
        Some(existing) => *existing = preset,
        None => presets.push(preset),
    }
}

/// The stock presets offered by the editor.
pub fn builtin_presets() -> Vec<Preset> {
    fn preset(
        id: &str,
        name: &str,
        description: &str,
        effect: EffectDescriptor,
        secs: f64,
    ) -> Preset {
        Preset {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            effect,
            duration_secs: secs,
        }
    }

    vec![
        preset(
            "smooth-fade-in",
            "Smooth Fade In",
            "Gently fades in your image",
            EffectDescriptor::fade(Direction::In, 60),
            3.0,
        ),
        preset(
            "dramatic-fade-out",
            "Dramatic Fade Out",
            "Dramatically fades out your image",
            EffectDescriptor::fade(Direction::Out, 75),
            4.0,
        ),
        preset(
            "quick-zoom",
            "Quick Zoom",
            "Rapidly zooms in on your image",
            EffectDescriptor::zoom(Direction::In, 80),
            2.0,
        ),
        preset(
            "slow-rotate",
            "Slow Rotate",
            "Slowly rotates your image clockwise",
            EffectDescriptor::rotate(Direction::Clockwise, 40),
            6.0,
        ),
        preset(
            "bounce-move",
            "Bounce Move",
            "Moves your image to the right with bounce effect",
            EffectDescriptor::moving(Direction::Right, 70),
            3.0,
        ),
        preset(
            "dreamy-blur",
            "Dreamy Blur",
            "Creates a dreamy blur effect on your image",
            EffectDescriptor::blur(65),
            4.0,
        ),
        preset(
            "warm-overlay",
            "Warm Overlay",
            "Adds a warm orange glow to your image",
            EffectDescriptor::color("#ff9d00", 50),
            3.0,
        ),
        preset(
            "cool-overlay",
            "Cool Overlay",
            "Adds a cool blue tone to your image",
            EffectDescriptor::color("#0088ff", 45),
            3.0,
        ),
        preset(
            "gentle-sparkle",
            "Gentle Sparkle",
            "Adds subtle sparkling effects across your image",
            EffectDescriptor::sparkle(55),
            5.0,
        ),
        preset(
            "cinematic-intro",
            "Cinematic Intro",
            "Create a dramatic cinematic introduction",
            EffectDescriptor::fade(Direction::In, 90),
            5.0,
        ),
        preset(
            "quick-pulse",
            "Quick Pulse",
            "Quick pulsing zoom effect",
            EffectDescriptor::zoom(Direction::In, 50),
            1.0,
        ),
        preset(
            "spiral-rotate",
            "Spiral Rotate",
            "Rotating spiral effect",
            EffectDescriptor::rotate(Direction::Clockwise, 90),
            4.0,
        ),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/effects/presets.rs"]
mod tests;
