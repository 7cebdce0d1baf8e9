use serde::{Deserialize, Serialize};

use crate::animation::progress::LoopShape;

/// Tunables for the stylistic effects. Geometric effects (fade/zoom/rotate/move) have no knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Blur radius reached at `progress = 1` and intensity 100.
    pub max_blur_radius_px: u32,
    /// Glint count at intensity 100.
    pub max_glints: u32,
    /// Upper bound on the color overlay's alpha so the source stays visible.
    pub color_alpha_cap: f32,
    /// Fixed seed for glint placement. `None` scatters glints differently on every call.
    pub sparkle_seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_blur_radius_px: 24,
            max_glints: 60,
            color_alpha_cap: 0.7,
            sparkle_seed: None,
        }
    }
}

impl RenderSettings {
    /// Defaults with `FRAMEFX_MAX_BLUR_RADIUS`, `FRAMEFX_MAX_GLINTS` and `FRAMEFX_SPARKLE_SEED`
    /// applied on top.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<u32>("FRAMEFX_MAX_BLUR_RADIUS") {
            self.max_blur_radius_px = v.min(256);
        }
        if let Some(v) = env_parse::<u32>("FRAMEFX_MAX_GLINTS").filter(|&n| n > 0) {
            self.max_glints = v;
        }
        if let Some(v) = env_parse::<u64>("FRAMEFX_SPARKLE_SEED") {
            self.sparkle_seed = Some(v);
        }
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub loop_shape: LoopShape,
}

/// Everything a host can configure, loadable from one JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub render: RenderSettings,
    pub preview: PreviewSettings,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> crate::FramefxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
