use crate::{
    config::RenderSettings,
    effects::descriptor::{Direction, EffectDescriptor, EffectKind},
    foundation::{
        core::{Affine, Vec2},
        error::FramefxResult,
    },
    render::{
        blur::{blur_radius, draw_blurred},
        composite,
        sparkle::{GlintRng, draw_glint, scatter_glints},
        surface::{FrameSource, Surface},
    },
};

/// Draws one effect at one point in time.
///
/// Every call clears the surface first, so consecutive calls never accumulate. Bad but
/// recoverable descriptors (missing direction, unparseable color, unknown type) fall back to
/// defaults instead of failing; errors only come from the surface itself.
#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    settings: RenderSettings,
}

impl FrameRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn render(
        &self,
        surface: &mut Surface,
        source: &dyn FrameSource,
        effect: &EffectDescriptor,
        progress: f64,
    ) -> FramefxResult<()> {
        let p = sanitize_progress(progress);
        let k = normalized_strength(effect, p);
        tracing::trace!(kind = effect.kind.as_str(), progress = p, k, "render effect");

        surface.clear();
        match effect.kind {
            EffectKind::Fade => {
                let dir = effect.resolved_direction().unwrap_or(Direction::In);
                surface.draw_source(source, Affine::IDENTITY, fade_opacity(dir, p))
            }
            EffectKind::Zoom | EffectKind::Rotate | EffectKind::Move => {
                let t = effect_transform(effect, p, surface.width(), surface.height());
                surface.draw_source(source, t, 1.0)
            }
            EffectKind::Blur => self.render_blur(surface, source, k, p),
            EffectKind::Color => self.render_color(surface, source, effect, k, p),
            EffectKind::Sparkle => self.render_sparkle(surface, source, k, p),
            EffectKind::Unsupported => surface.draw_source(source, Affine::IDENTITY, 1.0),
        }
    }

    fn render_blur(
        &self,
        surface: &mut Surface,
        source: &dyn FrameSource,
        k: f64,
        p: f64,
    ) -> FramefxResult<()> {
        let radius = blur_radius(p * k, self.settings.max_blur_radius_px);
        draw_blurred(surface, source, radius)
    }

    fn render_color(
        &self,
        surface: &mut Surface,
        source: &dyn FrameSource,
        effect: &EffectDescriptor,
        k: f64,
        p: f64,
    ) -> FramefxResult<()> {
        surface.draw_source(source, Affine::IDENTITY, 1.0)?;
        let Some(color) = effect.resolved_color() else {
            return Ok(());
        };
        let alpha =
            color_alpha(k, p, self.settings.color_alpha_cap) * (f32::from(color.a) / 255.0);
        composite::overlay_tint_in_place(surface.data_mut(), [color.r, color.g, color.b], alpha)
    }

    fn render_sparkle(
        &self,
        surface: &mut Surface,
        source: &dyn FrameSource,
        k: f64,
        p: f64,
    ) -> FramefxResult<()> {
        surface.draw_source(source, Affine::IDENTITY, 1.0)?;
        let count = glint_count(k, self.settings.max_glints);
        if count == 0 {
            return Ok(());
        }
        let mut rng = match self.settings.sparkle_seed {
            Some(seed) => GlintRng::new(seed),
            None => GlintRng::unseeded(),
        };
        let (w, h) = (surface.width(), surface.height());
        for glint in scatter_glints(&mut rng, count, w, h, p) {
            draw_glint(surface.data_mut(), w, h, &glint);
        }
        Ok(())
    }
}

/// Normalized strength `k` of `effect` at `progress`.
///
/// Zoom, rotate and move use `intensity / 50`; blur, color and sparkle use `intensity / 100`.
/// Fade has no strength: its opacity is the progress itself.
pub fn normalized_strength(effect: &EffectDescriptor, progress: f64) -> f64 {
    let intensity = effect.intensity_at(sanitize_progress(progress));
    match effect.kind {
        EffectKind::Zoom | EffectKind::Rotate | EffectKind::Move => intensity / 50.0,
        EffectKind::Blur | EffectKind::Color | EffectKind::Sparkle => intensity / 100.0,
        EffectKind::Fade | EffectKind::Unsupported => 0.0,
    }
}

pub fn fade_opacity(direction: Direction, p: f64) -> f32 {
    let p = sanitize_progress(p);
    let opacity = if direction == Direction::Out { 1.0 - p } else { p };
    opacity as f32
}

/// `1 + p*k` zooming in, `(1 + k) - p*k` zooming out.
pub fn zoom_scale(direction: Direction, k: f64, p: f64) -> f64 {
    if direction == Direction::Out {
        (1.0 + k) - p * k
    } else {
        1.0 + p * k
    }
}

/// Radians, positive clockwise on screen.
pub fn rotation_angle(direction: Direction, k: f64, p: f64) -> f64 {
    let sign = if direction == Direction::Counterclockwise {
        -1.0
    } else {
        1.0
    };
    sign * p * k * std::f64::consts::TAU
}

/// Offset along one axis, in pixels. Left and up are negative.
pub fn move_offset(direction: Direction, k: f64, p: f64, width: u32, height: u32) -> Vec2 {
    let dx = p * k * f64::from(width);
    let dy = p * k * f64::from(height);
    match direction {
        Direction::Left => Vec2::new(-dx, 0.0),
        Direction::Up => Vec2::new(0.0, -dy),
        Direction::Down => Vec2::new(0.0, dy),
        _ => Vec2::new(dx, 0.0),
    }
}

pub fn color_alpha(k: f64, p: f64, cap: f32) -> f32 {
    ((p * k) as f32).clamp(0.0, cap.clamp(0.0, 1.0))
}

pub fn glint_count(k: f64, max_glints: u32) -> u32 {
    (k.clamp(0.0, 1.0) * f64::from(max_glints)).round() as u32
}

/// The geometric transform a zoom, rotate or move effect applies on a `width x height`
/// surface. Identity for every other kind.
pub fn effect_transform(
    effect: &EffectDescriptor,
    progress: f64,
    width: u32,
    height: u32,
) -> Affine {
    let p = sanitize_progress(progress);
    let k = normalized_strength(effect, p);
    let center = Vec2::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
    let about_center = |t: Affine| Affine::translate(center) * t * Affine::translate(-center);

    match (effect.kind, effect.resolved_direction()) {
        (EffectKind::Zoom, Some(dir)) => about_center(Affine::scale(zoom_scale(dir, k, p))),
        (EffectKind::Rotate, Some(dir)) => about_center(Affine::rotate(rotation_angle(dir, k, p))),
        (EffectKind::Move, Some(dir)) => Affine::translate(move_offset(dir, k, p, width, height)),
        _ => Affine::IDENTITY,
    }
}

fn sanitize_progress(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
