use crate::{
    effects::descriptor::EffectDescriptor,
    foundation::{core::Affine, error::FramefxResult},
    render::{
        renderer::FrameRenderer,
        surface::{FrameSource, Surface},
    },
};

/// Applies a list of effects in order at one shared progress.
///
/// Effects compose cumulatively: each one renders the surface as the previous effects left
/// it, so `[zoom, fade]` fades the zoomed image.
#[derive(Clone, Debug, Default)]
pub struct EffectStack {
    renderer: FrameRenderer,
}

impl EffectStack {
    pub fn new(renderer: FrameRenderer) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    pub fn render_all(
        &self,
        surface: &mut Surface,
        source: &dyn FrameSource,
        effects: &[EffectDescriptor],
        progress: f64,
    ) -> FramefxResult<()> {
        surface.clear();
        surface.draw_source(source, Affine::IDENTITY, 1.0)?;
        for effect in effects {
            let layer = surface.snapshot();
            self.renderer.render(surface, &layer, effect, progress)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stack.rs"]
mod tests;
