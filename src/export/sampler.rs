use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    animation::progress::export_progress_values,
    effects::descriptor::EffectDescriptor,
    encode::sink::{ExportFrame, FrameSink, InMemorySink, SinkConfig},
    export::settings::ExportSettings,
    foundation::error::{FramefxError, FramefxResult},
    render::{
        stack::EffectStack,
        surface::{FrameRGBA, FrameSource, Surface},
    },
};

/// Cooperative cancellation flag shared between an export and whoever may stop it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Reported after every frame handed to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    pub frames_completed: u64,
    pub total_frames: u64,
}

impl ExportProgress {
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.frames_completed as f64 / self.total_frames as f64
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed { frames: u64 },
    Cancelled { frames_done: u64 },
}

/// Renders every frame of an export in order and streams them into a [`FrameSink`].
///
/// With fewer sources than frames, frame `i` uses source `i % sources.len()`; a single
/// still is simply re-rendered at advancing progress.
#[derive(Clone, Debug, Default)]
pub struct ExportSampler {
    stack: EffectStack,
}

impl ExportSampler {
    pub fn new(stack: EffectStack) -> Self {
        Self { stack }
    }

    #[tracing::instrument(skip_all, fields(
        sources = sources.len(),
        effects = effects.len(),
        duration_secs = settings.duration_secs,
    ))]
    pub fn run<S, K>(
        &self,
        sources: &[S],
        effects: &[EffectDescriptor],
        settings: &ExportSettings,
        sink: &mut K,
        cancel: &CancelToken,
        mut on_progress: impl FnMut(ExportProgress),
    ) -> FramefxResult<ExportOutcome>
    where
        S: FrameSource,
        K: FrameSink + ?Sized,
    {
        let total = settings.total_frames()?;
        let (width, height) = common_size(sources)?;
        let mut surface = Surface::new(width, height)?;

        sink.begin(SinkConfig {
            width,
            height,
            fps: settings.frame_rate,
            total_frames: total,
            quality: settings.quality,
        })?;

        for (i, progress) in (0..total).zip(export_progress_values(total)) {
            if cancel.is_cancelled() {
                sink.abort();
                tracing::debug!(frames_done = i, "export cancelled");
                return Ok(ExportOutcome::Cancelled { frames_done: i });
            }

            let source = &sources[(i % sources.len() as u64) as usize];
            let rendered = self
                .stack
                .render_all(&mut surface, source, effects, progress)
                .and_then(|()| {
                    let frame = ExportFrame {
                        index: i,
                        timestamp_us: settings.frame_rate.frame_timestamp_us(i),
                        duration_us: settings.frame_rate.frame_duration_us(),
                        progress,
                    };
                    sink.push_frame(frame, &surface.to_frame())
                });
            if let Err(err) = rendered {
                sink.abort();
                return Err(FramefxError::export_frame(i, err));
            }
            tracing::trace!(frame = i, progress, "frame exported");

            on_progress(ExportProgress {
                frames_completed: i + 1,
                total_frames: total,
            });
        }

        if let Err(err) = sink.end() {
            sink.abort();
            return Err(err);
        }
        tracing::debug!(frames = total, "export completed");
        Ok(ExportOutcome::Completed { frames: total })
    }

    /// Render every frame into memory, in order.
    pub fn sample_all<S: FrameSource>(
        &self,
        sources: &[S],
        effects: &[EffectDescriptor],
        settings: &ExportSettings,
    ) -> FramefxResult<Vec<FrameRGBA>> {
        let mut sink = InMemorySink::new();
        self.run(
            sources,
            effects,
            settings,
            &mut sink,
            &CancelToken::new(),
            |_| {},
        )?;
        Ok(sink
            .into_frames()
            .into_iter()
            .map(|(_, pixels)| pixels)
            .collect())
    }
}

fn common_size<S: FrameSource>(sources: &[S]) -> FramefxResult<(u32, u32)> {
    let first = sources
        .first()
        .ok_or_else(|| FramefxError::validation("export needs at least one source frame"))?;
    let size = (first.width(), first.height());
    if let Some(pos) = sources
        .iter()
        .position(|s| (s.width(), s.height()) != size)
    {
        return Err(FramefxError::validation(format!(
            "source frame {pos} is {}x{}, expected {}x{}",
            sources[pos].width(),
            sources[pos].height(),
            size.0,
            size.1
        )));
    }
    Ok(size)
}

#[cfg(test)]
#[path = "../../tests/unit/export/sampler.rs"]
mod tests;
