use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    animation::progress::{LoopShape, preview_progress},
    effects::descriptor::EffectDescriptor,
    foundation::error::{FramefxError, FramefxResult},
    preview::{
        clock::{Clock, SystemClock},
        scheduler::{CallbackId, FrameScheduler},
    },
    render::{
        stack::EffectStack,
        surface::{FrameSource, Surface},
    },
};

pub type SharedSource = Arc<dyn FrameSource + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Running,
}

/// Loops an effect stack over a source on the host's frame scheduler.
///
/// At most one preview runs per driver. Starting a new one stops the old one first, and
/// once [`PreviewDriver::stop`] returns no tick will touch the surface again, even if the
/// scheduler still fires a callback it was asked to cancel.
pub struct PreviewDriver {
    shared: Arc<Shared>,
    stack: EffectStack,
    loop_shape: LoopShape,
    task: Option<Arc<PreviewTask>>,
}

struct Shared {
    surface: Arc<Mutex<Surface>>,
    scheduler: Arc<dyn FrameScheduler>,
    clock: Arc<dyn Clock>,
    last_error: Mutex<Option<FramefxError>>,
}

struct PreviewTask {
    running: AtomicBool,
    pending: Mutex<Option<CallbackId>>,
    source: SharedSource,
    effects: Vec<EffectDescriptor>,
    duration: Duration,
    loop_shape: LoopShape,
    stack: EffectStack,
    started_at: Duration,
}

impl std::fmt::Debug for PreviewDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewDriver")
            .field("state", &self.state())
            .field("loop_shape", &self.loop_shape)
            .finish_non_exhaustive()
    }
}

impl PreviewDriver {
    pub fn new(surface: Surface, scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self::with_clock(surface, scheduler, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        surface: Surface,
        scheduler: Arc<dyn FrameScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                surface: Arc::new(Mutex::new(surface)),
                scheduler,
                clock,
                last_error: Mutex::new(None),
            }),
            stack: EffectStack::default(),
            loop_shape: LoopShape::default(),
            task: None,
        }
    }

    /// Effect stack used by previews started after this call.
    pub fn set_stack(&mut self, stack: EffectStack) {
        self.stack = stack;
    }

    /// Loop shape used by previews started after this call.
    pub fn set_loop_shape(&mut self, loop_shape: LoopShape) {
        self.loop_shape = loop_shape;
    }

    /// The surface previews draw into. Lock it to read the latest frame.
    pub fn surface(&self) -> Arc<Mutex<Surface>> {
        Arc::clone(&self.shared.surface)
    }

    pub fn state(&self) -> PreviewState {
        match &self.task {
            Some(task) if task.running.load(Ordering::Acquire) => PreviewState::Running,
            _ => PreviewState::Idle,
        }
    }

    /// The error that stopped the last preview, if any. Cleared by reading it.
    pub fn take_error(&self) -> Option<FramefxError> {
        lock(&self.shared.last_error).take()
    }

    /// Start looping `effects` over `source` with a period of `duration`.
    ///
    /// Any running preview is stopped first. The surface is resized to the source if needed.
    pub fn start(
        &mut self,
        source: SharedSource,
        effects: Vec<EffectDescriptor>,
        duration: Duration,
    ) -> FramefxResult<()> {
        if self.state() == PreviewState::Running {
            tracing::debug!("superseding running preview");
        }
        self.stop();

        if duration.is_zero() {
            return Err(FramefxError::validation("preview duration must be > 0"));
        }
        {
            let mut surface = lock(&self.shared.surface);
            if surface.width() != source.width() || surface.height() != source.height() {
                *surface = Surface::for_source(&*source)?;
            }
        }
        lock(&self.shared.last_error).take();

        let task = Arc::new(PreviewTask {
            running: AtomicBool::new(true),
            pending: Mutex::new(None),
            source,
            effects,
            duration,
            loop_shape: self.loop_shape,
            stack: self.stack.clone(),
            started_at: self.shared.clock.now(),
        });
        tracing::debug!(
            effects = task.effects.len(),
            duration_ms = duration.as_millis() as u64,
            "preview started"
        );
        schedule(&self.shared, &task);
        self.task = Some(task);
        Ok(())
    }

    /// Stop the running preview. Safe to call at any time, any number of times.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        {
            // Waits out an in-flight tick; every later tick sees `running == false`.
            let _surface = lock(&self.shared.surface);
            task.running.store(false, Ordering::Release);
        }
        if let Some(id) = lock(&task.pending).take() {
            self.shared.scheduler.cancel_frame(id);
        }
        tracing::debug!("preview stopped");
    }
}

impl Drop for PreviewDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule(shared: &Arc<Shared>, task: &Arc<PreviewTask>) {
    let mut pending = lock(&task.pending);
    if !task.running.load(Ordering::Acquire) {
        return;
    }
    let weak: Weak<Shared> = Arc::downgrade(shared);
    let task_for_tick = Arc::clone(task);
    let id = shared.scheduler.request_frame(Box::new(move || {
        if let Some(shared) = weak.upgrade() {
            tick(&shared, &task_for_tick);
        }
    }));
    *pending = Some(id);
}

fn tick(shared: &Arc<Shared>, task: &Arc<PreviewTask>) {
    {
        let mut surface = lock(&shared.surface);
        if !task.running.load(Ordering::Acquire) {
            return;
        }
        let elapsed = shared.clock.now().saturating_sub(task.started_at);
        let progress = preview_progress(elapsed, task.duration, task.loop_shape);
        let rendered = task
            .stack
            .render_all(&mut surface, &*task.source, &task.effects, progress);
        if let Err(err) = rendered {
            task.running.store(false, Ordering::Release);
            lock(&task.pending).take();
            tracing::debug!(error = %err, "preview stopped by render failure");
            *lock(&shared.last_error) = Some(err);
            return;
        }
    }
    schedule(shared, task);
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "../../tests/unit/preview/driver.rs"]
mod tests;
