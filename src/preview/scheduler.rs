use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

pub type FrameCallback = Box<dyn FnOnce() + Send + 'static>;

/// Handle for a requested frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// The host's "call me on the next display refresh" primitive.
///
/// Each request fires at most once. Cancelling an id that already fired, or was never
/// issued, is a no-op.
pub trait FrameScheduler: Send + Sync {
    fn request_frame(&self, callback: FrameCallback) -> CallbackId;
    fn cancel_frame(&self, id: CallbackId);
}

/// Scheduler pumped explicitly by its owner, one "refresh" per [`ManualScheduler::run_pending`].
#[derive(Default)]
pub struct ManualScheduler {
    next_id: AtomicU64,
    queue: Mutex<Vec<(CallbackId, FrameCallback)>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.lock_queue().len()
    }

    /// Fire every callback queued so far, in request order.
    ///
    /// Callbacks requested while running land in the next batch. Returns how many fired.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.lock_queue());
        let fired = batch.len();
        for (_, callback) in batch {
            callback();
        }
        fired
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, Vec<(CallbackId, FrameCallback)>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> CallbackId {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_queue().push((id, callback));
        id
    }

    fn cancel_frame(&self, id: CallbackId) {
        self.lock_queue().retain(|(queued, _)| *queued != id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preview/scheduler.rs"]
mod tests;
