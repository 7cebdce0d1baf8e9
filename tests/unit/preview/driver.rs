use super::*;
use crate::{
    effects::descriptor::Direction,
    preview::{clock::ManualClock, scheduler::ManualScheduler},
    render::surface::SourceImage,
};

/// Scheduler that ignores cancellation, like a host whose callback was already in flight.
#[derive(Default)]
struct StubbornScheduler(ManualScheduler);

impl FrameScheduler for StubbornScheduler {
    fn request_frame(&self, callback: crate::preview::scheduler::FrameCallback) -> CallbackId {
        self.0.request_frame(callback)
    }

    fn cancel_frame(&self, _id: CallbackId) {}
}

struct BrokenSource;

impl FrameSource for BrokenSource {
    fn width(&self) -> u32 {
        2
    }

    fn height(&self) -> u32 {
        2
    }

    fn rgba8_premul(&self) -> &[u8] {
        &[]
    }
}

fn white(w: u32, h: u32) -> SharedSource {
    Arc::new(SourceImage::solid(w, h, [255, 255, 255, 255]).unwrap())
}

fn fade_in() -> Vec<EffectDescriptor> {
    vec![EffectDescriptor::fade(Direction::In, 50)]
}

fn driver(scheduler: Arc<dyn FrameScheduler>, clock: Arc<ManualClock>) -> PreviewDriver {
    PreviewDriver::with_clock(Surface::new(1, 1).unwrap(), scheduler, clock)
}

fn alpha_at_origin(driver: &PreviewDriver) -> u8 {
    driver.surface().lock().unwrap().data()[3]
}

#[test]
fn ticks_render_progress_from_elapsed_time() {
    let scheduler = Arc::new(ManualScheduler::new());
    let clock = Arc::new(ManualClock::new());
    let mut d = driver(scheduler.clone(), clock.clone());

    d.start(white(4, 4), fade_in(), Duration::from_secs(2)).unwrap();
    assert_eq!(d.state(), PreviewState::Running);
    assert_eq!(d.surface().lock().unwrap().width(), 4);

    clock.advance(Duration::from_millis(500));
    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(alpha_at_origin(&d), 64);

    // The loop re-arms itself every tick.
    assert_eq!(scheduler.pending(), 1);
    clock.advance(Duration::from_millis(500));
    scheduler.run_pending();
    assert_eq!(alpha_at_origin(&d), 128);

    // Sawtooth wraps back to the start after one period.
    clock.advance(Duration::from_millis(1_100));
    scheduler.run_pending();
    assert_eq!(alpha_at_origin(&d), 13);
}

#[test]
fn ping_pong_folds_back_down() {
    let scheduler = Arc::new(ManualScheduler::new());
    let clock = Arc::new(ManualClock::new());
    let mut d = driver(scheduler.clone(), clock.clone());
    d.set_loop_shape(LoopShape::PingPong);

    d.start(white(2, 2), fade_in(), Duration::from_secs(2)).unwrap();
    clock.advance(Duration::from_secs(1));
    scheduler.run_pending();
    assert_eq!(alpha_at_origin(&d), 255);
    clock.advance(Duration::from_secs(1));
    scheduler.run_pending();
    assert_eq!(alpha_at_origin(&d), 0);
}

#[test]
fn stop_is_idempotent_and_cancels_the_pending_frame() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut d = driver(scheduler.clone(), Arc::new(ManualClock::new()));
    d.stop();
    assert_eq!(d.state(), PreviewState::Idle);

    d.start(white(2, 2), fade_in(), Duration::from_secs(1)).unwrap();
    d.stop();
    d.stop();
    assert_eq!(d.state(), PreviewState::Idle);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn no_surface_writes_after_stop_even_if_a_callback_fires() {
    let scheduler = Arc::new(StubbornScheduler::default());
    let clock = Arc::new(ManualClock::new());
    let mut d = driver(scheduler.clone(), clock.clone());

    d.start(white(3, 3), fade_in(), Duration::from_secs(4)).unwrap();
    clock.advance(Duration::from_secs(1));
    scheduler.0.run_pending();
    d.stop();
    let frozen = d.surface().lock().unwrap().data().to_vec();

    // The stubborn scheduler still holds the re-armed callback.
    assert_eq!(scheduler.0.pending(), 1);
    clock.advance(Duration::from_secs(1));
    scheduler.0.run_pending();
    assert_eq!(d.surface().lock().unwrap().data(), frozen.as_slice());
    assert_eq!(scheduler.0.pending(), 0);
}

#[test]
fn starting_again_supersedes_the_running_preview() {
    let scheduler = Arc::new(StubbornScheduler::default());
    let clock = Arc::new(ManualClock::new());
    let mut d = driver(scheduler.clone(), clock.clone());

    d.start(white(2, 2), fade_in(), Duration::from_secs(1)).unwrap();
    let fade_out = vec![EffectDescriptor::fade(Direction::Out, 50)];
    d.start(white(2, 2), fade_out, Duration::from_secs(1)).unwrap();
    assert_eq!(d.state(), PreviewState::Running);

    // Both callbacks fire, only the second preview draws.
    clock.advance(Duration::from_millis(250));
    assert_eq!(scheduler.0.run_pending(), 2);
    assert_eq!(alpha_at_origin(&d), 191);
    assert_eq!(scheduler.0.pending(), 1);
}

#[test]
fn zero_duration_is_rejected() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut d = driver(scheduler.clone(), Arc::new(ManualClock::new()));
    let err = d.start(white(2, 2), fade_in(), Duration::ZERO).unwrap_err();
    assert!(matches!(err, FramefxError::Validation(_)));
    assert_eq!(d.state(), PreviewState::Idle);
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn render_failure_stops_the_preview_and_is_reported() {
    let scheduler = Arc::new(ManualScheduler::new());
    let mut d = driver(scheduler.clone(), Arc::new(ManualClock::new()));
    d.start(Arc::new(BrokenSource), fade_in(), Duration::from_secs(1))
        .unwrap();
    scheduler.run_pending();

    assert_eq!(d.state(), PreviewState::Idle);
    assert_eq!(scheduler.pending(), 0);
    assert!(matches!(d.take_error(), Some(FramefxError::Validation(_))));
    assert!(d.take_error().is_none());
}

#[test]
fn dropping_the_driver_stops_it() {
    let scheduler = Arc::new(ManualScheduler::new());
    {
        let mut d = driver(scheduler.clone(), Arc::new(ManualClock::new()));
        d.start(white(2, 2), fade_in(), Duration::from_secs(1)).unwrap();
        assert_eq!(scheduler.pending(), 1);
    }
    assert_eq!(scheduler.pending(), 0);
}
