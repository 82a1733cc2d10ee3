//! Minute-aligned refresh loop.
//!
//! Runs on its own thread, renders a fresh frame, hands it to a
//! [`FrameSink`] and then sleeps until the top of the next minute. The sleep
//! is recomputed from the wall clock every cycle so wake-ups never drift.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use image::RgbaImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::render::{ClockRenderer, TimeText};

pub trait Clock: Send {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// One rendered icon image plus its tooltip.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    pub tooltip: String,
}

impl Frame {
    pub fn render<T: Timelike>(renderer: &ClockRenderer, time: &T) -> Self {
        let text = TimeText::from_time(time);
        Self {
            image: renderer.render_text(&text),
            tooltip: text.single_line(),
        }
    }
}

#[derive(Error, Debug)]
#[error("frame receiver has gone away")]
pub struct SinkClosed;

/// Receives frames from the scheduler thread.
pub trait FrameSink: Send {
    fn present(&self, frame: Frame) -> Result<(), SinkClosed>;
}

impl FrameSink for std::sync::mpsc::Sender<Frame> {
    fn present(&self, frame: Frame) -> Result<(), SinkClosed> {
        self.send(frame).map_err(|_| SinkClosed)
    }
}

/// Cooperative stop request shared between the UI thread and the scheduler.
///
/// Waiting on the signal returns as soon as `stop` is called, so shutting
/// down does not have to sit out the rest of the minute.
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`. Returns true if a stop was requested.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = cvar
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

/// Time left until the next minute starts, given the current second.
/// Always between 1 and 60 seconds.
pub fn sleep_duration(second: u32) -> Duration {
    Duration::from_secs(60 - u64::from(second.min(59)))
}

pub struct Scheduler<C, S> {
    renderer: ClockRenderer,
    clock: C,
    sink: S,
    stop: StopSignal,
}

impl<C: Clock + 'static, S: FrameSink + 'static> Scheduler<C, S> {
    pub fn new(renderer: ClockRenderer, clock: C, sink: S, stop: StopSignal) -> Self {
        Self {
            renderer,
            clock,
            sink,
            stop,
        }
    }

    /// Run the refresh loop on the current thread until stopped or the sink
    /// closes.
    pub fn run(self) {
        info!(face = self.renderer.face_name(), "Clock scheduler started");

        while !self.stop.is_stopped() {
            let frame = Frame::render(&self.renderer, &self.clock.now());
            debug!(time = %frame.tooltip, "Presenting new frame");

            if self.sink.present(frame).is_err() {
                debug!("Frame sink closed");
                break;
            }

            let wait = sleep_duration(self.clock.now().second());
            if self.stop.wait(wait) {
                break;
            }
        }

        info!("Clock scheduler stopped");
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("clock-scheduler".to_string())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::builtin::BuiltinFace;
    use crate::render::{Canvas, LayoutOptions, LayoutPolicy};
    use chrono::NaiveDate;
    use std::sync::mpsc;
    use std::time::Instant;

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    /// Forwards frames and requests a stop once `limit` frames were seen.
    struct StoppingSink {
        tx: mpsc::Sender<Frame>,
        stop: StopSignal,
    }

    impl FrameSink for StoppingSink {
        fn present(&self, frame: Frame) -> Result<(), SinkClosed> {
            self.tx.send(frame).map_err(|_| SinkClosed)?;
            self.stop.stop();
            Ok(())
        }
    }

    fn clock_at(h: u32, m: u32, s: u32) -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(h, m, s)
                .unwrap(),
        )
    }

    fn renderer() -> ClockRenderer {
        let canvas = Canvas::new(32, 32).unwrap();
        ClockRenderer::new(
            Arc::new(BuiltinFace),
            canvas,
            LayoutOptions::for_canvas(canvas, LayoutPolicy::SingleLine),
        )
    }

    #[test]
    fn test_sleep_duration_range() {
        assert_eq!(sleep_duration(0), Duration::from_secs(60));
        assert_eq!(sleep_duration(59), Duration::from_secs(1));
        assert_eq!(sleep_duration(17), Duration::from_secs(43));
        // leap second
        assert_eq!(sleep_duration(60), Duration::from_secs(1));
        for s in 0..60 {
            let d = sleep_duration(s).as_secs();
            assert!((1..=60).contains(&d));
            assert_eq!(d, 60 - u64::from(s));
        }
    }

    #[test]
    fn test_stop_signal_wakes_waiter() {
        let stop = StopSignal::new();
        let waiter = stop.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || waiter.wait(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(50));
        stop.stop();
        assert!(handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_stop_signal_times_out() {
        let stop = StopSignal::new();
        assert!(!stop.wait(Duration::from_millis(10)));
        assert!(!stop.is_stopped());
    }

    #[test]
    fn test_scheduler_presents_frame_then_stops() {
        let stop = StopSignal::new();
        let (tx, rx) = mpsc::channel();
        let sink = StoppingSink {
            tx,
            stop: stop.clone(),
        };

        let scheduler = Scheduler::new(renderer(), clock_at(13, 5, 42), sink, stop);
        scheduler.spawn().unwrap().join().unwrap();

        let frames: Vec<Frame> = rx.try_iter().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].tooltip, "1:05");
        assert_eq!(frames[0].image.dimensions(), (32, 32));
    }

    #[test]
    fn test_scheduler_exits_when_sink_closes() {
        let (tx, rx) = mpsc::channel::<Frame>();
        drop(rx);
        let scheduler = Scheduler::new(renderer(), clock_at(9, 0, 0), tx, StopSignal::new());
        // returns instead of sleeping for a minute
        scheduler.run();
    }

    #[test]
    fn test_scheduler_does_nothing_when_already_stopped() {
        let stop = StopSignal::new();
        stop.stop();
        let (tx, rx) = mpsc::channel();
        Scheduler::new(renderer(), clock_at(9, 0, 0), tx, stop).run();
        assert!(rx.try_recv().is_err());
    }
}
