use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::error::{Error, Result};

/// Turns frame timestamps into elapsed seconds.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { last: None }
    }

    /// Seconds since the previous tick; `0.0` on the first one.
    pub fn tick(&mut self, now: Instant) -> f64 {
        let elapsed = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
            None => 0.0,
        };
        self.last = Some(now);
        elapsed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

// Clears the running flag however the loop exits, panics included.
struct StopOnExit(Arc<AtomicBool>);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a loop started by [`animate`]. Dropping it asks the loop to
/// stop without waiting for it.
pub struct AnimationHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops the loop and waits for the current frame to finish.
    ///
    /// Fails with [`Error::AnimationNotRunning`] if the loop had already ended.
    pub fn stop(mut self) -> Result<()> {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        self.join()?;
        if !was_running {
            return Err(Error::AnimationNotRunning);
        }
        info!("Animation stopped.");
        Ok(())
    }

    /// Blocks until the callback ends the loop.
    pub fn wait(mut self) -> Result<()> {
        self.join()
    }

    fn join(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| Error::AnimationPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Calls `callback` with the seconds elapsed since the previous frame, once
/// every `frame_interval`, on a dedicated thread. The first frame gets `0.0`.
/// The loop ends when the callback returns `ControlFlow::Break` or the
/// handle is stopped.
pub fn animate<F>(frame_interval: Duration, mut callback: F) -> AnimationHandle
where
    F: FnMut(f64) -> ControlFlow<()> + Send + 'static,
{
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    info!("Starting animation at {:?} per frame.", frame_interval);

    let thread = thread::spawn(move || {
        let _guard = StopOnExit(Arc::clone(&flag));
        let mut clock = FrameClock::new();
        let mut next_frame = Instant::now();
        let mut frames: u64 = 0;

        while flag.load(Ordering::Acquire) {
            let dt = clock.tick(Instant::now());
            if callback(dt).is_break() {
                debug!("Animation callback ended the loop after {} frames.", frames + 1);
                break;
            }
            frames += 1;

            next_frame += frame_interval;
            let now = Instant::now();
            if next_frame > now {
                thread::sleep(next_frame - now);
            } else {
                // Running behind; don't try to catch up.
                next_frame = now;
            }
        }
    });

    AnimationHandle { running, thread: Some(thread) }
}
