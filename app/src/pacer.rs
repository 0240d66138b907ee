//! Fixed-rate frame pacing.
//!
//! A [`FramePacer`] owns one background thread that calls a render callback
//! at the target rate. Each call bumps a pending-frame counter which the
//! GPU-owning thread drains with [`consume_frame`](FramePacer::consume_frame).
//! The pacer itself never touches the GPU.
//!
//! # Example
//!
//! ```
//! use lumenwall_app::FramePacer;
//!
//! let mut pacer = FramePacer::new();
//! pacer.set_target_fps(60);
//! pacer.set_callback(|| {});
//! pacer.run().unwrap();
//! pacer.stop().unwrap();
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Target rate a new pacer starts with.
pub const DEFAULT_FPS: u32 = 15;

type FrameCallback = Box<dyn FnMut() + Send>;

/// Errors reported by the frame pacer.
#[derive(Debug, thiserror::Error)]
pub enum PacerError {
    /// `stop` was called from inside the cadence loop, which would join itself.
    #[error("frame pacer cannot be stopped from its own cadence thread")]
    StopFromCadenceThread,
    /// The cadence thread could not be started.
    #[error("failed to spawn frame pacer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct Shared {
    running: Mutex<bool>,
    wake: Condvar,
    fps: AtomicU32,
    pending: AtomicU64,
    callback: Mutex<FrameCallback>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn period(&self) -> Duration {
        Duration::from_secs(1) / self.fps.load(Ordering::Relaxed).max(1)
    }

    fn cadence(&self) {
        loop {
            let anchor = Instant::now();
            self.pending.fetch_add(1, Ordering::AcqRel);
            {
                let mut callback = self.callback.lock();
                (*callback)();
            }

            let deadline = Instant::now() + self.period().saturating_sub(anchor.elapsed());
            let mut running = self.running.lock();
            while *running {
                if self.wake.wait_until(&mut running, deadline).timed_out() {
                    break;
                }
            }
            if !*running {
                break;
            }
        }
        log::debug!("Frame pacer loop exited");
    }

    fn stop(&self) -> Result<(), PacerError> {
        let handle = {
            let mut thread = self.thread.lock();
            match thread.as_ref() {
                None => return Ok(()),
                Some(handle) if handle.thread().id() == thread::current().id() => {
                    return Err(PacerError::StopFromCadenceThread);
                }
                Some(_) => {}
            }
            {
                let mut running = self.running.lock();
                *running = false;
                self.wake.notify_one();
            }
            thread.take()
        };
        if let Some(Err(_)) = handle.map(JoinHandle::join) {
            log::error!("Frame pacer callback panicked");
        }
        log::info!("Frame pacer stopped");
        Ok(())
    }

    fn has_pending_frame(&self) -> bool {
        self.pending.load(Ordering::Acquire) != 0
    }

    fn consume_frame(&self) -> bool {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Calls a render callback at a fixed rate on a background thread.
///
/// Dropping the pacer stops it.
pub struct FramePacer {
    shared: Arc<Shared>,
}

impl FramePacer {
    /// Creates a stopped pacer at [`DEFAULT_FPS`] with an empty callback.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                running: Mutex::new(false),
                wake: Condvar::new(),
                fps: AtomicU32::new(DEFAULT_FPS),
                pending: AtomicU64::new(0),
                callback: Mutex::new(Box::new(|| {})),
                thread: Mutex::new(None),
            }),
        }
    }

    /// Replaces the render callback. Takes effect from the next tick.
    ///
    /// Must not be called from inside the callback.
    pub fn set_callback(&self, callback: impl FnMut() + Send + 'static) {
        *self.shared.callback.lock() = Box::new(callback);
    }

    /// Sets the target rate. Zero is treated as one frame per second.
    pub fn set_target_fps(&self, fps: u32) {
        self.shared.fps.store(fps, Ordering::Relaxed);
    }

    /// Current target rate.
    pub fn target_fps(&self) -> u32 {
        self.shared.fps.load(Ordering::Relaxed)
    }

    /// Whether the cadence loop is running.
    pub fn is_running(&self) -> bool {
        self.shared.thread.lock().is_some()
    }

    /// Starts the cadence loop. Does nothing if it is already running.
    pub fn run(&self) -> Result<(), PacerError> {
        let mut thread = self.shared.thread.lock();
        if thread.is_some() {
            return Ok(());
        }
        *self.shared.running.lock() = true;
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("frame-pacer".into())
            .spawn(move || shared.cadence());
        match spawned {
            Ok(handle) => {
                *thread = Some(handle);
                log::info!("Frame pacer running at {} fps", self.target_fps());
                Ok(())
            }
            Err(e) => {
                *self.shared.running.lock() = false;
                Err(e.into())
            }
        }
    }

    /// Stops the cadence loop and waits for it to exit.
    ///
    /// Returns [`PacerError::StopFromCadenceThread`] when called from the
    /// callback itself.
    pub fn stop(&self) -> Result<(), PacerError> {
        self.shared.stop()
    }

    /// Whether a rendered tick is waiting to be consumed.
    pub fn has_pending_frame(&self) -> bool {
        self.shared.has_pending_frame()
    }

    /// Takes one pending tick. Returns false when there is none.
    pub fn consume_frame(&self) -> bool {
        self.shared.consume_frame()
    }

    /// A weak handle for use inside the callback or on another thread.
    pub fn handle(&self) -> PacerHandle {
        PacerHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FramePacer {
    fn drop(&mut self) {
        if let Err(e) = self.shared.stop() {
            log::error!("Frame pacer drop: {e}");
        }
    }
}

/// Non-owning access to a [`FramePacer`].
///
/// Every operation is a no-op once the pacer has been dropped.
#[derive(Clone)]
pub struct PacerHandle {
    shared: Weak<Shared>,
}

impl PacerHandle {
    /// See [`FramePacer::stop`].
    pub fn stop(&self) -> Result<(), PacerError> {
        match self.shared.upgrade() {
            Some(shared) => shared.stop(),
            None => Ok(()),
        }
    }

    /// See [`FramePacer::has_pending_frame`].
    pub fn has_pending_frame(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.has_pending_frame())
    }

    /// See [`FramePacer::consume_frame`].
    pub fn consume_frame(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.consume_frame())
    }
}
