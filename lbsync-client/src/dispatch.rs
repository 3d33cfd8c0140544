//! [`DispatchLoop`] — the dedicated thread that pumps SDK callbacks.
//!
//! # Design
//!
//! The SDK only delivers events while someone calls
//! [`CallbackManager::run_wait_callbacks`]. That call blocks, so it lives on
//! its own `std::thread` rather than a tokio worker.
//!
//! - The loop waits at most `poll` per iteration, then re-checks its stop
//!   flag. Stopping therefore takes effect within one poll interval.
//! - Handlers run on this thread. They must only settle channels or flip
//!   flags; anything that waits on a caller-held resource would stall every
//!   pending handshake.
//! - [`DispatchLoop::stop`] never joins, so it is safe to call from any
//!   thread, including the dispatch thread itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

// ---

use lbsync_domain::{CallbackManager, LbError, Result};

// ---------------------------------------------------------------------------
// DispatchLoop
// ---------------------------------------------------------------------------

pub struct DispatchLoop {
    // ---
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

// ---

impl DispatchLoop {
    // ---
    /// Start pumping `manager` on a thread named `lbsync-dispatch`.
    pub fn spawn(manager: Arc<dyn CallbackManager>, poll: Duration) -> Result<Self> {
        // ---
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("lbsync-dispatch".into())
            .spawn(move || {
                tracing::debug!(?poll, "dispatch loop started");
                while !flag.load(Ordering::Acquire) {
                    manager.run_wait_callbacks(poll);
                }
                tracing::debug!("dispatch loop exiting");
            })
            .map_err(LbError::from)?;

        Ok(Self { stop, thread })
    }

    // ---

    /// Ask the loop to exit after its current wait.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}

// ---

impl Drop for DispatchLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use std::sync::atomic::AtomicU32;
    use std::time::Instant;

    use lbsync_domain::{RemoteStatus, SessionEvent, SessionEventKind};
    use lbsync_sim::SimCallbackManager;

    use super::*;

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        // ---
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn delivers_posted_events() {
        // ---
        let manager = Arc::new(SimCallbackManager::new());
        let seen = Arc::new(AtomicU32::new(0));

        let _sub = {
            let seen = Arc::clone(&seen);
            manager.subscribe(
                SessionEventKind::Connected,
                Arc::new(move |_: &SessionEvent| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
            )
        };

        let pump = DispatchLoop::spawn(manager.clone(), Duration::from_millis(10)).unwrap();
        manager.post(SessionEvent::Connected {
            status: RemoteStatus::Ok,
        });

        assert!(wait_until(Duration::from_secs(2), || seen.load(Ordering::SeqCst) == 1));
        drop(pump);
    }

    #[test]
    fn stop_ends_the_thread_within_a_poll() {
        // ---
        let manager = Arc::new(SimCallbackManager::new());
        let pump = DispatchLoop::spawn(manager, Duration::from_millis(10)).unwrap();
        assert!(pump.is_running());

        pump.stop();
        assert!(wait_until(Duration::from_secs(2), || !pump.is_running()));
    }
}
