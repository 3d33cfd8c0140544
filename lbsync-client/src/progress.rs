//! Inbound traffic accounting.
//!
//! [`ProgressListener`] is installed on the SDK as its network listener. It
//! keeps a running byte total and forwards each packet size to an optional
//! caller-supplied sink, which is how long downloads (large leaderboards)
//! report progress.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// ---

use lbsync_domain::NetworkListener;

// ---

use super::lock;

/// Receives the size of each inbound packet. Runs on an SDK thread.
pub type ProgressSink = Arc<dyn Fn(u64) + Send + Sync>;

// ---------------------------------------------------------------------------
// ProgressListener
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ProgressListener {
    // ---
    received: AtomicU64,
    sink: Mutex<Option<ProgressSink>>,
}

// ---

impl ProgressListener {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes received since construction.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    pub fn sink(&self) -> Option<ProgressSink> {
        lock(&self.sink).clone()
    }

    /// Replace (or clear) the sink.
    pub fn set_sink(&self, sink: Option<ProgressSink>) {
        *lock(&self.sink) = sink;
    }
}

// ---

impl NetworkListener for ProgressListener {
    fn on_incoming(&self, bytes: usize) {
        // ---
        let bytes = bytes as u64;
        self.received.fetch_add(bytes, Ordering::Relaxed);

        // Clone out so the sink runs without our lock held.
        let sink = lock(&self.sink).clone();
        if let Some(sink) = sink {
            sink(bytes);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn counts_without_a_sink() {
        let listener = ProgressListener::new();
        listener.on_incoming(100);
        listener.on_incoming(28);
        assert_eq!(listener.received(), 128);
    }

    #[test]
    fn forwards_to_the_installed_sink() {
        // ---
        let listener = ProgressListener::new();
        let seen = Arc::new(AtomicU64::new(0));
        let tally = Arc::clone(&seen);
        listener.set_sink(Some(Arc::new(move |n| {
            tally.fetch_add(n, Ordering::SeqCst);
        })));

        listener.on_incoming(64);
        listener.set_sink(None);
        listener.on_incoming(64);

        assert_eq!(seen.load(Ordering::SeqCst), 64);
        assert_eq!(listener.received(), 128);
    }

    #[test]
    fn sink_may_replace_itself() {
        // ---
        let listener = Arc::new(ProgressListener::new());
        let inner = Arc::clone(&listener);
        listener.set_sink(Some(Arc::new(move |_| inner.set_sink(None))));

        listener.on_incoming(1);
        assert!(listener.sink().is_none());
    }
}
