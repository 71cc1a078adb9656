//! Debounce timer and run tokens.
//!
//! A [`Debouncer`] holds at most one pending timer; scheduling again aborts
//! it. Once a timer fires its work is detached, so a later change never
//! cancels a run that already started. Staleness is instead detected with
//! [`RunToken`]s: every run takes a fresh token from a [`TokenIssuer`] and
//! only applies results while its token is still the latest.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::trace;

/// Monotonic identifier of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunToken(u64);

impl RunToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Issues strictly increasing run tokens.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    latest: AtomicU64,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token newer than every token issued before.
    pub fn issue(&self) -> RunToken {
        RunToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` is the most recently issued one.
    pub fn is_current(&self, token: RunToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> Option<RunToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RunToken(n)),
        }
    }
}

/// Single-slot trailing-edge debounce timer.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `work` after the quiet period, replacing any pending timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        // Held across the spawn so concurrent schedules install in order.
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(work);
        });

        if let Some(previous) = pending.replace(timer) {
            previous.abort();
            trace!("Debounce timer reset");
        }
    }

    /// Drop the pending timer, if any. Runs that already fired continue.
    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match pending.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a timer is still waiting to fire.
    pub fn is_pending(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|timer| !timer.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}
