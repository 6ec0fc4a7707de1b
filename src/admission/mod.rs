//! Execution admission control: per-app sliding-window rate limiting and
//! counting-semaphore concurrency limiting.
//!
//! Both policies are independent, keyed by app id, and live for the process
//! lifetime in one controller instance that handlers share by `Arc`. Every
//! check-then-mutate runs under the map's lock, so admissions never
//! interleave per app. A successful acquire hands back a [`SlotGuard`] whose
//! `Drop` releases the slot, which covers success, business failure, and
//! panic/cancellation paths alike.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FlowError;

/// Rolling rate-limit window length.
pub const RATE_WINDOW_MS: i64 = 60_000;

#[derive(Debug, Default)]
pub struct AdmissionController {
    rate_windows: Mutex<HashMap<String, Vec<i64>>>,
    slots: Mutex<HashMap<String, i64>>,
}

impl AdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sliding-window rate check: prune entries older than the window, then
    /// count. Admission appends the current timestamp. `limit <= 0` disables
    /// the check entirely.
    pub fn check_rate(&self, app_id: &str, limit: i64) -> Result<(), FlowError> {
        self.check_rate_at(app_id, limit, Utc::now().timestamp_millis())
    }

    /// Clock-injected variant of [`check_rate`](Self::check_rate).
    pub fn check_rate_at(&self, app_id: &str, limit: i64, now_ms: i64) -> Result<(), FlowError> {
        if limit <= 0 {
            return Ok(());
        }
        let mut windows = self.rate_windows.lock();
        let window = windows.entry(app_id.to_string()).or_default();
        window.retain(|stamp| now_ms - *stamp < RATE_WINDOW_MS);
        if window.len() as i64 >= limit {
            tracing::debug!(app_id, limit, "rate limit rejection");
            return Err(FlowError::RateLimited(app_id.to_string()));
        }
        window.push(now_ms);
        Ok(())
    }

    /// Acquire one concurrency slot. `limit <= 0` always succeeds but still
    /// counts, so `in_flight` stays meaningful.
    pub fn acquire(
        self: &Arc<Self>,
        app_id: &str,
        limit: i64,
    ) -> Result<SlotGuard, FlowError> {
        {
            let mut slots = self.slots.lock();
            let count = slots.entry(app_id.to_string()).or_insert(0);
            if limit > 0 && *count >= limit {
                tracing::debug!(app_id, limit, in_flight = *count, "concurrency rejection");
                return Err(FlowError::ConcurrencyLimited(app_id.to_string()));
            }
            *count += 1;
        }
        Ok(SlotGuard {
            controller: Arc::clone(self),
            app_id: app_id.to_string(),
        })
    }

    /// Decrement the app's slot counter, floored at zero.
    fn release(&self, app_id: &str) {
        let mut slots = self.slots.lock();
        if let Some(count) = slots.get_mut(app_id) {
            if *count > 0 {
                *count -= 1;
            }
        }
    }

    /// Current in-flight count for an app.
    pub fn in_flight(&self, app_id: &str) -> i64 {
        self.slots.lock().get(app_id).copied().unwrap_or(0)
    }

    /// Unpruned length of the app's rate window.
    pub fn window_len(&self, app_id: &str) -> usize {
        self.rate_windows
            .lock()
            .get(app_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// One held concurrency slot. Dropping it releases the slot exactly once.
#[must_use = "dropping the guard releases the concurrency slot"]
#[derive(Debug)]
pub struct SlotGuard {
    controller: Arc<AdmissionController>,
    app_id: String,
}

impl SlotGuard {
    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.controller.release(&self.app_id);
    }
}
