//! Time Provider Abstraction
//!
//! The services stamp `created_at`, `updated_at`, `published_at` and legacy
//! url rows through a `TimeProvider`, so tests can pin and advance the clock
//! instead of sleeping.
//!
//! # Examples
//!
//! ```rust
//! use pagetree_core::models::time::{ManualTimeProvider, TimeProvider};
//! use chrono::Duration;
//!
//! let clock = ManualTimeProvider::new();
//! let before = clock.now();
//! clock.advance(Duration::hours(1));
//! assert_eq!(clock.now() - before, Duration::hours(1));
//! ```

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Trait for providing current time
pub trait TimeProvider: Send + Sync {
    /// Get the current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// System time provider using the actual system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
///
/// Shared behind an `Arc` by the services, so the current time sits behind
/// a mutex and `advance`/`set_time` take `&self`.
#[derive(Debug)]
pub struct ManualTimeProvider {
    current_time: Mutex<DateTime<Utc>>,
}

impl ManualTimeProvider {
    /// Start at the current system time
    pub fn new() -> Self {
        Self::with_time(Utc::now())
    }

    pub fn with_time(time: DateTime<Utc>) -> Self {
        Self {
            current_time: Mutex::new(time),
        }
    }

    pub fn set_time(&self, time: DateTime<Utc>) {
        let mut current = self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = time;
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current += duration;
    }
}

impl Default for ManualTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for ManualTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
