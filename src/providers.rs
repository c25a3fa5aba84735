//! Collaborator interfaces injected into the store.
//!
//! The surrounding application supplies a clock, an operator identity, and
//! an error-reporting sink; defaults here cover production use and tests
//! swap in doubles.

use crate::errors::Error;
use chrono::{DateTime, Utc};
use tracing::error;

/// Source of "now" for every timestamp the store writes.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Provides the current operator identity for metadata attribution.
pub trait Identity: Send + Sync {
    /// Identity string recorded as `createdBy`.
    fn current_user(&self) -> String;
}

/// Receives every internal fault the store catches, with operation
/// context, before the error is re-raised to the caller.
pub trait ErrorSink: Send + Sync {
    /// Reports a caught fault.
    fn report(&self, context: &str, error: &Error);
}

/// Wall-clock [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`Identity`] read from the process environment (`USER`, then
/// `USERNAME`), falling back to `"unknown"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvIdentity;

impl Identity for EnvIdentity {
    fn current_user(&self) -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

/// [`Identity`] fixed to a configured operator name.
#[derive(Debug, Clone)]
pub struct StaticIdentity(pub String);

impl Identity for StaticIdentity {
    fn current_user(&self) -> String {
        self.0.clone()
    }
}

/// [`ErrorSink`] that forwards faults to the tracing error stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, context: &str, err: &Error) {
        error!(context, kind = err.kind_name(), "{}", err);
    }
}
