//! Bounded retry shared by the per-file API path and the push path.

use crate::{SyncError, SyncResult};

/// Retry an operation a bounded number of times, retrying only errors a
/// predicate accepts. Carries no sleeping or backoff: both call sites
/// recover by doing work (re-reading a version token, rebasing) rather
/// than by waiting.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// `max_attempts` counts every try including the first, and is clamped
    /// to at least one.
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or the attempts are spent.
    ///
    /// `retryable` decides which errors are worth another try; any other
    /// error surfaces immediately. `on_retry` runs between attempts (the
    /// push path rebases here) and its failure also surfaces immediately.
    /// When the attempts are spent, the last retryable error is returned
    /// for the caller to map.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> SyncResult<T>,
        retryable: impl Fn(&SyncError) -> bool,
        mut on_retry: impl FnMut(&SyncError, u32) -> SyncResult<()>,
    ) -> SyncResult<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if retryable(&err) && attempt < self.max_attempts => {
                    on_retry(&err, attempt)?;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
