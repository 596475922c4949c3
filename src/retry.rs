use std::{fmt::Display, thread, time::Duration};

/// Attempt count and exponential backoff bounds for provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
   /// Total attempts, first call included. Zero behaves like one.
   pub max_attempts:    u32,
   pub initial_backoff: Duration,
   pub max_backoff:     Duration,
}

impl Default for RetryPolicy {
   fn default() -> Self {
      Self {
         max_attempts:    3,
         initial_backoff: Duration::from_secs(4),
         max_backoff:     Duration::from_secs(10),
      }
   }
}

impl RetryPolicy {
   /// No waiting between attempts.
   pub const fn immediate(max_attempts: u32) -> Self {
      Self { max_attempts, initial_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
   }

   /// Delay before retry number `retry` (1-based): `initial * 2^(retry-1)`,
   /// capped at `max_backoff`.
   pub fn backoff(&self, retry: u32) -> Duration {
      let factor = 1u32
         .checked_shl(retry.saturating_sub(1))
         .unwrap_or(u32::MAX);
      self
         .initial_backoff
         .checked_mul(factor)
         .unwrap_or(self.max_backoff)
         .min(self.max_backoff)
   }
}

/// Run `f` until it succeeds or the policy's attempts are exhausted, sleeping
/// between attempts. Every error is retried; the last one is returned.
pub fn retry_with_backoff<T, E, F>(policy: &RetryPolicy, mut f: F) -> Result<T, E>
where
   F: FnMut(u32) -> Result<T, E>,
   E: Display,
{
   let max_attempts = policy.max_attempts.max(1);
   let mut attempt = 0;

   loop {
      attempt += 1;

      match f(attempt) {
         Ok(value) => return Ok(value),
         Err(e) if attempt < max_attempts => {
            let backoff = policy.backoff(attempt);
            tracing::warn!(
               attempt,
               max_attempts,
               backoff_ms = backoff.as_millis() as u64,
               error = %e,
               "provider call failed, retrying"
            );
            if !backoff.is_zero() {
               thread::sleep(backoff);
            }
         },
         Err(e) => {
            tracing::warn!(attempt, error = %e, "provider call failed, giving up");
            return Err(e);
         },
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_backoff_schedule() {
      let policy = RetryPolicy::default();
      assert_eq!(policy.backoff(1), Duration::from_secs(4));
      assert_eq!(policy.backoff(2), Duration::from_secs(8));
      assert_eq!(policy.backoff(3), Duration::from_secs(10));
      assert_eq!(policy.backoff(40), Duration::from_secs(10));
   }

   #[test]
   fn test_succeeds_after_failures() {
      let mut calls = 0;
      let result: Result<&str, String> =
         retry_with_backoff(&RetryPolicy::immediate(3), |attempt| {
            calls += 1;
            if attempt < 3 { Err(format!("boom {attempt}")) } else { Ok("done") }
         });
      assert_eq!(result, Ok("done"));
      assert_eq!(calls, 3);
   }

   #[test]
   fn test_returns_last_error_when_exhausted() {
      let mut calls = 0;
      let result: Result<(), String> = retry_with_backoff(&RetryPolicy::immediate(3), |attempt| {
         calls += 1;
         Err(format!("boom {attempt}"))
      });
      assert_eq!(result, Err("boom 3".to_string()));
      assert_eq!(calls, 3);
   }

   #[test]
   fn test_first_success_is_not_retried() {
      let mut calls = 0;
      let result: Result<u8, String> = retry_with_backoff(&RetryPolicy::immediate(3), |_| {
         calls += 1;
         Ok(7)
      });
      assert_eq!(result, Ok(7));
      assert_eq!(calls, 1);
   }

   #[test]
   fn test_zero_attempts_runs_once() {
      let mut calls = 0;
      let result: Result<(), &str> = retry_with_backoff(&RetryPolicy::immediate(0), |_| {
         calls += 1;
         Err("nope")
      });
      assert!(result.is_err());
      assert_eq!(calls, 1);
   }
}
