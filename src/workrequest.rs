//! Polling of asynchronous work requests.
//!
//! Mutating cloud calls return immediately with a work-request id; the
//! actual change happens backend-side. [`WorkRequestAwaiter`] drives such
//! a request to a terminal state by polling with exponential backoff.

use std::time::Duration;

use tracing::debug;

use crate::api::CloudApi;
use crate::error::{Error, Result};
use crate::types::{WorkRequest, WorkRequestState};

/// Backoff schedule for work-request polling.
///
/// The nth wait is `initial * multiplier^n`, perturbed by up to
/// `jitter` of itself in either direction. With the defaults the total
/// worst-case wait is the 15-term geometric series from 2s at ratio
/// 1.25, a little over two minutes.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wait before the second poll.
    pub initial: Duration,

    /// Growth factor per step.
    pub multiplier: f64,

    /// Fraction of the delay randomized away (0.0 disables jitter).
    pub jitter: f64,

    /// Total polls before giving up with [`Error::Timeout`].
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(2),
            multiplier: 1.25,
            jitter: 0.1,
            max_attempts: 15,
        }
    }
}

impl PollPolicy {
    /// A zero-wait schedule for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            initial: Duration::ZERO,
            multiplier: 1.0,
            jitter: 0.0,
            max_attempts,
        }
    }

    /// Delay before the poll following attempt number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.initial.as_secs_f64() * self.multiplier.powi(attempt as i32);
        if self.jitter <= 0.0 {
            return Duration::from_secs_f64(base);
        }

        use rand::Rng;
        let skew: f64 = rand::rng().random_range(-1.0..=1.0);
        Duration::from_secs_f64((base + base * self.jitter * skew).max(0.0))
    }
}

/// Polls a work request until it reaches a terminal state.
///
/// Retries only the "still in progress" condition; a transport error or
/// an explicit `Failed` state aborts immediately. The returned future is
/// cancel-safe, so an enclosing deadline is expressed as
/// `tokio::time::timeout(deadline, awaiter.await_completion(id))`.
pub struct WorkRequestAwaiter<'a> {
    api: &'a dyn CloudApi,
    policy: PollPolicy,
}

impl<'a> WorkRequestAwaiter<'a> {
    pub fn new(api: &'a dyn CloudApi, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Block the calling task until the work request succeeds, fails, or
    /// the attempt budget runs out.
    pub async fn await_completion(&self, id: &str) -> Result<WorkRequest> {
        debug!(work_request_id = %id, "polling work request");

        for attempt in 0..self.policy.max_attempts {
            let wr = self.api.get_work_request(id).await?;
            debug!(work_request_id = %id, state = ?wr.state, attempt, "work request polled");

            match wr.state {
                WorkRequestState::Succeeded => return Ok(wr),
                WorkRequestState::Failed => {
                    return Err(Error::OperationFailed {
                        id: id.to_string(),
                        message: wr.message.unwrap_or_default(),
                    });
                }
                _ => {
                    if attempt + 1 < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.delay(attempt)).await;
                    }
                }
            }
        }

        Err(Error::Timeout {
            id: id.to_string(),
            attempts: self.policy.max_attempts,
        })
    }
}
