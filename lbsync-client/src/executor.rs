//! [`RetryingExecutor`] — runs one remote call with session readiness,
//! bounded retry and status inspection.
//!
//! Each attempt:
//!
//! 1. `ensure_ready` on the session (handshake failures end the run)
//! 2. issue the call
//! 3. on a transient error, sleep with jittered backoff and go again
//! 4. on a result, check its status: OK returns, anything else fails
//!    immediately without retry
//!
//! Transient means [`LbError::is_transient`]: request timeouts, transport
//! errors, and losing the race for the handshake gate.

use std::future::Future;
use std::sync::Arc;

// ---

use tokio_util::sync::CancellationToken;

// ---

use lbsync_domain::{CallError, LbError, RemoteResult, Result};

// ---

use super::{BackoffProvider, RetryPolicy, SessionOrchestrator};

// ---------------------------------------------------------------------------
// RetryingExecutor
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RetryingExecutor {
    // ---
    session: SessionOrchestrator,
    backoff: Arc<BackoffProvider>,
    policy: RetryPolicy,
}

// ---

impl RetryingExecutor {
    // ---
    pub fn new(
        session: SessionOrchestrator,
        backoff: Arc<BackoffProvider>,
        policy: RetryPolicy,
    ) -> Result<Self> {
        // ---
        policy.validate()?;
        Ok(Self {
            session,
            backoff,
            policy,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // ---

    /// Run `call` until it yields an OK result, a non-retryable error, or
    /// the policy runs out of retries: at most `max_attempts + 1` calls.
    ///
    /// `operation` names the call in logs and errors. `call` is invoked
    /// once per attempt and only while the session is logged on.
    ///
    /// # Errors
    ///
    /// - [`LbError::RemoteStatusFailure`] for a non-OK result (not retried)
    /// - [`LbError::RetryExhausted`] wrapping the last transient error
    /// - [`LbError::Cancelled`] if `cancel` fires between attempts or while
    ///   waiting for the session gate
    /// - any non-transient error from [`SessionOrchestrator::ensure_ready`]
    pub async fn execute<R, F, Fut>(
        &self,
        operation: &str,
        mut call: F,
        cancel: &CancellationToken,
    ) -> Result<R>
    where
        R: RemoteResult,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, CallError>>,
    {
        // ---
        let mut retries = 0u32;

        loop {
            // ---
            let err = match self.attempt(operation, &mut call, cancel).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };

            if retries >= self.policy.max_attempts {
                let attempts = retries + 1;
                tracing::warn!(operation, attempts, "giving up: {err}");
                return Err(LbError::RetryExhausted {
                    operation: operation.to_string(),
                    attempts,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff.sleep_duration(
                retries,
                self.policy.min_backoff,
                self.policy.max_backoff,
                self.policy.delta_backoff,
            );
            retries += 1;
            tracing::warn!(
                operation,
                retry = retries,
                max_retries = self.policy.max_attempts,
                "{err}; retrying in {delay:?}"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(LbError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    // ---

    async fn attempt<R, F, Fut>(
        &self,
        operation: &str,
        call: &mut F,
        cancel: &CancellationToken,
    ) -> Result<R>
    where
        R: RemoteResult,
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, CallError>>,
    {
        // ---
        if cancel.is_cancelled() {
            return Err(LbError::Cancelled);
        }
        self.session.ensure_ready(cancel).await?;

        let result = call().await.map_err(|e| e.into_lb_error(operation))?;
        let status = result.status();
        if !status.is_ok() {
            tracing::warn!(operation, %status, "remote returned failure status");
            return Err(LbError::RemoteStatusFailure {
                operation: operation.to_string(),
                code: status,
            });
        }

        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
