//! Generic retry executor. Every remote call in the workspace funnels through
//! [`run_with_retries`], parameterized by a [`BackoffConfig`], a [`RetryClassify`]
//! implementation and a [`Clock`].

use std::future::Future;

use crate::backoff::BackoffConfig;
use crate::clock::Clock;

pub mod classify;

pub use classify::{AlwaysRetry, Classify, NeverRetry, RetryClassify};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<E> {
    /// The classifier marked the failure as non-retryable.
    #[error("aborted after {attempts} attempt(s): {error}")]
    Aborted { attempts: u32, error: E },
    /// Every attempt (or the total retry period) was used up.
    #[error("retries exhausted after {attempts} attempt(s): {error}")]
    Exhausted { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Aborted { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub const fn error(&self) -> &E {
        match self {
            Self::Aborted { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    pub fn into_error(self) -> E {
        match self {
            Self::Aborted { error, .. } | Self::Exhausted { error, .. } => error,
        }
    }

    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Runs `op` until it succeeds, the classifier rejects an error, or the
/// [`BackoffConfig`] is spent. Each call to `op` must perform exactly one attempt.
pub async fn run_with_retries<T, E, F, Fut, C>(
    mut op: F,
    config: &BackoffConfig,
    classifier: &C,
    clock: &dyn Clock,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: RetryClassify<E> + ?Sized,
    E: std::fmt::Display,
{
    let started = clock.now();
    let mut backoff = config.make_backoff();
    let mut attempts = 0_u32;

    loop {
        attempts += 1;

        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if classifier.classify(&error) == Classify::DontRetry {
            return Err(RetryError::Aborted { attempts, error });
        }

        let Some(once) = backoff.backoff_once() else {
            warn!(message = "giving up, no retries left", attempts, %error);
            return Err(RetryError::Exhausted { attempts, error });
        };

        if let Some(total) = config.total_timeout() {
            let elapsed = clock.now().saturating_duration_since(started);
            if elapsed + once.waiting() > total {
                warn!(message = "giving up, retry period elapsed", attempts, ?elapsed, %error);
                return Err(RetryError::Exhausted { attempts, error });
            }
        }

        debug!(
            message = "retrying failed attempt",
            attempt = attempts,
            retry = once.on_retry(),
            max_retries = once.max_retries(),
            delay = ?once.waiting(),
            %error,
        );

        clock.sleep(once.waiting()).await;
    }
}
