use net_utils::retry::{Classify, RetryClassify};

use crate::rpc::RpcError;

const RETRYABLE_CODES: &[u16] = &[500, 502, 503, 504, 429];

const RETRYABLE_REASONS: &[&str] = &["backendError", "internalError", "rateLimitExceeded"];

/// Classifies transport failures for every operation in the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigQueryRetryClassifier;

impl RetryClassify<RpcError> for BigQueryRetryClassifier {
    fn classify(&self, error: &RpcError) -> Classify {
        if is_retryable(error) {
            Classify::Retry
        } else {
            Classify::DontRetry
        }
    }
}

pub fn is_retryable(error: &RpcError) -> bool {
    match error {
        RpcError::Status { status, error, .. } => {
            RETRYABLE_CODES.contains(&status.as_u16())
                || error
                    .reason
                    .as_deref()
                    .is_some_and(|reason| RETRYABLE_REASONS.contains(&reason))
        }
        RpcError::Transport(error) => {
            error.is_timeout()
                || error.is_connect()
                || error
                    .status()
                    .is_some_and(|status| RETRYABLE_CODES.contains(&status.as_u16()))
        }
        RpcError::Auth(_) | RpcError::Decode(_) => false,
    }
}
