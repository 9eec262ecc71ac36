use std::fmt;

use net_utils::RetryError;

use crate::resources::{BigQueryError, FieldValueError};
use crate::retry::is_retryable;
use crate::rpc::RpcError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected locally, before any request was made.
    #[error("{0}")]
    InvalidArgument(Box<str>),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("retries exhausted after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: ServiceError },
    /// A response row that couldn't be decoded.
    #[error("malformed row: {0}")]
    MalformedRow(#[from] FieldValueError),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<Box<str>>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The last service error, if the failure came from the service.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(error) | Self::RetriesExhausted { last: error, .. } => Some(error),
            Self::InvalidArgument(_) | Self::MalformedRow(_) => None,
        }
    }

    /// The HTTP status code of the last service error. `Some(0)` if no response was
    /// received.
    pub fn code(&self) -> Option<u16> {
        self.service_error().map(ServiceError::code)
    }

    pub fn is_retryable(&self) -> bool {
        self.service_error().is_some_and(ServiceError::is_retryable)
    }
}

impl From<RetryError<RpcError>> for Error {
    fn from(error: RetryError<RpcError>) -> Self {
        match error {
            // a single attempt that was allowed no retries reads as a plain failure
            RetryError::Exhausted { attempts, error } if attempts > 1 => Self::RetriesExhausted {
                attempts,
                last: ServiceError::from(error),
            },
            other => Self::Service(ServiceError::from(other.into_error())),
        }
    }
}

impl From<RpcError> for Error {
    fn from(error: RpcError) -> Self {
        Self::Service(ServiceError::from(error))
    }
}

/// A failure reported by (or while talking to) the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    code: u16,
    reason: Option<Box<str>>,
    location: Option<Box<str>>,
    message: Box<str>,
    retryable: bool,
    errors: Vec<BigQueryError>,
}

impl ServiceError {
    /// `0` when no HTTP response was received.
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Every structured error the service returned, main error first.
    pub fn errors(&self) -> &[BigQueryError] {
        &self.errors
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.reason.as_deref()) {
            (0, None) => f.write_str(&self.message),
            (0, Some(reason)) => write!(f, "{}: {reason}", self.message),
            (code, None) => write!(f, "{code} {}", self.message),
            (code, Some(reason)) => write!(f, "{code} {}: {reason}", self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<RpcError> for ServiceError {
    fn from(error: RpcError) -> Self {
        let retryable = is_retryable(&error);
        let code = error.code();

        match error {
            RpcError::Status { error, details, .. } => {
                let mut errors = Vec::with_capacity(details.len() + 1);
                errors.push(BigQueryError::from_wire(&error));
                errors.extend(details.iter().map(BigQueryError::from_wire));

                Self {
                    code,
                    reason: error.reason,
                    location: error.location,
                    message: error.message,
                    retryable,
                    errors,
                }
            }
            other => Self {
                code,
                reason: None,
                location: None,
                message: other.to_string().into_boxed_str(),
                retryable,
                errors: Vec::new(),
            },
        }
    }
}
