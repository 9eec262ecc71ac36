//! A collection of networking utility types shared by the API clients in this workspace,
//! primarily the backoff + retry machinery every remote call goes through.

#[macro_use]
extern crate tracing;

pub mod backoff;
pub mod clock;
pub mod retry;

pub use backoff::BackoffConfig;
pub use clock::Clock;
pub use retry::{RetryError, run_with_retries};
