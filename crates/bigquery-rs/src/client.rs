use std::future::Future;
use std::sync::Arc;

use net_utils::clock::{Clock, TokioClock};
use net_utils::{BackoffConfig, run_with_retries};

use crate::Error;
use crate::retry::BigQueryRetryClassifier;
use crate::rpc::{BigQueryRpc, HttpRpc, RpcError};

/// Everything an operation needs besides its arguments: the project that
/// incomplete ids are resolved against, the transport, and the retry policy.
///
/// Read only once built, and shared between a [`BigQuery`] client and the pages
/// it hands out.
#[derive(Debug)]
pub struct BigQueryOptions {
    project_id: Box<str>,
    rpc: Arc<dyn BigQueryRpc>,
    retry_policy: BackoffConfig,
    clock: Arc<dyn Clock>,
}

impl BigQueryOptions {
    pub fn builder(project_id: impl Into<Box<str>>) -> BigQueryOptionsBuilder {
        BigQueryOptionsBuilder {
            project_id: project_id.into(),
            rpc: None,
            retry_policy: BackoffConfig::default(),
            clock: Arc::new(TokioClock),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn rpc(&self) -> &dyn BigQueryRpc {
        &*self.rpc
    }

    pub fn retry_policy(&self) -> &BackoffConfig {
        &self.retry_policy
    }

    pub fn clock(&self) -> &dyn Clock {
        &*self.clock
    }

    /// Runs `op` under the configured retry policy.
    pub(crate) async fn run<T, F, Fut>(&self, op: F) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        self.run_with(&self.retry_policy, op).await
    }

    pub(crate) async fn run_with<T, F, Fut>(
        &self,
        policy: &BackoffConfig,
        op: F,
    ) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        run_with_retries(op, policy, &BigQueryRetryClassifier, &*self.clock)
            .await
            .map_err(Error::from)
    }
}

pub struct BigQueryOptionsBuilder {
    project_id: Box<str>,
    rpc: Option<Arc<dyn BigQueryRpc>>,
    retry_policy: BackoffConfig,
    clock: Arc<dyn Clock>,
}

impl BigQueryOptionsBuilder {
    /// Use `rpc` instead of the default [`HttpRpc`].
    pub fn rpc(mut self, rpc: Arc<dyn BigQueryRpc>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    pub fn retry_policy(mut self, retry_policy: BackoffConfig) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the options, setting up an [`HttpRpc`] with credentials from the
    /// environment if no transport was given.
    pub async fn build(self) -> crate::Result<BigQueryOptions> {
        if self.project_id.is_empty() {
            return Err(Error::invalid_argument("project id must not be empty"));
        }

        let rpc = match self.rpc {
            Some(rpc) => rpc,
            None => Arc::new(HttpRpc::new().await?),
        };

        Ok(BigQueryOptions {
            project_id: self.project_id,
            rpc,
            retry_policy: self.retry_policy,
            clock: self.clock,
        })
    }
}

/// The BigQuery client. Cheap to clone, and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct BigQuery {
    pub(crate) options: Arc<BigQueryOptions>,
}

impl BigQuery {
    /// A client for `project_id`, authenticated with the environment's default
    /// credentials.
    pub async fn new(project_id: impl Into<Box<str>>) -> crate::Result<Self> {
        BigQueryOptions::builder(project_id)
            .build()
            .await
            .map(Self::from_options)
    }

    /// Like [`BigQuery::new`], but with the project the credentials belong to.
    pub async fn from_env() -> crate::Result<Self> {
        let rpc = HttpRpc::new().await?;
        let project_id = rpc.project_id().await?;

        BigQueryOptions::builder(&*project_id)
            .rpc(Arc::new(rpc))
            .build()
            .await
            .map(Self::from_options)
    }

    pub fn from_options(options: BigQueryOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &BigQueryOptions {
        &self.options
    }

    pub fn project_id(&self) -> &str {
        self.options.project_id()
    }
}
