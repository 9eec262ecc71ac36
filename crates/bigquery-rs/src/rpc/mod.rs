//! The transport seam. Operations in this crate only ever talk to a
//! [`BigQueryRpc`], which speaks the raw wire model from [`bigquery_resources_rs`].

use std::fmt;

use bigquery_resources_rs::dataset::Dataset;
use bigquery_resources_rs::job::{Job, JobReference};
use bigquery_resources_rs::query::{GetQueryResultsResponse, QueryRequest, QueryResponse};
use bigquery_resources_rs::table::Table;
use bigquery_resources_rs::table_data::{
    TableDataInsertAllRequest, TableDataInsertAllResponse, TableDataList,
};
use bigquery_resources_rs::{DatasetReference, ErrorProto, TableReference};
use http::StatusCode;

mod option;
mod rest;

pub use option::{OptionMap, OptionValue, RpcOption, ToRpcOption};
pub use rest::HttpRpc;

/// One page of a listing call.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub next_page_token: Option<Box<str>>,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    pub const fn new(next_page_token: Option<Box<str>>, items: Vec<T>) -> Self {
        Self {
            next_page_token,
            items,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("{status}: {error}")]
    Status {
        status: StatusCode,
        error: ErrorProto,
        /// Any additional errors beyond the first one.
        details: Vec<ErrorProto>,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Auth(#[from] gcp_auth::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl RpcError {
    pub fn status(status: StatusCode, error: ErrorProto) -> Self {
        Self::Status {
            status,
            error,
            details: Vec::new(),
        }
    }

    /// Builds a status error from a full list of errors, using the first as the
    /// main error.
    pub(crate) fn from_errors(
        status: StatusCode,
        mut errors: Vec<ErrorProto>,
        message: Option<Box<str>>,
    ) -> Self {
        let error = if errors.is_empty() {
            let message = message
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").into());
            ErrorProto::new(message)
        } else {
            errors.remove(0)
        };

        Self::Status {
            status,
            error,
            details: errors,
        }
    }

    /// The HTTP status code, `0` if no response was received.
    pub fn code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => status.as_u16(),
            Self::Transport(error) => error.status().map_or(0, |status| status.as_u16()),
            Self::Auth(_) | Self::Decode(_) => 0,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Status { error, .. } => error.reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Raw BigQuery v2 REST calls. Implementations perform exactly one request per
/// call; retries are layered on top by the caller.
///
/// `get_*` calls return `Ok(None)` on a 404, `delete_*` and `cancel_job` return
/// `Ok(false)`.
#[async_trait::async_trait]
pub trait BigQueryRpc: Send + Sync + fmt::Debug {
    async fn create_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError>;

    async fn get_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Dataset>, RpcError>;

    async fn list_datasets(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Dataset>, RpcError>;

    async fn delete_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<bool, RpcError>;

    async fn patch_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError>;

    async fn create_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError>;

    async fn get_table(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Table>, RpcError>;

    async fn list_tables(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Listing<Table>, RpcError>;

    async fn delete_table(&self, table: TableReference<&str>) -> Result<bool, RpcError>;

    async fn patch_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError>;

    async fn list_table_data(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<TableDataList, RpcError>;

    async fn insert_all(
        &self,
        table: TableReference<&str>,
        request: &TableDataInsertAllRequest,
    ) -> Result<TableDataInsertAllResponse, RpcError>;

    async fn create_job(&self, job: &Job, options: &OptionMap) -> Result<Job, RpcError>;

    async fn get_job(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<Option<Job>, RpcError>;

    async fn list_jobs(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Job>, RpcError>;

    async fn cancel_job(&self, job: &JobReference) -> Result<bool, RpcError>;

    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, RpcError>;

    async fn get_query_results(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<GetQueryResultsResponse, RpcError>;
}
