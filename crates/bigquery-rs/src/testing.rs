//! A scripted [`BigQueryRpc`] for exercising operations without a network.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use bigquery_resources_rs::dataset::Dataset;
use bigquery_resources_rs::job::{Job, JobReference};
use bigquery_resources_rs::query::{GetQueryResultsResponse, QueryRequest, QueryResponse};
use bigquery_resources_rs::table::Table;
use bigquery_resources_rs::table_data::{
    TableDataInsertAllRequest, TableDataInsertAllResponse, TableDataList,
};
use bigquery_resources_rs::{DatasetReference, ErrorProto, TableReference};
use http::StatusCode;
use net_utils::BackoffConfig;
use net_utils::clock::ManualClock;
use parking_lot::Mutex;
use serde_json::Value;

use crate::client::{BigQuery, BigQueryOptions};
use crate::rpc::{BigQueryRpc, Listing, OptionMap, RpcError};

/// A single request seen by [`MockRpc`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    /// The path like scope of the call, i.e `p/d/t` for a table.
    pub target: String,
    pub options: OptionMap,
    pub body: Option<Value>,
}

/// Answers each call with the next response queued for that method, and
/// records the call. Panics if nothing was queued.
#[derive(Default)]
pub(crate) struct MockRpc {
    responses: Mutex<HashMap<&'static str, VecDeque<Box<dyn Any + Send>>>>,
    calls: Mutex<Vec<Call>>,
}

impl fmt::Debug for MockRpc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRpc")
            .field("calls", &self.calls.lock().len())
            .finish_non_exhaustive()
    }
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push<T: Send + 'static>(&self, method: &'static str, response: Result<T, RpcError>) {
        self.responses
            .lock()
            .entry(method)
            .or_default()
            .push_back(Box::new(response));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    fn respond<T: 'static>(
        &self,
        method: &'static str,
        target: String,
        options: &OptionMap,
        body: Option<Value>,
    ) -> Result<T, RpcError> {
        self.calls.lock().push(Call {
            method,
            target,
            options: options.clone(),
            body,
        });

        let response = self
            .responses
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no response queued for {method}"));

        match response.downcast::<Result<T, RpcError>>() {
            Ok(response) => *response,
            Err(_) => panic!("queued response for {method} has the wrong type"),
        }
    }
}

pub(crate) fn status_error(status: StatusCode, reason: &str) -> RpcError {
    RpcError::status(
        status,
        ErrorProto::new(Box::from(status.canonical_reason().unwrap_or("error")))
            .with_reason(reason.into()),
    )
}

/// A client over `rpc` for project `p`, with a clock that skips backoff sleeps.
pub(crate) async fn client(rpc: &Arc<MockRpc>) -> (BigQuery, Arc<ManualClock>) {
    client_with_policy(rpc, BackoffConfig::default()).await
}

pub(crate) async fn client_with_policy(
    rpc: &Arc<MockRpc>,
    policy: BackoffConfig,
) -> (BigQuery, Arc<ManualClock>) {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let clock = Arc::new(ManualClock::new());
    let options = BigQueryOptions::builder("p")
        .rpc(Arc::clone(rpc) as Arc<dyn BigQueryRpc>)
        .retry_policy(policy)
        .clock(Arc::clone(&clock) as _)
        .build()
        .await
        .expect("options with a transport always build");

    (BigQuery::from_options(options), clock)
}

/// Deserializes a wire value, for building canned responses.
pub(crate) fn wire<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("canned response deserializes")
}

fn body<T: serde::Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn dataset_target(dataset: DatasetReference<&str>) -> String {
    format!("{}/{}", dataset.project_id, dataset.dataset_id)
}

fn table_target(table: TableReference<&str>) -> String {
    format!("{}/{}/{}", table.project_id, table.dataset_id, table.table_id)
}

fn job_target(job: &JobReference) -> String {
    format!("{}/{}", job.project_id, job.job_id)
}

static NO_OPTIONS: OptionMap = OptionMap::new();

#[async_trait::async_trait]
impl BigQueryRpc for MockRpc {
    async fn create_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError> {
        let target = dataset
            .dataset_reference
            .as_ref()
            .map(|reference| dataset_target(reference.as_deref()))
            .unwrap_or_default();
        self.respond("create_dataset", target, options, body(dataset))
    }

    async fn get_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Dataset>, RpcError> {
        self.respond("get_dataset", dataset_target(dataset), options, None)
    }

    async fn list_datasets(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Dataset>, RpcError> {
        self.respond("list_datasets", project_id.to_owned(), options, None)
    }

    async fn delete_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<bool, RpcError> {
        self.respond("delete_dataset", dataset_target(dataset), options, None)
    }

    async fn patch_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError> {
        let target = dataset
            .dataset_reference
            .as_ref()
            .map(|reference| dataset_target(reference.as_deref()))
            .unwrap_or_default();
        self.respond("patch_dataset", target, options, body(dataset))
    }

    async fn create_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError> {
        let target = table
            .table_reference
            .as_ref()
            .map(|reference| table_target(reference.as_deref()))
            .unwrap_or_default();
        self.respond("create_table", target, options, body(table))
    }

    async fn get_table(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Table>, RpcError> {
        self.respond("get_table", table_target(table), options, None)
    }

    async fn list_tables(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Listing<Table>, RpcError> {
        self.respond("list_tables", dataset_target(dataset), options, None)
    }

    async fn delete_table(&self, table: TableReference<&str>) -> Result<bool, RpcError> {
        self.respond("delete_table", table_target(table), &NO_OPTIONS, None)
    }

    async fn patch_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError> {
        let target = table
            .table_reference
            .as_ref()
            .map(|reference| table_target(reference.as_deref()))
            .unwrap_or_default();
        self.respond("patch_table", target, options, body(table))
    }

    async fn list_table_data(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<TableDataList, RpcError> {
        self.respond("list_table_data", table_target(table), options, None)
    }

    async fn insert_all(
        &self,
        table: TableReference<&str>,
        request: &TableDataInsertAllRequest,
    ) -> Result<TableDataInsertAllResponse, RpcError> {
        self.respond("insert_all", table_target(table), &NO_OPTIONS, body(request))
    }

    async fn create_job(&self, job: &Job, options: &OptionMap) -> Result<Job, RpcError> {
        let target = job.job_reference.as_ref().map(job_target).unwrap_or_default();
        self.respond("create_job", target, options, body(job))
    }

    async fn get_job(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<Option<Job>, RpcError> {
        self.respond("get_job", job_target(job), options, None)
    }

    async fn list_jobs(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Job>, RpcError> {
        self.respond("list_jobs", project_id.to_owned(), options, None)
    }

    async fn cancel_job(&self, job: &JobReference) -> Result<bool, RpcError> {
        self.respond("cancel_job", job_target(job), &NO_OPTIONS, None)
    }

    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, RpcError> {
        self.respond("query", project_id.to_owned(), &NO_OPTIONS, body(request))
    }

    async fn get_query_results(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<GetQueryResultsResponse, RpcError> {
        self.respond("get_query_results", job_target(job), options, None)
    }
}
