use std::collections::BTreeMap;
use std::time::Duration;

use bigquery_resources_rs::query::QueryRequest as WireQueryRequest;

use super::error::BigQueryError;
use super::field_value::Row;
use super::schema::Schema;
use crate::id::{DatasetId, JobId};
use crate::page::Page;

/// A query to run through `jobs.query`, waiting (up to `max_wait_time`) for it to
/// complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    query: Box<str>,
    default_dataset: Option<DatasetId>,
    page_size: Option<u32>,
    max_wait_time: Option<Duration>,
    dry_run: bool,
    use_query_cache: Option<bool>,
    use_legacy_sql: Option<bool>,
    location: Option<Box<str>>,
    labels: BTreeMap<Box<str>, Box<str>>,
    maximum_bytes_billed: Option<i64>,
}

impl QueryRequest {
    pub fn new(query: impl Into<Box<str>>) -> Self {
        Self {
            query: query.into(),
            default_dataset: None,
            page_size: None,
            max_wait_time: None,
            dry_run: false,
            use_query_cache: None,
            use_legacy_sql: None,
            location: None,
            labels: BTreeMap::new(),
            maximum_bytes_billed: None,
        }
    }

    /// Dataset used for unqualified table names in the query.
    pub fn with_default_dataset(mut self, dataset: DatasetId) -> Self {
        self.default_dataset = Some(dataset);
        self
    }

    /// Maximum number of rows in the first (and every following) page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// How long the service waits for the query to complete before returning an
    /// incomplete response.
    pub fn with_max_wait_time(mut self, max_wait_time: Duration) -> Self {
        self.max_wait_time = Some(max_wait_time);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_query_cache(mut self, use_query_cache: bool) -> Self {
        self.use_query_cache = Some(use_query_cache);
        self
    }

    pub fn with_legacy_sql(mut self, use_legacy_sql: bool) -> Self {
        self.use_legacy_sql = Some(use_legacy_sql);
        self
    }

    pub fn with_location(mut self, location: impl Into<Box<str>>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_maximum_bytes_billed(mut self, bytes: i64) -> Self {
        self.maximum_bytes_billed = Some(bytes);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn default_dataset(&self) -> Option<&DatasetId> {
        self.default_dataset.as_ref()
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn max_wait_time(&self) -> Option<Duration> {
        self.max_wait_time
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Builds the request body, completing the default dataset with `project`.
    pub fn to_wire(&self, project: &str) -> WireQueryRequest {
        WireQueryRequest {
            query: self.query.clone(),
            max_results: self.page_size,
            default_dataset: self
                .default_dataset
                .as_ref()
                .map(|dataset| dataset.set_project_id(project).to_wire()),
            timeout_ms: self
                .max_wait_time
                .map(|wait| u64::try_from(wait.as_millis()).unwrap_or(u64::MAX)),
            dry_run: self.dry_run,
            use_query_cache: self.use_query_cache,
            use_legacy_sql: self.use_legacy_sql,
            location: self.location.clone(),
            labels: self
                .labels
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            maximum_bytes_billed: self.maximum_bytes_billed,
        }
    }
}

/// The outcome of `query` or `get_query_results`.
///
/// The job may not have completed yet, in which case [`result`] is `None` and the
/// results can be polled with `get_query_results` using [`job_id`].
///
/// [`result`]: QueryResponse::result
/// [`job_id`]: QueryResponse::job_id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryResponse {
    job_id: Option<JobId>,
    etag: Option<Box<str>>,
    job_completed: bool,
    result: Option<QueryResult>,
    execution_errors: Vec<BigQueryError>,
}

impl QueryResponse {
    pub(crate) fn new(
        job_id: Option<JobId>,
        etag: Option<Box<str>>,
        result: Option<QueryResult>,
        execution_errors: Vec<BigQueryError>,
    ) -> Self {
        Self {
            job_id,
            etag,
            job_completed: result.is_some(),
            result,
            execution_errors,
        }
    }

    /// `None` for dry runs, which never create a job.
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn job_completed(&self) -> bool {
        self.job_completed
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<QueryResult> {
        self.result
    }

    pub fn has_errors(&self) -> bool {
        !self.execution_errors.is_empty()
    }

    /// Errors hit while running the query. These don't necessarily mean the query
    /// failed.
    pub fn execution_errors(&self) -> &[BigQueryError] {
        &self.execution_errors
    }
}

/// The results of a completed query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryResult {
    schema: Option<Schema>,
    total_rows: u64,
    total_bytes_processed: Option<i64>,
    cache_hit: bool,
    num_dml_affected_rows: Option<i64>,
    rows: Page<Row>,
}

impl QueryResult {
    pub(crate) fn new(
        schema: Option<Schema>,
        total_rows: u64,
        total_bytes_processed: Option<i64>,
        cache_hit: bool,
        num_dml_affected_rows: Option<i64>,
        rows: Page<Row>,
    ) -> Self {
        Self {
            schema,
            total_rows,
            total_bytes_processed,
            cache_hit,
            num_dml_affected_rows,
            rows,
        }
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Rows across every page, not just the first.
    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn total_bytes_processed(&self) -> Option<i64> {
        self.total_bytes_processed
    }

    pub fn cache_hit(&self) -> bool {
        self.cache_hit
    }

    /// Only set for DML statements.
    pub fn num_dml_affected_rows(&self) -> Option<i64> {
        self.num_dml_affected_rows
    }

    /// The first page of rows.
    pub fn rows(&self) -> &Page<Row> {
        &self.rows
    }

    pub fn into_rows(self) -> Page<Row> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wire_completes_default_dataset() {
        let request = QueryRequest::new("SELECT * FROM t")
            .with_default_dataset(DatasetId::of("d"))
            .with_page_size(50)
            .with_max_wait_time(Duration::from_secs(10))
            .with_legacy_sql(false);

        let json = serde_json::to_value(request.to_wire("p")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "query": "SELECT * FROM t",
                "maxResults": 50,
                "defaultDataset": { "projectId": "p", "datasetId": "d" },
                "timeoutMs": 10000,
                "useLegacySql": false
            })
        );
    }
}
