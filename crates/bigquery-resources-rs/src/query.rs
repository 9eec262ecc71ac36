use std::collections::HashMap;

use crate::job::JobReference;
use crate::table::TableSchema;
use crate::table_data::TableRow;
use crate::util::{self, int64};
use crate::{DatasetReference, ErrorProto};

/// Body of `jobs.query`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dataset: Option<DatasetReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub dry_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_query_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<Box<str>, Box<str>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub maximum_bytes_billed: Option<i64>,
}

/// Response body of `jobs.query`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<TableRow>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_bytes_processed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub num_dml_affected_rows: Option<i64>,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto>,
}

/// Response body of `jobs.getQueryResults`. Shares its shape with [`QueryResponse`],
/// plus an `etag`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryResultsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<TableRow>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_bytes_processed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub num_dml_affected_rows: Option<i64>,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto>,
}

impl From<QueryResponse> for GetQueryResultsResponse {
    fn from(response: QueryResponse) -> Self {
        Self {
            kind: response.kind,
            etag: None,
            job_reference: response.job_reference,
            job_complete: response.job_complete,
            schema: response.schema,
            total_rows: response.total_rows,
            page_token: response.page_token,
            rows: response.rows,
            total_bytes_processed: response.total_bytes_processed,
            cache_hit: response.cache_hit,
            num_dml_affected_rows: response.num_dml_affected_rows,
            errors: response.errors,
        }
    }
}
