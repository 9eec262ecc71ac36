use std::collections::HashMap;

use crate::table::TableSchema;
use crate::util::{self, int64};
use crate::{DatasetReference, ErrorProto, TableReference};

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Box<str>>,
    /// Unlike every other field, this one is snake case on the wire.
    #[serde(rename = "user_email", default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<Box<str>>,
    pub configuration: JobConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl Job {
    /// A job with only a configuration (and optionally a reference) set, as sent to
    /// `jobs.insert`.
    pub fn new(configuration: JobConfiguration, job_reference: Option<JobReference>) -> Self {
        Self {
            kind: None,
            etag: None,
            id: None,
            self_link: None,
            user_email: None,
            configuration,
            job_reference,
            statistics: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: Box<str>,
    pub job_id: Box<str>,
    /// The geographic location of the job. See details at
    /// https://cloud.google.com/bigquery/docs/locations#specifying_your_location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_result: Option<ErrorProto>,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto>,
    pub state: JobState,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Running,
    Done,
}

impl JobState {
    /// The lowercase form used by the `stateFilter` query parameter.
    pub const fn as_filter(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub creation_time: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub start_time: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub end_time: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_bytes_processed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<LoadStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractStatistics>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_bytes_processed: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_bytes_billed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_tier: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub input_files: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub input_file_bytes: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub output_rows: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub output_bytes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractStatistics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destination_uri_file_counts: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Query,
    Load,
    Extract,
    Copy,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub dry_run: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub job_timeout_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<Box<str>, Box<str>>,
    #[serde(flatten)]
    pub kind: JobConfigurationKind,
}

impl From<JobConfigurationKind> for JobConfiguration {
    fn from(kind: JobConfigurationKind) -> Self {
        Self {
            job_type: Some(kind.job_type()),
            dry_run: false,
            job_timeout_ms: None,
            labels: HashMap::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobConfigurationKind {
    Query(JobConfigurationQuery),
    Load(JobConfigurationLoad),
    Copy(JobConfigurationTableCopy),
    Extract(JobConfigurationExtract),
}

impl JobConfigurationKind {
    pub const fn job_type(&self) -> JobType {
        match self {
            Self::Copy(_) => JobType::Copy,
            Self::Extract(_) => JobType::Extract,
            Self::Load(_) => JobType::Load,
            Self::Query(_) => JobType::Query,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateDisposition {
    CreateIfNeeded,
    CreateNever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    WriteTruncate,
    WriteAppend,
    WriteEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryPriority {
    Interactive,
    Batch,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationQuery {
    pub query: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_table: Option<TableReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_dataset: Option<DatasetReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<QueryPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_query_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_large_results: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten_results: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub maximum_bytes_billed: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFormat {
    Csv,
    NewlineDelimitedJson,
    Avro,
    Parquet,
    Orc,
    DatastoreBackup,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationLoad {
    pub source_uris: Vec<Box<str>>,
    pub destination_table: TableReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_format: Option<SourceFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_leading_rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bad_records: Option<u32>,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub ignore_unknown_values: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autodetect: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationTableCopy {
    pub source_tables: Vec<TableReference>,
    pub destination_table: TableReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_disposition: Option<CreateDisposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationExtract {
    pub source_table: TableReference,
    pub destination_uris: Vec<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_format: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_header: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<JobListItem>,
}

/// `jobs.list` entries carry the job fields inline, plus a top level `state` and
/// `errorResult`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    #[serde(rename = "user_email", default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<Box<str>>,
    pub configuration: JobConfiguration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<JobState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_result: Option<ErrorProto>,
}

impl From<JobListItem> for Job {
    fn from(item: JobListItem) -> Self {
        let status = match item.status {
            Some(status) => Some(status),
            None => item.state.map(|state| JobStatus {
                error_result: item.error_result,
                errors: Vec::new(),
                state,
            }),
        };

        Job {
            kind: None,
            etag: None,
            id: item.id,
            self_link: None,
            user_email: item.user_email,
            configuration: item.configuration,
            job_reference: item.job_reference,
            statistics: item.statistics,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_deserialize_query() {
        const JSON: &str = r#"{
          "kind": "bigquery#job",
          "id": "my-project:US.job_123",
          "jobReference": { "projectId": "my-project", "jobId": "job_123", "location": "US" },
          "configuration": {
            "jobType": "QUERY",
            "query": {
              "query": "SELECT 1",
              "useLegacySql": false,
              "priority": "INTERACTIVE"
            }
          },
          "status": { "state": "DONE" },
          "statistics": {
            "creationTime": "1700000000000",
            "query": { "totalBytesProcessed": "1024", "cacheHit": true }
          }
        }"#;

        let job: Job = serde_json::from_str(JSON).unwrap();
        assert_eq!(job.status.as_ref().unwrap().state, JobState::Done);
        assert_eq!(job.configuration.job_type, Some(JobType::Query));
        match job.configuration.kind {
            JobConfigurationKind::Query(ref query) => {
                assert_eq!(&*query.query, "SELECT 1");
                assert_eq!(query.priority, Some(QueryPriority::Interactive));
            }
            ref other => panic!("expected a query config, got {other:?}"),
        }
        let stats = job.statistics.unwrap();
        assert_eq!(stats.creation_time, Some(1_700_000_000_000));
        assert_eq!(stats.query.unwrap().total_bytes_processed, Some(1024));
    }

    #[test]
    fn test_job_serialize_copy() {
        let table = |name: &str| TableReference {
            project_id: "p".into(),
            dataset_id: "d".into(),
            table_id: name.into(),
        };

        let config = JobConfiguration::from(JobConfigurationKind::Copy(JobConfigurationTableCopy {
            source_tables: vec![table("a")],
            destination_table: table("b"),
            create_disposition: None,
            write_disposition: Some(WriteDisposition::WriteTruncate),
        }));

        let json = serde_json::to_value(Job::new(config, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "configuration": {
                    "jobType": "COPY",
                    "copy": {
                        "sourceTables": [ { "projectId": "p", "datasetId": "d", "tableId": "a" } ],
                        "destinationTable": { "projectId": "p", "datasetId": "d", "tableId": "b" },
                        "writeDisposition": "WRITE_TRUNCATE"
                    }
                }
            })
        );
    }

    #[test]
    fn test_job_list_item_state_becomes_status() {
        const JSON: &str = r#"{
          "id": "p:job_1",
          "jobReference": { "projectId": "p", "jobId": "job_1" },
          "state": "RUNNING",
          "configuration": { "query": { "query": "SELECT 2" } }
        }"#;

        let item: JobListItem = serde_json::from_str(JSON).unwrap();
        let job = Job::from(item);
        assert_eq!(job.status.unwrap().state, JobState::Running);
        assert!(job.job_reference.unwrap().location.is_none());
    }
}
