use std::borrow::Cow;
use std::collections::BTreeMap;

use bigquery_resources_rs::job::{
    Job as WireJob, JobConfiguration as WireJobConfiguration, JobConfigurationKind,
    JobStatistics as WireJobStatistics, JobStatus as WireJobStatus,
};
pub use bigquery_resources_rs::job::{
    CreateDisposition, JobState, QueryPriority, SourceFormat, WriteDisposition,
};

use super::error::BigQueryError;
use super::schema::Schema;
use crate::id::{DatasetId, JobId, TableId};

mod copy;
mod extract;
mod load;
mod query;

pub use copy::CopyJobConfiguration;
pub use extract::ExtractJobConfiguration;
pub use load::LoadJobConfiguration;
pub use query::QueryJobConfiguration;

fn complete_table(table: &mut TableId, project: &str) {
    if !table.is_complete() {
        *table = table.set_project_id(project).into_owned();
    }
}

fn complete_dataset(dataset: &mut DatasetId, project: &str) {
    if !dataset.is_complete() {
        *dataset = dataset.set_project_id(project).into_owned();
    }
}

/// What a job does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobConfiguration {
    Query(QueryJobConfiguration),
    Load(LoadJobConfiguration),
    Copy(CopyJobConfiguration),
    Extract(ExtractJobConfiguration),
}

impl JobConfiguration {
    fn is_complete(&self) -> bool {
        match self {
            Self::Query(config) => config.is_complete(),
            Self::Load(config) => config.is_complete(),
            Self::Copy(config) => config.is_complete(),
            Self::Extract(config) => config.is_complete(),
        }
    }

    fn complete(&mut self, project: &str) {
        match self {
            Self::Query(config) => config.complete(project),
            Self::Load(config) => config.complete(project),
            Self::Copy(config) => config.complete(project),
            Self::Extract(config) => config.complete(project),
        }
    }

    fn from_wire(kind: JobConfigurationKind) -> Self {
        match kind {
            JobConfigurationKind::Query(config) => {
                Self::Query(QueryJobConfiguration::from_wire(config))
            }
            JobConfigurationKind::Load(config) => {
                Self::Load(LoadJobConfiguration::from_wire(config))
            }
            JobConfigurationKind::Copy(config) => {
                Self::Copy(CopyJobConfiguration::from_wire(config))
            }
            JobConfigurationKind::Extract(config) => {
                Self::Extract(ExtractJobConfiguration::from_wire(config))
            }
        }
    }

    fn to_wire(&self) -> JobConfigurationKind {
        match self {
            Self::Query(config) => JobConfigurationKind::Query(config.to_wire()),
            Self::Load(config) => JobConfigurationKind::Load(config.to_wire()),
            Self::Copy(config) => JobConfigurationKind::Copy(config.to_wire()),
            Self::Extract(config) => JobConfigurationKind::Extract(config.to_wire()),
        }
    }
}

impl From<QueryJobConfiguration> for JobConfiguration {
    fn from(config: QueryJobConfiguration) -> Self {
        Self::Query(config)
    }
}

impl From<LoadJobConfiguration> for JobConfiguration {
    fn from(config: LoadJobConfiguration) -> Self {
        Self::Load(config)
    }
}

impl From<CopyJobConfiguration> for JobConfiguration {
    fn from(config: CopyJobConfiguration) -> Self {
        Self::Copy(config)
    }
}

impl From<ExtractJobConfiguration> for JobConfiguration {
    fn from(config: ExtractJobConfiguration) -> Self {
        Self::Extract(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobStatus {
    state: JobState,
    error: Option<BigQueryError>,
    execution_errors: Vec<BigQueryError>,
}

impl JobStatus {
    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == JobState::Done
    }

    /// Set when the job failed as a whole.
    pub fn error(&self) -> Option<&BigQueryError> {
        self.error.as_ref()
    }

    /// Every error encountered while running, which doesn't necessarily mean the
    /// job failed.
    pub fn execution_errors(&self) -> &[BigQueryError] {
        &self.execution_errors
    }

    fn from_wire(status: WireJobStatus) -> Self {
        Self {
            state: status.state,
            error: status.error_result.as_ref().map(BigQueryError::from_wire),
            execution_errors: status.errors.iter().map(BigQueryError::from_wire).collect(),
        }
    }

    fn to_wire(&self) -> WireJobStatus {
        WireJobStatus {
            error_result: self.error.as_ref().map(BigQueryError::to_wire),
            errors: self.execution_errors.iter().map(BigQueryError::to_wire).collect(),
            state: self.state,
        }
    }
}

/// Statistics reported for a job. Times are milliseconds since the epoch. Which of
/// the type specific fields are set depends on the kind of job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JobStatistics {
    pub creation_time: Option<i64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub total_bytes_processed: Option<i64>,
    pub total_bytes_billed: Option<i64>,
    pub cache_hit: Option<bool>,
    pub billing_tier: Option<i32>,
    pub query_schema: Option<Schema>,
    pub input_files: Option<i64>,
    pub input_file_bytes: Option<i64>,
    pub output_rows: Option<i64>,
    pub output_bytes: Option<i64>,
    pub destination_uri_file_counts: Vec<i64>,
}

impl JobStatistics {
    fn from_wire(stats: WireJobStatistics) -> Self {
        let mut out = Self {
            creation_time: stats.creation_time,
            start_time: stats.start_time,
            end_time: stats.end_time,
            total_bytes_processed: stats.total_bytes_processed,
            ..Default::default()
        };

        if let Some(query) = stats.query {
            out.total_bytes_processed = query.total_bytes_processed.or(out.total_bytes_processed);
            out.total_bytes_billed = query.total_bytes_billed;
            out.cache_hit = query.cache_hit;
            out.billing_tier = query.billing_tier;
            out.query_schema = query.schema.map(Schema::from_wire);
        }

        if let Some(load) = stats.load {
            out.input_files = load.input_files;
            out.input_file_bytes = load.input_file_bytes;
            out.output_rows = load.output_rows;
            out.output_bytes = load.output_bytes;
        }

        if let Some(extract) = stats.extract {
            out.destination_uri_file_counts = extract.destination_uri_file_counts;
        }

        out
    }
}

/// A job, either as submitted or as reported back by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    job_id: Option<JobId>,
    configuration: JobConfiguration,
    dry_run: bool,
    labels: BTreeMap<Box<str>, Box<str>>,
    etag: Option<Box<str>>,
    generated_id: Option<Box<str>>,
    self_link: Option<Box<str>>,
    user_email: Option<Box<str>>,
    status: Option<JobStatus>,
    statistics: Option<JobStatistics>,
}

impl Job {
    pub fn new(configuration: impl Into<JobConfiguration>) -> Self {
        Self {
            job_id: None,
            configuration: configuration.into(),
            dry_run: false,
            labels: BTreeMap::new(),
            etag: None,
            generated_id: None,
            self_link: None,
            user_email: None,
            status: None,
            statistics: None,
        }
    }

    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_label(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    pub fn configuration(&self) -> &JobConfiguration {
        &self.configuration
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn labels(&self) -> &BTreeMap<Box<str>, Box<str>> {
        &self.labels
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn generated_id(&self) -> Option<&str> {
        self.generated_id.as_deref()
    }

    pub fn self_link(&self) -> Option<&str> {
        self.self_link.as_deref()
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    pub fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }

    pub fn statistics(&self) -> Option<&JobStatistics> {
        self.statistics.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.status.as_ref().is_some_and(JobStatus::is_done)
    }

    /// A job is complete once its id, and every table or dataset its configuration
    /// references, carries a project.
    pub fn is_complete(&self) -> bool {
        self.job_id.as_ref().is_some_and(JobId::is_complete) && self.configuration.is_complete()
    }

    /// Fills in `project` wherever it's missing, assigning a random job id if there
    /// isn't one. Returns `self` untouched if nothing needed completing.
    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            return Cow::Borrowed(self);
        }

        let mut job = self.clone();
        let job_id = job.job_id.take().unwrap_or_else(JobId::random);
        job.job_id = Some(job_id.set_project_id(project).into_owned());
        job.configuration.complete(project);
        Cow::Owned(job)
    }

    pub fn from_wire(job: WireJob) -> Self {
        Self {
            job_id: job.job_reference.map(JobId::from_wire),
            configuration: JobConfiguration::from_wire(job.configuration.kind),
            dry_run: job.configuration.dry_run,
            labels: job.configuration.labels.into_iter().collect(),
            etag: job.etag,
            generated_id: job.id,
            self_link: job.self_link,
            user_email: job.user_email,
            status: job.status.map(JobStatus::from_wire),
            statistics: job.statistics.map(JobStatistics::from_wire),
        }
    }

    /// Only the fields accepted by `jobs.insert` are included.
    pub fn to_wire(&self) -> WireJob {
        let kind = self.configuration.to_wire();
        let configuration = WireJobConfiguration {
            dry_run: self.dry_run,
            labels: self
                .labels
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            ..WireJobConfiguration::from(kind)
        };

        let mut job = WireJob::new(configuration, self.job_id.as_ref().map(JobId::to_wire));
        job.etag = self.etag.clone();
        job.status = self.status.as_ref().map(JobStatus::to_wire);
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_project_id_completes_references() {
        let job = Job::new(
            QueryJobConfiguration::new("SELECT 1")
                .with_destination_table(TableId::of("d", "out"))
                .with_default_dataset(DatasetId::of("d")),
        )
        .with_job_id(JobId::of("j1"));

        let completed = job.set_project_id("p");
        assert!(matches!(completed, Cow::Owned(_)));
        assert_eq!(completed.job_id(), Some(&JobId::new("p", "j1")));

        let JobConfiguration::Query(ref config) = *completed.configuration() else {
            panic!("expected a query configuration");
        };
        assert_eq!(config.destination_table, Some(TableId::new("p", "d", "out")));
        assert_eq!(config.default_dataset, Some(DatasetId::new("p", "d")));

        let again = completed.set_project_id("other");
        assert!(std::ptr::eq(&*again, &*completed));
    }

    #[test]
    fn test_set_project_id_assigns_a_job_id() {
        let job = Job::new(CopyJobConfiguration::new(TableId::new("p", "d", "dst"), [
            TableId::of("d", "src"),
        ]));

        let completed = job.set_project_id("p");
        let job_id = completed.job_id().unwrap();
        assert_eq!(job_id.project(), Some("p"));
        assert!(!job_id.job().is_empty());
    }

    #[test]
    fn test_from_wire_job() {
        let wire: WireJob = serde_json::from_value(serde_json::json!({
            "id": "p:EU.j1",
            "jobReference": { "projectId": "p", "jobId": "j1", "location": "EU" },
            "configuration": {
                "jobType": "LOAD",
                "load": {
                    "sourceUris": ["gs://bucket/a.csv"],
                    "destinationTable": { "projectId": "p", "datasetId": "d", "tableId": "t" },
                    "sourceFormat": "CSV",
                    "skipLeadingRows": 1
                }
            },
            "status": {
                "state": "DONE",
                "errorResult": { "reason": "invalid", "message": "bad row" },
                "errors": [{ "reason": "invalid", "message": "bad row" }]
            },
            "statistics": {
                "creationTime": "1000",
                "load": { "outputRows": "42" }
            }
        }))
        .unwrap();

        let job = Job::from_wire(wire);
        assert_eq!(job.job_id(), Some(&JobId::new("p", "j1").with_location("EU")));
        assert!(job.is_done());

        let status = job.status().unwrap();
        assert_eq!(status.error().map(BigQueryError::message), Some("bad row"));
        assert_eq!(status.execution_errors().len(), 1);

        let stats = job.statistics().unwrap();
        assert_eq!(stats.creation_time, Some(1000));
        assert_eq!(stats.output_rows, Some(42));

        let JobConfiguration::Load(ref config) = *job.configuration() else {
            panic!("expected a load configuration");
        };
        assert_eq!(config.skip_leading_rows, Some(1));
        assert_eq!(config.source_format, Some(SourceFormat::Csv));
    }

    #[test]
    fn test_to_wire_serializes_configuration() {
        let job = Job::new(
            ExtractJobConfiguration::new(TableId::new("p", "d", "t"), ["gs://bucket/out-*.json"])
                .with_format("NEWLINE_DELIMITED_JSON"),
        )
        .with_job_id(JobId::new("p", "j2"))
        .with_label("team", "data");

        let json = serde_json::to_value(job.to_wire()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "jobReference": { "projectId": "p", "jobId": "j2" },
                "configuration": {
                    "jobType": "EXTRACT",
                    "labels": { "team": "data" },
                    "extract": {
                        "sourceTable": { "projectId": "p", "datasetId": "d", "tableId": "t" },
                        "destinationUris": ["gs://bucket/out-*.json"],
                        "destinationFormat": "NEWLINE_DELIMITED_JSON"
                    }
                }
            })
        );
    }
}
