//! Identifiers for datasets, tables and jobs.
//!
//! An identifier without a project is incomplete. Operations on
//! [`BigQuery`](crate::BigQuery) complete it with the client's project before it
//! reaches the transport.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use bigquery_resources_rs::job::JobReference;
use bigquery_resources_rs::{DatasetReference, TableReference};
use regex::Regex;

use crate::Error;

/// Prefix shared by every resource URL.
pub const BASE_URL: &str = "https://www.googleapis.com/bigquery/v2/projects/";

static DATASET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.googleapis\.com/bigquery/v2/projects/([^/]+)/datasets/([^/]+)$")
        .expect("dataset url regex is valid")
});

static TABLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://www\.googleapis\.com/bigquery/v2/projects/([^/]+)/datasets/([^/]+)/tables/([^/]+)$",
    )
    .expect("table url regex is valid")
});

static JOB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://www\.googleapis\.com/bigquery/v2/projects/([^/]+)/jobs/([^/?]+)(?:\?location=([^/&]+))?$",
    )
    .expect("job url regex is valid")
});

/// Matches `url` against `regex`, returning the `N` capture groups.
fn parse_url<'a, const N: usize>(
    regex: &Regex,
    url: &'a str,
    kind: &str,
) -> crate::Result<[&'a str; N]> {
    let invalid = || Error::invalid_argument(format!("{url} is not a valid {kind} URL"));

    let captures = regex.captures(url).ok_or_else(invalid)?;

    let mut parts = [""; N];
    for (idx, part) in parts.iter_mut().enumerate() {
        *part = captures.get(idx + 1).ok_or_else(invalid)?.as_str();
    }

    Ok(parts)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId {
    project: Option<Box<str>>,
    dataset: Box<str>,
}

impl DatasetId {
    /// A dataset id in the client's default project.
    pub fn of(dataset: impl Into<Box<str>>) -> Self {
        Self {
            project: None,
            dataset: dataset.into(),
        }
    }

    pub fn new(project: impl Into<Box<str>>, dataset: impl Into<Box<str>>) -> Self {
        Self {
            project: Some(project.into()),
            dataset: dataset.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn is_complete(&self) -> bool {
        self.project.is_some()
    }

    /// Returns `self` untouched if it already has a project, otherwise a copy with
    /// `project` filled in.
    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::new(project, self.dataset.clone()))
        }
    }

    /// The canonical URL, only available once the id is complete.
    pub fn self_link(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        Some(format!("{BASE_URL}{project}/datasets/{}", self.dataset))
    }

    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, dataset] = parse_url(&DATASET_URL, url, "dataset")?;
        Ok(Self::new(project, dataset))
    }

    pub fn matches_url(url: &str) -> bool {
        DATASET_URL.is_match(url)
    }

    pub fn table(&self, table: impl Into<Box<str>>) -> TableId {
        TableId {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
            table: table.into(),
        }
    }

    /// The wire reference. Incomplete ids produce an empty project.
    pub fn reference(&self) -> DatasetReference<&str> {
        DatasetReference {
            project_id: self.project.as_deref().unwrap_or_default(),
            dataset_id: &self.dataset,
        }
    }

    pub fn to_wire(&self) -> DatasetReference {
        DatasetReference {
            project_id: self.project.clone().unwrap_or_default(),
            dataset_id: self.dataset.clone(),
        }
    }

    pub fn from_wire(reference: DatasetReference) -> Self {
        Self::new(reference.project_id, reference.dataset_id)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.project {
            Some(ref project) => write!(f, "{project}:{}", self.dataset),
            None => f.write_str(&self.dataset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId {
    project: Option<Box<str>>,
    dataset: Box<str>,
    table: Box<str>,
}

impl TableId {
    pub fn of(dataset: impl Into<Box<str>>, table: impl Into<Box<str>>) -> Self {
        Self {
            project: None,
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    pub fn new(
        project: impl Into<Box<str>>,
        dataset: impl Into<Box<str>>,
        table: impl Into<Box<str>>,
    ) -> Self {
        Self {
            project: Some(project.into()),
            dataset: dataset.into(),
            table: table.into(),
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn dataset_id(&self) -> DatasetId {
        DatasetId {
            project: self.project.clone(),
            dataset: self.dataset.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.project.is_some()
    }

    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::new(project, self.dataset.clone(), self.table.clone()))
        }
    }

    pub fn self_link(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        Some(format!(
            "{BASE_URL}{project}/datasets/{}/tables/{}",
            self.dataset, self.table
        ))
    }

    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, dataset, table] = parse_url(&TABLE_URL, url, "table")?;
        Ok(Self::new(project, dataset, table))
    }

    pub fn matches_url(url: &str) -> bool {
        TABLE_URL.is_match(url)
    }

    pub fn reference(&self) -> TableReference<&str> {
        TableReference {
            project_id: self.project.as_deref().unwrap_or_default(),
            dataset_id: &self.dataset,
            table_id: &self.table,
        }
    }

    pub fn to_wire(&self) -> TableReference {
        TableReference {
            project_id: self.project.clone().unwrap_or_default(),
            dataset_id: self.dataset.clone(),
            table_id: self.table.clone(),
        }
    }

    pub fn from_wire(reference: TableReference) -> Self {
        Self::new(reference.project_id, reference.dataset_id, reference.table_id)
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref project) = self.project {
            write!(f, "{project}:")?;
        }
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId {
    project: Option<Box<str>>,
    job: Box<str>,
    location: Option<Box<str>>,
}

impl JobId {
    pub fn of(job: impl Into<Box<str>>) -> Self {
        Self {
            project: None,
            job: job.into(),
            location: None,
        }
    }

    pub fn new(project: impl Into<Box<str>>, job: impl Into<Box<str>>) -> Self {
        Self {
            project: Some(project.into()),
            job: job.into(),
            location: None,
        }
    }

    /// A job id in the client's default project, named by a random uuid.
    pub fn random() -> Self {
        Self::of(uuid::Uuid::new_v4().to_string())
    }

    /// Pins the job to a location. Jobs outside of the `US` and `EU` multi regions
    /// can only be looked up with their location.
    pub fn with_location(mut self, location: impl Into<Box<str>>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.project.is_some()
    }

    pub fn set_project_id(&self, project: &str) -> Cow<'_, Self> {
        if self.is_complete() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self {
                project: Some(project.into()),
                job: self.job.clone(),
                location: self.location.clone(),
            })
        }
    }

    pub fn self_link(&self) -> Option<String> {
        let project = self.project.as_deref()?;
        let mut url = format!("{BASE_URL}{project}/jobs/{}", self.job);
        if let Some(ref location) = self.location {
            url.push_str("?location=");
            url.push_str(location);
        }
        Some(url)
    }

    /// Parses a job URL. A trailing `?location=` query pins the location.
    pub fn from_url(url: &str) -> crate::Result<Self> {
        let [project, job] = parse_url(&JOB_URL, url, "job")?;
        let location = JOB_URL
            .captures(url)
            .and_then(|captures| captures.get(3))
            .map(|location| location.as_str().into());

        Ok(Self {
            location,
            ..Self::new(project, job)
        })
    }

    pub fn matches_url(url: &str) -> bool {
        JOB_URL.is_match(url)
    }

    pub fn to_wire(&self) -> JobReference {
        JobReference {
            project_id: self.project.clone().unwrap_or_default(),
            job_id: self.job.clone(),
            location: self.location.clone(),
        }
    }

    pub fn from_wire(reference: JobReference) -> Self {
        Self {
            project: Some(reference.project_id),
            job: reference.job_id,
            location: reference.location,
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref project) = self.project {
            write!(f, "{project}:")?;
        }
        if let Some(ref location) = self.location {
            write!(f, "{location}.")?;
        }
        f.write_str(&self.job)
    }
}
