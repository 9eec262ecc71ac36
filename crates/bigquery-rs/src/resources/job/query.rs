use bigquery_resources_rs::job::JobConfigurationQuery;

use super::{CreateDisposition, QueryPriority, WriteDisposition, complete_dataset, complete_table};
use crate::id::{DatasetId, TableId};

/// Runs `query`, optionally writing the results to a destination table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryJobConfiguration {
    pub query: Box<str>,
    pub destination_table: Option<TableId>,
    pub default_dataset: Option<DatasetId>,
    pub create_disposition: Option<CreateDisposition>,
    pub write_disposition: Option<WriteDisposition>,
    pub priority: Option<QueryPriority>,
    pub use_legacy_sql: Option<bool>,
    pub use_query_cache: Option<bool>,
    pub allow_large_results: Option<bool>,
    pub flatten_results: Option<bool>,
    pub maximum_bytes_billed: Option<i64>,
}

impl QueryJobConfiguration {
    pub fn new(query: impl Into<Box<str>>) -> Self {
        Self {
            query: query.into(),
            destination_table: None,
            default_dataset: None,
            create_disposition: None,
            write_disposition: None,
            priority: None,
            use_legacy_sql: None,
            use_query_cache: None,
            allow_large_results: None,
            flatten_results: None,
            maximum_bytes_billed: None,
        }
    }

    pub fn with_destination_table(mut self, table: TableId) -> Self {
        self.destination_table = Some(table);
        self
    }

    pub fn with_default_dataset(mut self, dataset: DatasetId) -> Self {
        self.default_dataset = Some(dataset);
        self
    }

    pub fn with_create_disposition(mut self, disposition: CreateDisposition) -> Self {
        self.create_disposition = Some(disposition);
        self
    }

    pub fn with_write_disposition(mut self, disposition: WriteDisposition) -> Self {
        self.write_disposition = Some(disposition);
        self
    }

    pub fn with_priority(mut self, priority: QueryPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_legacy_sql(mut self, use_legacy_sql: bool) -> Self {
        self.use_legacy_sql = Some(use_legacy_sql);
        self
    }

    pub fn with_query_cache(mut self, use_query_cache: bool) -> Self {
        self.use_query_cache = Some(use_query_cache);
        self
    }

    pub fn with_maximum_bytes_billed(mut self, bytes: i64) -> Self {
        self.maximum_bytes_billed = Some(bytes);
        self
    }

    pub(super) fn is_complete(&self) -> bool {
        self.destination_table.as_ref().is_none_or(TableId::is_complete)
            && self.default_dataset.as_ref().is_none_or(DatasetId::is_complete)
    }

    pub(super) fn complete(&mut self, project: &str) {
        if let Some(ref mut table) = self.destination_table {
            complete_table(table, project);
        }
        if let Some(ref mut dataset) = self.default_dataset {
            complete_dataset(dataset, project);
        }
    }

    pub(super) fn from_wire(config: JobConfigurationQuery) -> Self {
        Self {
            query: config.query,
            destination_table: config.destination_table.map(TableId::from_wire),
            default_dataset: config.default_dataset.map(DatasetId::from_wire),
            create_disposition: config.create_disposition,
            write_disposition: config.write_disposition,
            priority: config.priority,
            use_legacy_sql: config.use_legacy_sql,
            use_query_cache: config.use_query_cache,
            allow_large_results: config.allow_large_results,
            flatten_results: config.flatten_results,
            maximum_bytes_billed: config.maximum_bytes_billed,
        }
    }

    pub(super) fn to_wire(&self) -> JobConfigurationQuery {
        JobConfigurationQuery {
            query: self.query.clone(),
            destination_table: self.destination_table.as_ref().map(TableId::to_wire),
            default_dataset: self.default_dataset.as_ref().map(DatasetId::to_wire),
            create_disposition: self.create_disposition,
            write_disposition: self.write_disposition,
            priority: self.priority,
            use_legacy_sql: self.use_legacy_sql,
            use_query_cache: self.use_query_cache,
            allow_large_results: self.allow_large_results,
            flatten_results: self.flatten_results,
            maximum_bytes_billed: self.maximum_bytes_billed,
        }
    }
}
