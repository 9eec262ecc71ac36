use bigquery_resources_rs::job::JobConfigurationTableCopy;

use super::{CreateDisposition, WriteDisposition, complete_table};
use crate::id::TableId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CopyJobConfiguration {
    pub source_tables: Vec<TableId>,
    pub destination_table: TableId,
    pub create_disposition: Option<CreateDisposition>,
    pub write_disposition: Option<WriteDisposition>,
}

impl CopyJobConfiguration {
    pub fn new(
        destination_table: TableId,
        source_tables: impl IntoIterator<Item = TableId>,
    ) -> Self {
        Self {
            source_tables: source_tables.into_iter().collect(),
            destination_table,
            create_disposition: None,
            write_disposition: None,
        }
    }

    pub fn with_create_disposition(mut self, disposition: CreateDisposition) -> Self {
        self.create_disposition = Some(disposition);
        self
    }

    pub fn with_write_disposition(mut self, disposition: WriteDisposition) -> Self {
        self.write_disposition = Some(disposition);
        self
    }

    pub(super) fn is_complete(&self) -> bool {
        self.destination_table.is_complete() && self.source_tables.iter().all(TableId::is_complete)
    }

    pub(super) fn complete(&mut self, project: &str) {
        complete_table(&mut self.destination_table, project);
        for table in self.source_tables.iter_mut() {
            complete_table(table, project);
        }
    }

    pub(super) fn from_wire(config: JobConfigurationTableCopy) -> Self {
        Self {
            source_tables: config.source_tables.into_iter().map(TableId::from_wire).collect(),
            destination_table: TableId::from_wire(config.destination_table),
            create_disposition: config.create_disposition,
            write_disposition: config.write_disposition,
        }
    }

    pub(super) fn to_wire(&self) -> JobConfigurationTableCopy {
        JobConfigurationTableCopy {
            source_tables: self.source_tables.iter().map(TableId::to_wire).collect(),
            destination_table: self.destination_table.to_wire(),
            create_disposition: self.create_disposition,
            write_disposition: self.write_disposition,
        }
    }
}
