use bigquery_resources_rs::job::JobConfigurationLoad;

use super::{CreateDisposition, SourceFormat, WriteDisposition, complete_table};
use crate::id::TableId;
use crate::resources::schema::Schema;

/// Loads files from Cloud Storage into `destination_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadJobConfiguration {
    pub source_uris: Vec<Box<str>>,
    pub destination_table: TableId,
    pub schema: Option<Schema>,
    pub source_format: Option<SourceFormat>,
    pub create_disposition: Option<CreateDisposition>,
    pub write_disposition: Option<WriteDisposition>,
    /// CSV only.
    pub field_delimiter: Option<Box<str>>,
    /// CSV only.
    pub skip_leading_rows: Option<u32>,
    pub max_bad_records: Option<u32>,
    pub ignore_unknown_values: bool,
    pub autodetect: Option<bool>,
}

impl LoadJobConfiguration {
    pub fn new(
        destination_table: TableId,
        source_uris: impl IntoIterator<Item = impl Into<Box<str>>>,
    ) -> Self {
        Self {
            source_uris: source_uris.into_iter().map(Into::into).collect(),
            destination_table,
            schema: None,
            source_format: None,
            create_disposition: None,
            write_disposition: None,
            field_delimiter: None,
            skip_leading_rows: None,
            max_bad_records: None,
            ignore_unknown_values: false,
            autodetect: None,
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_source_format(mut self, format: SourceFormat) -> Self {
        self.source_format = Some(format);
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

    pub fn with_field_delimiter(mut self, delimiter: impl Into<Box<str>>) -> Self {
        self.field_delimiter = Some(delimiter.into());
        self
    }

    pub fn with_skip_leading_rows(mut self, rows: u32) -> Self {
        self.skip_leading_rows = Some(rows);
        self
    }

    pub fn with_max_bad_records(mut self, records: u32) -> Self {
        self.max_bad_records = Some(records);
        self
    }

    pub fn with_ignore_unknown_values(mut self, ignore: bool) -> Self {
        self.ignore_unknown_values = ignore;
        self
    }

    pub fn with_autodetect(mut self, autodetect: bool) -> Self {
        self.autodetect = Some(autodetect);
        self
    }

    pub(super) fn is_complete(&self) -> bool {
        self.destination_table.is_complete()
    }

    pub(super) fn complete(&mut self, project: &str) {
        complete_table(&mut self.destination_table, project);
    }

    pub(super) fn from_wire(config: JobConfigurationLoad) -> Self {
        Self {
            source_uris: config.source_uris,
            destination_table: TableId::from_wire(config.destination_table),
            schema: config.schema.map(Schema::from_wire),
            source_format: config.source_format,
            create_disposition: config.create_disposition,
            write_disposition: config.write_disposition,
            field_delimiter: config.field_delimiter,
            skip_leading_rows: config.skip_leading_rows,
            max_bad_records: config.max_bad_records,
            ignore_unknown_values: config.ignore_unknown_values,
            autodetect: config.autodetect,
        }
    }

    pub(super) fn to_wire(&self) -> JobConfigurationLoad {
        JobConfigurationLoad {
            source_uris: self.source_uris.clone(),
            destination_table: self.destination_table.to_wire(),
            schema: self.schema.as_ref().map(Schema::to_wire),
            source_format: self.source_format,
            create_disposition: self.create_disposition,
            write_disposition: self.write_disposition,
            field_delimiter: self.field_delimiter.clone(),
            skip_leading_rows: self.skip_leading_rows,
            max_bad_records: self.max_bad_records,
            ignore_unknown_values: self.ignore_unknown_values,
            autodetect: self.autodetect,
        }
    }
}
