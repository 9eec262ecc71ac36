use bigquery_resources_rs::job::JobConfigurationExtract;

use super::complete_table;
use crate::id::TableId;

/// Exports `source_table` to one or more Cloud Storage URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtractJobConfiguration {
    pub source_table: TableId,
    pub destination_uris: Vec<Box<str>>,
    /// `CSV`, `NEWLINE_DELIMITED_JSON`, `AVRO` or `PARQUET`.
    pub format: Option<Box<str>>,
    /// `GZIP`, `DEFLATE`, `SNAPPY` or `NONE`.
    pub compression: Option<Box<str>>,
    pub field_delimiter: Option<Box<str>>,
    pub print_header: Option<bool>,
}

impl ExtractJobConfiguration {
    pub fn new(
        source_table: TableId,
        destination_uris: impl IntoIterator<Item = impl Into<Box<str>>>,
    ) -> Self {
        Self {
            source_table,
            destination_uris: destination_uris.into_iter().map(Into::into).collect(),
            format: None,
            compression: None,
            field_delimiter: None,
            print_header: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<Box<str>>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_compression(mut self, compression: impl Into<Box<str>>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    pub fn with_field_delimiter(mut self, delimiter: impl Into<Box<str>>) -> Self {
        self.field_delimiter = Some(delimiter.into());
        self
    }

    pub fn with_print_header(mut self, print_header: bool) -> Self {
        self.print_header = Some(print_header);
        self
    }

    pub(super) fn is_complete(&self) -> bool {
        self.source_table.is_complete()
    }

    pub(super) fn complete(&mut self, project: &str) {
        complete_table(&mut self.source_table, project);
    }

    pub(super) fn from_wire(config: JobConfigurationExtract) -> Self {
        Self {
            source_table: TableId::from_wire(config.source_table),
            destination_uris: config.destination_uris,
            format: config.destination_format,
            compression: config.compression,
            field_delimiter: config.field_delimiter,
            print_header: config.print_header,
        }
    }

    pub(super) fn to_wire(&self) -> JobConfigurationExtract {
        JobConfigurationExtract {
            source_table: self.source_table.to_wire(),
            destination_uris: self.destination_uris.clone(),
            destination_format: self.format.clone(),
            compression: self.compression.clone(),
            field_delimiter: self.field_delimiter.clone(),
            print_header: self.print_header,
        }
    }
}
