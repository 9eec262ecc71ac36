use std::collections::HashMap;

use super::TableReference;
use crate::util::{self, int64};

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_reference: Option<TableReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<Box<str>, Box<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<TimePartitioning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustering: Option<Clustering>,
    #[serde(default, skip_serializing_if = "util::is_false")]
    pub require_partition_filter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Box<str>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub num_bytes: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub num_rows: Option<u64>,
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
    pub expiration_time: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub last_modified_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub ty: Option<TableType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableType {
    Table,
    View,
    External,
    MaterializedView,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub query: Box<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldSchema {
    pub name: Box<str>,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<FieldMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Box<str>>,
    /// Sub fields, only present on `RECORD` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<TableFieldSchema>,
}

impl TableFieldSchema {
    pub fn new(name: impl Into<Box<str>>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: None,
            description: None,
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldMode {
    Nullable,
    Repeated,
    Required,
}

impl FieldMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nullable => "Nullable",
            Self::Repeated => "Repeated",
            Self::Required => "Required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Bytes,
    #[serde(alias = "INT64")]
    Integer,
    #[serde(alias = "FLOAT64")]
    Float,
    #[serde(rename = "BOOLEAN", alias = "BOOL")]
    Bool,
    Timestamp,
    Date,
    Time,
    DateTime,
    Geography,
    Numeric,
    BigNumeric,
    Json,
    #[serde(alias = "STRUCT")]
    Record,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::Integer => "Int64",
            Self::Float => "Float64",
            Self::Bool => "Bool",
            Self::Timestamp => "Timestamp",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::DateTime => "DateTime",
            Self::Geography => "Geography",
            Self::Numeric => "Numeric",
            Self::BigNumeric => "BigNumeric",
            Self::Json => "Json",
            Self::Record => "Struct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePartitioning {
    #[serde(rename = "type")]
    pub ty: TimePartitioningType,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub expiration_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Box<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimePartitioningType {
    Day,
    Hour,
    Month,
    Year,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clustering {
    pub fields: Vec<Box<str>>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<Box<str>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "int64::optional"
    )]
    pub total_items: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_deserialize_nested_schema() {
        const JSON: &str = r#"{
          "kind": "bigquery#table",
          "id": "my-project:analytics.events",
          "tableReference": { "projectId": "my-project", "datasetId": "analytics", "tableId": "events" },
          "schema": {
            "fields": [
              { "name": "ts", "type": "TIMESTAMP", "mode": "REQUIRED" },
              { "name": "tags", "type": "STRING", "mode": "REPEATED" },
              {
                "name": "origin",
                "type": "RECORD",
                "fields": [
                  { "name": "lat", "type": "FLOAT64" },
                  { "name": "lon", "type": "FLOAT" }
                ]
              },
              { "name": "ok", "type": "BOOL" }
            ]
          },
          "numRows": "42",
          "type": "TABLE"
        }"#;

        let table: Table = serde_json::from_str(JSON).unwrap();
        let schema = table.schema.unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.fields[0].mode, Some(FieldMode::Required));
        assert_eq!(schema.fields[2].ty, FieldType::Record);
        assert_eq!(schema.fields[2].fields[0].ty, FieldType::Float);
        assert_eq!(schema.fields[2].fields[1].ty, FieldType::Float);
        assert_eq!(schema.fields[3].ty, FieldType::Bool);
        assert_eq!(table.num_rows, Some(42));
        assert_eq!(table.ty, Some(TableType::Table));
    }

    #[test]
    fn test_table_serialize_skips_empty() {
        let table = Table {
            table_reference: Some(TableReference {
                project_id: "p".into(),
                dataset_id: "d".into(),
                table_id: "t".into(),
            }),
            schema: Some(TableSchema {
                fields: vec![TableFieldSchema::new("count", FieldType::Integer)],
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tableReference": { "projectId": "p", "datasetId": "d", "tableId": "t" },
                "schema": { "fields": [ { "name": "count", "type": "INTEGER" } ] }
            })
        );
    }
}
