use std::collections::BTreeMap;

use bigquery_resources_rs::table_data::{
    InsertRow, TableDataInsertAllRequest, TableDataInsertAllResponse,
};
use serde_json::{Map, Value};

use super::error::BigQueryError;
use crate::id::TableId;

/// A single row for a streaming insert. The optional id lets the service drop
/// duplicate inserts, and is what makes retrying an insert safe.
#[derive(Debug, Clone, PartialEq)]
pub struct RowToInsert {
    id: Option<Box<str>>,
    content: Map<String, Value>,
}

impl RowToInsert {
    pub fn of(content: Map<String, Value>) -> Self {
        Self { id: None, content }
    }

    pub fn with_id(mut self, id: impl Into<Box<str>>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Serializes `row`, which must serialize to a JSON object.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(row: &T) -> crate::Result<Self> {
        match serde_json::to_value(row) {
            Ok(Value::Object(content)) => Ok(Self::of(content)),
            Ok(other) => Err(crate::Error::invalid_argument(format!(
                "row must serialize to a JSON object, got {other}"
            ))),
            Err(error) => Err(crate::Error::invalid_argument(format!(
                "row failed to serialize: {error}"
            ))),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    fn to_wire(&self) -> InsertRow {
        InsertRow {
            insert_id: self.id.clone(),
            json: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertAllRequest {
    table: TableId,
    rows: Vec<RowToInsert>,
    skip_invalid_rows: bool,
    ignore_unknown_values: bool,
    template_suffix: Option<Box<str>>,
}

impl InsertAllRequest {
    pub fn builder(table: TableId) -> InsertAllRequestBuilder {
        InsertAllRequestBuilder {
            request: Self {
                table,
                rows: Vec::new(),
                skip_invalid_rows: false,
                ignore_unknown_values: false,
                template_suffix: None,
            },
        }
    }

    pub fn of(table: TableId, rows: impl IntoIterator<Item = RowToInsert>) -> Self {
        Self::builder(table).add_rows(rows).build()
    }

    pub fn table(&self) -> &TableId {
        &self.table
    }

    pub fn rows(&self) -> &[RowToInsert] {
        &self.rows
    }

    pub fn skip_invalid_rows(&self) -> bool {
        self.skip_invalid_rows
    }

    pub fn ignore_unknown_values(&self) -> bool {
        self.ignore_unknown_values
    }

    pub fn template_suffix(&self) -> Option<&str> {
        self.template_suffix.as_deref()
    }

    /// Retrying without an id on every row risks inserting a row twice.
    pub fn all_rows_have_ids(&self) -> bool {
        self.rows.iter().all(|row| row.id.is_some())
    }

    pub fn to_wire(&self) -> TableDataInsertAllRequest {
        TableDataInsertAllRequest {
            kind: None,
            skip_invalid_rows: self.skip_invalid_rows,
            ignore_unknown_values: self.ignore_unknown_values,
            template_suffix: self.template_suffix.clone(),
            trace_id: None,
            rows: self.rows.iter().map(RowToInsert::to_wire).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertAllRequestBuilder {
    request: InsertAllRequest,
}

impl InsertAllRequestBuilder {
    pub fn add_row(mut self, row: RowToInsert) -> Self {
        self.request.rows.push(row);
        self
    }

    pub fn add_rows(mut self, rows: impl IntoIterator<Item = RowToInsert>) -> Self {
        self.request.rows.extend(rows);
        self
    }

    /// Insert the valid rows of a request even if some rows are invalid.
    pub fn skip_invalid_rows(mut self, skip: bool) -> Self {
        self.request.skip_invalid_rows = skip;
        self
    }

    pub fn ignore_unknown_values(mut self, ignore: bool) -> Self {
        self.request.ignore_unknown_values = ignore;
        self
    }

    /// Inserts into `{table}{suffix}` instead, creating it from the base table's
    /// schema if needed.
    pub fn template_suffix(mut self, suffix: impl Into<Box<str>>) -> Self {
        self.request.template_suffix = Some(suffix.into());
        self
    }

    pub fn build(self) -> InsertAllRequest {
        self.request
    }
}

/// Per row errors of a streaming insert, keyed by the index of the row in the
/// request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InsertAllResponse {
    errors: BTreeMap<u32, Vec<BigQueryError>>,
}

impl InsertAllResponse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn insert_errors(&self) -> &BTreeMap<u32, Vec<BigQueryError>> {
        &self.errors
    }

    pub fn errors_for(&self, index: u32) -> &[BigQueryError] {
        self.errors.get(&index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn from_wire(response: TableDataInsertAllResponse) -> Self {
        let mut errors: BTreeMap<u32, Vec<BigQueryError>> = BTreeMap::new();
        for insert_errors in response.insert_errors {
            errors
                .entry(insert_errors.index)
                .or_default()
                .extend(insert_errors.errors.iter().map(BigQueryError::from_wire));
        }
        Self { errors }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(serde::Serialize)]
    struct Reading {
        sensor: &'static str,
        value: f64,
    }

    #[test]
    fn test_from_serialize() {
        let row = RowToInsert::from_serialize(&Reading {
            sensor: "a",
            value: 1.5,
        })
        .unwrap()
        .with_id("r1");

        assert_eq!(row.id(), Some("r1"));
        assert_eq!(row.content().get("sensor"), Some(&json!("a")));

        let err = RowToInsert::from_serialize(&[1, 2]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidArgument(_)));
    }

    #[test]
    fn test_all_rows_have_ids() {
        let content = |n: i64| {
            let mut map = Map::new();
            map.insert("n".to_owned(), json!(n));
            map
        };

        let table = TableId::new("p", "d", "t");
        let with_ids = InsertAllRequest::of(table.clone(), [
            RowToInsert::of(content(1)).with_id("a"),
            RowToInsert::of(content(2)).with_id("b"),
        ]);
        assert!(with_ids.all_rows_have_ids());

        let mixed = InsertAllRequest::builder(table)
            .add_row(RowToInsert::of(content(1)).with_id("a"))
            .add_row(RowToInsert::of(content(2)))
            .skip_invalid_rows(true)
            .build();
        assert!(!mixed.all_rows_have_ids());

        let wire = serde_json::to_value(mixed.to_wire()).unwrap();
        assert_eq!(
            wire,
            json!({
                "skipInvalidRows": true,
                "rows": [
                    { "insertId": "a", "json": { "n": 1 } },
                    { "json": { "n": 2 } }
                ]
            })
        );
    }

    #[test]
    fn test_response_groups_errors_by_row() {
        let wire: TableDataInsertAllResponse = serde_json::from_value(json!({
            "kind": "bigquery#tableDataInsertAllResponse",
            "insertErrors": [
                { "index": 1, "errors": [{ "reason": "invalid", "message": "no such field" }] }
            ]
        }))
        .unwrap();

        let response = InsertAllResponse::from_wire(wire);
        assert!(response.has_errors());
        assert!(response.errors_for(0).is_empty());
        assert_eq!(response.errors_for(1).len(), 1);
        assert_eq!(response.errors_for(1)[0].reason(), Some("invalid"));
    }
}
