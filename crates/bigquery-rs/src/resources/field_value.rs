use std::fmt;

use base64::Engine;
use bigquery_resources_rs::table_data::{TableCell, TableRow};
use serde_json::Value;

/// A single value in a row, decoded from the `{"f": [{"v": ...}]}` encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Null,
    /// Every scalar is transported as a string, and parsed on access.
    Primitive(Box<str>),
    Repeated(Vec<FieldValue>),
    Record(Vec<FieldValue>),
}

/// The values of a row, in schema order.
pub type Row = Vec<FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldValueError {
    #[error("value is null")]
    Null,
    #[error("expected a {expected} value, found a {found} value")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
    #[error("'{value}' is not a valid {expected}")]
    Parse {
        value: Box<str>,
        expected: &'static str,
    },
    #[error("unexpected cell value: {0}")]
    Malformed(Box<str>),
}

impl FieldValue {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Primitive(_) => "primitive",
            Self::Repeated(_) => "repeated",
            Self::Record(_) => "record",
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Result<&str, FieldValueError> {
        match self {
            Self::Primitive(s) => Ok(s),
            Self::Null => Err(FieldValueError::Null),
            other => Err(FieldValueError::WrongKind {
                expected: "primitive",
                found: other.kind(),
            }),
        }
    }

    fn parse<T: std::str::FromStr>(&self, expected: &'static str) -> Result<T, FieldValueError> {
        let s = self.as_str()?;
        s.parse().map_err(|_| FieldValueError::Parse {
            value: s.into(),
            expected,
        })
    }

    pub fn as_i64(&self) -> Result<i64, FieldValueError> {
        self.parse("integer")
    }

    pub fn as_f64(&self) -> Result<f64, FieldValueError> {
        self.parse("float")
    }

    pub fn as_bool(&self) -> Result<bool, FieldValueError> {
        let s = self.as_str()?;
        if s.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if s.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(FieldValueError::Parse {
                value: s.into(),
                expected: "boolean",
            })
        }
    }

    /// `TIMESTAMP` values arrive as (possibly fractional) seconds since the epoch.
    /// Returns microseconds since the epoch.
    pub fn as_timestamp_micros(&self) -> Result<i64, FieldValueError> {
        let seconds: f64 = self.parse("timestamp")?;
        Ok((seconds * 1_000_000.0).round() as i64)
    }

    /// `BYTES` values are base64 encoded.
    pub fn as_bytes(&self) -> Result<Vec<u8>, FieldValueError> {
        let s = self.as_str()?;
        base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| FieldValueError::Parse {
                value: s.into(),
                expected: "base64 string",
            })
    }

    pub fn as_repeated(&self) -> Result<&[FieldValue], FieldValueError> {
        match self {
            Self::Repeated(values) => Ok(values),
            Self::Null => Err(FieldValueError::Null),
            other => Err(FieldValueError::WrongKind {
                expected: "repeated",
                found: other.kind(),
            }),
        }
    }

    pub fn as_record(&self) -> Result<&[FieldValue], FieldValueError> {
        match self {
            Self::Record(values) => Ok(values),
            Self::Null => Err(FieldValueError::Null),
            other => Err(FieldValueError::WrongKind {
                expected: "record",
                found: other.kind(),
            }),
        }
    }

    /// Decodes the `v` of a cell. Arrays are repeated values (each element wrapped
    /// in another `{"v": ...}`), and objects with an `f` key are records.
    pub fn from_json(value: &Value) -> Result<Self, FieldValueError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::String(s) => Ok(Self::Primitive(s.as_str().into())),
            // not sent by the service, but cheap to accept
            Value::Bool(b) => Ok(Self::Primitive(b.to_string().into_boxed_str())),
            Value::Number(n) => Ok(Self::Primitive(n.to_string().into_boxed_str())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_cell_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Repeated),
            Value::Object(map) => match map.get("f") {
                Some(Value::Array(cells)) => cells
                    .iter()
                    .map(Self::from_cell_json)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Record),
                _ => Err(FieldValueError::Malformed(value.to_string().into_boxed_str())),
            },
        }
    }

    fn from_cell_json(cell: &Value) -> Result<Self, FieldValueError> {
        match cell {
            Value::Object(map) => match map.get("v") {
                Some(inner) => Self::from_json(inner),
                None => Err(FieldValueError::Malformed(cell.to_string().into_boxed_str())),
            },
            other => Self::from_json(other),
        }
    }

    pub fn from_cell(cell: &TableCell) -> Result<Self, FieldValueError> {
        Self::from_json(&cell.v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_list(f: &mut fmt::Formatter<'_>, values: &[FieldValue]) -> fmt::Result {
            for (idx, value) in values.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                fmt::Display::fmt(value, f)?;
            }
            Ok(())
        }

        match self {
            Self::Null => f.write_str("NULL"),
            Self::Primitive(s) => f.write_str(s),
            Self::Repeated(values) => {
                f.write_str("[")?;
                write_list(f, values)?;
                f.write_str("]")
            }
            Self::Record(values) => {
                f.write_str("(")?;
                write_list(f, values)?;
                f.write_str(")")
            }
        }
    }
}

pub fn row_from_wire(row: &TableRow) -> Result<Row, FieldValueError> {
    row.f.iter().map(FieldValue::from_cell).collect()
}
