use std::fmt;

use bigquery_resources_rs::ErrorProto;

/// A structured error record, as attached to failed jobs, queries, row inserts and
/// error responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigQueryError {
    reason: Option<Box<str>>,
    location: Option<Box<str>>,
    message: Box<str>,
    debug_info: Option<Box<str>>,
}

impl BigQueryError {
    pub fn new(
        reason: impl Into<Box<str>>,
        location: impl Into<Box<str>>,
        message: impl Into<Box<str>>,
    ) -> Self {
        Self {
            reason: Some(reason.into()),
            location: Some(location.into()),
            message: message.into(),
            debug_info: None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn debug_info(&self) -> Option<&str> {
        self.debug_info.as_deref()
    }

    pub fn from_wire(error: &ErrorProto) -> Self {
        Self {
            reason: error.reason.clone(),
            location: error.location.clone(),
            message: error.message.clone(),
            debug_info: error.debug_info.clone(),
        }
    }

    pub fn to_wire(&self) -> ErrorProto {
        ErrorProto {
            reason: self.reason.clone(),
            location: self.location.clone(),
            debug_info: self.debug_info.clone(),
            message: self.message.clone(),
        }
    }
}

impl fmt::Display for BigQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(ref reason) = self.reason {
            write!(f, " ({reason})")?;
        }
        if let Some(ref location) = self.location {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}
