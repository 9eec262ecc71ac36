//! Typed options for each operation. Every option maps onto a single
//! [`RpcOption`], and passing the same kind twice to one call is rejected.

use std::time::Duration;

use bigquery_resources_rs::job::JobState;

use crate::rpc::{OptionValue, RpcOption, ToRpcOption};

macro_rules! rpc_options {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(RpcOption, OptionValue);

            impl ToRpcOption for $name {
                #[inline]
                fn to_rpc_option(&self) -> (RpcOption, OptionValue) {
                    (self.0, self.1.clone())
                }
            }
        )*
    };
}

rpc_options! {
    /// Options for getting, creating and updating datasets.
    DatasetOption;
    DatasetListOption;
    DatasetDeleteOption;
    /// Options for getting, creating and updating tables.
    TableOption;
    TableListOption;
    TableDataListOption;
    /// Options for getting, creating and cancelling jobs.
    JobOption;
    JobListOption;
    QueryResultsOption;
}

/// A resource field that can be requested through the `fields` parameter.
pub trait FieldSelector: Copy + PartialEq + 'static {
    /// Always requested, since the client can't build the resource without them.
    const REQUIRED: &'static [Self];

    fn selector(&self) -> &'static str;
}

fn push_unique<'a>(dst: &mut Vec<&'a str>, selector: &'a str) {
    if !dst.contains(&selector) {
        dst.push(selector);
    }
}

/// Joins the required fields, then `fields`, then `extra`, dropping duplicates.
fn select<F: FieldSelector>(fields: &[F], extra: &[&'static str]) -> Box<str> {
    let mut selectors = Vec::with_capacity(F::REQUIRED.len() + fields.len() + extra.len());

    for field in F::REQUIRED.iter().chain(fields) {
        push_unique(&mut selectors, field.selector());
    }
    for &selector in extra {
        push_unique(&mut selectors, selector);
    }

    selectors.join(",").into_boxed_str()
}

/// The projection for a list call, where each resource is nested in `collection`.
fn select_list<F: FieldSelector>(
    collection: &str,
    fields: &[F],
    extra: &[&'static str],
) -> Box<str> {
    format!("nextPageToken,{collection}({})", select(fields, extra)).into_boxed_str()
}

macro_rules! field_selectors {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $selector:literal,)*
        }
        required = [$($required:ident),* $(,)?];
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl FieldSelector for $name {
            const REQUIRED: &'static [Self] = &[$(Self::$required),*];

            fn selector(&self) -> &'static str {
                match self {
                    $(Self::$variant => $selector,)*
                }
            }
        }
    };
}

field_selectors! {
    pub enum DatasetField {
        Access => "access",
        CreationTime => "creationTime",
        DatasetReference => "datasetReference",
        DefaultTableExpirationMs => "defaultTableExpirationMs",
        Description => "description",
        Etag => "etag",
        FriendlyName => "friendlyName",
        Id => "id",
        Labels => "labels",
        LastModifiedTime => "lastModifiedTime",
        Location => "location",
        SelfLink => "selfLink",
    }
    required = [DatasetReference];
}

field_selectors! {
    pub enum TableField {
        Clustering => "clustering",
        CreationTime => "creationTime",
        Description => "description",
        Etag => "etag",
        ExpirationTime => "expirationTime",
        FriendlyName => "friendlyName",
        Id => "id",
        Labels => "labels",
        LastModifiedTime => "lastModifiedTime",
        Location => "location",
        NumBytes => "numBytes",
        NumRows => "numRows",
        Schema => "schema",
        SelfLink => "selfLink",
        TableReference => "tableReference",
        TimePartitioning => "timePartitioning",
        Type => "type",
        View => "view",
    }
    required = [TableReference, Type];
}

field_selectors! {
    pub enum JobField {
        Configuration => "configuration",
        Etag => "etag",
        Id => "id",
        JobReference => "jobReference",
        SelfLink => "selfLink",
        Statistics => "statistics",
        Status => "status",
        UserEmail => "user_email",
    }
    required = [JobReference, Configuration];
}

fn page_size(size: u64) -> (RpcOption, OptionValue) {
    (RpcOption::MaxResults, OptionValue::U64(size))
}

fn page_token(token: impl Into<Box<str>>) -> (RpcOption, OptionValue) {
    (RpcOption::PageToken, OptionValue::Str(token.into()))
}

fn fields<F: FieldSelector>(fields: &[F]) -> (RpcOption, OptionValue) {
    (RpcOption::Fields, OptionValue::Str(select(fields, &[])))
}

impl DatasetOption {
    /// Only return `fields` (plus the required ones) of the dataset.
    pub fn fields(selected: &[DatasetField]) -> Self {
        let (kind, value) = fields(selected);
        Self(kind, value)
    }
}

impl DatasetListOption {
    pub fn page_size(size: u64) -> Self {
        let (kind, value) = page_size(size);
        Self(kind, value)
    }

    pub fn page_token(token: impl Into<Box<str>>) -> Self {
        let (kind, value) = page_token(token);
        Self(kind, value)
    }

    /// Include hidden datasets.
    pub fn all() -> Self {
        Self(RpcOption::AllDatasets, OptionValue::Bool(true))
    }
}

impl DatasetDeleteOption {
    /// Delete the dataset even if it still contains tables.
    pub fn delete_contents() -> Self {
        Self(RpcOption::DeleteContents, OptionValue::Bool(true))
    }
}

impl TableOption {
    pub fn fields(selected: &[TableField]) -> Self {
        let (kind, value) = fields(selected);
        Self(kind, value)
    }
}

impl TableListOption {
    pub fn page_size(size: u64) -> Self {
        let (kind, value) = page_size(size);
        Self(kind, value)
    }

    pub fn page_token(token: impl Into<Box<str>>) -> Self {
        let (kind, value) = page_token(token);
        Self(kind, value)
    }
}

impl TableDataListOption {
    pub fn page_size(size: u64) -> Self {
        let (kind, value) = page_size(size);
        Self(kind, value)
    }

    pub fn page_token(token: impl Into<Box<str>>) -> Self {
        let (kind, value) = page_token(token);
        Self(kind, value)
    }

    /// Zero based index of the first row to return.
    pub fn start_index(index: u64) -> Self {
        Self(RpcOption::StartIndex, OptionValue::U64(index))
    }
}

impl JobOption {
    pub fn fields(selected: &[JobField]) -> Self {
        let (kind, value) = fields(selected);
        Self(kind, value)
    }
}

impl JobListOption {
    pub fn page_size(size: u64) -> Self {
        let (kind, value) = page_size(size);
        Self(kind, value)
    }

    pub fn page_token(token: impl Into<Box<str>>) -> Self {
        let (kind, value) = page_token(token);
        Self(kind, value)
    }

    /// List jobs of every user in the project, not just the caller's.
    pub fn all_users() -> Self {
        Self(RpcOption::AllUsers, OptionValue::Bool(true))
    }

    /// Only list jobs in one of `states`.
    pub fn state_filter(states: &[JobState]) -> Self {
        Self(RpcOption::StateFilter, OptionValue::States(states.to_vec()))
    }

    /// The list projection also always includes each job's `state` and
    /// `errorResult`.
    pub fn fields(selected: &[JobField]) -> Self {
        let selector = select_list("jobs", selected, &["state", "errorResult"]);
        Self(RpcOption::Fields, OptionValue::Str(selector))
    }
}

impl QueryResultsOption {
    pub fn page_size(size: u64) -> Self {
        let (kind, value) = page_size(size);
        Self(kind, value)
    }

    pub fn page_token(token: impl Into<Box<str>>) -> Self {
        let (kind, value) = page_token(token);
        Self(kind, value)
    }

    pub fn start_index(index: u64) -> Self {
        Self(RpcOption::StartIndex, OptionValue::U64(index))
    }

    /// How long to wait for the query to complete before returning an incomplete
    /// response.
    pub fn max_wait_time(wait: Duration) -> Self {
        Self(RpcOption::Timeout, OptionValue::Duration(wait))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::OptionMap;

    #[test]
    fn test_fields_always_include_required() {
        let (kind, value) = DatasetOption::fields(&[DatasetField::Description]).to_rpc_option();
        assert_eq!(kind, RpcOption::Fields);
        assert_eq!(value.as_str(), Some("datasetReference,description"));

        let (_, value) =
            TableOption::fields(&[TableField::Schema, TableField::Type]).to_rpc_option();
        assert_eq!(value.as_str(), Some("tableReference,type,schema"));
    }

    #[test]
    fn test_job_list_fields() {
        let (_, value) = JobListOption::fields(&[JobField::Statistics]).to_rpc_option();
        assert_eq!(
            value.as_str(),
            Some("nextPageToken,jobs(jobReference,configuration,statistics,state,errorResult)")
        );
    }

    #[test]
    fn test_typed_options_into_map() {
        let map = OptionMap::from_options(&[
            JobListOption::page_size(25),
            JobListOption::all_users(),
            JobListOption::state_filter(&[JobState::Running, JobState::Done]),
        ])
        .unwrap();

        assert_eq!(map.max_results(), Some(25));
        assert!(map.flag(RpcOption::AllUsers));
        assert_eq!(map.to_query_pairs(), vec![
            ("maxResults", "25".to_owned()),
            ("allUsers", "true".to_owned()),
            ("stateFilter", "running".to_owned()),
            ("stateFilter", "done".to_owned()),
        ]);
    }

    #[test]
    fn test_repeated_kind_is_rejected() {
        let error = OptionMap::from_options(&[
            TableDataListOption::page_size(10),
            TableDataListOption::start_index(5),
            TableDataListOption::page_size(20),
        ])
        .unwrap_err();

        assert_eq!(error.to_string(), "Duplicate option maxResults");
    }
}
