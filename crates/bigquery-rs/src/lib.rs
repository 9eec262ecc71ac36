//! An async client for the BigQuery v2 REST API.
//!
//! Every operation hangs off [`BigQuery`], and runs through the same pipeline:
//! ids missing a project are completed with the client's, typed options are
//! folded into an [`OptionMap`](rpc::OptionMap), and the call is made through a
//! [`BigQueryRpc`](rpc::BigQueryRpc) under the client's retry policy.
//!
//! ```no_run
//! # async fn run() -> bigquery_rs::Result<()> {
//! use bigquery_rs::{BigQuery, QueryRequest};
//!
//! let client = BigQuery::new("my-project").await?;
//! let response = client.query(&QueryRequest::new("SELECT 1")).await?;
//!
//! if let Some(result) = response.result() {
//!     println!("{} rows", result.total_rows());
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate tracing;

mod client;
mod dataset;
mod error;
pub mod id;
mod job;
pub mod options;
pub mod page;
mod query;
pub mod resources;
mod retry;
pub mod rpc;
mod table;

#[cfg(test)]
mod testing;

pub use client::{BigQuery, BigQueryOptions, BigQueryOptionsBuilder};
pub use error::{Error, ServiceError};
pub use id::{DatasetId, JobId, TableId};
pub use page::{NextPageFetcher, Page};
pub use resources::{
    Dataset, FieldValue, InsertAllRequest, InsertAllResponse, Job, QueryRequest, QueryResponse,
    QueryResult, Row, RowToInsert, Schema, Table,
};
pub use retry::BigQueryRetryClassifier;

/// Type alias to [`core::result::Result<T, Error>`].
pub type Result<T> = core::result::Result<T, Error>;
