//! Domain values handed to and returned from [`BigQuery`](crate::BigQuery)
//! operations, translated to and from the wire model in
//! [`bigquery_resources_rs`].

mod dataset;
mod error;
mod field_value;
mod insert;
mod job;
mod query;
mod schema;
mod table;

pub use dataset::{Acl, AclEntity, Dataset};
pub use error::BigQueryError;
pub use field_value::{FieldValue, FieldValueError, Row, row_from_wire};
pub use insert::{InsertAllRequest, InsertAllRequestBuilder, InsertAllResponse, RowToInsert};
pub use job::{
    CopyJobConfiguration, CreateDisposition, ExtractJobConfiguration, Job, JobConfiguration,
    JobState, JobStatistics, JobStatus, LoadJobConfiguration, QueryJobConfiguration, QueryPriority,
    SourceFormat, WriteDisposition,
};
pub use query::{QueryRequest, QueryResponse, QueryResult};
pub use schema::{Field, FieldMode, FieldType, Schema};
pub use table::{Clustering, Table, TableType, TimePartitioning, TimePartitioningType};
