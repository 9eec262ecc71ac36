use std::sync::Arc;

use bigquery_resources_rs::query::GetQueryResultsResponse;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::client::{BigQuery, BigQueryOptions};
use crate::id::JobId;
use crate::options::QueryResultsOption;
use crate::page::{NextPageFetcher, Page};
use crate::resources::{
    BigQueryError, QueryRequest, QueryResponse, QueryResult, Row, Schema, row_from_wire,
};
use crate::rpc::{OptionMap, OptionValue, RpcOption};

impl BigQuery {
    /// Runs `request`, waiting up to its max wait time for the query to finish.
    ///
    /// If the query finishes in time the response carries the first page of rows,
    /// otherwise only the job id to poll with [`BigQuery::get_query_results`].
    pub async fn query(&self, request: &QueryRequest) -> crate::Result<QueryResponse> {
        let wire = request.to_wire(self.project_id());

        let rpc = self.options.rpc();
        let (project_id, wire) = (self.project_id(), &wire);
        let response = self
            .options
            .run(move || rpc.query(project_id, wire))
            .await?;

        if !response.job_complete {
            debug!(
                message = "query still running",
                job = ?response.job_reference,
                timeout_ms = ?request.max_wait_time().map(|wait| wait.as_millis()),
            );
        }

        // later pages are fetched through getQueryResults, at the same page size
        let mut options = OptionMap::new();
        if let Some(page_size) = request.page_size() {
            options.insert(RpcOption::MaxResults, OptionValue::U64(page_size.into()));
        }

        query_response(
            GetQueryResultsResponse::from(response),
            Arc::clone(&self.options),
            options,
        )
    }

    /// Fetches the results of a query job. An incomplete response means the job
    /// is still running, and the call can be repeated.
    pub async fn get_query_results(
        &self,
        job_id: &JobId,
        options: &[QueryResultsOption],
    ) -> crate::Result<QueryResponse> {
        let options = OptionMap::from_options(options)?;
        let job_id = job_id.set_project_id(self.project_id()).into_owned();

        get_query_results(Arc::new(job_id), Arc::clone(&self.options), options).await
    }
}

async fn get_query_results(
    job_id: Arc<JobId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<QueryResponse> {
    let reference = job_id.to_wire();

    let rpc = service.rpc();
    let response = {
        let (reference, options) = (&reference, &options);
        service
            .run(move || rpc.get_query_results(reference, options))
            .await?
    };

    query_response(response, service, options)
}

/// Translates either kind of query response. Rows are only present once the job
/// is complete, and can only be paged through if the response names its job.
fn query_response(
    response: GetQueryResultsResponse,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<QueryResponse> {
    let GetQueryResultsResponse {
        etag,
        job_reference,
        job_complete,
        schema,
        total_rows,
        page_token,
        rows,
        total_bytes_processed,
        cache_hit,
        num_dml_affected_rows,
        errors,
        ..
    } = response;

    let job_id = job_reference.map(JobId::from_wire);
    let execution_errors = errors.iter().map(BigQueryError::from_wire).collect();

    if !job_complete {
        return Ok(QueryResponse::new(job_id, etag, None, execution_errors));
    }

    let rows = rows
        .iter()
        .map(row_from_wire)
        .collect::<Result<Vec<_>, _>>()?;

    let rows = match job_id {
        Some(ref job_id) => Page::with_fetcher(page_token, rows, |cursor| {
            Arc::new(QueryResultsPageFetcher {
                job_id: Arc::new(job_id.clone()),
                options: options.with_page_token(cursor),
                service,
            })
        }),
        None => Page::single(rows),
    };

    let result = QueryResult::new(
        schema.map(Schema::from_wire),
        total_rows.unwrap_or(0),
        total_bytes_processed,
        cache_hit.unwrap_or(false),
        num_dml_affected_rows,
        rows,
    );

    Ok(QueryResponse::new(
        job_id,
        etag,
        Some(result),
        execution_errors,
    ))
}

#[derive(Debug)]
struct QueryResultsPageFetcher {
    job_id: Arc<JobId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
}

impl NextPageFetcher<Row> for QueryResultsPageFetcher {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<Row>>> {
        get_query_results(
            Arc::clone(&self.job_id),
            Arc::clone(&self.service),
            self.options.clone(),
        )
        .map(|response| {
            let rows = response?
                .into_result()
                .map(QueryResult::into_rows)
                .unwrap_or_else(Page::empty);
            Ok(rows)
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bigquery_resources_rs::query::QueryResponse as WireQueryResponse;
    use futures::TryStreamExt;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::id::DatasetId;
    use crate::resources::{FieldType, FieldValue};
    use crate::testing::{self, MockRpc, wire};

    fn schema() -> serde_json::Value {
        json!({ "fields": [
            { "name": "name", "type": "STRING" },
            { "name": "n", "type": "INTEGER" },
        ] })
    }

    fn row(name: &str, n: i64) -> serde_json::Value {
        json!({ "f": [{ "v": name }, { "v": n.to_string() }] })
    }

    #[tokio::test]
    async fn test_completed_query() {
        let rpc = MockRpc::new();
        rpc.push::<WireQueryResponse>(
            "query",
            Ok(wire(json!({
                "jobReference": { "projectId": "p", "jobId": "job_1", "location": "US" },
                "jobComplete": true,
                "schema": schema(),
                "totalRows": "3",
                "rows": [row("a", 1), row("b", 2), row("c", 3)],
                "totalBytesProcessed": "128",
                "cacheHit": false,
            }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let request = QueryRequest::new("SELECT name, n FROM t")
            .with_default_dataset(DatasetId::of("d"))
            .with_max_wait_time(Duration::from_secs(5));
        let response = client.query(&request).await.unwrap();

        assert!(response.job_completed());
        assert!(!response.has_errors());
        assert_eq!(
            response.job_id(),
            Some(&JobId::new("p", "job_1").with_location("US"))
        );

        let result = response.result().unwrap();
        assert_eq!(result.total_rows(), 3);
        assert_eq!(result.total_bytes_processed(), Some(128));
        assert!(!result.cache_hit());

        let schema = result.schema().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields()[1].field_type(), FieldType::Integer);

        let rows = result.rows();
        assert!(!rows.has_next_page());
        assert_eq!(rows.values().len(), 3);
        assert_eq!(rows.values()[2], vec![
            FieldValue::Primitive("c".into()),
            FieldValue::Primitive("3".into()),
        ]);

        let call = &rpc.calls_to("query")[0];
        assert_eq!(call.target, "p");
        let body = call.body.as_ref().unwrap();
        assert_eq!(body["timeoutMs"], json!(5000));
        assert_eq!(body["defaultDataset"]["projectId"], json!("p"));
    }

    #[tokio::test]
    async fn test_incomplete_query_then_poll() {
        let rpc = MockRpc::new();
        rpc.push::<WireQueryResponse>(
            "query",
            Ok(wire(json!({
                "jobReference": { "projectId": "p", "jobId": "job_2" },
                "jobComplete": false,
            }))),
        );
        rpc.push::<GetQueryResultsResponse>(
            "get_query_results",
            Ok(wire(json!({
                "jobReference": { "projectId": "p", "jobId": "job_2" },
                "jobComplete": true,
                "schema": schema(),
                "totalRows": "0",
                "cacheHit": true,
            }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let response = client.query(&QueryRequest::new("SELECT 1")).await.unwrap();
        assert!(!response.job_completed());
        assert!(response.result().is_none());

        let job_id = response.job_id().unwrap();
        let options = [QueryResultsOption::max_wait_time(Duration::from_secs(30))];
        let polled = client.get_query_results(job_id, &options).await.unwrap();

        let result = polled.into_result().unwrap();
        assert_eq!(result.total_rows(), 0);
        assert!(result.cache_hit());
        assert!(result.rows().values().is_empty());

        let call = &rpc.calls_to("get_query_results")[0];
        assert_eq!(call.target, "p/job_2");
        assert_eq!(call.options.timeout(), Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_result_rows_page_through_get_query_results() {
        let rpc = MockRpc::new();
        rpc.push::<WireQueryResponse>(
            "query",
            Ok(wire(json!({
                "jobReference": { "projectId": "p", "jobId": "job_3" },
                "jobComplete": true,
                "schema": schema(),
                "totalRows": "3",
                "pageToken": "page-2",
                "rows": [row("a", 1), row("b", 2)],
            }))),
        );
        rpc.push::<GetQueryResultsResponse>(
            "get_query_results",
            Ok(wire(json!({
                "jobReference": { "projectId": "p", "jobId": "job_3" },
                "jobComplete": true,
                "schema": schema(),
                "totalRows": "3",
                "rows": [row("c", 3)],
            }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let request = QueryRequest::new("SELECT name, n FROM t").with_page_size(2);
        let rows = client
            .query(&request)
            .await
            .unwrap()
            .into_result()
            .unwrap()
            .into_rows();

        let names = rows
            .into_stream()
            .map_ok(|row| row[0].as_str().unwrap().to_owned())
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(names, ["a", "b", "c"]);

        let call = &rpc.calls_to("get_query_results")[0];
        assert_eq!(call.target, "p/job_3");
        assert_eq!(call.options.page_token(), Some("page-2"));
        assert_eq!(call.options.max_results(), Some(2));
    }

    #[tokio::test]
    async fn test_execution_errors_are_data() {
        let rpc = MockRpc::new();
        rpc.push::<GetQueryResultsResponse>(
            "get_query_results",
            Ok(wire(json!({
                "jobComplete": true,
                "totalRows": "0",
                "errors": [{ "reason": "invalidQuery", "message": "warning" }],
            }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let response = client
            .get_query_results(&JobId::of("job_4"), &[])
            .await
            .unwrap();

        assert!(response.has_errors());
        assert_eq!(response.execution_errors()[0].reason(), Some("invalidQuery"));
        assert!(!response.result().unwrap().rows().has_next_page());
    }

    #[tokio::test]
    async fn test_missing_query_job_is_an_error() {
        let rpc = MockRpc::new();
        rpc.push::<GetQueryResultsResponse>(
            "get_query_results",
            Err(testing::status_error(StatusCode::NOT_FOUND, "notFound")),
        );
        let (client, _) = testing::client(&rpc).await;

        let error = client
            .get_query_results(&JobId::of("gone"), &[])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Service(_)));
        assert_eq!(error.code(), Some(404));
        assert_eq!(rpc.calls().len(), 1);
    }
}
