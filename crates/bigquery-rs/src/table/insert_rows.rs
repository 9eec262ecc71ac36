use net_utils::BackoffConfig;

use crate::client::BigQuery;
use crate::resources::{InsertAllRequest, InsertAllResponse};

impl BigQuery {
    /// Streams the rows of `request` into its table.
    ///
    /// Only retried when every row has an insert id, since the service can't
    /// deduplicate a retried row without one. Rows the service rejected are
    /// reported in the response, not as an error.
    pub async fn insert_all(&self, request: &InsertAllRequest) -> crate::Result<InsertAllResponse> {
        let table_id = request.table().set_project_id(self.project_id());
        let wire = request.to_wire();

        let no_retries = BackoffConfig::no_retries();
        let policy = if request.all_rows_have_ids() {
            self.options.retry_policy()
        } else {
            &no_retries
        };

        let rpc = self.options.rpc();
        let (reference, wire) = (table_id.reference(), &wire);
        let response = self
            .options
            .run_with(policy, move || rpc.insert_all(reference, wire))
            .await?;

        let response = InsertAllResponse::from_wire(response);
        if response.has_errors() {
            debug!(
                message = "rows rejected by streaming insert",
                table = %table_id.table(),
                rejected = response.insert_errors().len(),
                rows = request.rows().len(),
            );
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use bigquery_resources_rs::table_data::TableDataInsertAllResponse;
    use http::StatusCode;
    use serde_json::json;

    use crate::Error;
    use crate::id::TableId;
    use crate::resources::{InsertAllRequest, RowToInsert};
    use crate::testing::{self, MockRpc, wire};

    fn row(n: u64) -> RowToInsert {
        RowToInsert::from_serialize(&json!({ "n": n })).unwrap()
    }

    fn unavailable() -> crate::rpc::RpcError {
        testing::status_error(StatusCode::SERVICE_UNAVAILABLE, "backendError")
    }

    #[tokio::test]
    async fn test_insert_errors_are_keyed_by_row() {
        let rpc = MockRpc::new();
        rpc.push::<TableDataInsertAllResponse>(
            "insert_all",
            Ok(wire(json!({
                "insertErrors": [
                    { "index": 1, "errors": [{ "reason": "invalid", "message": "bad n" }] },
                ]
            }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let request = InsertAllRequest::builder(TableId::of("d", "t"))
            .add_row(row(1).with_id("a"))
            .add_row(row(2))
            .add_row(row(3).with_id("c"))
            .skip_invalid_rows(true)
            .build();
        let response = client.insert_all(&request).await.unwrap();

        assert!(response.has_errors());
        assert!(response.errors_for(0).is_empty());
        assert_eq!(response.errors_for(1)[0].reason(), Some("invalid"));
        assert!(response.errors_for(2).is_empty());

        let call = &rpc.calls_to("insert_all")[0];
        assert_eq!(call.target, "p/d/t");
        assert_eq!(
            call.body.as_ref().unwrap()["rows"],
            json!([
                { "insertId": "a", "json": { "n": 1 } },
                { "json": { "n": 2 } },
                { "insertId": "c", "json": { "n": 3 } },
            ])
        );
    }

    #[tokio::test]
    async fn test_rows_without_ids_get_one_attempt() {
        let rpc = MockRpc::new();
        rpc.push::<TableDataInsertAllResponse>("insert_all", Err(unavailable()));
        let (client, clock) = testing::client(&rpc).await;

        let request = InsertAllRequest::of(TableId::of("d", "t"), [row(1).with_id("a"), row(2)]);
        let error = client.insert_all(&request).await.unwrap_err();

        assert!(matches!(error, Error::Service(_)));
        assert!(error.is_retryable());
        assert_eq!(rpc.calls_to("insert_all").len(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_rows_with_ids_are_retried() {
        let rpc = MockRpc::new();
        rpc.push::<TableDataInsertAllResponse>("insert_all", Err(unavailable()));
        rpc.push::<TableDataInsertAllResponse>("insert_all", Ok(wire(json!({}))));
        let (client, clock) = testing::client(&rpc).await;

        let request = InsertAllRequest::of(TableId::of("d", "t"), [row(1).with_id("a")]);
        let response = client.insert_all(&request).await.unwrap();

        assert!(!response.has_errors());
        assert_eq!(rpc.calls_to("insert_all").len(), 2);
        assert_eq!(clock.sleeps().len(), 1);
    }
}
