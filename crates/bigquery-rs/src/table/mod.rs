use std::sync::Arc;

use bigquery_resources_rs::table_data::TableDataList;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::client::{BigQuery, BigQueryOptions};
use crate::id::{DatasetId, TableId};
use crate::options::{TableDataListOption, TableListOption, TableOption};
use crate::page::{NextPageFetcher, Page};
use crate::resources::{Row, Table, row_from_wire};
use crate::rpc::{Listing, OptionMap};

mod insert_rows;

impl BigQuery {
    pub async fn create_table(
        &self,
        table: &Table,
        options: &[TableOption],
    ) -> crate::Result<Table> {
        let options = OptionMap::from_options(options)?;
        let wire = table.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (wire, options) = (&wire, &options);
        let created = self
            .options
            .run(move || rpc.create_table(wire, options))
            .await?;

        debug!(message = "created table", table = ?created.table_reference);
        Ok(Table::from_wire(created))
    }

    /// `None` if the table doesn't exist.
    pub async fn get_table(
        &self,
        table_id: &TableId,
        options: &[TableOption],
    ) -> crate::Result<Option<Table>> {
        let options = OptionMap::from_options(options)?;
        let table_id = table_id.set_project_id(self.project_id());

        let rpc = self.options.rpc();
        let (reference, options) = (table_id.reference(), &options);
        let table = self
            .options
            .run(move || rpc.get_table(reference, options))
            .await?;

        Ok(table.map(Table::from_wire))
    }

    /// Lists the tables in `dataset_id`. Listed tables only carry a subset of their
    /// fields, i.e no schema.
    pub async fn list_tables(
        &self,
        dataset_id: &DatasetId,
        options: &[TableListOption],
    ) -> crate::Result<Page<Table>> {
        let options = OptionMap::from_options(options)?;
        let dataset_id = dataset_id.set_project_id(self.project_id()).into_owned();

        list_tables(Arc::new(dataset_id), Arc::clone(&self.options), options).await
    }

    /// Returns `false` if there was no table to delete.
    pub async fn delete_table(&self, table_id: &TableId) -> crate::Result<bool> {
        let table_id = table_id.set_project_id(self.project_id());

        let rpc = self.options.rpc();
        let reference = table_id.reference();
        self.options.run(move || rpc.delete_table(reference)).await
    }

    pub async fn update_table(
        &self,
        table: &Table,
        options: &[TableOption],
    ) -> crate::Result<Table> {
        let options = OptionMap::from_options(options)?;
        let wire = table.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (wire, options) = (&wire, &options);
        let updated = self
            .options
            .run(move || rpc.patch_table(wire, options))
            .await?;

        Ok(Table::from_wire(updated))
    }

    /// Reads the rows of `table_id`, in storage order.
    pub async fn list_table_data(
        &self,
        table_id: &TableId,
        options: &[TableDataListOption],
    ) -> crate::Result<Page<Row>> {
        let options = OptionMap::from_options(options)?;
        let table_id = table_id.set_project_id(self.project_id()).into_owned();

        list_table_data(Arc::new(table_id), Arc::clone(&self.options), options).await
    }
}

async fn list_tables(
    dataset_id: Arc<DatasetId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<Page<Table>> {
    let rpc = service.rpc();
    let listing = {
        let (reference, options) = (dataset_id.reference(), &options);
        service
            .run(move || rpc.list_tables(reference, options))
            .await?
    };

    let Listing {
        next_page_token,
        items,
    } = listing;
    let tables = items.into_iter().map(Table::from_wire).collect();

    Ok(Page::with_fetcher(next_page_token, tables, |cursor| {
        Arc::new(TablePageFetcher {
            options: options.with_page_token(cursor),
            dataset_id,
            service,
        })
    }))
}

#[derive(Debug)]
struct TablePageFetcher {
    dataset_id: Arc<DatasetId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
}

impl NextPageFetcher<Table> for TablePageFetcher {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<Table>>> {
        list_tables(
            Arc::clone(&self.dataset_id),
            Arc::clone(&self.service),
            self.options.clone(),
        )
        .boxed()
    }
}

async fn list_table_data(
    table_id: Arc<TableId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<Page<Row>> {
    let rpc = service.rpc();
    let data = {
        let (reference, options) = (table_id.reference(), &options);
        service
            .run(move || rpc.list_table_data(reference, options))
            .await?
    };

    let TableDataList {
        page_token, rows, ..
    } = data;
    let rows = rows
        .iter()
        .map(row_from_wire)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page::with_fetcher(page_token, rows, |cursor| {
        Arc::new(TableDataPageFetcher {
            options: options.with_page_token(cursor),
            table_id,
            service,
        })
    }))
}

#[derive(Debug)]
struct TableDataPageFetcher {
    table_id: Arc<TableId>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
}

impl NextPageFetcher<Row> for TableDataPageFetcher {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<Row>>> {
        list_table_data(
            Arc::clone(&self.table_id),
            Arc::clone(&self.service),
            self.options.clone(),
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use bigquery_resources_rs::table::Table as WireTable;
    use futures::TryStreamExt;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::Error;
    use crate::options::TableField;
    use crate::resources::{Field, FieldType, FieldValue, Schema, TableType};
    use crate::testing::{self, MockRpc, wire};

    fn wire_table(table: &str) -> WireTable {
        wire(json!({
            "tableReference": { "projectId": "p", "datasetId": "d", "tableId": table },
            "type": "TABLE",
        }))
    }

    fn rows(values: &[&str]) -> serde_json::Value {
        values
            .iter()
            .map(|value| json!({ "f": [{ "v": value }] }))
            .collect()
    }

    #[tokio::test]
    async fn test_create_table_completes_id() {
        let rpc = MockRpc::new();
        rpc.push("create_table", Ok(wire_table("t")));
        let (client, _) = testing::client(&rpc).await;

        let table = Table::new(
            TableId::of("d", "t"),
            Schema::of([Field::new("n", FieldType::Integer)]),
        );
        let created = client.create_table(&table, &[]).await.unwrap();

        assert_eq!(created.table_id(), &TableId::new("p", "d", "t"));
        assert_eq!(created.table_type(), Some(TableType::Table));

        let call = &rpc.calls_to("create_table")[0];
        assert_eq!(call.target, "p/d/t");
        assert_eq!(
            call.body.as_ref().unwrap()["schema"],
            json!({ "fields": [{ "name": "n", "type": "INTEGER" }] })
        );
    }

    #[tokio::test]
    async fn test_get_table() {
        let rpc = MockRpc::new();
        rpc.push("get_table", Ok(Some(wire_table("t"))));
        rpc.push::<Option<WireTable>>("get_table", Ok(None));
        let (client, _) = testing::client(&rpc).await;

        let options = [TableOption::fields(&[TableField::NumRows])];
        let found = client
            .get_table(&TableId::of("d", "t"), &options)
            .await
            .unwrap();
        assert_eq!(found.unwrap().table_id().table(), "t");

        let missing = client.get_table(&TableId::of("d", "gone"), &[]).await.unwrap();
        assert!(missing.is_none());

        let calls = rpc.calls_to("get_table");
        assert_eq!(calls[0].options.fields(), Some("tableReference,type,numRows"));
        assert_eq!(calls[1].target, "p/d/gone");
    }

    #[tokio::test]
    async fn test_list_tables_follows_cursor() {
        let rpc = MockRpc::new();
        rpc.push(
            "list_tables",
            Ok(Listing::new(Some("next".into()), vec![wire_table("a")])),
        );
        rpc.push("list_tables", Ok(Listing::new(None, vec![wire_table("b")])));
        let (client, _) = testing::client(&rpc).await;

        let first = client
            .list_tables(&DatasetId::of("d"), &[TableListOption::page_size(1)])
            .await
            .unwrap();
        assert_eq!(first.values().len(), 1);

        let second = first.next_page().await.unwrap().unwrap();
        assert_eq!(second.values()[0].table_id().table(), "b");
        assert!(!second.has_next_page());

        let calls = rpc.calls_to("list_tables");
        assert_eq!(calls[1].target, "p/d");
        assert_eq!(calls[1].options.page_token(), Some("next"));
        assert_eq!(calls[1].options.max_results(), Some(1));
    }

    #[tokio::test]
    async fn test_delete_table_is_not_retried_on_client_errors() {
        let rpc = MockRpc::new();
        rpc.push::<bool>(
            "delete_table",
            Err(testing::status_error(StatusCode::FORBIDDEN, "accessDenied")),
        );
        let (client, clock) = testing::client(&rpc).await;

        let error = client
            .delete_table(&TableId::of("d", "t"))
            .await
            .unwrap_err();

        assert_eq!(error.code(), Some(403));
        assert!(matches!(error, Error::Service(_)));
        assert_eq!(rpc.calls_to("delete_table").len(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_update_table() {
        let rpc = MockRpc::new();
        rpc.push("patch_table", Ok(wire_table("t")));
        let (client, _) = testing::client(&rpc).await;

        let table = Table::of(TableId::new("other", "d", "t")).with_description("updated");
        client.update_table(&table, &[]).await.unwrap();

        let call = &rpc.calls_to("patch_table")[0];
        assert_eq!(call.target, "other/d/t");
        assert_eq!(call.body.as_ref().unwrap()["description"], json!("updated"));
    }

    #[tokio::test]
    async fn test_list_table_data_streams_rows() {
        let rpc = MockRpc::new();
        rpc.push::<TableDataList>(
            "list_table_data",
            Ok(wire(json!({ "totalRows": "3", "pageToken": "t2", "rows": rows(&["1", "2"]) }))),
        );
        rpc.push::<TableDataList>(
            "list_table_data",
            Ok(wire(json!({ "totalRows": "3", "rows": rows(&["3"]) }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let options = [TableDataListOption::start_index(0)];
        let values = client
            .list_table_data(&TableId::of("d", "t"), &options)
            .await
            .unwrap()
            .into_stream()
            .map_ok(|row| row[0].as_i64().unwrap())
            .try_collect::<Vec<_>>()
            .await
            .unwrap();

        assert_eq!(values, [1, 2, 3]);

        let calls = rpc.calls_to("list_table_data");
        assert_eq!(calls[1].options.page_token(), Some("t2"));
        assert_eq!(calls[1].options.start_index(), Some(0));
    }

    #[tokio::test]
    async fn test_malformed_rows_are_an_error() {
        let rpc = MockRpc::new();
        rpc.push::<TableDataList>(
            "list_table_data",
            Ok(wire(json!({ "rows": [{ "f": [{ "v": { "x": 1 } }] }] }))),
        );
        let (client, _) = testing::client(&rpc).await;

        let error = client
            .list_table_data(&TableId::of("d", "t"), &[])
            .await
            .unwrap_err();

        assert!(matches!(error, Error::MalformedRow(_)));
    }

    #[test]
    fn test_null_cells_decode() {
        let row = wire(json!({ "f": [{ "v": null }, { "v": "x" }] }));
        assert_eq!(row_from_wire(&row).unwrap(), vec![
            FieldValue::Null,
            FieldValue::Primitive("x".into())
        ]);
    }
}
