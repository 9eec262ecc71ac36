use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::client::{BigQuery, BigQueryOptions};
use crate::id::DatasetId;
use crate::options::{DatasetDeleteOption, DatasetListOption, DatasetOption};
use crate::page::{NextPageFetcher, Page};
use crate::resources::Dataset;
use crate::rpc::{Listing, OptionMap};

impl BigQuery {
    /// Creates `dataset`, resolving a missing project against the client's.
    pub async fn create_dataset(
        &self,
        dataset: &Dataset,
        options: &[DatasetOption],
    ) -> crate::Result<Dataset> {
        let options = OptionMap::from_options(options)?;
        let wire = dataset.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (wire, options) = (&wire, &options);
        let created = self
            .options
            .run(move || rpc.create_dataset(wire, options))
            .await?;

        debug!(message = "created dataset", dataset = ?created.dataset_reference);
        Ok(Dataset::from_wire(created))
    }

    /// `None` if the dataset doesn't exist.
    pub async fn get_dataset(
        &self,
        dataset_id: &DatasetId,
        options: &[DatasetOption],
    ) -> crate::Result<Option<Dataset>> {
        let options = OptionMap::from_options(options)?;
        let dataset_id = dataset_id.set_project_id(self.project_id());

        let rpc = self.options.rpc();
        let (reference, options) = (dataset_id.reference(), &options);
        let dataset = self
            .options
            .run(move || rpc.get_dataset(reference, options))
            .await?;

        Ok(dataset.map(Dataset::from_wire))
    }

    /// Lists the datasets in the client's project.
    pub async fn list_datasets(
        &self,
        options: &[DatasetListOption],
    ) -> crate::Result<Page<Dataset>> {
        self.list_datasets_in(self.project_id(), options).await
    }

    pub async fn list_datasets_in(
        &self,
        project_id: &str,
        options: &[DatasetListOption],
    ) -> crate::Result<Page<Dataset>> {
        let options = OptionMap::from_options(options)?;
        list_datasets(Arc::from(project_id), Arc::clone(&self.options), options).await
    }

    /// Returns `false` if there was no dataset to delete.
    pub async fn delete_dataset(
        &self,
        dataset_id: &DatasetId,
        options: &[DatasetDeleteOption],
    ) -> crate::Result<bool> {
        let options = OptionMap::from_options(options)?;
        let dataset_id = dataset_id.set_project_id(self.project_id());

        let rpc = self.options.rpc();
        let (reference, options) = (dataset_id.reference(), &options);
        self.options
            .run(move || rpc.delete_dataset(reference, options))
            .await
    }

    /// Patches the dataset with every field set on `dataset`. Fields left unset
    /// are untouched.
    pub async fn update_dataset(
        &self,
        dataset: &Dataset,
        options: &[DatasetOption],
    ) -> crate::Result<Dataset> {
        let options = OptionMap::from_options(options)?;
        let wire = dataset.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (wire, options) = (&wire, &options);
        let updated = self
            .options
            .run(move || rpc.patch_dataset(wire, options))
            .await?;

        Ok(Dataset::from_wire(updated))
    }
}

async fn list_datasets(
    project_id: Arc<str>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<Page<Dataset>> {
    let rpc = service.rpc();
    let listing = {
        let (project_id, options) = (&*project_id, &options);
        service
            .run(move || rpc.list_datasets(project_id, options))
            .await?
    };

    let Listing {
        next_page_token,
        items,
    } = listing;
    let datasets = items.into_iter().map(Dataset::from_wire).collect();

    Ok(Page::with_fetcher(next_page_token, datasets, |cursor| {
        Arc::new(DatasetPageFetcher {
            options: options.with_page_token(cursor),
            project_id,
            service,
        })
    }))
}

#[derive(Debug)]
struct DatasetPageFetcher {
    project_id: Arc<str>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
}

impl NextPageFetcher<Dataset> for DatasetPageFetcher {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<Dataset>>> {
        list_datasets(
            Arc::clone(&self.project_id),
            Arc::clone(&self.service),
            self.options.clone(),
        )
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use bigquery_resources_rs::dataset::Dataset as WireDataset;
    use futures::TryStreamExt;
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::options::DatasetField;
    use crate::rpc::RpcOption;
    use crate::testing::{self, MockRpc, wire};

    fn wire_dataset(project: &str, dataset: &str) -> WireDataset {
        wire(json!({
            "datasetReference": { "projectId": project, "datasetId": dataset },
            "etag": "e1",
        }))
    }

    #[tokio::test]
    async fn test_create_dataset_fills_in_project() {
        let rpc = MockRpc::new();
        rpc.push("create_dataset", Ok(wire_dataset("p", "d")));
        let (client, _) = testing::client(&rpc).await;

        let dataset = Dataset::new(DatasetId::of("d")).with_description("desc");
        let created = client.create_dataset(&dataset, &[]).await.unwrap();

        assert_eq!(created.dataset_id(), &DatasetId::new("p", "d"));
        assert_eq!(created.etag(), Some("e1"));

        let calls = rpc.calls_to("create_dataset");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, "p/d");
        assert_eq!(
            calls[0].body.as_ref().unwrap()["description"],
            json!("desc")
        );
    }

    #[tokio::test]
    async fn test_get_missing_dataset_is_none() {
        let rpc = MockRpc::new();
        rpc.push::<Option<WireDataset>>("get_dataset", Ok(None));
        let (client, _) = testing::client(&rpc).await;

        let dataset = client
            .get_dataset(&DatasetId::new("other", "d"), &[])
            .await
            .unwrap();

        assert!(dataset.is_none());
        assert_eq!(rpc.calls_to("get_dataset")[0].target, "other/d");
    }

    #[tokio::test]
    async fn test_get_dataset_passes_fields() {
        let rpc = MockRpc::new();
        rpc.push("get_dataset", Ok(Some(wire_dataset("p", "d"))));
        let (client, _) = testing::client(&rpc).await;

        client
            .get_dataset(&DatasetId::of("d"), &[DatasetOption::fields(&[
                DatasetField::Labels,
            ])])
            .await
            .unwrap()
            .unwrap();

        let call = &rpc.calls_to("get_dataset")[0];
        assert_eq!(call.options.fields(), Some("datasetReference,labels"));
    }

    #[tokio::test]
    async fn test_duplicate_options_make_no_request() {
        let rpc = MockRpc::new();
        let (client, _) = testing::client(&rpc).await;

        let error = client
            .list_datasets(&[DatasetListOption::all(), DatasetListOption::all()])
            .await
            .unwrap_err();

        assert!(matches!(error, crate::Error::InvalidArgument(_)));
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_datasets_pages_keep_options() {
        let rpc = MockRpc::new();
        rpc.push(
            "list_datasets",
            Ok(Listing::new(Some("cursor-1".into()), vec![
                wire_dataset("p", "a"),
                wire_dataset("p", "b"),
            ])),
        );
        rpc.push(
            "list_datasets",
            Ok(Listing::new(Some("".into()), vec![wire_dataset("p", "c")])),
        );
        let (client, _) = testing::client(&rpc).await;

        let page = client
            .list_datasets(&[DatasetListOption::page_size(2), DatasetListOption::all()])
            .await
            .unwrap();
        assert_eq!(page.cursor(), Some("cursor-1"));

        let names = page
            .into_stream()
            .map_ok(|dataset| dataset.dataset_id().dataset().to_owned())
            .try_collect::<Vec<_>>()
            .await
            .unwrap();
        assert_eq!(names, ["a", "b", "c"]);

        let calls = rpc.calls_to("list_datasets");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].options.page_token(), None);
        assert_eq!(calls[1].options.page_token(), Some("cursor-1"));
        assert_eq!(calls[1].options.max_results(), Some(2));
        assert!(calls[1].options.flag(RpcOption::AllDatasets));
        assert_eq!(calls[1].options.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_dataset() {
        let rpc = MockRpc::new();
        rpc.push("delete_dataset", Ok(true));
        rpc.push("delete_dataset", Ok(false));
        let (client, _) = testing::client(&rpc).await;

        let id = DatasetId::of("d");
        let options = [DatasetDeleteOption::delete_contents()];
        assert!(client.delete_dataset(&id, &options).await.unwrap());
        assert!(!client.delete_dataset(&id, &[]).await.unwrap());

        let calls = rpc.calls_to("delete_dataset");
        assert!(calls[0].options.flag(RpcOption::DeleteContents));
        assert!(calls[1].options.is_empty());
    }

    #[tokio::test]
    async fn test_update_dataset_retries_server_errors() {
        let rpc = MockRpc::new();
        rpc.push::<WireDataset>(
            "patch_dataset",
            Err(testing::status_error(StatusCode::SERVICE_UNAVAILABLE, "backendError")),
        );
        rpc.push("patch_dataset", Ok(wire_dataset("p", "d")));
        let (client, clock) = testing::client(&rpc).await;

        let dataset = Dataset::new(DatasetId::of("d")).with_friendly_name("renamed");
        client.update_dataset(&dataset, &[]).await.unwrap();

        assert_eq!(rpc.calls_to("patch_dataset").len(), 2);
        assert_eq!(clock.sleeps().len(), 1);
    }
}
