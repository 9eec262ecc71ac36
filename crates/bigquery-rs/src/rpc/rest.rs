use std::sync::Arc;

use bigquery_resources_rs::dataset::{Dataset, DatasetList};
use bigquery_resources_rs::job::{Job, JobList, JobReference};
use bigquery_resources_rs::query::{GetQueryResultsResponse, QueryRequest, QueryResponse};
use bigquery_resources_rs::table::{Table, TableList};
use bigquery_resources_rs::table_data::{
    TableDataInsertAllRequest, TableDataInsertAllResponse, TableDataList,
};
use bigquery_resources_rs::{DatasetReference, ErrorEnvelope, ErrorProto, TableReference};
use gcp_auth::TokenProvider;
use http::StatusCode;
use reqwest::{Method, RequestBuilder, Response, Url};

use super::{BigQueryRpc, Listing, OptionMap, RpcError};

/// The default endpoint, everything after it starts with `projects/{projectId}`.
pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/";

const SCOPES: &[&str] = &["https://www.googleapis.com/auth/bigquery"];

/// [`BigQueryRpc`] over HTTP/JSON, authenticated with `gcp_auth`.
#[derive(Clone)]
pub struct HttpRpc {
    client: reqwest::Client,
    auth: Arc<dyn TokenProvider>,
    base_url: Url,
}

impl std::fmt::Debug for HttpRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpc")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpRpc {
    /// Resolves credentials from the environment with [`gcp_auth::provider`].
    pub async fn new() -> Result<Self, RpcError> {
        let auth = gcp_auth::provider().await?;
        let client = reqwest::Client::builder()
            .user_agent("bigquery-rs")
            .build()?;

        Ok(Self::from_parts(auth, client))
    }

    pub fn from_parts(auth: Arc<dyn TokenProvider>, client: reqwest::Client) -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("default base url is valid");

        Self {
            client,
            auth,
            base_url,
        }
    }

    /// Points requests at another endpoint, i.e a local fake.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The project id the credentials belong to.
    pub async fn project_id(&self) -> Result<Arc<str>, RpcError> {
        self.auth.project_id().await.map_err(RpcError::from)
    }

    fn make_url<P>(&self, path: P) -> Url
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }

        url
    }

    async fn request(
        &self,
        method: Method,
        url: Url,
        options: Option<&OptionMap>,
    ) -> Result<RequestBuilder, RpcError> {
        trace!(message = "bigquery request", %method, %url);

        let token = self.auth.token(SCOPES).await?;
        let mut builder = self.client.request(method, url).bearer_auth(token.as_str());

        if let Some(options) = options.filter(|options| !options.is_empty()) {
            builder = builder.query(&options.to_query_pairs());
        }

        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RpcError> {
        let response = builder.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(handle_error(response).await)
        }
    }

    async fn get_json<T>(&self, url: Url, options: &OptionMap) -> Result<T, RpcError>
    where
        T: serde::de::DeserializeOwned,
    {
        let builder = self.request(Method::GET, url, Some(options)).await?;
        let response = self.send(builder).await?;
        deserialize_json(response).await
    }

    async fn get_optional<T>(&self, url: Url, options: &OptionMap) -> Result<Option<T>, RpcError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.get_json(url, options).await {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        options: Option<&OptionMap>,
    ) -> Result<T, RpcError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let builder = self.request(method, url, options).await?.json(body);
        let response = self.send(builder).await?;
        deserialize_json(response).await
    }

    /// Sends a request with an empty response body, mapping a 404 to `false`.
    async fn send_found(
        &self,
        method: Method,
        url: Url,
        options: Option<&OptionMap>,
    ) -> Result<bool, RpcError> {
        let builder = self.request(method, url, options).await?;
        match self.send(builder).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn job_url(&self, job: &JobReference, suffix: Option<&str>) -> Url {
        let mut url = self.make_url(["projects", &*job.project_id, "jobs", &*job.job_id]);

        if let Some(suffix) = suffix {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(suffix);
            }
        }

        if let Some(location) = job.location.as_deref() {
            url.query_pairs_mut().append_pair("location", location);
        }

        url
    }
}

fn dataset_ref(dataset: &Dataset) -> DatasetReference<&str> {
    match dataset.dataset_reference {
        Some(ref reference) => reference.as_deref(),
        None => DatasetReference {
            project_id: "",
            dataset_id: "",
        },
    }
}

fn table_ref(table: &Table) -> TableReference<&str> {
    match table.table_reference {
        Some(ref reference) => reference.as_deref(),
        None => TableReference {
            project_id: "",
            dataset_id: "",
            table_id: "",
        },
    }
}

#[async_trait::async_trait]
impl BigQueryRpc for HttpRpc {
    async fn create_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError> {
        let reference = dataset_ref(dataset);
        let url = self.make_url(["projects", reference.project_id, "datasets"]);
        self.send_json(Method::POST, url, dataset, Some(options)).await
    }

    async fn get_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Dataset>, RpcError> {
        let url = self.make_url(["projects", dataset.project_id, "datasets", dataset.dataset_id]);
        self.get_optional(url, options).await
    }

    async fn list_datasets(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Dataset>, RpcError> {
        let url = self.make_url(["projects", project_id, "datasets"]);
        let list: DatasetList = self.get_json(url, options).await?;

        let items = list.datasets.into_iter().map(Dataset::from).collect();
        Ok(Listing::new(list.next_page_token, items))
    }

    async fn delete_dataset(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<bool, RpcError> {
        let url = self.make_url(["projects", dataset.project_id, "datasets", dataset.dataset_id]);
        self.send_found(Method::DELETE, url, Some(options)).await
    }

    async fn patch_dataset(
        &self,
        dataset: &Dataset,
        options: &OptionMap,
    ) -> Result<Dataset, RpcError> {
        let reference = dataset_ref(dataset);
        let url = self.make_url([
            "projects",
            reference.project_id,
            "datasets",
            reference.dataset_id,
        ]);
        self.send_json(Method::PATCH, url, dataset, Some(options)).await
    }

    async fn create_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError> {
        let reference = table_ref(table);
        let url = self.make_url([
            "projects",
            reference.project_id,
            "datasets",
            reference.dataset_id,
            "tables",
        ]);
        self.send_json(Method::POST, url, table, Some(options)).await
    }

    async fn get_table(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<Option<Table>, RpcError> {
        let url = self.make_url([
            "projects",
            table.project_id,
            "datasets",
            table.dataset_id,
            "tables",
            table.table_id,
        ]);
        self.get_optional(url, options).await
    }

    async fn list_tables(
        &self,
        dataset: DatasetReference<&str>,
        options: &OptionMap,
    ) -> Result<Listing<Table>, RpcError> {
        let url = self.make_url([
            "projects",
            dataset.project_id,
            "datasets",
            dataset.dataset_id,
            "tables",
        ]);
        let list: TableList = self.get_json(url, options).await?;
        Ok(Listing::new(list.next_page_token, list.tables))
    }

    async fn delete_table(&self, table: TableReference<&str>) -> Result<bool, RpcError> {
        let url = self.make_url([
            "projects",
            table.project_id,
            "datasets",
            table.dataset_id,
            "tables",
            table.table_id,
        ]);
        self.send_found(Method::DELETE, url, None).await
    }

    async fn patch_table(&self, table: &Table, options: &OptionMap) -> Result<Table, RpcError> {
        let reference = table_ref(table);
        let url = self.make_url([
            "projects",
            reference.project_id,
            "datasets",
            reference.dataset_id,
            "tables",
            reference.table_id,
        ]);
        self.send_json(Method::PATCH, url, table, Some(options)).await
    }

    async fn list_table_data(
        &self,
        table: TableReference<&str>,
        options: &OptionMap,
    ) -> Result<TableDataList, RpcError> {
        let url = self.make_url([
            "projects",
            table.project_id,
            "datasets",
            table.dataset_id,
            "tables",
            table.table_id,
            "data",
        ]);
        self.get_json(url, options).await
    }

    async fn insert_all(
        &self,
        table: TableReference<&str>,
        request: &TableDataInsertAllRequest,
    ) -> Result<TableDataInsertAllResponse, RpcError> {
        let url = self.make_url([
            "projects",
            table.project_id,
            "datasets",
            table.dataset_id,
            "tables",
            table.table_id,
            "insertAll",
        ]);
        self.send_json(Method::POST, url, request, None).await
    }

    async fn create_job(&self, job: &Job, options: &OptionMap) -> Result<Job, RpcError> {
        let project_id = job
            .job_reference
            .as_ref()
            .map_or("", |reference| &*reference.project_id);

        let url = self.make_url(["projects", project_id, "jobs"]);
        self.send_json(Method::POST, url, job, Some(options)).await
    }

    async fn get_job(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<Option<Job>, RpcError> {
        let url = self.job_url(job, None);
        self.get_optional(url, options).await
    }

    async fn list_jobs(
        &self,
        project_id: &str,
        options: &OptionMap,
    ) -> Result<Listing<Job>, RpcError> {
        let url = self.make_url(["projects", project_id, "jobs"]);
        let list: JobList = self.get_json(url, options).await?;

        let items = list.jobs.into_iter().map(Job::from).collect();
        Ok(Listing::new(list.next_page_token, items))
    }

    async fn cancel_job(&self, job: &JobReference) -> Result<bool, RpcError> {
        let url = self.job_url(job, Some("cancel"));
        self.send_found(Method::POST, url, None).await
    }

    async fn query(
        &self,
        project_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, RpcError> {
        let url = self.make_url(["projects", project_id, "queries"]);
        self.send_json(Method::POST, url, request, None).await
    }

    async fn get_query_results(
        &self,
        job: &JobReference,
        options: &OptionMap,
    ) -> Result<GetQueryResultsResponse, RpcError> {
        let mut url = self.make_url(["projects", &*job.project_id, "queries", &*job.job_id]);
        if let Some(location) = job.location.as_deref() {
            url.query_pairs_mut().append_pair("location", location);
        }
        self.get_json(url, options).await
    }
}

pub(crate) async fn handle_error(response: Response) -> RpcError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(error) => return error.into(),
    };

    match serde_json::from_str::<ErrorEnvelope>(&text) {
        Ok(ErrorEnvelope { error }) => {
            let status = error
                .code
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(status);

            RpcError::from_errors(status, error.errors, error.message)
        }
        Err(error) => {
            // html error pages, proxies, etc.
            if text.trim_start().starts_with('{') {
                warn!(
                    message = "failed to deserialize error json, falling back to raw text",
                    ?error
                );
            }

            RpcError::status(status, ErrorProto::new(text.into_boxed_str()))
        }
    }
}

pub(crate) async fn deserialize_json<T>(response: Response) -> Result<T, RpcError>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(RpcError::from)
}
