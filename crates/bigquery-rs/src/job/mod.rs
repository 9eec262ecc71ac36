use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::client::{BigQuery, BigQueryOptions};
use crate::id::JobId;
use crate::options::{JobListOption, JobOption};
use crate::page::{NextPageFetcher, Page};
use crate::resources::Job;
use crate::rpc::{Listing, OptionMap};

impl BigQuery {
    /// Starts `job`. A job without an id gets a random one, so the returned job
    /// always has an id that can be polled with [`BigQuery::get_job`].
    pub async fn create_job(&self, job: &Job, options: &[JobOption]) -> crate::Result<Job> {
        let options = OptionMap::from_options(options)?;
        let wire = job.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (wire, options) = (&wire, &options);
        let created = self
            .options
            .run(move || rpc.create_job(wire, options))
            .await?;

        debug!(message = "created job", job = ?created.job_reference);
        Ok(Job::from_wire(created))
    }

    /// `None` if the job doesn't exist.
    pub async fn get_job(
        &self,
        job_id: &JobId,
        options: &[JobOption],
    ) -> crate::Result<Option<Job>> {
        let options = OptionMap::from_options(options)?;
        let reference = job_id.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let (reference, options) = (&reference, &options);
        let job = self
            .options
            .run(move || rpc.get_job(reference, options))
            .await?;

        Ok(job.map(Job::from_wire))
    }

    /// Lists the jobs of the client's project, most recent first.
    pub async fn list_jobs(&self, options: &[JobListOption]) -> crate::Result<Page<Job>> {
        let options = OptionMap::from_options(options)?;
        list_jobs(
            Arc::from(self.project_id()),
            Arc::clone(&self.options),
            options,
        )
        .await
    }

    /// Requests cancellation, returning `false` if the job doesn't exist. The job
    /// may still complete, cancellation is best effort.
    pub async fn cancel_job(&self, job_id: &JobId) -> crate::Result<bool> {
        let reference = job_id.set_project_id(self.project_id()).to_wire();

        let rpc = self.options.rpc();
        let reference = &reference;
        self.options.run(move || rpc.cancel_job(reference)).await
    }
}

async fn list_jobs(
    project_id: Arc<str>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
) -> crate::Result<Page<Job>> {
    let rpc = service.rpc();
    let listing = {
        let (project_id, options) = (&*project_id, &options);
        service
            .run(move || rpc.list_jobs(project_id, options))
            .await?
    };

    let Listing {
        next_page_token,
        items,
    } = listing;
    let jobs = items.into_iter().map(Job::from_wire).collect();

    Ok(Page::with_fetcher(next_page_token, jobs, |cursor| {
        Arc::new(JobPageFetcher {
            options: options.with_page_token(cursor),
            project_id,
            service,
        })
    }))
}

#[derive(Debug)]
struct JobPageFetcher {
    project_id: Arc<str>,
    service: Arc<BigQueryOptions>,
    options: OptionMap,
}

impl NextPageFetcher<Job> for JobPageFetcher {
    fn fetch_next_page(&self) -> BoxFuture<'_, crate::Result<Page<Job>>> {
        list_jobs(
            Arc::clone(&self.project_id),
            Arc::clone(&self.service),
            self.options.clone(),
        )
        .boxed()
    }
}
