//! Server-backed pager for the public jobs list: each page change is a fetch.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::ClientError;
use crate::models::job::{Job, JobPage, JobQuery};
use crate::table::Pagination;

pub const DEFAULT_JOBS_PAGE_SIZE: usize = 6;

/// Anything that can serve one page of jobs. Implemented by the API client.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(
        &self,
        page: usize,
        limit: usize,
        query: &JobQuery,
    ) -> Result<JobPage, ClientError>;
}

pub struct RemoteJobPager {
    query: JobQuery,
    pagination: Pagination,
    count: Option<usize>,
    jobs: Vec<Job>,
}

impl RemoteJobPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            query: JobQuery::default(),
            pagination: Pagination::new(page_size),
            count: None,
            jobs: Vec::new(),
        }
    }

    /// New filters invalidate the known total; the next load starts at page 1.
    pub fn set_query(&mut self, query: JobQuery) {
        self.query = query;
        self.count = None;
        self.pagination.reset();
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    /// `None` until the first page has been fetched.
    pub fn total_pages(&self) -> Option<usize> {
        self.count.map(|c| self.pagination.total_pages(c))
    }

    pub fn total_count(&self) -> Option<usize> {
        self.count
    }

    pub fn has_next(&self) -> bool {
        self.count.is_some_and(|c| self.pagination.has_next(c))
    }

    pub async fn load(&mut self, source: &dyn JobSource) -> Result<&[Job], ClientError> {
        self.go_to_page(source, 1).await
    }

    /// Clamps `page` against the last known total, then fetches it.
    /// Before the first fetch only the lower bound can be enforced, so an
    /// out-of-range request is re-issued once the real total is known.
    pub async fn go_to_page(
        &mut self,
        source: &dyn JobSource,
        page: usize,
    ) -> Result<&[Job], ClientError> {
        let mut target = match self.count {
            Some(count) => self.pagination.clamp(page, count),
            None => page.max(1),
        };

        loop {
            debug!("Fetching jobs page {target} (requested {page})");
            let result = source
                .fetch_jobs(target, self.pagination.page_size(), &self.query)
                .await?;

            let count = usize::try_from(result.count).unwrap_or(usize::MAX);
            self.count = Some(count);

            let clamped = self.pagination.clamp(target, count);
            if clamped != target {
                target = clamped;
                continue;
            }

            self.pagination.go_to(target, count);
            self.jobs = result.results;
            return Ok(&self.jobs);
        }
    }

    pub async fn next_page(&mut self, source: &dyn JobSource) -> Result<&[Job], ClientError> {
        let page = self.pagination.current_page() + 1;
        self.go_to_page(source, page).await
    }

    pub async fn prev_page(&mut self, source: &dyn JobSource) -> Result<&[Job], ClientError> {
        let page = self.pagination.current_page().saturating_sub(1);
        self.go_to_page(source, page).await
    }
}
