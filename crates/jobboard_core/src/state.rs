use std::time::Duration;

use crate::view_model::{AppViewModel, ProgressView};
use crate::{
    matches_query, ConfigView, JobCard, JobDetailView, JobsRequest, JobsSource, ProgressMonitor,
    DEFAULT_POLL_INTERVAL,
};

/// Number of jobs requested per listing.
pub const JOBS_PAGE_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    input: String,
    monitor: ProgressMonitor,
    jobs: Vec<JobCard>,
    jobs_loading: bool,
    jobs_limit: u32,
    jobs_request: JobsRequest,
    jobs_source: JobsSource,
    pending_source: JobsSource,
    /// Session whose results stand in for the listing if the listing fails.
    results_fallback: Option<String>,
    search_query: String,
    detail: Option<JobDetailView>,
    pending_detail: Option<String>,
    config: Option<ConfigView>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(DEFAULT_POLL_INTERVAL, JOBS_PAGE_LIMIT)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(poll_interval: Duration, jobs_limit: u32) -> Self {
        Self {
            input: String::new(),
            monitor: ProgressMonitor::new(poll_interval),
            jobs: Vec::new(),
            jobs_loading: false,
            jobs_limit: jobs_limit.max(1),
            jobs_request: 0,
            jobs_source: JobsSource::Listing,
            pending_source: JobsSource::Listing,
            results_fallback: None,
            search_query: String::new(),
            detail: None,
            pending_detail: None,
            config: None,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let jobs: Vec<JobCard> = self
            .jobs
            .iter()
            .filter(|job| matches_query(job, &self.search_query))
            .cloned()
            .collect();

        let progress = self
            .monitor
            .session_id()
            .filter(|_| self.monitor.is_visible())
            .map(|session_id| {
                let latest = self.monitor.latest();
                ProgressView {
                    session_id: session_id.to_string(),
                    percent: latest.map(|s| s.percentage()).unwrap_or(0.0),
                    completed: latest.map(|s| s.completed).unwrap_or(0),
                    total_urls: latest.map(|s| s.total_urls).unwrap_or(0),
                    success_count: latest.map(|s| s.success_count).unwrap_or(0),
                    error_count: latest.map(|s| s.error_count).unwrap_or(0),
                    errors: latest.map(|s| s.errors.clone()).unwrap_or_default(),
                }
            });

        AppViewModel {
            phase: self.monitor.phase(),
            progress,
            job_count: jobs.len(),
            total_jobs: self.jobs.len(),
            jobs,
            jobs_loading: self.jobs_loading,
            search_query: self.search_query.clone(),
            source: self.jobs_source.clone(),
            detail: self.detail.clone(),
            config: self.config,
            dirty: self.dirty,
        }
    }

    pub fn monitor(&self) -> &ProgressMonitor {
        &self.monitor
    }

    pub fn jobs_limit(&self) -> u32 {
        self.jobs_limit
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn monitor_mut(&mut self) -> &mut ProgressMonitor {
        &mut self.monitor
    }

    pub(crate) fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub(crate) fn clear_input(&mut self) {
        if !self.input.is_empty() {
            self.input.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn search_query(&self) -> &str {
        &self.search_query
    }

    pub(crate) fn set_search_query(&mut self, query: String) {
        if self.search_query != query {
            self.search_query = query;
            self.mark_dirty();
        }
    }

    /// Starts a new job list request; any request still in flight becomes stale.
    pub(crate) fn start_jobs_load(&mut self, source: JobsSource) -> JobsRequest {
        self.jobs_request += 1;
        self.pending_source = source;
        self.jobs_loading = true;
        self.mark_dirty();
        self.jobs_request
    }

    pub(crate) fn is_current_jobs_request(&self, request: JobsRequest) -> bool {
        request == self.jobs_request
    }

    /// Ends the current request. Returns `false` for a stale one, which changes nothing.
    ///
    /// The list and its source only change when `jobs` is `Some`.
    pub(crate) fn finish_jobs_load(
        &mut self,
        request: JobsRequest,
        jobs: Option<Vec<JobCard>>,
    ) -> bool {
        if !self.is_current_jobs_request(request) {
            return false;
        }
        self.jobs_loading = false;
        if let Some(jobs) = jobs {
            self.jobs = jobs;
            self.jobs_source = std::mem::take(&mut self.pending_source);
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn set_results_fallback(&mut self, session_id: Option<String>) {
        self.results_fallback = session_id;
    }

    pub(crate) fn take_results_fallback(&mut self) -> Option<String> {
        self.results_fallback.take()
    }

    pub(crate) fn find_job(&self, job_id: &str) -> Option<&JobCard> {
        self.jobs
            .iter()
            .find(|job| job.id == job_id)
            .or_else(|| self.detail.as_ref().map(|d| &d.card).filter(|c| c.id == job_id))
    }

    pub(crate) fn start_detail_load(&mut self, job_id: String) {
        self.pending_detail = Some(job_id);
    }

    /// Opens the detail view unless the user closed it or picked another job meanwhile.
    pub(crate) fn open_detail(&mut self, detail: JobDetailView) -> bool {
        match self.pending_detail.take() {
            Some(pending) if pending == detail.card.id => {
                self.detail = Some(detail);
                self.mark_dirty();
                true
            }
            Some(other) => {
                self.pending_detail = Some(other);
                false
            }
            None => false,
        }
    }

    pub(crate) fn fail_detail_load(&mut self) {
        self.pending_detail = None;
    }

    pub(crate) fn close_detail(&mut self) {
        self.pending_detail = None;
        if self.detail.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn open_config(&mut self, config: ConfigView) {
        self.config = Some(config);
        self.mark_dirty();
    }

    pub(crate) fn close_config(&mut self) {
        if self.config.take().is_some() {
            self.mark_dirty();
        }
    }
}
