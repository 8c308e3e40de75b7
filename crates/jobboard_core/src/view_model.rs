use crate::{ConfigView, JobCard, JobDetailView, JobsSource, MonitorPhase};

/// Progress shown while a scrape session is being monitored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressView {
    pub session_id: String,
    pub percent: f64,
    pub completed: u64,
    pub total_urls: u64,
    pub success_count: u64,
    pub error_count: u64,
    /// Per-URL failures reported so far, oldest first.
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: MonitorPhase,
    /// `None` while the progress panel is hidden.
    pub progress: Option<ProgressView>,
    /// Jobs passing the current search filter.
    pub jobs: Vec<JobCard>,
    pub job_count: usize,
    /// Jobs loaded before filtering.
    pub total_jobs: usize,
    pub jobs_loading: bool,
    pub search_query: String,
    /// Where `jobs` came from.
    pub source: JobsSource,
    pub detail: Option<JobDetailView>,
    pub config: Option<ConfigView>,
    pub dirty: bool,
}
