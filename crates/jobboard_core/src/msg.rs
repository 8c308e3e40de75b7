use crate::{
    ConfigView, DemoResults, Generation, JobCard, JobDetailView, JobsRequest, ProgressSnapshot,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    InputChanged(String),
    /// User submitted the current URL input for scraping.
    ScrapeSubmitted,
    /// Backend accepted a scrape (or the user asked to watch an existing one).
    ScrapeAccepted { session_id: String },
    /// Backend refused the scrape request.
    ScrapeRejected { message: String },
    /// Result of one status query, tagged with the chain that asked for it.
    StatusReceived {
        generation: Generation,
        result: Result<ProgressSnapshot, String>,
    },
    /// User submitted the URL input for a scrape that is not stored.
    DemoScrapeSubmitted,
    DemoScraped {
        request: JobsRequest,
        result: Result<DemoResults, String>,
    },
    /// User asked for the job list to be reloaded.
    RefreshClicked,
    /// User asked for what one scrape session produced.
    ResultsRequested { session_id: String },
    /// A listing, search or session-results request finished.
    JobsLoaded {
        request: JobsRequest,
        result: Result<Vec<JobCard>, String>,
    },
    /// User edited the search box; filters the loaded list locally.
    SearchChanged(String),
    /// User submitted the search box; asks the backend.
    SearchSubmitted,
    /// User selected a job card.
    JobSelected { job_id: String },
    JobDetailLoaded(Result<JobDetailView, String>),
    DetailClosed,
    /// User followed the apply link of a job.
    ApplyClicked { job_id: String },
    ConfigRequested,
    ConfigLoaded(Result<ConfigView, String>),
    ConfigClosed,
    /// UI/render tick to coalesce rendering.
    Tick,
}
