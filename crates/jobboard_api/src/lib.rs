//! Jobboard API: HTTP client for the scraping backend and effect execution.
mod client;
mod engine;
mod types;

pub use client::{ApiClient, ApiSettings, ReqwestApiClient};
pub use engine::{EngineError, EngineHandle};
pub use types::{
    ApiError, ApplicationForm, CompetencyQuestion, ConfigStatus, DemoScrapeResponse, EngineEvent,
    FailureKind, FormField, InteractionRequest, JobDetail, JobPosting, JobsPage, ProgressStatus,
    ScrapeAccepted, ScrapeRequest, ScrapeResults, ScrapedJob,
};
