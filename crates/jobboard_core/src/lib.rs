//! Jobboard core: pure dashboard state machine and view-model helpers.
mod effect;
mod input;
mod jobs;
mod monitor;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, InteractionKind, Notification, NotificationLevel};
pub use input::{normalize_url_for_dedupe, parse_urls};
pub use jobs::{
    matches_query, ConfigView, DemoResults, FormFieldView, JobCard, JobDetailView, JobsRequest,
    JobsSource, QuestionView,
};
pub use monitor::{
    BeginError, Generation, MonitorOutcome, MonitorPhase, PollRequest, PollStep,
    ProgressMonitor, ProgressSnapshot, ScrapeStatus, DEFAULT_POLL_INTERVAL,
};
pub use msg::Msg;
pub use state::{AppState, JOBS_PAGE_LIMIT};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView};
