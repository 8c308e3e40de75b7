use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `POST /scrape` with the given URLs.
    StartScrape { urls: Vec<String> },
    /// Query the status of `session_id` after `delay`.
    PollStatus {
        generation: crate::Generation,
        session_id: String,
        delay: Duration,
    },
    LoadJobs {
        request: crate::JobsRequest,
        limit: u32,
    },
    SearchJobs {
        request: crate::JobsRequest,
        query: String,
        limit: u32,
    },
    /// `GET /scrape/results/{session_id}`.
    LoadScrapeResults {
        request: crate::JobsRequest,
        session_id: String,
    },
    /// `POST /demo/scrape`: scrapes synchronously and returns the postings.
    DemoScrape {
        request: crate::JobsRequest,
        urls: Vec<String>,
    },
    LoadJobDetail { job_id: String },
    LogInteraction {
        job_id: String,
        kind: InteractionKind,
    },
    LoadConfig,
    Notify(Notification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    View,
    ApplyClick { application_url: Option<String> },
}

impl InteractionKind {
    /// Name sent to the backend as `interaction_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::ApplyClick { .. } => "apply_click",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}
