use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
}

/// Response to `POST /scrape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeAccepted {
    pub session_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to `GET /scrape/status/{session_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStatus {
    #[serde(default)]
    pub session_id: Option<String>,
    pub status: String,
    pub total_urls: u64,
    pub completed: u64,
    pub success_count: u64,
    pub error_count: u64,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JobPosting {
    /// Empty for postings that were scraped but never stored.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub salary_currency: Option<String>,
    #[serde(default)]
    pub salary_text: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub qualifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub ats_platform: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Response to `GET /jobs` and `GET /jobs/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JobsPage {
    pub jobs: Vec<JobPosting>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApplicationForm {
    #[serde(default)]
    pub form_url: Option<String>,
    #[serde(default)]
    pub form_method: Option<String>,
    #[serde(default)]
    pub form_action: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
    #[serde(default)]
    pub has_captcha: bool,
    #[serde(default)]
    pub autofill_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormField {
    #[serde(default)]
    pub field_name: Option<String>,
    #[serde(default)]
    pub field_label: Option<String>,
    #[serde(default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub field_order: i64,
    /// Choices for select-like fields; the backend stores them as free-form JSON.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<serde_json::Value>,
    #[serde(default)]
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompetencyQuestion {
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub question_type: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub word_limit: Option<u32>,
    #[serde(default)]
    pub character_limit: Option<u32>,
    #[serde(default)]
    pub question_order: i64,
}

/// Response to `GET /jobs/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JobDetail {
    pub job_posting: JobPosting,
    #[serde(default)]
    pub application_form: Option<ApplicationForm>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub form_fields: Vec<FormField>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub competency_questions: Vec<CompetencyQuestion>,
}

/// One posting as the scraper produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScrapedJob {
    #[serde(flatten)]
    pub detail: JobDetail,
    /// Row id when the backend also stored the posting.
    #[serde(default, deserialize_with = "optional_id")]
    pub stored_job_id: Option<String>,
}

/// Response to `GET /scrape/results/{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScrapeResults {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ScrapedJob>,
}

/// Response to `POST /demo/scrape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DemoScrapeResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ScrapedJob>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response to `GET /config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigStatus {
    #[serde(default)]
    pub firecrawl_configured: bool,
    #[serde(default)]
    pub supabase_configured: bool,
    #[serde(default)]
    pub supabase_connected: bool,
}

/// Body of `POST /jobs/{job_id}/interact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRequest {
    pub user_id: String,
    pub interaction_type: String,
    pub interaction_data: serde_json::Value,
}

/// Error body the backend sends with non-success responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ScrapeStarted(Result<ScrapeAccepted, ApiError>),
    StatusFetched {
        generation: u64,
        session_id: String,
        result: Result<ProgressStatus, ApiError>,
    },
    /// Answer to a listing or search, tagged with the caller's request id.
    JobsLoaded {
        request: u64,
        result: Result<JobsPage, ApiError>,
    },
    ScrapeResultsLoaded {
        request: u64,
        session_id: String,
        result: Result<ScrapeResults, ApiError>,
    },
    DemoScraped {
        request: u64,
        result: Result<DemoScrapeResponse, ApiError>,
    },
    JobDetailLoaded {
        job_id: String,
        result: Result<JobDetail, ApiError>,
    },
    InteractionLogged {
        job_id: String,
        result: Result<(), ApiError>,
    },
    ConfigLoaded(Result<ConfigStatus, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Encode,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Encode => write!(f, "encode error"),
            FailureKind::Decode => write!(f, "decode error"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_field_type() -> String {
    "text".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowId {
    Text(String),
    Int(i64),
}

impl From<RowId> for String {
    fn from(id: RowId) -> Self {
        match id {
            RowId::Text(text) => text,
            RowId::Int(number) => number.to_string(),
        }
    }
}

/// Row ids come back as strings or integers depending on the table.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RowId::deserialize(deserializer)?.into())
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RowId>::deserialize(deserializer)?.map(String::from))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
