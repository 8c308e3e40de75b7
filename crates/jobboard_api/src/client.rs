use std::time::Duration;

use jobboard_logging::{board_debug, board_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::types::ErrorBody;
use crate::{
    ApiError, ConfigStatus, DemoScrapeResponse, FailureKind, InteractionRequest, JobDetail,
    JobsPage, ProgressStatus, ScrapeAccepted, ScrapeRequest, ScrapeResults,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Root of the backend API, e.g. `http://127.0.0.1:5000/api`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One async method per backend endpoint.
///
/// Non-success HTTP statuses, transport failures and undecodable bodies all
/// come back as `ApiError`.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn start_scrape(&self, urls: &[String]) -> Result<ScrapeAccepted, ApiError>;

    async fn scrape_status(&self, session_id: &str) -> Result<ProgressStatus, ApiError>;

    /// Postings scraped in a session, whether or not they were stored.
    async fn scrape_results(&self, session_id: &str) -> Result<ScrapeResults, ApiError>;

    /// Scrapes without storing anything; the postings come back inline.
    async fn demo_scrape(&self, urls: &[String]) -> Result<DemoScrapeResponse, ApiError>;

    async fn list_jobs(&self, limit: u32, offset: u32) -> Result<JobsPage, ApiError>;

    async fn search_jobs(&self, query: &str, limit: u32) -> Result<JobsPage, ApiError>;

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, ApiError>;

    async fn log_interaction(
        &self,
        job_id: &str,
        request: &InteractionRequest,
    ) -> Result<(), ApiError>;

    async fn config_status(&self) -> Result<ConfigStatus, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(settings.base_url.trim())
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.send(self.client.request(Method::GET, url)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Encode, err.to_string()))?;
        let request = self
            .client
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        board_debug!("{} -> {} ({} bytes)", url, status, body.len());

        if !status.is_success() {
            let err = ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                error_message(status, &body),
            );
            board_warn!("Request to {} failed: {}", url, err);
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|err| {
            board_warn!("Could not decode response from {}: {}", url, err);
            ApiError::new(FailureKind::Decode, err.to_string())
        })
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn start_scrape(&self, urls: &[String]) -> Result<ScrapeAccepted, ApiError> {
        let body = ScrapeRequest {
            urls: urls.to_vec(),
        };
        self.post(self.endpoint(&["scrape"]), &body).await
    }

    async fn scrape_status(&self, session_id: &str) -> Result<ProgressStatus, ApiError> {
        self.get(self.endpoint(&["scrape", "status", session_id]))
            .await
    }

    async fn scrape_results(&self, session_id: &str) -> Result<ScrapeResults, ApiError> {
        self.get(self.endpoint(&["scrape", "results", session_id]))
            .await
    }

    async fn demo_scrape(&self, urls: &[String]) -> Result<DemoScrapeResponse, ApiError> {
        let body = ScrapeRequest {
            urls: urls.to_vec(),
        };
        self.post(self.endpoint(&["demo", "scrape"]), &body).await
    }

    async fn list_jobs(&self, limit: u32, offset: u32) -> Result<JobsPage, ApiError> {
        let mut url = self.endpoint(&["jobs"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        self.get(url).await
    }

    async fn search_jobs(&self, query: &str, limit: u32) -> Result<JobsPage, ApiError> {
        let mut url = self.endpoint(&["jobs", "search"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        self.get(url).await
    }

    async fn job_detail(&self, job_id: &str) -> Result<JobDetail, ApiError> {
        self.get(self.endpoint(&["jobs", job_id])).await
    }

    async fn log_interaction(
        &self,
        job_id: &str,
        request: &InteractionRequest,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .post(self.endpoint(&["jobs", job_id, "interact"]), request)
            .await?;
        Ok(())
    }

    async fn config_status(&self) -> Result<ConfigStatus, ApiError> {
        self.get(self.endpoint(&["config"])).await
    }
}

/// Prefers the backend's `{"error": "..."}` text over the bare status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.is_empty() => parsed.error,
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
