use std::time::{Duration, Instant};

use jobboard_api::{
    ApiError, ConfigStatus, DemoScrapeResponse, EngineError, EngineEvent, EngineHandle,
    InteractionRequest, JobDetail, JobPosting, ProgressStatus, ScrapedJob,
};
use jobboard_core::{
    update, AppState, ConfigView, DemoResults, Effect, FormFieldView, InteractionKind, JobCard,
    JobDetailView, MonitorPhase, Msg, Notification, ProgressSnapshot, QuestionView,
    ScrapeStatus,
};
use jobboard_logging::{board_debug, board_error, board_info, board_warn};
use serde_json::json;

use crate::render::Surface;

/// How long one pump waits for an engine event before ticking.
const PUMP_INTERVAL: Duration = Duration::from_millis(100);

/// Quiet period after which outstanding requests are abandoned.
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(60);

enum Pumped {
    Event,
    Quiet,
    Stopped,
}

/// Drives the pure core: feeds messages through `update`, executes the
/// resulting effects on the engine and renders whatever changed.
pub struct Runner<S: Surface> {
    state: AppState,
    engine: EngineHandle,
    surface: S,
    user_id: String,
    in_flight: usize,
    stall_timeout: Duration,
}

impl<S: Surface> Runner<S> {
    pub fn new(state: AppState, engine: EngineHandle, surface: S, user_id: String) -> Self {
        Self {
            state,
            engine,
            surface,
            user_id,
            in_flight: 0,
            stall_timeout: DEFAULT_STALL_TIMEOUT,
        }
    }

    pub fn with_stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let maybe_view = if state.consume_dirty() {
            Some(state.view())
        } else {
            None
        };
        self.state = state;

        if let Some(view) = maybe_view {
            self.surface.render(&view);
        }
        self.run_effects(effects);
    }

    /// Processes engine events until no request is outstanding, the engine
    /// stops, or nothing arrives for the stall timeout.
    pub fn run_until_idle(&mut self) {
        let mut last_event = Instant::now();
        while self.in_flight > 0 {
            match self.pump(PUMP_INTERVAL) {
                Pumped::Event => last_event = Instant::now(),
                Pumped::Quiet if last_event.elapsed() >= self.stall_timeout => {
                    board_warn!(
                        "No engine event for {:?}; abandoning {} request(s)",
                        self.stall_timeout,
                        self.in_flight
                    );
                    self.abandon(format!(
                        "Backend did not answer within {}ms; giving up",
                        self.stall_timeout.as_millis()
                    ));
                }
                Pumped::Quiet => {}
                Pumped::Stopped => {
                    board_error!("Engine stopped with {} request(s) in flight", self.in_flight);
                    self.abandon(EngineError::Stopped.to_string());
                }
            }
        }
    }

    /// Waits up to `timeout` for one engine event and feeds it to the core.
    fn pump(&mut self, timeout: Duration) -> Pumped {
        match self.engine.recv_timeout(timeout) {
            Ok(Some(event)) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if let Some(msg) = map_event(event) {
                    self.dispatch(msg);
                }
                Pumped::Event
            }
            Ok(None) => {
                self.dispatch(Msg::Tick);
                Pumped::Quiet
            }
            Err(_) => Pumped::Stopped,
        }
    }

    fn abandon(&mut self, message: String) {
        self.in_flight = 0;
        self.surface.notify(&Notification::error(message));
    }

    /// Counts a sent command as in flight, or reports why it was not sent.
    fn track(&mut self, sent: Result<(), EngineError>) {
        match sent {
            Ok(()) => self.in_flight += 1,
            Err(err) => {
                board_error!("Engine command not sent: {}", err);
                self.surface
                    .notify(&Notification::error(format!("Request not sent: {err}")));
            }
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.state.monitor().phase()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let sent = match effect {
                Effect::StartScrape { urls } => {
                    board_info!("StartScrape url_count={}", urls.len());
                    self.engine.start_scrape(urls)
                }
                Effect::PollStatus {
                    generation,
                    session_id,
                    delay,
                } => {
                    board_debug!(
                        "PollStatus generation={} session={} delay_ms={}",
                        generation,
                        session_id,
                        delay.as_millis()
                    );
                    self.engine.poll_status(generation, session_id, delay)
                }
                Effect::LoadJobs { request, limit } => self.engine.load_jobs(request, limit),
                Effect::SearchJobs {
                    request,
                    query,
                    limit,
                } => {
                    board_info!("SearchJobs request={} query={:?}", request, query);
                    self.engine.search_jobs(request, query, limit)
                }
                Effect::LoadScrapeResults {
                    request,
                    session_id,
                } => {
                    board_info!("LoadScrapeResults request={} session={}", request, session_id);
                    self.engine.load_scrape_results(request, session_id)
                }
                Effect::DemoScrape { request, urls } => {
                    board_info!("DemoScrape request={} url_count={}", request, urls.len());
                    self.engine.demo_scrape(request, urls)
                }
                Effect::LoadJobDetail { job_id } => self.engine.load_job_detail(job_id),
                Effect::LogInteraction { job_id, kind } => {
                    let request = interaction_request(&self.user_id, &kind);
                    self.engine.log_interaction(job_id, request)
                }
                Effect::LoadConfig => self.engine.load_config(),
                Effect::Notify(notification) => {
                    self.surface.notify(&notification);
                    continue;
                }
            };
            self.track(sent);
        }
    }
}

fn interaction_request(user_id: &str, kind: &InteractionKind) -> InteractionRequest {
    let interaction_data = match kind {
        InteractionKind::View => json!({}),
        InteractionKind::ApplyClick { application_url } => {
            json!({ "application_url": application_url })
        }
    };
    InteractionRequest {
        user_id: user_id.to_string(),
        interaction_type: kind.as_str().to_string(),
        interaction_data,
    }
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::ScrapeStarted(Ok(accepted)) => Msg::ScrapeAccepted {
            session_id: accepted.session_id,
        },
        EngineEvent::ScrapeStarted(Err(err)) => Msg::ScrapeRejected {
            message: err.to_string(),
        },
        EngineEvent::StatusFetched {
            generation, result, ..
        } => Msg::StatusReceived {
            generation,
            result: result.map(map_status).map_err(describe),
        },
        EngineEvent::JobsLoaded { request, result } => Msg::JobsLoaded {
            request,
            result: result
                .map(|page| page.jobs.into_iter().map(map_job).collect())
                .map_err(describe),
        },
        EngineEvent::ScrapeResultsLoaded {
            request, result, ..
        } => Msg::JobsLoaded {
            request,
            result: result
                .map(|results| results.results.into_iter().map(map_scraped).collect())
                .map_err(describe),
        },
        EngineEvent::DemoScraped { request, result } => Msg::DemoScraped {
            request,
            result: result.map(map_demo).map_err(describe),
        },
        EngineEvent::JobDetailLoaded { result, .. } => {
            Msg::JobDetailLoaded(result.map(map_detail).map_err(describe))
        }
        EngineEvent::InteractionLogged { job_id, result } => {
            if let Err(err) = result {
                board_warn!("Failed to log interaction for job {}: {}", job_id, err);
            }
            return None;
        }
        EngineEvent::ConfigLoaded(result) => {
            Msg::ConfigLoaded(result.map(map_config).map_err(describe))
        }
    };
    Some(msg)
}

fn describe(err: ApiError) -> String {
    err.to_string()
}

fn map_status(status: ProgressStatus) -> ProgressSnapshot {
    ProgressSnapshot {
        status: ScrapeStatus::from_wire(&status.status),
        total_urls: status.total_urls,
        completed: status.completed,
        success_count: status.success_count,
        error_count: status.error_count,
        errors: status.errors,
    }
}

fn map_job(job: JobPosting) -> JobCard {
    let salary = format_salary(&job);
    JobCard {
        id: job.id,
        url: job.url,
        title: job.job_title,
        company: job.company_name,
        location: job.location,
        department: job.department,
        employment_type: job.employment_type,
        salary,
        ats_platform: job.ats_platform,
        posted_date: job.posted_date,
        application_url: job.application_url,
    }
}

/// Unstored postings keep an empty id; stored ones take the row id.
fn map_scraped(job: ScrapedJob) -> JobCard {
    let mut card = map_job(job.detail.job_posting);
    if let Some(id) = job.stored_job_id {
        card.id = id;
    }
    card
}

fn map_demo(response: DemoScrapeResponse) -> DemoResults {
    let jobs: Vec<JobCard> = response.results.into_iter().map(map_scraped).collect();
    let message = response
        .message
        .unwrap_or_else(|| format!("Scraped {} job(s)", jobs.len()));
    DemoResults { jobs, message }
}

fn map_detail(detail: JobDetail) -> JobDetailView {
    let JobDetail {
        mut job_posting,
        application_form,
        mut form_fields,
        mut competency_questions,
    } = detail;

    form_fields.sort_by_key(|field| field.field_order);
    competency_questions.sort_by_key(|question| question.question_order);

    let company_description = job_posting.company_description.take();
    let description = job_posting.job_description.take();
    let responsibilities = std::mem::take(&mut job_posting.responsibilities);
    let qualifications = std::mem::take(&mut job_posting.qualifications);
    let benefits = std::mem::take(&mut job_posting.benefits);
    let form = application_form.unwrap_or_default();

    JobDetailView {
        card: map_job(job_posting),
        company_description,
        description,
        responsibilities,
        qualifications,
        benefits,
        form_url: form.form_url,
        has_captcha: form.has_captcha,
        requires_auth: form.requires_auth,
        form_fields: form_fields
            .into_iter()
            .map(|field| FormFieldView {
                label: field
                    .field_label
                    .or(field.field_name)
                    .unwrap_or_else(|| "(unnamed)".to_string()),
                field_type: field.field_type,
                required: field.is_required,
                options: field
                    .options
                    .into_iter()
                    .map(|option| match option {
                        serde_json::Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            })
            .collect(),
        questions: competency_questions
            .into_iter()
            .map(|question| QuestionView {
                text: question.question_text,
                question_type: question
                    .question_type
                    .unwrap_or_else(|| "behavioral".to_string()),
                required: question.is_required,
                word_limit: question.word_limit,
            })
            .collect(),
    }
}

fn map_config(config: ConfigStatus) -> ConfigView {
    ConfigView {
        firecrawl_configured: config.firecrawl_configured,
        supabase_configured: config.supabase_configured,
        supabase_connected: config.supabase_connected,
    }
}

/// Prefers the scraped salary text, otherwise builds one from the numeric range.
fn format_salary(job: &JobPosting) -> Option<String> {
    if let Some(text) = job.salary_text.as_deref().filter(|t| !t.trim().is_empty()) {
        return Some(text.to_string());
    }
    let currency = job.salary_currency.as_deref().unwrap_or("USD");
    match (job.salary_min, job.salary_max) {
        (Some(min), Some(max)) if min != max => Some(format!("{currency} {min:.0} - {max:.0}")),
        (Some(value), _) | (None, Some(value)) => Some(format!("{currency} {value:.0}")),
        (None, None) => None,
    }
}
