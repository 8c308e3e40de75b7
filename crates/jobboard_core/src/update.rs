use jobboard_logging::{board_debug, board_info};

use crate::{
    parse_urls, AppState, Effect, InteractionKind, JobsRequest, JobsSource, MonitorOutcome, Msg,
    Notification, PollRequest, PollStep,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(raw) => {
            state.set_input(raw);
            Vec::new()
        }
        Msg::ScrapeSubmitted => {
            let urls = parse_urls(state.input());
            if urls.is_empty() {
                return (state, vec![missing_urls()]);
            }
            state.clear_input();
            let count = urls.len();
            vec![
                Effect::StartScrape { urls },
                Effect::Notify(Notification::info(format!(
                    "Starting scrape of {count} job posting(s)"
                ))),
            ]
        }
        Msg::ScrapeAccepted { session_id } => match state.monitor_mut().begin(&session_id) {
            Ok(request) => {
                state.mark_dirty();
                vec![poll_effect(request)]
            }
            Err(err) => vec![Effect::Notify(Notification::error(format!(
                "Cannot monitor scrape: {err}"
            )))],
        },
        Msg::ScrapeRejected { message } => vec![Effect::Notify(Notification::error(format!(
            "Failed to start scraping: {message}"
        )))],
        Msg::StatusReceived { generation, result } => {
            match state.monitor_mut().apply(generation, result) {
                PollStep::Continue(request) => {
                    state.mark_dirty();
                    vec![poll_effect(request)]
                }
                PollStep::Finished(outcome) => {
                    state.mark_dirty();
                    finished_effects(&mut state, outcome)
                }
                PollStep::Stale | PollStep::Inactive => {
                    board_debug!("Ignoring status for generation {}", generation);
                    Vec::new()
                }
            }
        }
        Msg::DemoScrapeSubmitted => {
            let urls = parse_urls(state.input());
            if urls.is_empty() {
                return (state, vec![missing_urls()]);
            }
            state.clear_input();
            state.set_results_fallback(None);
            let count = urls.len();
            let request = state.start_jobs_load(JobsSource::Demo);
            vec![
                Effect::DemoScrape { request, urls },
                Effect::Notify(Notification::info(format!(
                    "Scraping {count} job posting(s) without storing them"
                ))),
            ]
        }
        Msg::DemoScraped { request, result } => match result {
            Ok(results) => {
                if !state.finish_jobs_load(request, Some(results.jobs)) {
                    return (state, stale_jobs(request));
                }
                vec![Effect::Notify(Notification::success(results.message))]
            }
            Err(message) => {
                if !state.finish_jobs_load(request, None) {
                    return (state, stale_jobs(request));
                }
                vec![Effect::Notify(Notification::error(format!(
                    "Demo scrape failed: {message}"
                )))]
            }
        },
        Msg::RefreshClicked => {
            state.set_results_fallback(None);
            vec![load_listing(&mut state)]
        }
        Msg::ResultsRequested { session_id } => {
            let session_id = session_id.trim().to_string();
            if session_id.is_empty() {
                return (
                    state,
                    vec![Effect::Notify(Notification::error(
                        "Please enter a session id",
                    ))],
                );
            }
            state.set_results_fallback(None);
            vec![load_results(&mut state, session_id)]
        }
        Msg::JobsLoaded {
            request,
            result: Ok(jobs),
        } => {
            if !state.finish_jobs_load(request, Some(jobs)) {
                return (state, stale_jobs(request));
            }
            state.set_results_fallback(None);
            Vec::new()
        }
        Msg::JobsLoaded {
            request,
            result: Err(message),
        } => {
            if !state.is_current_jobs_request(request) {
                return (state, stale_jobs(request));
            }
            match state.take_results_fallback() {
                Some(session_id) => {
                    board_info!(
                        "Job list unavailable, falling back to results of session {}",
                        session_id
                    );
                    vec![
                        Effect::Notify(Notification::info(format!(
                            "Job list unavailable ({message}); showing results of session {session_id}"
                        ))),
                        load_results(&mut state, session_id),
                    ]
                }
                None => {
                    state.finish_jobs_load(request, None);
                    vec![Effect::Notify(Notification::error(format!(
                        "Failed to load jobs: {message}"
                    )))]
                }
            }
        }
        Msg::SearchChanged(query) => {
            state.set_search_query(query);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            let query = state.search_query().trim().to_string();
            state.set_results_fallback(None);
            if query.is_empty() {
                vec![load_listing(&mut state)]
            } else {
                // Backend results may match fields the local filter does not see.
                state.set_search_query(String::new());
                let request = state.start_jobs_load(JobsSource::Search(query.clone()));
                vec![Effect::SearchJobs {
                    request,
                    query,
                    limit: state.jobs_limit(),
                }]
            }
        }
        Msg::JobSelected { job_id } => {
            state.start_detail_load(job_id.clone());
            vec![
                Effect::LoadJobDetail {
                    job_id: job_id.clone(),
                },
                Effect::LogInteraction {
                    job_id,
                    kind: InteractionKind::View,
                },
            ]
        }
        Msg::JobDetailLoaded(Ok(detail)) => {
            state.open_detail(detail);
            Vec::new()
        }
        Msg::JobDetailLoaded(Err(message)) => {
            state.fail_detail_load();
            vec![Effect::Notify(Notification::error(format!(
                "Failed to load job details: {message}"
            )))]
        }
        Msg::DetailClosed => {
            state.close_detail();
            Vec::new()
        }
        Msg::ApplyClicked { job_id } => {
            let application_url = state
                .find_job(&job_id)
                .map(|job| job.application_url.clone().unwrap_or_else(|| job.url.clone()));
            vec![Effect::LogInteraction {
                job_id,
                kind: InteractionKind::ApplyClick { application_url },
            }]
        }
        Msg::ConfigRequested => vec![Effect::LoadConfig],
        Msg::ConfigLoaded(Ok(config)) => {
            state.open_config(config);
            Vec::new()
        }
        Msg::ConfigLoaded(Err(message)) => vec![Effect::Notify(Notification::error(format!(
            "Failed to load configuration: {message}"
        )))],
        Msg::ConfigClosed => {
            state.close_config();
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn missing_urls() -> Effect {
    Effect::Notify(Notification::error("Please enter at least one URL"))
}

fn stale_jobs(request: JobsRequest) -> Vec<Effect> {
    board_debug!("Ignoring job list for superseded request {}", request);
    Vec::new()
}

fn load_listing(state: &mut AppState) -> Effect {
    let request = state.start_jobs_load(JobsSource::Listing);
    Effect::LoadJobs {
        request,
        limit: state.jobs_limit(),
    }
}

fn load_results(state: &mut AppState, session_id: String) -> Effect {
    let request = state.start_jobs_load(JobsSource::SessionResults(session_id.clone()));
    Effect::LoadScrapeResults {
        request,
        session_id,
    }
}

fn poll_effect(request: PollRequest) -> Effect {
    Effect::PollStatus {
        generation: request.generation,
        session_id: request.session_id,
        delay: request.delay,
    }
}

fn finished_effects(state: &mut AppState, outcome: MonitorOutcome) -> Vec<Effect> {
    match outcome {
        MonitorOutcome::Completed {
            session_id,
            success_count,
            error_count,
            errors,
        } => {
            let message = if error_count > 0 {
                format!(
                    "Scraping completed! {success_count} jobs scraped successfully, {error_count} failed."
                )
            } else {
                format!("Scraping completed! {success_count} jobs scraped successfully.")
            };
            let refresh = load_listing(state);
            state.set_results_fallback(Some(session_id).filter(|id| !id.is_empty()));
            let mut effects = vec![refresh, Effect::Notify(Notification::success(message))];
            effects.extend(url_errors(&errors));
            effects
        }
        MonitorOutcome::SemanticFailure { status, errors } => {
            let mut effects = vec![Effect::Notify(Notification::error(format!(
                "Scraping failed (backend reported status \"{status}\")"
            )))];
            effects.extend(url_errors(&errors));
            effects
        }
        MonitorOutcome::TransportError { message } => vec![Effect::Notify(
            Notification::error(format!("Failed to check scraping status: {message}")),
        )],
    }
}

/// One error notification listing the backend's per-URL failures, if any.
fn url_errors(errors: &[String]) -> Option<Effect> {
    if errors.is_empty() {
        return None;
    }
    Some(Effect::Notify(Notification::error(format!(
        "Scrape errors: {}",
        errors.join("; ")
    ))))
}
