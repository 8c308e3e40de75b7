use std::sync::Once;

use jobboard_core::{
    update, AppState, ConfigView, DemoResults, Effect, InteractionKind, JobCard, JobDetailView,
    JobsSource, Msg, Notification, JOBS_PAGE_LIMIT,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobboard_logging::initialize_for_tests);
}

fn submit_urls(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(input.to_string()));
    update(state, Msg::ScrapeSubmitted)
}

fn job(id: &str, title: &str, company: &str) -> JobCard {
    JobCard {
        id: id.to_string(),
        url: format!("https://jobs.example.com/{id}"),
        title: title.to_string(),
        company: company.to_string(),
        ..JobCard::default()
    }
}

fn jobs_loaded(request: u64, jobs: Vec<JobCard>) -> Msg {
    Msg::JobsLoaded {
        request,
        result: Ok(jobs),
    }
}

fn jobs_failed(request: u64, message: &str) -> Msg {
    Msg::JobsLoaded {
        request,
        result: Err(message.to_string()),
    }
}

fn loaded(jobs: Vec<JobCard>) -> AppState {
    let (state, _) = update(AppState::new(), Msg::RefreshClicked);
    let (state, _) = update(state, jobs_loaded(1, jobs));
    state
}

fn titles(state: &AppState) -> Vec<String> {
    state.view().jobs.iter().map(|j| j.title.clone()).collect()
}

#[test]
fn submit_trims_and_dedupes_urls() {
    init_logging();
    let input = "https://a.example.com/job \n\n  https://b.example.com/job\nhttps://a.example.com/job/\n";

    let (next, effects) = submit_urls(AppState::new(), input);

    assert_eq!(
        effects[0],
        Effect::StartScrape {
            urls: vec![
                "https://a.example.com/job".to_string(),
                "https://b.example.com/job".to_string(),
            ]
        }
    );
    assert_eq!(
        effects[1],
        Effect::Notify(Notification::info("Starting scrape of 2 job posting(s)"))
    );
    // Input is cleared, so submitting again asks for URLs.
    let (_, effects) = update(next, Msg::ScrapeSubmitted);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Please enter at least one URL"
        ))]
    );
}

#[test]
fn blank_submit_sends_nothing() {
    init_logging();
    let (_, effects) = submit_urls(AppState::new(), "   \n\n");
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Please enter at least one URL"
        ))]
    );
}

#[test]
fn rejected_scrape_leaves_monitor_idle() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ScrapeRejected {
            message: "No URLs provided".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Failed to start scraping: No URLs provided"
        ))]
    );
    assert!(state.view().progress.is_none());
    assert_eq!(state.monitor().generation(), 0);
}

#[test]
fn refresh_loads_first_page() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RefreshClicked);
    assert_eq!(
        effects,
        vec![Effect::LoadJobs {
            request: 1,
            limit: JOBS_PAGE_LIMIT
        }]
    );
    assert!(state.view().jobs_loading);

    let (state, _) = update(state, jobs_loaded(1, vec![job("1", "Engineer", "Acme")]));
    let view = state.view();
    assert!(!view.jobs_loading);
    assert_eq!(view.job_count, 1);
}

#[test]
fn failed_load_keeps_previous_jobs() {
    init_logging();
    let state = loaded(vec![job("1", "Engineer", "Acme")]);
    let (state, _) = update(state, Msg::RefreshClicked);
    let (state, effects) = update(state, jobs_failed(2, "http status 500"));

    assert_eq!(state.view().job_count, 1);
    assert!(!state.view().jobs_loading);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Failed to load jobs: http status 500"
        ))]
    );
}

#[test]
fn search_filters_locally() {
    init_logging();
    let state = loaded(vec![
        job("1", "Backend Engineer", "Acme"),
        job("2", "Designer", "Globex"),
        job("3", "Data Engineer", "Initech"),
    ]);

    let (mut state, effects) = update(state, Msg::SearchChanged("engineer".to_string()));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.job_count, 2);
    assert_eq!(view.total_jobs, 3);
    let ids: Vec<_> = view.jobs.iter().map(|j| j.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);

    let (state, _) = update(state, Msg::SearchChanged("globex".to_string()));
    assert_eq!(state.view().jobs[0].id, "2");

    let (state, _) = update(state, Msg::SearchChanged(String::new()));
    assert_eq!(state.view().job_count, 3);
}

#[test]
fn submitted_search_goes_to_backend() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SearchChanged(" rust ".to_string()));
    let (state, effects) = update(state, Msg::SearchSubmitted);

    assert_eq!(
        effects,
        vec![Effect::SearchJobs {
            request: 1,
            query: "rust".to_string(),
            limit: JOBS_PAGE_LIMIT
        }]
    );
    let view = state.view();
    assert_eq!(view.source, JobsSource::Listing);
    assert_eq!(view.search_query, "");

    // Backend hits are shown even when the local filter would not match them.
    let (state, _) = update(state, jobs_loaded(1, vec![job("9", "Platform", "Ferrous")]));
    let view = state.view();
    assert_eq!(view.job_count, 1);
    assert_eq!(view.source, JobsSource::Search("rust".to_string()));
}

#[test]
fn blank_submitted_search_reloads_listing() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SearchSubmitted);
    assert_eq!(
        effects,
        vec![Effect::LoadJobs {
            request: 1,
            limit: JOBS_PAGE_LIMIT
        }]
    );
    assert_eq!(state.view().source, JobsSource::Listing);
}

#[test]
fn late_search_result_does_not_replace_newer_listing() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::SearchChanged("rust".to_string()));
    let (state, _) = update(state, Msg::SearchSubmitted);
    let (state, _) = update(state, Msg::RefreshClicked);

    let (state, _) = update(
        state,
        jobs_loaded(
            2,
            vec![
                job("a", "A", "Acme"),
                job("b", "B", "Acme"),
                job("c", "C", "Acme"),
            ],
        ),
    );
    let (state, effects) = update(state, jobs_loaded(1, vec![job("r", "Rust only", "Ferrous")]));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.job_count, 3);
    assert_eq!(view.source, JobsSource::Listing);
    assert!(!view.jobs_loading);
}

#[test]
fn stale_failure_is_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::RefreshClicked);
    let (state, _) = update(state, Msg::RefreshClicked);
    let (state, effects) = update(state, jobs_failed(1, "timeout"));

    assert!(effects.is_empty());
    assert!(state.view().jobs_loading);
}

#[test]
fn failed_search_keeps_previous_list_label() {
    init_logging();
    let state = loaded(vec![job("1", "Engineer", "Acme")]);
    let (state, _) = update(state, Msg::SearchChanged("rust".to_string()));
    let (state, _) = update(state, Msg::SearchSubmitted);
    let (state, effects) = update(state, jobs_failed(2, "http status 500"));

    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Failed to load jobs: http status 500"
        ))]
    );
    let view = state.view();
    assert_eq!(view.source, JobsSource::Listing);
    assert_eq!(view.job_count, 1);
}

#[test]
fn session_results_can_be_requested() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ResultsRequested {
            session_id: " session_7 ".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadScrapeResults {
            request: 1,
            session_id: "session_7".to_string(),
        }]
    );

    let (state, _) = update(state, jobs_loaded(1, vec![job("", "Engineer", "Acme")]));
    assert_eq!(
        state.view().source,
        JobsSource::SessionResults("session_7".to_string())
    );

    let (_, effects) = update(
        state,
        Msg::ResultsRequested {
            session_id: "  ".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error("Please enter a session id"))]
    );
}

#[test]
fn demo_scrape_shows_returned_jobs() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::InputChanged("https://a.example.com/job\nhttps://b.example.com/job".to_string()),
    );
    let (state, effects) = update(state, Msg::DemoScrapeSubmitted);
    assert_eq!(
        effects,
        vec![
            Effect::DemoScrape {
                request: 1,
                urls: vec![
                    "https://a.example.com/job".to_string(),
                    "https://b.example.com/job".to_string(),
                ],
            },
            Effect::Notify(Notification::info(
                "Scraping 2 job posting(s) without storing them"
            )),
        ]
    );
    assert!(state.view().jobs_loading);

    let (state, effects) = update(
        state,
        Msg::DemoScraped {
            request: 1,
            result: Ok(DemoResults {
                jobs: vec![job("", "Engineer", "Acme")],
                message: "Successfully scraped 1/2 jobs".to_string(),
            }),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::success(
            "Successfully scraped 1/2 jobs"
        ))]
    );
    let view = state.view();
    assert_eq!(view.source, JobsSource::Demo);
    assert_eq!(titles(&state), vec!["Engineer".to_string()]);
}

#[test]
fn demo_scrape_failure_notifies() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::InputChanged("https://a.example.com".to_string()));
    let (state, _) = update(state, Msg::DemoScrapeSubmitted);
    let (state, effects) = update(
        state,
        Msg::DemoScraped {
            request: 1,
            result: Err("http status 400: No URLs provided".to_string()),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Demo scrape failed: http status 400: No URLs provided"
        ))]
    );
    assert!(!state.view().jobs_loading);

    let (_, effects) = update(AppState::new(), Msg::DemoScrapeSubmitted);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Please enter at least one URL"
        ))]
    );
}

#[test]
fn tick_changes_nothing() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn selecting_job_loads_detail_and_logs_view() {
    init_logging();
    let state = loaded(vec![job("7", "Engineer", "Acme")]);
    let (state, effects) = update(
        state,
        Msg::JobSelected {
            job_id: "7".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![
            Effect::LoadJobDetail {
                job_id: "7".to_string()
            },
            Effect::LogInteraction {
                job_id: "7".to_string(),
                kind: InteractionKind::View,
            },
        ]
    );

    let detail = JobDetailView {
        card: job("7", "Engineer", "Acme"),
        description: Some("Build things".to_string()),
        ..JobDetailView::default()
    };
    let (state, _) = update(state, Msg::JobDetailLoaded(Ok(detail.clone())));
    assert_eq!(state.view().detail, Some(detail));

    let (state, _) = update(state, Msg::DetailClosed);
    assert_eq!(state.view().detail, None);
}

#[test]
fn detail_arriving_after_close_is_dropped() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::JobSelected {
            job_id: "7".to_string(),
        },
    );
    let (state, _) = update(state, Msg::DetailClosed);
    let detail = JobDetailView {
        card: job("7", "Engineer", "Acme"),
        ..JobDetailView::default()
    };
    let (state, _) = update(state, Msg::JobDetailLoaded(Ok(detail)));
    assert_eq!(state.view().detail, None);
}

#[test]
fn detail_failure_notifies() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::JobSelected {
            job_id: "404".to_string(),
        },
    );
    let (state, effects) = update(
        state,
        Msg::JobDetailLoaded(Err("http status 404: Job not found".to_string())),
    );
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Failed to load job details: http status 404: Job not found"
        ))]
    );
    assert_eq!(state.view().detail, None);
}

#[test]
fn apply_click_logs_application_url() {
    init_logging();
    let mut card = job("3", "Engineer", "Acme");
    card.application_url = Some("https://apply.example.com/3".to_string());
    let state = loaded(vec![card, job("4", "Designer", "Globex")]);

    let (state, effects) = update(
        state,
        Msg::ApplyClicked {
            job_id: "3".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LogInteraction {
            job_id: "3".to_string(),
            kind: InteractionKind::ApplyClick {
                application_url: Some("https://apply.example.com/3".to_string())
            },
        }]
    );

    // Without an explicit application URL the posting URL is used.
    let (_, effects) = update(
        state,
        Msg::ApplyClicked {
            job_id: "4".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LogInteraction {
            job_id: "4".to_string(),
            kind: InteractionKind::ApplyClick {
                application_url: Some("https://jobs.example.com/4".to_string())
            },
        }]
    );
}

#[test]
fn config_view_opens_and_closes() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ConfigRequested);
    assert_eq!(effects, vec![Effect::LoadConfig]);

    let config = ConfigView {
        firecrawl_configured: true,
        supabase_configured: true,
        supabase_connected: false,
    };
    let (state, _) = update(state, Msg::ConfigLoaded(Ok(config)));
    assert_eq!(state.view().config, Some(config));

    let (state, _) = update(state, Msg::ConfigClosed);
    assert_eq!(state.view().config, None);
}

#[test]
fn config_failure_notifies() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ConfigLoaded(Err("network error".to_string())),
    );
    assert_eq!(state.view().config, None);
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification::error(
            "Failed to load configuration: network error"
        ))]
    );
}

#[test]
fn interaction_kind_names() {
    assert_eq!(InteractionKind::View.as_str(), "view");
    assert_eq!(
        InteractionKind::ApplyClick {
            application_url: None
        }
        .as_str(),
        "apply_click"
    );
}
