use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use jobboard_core::{
    AppViewModel, ConfigView, JobCard, JobDetailView, JobsSource, Notification,
    NotificationLevel, ProgressView,
};

/// Where the runner sends view models and notifications.
pub trait Surface {
    fn render(&mut self, view: &AppViewModel);
    fn notify(&mut self, notification: &Notification);
}

/// Plain-text terminal front end.
///
/// The progress panel is an `indicatif` bar with per-URL errors printed above
/// it as they arrive. The job list is printed whenever a load finishes; the
/// detail and config views are printed when they change.
#[derive(Default)]
pub struct TerminalSurface {
    bar: Option<ProgressBar>,
    printed_errors: usize,
    jobs_pending: bool,
    printed_detail: Option<JobDetailView>,
    printed_config: Option<ConfigView>,
    errors: usize,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of error notifications shown so far.
    pub fn error_count(&self) -> usize {
        self.errors
    }

    fn update_progress(&mut self, progress: Option<&ProgressView>) {
        match progress {
            Some(progress) => {
                for line in progress_error_lines(progress, self.printed_errors) {
                    self.println(&line);
                }
                self.printed_errors = progress.errors.len();
            }
            None => self.printed_errors = 0,
        }

        match (progress, self.bar.as_ref()) {
            (Some(progress), Some(bar)) => apply_progress(bar, progress),
            (Some(progress), None) => {
                let bar = ProgressBar::new(progress.total_urls);
                bar.set_style(progress_style());
                bar.enable_steady_tick(Duration::from_millis(120));
                apply_progress(&bar, progress);
                self.bar = Some(bar);
            }
            (None, Some(_)) => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
            (None, None) => {}
        }
    }

    fn println(&self, text: &str) {
        match &self.bar {
            Some(bar) => bar.println(text),
            None => println!("{text}"),
        }
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, view: &AppViewModel) {
        self.update_progress(view.progress.as_ref());

        if view.jobs_loading {
            self.jobs_pending = true;
        } else if self.jobs_pending {
            self.jobs_pending = false;
            self.println(&render_job_list(view));
        }

        if view.detail != self.printed_detail {
            if let Some(detail) = &view.detail {
                self.println(&render_detail(detail));
            }
            self.printed_detail = view.detail.clone();
        }

        if view.config != self.printed_config {
            if let Some(config) = &view.config {
                self.println(&render_config(config));
            }
            self.printed_config = view.config;
        }
    }

    fn notify(&mut self, notification: &Notification) {
        let stamp = Local::now().format("%H:%M:%S");
        let text = format!("[{stamp}] {}", format_notification(notification));
        match notification.level {
            NotificationLevel::Error => {
                self.errors += 1;
                match &self.bar {
                    Some(bar) => bar.suspend(|| eprintln!("{text}")),
                    None => eprintln!("{text}"),
                }
            }
            NotificationLevel::Info | NotificationLevel::Success => self.println(&text),
        }
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

fn apply_progress(bar: &ProgressBar, progress: &ProgressView) {
    bar.set_length(progress.total_urls);
    bar.set_position(progress.completed);
    bar.set_message(progress_message(progress));
}

pub fn progress_message(progress: &ProgressView) -> String {
    format!(
        "{:.0}% | {} ok, {} failed | {}",
        progress.percent, progress.success_count, progress.error_count, progress.session_id
    )
}

/// Errors the backend reported since `already_printed` were shown.
pub fn progress_error_lines(progress: &ProgressView, already_printed: usize) -> Vec<String> {
    progress
        .errors
        .iter()
        .skip(already_printed)
        .map(|err| format!("  ! {err}"))
        .collect()
}

pub fn format_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!("{tag}: {}", notification.message)
}

pub fn render_job_list(view: &AppViewModel) -> String {
    let mut out = String::new();
    let filter = view.search_query.trim();
    let title = match &view.source {
        JobsSource::Listing => "Jobs".to_string(),
        JobsSource::Search(query) => format!("Jobs matching \"{query}\""),
        JobsSource::SessionResults(session_id) => format!("Scraped in session {session_id}"),
        JobsSource::Demo => "Demo scrape results".to_string(),
    };
    let header = if filter.is_empty() {
        format!("{title} ({})", view.job_count)
    } else {
        format!(
            "{title} filtered by \"{filter}\" ({} of {})",
            view.job_count, view.total_jobs
        )
    };
    out.push_str(&header);

    if view.jobs.is_empty() {
        out.push_str("\n  No jobs found.");
        return out;
    }
    for job in &view.jobs {
        out.push('\n');
        out.push_str(&render_job_card(job));
    }
    out
}

pub fn render_job_card(job: &JobCard) -> String {
    let mut line = if job.id.is_empty() {
        format!("  {} - {}", job.title, job.company)
    } else {
        format!("  [{}] {} - {}", job.id, job.title, job.company)
    };
    let extras: Vec<String> = [
        job.location.clone(),
        job.employment_type.clone(),
        job.salary.clone(),
        job.posted_date.as_deref().map(format_date),
    ]
    .into_iter()
    .flatten()
    .filter(|value| !value.trim().is_empty())
    .collect();
    if !extras.is_empty() {
        line.push_str(" | ");
        line.push_str(&extras.join(" | "));
    }
    line
}

pub fn render_detail(detail: &JobDetailView) -> String {
    let card = &detail.card;
    let mut out = format!("{}\n{}\n", card.title, card.company);
    push_field(&mut out, "Location", card.location.as_deref());
    push_field(&mut out, "Department", card.department.as_deref());
    push_field(&mut out, "Type", card.employment_type.as_deref());
    push_field(&mut out, "Salary", card.salary.as_deref());
    push_field(&mut out, "Platform", card.ats_platform.as_deref());
    push_field(
        &mut out,
        "Posted",
        card.posted_date.as_deref().map(format_date).as_deref(),
    );
    push_field(&mut out, "Posting", Some(card.url.as_str()).filter(|u| !u.is_empty()));
    push_field(&mut out, "Apply at", card.application_url.as_deref());

    if let Some(about) = &detail.company_description {
        out.push_str(&format!("\nAbout the company\n  {about}\n"));
    }
    if let Some(description) = &detail.description {
        out.push_str(&format!("\nDescription\n  {description}\n"));
    }
    push_list(&mut out, "Responsibilities", &detail.responsibilities);
    push_list(&mut out, "Qualifications", &detail.qualifications);
    push_list(&mut out, "Benefits", &detail.benefits);

    if detail.form_url.is_some() || !detail.form_fields.is_empty() {
        out.push_str("\nApplication form\n");
        push_field(&mut out, "Form", detail.form_url.as_deref());
        if detail.requires_auth {
            out.push_str("  Requires sign-in\n");
        }
        if detail.has_captcha {
            out.push_str("  Has captcha\n");
        }
        for field in &detail.form_fields {
            let marker = if field.required { "*" } else { "" };
            out.push_str(&format!("  - {}{} ({})", field.label, marker, field.field_type));
            if !field.options.is_empty() {
                out.push_str(&format!(": {}", field.options.join(", ")));
            }
            out.push('\n');
        }
    }

    if !detail.questions.is_empty() {
        out.push_str("\nScreening questions\n");
        for question in &detail.questions {
            let marker = if question.required { "*" } else { "" };
            out.push_str(&format!("  - {}{} [{}]", question.text, marker, question.question_type));
            if let Some(limit) = question.word_limit {
                out.push_str(&format!(" (max {limit} words)"));
            }
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

pub fn render_config(config: &ConfigView) -> String {
    let flag = |on: bool| if on { "yes" } else { "no" };
    format!(
        "Backend configuration\n  Firecrawl configured: {}\n  Supabase configured:  {}\n  Supabase connected:   {}",
        flag(config.firecrawl_configured),
        flag(config.supabase_configured),
        flag(config.supabase_connected)
    )
}

/// Shows RFC 3339 timestamps and ISO dates as `YYYY-MM-DD`; anything else verbatim.
pub fn format_date(raw: &str) -> String {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return stamp.date_naive().to_string();
    }
    let head = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(date) => date.to_string(),
        Err(_) => raw.to_string(),
    }
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("  {label}: {value}\n"));
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}\n"));
    for item in items {
        out.push_str(&format!("  - {item}\n"));
    }
}
