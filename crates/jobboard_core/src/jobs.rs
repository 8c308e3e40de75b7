/// One job posting as shown in the job list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobCard {
    pub id: String,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub salary: Option<String>,
    pub ats_platform: Option<String>,
    pub posted_date: Option<String>,
    pub application_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFieldView {
    pub label: String,
    pub field_type: String,
    pub required: bool,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionView {
    pub text: String,
    pub question_type: String,
    pub required: bool,
    pub word_limit: Option<u32>,
}

/// Everything the detail view shows for one job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobDetailView {
    pub card: JobCard,
    pub company_description: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub benefits: Vec<String>,
    pub form_url: Option<String>,
    pub has_captcha: bool,
    pub requires_auth: bool,
    pub form_fields: Vec<FormFieldView>,
    pub questions: Vec<QuestionView>,
}

/// Backend configuration status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigView {
    pub firecrawl_configured: bool,
    pub supabase_configured: bool,
    pub supabase_connected: bool,
}

/// Outcome of a demo scrape.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DemoResults {
    pub jobs: Vec<JobCard>,
    /// Summary line from the backend, e.g. `Successfully scraped 2/3 jobs`.
    pub message: String,
}

/// Identifies one job list request; only the latest one may replace the list.
pub type JobsRequest = u64;

/// Where the job list on screen came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobsSource {
    /// `GET /jobs`, the stored postings.
    #[default]
    Listing,
    /// `GET /jobs/search` for the query.
    Search(String),
    /// What one scrape session produced, straight from the backend's session memory.
    SessionResults(String),
    /// A scrape run through the demo endpoint; nothing was stored.
    Demo,
}

/// Case-insensitive match of `query` against title, company, location and
/// department. A blank query matches every job.
pub fn matches_query(job: &JobCard, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let haystacks = [
        Some(job.title.as_str()),
        Some(job.company.as_str()),
        job.location.as_deref(),
        job.department.as_deref(),
    ];
    haystacks
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}
