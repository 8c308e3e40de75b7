use std::fmt;
use std::time::Duration;

use jobboard_logging::{board_debug, board_info, board_warn};

/// Delay between two status queries while a scrape is still running.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Identifies one poll chain. Bumped by every `begin`.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeStatus {
    Running,
    Completed,
    Failed,
    /// Any status string the backend sends that is not one of the above.
    Other(String),
}

impl ScrapeStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "running" => ScrapeStatus::Running,
            "completed" => ScrapeStatus::Completed,
            "failed" => ScrapeStatus::Failed,
            other => ScrapeStatus::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScrapeStatus::Running)
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeStatus::Running => write!(f, "running"),
            ScrapeStatus::Completed => write!(f, "completed"),
            ScrapeStatus::Failed => write!(f, "failed"),
            ScrapeStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// One status snapshot for a scrape session. Replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub status: ScrapeStatus,
    pub total_urls: u64,
    pub completed: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub errors: Vec<String>,
}

impl ProgressSnapshot {
    /// `completed / total_urls * 100`, or `0` when there is nothing to scrape.
    pub fn percentage(&self) -> f64 {
        if self.total_urls == 0 {
            return 0.0;
        }
        (self.completed as f64 / self.total_urls as f64) * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// How a poll chain ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Completed {
        session_id: String,
        success_count: u64,
        error_count: u64,
        /// Per-URL failure messages reported by the backend.
        errors: Vec<String>,
    },
    /// The backend reported a terminal status other than `completed`.
    SemanticFailure {
        status: ScrapeStatus,
        errors: Vec<String>,
    },
    /// The status request itself failed (network, HTTP status, decoding).
    TransportError { message: String },
}

/// A status query the runtime should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    pub generation: Generation,
    pub session_id: String,
    pub delay: Duration,
}

/// What the monitor decided after seeing one poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    Continue(PollRequest),
    Finished(MonitorOutcome),
    /// The result belongs to a superseded chain and was dropped.
    Stale,
    /// No session is active; nothing to do.
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginError {
    EmptySessionId,
}

impl fmt::Display for BeginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeginError::EmptySessionId => write!(f, "session id must not be empty"),
        }
    }
}

impl std::error::Error for BeginError {}

/// Tracks a single scrape session from `begin` to a terminal state.
///
/// Each `begin` starts a new generation. Poll results carry the generation
/// they were requested under, and results from older generations are
/// ignored, so at most one chain ever drives the visible progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMonitor {
    generation: Generation,
    session: Option<String>,
    phase: MonitorPhase,
    latest: Option<ProgressSnapshot>,
    visible: bool,
    poll_interval: Duration,
    polls_issued: u64,
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ProgressMonitor {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            generation: 0,
            session: None,
            phase: MonitorPhase::Idle,
            latest: None,
            visible: false,
            poll_interval,
            polls_issued: 0,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    pub fn latest(&self) -> Option<&ProgressSnapshot> {
        self.latest.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of status queries requested for the current generation.
    pub fn polls_issued(&self) -> u64 {
        self.polls_issued
    }

    /// Starts monitoring `session_id`, superseding any chain in flight.
    ///
    /// Returns the first status query, which runs without delay.
    pub fn begin(&mut self, session_id: &str) -> Result<PollRequest, BeginError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(BeginError::EmptySessionId);
        }

        if self.phase == MonitorPhase::Running {
            board_info!(
                "Session {:?} superseded by {} (generation {})",
                self.session,
                session_id,
                self.generation + 1
            );
        }

        self.generation += 1;
        self.session = Some(session_id.to_string());
        self.phase = MonitorPhase::Running;
        self.latest = None;
        self.visible = true;
        self.polls_issued = 0;

        board_debug!(
            "Monitoring session {} as generation {}",
            session_id,
            self.generation
        );
        Ok(self.request(Duration::ZERO))
    }

    /// Applies the result of a status query.
    pub fn apply(
        &mut self,
        generation: Generation,
        result: Result<ProgressSnapshot, String>,
    ) -> PollStep {
        if generation != self.generation {
            board_debug!(
                "Dropping status for generation {} (current {})",
                generation,
                self.generation
            );
            return PollStep::Stale;
        }
        if self.session.is_none() || self.phase != MonitorPhase::Running {
            return PollStep::Inactive;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(message) => {
                board_warn!(
                    "Status query for session {:?} failed: {}",
                    self.session,
                    message
                );
                self.finish(MonitorPhase::Failed);
                return PollStep::Finished(MonitorOutcome::TransportError { message });
            }
        };

        let status = snapshot.status.clone();
        let success_count = snapshot.success_count;
        let error_count = snapshot.error_count;
        let errors = snapshot.errors.clone();
        self.latest = Some(snapshot);

        match status {
            ScrapeStatus::Running => PollStep::Continue(self.request(self.poll_interval)),
            ScrapeStatus::Completed => {
                board_info!(
                    "Session {:?} completed: {} ok, {} errors",
                    self.session,
                    success_count,
                    error_count
                );
                let session_id = self.session.clone().unwrap_or_default();
                self.finish(MonitorPhase::Completed);
                PollStep::Finished(MonitorOutcome::Completed {
                    session_id,
                    success_count,
                    error_count,
                    errors,
                })
            }
            other => {
                board_warn!("Session {:?} ended with status {}", self.session, other);
                self.finish(MonitorPhase::Failed);
                PollStep::Finished(MonitorOutcome::SemanticFailure {
                    status: other,
                    errors,
                })
            }
        }
    }

    fn request(&mut self, delay: Duration) -> PollRequest {
        self.polls_issued += 1;
        PollRequest {
            generation: self.generation,
            session_id: self.session.clone().unwrap_or_default(),
            delay,
        }
    }

    fn finish(&mut self, phase: MonitorPhase) {
        self.phase = phase;
        self.visible = false;
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: &str, total: u64, done: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            status: ScrapeStatus::from_wire(status),
            total_urls: total,
            completed: done,
            success_count: done,
            error_count: 0,
            errors: Vec::new(),
        }
    }

    #[test]
    fn percentage_handles_zero_total() {
        assert_eq!(snapshot("running", 0, 0).percentage(), 0.0);
        assert_eq!(snapshot("running", 4, 1).percentage(), 25.0);
        assert_eq!(snapshot("completed", 3, 3).percentage(), 100.0);
    }

    #[test]
    fn unknown_status_is_terminal() {
        assert_eq!(
            ScrapeStatus::from_wire("cancelled"),
            ScrapeStatus::Other("cancelled".to_string())
        );
        assert!(ScrapeStatus::from_wire("cancelled").is_terminal());
        assert!(!ScrapeStatus::Running.is_terminal());
    }

    #[test]
    fn begin_rejects_blank_session() {
        let mut monitor = ProgressMonitor::default();
        assert_eq!(monitor.begin("  "), Err(BeginError::EmptySessionId));
        assert_eq!(monitor.phase(), MonitorPhase::Idle);
        assert_eq!(monitor.generation(), 0);
        assert!(!monitor.is_visible());
    }

    #[test]
    fn apply_without_session_is_inactive() {
        let mut monitor = ProgressMonitor::default();
        let step = monitor.apply(0, Ok(snapshot("running", 1, 0)));
        assert_eq!(step, PollStep::Inactive);
        assert_eq!(monitor.polls_issued(), 0);
    }

    #[test]
    fn running_then_completed() {
        let mut monitor = ProgressMonitor::new(Duration::from_millis(50));
        let first = monitor.begin("s1").unwrap();
        assert_eq!(first.delay, Duration::ZERO);
        assert!(monitor.is_visible());

        let step = monitor.apply(first.generation, Ok(snapshot("running", 2, 1)));
        assert_eq!(
            step,
            PollStep::Continue(PollRequest {
                generation: 1,
                session_id: "s1".to_string(),
                delay: Duration::from_millis(50),
            })
        );

        let step = monitor.apply(1, Ok(snapshot("completed", 2, 2)));
        assert_eq!(
            step,
            PollStep::Finished(MonitorOutcome::Completed {
                session_id: "s1".to_string(),
                success_count: 2,
                error_count: 0,
                errors: Vec::new(),
            })
        );
        assert_eq!(monitor.phase(), MonitorPhase::Completed);
        assert!(!monitor.is_visible());
        assert_eq!(monitor.session_id(), None);
        assert_eq!(monitor.polls_issued(), 2);
        assert_eq!(monitor.latest().map(|s| s.completed), Some(2));
    }

    #[test]
    fn transport_error_ends_chain() {
        let mut monitor = ProgressMonitor::default();
        let first = monitor.begin("s1").unwrap();
        let step = monitor.apply(first.generation, Err("connection refused".to_string()));
        assert_eq!(
            step,
            PollStep::Finished(MonitorOutcome::TransportError {
                message: "connection refused".to_string()
            })
        );
        assert_eq!(monitor.phase(), MonitorPhase::Failed);

        // Late duplicate for the same generation does nothing.
        assert_eq!(
            monitor.apply(first.generation, Ok(snapshot("running", 1, 0))),
            PollStep::Inactive
        );
    }

    #[test]
    fn newer_begin_supersedes_older_chain() {
        let mut monitor = ProgressMonitor::default();
        let old = monitor.begin("s1").unwrap();
        let new = monitor.begin("s2").unwrap();
        assert_eq!(new.generation, old.generation + 1);

        assert_eq!(
            monitor.apply(old.generation, Ok(snapshot("completed", 1, 1))),
            PollStep::Stale
        );
        assert_eq!(monitor.phase(), MonitorPhase::Running);
        assert_eq!(monitor.session_id(), Some("s2"));
        assert!(monitor.latest().is_none());
    }
}
