use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use jobboard_logging::board_debug;
use thiserror::Error;

use crate::client::{ApiClient, ApiSettings, ReqwestApiClient};
use crate::{ApiError, EngineEvent, InteractionRequest};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Client(#[from] ApiError),
    #[error("engine thread has stopped")]
    Stopped,
}

enum EngineCommand {
    StartScrape {
        urls: Vec<String>,
    },
    PollStatus {
        generation: u64,
        session_id: String,
        delay: Duration,
    },
    LoadJobs {
        request: u64,
        limit: u32,
    },
    SearchJobs {
        request: u64,
        query: String,
        limit: u32,
    },
    LoadScrapeResults {
        request: u64,
        session_id: String,
    },
    DemoScrape {
        request: u64,
        urls: Vec<String>,
    },
    LoadJobDetail {
        job_id: String,
    },
    LogInteraction {
        job_id: String,
        request: InteractionRequest,
    },
    LoadConfig,
}

/// Runs API calls on a background tokio runtime and hands results back as
/// [`EngineEvent`]s.
///
/// Every command is an independent task; nothing is cancelled once issued.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EngineError> {
        let client = ReqwestApiClient::new(settings)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn ApiClient>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn start_scrape(&self, urls: Vec<String>) -> Result<(), EngineError> {
        self.send(EngineCommand::StartScrape { urls })
    }

    /// Fetches the status of `session_id` once `delay` has elapsed.
    pub fn poll_status(
        &self,
        generation: u64,
        session_id: impl Into<String>,
        delay: Duration,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::PollStatus {
            generation,
            session_id: session_id.into(),
            delay,
        })
    }

    pub fn load_jobs(&self, request: u64, limit: u32) -> Result<(), EngineError> {
        self.send(EngineCommand::LoadJobs { request, limit })
    }

    pub fn search_jobs(
        &self,
        request: u64,
        query: impl Into<String>,
        limit: u32,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::SearchJobs {
            request,
            query: query.into(),
            limit,
        })
    }

    pub fn load_scrape_results(
        &self,
        request: u64,
        session_id: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::LoadScrapeResults {
            request,
            session_id: session_id.into(),
        })
    }

    pub fn demo_scrape(&self, request: u64, urls: Vec<String>) -> Result<(), EngineError> {
        self.send(EngineCommand::DemoScrape { request, urls })
    }

    pub fn load_job_detail(&self, job_id: impl Into<String>) -> Result<(), EngineError> {
        self.send(EngineCommand::LoadJobDetail {
            job_id: job_id.into(),
        })
    }

    pub fn log_interaction(
        &self,
        job_id: impl Into<String>,
        request: InteractionRequest,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::LogInteraction {
            job_id: job_id.into(),
            request,
        })
    }

    pub fn load_config(&self) -> Result<(), EngineError> {
        self.send(EngineCommand::LoadConfig)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event. `Ok(None)` means nothing
    /// arrived in time; `Err(Stopped)` means nothing ever will.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Stopped),
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx.send(command).map_err(|_| EngineError::Stopped)
    }
}

async fn handle_command(
    client: &dyn ApiClient,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::StartScrape { urls } => {
            board_debug!("Starting scrape of {} url(s)", urls.len());
            EngineEvent::ScrapeStarted(client.start_scrape(&urls).await)
        }
        EngineCommand::PollStatus {
            generation,
            session_id,
            delay,
        } => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            board_debug!(
                "Polling session {} (generation {})",
                session_id,
                generation
            );
            let result = client.scrape_status(&session_id).await;
            EngineEvent::StatusFetched {
                generation,
                session_id,
                result,
            }
        }
        EngineCommand::LoadJobs { request, limit } => EngineEvent::JobsLoaded {
            request,
            result: client.list_jobs(limit, 0).await,
        },
        EngineCommand::SearchJobs {
            request,
            query,
            limit,
        } => EngineEvent::JobsLoaded {
            request,
            result: client.search_jobs(&query, limit).await,
        },
        EngineCommand::LoadScrapeResults {
            request,
            session_id,
        } => {
            let result = client.scrape_results(&session_id).await;
            EngineEvent::ScrapeResultsLoaded {
                request,
                session_id,
                result,
            }
        }
        EngineCommand::DemoScrape { request, urls } => {
            board_debug!("Demo scrape of {} url(s)", urls.len());
            EngineEvent::DemoScraped {
                request,
                result: client.demo_scrape(&urls).await,
            }
        }
        EngineCommand::LoadJobDetail { job_id } => {
            let result = client.job_detail(&job_id).await;
            EngineEvent::JobDetailLoaded { job_id, result }
        }
        EngineCommand::LogInteraction { job_id, request } => {
            let result = client.log_interaction(&job_id, &request).await;
            EngineEvent::InteractionLogged { job_id, result }
        }
        EngineCommand::LoadConfig => EngineEvent::ConfigLoaded(client.config_status().await),
    };
    let _ = event_tx.send(event);
}
