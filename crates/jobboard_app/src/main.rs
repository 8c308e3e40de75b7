//! `jobboard`: terminal dashboard for the job scraping backend.

mod config;
mod render;
mod runner;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jobboard_api::EngineHandle;
use jobboard_core::{AppState, MonitorPhase, Msg};
use jobboard_logging::{board_info, LogDestination, DEFAULT_LOG_FILE};

use crate::config::{default_config_path, load_config, save_config, AppConfig};
use crate::render::TerminalSurface;
use crate::runner::Runner;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Scrape job postings and browse the results")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./.jobboard.ron)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend API root, e.g. http://127.0.0.1:5000/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Delay between status polls while a scrape runs
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: Option<u64>,

    /// trace, debug, info, warn, error or off
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log file path (defaults to ./jobboard.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Also write log lines to stderr
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a scrape and follow its progress
    Scrape {
        /// Job posting URLs
        urls: Vec<String>,

        /// Read URLs from a file, one per line
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Scrape without storing and list the postings right away
        #[arg(long)]
        demo: bool,
    },

    /// Follow an existing scrape session
    Watch { session_id: String },

    /// List the postings scraped in a session
    Results { session_id: String },

    /// List scraped jobs
    Jobs {
        /// Search on the backend
        #[arg(short, long, conflicts_with = "filter")]
        search: Option<String>,

        /// Filter the loaded page locally
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show one job with its application form
    Show {
        job_id: String,

        /// Record an apply click and print the application link
        #[arg(long)]
        apply: bool,
    },

    /// Backend configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show which backend services are configured
    Status,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let Some(level) = jobboard_logging::parse_level(&cli.log_level) else {
        bail!("unknown log level {:?}", cli.log_level);
    };
    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let destination = if cli.log_stderr {
        LogDestination::Both(log_path)
    } else {
        LogDestination::File(log_path)
    };
    jobboard_logging::initialize(level, destination);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    if let Commands::Config(ConfigCommand::Init { force }) = cli.command {
        return init_config(&config_path, force);
    }

    let mut config = load_config(&config_path);
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }
    config
        .validate()
        .with_context(|| format!("check {}", config_path.display()))?;
    board_info!(
        "jobboard starting: api={} poll_interval_ms={}",
        config.api_base_url,
        config.poll_interval_ms
    );

    let mut runner = build_runner(&config)?;
    let ok = match cli.command {
        Commands::Scrape { urls, file, demo } => {
            let mut input = urls.join("\n");
            if let Some(path) = file {
                input.push('\n');
                input.push_str(&read_url_file(&path)?);
            }
            runner.dispatch(Msg::InputChanged(input));
            if demo {
                runner.dispatch(Msg::DemoScrapeSubmitted);
                runner.run_until_idle();
                runner.surface().error_count() == 0
            } else {
                runner.dispatch(Msg::ScrapeSubmitted);
                runner.run_until_idle();
                runner.phase() == MonitorPhase::Completed
            }
        }
        Commands::Watch { session_id } => {
            runner.dispatch(Msg::ScrapeAccepted { session_id });
            runner.run_until_idle();
            runner.phase() == MonitorPhase::Completed
        }
        Commands::Results { session_id } => {
            runner.dispatch(Msg::ResultsRequested { session_id });
            runner.run_until_idle();
            runner.surface().error_count() == 0
        }
        Commands::Jobs { search, filter } => {
            match search {
                Some(query) => {
                    runner.dispatch(Msg::SearchChanged(query));
                    runner.dispatch(Msg::SearchSubmitted);
                }
                None => {
                    if let Some(filter) = filter {
                        runner.dispatch(Msg::SearchChanged(filter));
                    }
                    runner.dispatch(Msg::RefreshClicked);
                }
            }
            runner.run_until_idle();
            runner.surface().error_count() == 0
        }
        Commands::Show { job_id, apply } => {
            runner.dispatch(Msg::JobSelected {
                job_id: job_id.clone(),
            });
            runner.run_until_idle();
            let found = runner.state().view().detail.is_some();
            if found && apply {
                runner.dispatch(Msg::ApplyClicked { job_id });
                runner.run_until_idle();
                if let Some(link) = runner.state().view().detail.and_then(apply_link) {
                    println!("Apply at: {link}");
                }
            }
            found
        }
        Commands::Config(ConfigCommand::Status) => {
            runner.dispatch(Msg::ConfigRequested);
            runner.run_until_idle();
            runner.surface().error_count() == 0
        }
        Commands::Config(ConfigCommand::Init { .. }) => true,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_runner(config: &AppConfig) -> Result<Runner<TerminalSurface>> {
    let engine = EngineHandle::new(config.api_settings())
        .with_context(|| format!("invalid API settings for {}", config.api_base_url))?;
    let state = AppState::with_settings(config.poll_interval(), config.jobs_limit);
    Ok(Runner::new(
        state,
        engine,
        TerminalSurface::new(),
        config.user_id.clone(),
    )
    .with_stall_timeout(config.stall_timeout()))
}

fn apply_link(detail: jobboard_core::JobDetailView) -> Option<String> {
    let card = detail.card;
    card.application_url
        .or(Some(card.url).filter(|url| !url.is_empty()))
}

fn init_config(path: &Path, force: bool) -> Result<ExitCode> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    save_config(path, &AppConfig::default())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Reads a URL list file; blank lines and duplicates are handled by the core.
fn read_url_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
