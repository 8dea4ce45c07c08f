//! Terminal client for the job scraper web front-end.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobscrape_core::job::JobRecord;
use jobscrape_core::request::ScrapeRequest;
use jobscrape_poller::api::{HttpScraperApi, ScraperApi};
use jobscrape_poller::session::{PollConfig, PollOutcome, PollSession};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jobscrape-watch")]
#[command(about = "Trigger the job scraper and browse its results")]
#[command(version)]
struct Cli {
    /// Base URL of the jobscrape API server
    #[arg(
        long,
        env = "JOBSCRAPE_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scrape and wait for its results
    Run {
        /// Job title to search for
        #[arg(long)]
        title: String,

        /// Location to search in
        #[arg(long)]
        location: String,

        /// Years of experience, e.g. "3" or "0-1"
        #[arg(long, default_value = "")]
        experience: String,
    },

    /// List result files, most recent first
    List,

    /// Show the jobs in one result file
    Show {
        /// Result file name as printed by `list`
        filename: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobscrape_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let api = HttpScraperApi::new(&cli.base_url)?;

    match cli.command {
        Commands::Run {
            title,
            location,
            experience,
        } => run(api, ScrapeRequest::new(title, location, experience)).await,
        Commands::List => {
            let listing = api.list_files().await.context("Failed to list result files")?;
            if listing.files.is_empty() {
                println!("No result files yet.");
            }
            for entry in listing.files {
                println!("{:<50}  {}", entry.filename, entry.display_name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Show { filename } => {
            let file = api
                .load_file(&filename)
                .await
                .with_context(|| format!("Failed to load {filename}"))?;
            println!("{} ({} jobs)", file.display_name, file.job_count);
            print_jobs(&file.jobs);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(api: HttpScraperApi, request: ScrapeRequest) -> Result<ExitCode> {
    let session = PollSession::new(api, PollConfig::default());
    let cancel = CancellationToken::new();

    // Ctrl-C stops watching; the scrape itself keeps running on the server.
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut progress = session.progress();
    let bar = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let percent = *progress.borrow_and_update();
            draw_progress(percent);
        }
    });

    let outcome = session.run(request, &cancel).await;
    drop(session);
    let _ = bar.await;
    eprintln!();

    match outcome? {
        PollOutcome::Completed { file, jobs } => {
            println!("{} ({} jobs) [{file}]", jobs.display_name, jobs.job_count);
            print_jobs(&jobs.jobs);
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::FinishedWithoutFile => {
            println!("The scraper finished but produced no new results.");
            Ok(ExitCode::SUCCESS)
        }
        PollOutcome::Failed {
            reason,
            stderr_tail,
            ..
        } => {
            eprintln!("Scrape failed: {reason}");
            if let Some(tail) = stderr_tail {
                eprintln!("{tail}");
            }
            Ok(ExitCode::FAILURE)
        }
        PollOutcome::ScraperTimedOut { elapsed_ms } => {
            eprintln!(
                "The scraper was stopped after {} minutes.",
                elapsed_ms / 60_000
            );
            Ok(ExitCode::FAILURE)
        }
        PollOutcome::TimedOut { attempts } => {
            eprintln!(
                "No results after {attempts} checks. The scrape may still be running; try `list` later."
            );
            Ok(ExitCode::FAILURE)
        }
        PollOutcome::Cancelled => {
            eprintln!("Stopped watching. The scrape continues on the server.");
            Ok(ExitCode::from(130))
        }
    }
}

fn draw_progress(percent: u8) {
    const WIDTH: usize = 40;
    let filled = WIDTH * usize::from(percent.min(100)) / 100;
    let mut stderr = std::io::stderr().lock();
    let _ = write!(
        stderr,
        "\r[{}{}] {percent:>3}%",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled)
    );
    let _ = stderr.flush();
}

fn print_jobs(jobs: &[JobRecord]) {
    if jobs.is_empty() {
        println!("No job listings found.");
        return;
    }
    println!(
        "{:<40}  {:<25}  {:<25}  {:<12}  LINK",
        "TITLE", "COMPANY", "LOCATION", "POSTED"
    );
    for job in jobs {
        println!(
            "{:<40}  {:<25}  {:<25}  {:<12}  {}",
            truncate(&job.title, 40),
            truncate(&job.company, 25),
            truncate(&job.location, 25),
            truncate(&job.date_posted, 12),
            job.link
        );
    }
}

/// Cut `s` to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
