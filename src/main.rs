//! CLI entry point for the bookdl tool.

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{debug, error, info};
use url::Url;

use bookdl::{
    HttpClient, ProgressCounters, RunLog, RunOptions, RunOutput, SpringerExtractor, Toolchain, run,
};

mod cli;
mod progress;

use cli::Args;

/// Exit code for any user-facing error.
const FAILURE_EXIT: u8 = 2;

/// Base URL of the supported source service.
const DEFAULT_BASE_URL: &str = "http://springerlink.com/";

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let run_log = RunLog::in_dir(Path::new("."));

    match execute(args, &run_log).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Every fatal error is reported exactly once: run log + operator.
            let message = format!("{e:#}");
            if let Err(e) = run_log.record_error(&message) {
                debug!(error = %e, "could not append to run log");
            }
            error!("{message}");
            ExitCode::from(FAILURE_EXIT)
        }
    }
}

async fn execute(args: Args, run_log: &RunLog) -> anyhow::Result<()> {
    let content_id = match (&args.link, &args.content) {
        (Some(link), _) => cli::content_id_from_link(link)
            .ok_or_else(|| anyhow!("Bad link given: {link}. See example link in --help."))?,
        (None, Some(content)) => content.clone(),
        // clap's required selector group makes this unreachable.
        (None, None) => return Err(anyhow!("Either a link or a content id must be given.")),
    };

    let merge = !args.no_merge;

    // External tools are a startup-time requirement: fail before any
    // download work begins, not after.
    let tools = Toolchain::discover(merge)?;

    let base_url = Url::parse(DEFAULT_BASE_URL).context("invalid base URL")?;
    let options = RunOptions {
        base_url,
        content_id,
        merge,
        concurrency: usize::from(args.concurrency),
        output_dir: args.output_dir.clone(),
    };

    let client = HttpClient::new();
    let extractor = SpringerExtractor::new();
    let counters = Arc::new(ProgressCounters::new());

    let use_bar = !args.quiet && std::io::stderr().is_terminal();
    let (bar_handle, bar_stop) = progress::spawn_progress_ui(use_bar, Arc::clone(&counters));

    let result = run(&options, &client, &extractor, &tools, &counters).await;

    bar_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = bar_handle {
        let _ = handle.await;
    }

    let summary = result?;

    match &summary.output {
        RunOutput::Merged(path) => {
            info!(
                title = %summary.title,
                path = %path.display(),
                chapters = summary.chapters,
                "document downloaded and merged"
            );
            run_log
                .record_merged(summary.chapters, summary.bytes, &summary.title)
                .context("could not append to run log")?;
        }
        RunOutput::Unmerged(dir) => {
            info!(
                title = %summary.title,
                parts_dir = %dir.display(),
                chapters = summary.chapters,
                "document downloaded; unmerged chapters kept"
            );
            run_log
                .record_unmerged(summary.chapters, &summary.title)
                .context("could not append to run log")?;
        }
    }

    Ok(())
}
