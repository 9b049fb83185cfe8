//! # Approval Demo
//!
//! Command-line walkthrough of the leave-approval chain: submits each day
//! count to the Manager / Director / CEO chain and reports who approved it.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use handler_chain::approval::{
    ApprovalDesk, ApprovalSink, ConsoleSink, LeaveRequest, RecordingSink, TracingSink,
};
use handler_chain::config::{ConfigManager, HandlerChainConfig};
use handler_chain::logging;
use handler_chain::Outcome;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "approval-demo")]
#[command(about = "Route leave requests through the approval chain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Requested day counts, submitted in order
    #[arg(default_values_t = [3u32, 7, 12, 18])]
    days: Vec<u32>,

    /// Configuration file (default: layered config/handler-chain*.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where approvals are announced in text mode
    #[arg(long, value_enum, default_value_t = SinkKind::Console)]
    sink: SinkKind,

    /// Output format for outcomes; json prints one object per request, with
    /// its announcements embedded
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Console,
    Tracing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing();

    if let Err(e) = run(&cli) {
        error!("approval-demo failed: {e:#}");
        eprintln!("❌ {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.format {
        OutputFormat::Text => {
            let sink: Arc<dyn ApprovalSink> = match cli.sink {
                SinkKind::Console => Arc::new(ConsoleSink),
                SinkKind::Tracing => Arc::new(TracingSink),
            };
            let desk =
                ApprovalDesk::from_config(&config, sink).context("failed to wire approval chain")?;
            for &days in &cli.days {
                let request = LeaveRequest::new(days);
                desk.submit(request)
                    .with_context(|| format!("dispatch failed for {request}"))?;
            }
        }
        OutputFormat::Json => {
            for line in json_lines(&config, &cli.days)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Submit each request and render one single-line JSON object per outcome.
fn json_lines(config: &HandlerChainConfig, days: &[u32]) -> anyhow::Result<Vec<String>> {
    let recorder = Arc::new(RecordingSink::new());
    let desk = ApprovalDesk::from_config(config, Arc::clone(&recorder) as Arc<dyn ApprovalSink>)
        .context("failed to wire approval chain")?;

    let mut lines = Vec::with_capacity(days.len());
    for &count in days {
        let request = LeaveRequest::new(count);
        let outcome = desk
            .submit(request)
            .with_context(|| format!("dispatch failed for {request}"))?;
        let announcements = recorder.messages();
        recorder.clear();
        lines.push(json_line(request, &outcome, &announcements));
    }
    Ok(lines)
}

fn json_line(request: LeaveRequest, outcome: &Outcome, announcements: &[String]) -> String {
    serde_json::json!({
        "request": request,
        "result": outcome,
        "announcements": announcements,
    })
    .to_string()
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<HandlerChainConfig> {
    let manager = match path {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::load()?,
    };
    Ok(manager.config().clone())
}
