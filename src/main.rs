//! `prospectiq` - command-line front end for the ProspectIQ backend.
//!
//! Usage:
//!   prospectiq health
//!   prospectiq icp create profile.json
//!   prospectiq task start --icp <id> companies.csv --wait
//!
//! Configuration lives in `~/.prospectiq/config.json` (or `$PROSPECTIQ_HOME`).
//! Secrets are read from `OPENAI_API_KEY` and `SUPABASE_ANON_KEY`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;

use prospectiq::commands;
use prospectiq::models::icp::{IcpDraft, IcpUpdate};
use prospectiq::models::task::Task;
use prospectiq::services::ChannelNotifier;
use prospectiq::{AppState, CommandResponse, SettingsUpdate, StartAnalysisRequest};
use prospectiq_core::Notification;

/// ProspectIQ prospect matcher.
#[derive(Parser, Debug)]
#[command(name = "prospectiq", version, about = "Match company lists against Ideal Customer Profiles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show backend health.
    Health,
    /// Show settings, or apply a partial update from a JSON file.
    Settings {
        #[arg(long = "update", value_name = "FILE")]
        update: Option<PathBuf>,
    },
    /// Manage Ideal Customer Profiles.
    Icp {
        #[command(subcommand)]
        action: IcpCommand,
    },
    /// Manage analysis tasks.
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Write the company-list CSV template.
    Template {
        /// Output file (stdout when omitted).
        #[arg(long = "out")]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum IcpCommand {
    /// List ICPs, newest first.
    List,
    /// Show one ICP.
    Show { id: String },
    /// Create an ICP from a JSON draft file.
    Create { file: PathBuf },
    /// Apply a JSON partial update file to an ICP.
    Update { id: String, file: PathBuf },
    /// Delete an ICP and its assistant.
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// Start analyzing a company list against an ICP.
    Start {
        /// Company list (.csv or .xlsx).
        file: PathBuf,
        /// ICP id to match against.
        #[arg(long = "icp")]
        icp: String,
        /// Task name (defaults to the file name).
        #[arg(long = "name")]
        name: Option<String>,
        /// Follow progress until the task finishes.
        #[arg(long = "wait")]
        wait: bool,
    },
    /// List running tasks, or completed ones with --completed.
    List {
        #[arg(long = "completed")]
        completed: bool,
    },
    /// Show one task.
    Show { id: String },
    /// Stop and delete a task.
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prospectiq=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Template { out } = &cli.command {
        return write_template(out.as_deref());
    }

    let (notifier, mut notifications) = ChannelNotifier::channel();
    let state = AppState::with_notifier(Arc::new(notifier));
    unwrap(commands::init_app(&state).await)?;

    let result = run(&state, cli.command).await;
    print_notifications(&mut notifications);
    state.shutdown().await;
    result
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Health => print_json(&unwrap(commands::get_health(state).await)?),
        Command::Settings { update: None } => {
            print_json(&unwrap(commands::get_settings(state).await)?)
        }
        Command::Settings { update: Some(file) } => {
            let update: SettingsUpdate = read_json(&file)?;
            print_json(&unwrap(commands::update_settings(state, update).await)?)
        }
        Command::Icp { action } => run_icp(state, action).await,
        Command::Task { action } => run_task(state, action).await,
        Command::Template { out } => write_template(out.as_deref()),
    }
}

async fn run_icp(state: &AppState, action: IcpCommand) -> anyhow::Result<()> {
    match action {
        IcpCommand::List => print_json(&unwrap(commands::list_icps(state).await)?),
        IcpCommand::Show { id } => print_json(&unwrap(commands::get_icp(state, &id).await)?),
        IcpCommand::Create { file } => {
            let draft: IcpDraft = read_json(&file)?;
            print_json(&unwrap(commands::create_icp(state, draft).await)?)
        }
        IcpCommand::Update { id, file } => {
            let update: IcpUpdate = read_json(&file)?;
            print_json(&unwrap(commands::update_icp(state, &id, update).await)?)
        }
        IcpCommand::Delete { id } => {
            let deleted = unwrap(commands::delete_icp(state, &id).await)?;
            if !deleted {
                anyhow::bail!("ICP not found or could not be deleted");
            }
            Ok(())
        }
    }
}

async fn run_task(state: &AppState, action: TaskCommand) -> anyhow::Result<()> {
    match action {
        TaskCommand::Start {
            file,
            icp,
            name,
            wait,
        } => {
            let upload = unwrap(commands::validate_upload_at(&file))?;
            let request = StartAnalysisRequest {
                name: name.unwrap_or_else(|| upload.file_name.clone()),
                icp_id: icp,
                file_name: upload.file_name,
                size_bytes: upload.size_bytes,
            };
            let task = unwrap(commands::start_analysis(state, request).await)?;
            let task = if wait { follow(state, task).await? } else { task };
            print_json(&task)
        }
        TaskCommand::List { completed: false } => {
            print_json(&unwrap(commands::list_running_tasks(state).await)?)
        }
        TaskCommand::List { completed: true } => {
            print_json(&unwrap(commands::list_completed_tasks(state).await)?)
        }
        TaskCommand::Show { id } => print_json(&unwrap(commands::get_task(state, &id).await)?),
        TaskCommand::Delete { id } => {
            if !unwrap(commands::delete_task(state, &id).await)? {
                anyhow::bail!("Task with ID {} not found", id);
            }
            Ok(())
        }
    }
}

/// Poll the store until the task leaves the running state
async fn follow(state: &AppState, task: Task) -> anyhow::Result<Task> {
    let poll = Duration::from_millis(unwrap(commands::get_settings(state).await)?.poll_interval_ms);
    let mut last_progress = -1.0;

    loop {
        tokio::time::sleep(poll).await;
        let current = unwrap(commands::get_task(state, &task.id).await)?;
        if current.progress != last_progress {
            last_progress = current.progress;
            eprintln!(
                "{}: {:.0}% {}",
                current.name,
                current.progress,
                current.estimated_completion.as_deref().unwrap_or("")
            );
        }
        if current.status.is_terminal() {
            return Ok(current);
        }
    }
}

fn write_template(out: Option<&Path>) -> anyhow::Result<()> {
    let template = unwrap(commands::get_csv_template())?;
    match out {
        Some(path) => {
            std::fs::write(path, &template.content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", template.content),
    }
    Ok(())
}

fn unwrap<T>(response: CommandResponse<T>) -> anyhow::Result<T> {
    response.into_result().map_err(anyhow::Error::msg)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_notifications(rx: &mut UnboundedReceiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        eprintln!("[{:?}] {}: {}", n.level, n.title, n.message);
    }
}
