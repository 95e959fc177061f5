//! # Planbot — holiday-aware daily work-report automation
//!
//! Usage:
//!   planbot serve                        # Start the scheduler loop
//!   planbot trigger                      # Submit today's report now
//!   planbot schedule get|set 09:30       # Daily trigger time
//!   planbot plan list|get|add|...        # Per-day plan CRUD
//!   planbot holidays 2025-10-01 2025-10-08
//!   planbot workdays 2025-06-01 2025-06-30

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use planbot_calendar::{Calendar, CalendarMode};
use planbot_core::PlanbotConfig;
use planbot_core::traits::{EvidenceStore, NotificationSink, PlanGenerator};
use planbot_scheduler::agent::CommandAgent;
use planbot_scheduler::evidence::{FileEvidence, NullEvidence};
use planbot_scheduler::notify::{NullSink, WebhookSink};
use planbot_scheduler::planner::ChatGenerator;
use planbot_scheduler::{Daemon, Schedule, TaskExecutor};
use planbot_store::{MergeMode, PlanStore};

#[derive(Parser)]
#[command(
    name = "planbot",
    version,
    about = "📅 Planbot — holiday-aware daily work-report automation"
)]
struct Cli {
    /// Config file (default: ~/.planbot/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the scheduler loop (default)
    Serve,
    /// Submit today's report now (ignores the fire time, not the guard)
    Trigger,
    /// Show or change the daily trigger time
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
    /// Manage per-day plans
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// List non-workdays in a date range with their labels
    Holidays { start: NaiveDate, end: NaiveDate },
    /// List workdays in a date range
    Workdays { start: NaiveDate, end: NaiveDate },
}

#[derive(Subcommand)]
enum ScheduleAction {
    Get,
    /// Set and persist the trigger time ("HH:MM")
    Set { time: String },
}

#[derive(Subcommand)]
enum PlanAction {
    /// List every plan, date ascending
    List,
    /// Show the plans recorded for one date
    Get { date: NaiveDate },
    /// Add or merge a plan for a date
    Add {
        date: NaiveDate,
        #[arg(long)]
        todo: String,
        #[arg(long, default_value = "")]
        progress: String,
        /// Append to the existing plan instead of overwriting it
        #[arg(long)]
        append: bool,
    },
    /// Raw overwrite of one row by id (no renumbering)
    Update {
        id: i64,
        #[arg(long)]
        todo: String,
        #[arg(long, default_value = "")]
        progress: String,
    },
    /// Delete one row by id
    Delete { id: i64 },
    /// Generate per-workday plans from a requirement and save them
    Generate {
        requirement: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        /// Append to existing plans instead of overwriting the range
        #[arg(long)]
        append: bool,
    },
    /// Clear plans in a date range, or everything with --all
    Clear {
        #[arg(long)]
        all: bool,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => PlanbotConfig::load_from(path)?,
        None => PlanbotConfig::load()?,
    };
    let daemon = build_daemon(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(
                "planbot serving: daily trigger at {} on workdays",
                daemon.schedule_time()
            );
            daemon.run_until_shutdown().await;
        }
        Command::Trigger => {
            let report = daemon.trigger().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.success {
                std::process::exit(1);
            }
        }
        Command::Schedule { action } => match action {
            ScheduleAction::Get => println!("{}", daemon.schedule_time()),
            ScheduleAction::Set { time } => {
                daemon.set_schedule_time(&time)?;
                let mut updated = config.clone();
                updated.scheduler.time = time.clone();
                match &cli.config {
                    Some(path) => updated.save_to(path)?,
                    None => updated.save()?,
                }
                println!("daily trigger time set to {time}");
            }
        },
        Command::Plan { action } => run_plan_action(&daemon, action).await?,
        Command::Holidays { start, end } => {
            for (date, label) in daemon.holidays(start, end) {
                println!("{date}  {label}");
            }
        }
        Command::Workdays { start, end } => {
            for date in daemon.workdays(start, end) {
                println!("{date}");
            }
        }
    }

    Ok(())
}

async fn run_plan_action(daemon: &Daemon, action: PlanAction) -> Result<()> {
    match action {
        PlanAction::List => {
            println!("{}", serde_json::to_string_pretty(&daemon.plans()?)?);
        }
        PlanAction::Get { date } => {
            println!("{}", serde_json::to_string_pretty(&daemon.plans_for(date)?)?);
        }
        PlanAction::Add {
            date,
            todo,
            progress,
            append,
        } => {
            let mode = if append {
                MergeMode::Append
            } else {
                MergeMode::Overwrite
            };
            daemon.save_plan(date, &todo, &progress, mode)?;
            println!("plan saved for {date}");
        }
        PlanAction::Update { id, todo, progress } => {
            daemon.update_plan(id, &todo, &progress)?;
            println!("plan {id} updated");
        }
        PlanAction::Delete { id } => {
            daemon.delete_plan(id)?;
            println!("plan {id} deleted");
        }
        PlanAction::Generate {
            requirement,
            from,
            to,
            append,
        } => {
            let mode = if append {
                MergeMode::Append
            } else {
                MergeMode::Overwrite
            };
            let drafts = daemon.generate_plans(&requirement, from, to, mode).await?;
            println!("{}", serde_json::to_string_pretty(&drafts)?);
            println!("{} daily plans saved", drafts.len());
        }
        PlanAction::Clear { all, from, to } => match (all, from, to) {
            (true, _, _) => {
                daemon.clear_all()?;
                println!("all plans cleared");
            }
            (false, Some(from), Some(to)) => {
                daemon.clear_range(from, to)?;
                println!("plans {from} — {to} cleared");
            }
            _ => anyhow::bail!("pass --all, or both --from and --to"),
        },
    }
    Ok(())
}

fn build_daemon(config: &PlanbotConfig) -> Result<Daemon> {
    let calendar = Calendar::new(if config.calendar.official_holidays {
        CalendarMode::Official
    } else {
        CalendarMode::WeekendOnly
    });

    let db_path = {
        let p = PathBuf::from(&config.store.db_file);
        if p.is_absolute() {
            p
        } else {
            PlanbotConfig::home_dir().join(p)
        }
    };
    let store = Arc::new(PlanStore::open(&db_path)?);

    let schedule = Arc::new(Schedule::from_config(&config.scheduler.time));

    let evidence: Arc<dyn EvidenceStore> = if config.evidence.dir.is_empty() {
        Arc::new(NullEvidence)
    } else {
        Arc::new(FileEvidence::new(&config.evidence.dir))
    };
    let notifier: Arc<dyn NotificationSink> = if config.notify.webhook_url.is_empty() {
        Arc::new(NullSink)
    } else {
        Arc::new(WebhookSink::new(config.notify.webhook_url.clone()))
    };

    let executor = Arc::new(TaskExecutor::new(
        store.clone(),
        Arc::new(CommandAgent::new(config.agent.command.clone())),
        evidence,
        notifier,
        Duration::from_secs(config.agent.timeout_secs),
    ));

    let generator: Option<Arc<dyn PlanGenerator>> = if config.generator.base_url.is_empty() {
        None
    } else {
        Some(Arc::new(ChatGenerator::new(
            config.generator.base_url.clone(),
            config.generator.api_key.clone(),
            config.generator.model.clone(),
            &config.generator.system_prompt,
        )))
    };

    Ok(Daemon::new(
        schedule,
        calendar,
        store,
        executor,
        generator,
        config.scheduler.tick_secs,
    ))
}
