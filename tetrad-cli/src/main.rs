use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tetrad_core::time::{local_today, parse_date};
use tetrad_core::{
    BusyInterval, Domain, DomainHint, DurationHint, FixedHints, Intake, ScheduleItem,
    ScheduleOptimizer, SemanticClassifier, Task, TaskDraft, TetradConfig, split_task_lines,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod calendar;
mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "tetrad", version, about = "Four-domain daily scheduler")]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a task description into domain, priority and duration
    Classify {
        text: String,

        /// Domain suggested by an external classifier
        #[arg(long)]
        hint_domain: Option<Domain>,

        #[arg(long, default_value_t = 1.0, requires = "hint_domain")]
        hint_confidence: f64,

        #[arg(long, default_value = "", requires = "hint_domain")]
        hint_reasoning: String,

        /// Duration (minutes) suggested by an external estimator
        #[arg(long)]
        hint_minutes: Option<i64>,

        #[arg(long, default_value_t = 1.0, requires = "hint_minutes")]
        hint_minutes_confidence: f64,
    },

    /// List free 30-minute slots over a date range
    Slots {
        /// First day (YYYY-MM-DD, default: today in the configured timezone)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Number of days (default: scheduling.horizon_days)
        #[arg(long)]
        days: Option<u32>,

        /// JSON file with busy intervals
        #[arg(long)]
        busy: Option<PathBuf>,
    },

    /// Print the fixed daily block layout for a date
    Blocks {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Classify, sequence and place tasks from a file
    Plan {
        /// One task per line, or a JSON array of task drafts (*.json)
        #[arg(long)]
        file: PathBuf,

        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        busy: Option<PathBuf>,

        /// Emit an ICS calendar instead of JSON
        #[arg(long)]
        ics: bool,
    },

    /// Score an ordered list of schedule items (JSON)
    Quality {
        #[arg(long)]
        file: PathBuf,
    },

    /// Manage ~/.tetrad/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Classify {
            text,
            hint_domain,
            hint_confidence,
            hint_reasoning,
            hint_minutes,
            hint_minutes_confidence,
        } => {
            let cfg = config::load_config()?;
            let intake = Intake::from_config(&cfg);
            let hints = FixedHints {
                domain: hint_domain.map(|domain| DomainHint {
                    domain,
                    confidence: hint_confidence,
                    reasoning: hint_reasoning,
                }),
                duration: hint_minutes.map(|estimated_minutes| DurationHint {
                    estimated_minutes,
                    confidence: hint_minutes_confidence,
                }),
            };
            print_json(&intake.resolve(&text, external_hints(&hints)))?;
        }

        Command::Slots { from, days, busy } => {
            let cfg = config::load_config()?;
            let (start, end) = date_range(&cfg, from, days)?;
            let busy: Vec<BusyInterval> = state::read_json_or_default(busy.as_deref()).await?;

            let optimizer = ScheduleOptimizer::from_config(&cfg);
            let slots = optimizer.find_free_slots(start, end, &busy);
            info!(count = slots.len(), %start, %end, "free slots");
            print_json(&slots)?;
        }

        Command::Blocks { date } => {
            let cfg = config::load_config()?;
            let date = match date {
                Some(d) => d,
                None => local_today(cfg.timezone()?, Utc::now()),
            };
            print_json(&ScheduleOptimizer::from_config(&cfg).time_blocks(date))?;
        }

        Command::Plan {
            file,
            from,
            days,
            busy,
            ics,
        } => {
            let cfg = config::load_config()?;
            let (start, end) = date_range(&cfg, from, days)?;

            let (drafts, busy) = tokio::try_join!(
                read_drafts(&file),
                state::read_json_or_default::<Vec<BusyInterval>>(busy.as_deref()),
            )?;
            if drafts.is_empty() {
                bail!("no tasks in {}", file.display());
            }

            let intake = Intake::from_config(&cfg);
            let tasks = drafts
                .into_iter()
                .enumerate()
                .map(|(i, draft)| {
                    let title = draft.title.clone();
                    intake
                        .complete(draft, &format!("task-{}", i + 1), None)
                        .with_context(|| format!("task {:?}", title))
                })
                .collect::<Result<Vec<Task>>>()?;

            let outcome = ScheduleOptimizer::from_config(&cfg).plan(tasks, start, end, &busy);

            if ics {
                let events = calendar::tasks_to_events(&outcome.scheduled, cfg.timezone()?)?;
                print!("{}", calendar::events_to_ics(&events));
            } else {
                print_json(&outcome)?;
            }
        }

        Command::Quality { file } => {
            let items: Vec<ScheduleItem> = state::read_json(&file).await?;
            let cfg = config::load_config()?;
            print_json(&ScheduleOptimizer::from_config(&cfg).schedule_quality(&items))?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

fn external_hints(hints: &FixedHints) -> Option<&dyn SemanticClassifier> {
    if *hints == FixedHints::default() {
        None
    } else {
        Some(hints)
    }
}

fn date_range(cfg: &TetradConfig, from: Option<NaiveDate>, days: Option<u32>) -> Result<(NaiveDate, NaiveDate)> {
    let days = days.unwrap_or(cfg.scheduling.horizon_days);
    if days == 0 {
        bail!("--days must be at least 1");
    }
    let start = match from {
        Some(d) => d,
        None => local_today(cfg.timezone()?, Utc::now()),
    };
    Ok((start, start + Duration::days(i64::from(days) - 1)))
}

async fn read_drafts(path: &Path) -> Result<Vec<TaskDraft>> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
        state::read_json(path).await
    } else {
        Ok(split_task_lines(&state::read_text(path).await?))
    }
}
