//! Journal Coach CLI
//!
//! Command-line interface for coaching suggestions, goal breakdowns, daily
//! evaluations and the elapsed-time counter.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use journal_coach::services::coach::DEFAULT_RECENT_LIMIT;
use journal_coach::{
    AppError, CoachConfig, CoachService, DailyEvaluation, ElapsedTime, GoalBreakdown, Journal,
    Suggestion,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "journal-coach")]
#[command(about = "AI coaching for your journal", long_about = None)]
struct Cli {
    /// TOML config file (environment variables take precedence)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Coaching suggestion for the latest entries of a journal
    Suggest {
        /// Journal JSON file
        #[arg(long)]
        journal: PathBuf,

        /// Number of newest entries to include
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Break a goal into steps
    Plan {
        /// Goal text (defaults to the journal's goal)
        #[arg(long)]
        goal: Option<String>,

        /// Journal JSON file supplying the goal and recent context
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Number of steps (3-10)
        #[arg(long)]
        steps: Option<usize>,
    },

    /// Evaluate one day of a journal against its goal
    Evaluate {
        /// Journal JSON file
        #[arg(long)]
        journal: PathBuf,

        /// Day to evaluate, YYYY-MM-DD (defaults to the newest entry's day)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Time elapsed since a start instant, as days:hours:minutes:seconds
    Since {
        /// Start instant (RFC 3339); defaults to the journal's creation time
        #[arg(long)]
        start: Option<DateTime<Utc>>,

        /// Journal JSON file whose creation time is the start
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Reprint every second until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// Check that the AI service is reachable with the configured key
    Health,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "journal_coach=debug,journal_coach_llm=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_journal(path: &Path) -> Result<Journal> {
    Journal::load(path).with_context(|| format!("loading journal {}", path.display()))
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human(value));
    }
    Ok(())
}

fn render_suggestion(s: &Suggestion) -> String {
    if s.cached {
        format!("{}\n\n(cached)", s.text)
    } else {
        s.text.clone()
    }
}

fn render_plan(plan: &GoalBreakdown) -> String {
    let mut out = format!("Plan for: {}\n", plan.goal);
    for step in &plan.steps {
        out.push_str(&format!("{}. {}\n", step.order, step.title));
        if let Some(detail) = &step.detail {
            out.push_str(&format!("   {}\n", detail));
        }
    }
    if plan.placeholder {
        out.push_str("\n(placeholder plan; set GROQ_API_KEY for a tailored one)");
    }
    out.trim_end().to_string()
}

fn render_evaluation(eval: &DailyEvaluation) -> String {
    let mut out = format!("Evaluation for {}", eval.date);
    if let Some(score) = eval.score {
        out.push_str(&format!(" - {}/10", score));
    }
    out.push_str(&format!("\n\n{}\n", eval.summary));
    if !eval.wins.is_empty() {
        out.push_str("\nWins:\n");
        for win in &eval.wins {
            out.push_str(&format!("  + {}\n", win));
        }
    }
    if !eval.improvements.is_empty() {
        out.push_str("\nFor tomorrow:\n");
        for item in &eval.improvements {
            out.push_str(&format!("  > {}\n", item));
        }
    }
    out.trim_end().to_string()
}

/// Print the elapsed counter once, or every second until interrupted.
async fn run_since(
    elapsed_at: impl Fn(DateTime<Utc>) -> ElapsedTime,
    watch: bool,
    json: bool,
) -> Result<()> {
    let print = |now: DateTime<Utc>| -> Result<()> {
        emit(json, &elapsed_at(now), ElapsedTime::to_string)
    };

    if !watch {
        return print(Utc::now());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => print(Utc::now())?,
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

/// Resolve configuration and build the coaching service.
fn coach_service(config_path: Option<&Path>) -> Result<CoachService> {
    let config = CoachConfig::load(config_path)?;
    debug!(live = config.is_live(), model = %config.model, "configuration loaded");
    Ok(CoachService::new(config)?)
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Since {
            start,
            journal,
            watch,
        } => match (start, journal) {
            (Some(start), _) => {
                run_since(|now| ElapsedTime::between(start, now), watch, cli.json).await
            }
            (None, Some(path)) => {
                let journal = load_journal(&path)?;
                run_since(|now| journal.streak_since_start(now), watch, cli.json).await
            }
            (None, None) => anyhow::bail!("either --start or --journal is required"),
        },
        Commands::Suggest { journal, limit } => {
            let journal = load_journal(&journal)?;
            let service = coach_service(config_path)?;
            let suggestion = service.suggest_for_journal(&journal, limit).await?;
            emit(cli.json, &suggestion, render_suggestion)
        }
        Commands::Plan {
            goal,
            journal,
            steps,
        } => {
            let journal = journal.as_deref().map(load_journal).transpose()?;
            let goal = goal
                .or_else(|| journal.as_ref().and_then(|j| j.goal.clone()))
                .context("no goal given and the journal has none")?;
            let recent = journal
                .as_ref()
                .map(|j| j.recent_lines(DEFAULT_RECENT_LIMIT))
                .unwrap_or_default();
            let service = coach_service(config_path)?;
            let plan = service.breakdown_goal(&goal, &recent, steps).await?;
            emit(cli.json, &plan, render_plan)
        }
        Commands::Evaluate { journal, date } => {
            let journal = load_journal(&journal)?;
            let service = coach_service(config_path)?;
            let evaluation = service.evaluate_day(&journal, date).await?;
            emit(cli.json, &evaluation, render_evaluation)
        }
        Commands::Health => {
            let service = coach_service(config_path)?;
            service.health_check().await?;
            if service.is_live() {
                println!("ok: {} reachable", service.config().api_base);
            } else {
                println!("ok: offline (GROQ_API_KEY not set)");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_err) => eprintln!("error: {}", app_err.user_message()),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
