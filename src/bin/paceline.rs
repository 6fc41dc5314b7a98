//! Paceline CLI - Command-line interface for the Paceline engine
//!
//! Commands:
//! - recommend: Compute the recommended intensity for a user
//! - plan: Generate and upsert the day's plan for a user
//! - nudge: Generate a step nudge for a user
//! - validate: Validate a snapshot file against the data invariants
//! - doctor: Diagnose engine configuration and snapshot health

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use paceline::nudge::generate_nudge;
use paceline::plan::{generate_plan, PlanCatalog};
use paceline::types::PlanItemKind;
use paceline::{EngineError, MemoryStore, PolicyEngine, ENGINE_NAME, ENGINE_VERSION};

/// Paceline - daily activity recommendations from plan and metric history
#[derive(Parser)]
#[command(name = "paceline")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute adaptive daily activity recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the recommended intensity for a user
    Recommend {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Evaluation time (RFC 3339); defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Output the full recommendation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate and upsert the day's plan for a user
    Plan {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Evaluation time (RFC 3339); defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Write the updated snapshot back to this path
        #[arg(long)]
        save_snapshot: Option<PathBuf>,

        /// Pretty-print the plan JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Generate a step nudge for a user
    Nudge {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Evaluation time (RFC 3339); defaults to now
        #[arg(long)]
        as_of: Option<String>,

        /// Write the updated snapshot back to this path
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },

    /// Validate a snapshot file against the data invariants
    Validate {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine configuration and snapshot health
    Doctor {
        /// Check a snapshot file
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PacelineCliError> {
    match cli.command {
        Commands::Recommend {
            input,
            user,
            as_of,
            json,
        } => cmd_recommend(&input, &user, as_of.as_deref(), json),

        Commands::Plan {
            input,
            user,
            as_of,
            save_snapshot,
            pretty,
        } => cmd_plan(
            &input,
            &user,
            as_of.as_deref(),
            save_snapshot.as_deref(),
            pretty,
        ),

        Commands::Nudge {
            input,
            user,
            as_of,
            save_snapshot,
        } => cmd_nudge(&input, &user, as_of.as_deref(), save_snapshot.as_deref()),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { snapshot, json } => cmd_doctor(snapshot.as_deref(), json),
    }
}

fn cmd_recommend(
    input: &Path,
    user: &str,
    as_of: Option<&str>,
    json: bool,
) -> Result<(), PacelineCliError> {
    let store = load_snapshot(input)?;
    let as_of = parse_as_of(as_of)?;
    let engine = PolicyEngine::new();

    let recommendation = engine.recommend(&store, &store, user, as_of);

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
    } else {
        println!("Recommendation for {user}");
        println!("  intensity: {}", recommendation.intensity);
        match &recommendation.basis {
            paceline::RecommendationBasis::Computed { scores } => {
                println!("  readiness: {}", scores.readiness);
                println!("  adherence: {}", scores.adherence);
            }
            paceline::RecommendationBasis::Fallback { reason } => {
                println!("  basis:     fallback ({reason})");
            }
        }
    }

    Ok(())
}

fn cmd_plan(
    input: &Path,
    user: &str,
    as_of: Option<&str>,
    save_snapshot: Option<&Path>,
    pretty: bool,
) -> Result<(), PacelineCliError> {
    let mut store = load_snapshot(input)?;
    let as_of = parse_as_of(as_of)?;
    let engine = PolicyEngine::new();
    let catalog = PlanCatalog::default();

    let plan = generate_plan(&engine, &mut store, &catalog, user, as_of)?;

    if pretty {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{}", serde_json::to_string(&plan)?);
    }

    if let Some(path) = save_snapshot {
        fs::write(path, store.to_json()?)?;
    }

    Ok(())
}

fn cmd_nudge(
    input: &Path,
    user: &str,
    as_of: Option<&str>,
    save_snapshot: Option<&Path>,
) -> Result<(), PacelineCliError> {
    let mut store = load_snapshot(input)?;
    let as_of = parse_as_of(as_of)?;

    let nudge = generate_nudge(&mut store, user, as_of)?;

    println!("{}", serde_json::to_string(&nudge)?);

    if let Some(path) = save_snapshot {
        fs::write(path, store.to_json()?)?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), PacelineCliError> {
    let store = load_snapshot(input)?;

    let mut violations: Vec<ViolationDetail> = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for plan in store.plans() {
        let key = (plan.user_id.clone(), plan.date.to_string());
        if !seen.insert(key) {
            violations.push(ViolationDetail {
                user_id: plan.user_id.clone(),
                date: plan.date.to_string(),
                detail: "duplicate plan for this (user, date)".to_string(),
            });
        }

        let workouts = plan
            .items
            .iter()
            .filter(|item| item.kind == PlanItemKind::Workout)
            .count();
        if workouts > 1 {
            violations.push(ViolationDetail {
                user_id: plan.user_id.clone(),
                date: plan.date.to_string(),
                detail: format!("{workouts} Workout items, at most one is allowed"),
            });
        }
    }

    let non_numeric_samples = store
        .metric_samples()
        .iter()
        .filter(|s| s.numeric().is_none())
        .count();

    let report = SnapshotReport {
        plans: store.plans().len(),
        samples: store.metric_samples().len(),
        nudges: store.nudges().len(),
        non_numeric_samples,
        violations,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Snapshot Report");
        println!("===============");
        println!("Plans:               {}", report.plans);
        println!("Samples:             {}", report.samples);
        println!("Nudges:              {}", report.nudges);
        println!("Non-numeric samples: {}", report.non_numeric_samples);

        if !report.violations.is_empty() {
            println!("\nViolations:");
            for v in &report.violations {
                println!("  - {} {}: {}", v.user_id, v.date, v.detail);
            }
        }
    }

    if report.violations.is_empty() {
        Ok(())
    } else {
        Err(PacelineCliError::ValidationFailed(report.violations.len()))
    }
}

fn cmd_doctor(snapshot: Option<&Path>, json: bool) -> Result<(), PacelineCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Paceline version {ENGINE_VERSION}"),
    });

    let config = PolicyEngine::new().config().clone();
    let weight_sum = config.hr_weight + config.sleep_weight;
    checks.push(if (weight_sum - 1.0).abs() < 1e-9 {
        DoctorCheck {
            name: "score_weights".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "HR weight {} + sleep weight {} = 1.0",
                config.hr_weight, config.sleep_weight
            ),
        }
    } else {
        DoctorCheck {
            name: "score_weights".to_string(),
            status: CheckStatus::Warning,
            message: format!("score weights sum to {weight_sum}, expected 1.0"),
        }
    });

    checks.push(
        if config.thresholds.moderate_readiness <= config.thresholds.high_readiness {
            DoctorCheck {
                name: "thresholds".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Moderate at {} <= High at {}",
                    config.thresholds.moderate_readiness, config.thresholds.high_readiness
                ),
            }
        } else {
            DoctorCheck {
                name: "thresholds".to_string(),
                status: CheckStatus::Error,
                message: "Moderate readiness threshold exceeds the High threshold".to_string(),
            }
        },
    );

    if let Some(snapshot_path) = snapshot {
        if snapshot_path.exists() {
            match fs::read_to_string(snapshot_path) {
                Ok(content) => match MemoryStore::from_json(&content) {
                    Ok(store) => {
                        checks.push(DoctorCheck {
                            name: "snapshot".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Snapshot valid ({} plans, {} samples)",
                                store.plans().len(),
                                store.metric_samples().len()
                            ),
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "snapshot".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid snapshot JSON: {e}"),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "snapshot".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read snapshot file: {e}"),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "snapshot".to_string(),
                status: CheckStatus::Warning,
                message: "Snapshot file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (snapshot streaming ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: ENGINE_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Paceline Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PacelineCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn load_snapshot(input: &Path) -> Result<MemoryStore, PacelineCliError> {
    let data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };
    Ok(MemoryStore::from_json(&data)?)
}

fn parse_as_of(as_of: Option<&str>) -> Result<DateTime<Utc>, PacelineCliError> {
    match as_of {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| PacelineCliError::BadTimestamp(format!("{raw}: {e}"))),
    }
}

// Error types

#[derive(Debug)]
enum PacelineCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    BadTimestamp(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PacelineCliError {
    fn from(e: io::Error) -> Self {
        PacelineCliError::Io(e)
    }
}

impl From<EngineError> for PacelineCliError {
    fn from(e: EngineError) -> Self {
        PacelineCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PacelineCliError {
    fn from(e: serde_json::Error) -> Self {
        PacelineCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PacelineCliError> for CliError {
    fn from(e: PacelineCliError) -> Self {
        match e {
            PacelineCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PacelineCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check that the snapshot holds the expected records".to_string()),
            },
            PacelineCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check snapshot JSON syntax".to_string()),
            },
            PacelineCliError::BadTimestamp(msg) => CliError {
                code: "BAD_TIMESTAMP".to_string(),
                message: msg,
                hint: Some("Pass --as-of as RFC 3339, e.g. 2024-03-10T08:00:00Z".to_string()),
            },
            PacelineCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} snapshot invariant violations"),
                hint: Some("Fix the violations and retry".to_string()),
            },
            PacelineCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct SnapshotReport {
    plans: usize,
    samples: usize,
    nudges: usize,
    non_numeric_samples: usize,
    violations: Vec<ViolationDetail>,
}

#[derive(serde::Serialize)]
struct ViolationDetail {
    user_id: String,
    date: String,
    detail: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
