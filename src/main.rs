use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use job_applier::{
    load_jobs, ApplierConfig, AuditSink, Job, JobApplier, NoopAudit, PerceptionPort,
    PerceptionServiceClient, PersonalInfo, RunReport, ScreenshotAudit,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "job-applier")]
#[command(about = "Apply to a list of jobs through an AI browser automation service")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON log file, truncated on startup
    #[arg(long, global = true, default_value = "/tmp/job-applier.log")]
    log_file: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Process every job in the list and write a report
    Run {
        #[arg(long)]
        jobs: PathBuf,
        /// Applicant profile (TOML); APPLICANT_* variables override it
        #[arg(long)]
        profile: Option<PathBuf>,
        #[arg(long, default_value = "config.yaml")]
        config: PathBuf,
        #[arg(long, default_value = "reports/run.json")]
        report: PathBuf,
        /// Overrides max_retries from the configuration
        #[arg(long)]
        max_retries: Option<u32>,
        /// Also process jobs already marked as applied
        #[arg(long)]
        include_applied: bool,
        #[arg(long)]
        no_screenshots: bool,
    },
    /// Validate the job list and profile without touching a browser
    Check {
        #[arg(long)]
        jobs: PathBuf,
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(false),
        )
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    Ok(())
}

fn load_personal_info(profile: Option<&Path>) -> Result<PersonalInfo> {
    let info = match profile {
        Some(path) => PersonalInfo::from_toml_file(path)?.with_env_overrides(),
        None => PersonalInfo::from_env(),
    };
    info.validate()?;
    Ok(info)
}

fn select_jobs(jobs: Vec<Job>, include_applied: bool) -> Vec<Job> {
    let total = jobs.len();
    let selected: Vec<Job> = jobs
        .into_iter()
        .filter(|job| include_applied || !job.already_applied())
        .collect();

    if selected.len() < total {
        info!("Skipping {} job(s) already applied to", total - selected.len());
    }
    selected
}

#[allow(clippy::too_many_arguments)]
async fn run(
    jobs_path: &Path,
    profile: Option<&Path>,
    config_path: &Path,
    report_path: &Path,
    max_retries: Option<u32>,
    include_applied: bool,
    no_screenshots: bool,
) -> Result<()> {
    let config = ApplierConfig::load(config_path)?;
    config.ensure_directories().await?;

    let personal_info = load_personal_info(profile)?;
    let jobs = select_jobs(load_jobs(jobs_path)?, include_applied);
    info!("Loaded {} job(s) from {}", jobs.len(), jobs_path.display());

    let mut settings = config.settings();
    if let Some(max_retries) = max_retries {
        settings.max_retries = max_retries;
    }

    let port: Arc<dyn PerceptionPort> = Arc::new(PerceptionServiceClient::new(
        &config.perception_url,
        config.request_timeout(),
    )?);
    let audit: Arc<dyn AuditSink> = if no_screenshots {
        Arc::new(NoopAudit)
    } else {
        Arc::new(ScreenshotAudit::new(port.clone(), config.screenshot_dir.clone()))
    };
    let applier = JobApplier::new(port, audit, personal_info, settings);

    info!("Perception service: {}", config.perception_url);
    info!(
        "Max retries: {}, max page depth: {}",
        applier.settings().max_retries,
        applier.settings().max_page_depth
    );

    let started_at = Utc::now();
    let mut results = Vec::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        info!(
            "Processing job {}/{}: {} at {}",
            index + 1,
            jobs.len(),
            job.title,
            job.company
        );
        let result = applier.process(job).await;
        info!(
            status = result.status.as_str(),
            attempts = result.attempts,
            "Finished {}: {}",
            job.company,
            result.message
        );
        results.push(result);
    }

    let report = RunReport::new(started_at, results);
    let csv_path = report.write(report_path)?;
    info!(
        "Report {} written to {} and {}",
        report.run_id,
        report_path.display(),
        csv_path.display()
    );

    println!("{}", report.summary);
    if report.summary.errored > 0 {
        warn!("{} job(s) ended in error", report.summary.errored);
    }
    Ok(())
}

fn check(jobs_path: &Path, profile: Option<&Path>) -> Result<()> {
    let personal_info = load_personal_info(profile)?;
    let jobs = load_jobs(jobs_path)?;
    let pending = jobs.iter().filter(|job| !job.already_applied()).count();

    println!("Applicant: {} <{}>", personal_info.full_name(), personal_info.email);
    println!(
        "Jobs: {} total, {} not applied yet",
        jobs.len(),
        pending
    );

    let mappings = job_applier::applier::build_field_mappings(&personal_info);
    println!("Field mappings:");
    for mapping in &mappings {
        println!("  {:<20} {}", mapping.label, mapping.keywords.join(", "));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    match cli.command {
        Command::Run {
            jobs,
            profile,
            config,
            report,
            max_retries,
            include_applied,
            no_screenshots,
        } => {
            run(
                &jobs,
                profile.as_deref(),
                &config,
                &report,
                max_retries,
                include_applied,
                no_screenshots,
            )
            .await
        }
        Command::Check { jobs, profile } => check(&jobs, profile.as_deref()),
    }
}
