use anyhow::Result;
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use synthetic_ledgers::{
    recorded_runs, run_generator, run_pipeline, validate, verify, DatasetQualityEngine, GenError,
    GeneratorConfig, QualityReport,
};

const USAGE: &str = "\
Usage:
  synthetic-ledgers <domain> <entity> [--year N] [--seed N] [--scale F] [--data-dir PATH] [--with-errors]
  synthetic-ledgers pipeline <airline|banking|insurance|all>
  synthetic-ledgers validate [--year N]
  synthetic-ledgers verify <domain> <entity>
  synthetic-ledgers runs";

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "synthetic_ledgers=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run() {
        eprintln!("❌ {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = GeneratorConfig::from_env();
    let positional = config.apply_args(&args)?;
    let words: Vec<&str> = positional.iter().map(|s| s.as_str()).collect();

    match words.as_slice() {
        ["pipeline", target] => run_pipeline_mode(&config, target),
        ["validate"] => run_validate(&config),
        ["verify", domain, entity] => run_verify(&config, domain, entity),
        ["runs"] => run_list(&config),
        [domain, entity] => {
            let record = run_generator(&config, domain, entity)?;
            println!("🔑 seed {} | sha256 {}", record.seed, &record.fingerprint[..12.min(record.fingerprint.len())]);
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            Err(GenError::InvalidArgument(format!("unrecognised command: {}", positional.join(" "))).into())
        }
    }
}

fn run_pipeline_mode(config: &GeneratorConfig, target: &str) -> Result<()> {
    let records = run_pipeline(config, target)?;
    let rows: usize = records.iter().map(|r| r.row_count).sum();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ {} generators, {} rows written", records.len(), rows);
    run_validate(config)
}

fn run_validate(config: &GeneratorConfig) -> Result<()> {
    println!("\n🔍 Validating {} in {}", config.year, config.data_dir.display());
    let reports = validate(config)?;
    if reports.is_empty() {
        println!("⚠️  No tables found to validate");
        return Ok(());
    }

    for report in &reports {
        print_report(report);
    }
    let summary = DatasetQualityEngine::new().batch_summary(&reports);
    println!("\n📊 {}", summary.summary());

    if summary.critical_issues_count > 0 {
        anyhow::bail!("{} checks found critical issues", summary.critical_issues_count);
    }
    Ok(())
}

fn print_report(report: &QualityReport) {
    let icon = if report.has_critical_issues() {
        "❌"
    } else if report.issues.is_empty() {
        "✅"
    } else {
        "⚠️ "
    };
    println!("{} {}", icon, report.summary());
    for issue in &report.issues {
        println!("   • [{:?}] {}", issue.severity, issue.issue);
        println!("     → {}", issue.recommendation);
    }
}

fn run_verify(config: &GeneratorConfig, domain: &str, entity: &str) -> Result<()> {
    println!("🔁 Replaying {}/{} for {}...", domain, entity, config.year);
    let check = verify(config, domain, entity)?;
    if check.matches() {
        println!("✅ {} reproduces byte-identical output (seed {})", check.generator, check.seed);
        Ok(())
    } else {
        anyhow::bail!(
            "{} diverged with seed {}: recorded {} vs replayed {}",
            check.generator,
            check.seed,
            check.recorded,
            check.replayed
        )
    }
}

fn run_list(config: &GeneratorConfig) -> Result<()> {
    let runs = recorded_runs(config)?;
    println!("🗄️  {} recorded runs in {}", runs.len(), config.manifest_path.display());
    for run in &runs {
        println!(
            "   {} {:<36} {} seed={:<20} rows={:<8} {}",
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.generator,
            run.year,
            run.seed,
            run.row_count,
            &run.fingerprint[..12.min(run.fingerprint.len())]
        );
    }
    Ok(())
}
