//! repotag - classify repository cohorts from their fingerprints
//!
//! ## Commands
//!
//! - `classify`: Tag every repository in a fingerprint directory
//! - `usage`: Report how widely each fingerprint is used across a cohort
//! - `score`: Score one change for delivery risk
//! - `band`: Show the band label for a measurement

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use repotag_core::{
    age_bands, band_for, count_bands, fingerprint_usage, render_classification_md, size_bands,
    write_classification_artifact, BandOptions, Bands, Classifier, ClassifierConfig,
    CohortClassification, CohortFingerprintUsage, CohortLoader, CommitRiskInputs,
    CommitRiskScore, DirectoryStore, RepositoryFingerprintSet,
};

/// Exit code when a scored change exceeds `--fail-above`.
const EXIT_RISK_EXCEEDED: u8 = 2;

#[derive(Parser)]
#[command(name = "repotag")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fingerprint-based repository classification", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Classifier configuration (TOML); defaults apply when omitted
    #[arg(long, global = true, env = "REPOTAG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every repository in a fingerprint directory
    Classify {
        /// Directory holding one `<owner>__<name>.json` file per repository
        #[arg(short, long)]
        dir: PathBuf,

        /// Reference instant for time-based rules (RFC 3339, default: now)
        #[arg(long)]
        as_of: Option<String>,

        /// Write a digest-verified artifact under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print a markdown summary instead of JSON
        #[arg(long)]
        markdown: bool,
    },

    /// Report how widely each fingerprint is used across a cohort
    Usage {
        /// Directory holding one `<owner>__<name>.json` file per repository
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Score one change for delivery risk
    Score {
        /// Change facts as JSON (sha, changed_files, fingerprints, indicators)
        #[arg(short, long)]
        inputs: PathBuf,

        /// Exit with code 2 when the total exceeds this value
        #[arg(long)]
        fail_above: Option<f64>,
    },

    /// Show the band label for a measurement
    Band {
        /// Band table to use
        #[arg(short, long, value_enum)]
        table: BandTable,

        /// Measured value
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Append the value to the label
        #[arg(long)]
        number: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BandTable {
    /// Days since last activity
    Age,
    /// Lines of code
    Size,
    /// Generic item counts
    Count,
}

impl BandTable {
    fn bands(self) -> Bands {
        match self {
            Self::Age => age_bands(),
            Self::Size => size_bands(),
            Self::Count => count_bands(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    repotag_core::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            dir,
            as_of,
            out,
            markdown,
        } => {
            cmd_classify(config, &dir, as_of.as_deref(), out.as_deref(), markdown).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Usage { dir } => {
            let usage = usage_dir(&dir).await?;
            println!("{}", serde_json::to_string_pretty(&usage)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Score { inputs, fail_above } => {
            let result = cmd_score(config, &inputs)?;
            match fail_above {
                Some(limit) if result.exceeds(limit) => {
                    eprintln!("✗ risk {} exceeds {}", result.total, limit);
                    Ok(ExitCode::from(EXIT_RISK_EXCEEDED))
                }
                _ => Ok(ExitCode::SUCCESS),
            }
        }
        Commands::Band {
            table,
            value,
            number,
        } => {
            println!("{}", cmd_band(table, value, number));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => ClassifierConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path)),
        None => Ok(ClassifierConfig::default()),
    }
}

fn parse_as_of(as_of: Option<&str>) -> Result<DateTime<Utc>> {
    match as_of {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --as-of '{}', expected RFC 3339", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

async fn load_dir(dir: &Path) -> Result<Vec<RepositoryFingerprintSet>> {
    let loader = CohortLoader::new(Arc::new(DirectoryStore::new(dir)));
    loader
        .load()
        .await
        .with_context(|| format!("Failed to load fingerprints from {:?}", dir))
}

async fn classify_dir(
    config: ClassifierConfig,
    dir: &Path,
    as_of: Option<&str>,
) -> Result<CohortClassification> {
    let as_of = parse_as_of(as_of)?;
    let classifier = Classifier::new(config, as_of).context("Invalid classifier rules")?;
    let cohort = load_dir(dir).await?;
    Ok(classifier.classify_cohort(&cohort))
}

async fn usage_dir(dir: &Path) -> Result<CohortFingerprintUsage> {
    let cohort = load_dir(dir).await?;
    let usage = fingerprint_usage(&cohort);
    info!(
        projects = usage.projects_analyzed,
        fingerprints = usage.fingerprints.len(),
        "fingerprint usage computed"
    );
    Ok(usage)
}

async fn cmd_classify(
    config: ClassifierConfig,
    dir: &Path,
    as_of: Option<&str>,
    out: Option<&Path>,
    markdown: bool,
) -> Result<()> {
    let classification = classify_dir(config, dir, as_of).await?;

    if let Some(out) = out {
        let path = write_classification_artifact(&classification, out)
            .context("Failed to write classification artifact")?;
        info!(path = %path.display(), "classification artifact written");
    }

    if markdown {
        print!("{}", render_classification_md(&classification));
    } else {
        println!("{}", serde_json::to_string_pretty(&classification)?);
    }
    Ok(())
}

fn cmd_score(config: ClassifierConfig, inputs: &Path) -> Result<CommitRiskScore> {
    let raw = std::fs::read_to_string(inputs)
        .with_context(|| format!("Failed to read {:?}", inputs))?;
    let inputs: CommitRiskInputs =
        serde_json::from_str(&raw).context("Change inputs are not valid JSON")?;

    let classifier = Classifier::new(config, Utc::now()).context("Invalid classifier rules")?;
    let result = classifier.score_commit(&inputs);

    println!("Risk: {}", result.total);
    for contribution in result.contributing() {
        println!("  + {} ({})", contribution.scorer, contribution.value);
    }
    Ok(result)
}

fn cmd_band(table: BandTable, value: f64, number: bool) -> String {
    let options = if number {
        BandOptions::with_number()
    } else {
        BandOptions::default()
    };
    band_for(&table.bands(), value, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "repotag", "band", "--table", "age", "--value", "14", "--number", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Band {
                table: BandTable::Age,
                number: true,
                ..
            }
        ));
    }

    #[test]
    fn test_cmd_band_labels() {
        assert_eq!(cmd_band(BandTable::Age, 14.0, true), "recent (14)");
        assert_eq!(cmd_band(BandTable::Size, 200.0, false), "tiny");
        assert_eq!(cmd_band(BandTable::Count, -3.0, false), "low");
    }

    #[test]
    fn test_parse_as_of_rejects_garbage() {
        assert!(parse_as_of(Some("yesterday")).is_err());
        let at = parse_as_of(Some("2026-01-01T00:00:00Z")).unwrap();
        assert_eq!(at.timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_load_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repotag.toml");
        std::fs::write(&path, "[taggers]\ndead_days = 30\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.taggers.dead_days, 30);
        assert_eq!(config.taggers.max_branches, 20);
    }

    #[tokio::test]
    async fn test_classify_dir_tags_cohort() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("org__svc.json"),
            json!([{"type": "git-recency", "data": {"lastCommitTime": 0}}]).to_string(),
        )
        .unwrap();

        let result = classify_dir(
            ClassifierConfig::default(),
            dir.path(),
            Some("2026-01-01T00:00:00Z"),
        )
        .await
        .unwrap();
        assert_eq!(result.repositories.len(), 1);
        assert!(result.repositories[0].has_tag("dead?"));
    }

    #[tokio::test]
    async fn test_usage_dir_reports_variants() {
        let dir = tempfile::tempdir().unwrap();
        for (file, version) in [("org__a.json", "18.2.0"), ("org__b.json", "17.0.2")] {
            std::fs::write(
                dir.path().join(file),
                json!([{"type": "npm-project-deps", "name": "react", "data": {"version": version}}])
                    .to_string(),
            )
            .unwrap();
        }

        let usage = usage_dir(dir.path()).await.unwrap();
        assert_eq!(usage.projects_analyzed, 2);
        let react = usage.get("npm-project-deps", "react").unwrap();
        assert_eq!((react.appears_in, react.variants), (2, 2));
    }

    #[test]
    fn test_cmd_score_reads_change_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("change.json");
        std::fs::write(
            &path,
            json!({"changed_files": ["a", "b", "pom.xml"]}).to_string(),
        )
        .unwrap();
        let result = cmd_score(ClassifierConfig::default(), &path).unwrap();
        assert_eq!(result.total, 2.0);
        assert!(result.exceeds(1.5));
    }
}
