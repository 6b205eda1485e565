//! Classification artifacts and rendered summaries.
//!
//! A run persists `<dir>/<run_id>/classification.json` next to a sha256
//! `classification.digest`; reading an artifact back verifies the digest.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::classify::CohortClassification;
use crate::domain::{ClassifyError, Result};

const ARTIFACT_FILE: &str = "classification.json";
const DIGEST_FILE: &str = "classification.digest";

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Persist `<dir>/<run_id>/classification.json` and its digest.
pub fn write_classification_artifact(
    classification: &CohortClassification,
    dir: &Path,
) -> Result<PathBuf> {
    let run_dir = dir.join(classification.run_id.to_string());
    std::fs::create_dir_all(&run_dir)?;

    let path = run_dir.join(ARTIFACT_FILE);
    let digest_path = run_dir.join(DIGEST_FILE);
    let json = serde_json::to_vec_pretty(classification)?;
    let digest = sha256_hex(&json);

    std::fs::write(&path, &json)?;
    std::fs::write(&digest_path, digest.as_bytes())?;

    Ok(path)
}

/// Read and verify `<dir>/<run_id>/classification.json`.
pub fn read_classification_artifact(run_id: &str, dir: &Path) -> Result<CohortClassification> {
    let run_dir = dir.join(run_id);
    let json = std::fs::read(run_dir.join(ARTIFACT_FILE))?;
    let digest = std::fs::read_to_string(run_dir.join(DIGEST_FILE))?;
    let actual = sha256_hex(&json);
    if digest.trim() != actual {
        return Err(ClassifyError::DigestMismatch {
            expected: digest.trim().to_string(),
            actual,
        });
    }
    Ok(serde_json::from_slice(&json)?)
}

/// Render a markdown summary: tag counts, then one line per repository with
/// its tags ordered by severity.
pub fn render_classification_md(classification: &CohortClassification) -> String {
    let mut out = String::new();
    out.push_str("# Classification Summary\n\n");
    out.push_str(&format!(
        "- run: `{}`\n- as of: {}\n- repositories: {}\n- excluded from cohort average: {}\n- average fingerprint types: {:.2}\n\n",
        classification.run_id,
        classification.as_of.to_rfc3339(),
        classification.repositories.len(),
        classification.context.excluded_count,
        classification.context.average_fingerprint_count,
    ));

    let counts = classification.tag_counts();
    out.push_str("## Tags\n");
    if counts.is_empty() {
        out.push_str("- none\n");
    } else {
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (name, count) in counts {
            out.push_str(&format!("- `{}`: {}\n", name, count));
        }
    }
    out.push('\n');

    out.push_str("## Repositories\n");
    for repo in &classification.repositories {
        let tags: Vec<String> = repo
            .by_severity()
            .iter()
            .map(|t| format!("{} ({})", t.name, t.severity))
            .collect();
        let tags = if tags.is_empty() {
            "-".to_string()
        } else {
            tags.join(", ")
        };
        out.push_str(&format!("- **{}**: {}", repo.repo_id, tags));
        if repo.has_failures() {
            out.push_str(&format!(" _(extraction failures: {})_", repo.failures.len()));
        }
        out.push('\n');
    }
    out
}
