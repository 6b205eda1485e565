//! Structured observability hooks for classification runs.
//!
//! Every event carries a stable `event` field so log pipelines can filter on it.
//! The pure engines never log; only the entry points call these.

use tracing::{debug, info, warn};

use crate::cohort::TagContext;

/// RAII guard that enters a run-scoped span for the duration of a classification.
///
/// ```ignore
/// let _span = ClassificationSpan::enter("4f1c...");
/// // events below are associated with run_id = "4f1c..."
/// ```
pub struct ClassificationSpan {
    _span: tracing::span::EnteredSpan,
}

impl ClassificationSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("repotag.classification", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a cohort classification run started.
pub fn emit_classification_started(run_id: &str, repositories: usize) {
    info!(
        event = "classification.started",
        run_id = %run_id,
        repositories = repositories,
    );
}

/// Emit event: a cohort was fetched from a fingerprint store.
pub fn emit_cohort_loaded(repositories: usize, failed: usize) {
    info!(
        event = "cohort.loaded",
        repositories = repositories,
        failed = failed,
    );
}

/// Emit event: the cohort statistics pass finished.
pub fn emit_context_computed(context: &TagContext) {
    info!(
        event = "cohort.context_computed",
        average_fingerprint_count = context.average_fingerprint_count,
        repository_count = context.repository_count,
        excluded_count = context.excluded_count,
    );
}

/// Emit event: one repository was classified.
pub fn emit_repo_classified(repo_id: &str, tags: usize, highest: Option<&str>) {
    debug!(
        event = "repo.classified",
        repo_id = %repo_id,
        tags = tags,
        highest_severity = highest.unwrap_or("none"),
    );
}

/// Emit event: extraction failed for a repository or one of its aspects (warning level).
pub fn emit_extraction_failed(repo_id: &str, aspect: Option<&str>, message: &str) {
    warn!(
        event = "repo.extraction_failed",
        repo_id = %repo_id,
        aspect = aspect.unwrap_or("*"),
        message = %message,
    );
}

/// Emit event: a change was scored.
pub fn emit_commit_scored(sha: Option<&str>, total: f64, contributing: usize) {
    info!(
        event = "commit.scored",
        sha = sha.unwrap_or("unknown"),
        total = total,
        contributing = contributing,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_span_create() {
        let _span = ClassificationSpan::enter("test-run-id");
        emit_classification_started("test-run-id", 0);
        emit_context_computed(&TagContext::empty());
        emit_cohort_loaded(0, 0);
    }
}
