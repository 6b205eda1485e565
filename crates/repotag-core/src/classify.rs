//! Classification entry point.
//!
//! [`Classifier`] owns the validated configuration and rule registries for one
//! run. [`Classifier::classify_cohort`] computes the cohort [`TagContext`] over
//! every repository first, then evaluates taggers and combination taggers per
//! repository. The output is the tag list per repository in declaration order
//! (single-repository taggers, then combination taggers).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::builtin;
use crate::cohort::{compute_tag_context, TagContext};
use crate::combination::{
    evaluate_combination_taggers, validate_combination_taggers, CombinationTaggerDefinition,
};
use crate::config::ClassifierConfig;
use crate::domain::{ExtractionFailure, RepoId, RepositoryFingerprintSet, Result, Severity, Tag};
use crate::obs;
use crate::risk::{score, CommitRiskInputs, CommitRiskScore, CommitRiskScorer};
use crate::tagger::{evaluate_taggers, validate_taggers, TaggerDefinition};

/// Tags (and any extraction failures) for one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoClassification {
    pub repo_id: RepoId,
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExtractionFailure>,
}

impl RepoClassification {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.tags.iter().map(|t| t.severity).max()
    }

    /// Tags ordered error first; ties keep declaration order.
    pub fn by_severity(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.iter().collect();
        tags.sort_by(|a, b| b.severity.cmp(&a.severity));
        tags
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Result of classifying a whole cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortClassification {
    pub run_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub context: TagContext,
    /// One entry per input repository, in input order.
    pub repositories: Vec<RepoClassification>,
}

impl CohortClassification {
    /// Number of repositories carrying each tag name.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for repo in &self.repositories {
            for tag in &repo.tags {
                *counts.entry(tag.name.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Repositories with at least one tag of `severity`.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &RepoClassification> {
        self.repositories
            .iter()
            .filter(move |r| r.tags.iter().any(|t| t.severity == severity))
    }

    pub fn get(&self, repo_id: &str) -> Option<&RepoClassification> {
        self.repositories
            .iter()
            .find(|r| r.repo_id.as_str() == repo_id)
    }
}

/// Validated rules and configuration for a classification run.
pub struct Classifier {
    config: ClassifierConfig,
    as_of: DateTime<Utc>,
    taggers: Vec<TaggerDefinition>,
    combination_taggers: Vec<CombinationTaggerDefinition>,
    scorers: Vec<Box<dyn CommitRiskScorer>>,
}

impl Classifier {
    /// Build a classifier with the built-in registries.
    ///
    /// Fails when the configuration or any rule definition is malformed.
    pub fn new(config: ClassifierConfig, as_of: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        let taggers = builtin::taggers(&config.taggers, as_of);
        let combination_taggers = builtin::combination_taggers(&config.combinations, as_of);
        let scorers = builtin::commit_risk_scorers(&config.commit_risk);
        let classifier = Self {
            config,
            as_of,
            taggers,
            combination_taggers,
            scorers,
        };
        classifier.validate_rules()?;
        Ok(classifier)
    }

    /// Build a classifier with only the given rules and no built-ins.
    pub fn with_rules(
        config: ClassifierConfig,
        as_of: DateTime<Utc>,
        taggers: Vec<TaggerDefinition>,
        combination_taggers: Vec<CombinationTaggerDefinition>,
        scorers: Vec<Box<dyn CommitRiskScorer>>,
    ) -> Result<Self> {
        config.validate()?;
        let classifier = Self {
            config,
            as_of,
            taggers,
            combination_taggers,
            scorers,
        };
        classifier.validate_rules()?;
        Ok(classifier)
    }

    /// Append single-repository taggers after the existing ones.
    pub fn with_taggers(mut self, taggers: Vec<TaggerDefinition>) -> Result<Self> {
        self.taggers.extend(taggers);
        validate_taggers(&self.taggers)?;
        Ok(self)
    }

    /// Append combination taggers after the existing ones.
    pub fn with_combination_taggers(
        mut self,
        taggers: Vec<CombinationTaggerDefinition>,
    ) -> Result<Self> {
        self.combination_taggers.extend(taggers);
        validate_combination_taggers(&self.combination_taggers)?;
        Ok(self)
    }

    /// Register an additional commit risk scorer.
    pub fn with_scorer(mut self, scorer: Box<dyn CommitRiskScorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    fn validate_rules(&self) -> Result<()> {
        validate_taggers(&self.taggers)?;
        validate_combination_taggers(&self.combination_taggers)
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn taggers(&self) -> &[TaggerDefinition] {
        &self.taggers
    }

    pub fn combination_taggers(&self) -> &[CombinationTaggerDefinition] {
        &self.combination_taggers
    }

    /// Classify every repository in `cohort`.
    pub fn classify_cohort(&self, cohort: &[RepositoryFingerprintSet]) -> CohortClassification {
        let run_id = Uuid::new_v4();
        let run_label = run_id.to_string();
        let _span = obs::ClassificationSpan::enter(&run_label);
        obs::emit_classification_started(&run_label, cohort.len());

        // Barrier: the context must cover the whole cohort before any
        // combination tagger runs.
        let context = compute_tag_context(cohort);
        obs::emit_context_computed(&context);

        let repositories = cohort
            .iter()
            .map(|set| self.classify_repository(set, &context))
            .collect();

        CohortClassification {
            run_id,
            as_of: self.as_of,
            context,
            repositories,
        }
    }

    /// Classify one repository against a precomputed cohort context.
    pub fn classify_repository(
        &self,
        set: &RepositoryFingerprintSet,
        context: &TagContext,
    ) -> RepoClassification {
        for failure in &set.failures {
            obs::emit_extraction_failed(
                set.repo_id.as_str(),
                failure.aspect.as_deref(),
                &failure.message,
            );
        }

        let mut tags = evaluate_taggers(&self.taggers, &set.fingerprints);
        // A repository left out of the cohort context is not compared against it.
        if !set.extraction_failed() {
            tags.extend(evaluate_combination_taggers(
                &self.combination_taggers,
                &set.fingerprints,
                context,
            ));
        }

        let classification = RepoClassification {
            repo_id: set.repo_id.clone(),
            tags,
            failures: set.failures.clone(),
        };
        let highest = classification.highest_severity().map(|s| s.to_string());
        obs::emit_repo_classified(
            set.repo_id.as_str(),
            classification.tags.len(),
            highest.as_deref(),
        );
        classification
    }

    /// Score one change with the registered scorers.
    pub fn score_commit(&self, inputs: &CommitRiskInputs) -> CommitRiskScore {
        let result = score(&self.scorers, inputs);
        obs::emit_commit_scored(
            inputs.sha.as_deref(),
            result.total,
            result.contributing().count(),
        );
        result
    }
}
