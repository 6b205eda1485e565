//! Commit risk scoring.
//!
//! Each [`CommitRiskScorer`] looks only at the facts of a single change and
//! returns a non-negative contribution. [`score`] sums the contributions of
//! every registered scorer. Contributions below zero or not finite count as 0,
//! so the total is never negative.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Fingerprint;

/// Facts about one push or commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRiskInputs {
    /// Commit being scored, when known.
    #[serde(default)]
    pub sha: Option<String>,
    /// Paths touched by the change, relative to the repository root.
    #[serde(default)]
    pub changed_files: Vec<String>,
    /// Fingerprints computed for the change.
    #[serde(default)]
    pub fingerprints: Vec<Fingerprint>,
    /// Derived boolean conditions, e.g. `"build-descriptor-changed"`.
    #[serde(default)]
    pub indicators: BTreeMap<String, bool>,
}

impl CommitRiskInputs {
    pub fn changed_file_count(&self) -> usize {
        self.changed_files.len()
    }

    /// Value of a named indicator; absent means `false`.
    pub fn indicator(&self, name: &str) -> bool {
        self.indicators.get(name).copied().unwrap_or(false)
    }

    pub fn with_changed_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: bool) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprints.push(fingerprint);
        self
    }
}

/// A pure function from one change's facts to a risk contribution.
pub trait CommitRiskScorer: Send + Sync {
    /// Name reported alongside the contribution.
    fn name(&self) -> &str;

    /// Contribution for this change; 0 means "no contribution".
    fn score(&self, inputs: &CommitRiskInputs) -> f64;
}

/// Fixed weight when more than `limit_to` files changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChangeCount {
    pub limit_to: usize,
    pub weight: f64,
}

impl CommitRiskScorer for FileChangeCount {
    fn name(&self) -> &str {
        "file-change-count"
    }

    fn score(&self, inputs: &CommitRiskInputs) -> f64 {
        if inputs.changed_file_count() > self.limit_to {
            self.weight
        } else {
            0.0
        }
    }
}

/// Fixed weight when a file with the given name appears among the changes,
/// at the root or in any sub-project.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChanged {
    pub file_name: String,
    pub weight: f64,
    name: String,
}

impl FileChanged {
    pub fn new(file_name: impl Into<String>, weight: f64) -> Self {
        let file_name = file_name.into();
        Self {
            name: format!("{file_name}-changed"),
            file_name,
            weight,
        }
    }

    /// A Maven build descriptor changed.
    pub fn pom_changed(weight: f64) -> Self {
        Self::new("pom.xml", weight)
    }
}

impl CommitRiskScorer for FileChanged {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, inputs: &CommitRiskInputs) -> f64 {
        let touched = inputs.changed_files.iter().any(|path| {
            path.rsplit(['/', '\\'])
                .next()
                .is_some_and(|last| last == self.file_name)
        });
        if touched {
            self.weight
        } else {
            0.0
        }
    }
}

/// Fixed weight when a named indicator is set.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub indicator: String,
    pub weight: f64,
}

impl CommitRiskScorer for IndicatorSet {
    fn name(&self) -> &str {
        &self.indicator
    }

    fn score(&self, inputs: &CommitRiskInputs) -> f64 {
        if inputs.indicator(&self.indicator) {
            self.weight
        } else {
            0.0
        }
    }
}

/// Fixed weight when the change carries a fingerprint of the given type.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintPresent {
    pub fp_type: String,
    pub weight: f64,
}

impl CommitRiskScorer for FingerprintPresent {
    fn name(&self) -> &str {
        &self.fp_type
    }

    fn score(&self, inputs: &CommitRiskInputs) -> f64 {
        if inputs
            .fingerprints
            .iter()
            .any(|fp| fp.fp_type() == self.fp_type)
        {
            self.weight
        } else {
            0.0
        }
    }
}

/// Adapter so a closure can be registered without a dedicated type.
pub struct FnScorer<F> {
    name: String,
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&CommitRiskInputs) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnScorer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnScorer").field("name", &self.name).finish()
    }
}

impl<F> CommitRiskScorer for FnScorer<F>
where
    F: Fn(&CommitRiskInputs) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, inputs: &CommitRiskInputs) -> f64 {
        (self.f)(inputs)
    }
}

/// One scorer's share of the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub scorer: String,
    pub value: f64,
}

/// Risk score for a single change. Higher is riskier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRiskScore {
    /// Sum of all contributions.
    pub total: f64,
    /// Contributions in scorer registration order.
    pub contributions: Vec<ScoreContribution>,
}

impl CommitRiskScore {
    /// Scorers that contributed a non-zero value.
    pub fn contributing(&self) -> impl Iterator<Item = &ScoreContribution> {
        self.contributions.iter().filter(|c| c.value > 0.0)
    }

    /// True when the total strictly exceeds `limit`.
    pub fn exceeds(&self, limit: f64) -> bool {
        self.total > limit
    }
}

/// Sum every scorer's contribution for `inputs`.
pub fn score(scorers: &[Box<dyn CommitRiskScorer>], inputs: &CommitRiskInputs) -> CommitRiskScore {
    let contributions: Vec<ScoreContribution> = scorers
        .iter()
        .map(|s| ScoreContribution {
            scorer: s.name().to_string(),
            value: sanitize(s.score(inputs)),
        })
        .collect();
    let total = contributions.iter().map(|c| c.value).sum();
    CommitRiskScore {
        total,
        contributions,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
