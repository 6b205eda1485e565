//! Cohort statistics passes.
//!
//! [`compute_tag_context`] is the reduce completed before any combination
//! tagger runs. Repositories whose whole extraction failed are left out of the
//! mean so that "couldn't extract" does not drag the average down like "found
//! nothing" would. [`fingerprint_usage`] reports how widely each fingerprint
//! is used across the cohort and under the same exclusion.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::RepositoryFingerprintSet;

/// Aggregates over a cohort, consumed by combination taggers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagContext {
    /// Mean distinct fingerprint-type count across counted repositories.
    pub average_fingerprint_count: f64,
    /// Repositories that contributed to the mean.
    pub repository_count: usize,
    /// Repositories excluded because extraction failed.
    pub excluded_count: usize,
}

impl TagContext {
    /// Context for a cohort with no countable repositories.
    pub fn empty() -> Self {
        Self {
            average_fingerprint_count: 0.0,
            repository_count: 0,
            excluded_count: 0,
        }
    }
}

impl Default for TagContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// Compute the [`TagContext`] for a cohort.
pub fn compute_tag_context<'a, I>(cohort: I) -> TagContext
where
    I: IntoIterator<Item = &'a RepositoryFingerprintSet>,
{
    let mut total = 0usize;
    let mut counted = 0usize;
    let mut excluded = 0usize;

    for set in cohort {
        if set.extraction_failed() {
            excluded += 1;
            continue;
        }
        total += set.distinct_type_count();
        counted += 1;
    }

    let average_fingerprint_count = if counted == 0 {
        0.0
    } else {
        total as f64 / counted as f64
    };

    TagContext {
        average_fingerprint_count,
        repository_count: counted,
        excluded_count: excluded,
    }
}

/// Use of one `(type, name)` fingerprint across a cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintUsage {
    #[serde(rename = "type")]
    pub fp_type: String,
    pub name: String,
    /// Repositories carrying this fingerprint at any path.
    pub appears_in: usize,
    /// Distinct `data` values seen for it across the cohort.
    pub variants: usize,
}

/// Fingerprint usage report for a cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortFingerprintUsage {
    pub projects_analyzed: usize,
    /// Ordered by `(type, name)`.
    pub fingerprints: Vec<FingerprintUsage>,
}

impl CohortFingerprintUsage {
    pub fn get(&self, fp_type: &str, name: &str) -> Option<&FingerprintUsage> {
        self.fingerprints
            .iter()
            .find(|u| u.fp_type == fp_type && u.name == name)
    }
}

#[derive(Default)]
struct UsageAccumulator {
    appears_in: usize,
    variants: HashSet<String>,
}

/// Count, per `(type, name)`, the repositories using it and its distinct values.
pub fn fingerprint_usage<'a, I>(cohort: I) -> CohortFingerprintUsage
where
    I: IntoIterator<Item = &'a RepositoryFingerprintSet>,
{
    let mut projects_analyzed = 0usize;
    let mut usage: BTreeMap<(&str, &str), UsageAccumulator> = BTreeMap::new();

    for set in cohort {
        if set.extraction_failed() {
            continue;
        }
        projects_analyzed += 1;

        let mut seen_here = HashSet::new();
        for fp in &set.fingerprints {
            let key = (fp.fp_type(), fp.name());
            let entry = usage.entry(key).or_default();
            if seen_here.insert(key) {
                entry.appears_in += 1;
            }
            // serde_json objects serialize with sorted keys
            entry.variants.insert(fp.data().to_string());
        }
    }

    let fingerprints = usage
        .into_iter()
        .map(|((fp_type, name), acc)| FingerprintUsage {
            fp_type: fp_type.to_string(),
            name: name.to_string(),
            appears_in: acc.appears_in,
            variants: acc.variants.len(),
        })
        .collect();

    CohortFingerprintUsage {
        projects_analyzed,
        fingerprints,
    }
}
