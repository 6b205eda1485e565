//! Repository identity and the per-repository fingerprint set.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fingerprint::Fingerprint;

/// Identifies a repository (e.g. `owner/name`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(String);

impl RepoId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A collaborator could not produce some or all fingerprints for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    /// Aspect that failed; `None` when the whole repository failed.
    pub aspect: Option<String>,
    pub message: String,
}

impl ExtractionFailure {
    /// Whole-repository failure.
    pub fn repository(message: impl Into<String>) -> Self {
        Self {
            aspect: None,
            message: message.into(),
        }
    }

    /// Failure of a single aspect; other aspects still contributed.
    pub fn aspect(aspect: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            aspect: Some(aspect.into()),
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
struct RawRepositoryFingerprintSet {
    repo_id: RepoId,
    #[serde(default)]
    fingerprints: Vec<Fingerprint>,
    #[serde(default)]
    failures: Vec<ExtractionFailure>,
}

/// All fingerprints for one repository at one point in time.
///
/// Deserialization goes through [`RepositoryFingerprintSet::new`], so stored
/// sets get the same identity dedup as sets built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRepositoryFingerprintSet")]
pub struct RepositoryFingerprintSet {
    pub repo_id: RepoId,
    pub fingerprints: Vec<Fingerprint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ExtractionFailure>,
}

impl From<RawRepositoryFingerprintSet> for RepositoryFingerprintSet {
    fn from(raw: RawRepositoryFingerprintSet) -> Self {
        let mut set = Self::new(raw.repo_id, raw.fingerprints);
        set.failures = raw.failures;
        set
    }
}

impl RepositoryFingerprintSet {
    /// Build a set, dropping repeated `(type, name, path)` identities.
    /// The first occurrence wins and order is preserved.
    pub fn new(repo_id: RepoId, fingerprints: Vec<Fingerprint>) -> Self {
        let mut seen = HashSet::new();
        let fingerprints = fingerprints
            .into_iter()
            .filter(|fp| {
                let (t, n, p) = fp.identity();
                seen.insert((t.to_string(), n.to_string(), p.to_string()))
            })
            .collect();
        Self {
            repo_id,
            fingerprints,
            failures: Vec::new(),
        }
    }

    /// An empty set standing in for a repository that could not be extracted.
    pub fn failed(repo_id: RepoId, failure: ExtractionFailure) -> Self {
        Self {
            repo_id,
            fingerprints: Vec::new(),
            failures: vec![failure],
        }
    }

    pub fn with_failure(mut self, failure: ExtractionFailure) -> Self {
        self.failures.push(failure);
        self
    }

    /// Number of distinct fingerprint types present.
    pub fn distinct_type_count(&self) -> usize {
        distinct_type_count(&self.fingerprints)
    }

    /// True when the whole extraction failed, as opposed to "found nothing".
    pub fn extraction_failed(&self) -> bool {
        self.fingerprints.is_empty() && self.failures.iter().any(|f| f.aspect.is_none())
    }

    pub fn find_all<'a>(&'a self, fp_type: &'a str) -> impl Iterator<Item = &'a Fingerprint> + 'a {
        find_all(&self.fingerprints, fp_type)
    }

    pub fn first(&self, fp_type: &str) -> Option<&Fingerprint> {
        self.fingerprints.iter().find(|fp| fp.fp_type() == fp_type)
    }
}

/// Count distinct `type` values in a fingerprint slice.
pub fn distinct_type_count(fingerprints: &[Fingerprint]) -> usize {
    fingerprints
        .iter()
        .map(Fingerprint::fp_type)
        .collect::<HashSet<_>>()
        .len()
}

/// All fingerprints of the given type, in set order.
pub fn find_all<'a>(
    fingerprints: &'a [Fingerprint],
    fp_type: &'a str,
) -> impl Iterator<Item = &'a Fingerprint> + 'a {
    fingerprints.iter().filter(move |fp| fp.fp_type() == fp_type)
}
