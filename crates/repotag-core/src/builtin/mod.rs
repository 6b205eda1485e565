//! Built-in rule registries.
//!
//! - [`taggers`]: single-repository taggers
//! - [`combination_taggers`]: cohort-aware and cross-signal taggers
//! - [`commit_risk_scorers`]: change-level risk scorers
//!
//! Where a repository carries several fingerprints of one type (one per
//! sub-project), the helpers here aggregate explicitly: the freshest commit
//! time and the largest count win, independent of fingerprint order.

mod combinations;
mod scorers;
mod taggers;

pub use combinations::combination_taggers;
pub use scorers::commit_risk_scorers;
pub use taggers::taggers;

use chrono::{DateTime, Utc};

use crate::aspect;
use crate::domain::{Fingerprint, Payload};

/// Most recent commit time across all well-formed `git-recency` fingerprints.
pub(crate) fn freshest_commit(fingerprints: &[Fingerprint]) -> Option<DateTime<Utc>> {
    fingerprints
        .iter()
        .filter(|fp| fp.fp_type() == aspect::GIT_RECENCY)
        .filter_map(|fp| match fp.payload() {
            Some(Payload::GitRecency(at)) => Some(at),
            _ => None,
        })
        .max()
}

/// Largest active-committer count across all well-formed `gitActives` fingerprints.
pub(crate) fn max_active_committers(fingerprints: &[Fingerprint]) -> Option<u64> {
    fingerprints
        .iter()
        .filter(|fp| fp.fp_type() == aspect::GIT_ACTIVES)
        .filter_map(|fp| match fp.payload() {
            Some(Payload::GitActives(count)) => Some(count),
            _ => None,
        })
        .max()
}
