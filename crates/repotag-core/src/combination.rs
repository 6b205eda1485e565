//! Combination tagger engine.
//!
//! Combination taggers see the repository's raw fingerprints plus the cohort
//! [`TagContext`]. They either compare a per-repository value against a
//! cohort-derived threshold or combine several fingerprint types found in the
//! same repository. They never see other taggers' tags.

use std::fmt;
use std::sync::Arc;

use crate::cohort::TagContext;
use crate::domain::{Fingerprint, Result, Severity, Tag};
use crate::tagger::validate_rule_names;

/// Predicate over a repository's fingerprints and the cohort context.
pub type CombinationTest = Arc<dyn Fn(&[Fingerprint], &TagContext) -> bool + Send + Sync>;

/// A cohort-aware or cross-signal tagger.
#[derive(Clone)]
pub struct CombinationTaggerDefinition {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    test: CombinationTest,
}

impl fmt::Debug for CombinationTaggerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinationTaggerDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl CombinationTaggerDefinition {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&[Fingerprint], &TagContext) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            severity: Severity::default(),
            test: Arc::new(test),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn test(&self, fingerprints: &[Fingerprint], context: &TagContext) -> bool {
        (self.test)(fingerprints, context)
    }

    fn to_tag(&self) -> Tag {
        Tag {
            name: self.name.clone(),
            description: self.description.clone(),
            severity: self.severity,
        }
    }
}

/// Evaluate combination taggers against one repository, in declaration order.
pub fn evaluate_combination_taggers(
    defs: &[CombinationTaggerDefinition],
    fingerprints: &[Fingerprint],
    context: &TagContext,
) -> Vec<Tag> {
    defs.iter()
        .filter(|def| def.test(fingerprints, context))
        .map(CombinationTaggerDefinition::to_tag)
        .collect()
}

/// Validate a combination tagger list.
pub fn validate_combination_taggers(defs: &[CombinationTaggerDefinition]) -> Result<()> {
    validate_rule_names(
        "combination",
        defs.iter()
            .map(|d| (d.name.as_str(), d.description.as_str())),
    )
}
