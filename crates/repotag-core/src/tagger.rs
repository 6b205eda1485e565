//! Single-repository tagger engine.
//!
//! A [`TaggerDefinition`] is a pure predicate over one repository's full
//! fingerprint slice. [`evaluate_taggers`] runs every definition in declaration
//! order and emits one [`Tag`] per definition whose test passes. Taggers never
//! see each other's results.

use std::fmt;
use std::sync::Arc;

use crate::domain::{ClassifyError, Fingerprint, Result, Severity, Tag};

/// Predicate over a repository's fingerprints.
pub type TaggerTest = Arc<dyn Fn(&[Fingerprint]) -> bool + Send + Sync>;

/// A named rule mapping one repository's fingerprints to a tag.
#[derive(Clone)]
pub struct TaggerDefinition {
    pub name: String,
    pub description: String,
    pub severity: Severity,
    test: TaggerTest,
}

impl fmt::Debug for TaggerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggerDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

impl TaggerDefinition {
    /// Tagger over the whole fingerprint slice, severity `info`.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&[Fingerprint]) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            severity: Severity::default(),
            test: Arc::new(test),
        }
    }

    /// Tagger that fires when any single fingerprint satisfies `test`.
    pub fn any_fingerprint<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        test: F,
    ) -> Self
    where
        F: Fn(&Fingerprint) -> bool + Send + Sync + 'static,
    {
        Self::new(name, description, move |fps: &[Fingerprint]| {
            fps.iter().any(&test)
        })
    }

    /// Tagger that fires when a fingerprint of `fp_type` is present.
    pub fn has_type(
        name: impl Into<String>,
        description: impl Into<String>,
        fp_type: &'static str,
    ) -> Self {
        Self::any_fingerprint(name, description, move |fp| fp.fp_type() == fp_type)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn test(&self, fingerprints: &[Fingerprint]) -> bool {
        (self.test)(fingerprints)
    }

    pub(crate) fn to_tag(&self) -> Tag {
        Tag {
            name: self.name.clone(),
            description: self.description.clone(),
            severity: self.severity,
        }
    }
}

/// Evaluate taggers against one repository, in declaration order.
pub fn evaluate_taggers(defs: &[TaggerDefinition], fingerprints: &[Fingerprint]) -> Vec<Tag> {
    defs.iter()
        .filter(|def| def.test(fingerprints))
        .map(TaggerDefinition::to_tag)
        .collect()
}

/// Reject empty names/descriptions and names repeated within one tier.
pub(crate) fn validate_rule_names<'a>(
    tier: &'static str,
    rules: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for (name, description) in rules {
        if name.trim().is_empty() {
            return Err(ClassifyError::InvalidRule {
                name: name.to_string(),
                reason: "name must not be empty".to_string(),
            });
        }
        if description.trim().is_empty() {
            return Err(ClassifyError::InvalidRule {
                name: name.to_string(),
                reason: "description must not be empty".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ClassifyError::DuplicateRule {
                tier,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a single-repository tagger list.
pub fn validate_taggers(defs: &[TaggerDefinition]) -> Result<()> {
    validate_rule_names(
        "tagger",
        defs.iter()
            .map(|d| (d.name.as_str(), d.description.as_str())),
    )
}
