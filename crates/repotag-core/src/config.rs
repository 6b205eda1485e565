//! Classifier configuration.
//!
//! Built once at the entry point (defaults, TOML, or field overrides) and
//! passed down by reference. Every field has a documented default, so a
//! partial TOML file only overrides what it names.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ClassifyError, Result};

/// Thresholds for single-repository taggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerParams {
    /// Branch counts above this are called out.
    pub max_branches: u32,
    /// Days without a commit after which a repository is considered dead.
    pub dead_days: u32,
    /// Line counts above this are "huge".
    pub huge_lines: u64,
    /// Line counts at or above this (and not huge) are "big".
    pub big_lines: u64,
    /// Line counts below this are "tiny".
    pub tiny_lines: u64,
    /// READMEs shorter than this are inadequate.
    pub min_readme_length: u64,
}

impl Default for TaggerParams {
    fn default() -> Self {
        Self {
            max_branches: 20,
            dead_days: 365,
            huge_lines: 10_000,
            big_lines: 3_000,
            tiny_lines: 200,
            min_readme_length: 200,
        }
    }
}

/// Thresholds for combination taggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationParams {
    /// Fraction of the cohort's average distinct-type count below which a
    /// repository is "not understood".
    pub min_average_aspect_count_fraction_to_expect: f64,
    /// A repository committed to within this many days may be hot.
    pub hot_days: u32,
    /// Minimum active committers for a hot repository.
    pub hot_contributors: u32,
}

impl Default for CombinationParams {
    fn default() -> Self {
        Self {
            min_average_aspect_count_fraction_to_expect: 0.75,
            hot_days: 10,
            hot_contributors: 2,
        }
    }
}

/// Weights and limits for the built-in commit risk scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRiskParams {
    pub file_change_limit: usize,
    pub file_change_weight: f64,
    /// Build descriptor whose modification is risky, e.g. `pom.xml`.
    pub build_descriptor: String,
    pub build_descriptor_weight: f64,
    pub exposed_secret_weight: f64,
}

impl Default for CommitRiskParams {
    fn default() -> Self {
        Self {
            file_change_limit: 2,
            file_change_weight: 1.0,
            build_descriptor: "pom.xml".to_string(),
            build_descriptor_weight: 1.0,
            exposed_secret_weight: 5.0,
        }
    }
}

/// Complete configuration for a classification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub taggers: TaggerParams,
    pub combinations: CombinationParams,
    pub commit_risk: CommitRiskParams,
}

impl ClassifierConfig {
    /// Parse from TOML; missing sections and fields keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml(&s)
    }

    /// Reject values no threshold could sensibly mean.
    pub fn validate(&self) -> Result<()> {
        let fraction = self.combinations.min_average_aspect_count_fraction_to_expect;
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(ClassifyError::InvalidConfig(format!(
                "min_average_aspect_count_fraction_to_expect must be a non-negative number, got {fraction}"
            )));
        }

        let risk = &self.commit_risk;
        for (field, weight) in [
            ("file_change_weight", risk.file_change_weight),
            ("build_descriptor_weight", risk.build_descriptor_weight),
            ("exposed_secret_weight", risk.exposed_secret_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ClassifyError::InvalidConfig(format!(
                    "{field} must be a non-negative number, got {weight}"
                )));
            }
        }
        if risk.build_descriptor.trim().is_empty() {
            return Err(ClassifyError::InvalidConfig(
                "build_descriptor must not be empty".to_string(),
            ));
        }

        let t = &self.taggers;
        if t.big_lines > t.huge_lines {
            return Err(ClassifyError::InvalidConfig(format!(
                "big_lines ({}) must not exceed huge_lines ({})",
                t.big_lines, t.huge_lines
            )));
        }
        if t.tiny_lines > t.big_lines {
            return Err(ClassifyError::InvalidConfig(format!(
                "tiny_lines ({}) must not exceed big_lines ({})",
                t.tiny_lines, t.big_lines
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let c = ClassifierConfig::default();
        assert_eq!(c.taggers.max_branches, 20);
        assert_eq!(c.taggers.dead_days, 365);
        assert_eq!(c.combinations.min_average_aspect_count_fraction_to_expect, 0.75);
        assert_eq!(c.combinations.hot_days, 10);
        assert_eq!(c.combinations.hot_contributors, 2);
        assert_eq!(c.commit_risk.file_change_limit, 2);
        assert_eq!(c.commit_risk.build_descriptor, "pom.xml");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let c = ClassifierConfig::from_toml(
            r#"
[taggers]
dead_days = 180

[combinations]
hot_contributors = 5
"#,
        )
        .unwrap();
        assert_eq!(c.taggers.dead_days, 180);
        assert_eq!(c.taggers.max_branches, 20);
        assert_eq!(c.combinations.hot_contributors, 5);
        assert_eq!(c.combinations.hot_days, 10);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            ClassifierConfig::from_toml("").unwrap(),
            ClassifierConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ClassifierConfig::from_toml(
            "[combinations]\nmin_average_aspect_count_fraction_to_expect = -0.5\n",
        )
        .unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidConfig(_)));

        let err = ClassifierConfig::from_toml("[commit_risk]\nbuild_descriptor = \"\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("build_descriptor"));

        let err = ClassifierConfig::from_toml("[taggers]\nbig_lines = 20000\n").unwrap_err();
        assert!(err.to_string().contains("big_lines"));

        let err = ClassifierConfig::from_toml("[taggers]\ntiny_lines = 5000\n").unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidConfig(_)));
        assert!(err.to_string().contains("tiny_lines"));

        // Equal thresholds stay disjoint: tiny is strict, big is inclusive.
        assert!(ClassifierConfig::from_toml("[taggers]\ntiny_lines = 3000\n").is_ok());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = ClassifierConfig::from_toml("[taggers\n").unwrap_err();
        assert!(matches!(err, ClassifyError::ConfigParse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repotag.toml");
        std::fs::write(&path, "[taggers]\nmax_branches = 7\n").unwrap();
        let c = ClassifierConfig::from_file(&path).unwrap();
        assert_eq!(c.taggers.max_branches, 7);
    }
}
