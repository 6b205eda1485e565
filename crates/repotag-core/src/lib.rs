//! repotag core library
//!
//! Classifies a cohort of repositories from their fingerprints: single-repository
//! taggers, a cohort statistics pass, combination taggers that see the cohort
//! context, value banding, and commit risk scoring.

pub mod aspect;
pub mod band;
pub mod builtin;
pub mod classify;
pub mod cohort;
pub mod combination;
pub mod config;
pub mod domain;
pub mod obs;
pub mod report;
pub mod risk;
pub mod store;
pub mod tagger;
pub mod telemetry;

pub use band::{
    age_bands, band_for, count_bands, days_since, recency_band, size_bands, Band, BandLimit,
    BandOptions, Bands,
};
pub use classify::{Classifier, CohortClassification, RepoClassification};
pub use cohort::{
    compute_tag_context, fingerprint_usage, CohortFingerprintUsage, FingerprintUsage, TagContext,
};
pub use combination::{
    evaluate_combination_taggers, validate_combination_taggers, CombinationTaggerDefinition,
};
pub use config::{ClassifierConfig, CombinationParams, CommitRiskParams, TaggerParams};
pub use domain::{
    BandError, ClassifyError, ExtractionFailure, Fingerprint, Payload, RepoId,
    RepositoryFingerprintSet, Result, Severity, Tag,
};
pub use report::{
    read_classification_artifact, render_classification_md, write_classification_artifact,
};
pub use risk::{
    score, CommitRiskInputs, CommitRiskScore, CommitRiskScorer, FileChangeCount, FileChanged,
    FingerprintPresent, FnScorer, IndicatorSet, ScoreContribution,
};
pub use store::{CohortLoader, DirectoryStore, FingerprintStore, InMemoryStore};
pub use tagger::{evaluate_taggers, validate_taggers, TaggerDefinition};
pub use telemetry::init_tracing;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
