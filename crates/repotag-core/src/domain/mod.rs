//! Domain models for repotag.
//!
//! Canonical definitions for the core entities:
//! - `Fingerprint`: one typed signal about a repository
//! - `RepositoryFingerprintSet`: every fingerprint for one repository
//! - `Tag`: a severity-graded classification

pub mod error;
pub mod fingerprint;
pub mod repo;
pub mod tag;

pub use error::{BandError, ClassifyError, Result};
pub use fingerprint::{Fingerprint, Payload};
pub use repo::{ExtractionFailure, RepoId, RepositoryFingerprintSet};
pub use tag::{Severity, Tag};
