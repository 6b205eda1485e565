//! Fingerprints: typed signals extracted from one repository.
//!
//! A [`Fingerprint`] is produced by an external aspect and never mutated here.
//! Its `data` payload is kept as raw JSON; rules narrow it through
//! [`Fingerprint::payload`], which checks the shape for the known types and
//! returns `None` when a payload is malformed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aspect;

/// Wire form of a fingerprint, before `name` defaulting.
#[derive(Debug, Clone, Deserialize)]
struct RawFingerprint {
    #[serde(rename = "type")]
    fp_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    data: Value,
}

/// One typed signal about one repository, or a sub-project within it.
///
/// `(type, name, path)` identifies a fingerprint within one extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFingerprint")]
pub struct Fingerprint {
    #[serde(rename = "type")]
    fp_type: String,
    name: String,
    path: String,
    data: Value,
}

impl From<RawFingerprint> for Fingerprint {
    fn from(raw: RawFingerprint) -> Self {
        let name = match raw.name {
            Some(n) if !n.is_empty() => n,
            _ => raw.fp_type.clone(),
        };
        Self {
            fp_type: raw.fp_type,
            name,
            path: raw.path.unwrap_or_default(),
            data: raw.data,
        }
    }
}

impl Fingerprint {
    /// Create a root-level fingerprint whose name is its type.
    pub fn new(fp_type: impl Into<String>, data: Value) -> Self {
        let fp_type = fp_type.into();
        Self {
            name: fp_type.clone(),
            fp_type,
            path: String::new(),
            data,
        }
    }

    /// Override the fingerprint name. An empty name falls back to the type.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() {
            self.fp_type.clone()
        } else {
            name
        };
        self
    }

    /// Place the fingerprint under a sub-project path.
    pub fn at_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn fp_type(&self) -> &str {
        &self.fp_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sub-project path; empty means the repository root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// The `(type, name, path)` identity triple.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.fp_type, &self.name, &self.path)
    }

    /// Narrow the payload to its schema for known types.
    ///
    /// Unknown types are [`Payload::Opaque`]. A known type whose data does not
    /// have the expected shape yields `None`, which rules treat exactly like an
    /// absent fingerprint.
    pub fn payload(&self) -> Option<Payload> {
        match self.fp_type.as_str() {
            aspect::GIT_RECENCY => git_recency(&self.data).map(Payload::GitRecency),
            aspect::GIT_ACTIVES => count_of(&self.data).map(Payload::GitActives),
            aspect::BRANCH_COUNT => count_of(&self.data).map(Payload::BranchCount),
            aspect::CODE_METRICS => code_metrics(&self.data),
            aspect::CI => string_list(&self.data).map(Payload::Ci),
            aspect::FILE_MATCH => {
                file_matches(&self.data).map(|(glob, matches)| Payload::FileMatch { glob, matches })
            }
            aspect::GLOB => {
                file_matches(&self.data).map(|(glob, matches)| Payload::GlobMatch { glob, matches })
            }
            aspect::LICENSE => license(&self.data),
            aspect::README => self
                .data
                .get("length")
                .and_then(Value::as_u64)
                .map(|length| Payload::Readme { length }),
            _ => Some(Payload::Opaque),
        }
    }
}

/// Typed payloads for the fingerprint types rules destructure.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Time of the most recent commit on the default branch.
    GitRecency(DateTime<Utc>),
    /// Number of recently active committers.
    GitActives(u64),
    /// Number of git branches.
    BranchCount(u64),
    /// Total lines of code; other metric keys are ignored.
    CodeMetrics { lines: u64 },
    /// CI systems detected, e.g. `["jenkins", "circle"]`.
    Ci(Vec<String>),
    FileMatch { glob: String, matches: usize },
    GlobMatch { glob: String, matches: usize },
    License { classification: String },
    Readme { length: u64 },
    /// A type this crate does not destructure; matched by identity only.
    Opaque,
}

/// `{"lastCommitTime": <epoch millis>}` or an RFC 3339 string.
fn git_recency(data: &Value) -> Option<DateTime<Utc>> {
    match data {
        Value::Object(map) => map
            .get("lastCommitTime")
            .and_then(Value::as_i64)
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        _ => None,
    }
}

fn count_of(data: &Value) -> Option<u64> {
    data.get("count").and_then(Value::as_u64)
}

fn code_metrics(data: &Value) -> Option<Payload> {
    let lines = data.get("lines").and_then(Value::as_u64)?;
    Some(Payload::CodeMetrics { lines })
}

fn string_list(data: &Value) -> Option<Vec<String>> {
    match data {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn file_matches(data: &Value) -> Option<(String, usize)> {
    let matches = data.get("matches").and_then(Value::as_array)?.len();
    let glob = data
        .get("glob")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((glob, matches))
}

fn license(data: &Value) -> Option<Payload> {
    let classification = data.get("classification").and_then(Value::as_str)?;
    Some(Payload::License {
        classification: classification.to_string(),
    })
}
