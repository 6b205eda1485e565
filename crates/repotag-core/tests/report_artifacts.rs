use chrono::{DateTime, Utc};
use repotag_core::{
    aspect, read_classification_artifact, render_classification_md,
    write_classification_artifact, Classifier, ClassifierConfig, ClassifyError,
    CohortClassification, ExtractionFailure, Fingerprint, RepoId, RepositoryFingerprintSet,
};
use serde_json::json;
use tempfile::tempdir;

fn sample() -> CohortClassification {
    let as_of = DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    let cohort = vec![
        RepositoryFingerprintSet::new(
            RepoId::new("org/api"),
            vec![
                Fingerprint::new(aspect::DOCKER_FROM, json!({})),
                Fingerprint::new(aspect::EXPOSED_SECRET, json!({})),
            ],
        ),
        RepositoryFingerprintSet::failed(
            RepoId::new("org/gone"),
            ExtractionFailure::repository("404"),
        ),
    ];
    Classifier::new(ClassifierConfig::default(), as_of)
        .unwrap()
        .classify_cohort(&cohort)
}

#[test]
fn artifact_round_trips_with_digest() {
    let dir = tempdir().unwrap();
    let classification = sample();
    let path = write_classification_artifact(&classification, dir.path()).unwrap();
    assert!(path.ends_with("classification.json"));

    let run_id = classification.run_id.to_string();
    assert!(dir.path().join(&run_id).join("classification.digest").exists());

    let loaded = read_classification_artifact(&run_id, dir.path()).unwrap();
    assert_eq!(loaded, classification);
}

#[test]
fn tampered_artifact_is_rejected() {
    let dir = tempdir().unwrap();
    let classification = sample();
    let path = write_classification_artifact(&classification, dir.path()).unwrap();

    let mut body = std::fs::read_to_string(&path).unwrap();
    body = body.replace("org/api", "org/evil");
    std::fs::write(&path, body).unwrap();

    let err = read_classification_artifact(&classification.run_id.to_string(), dir.path())
        .unwrap_err();
    assert!(matches!(err, ClassifyError::DigestMismatch { .. }));
}

#[test]
fn markdown_lists_errors_first_and_flags_failures() {
    let md = render_classification_md(&sample());
    assert!(md.starts_with("# Classification Summary"));
    assert!(md.contains("- `docker`: 1"));
    assert!(md.contains("- **org/api**: vulnerable (error), docker (info)"));
    assert!(md.contains("- **org/gone**: - _(extraction failures: 1)_"));
    assert!(md.contains("excluded from cohort average: 1"));
}
