use chrono::{DateTime, Duration, Utc};
use repotag_core::{
    aspect, compute_tag_context, fingerprint_usage, Classifier, ClassifierConfig, CombinationParams,
    CombinationTaggerDefinition, ExtractionFailure, Fingerprint, RepoId,
    RepositoryFingerprintSet, Severity, TagContext, TaggerDefinition, TaggerParams,
};
use serde_json::json;

fn as_of() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn classifier() -> Classifier {
    Classifier::new(ClassifierConfig::default(), as_of()).expect("default config is valid")
}

fn recency(days_ago: i64) -> Fingerprint {
    let at = as_of() - Duration::days(days_ago);
    Fingerprint::new(
        aspect::GIT_RECENCY,
        json!({"lastCommitTime": at.timestamp_millis()}),
    )
}

fn actives(count: u64) -> Fingerprint {
    Fingerprint::new(aspect::GIT_ACTIVES, json!({"count": count}))
}

fn repo(id: &str, fingerprints: Vec<Fingerprint>) -> RepositoryFingerprintSet {
    RepositoryFingerprintSet::new(RepoId::new(id), fingerprints)
}

fn distinct(id: &str, n: usize) -> RepositoryFingerprintSet {
    repo(
        id,
        (0..n)
            .map(|i| Fingerprint::new(format!("aspect-{i}"), json!({})))
            .collect(),
    )
}

#[test]
fn hot_fires_for_recent_commit_with_three_committers() {
    let cohort = vec![repo("org/hot", vec![recency(3), actives(3)])];
    let result = classifier().classify_cohort(&cohort);
    assert!(result.repositories[0].has_tag("hot"));

    let cold = vec![repo("org/cold", vec![recency(20), actives(3)])];
    let result = classifier().classify_cohort(&cold);
    assert!(!result.repositories[0].has_tag("hot"));
}

#[test]
fn dead_fires_with_error_severity_after_dead_days() {
    let cohort = vec![
        repo("org/dead", vec![recency(400)]),
        repo("org/alive", vec![recency(300)]),
    ];
    let result = classifier().classify_cohort(&cohort);

    let dead = result.get("org/dead").expect("dead repo classified");
    let tag = dead
        .tags
        .iter()
        .find(|t| t.name == "dead?")
        .expect("dead tag");
    assert_eq!(tag.severity, Severity::Error);
    assert_eq!(dead.highest_severity(), Some(Severity::Error));

    assert!(!result.get("org/alive").unwrap().has_tag("dead?"));
}

#[test]
fn dead_days_override_changes_threshold() {
    let config = ClassifierConfig {
        taggers: TaggerParams {
            dead_days: 200,
            ..TaggerParams::default()
        },
        ..ClassifierConfig::default()
    };
    let classifier = Classifier::new(config, as_of()).unwrap();
    let result = classifier.classify_cohort(&[repo("org/a", vec![recency(300)])]);
    assert!(result.repositories[0].has_tag("dead?"));
}

#[test]
fn not_understood_uses_cohort_average() {
    // Average distinct count: (5 + 6 + 13) / 3 = 8, threshold 6.
    let cohort = vec![distinct("org/five", 5), distinct("org/six", 6), distinct("org/thirteen", 13)];
    let result = classifier().classify_cohort(&cohort);

    assert_eq!(result.context.average_fingerprint_count, 8.0);
    assert!(result.get("org/five").unwrap().has_tag("not understood"));
    assert!(!result.get("org/six").unwrap().has_tag("not understood"));
    assert!(!result.get("org/thirteen").unwrap().has_tag("not understood"));
}

#[test]
fn cohort_average_is_order_independent() {
    let a = vec![distinct("a", 1), distinct("b", 4), distinct("c", 10)];
    let b = vec![distinct("c", 10), distinct("a", 1), distinct("b", 4)];
    assert_eq!(compute_tag_context(&a), compute_tag_context(&b));
}

#[test]
fn failed_extraction_is_excluded_and_reported() {
    let cohort = vec![
        distinct("org/a", 4),
        RepositoryFingerprintSet::failed(
            RepoId::new("org/broken"),
            ExtractionFailure::repository("clone failed"),
        ),
    ];
    let result = classifier().classify_cohort(&cohort);

    assert_eq!(result.context.average_fingerprint_count, 4.0);
    assert_eq!(result.context.repository_count, 1);
    assert_eq!(result.context.excluded_count, 1);

    let broken = result.get("org/broken").unwrap();
    assert!(broken.has_failures());
    assert_eq!(broken.failures[0].message, "clone failed");
}

#[test]
fn partial_failure_still_counts_toward_average() {
    let partial = distinct("org/partial", 2)
        .with_failure(ExtractionFailure::aspect("codeMetrics", "timeout"));
    let cohort = vec![partial, distinct("org/b", 4)];
    let ctx = compute_tag_context(&cohort);
    assert_eq!(ctx.repository_count, 2);
    assert_eq!(ctx.average_fingerprint_count, 3.0);
}

#[test]
fn empty_set_gets_full_pass_without_data_dependent_tags() {
    let result = classifier().classify_repository(&repo("org/empty", vec![]), &TagContext::empty());
    assert!(result.tags.is_empty());
}

#[test]
fn empty_cohort_yields_zero_average_and_no_not_understood() {
    let ctx = compute_tag_context(&Vec::<RepositoryFingerprintSet>::new());
    assert_eq!(ctx.average_fingerprint_count, 0.0);

    let result = classifier().classify_repository(&repo("org/x", vec![]), &ctx);
    assert!(!result.has_tag("not understood"));
}

#[test]
fn monorepo_needs_distinct_paths() {
    let multi = repo(
        "org/mono",
        vec![
            Fingerprint::new(aspect::NPM_DEPS, json!({})).at_path("packages/a"),
            Fingerprint::new(aspect::NPM_DEPS, json!({})).at_path("packages/b"),
        ],
    );
    let flat = repo(
        "org/flat",
        vec![
            Fingerprint::new(aspect::NPM_DEPS, json!({})),
            Fingerprint::new(aspect::DOCKER_FROM, json!({})),
        ],
    );
    let result = classifier().classify_cohort(&[multi, flat]);

    let mono = result.get("org/mono").unwrap();
    let tag = mono.tags.iter().find(|t| t.name == "monorepo").unwrap();
    assert_eq!(tag.severity, Severity::Warn);
    assert!(!result.get("org/flat").unwrap().has_tag("monorepo"));
}

#[test]
fn malformed_payload_is_treated_as_missing() {
    let result = classifier().classify_repository(
        &repo(
            "org/odd",
            vec![
                Fingerprint::new(aspect::GIT_RECENCY, json!({"lastCommitTime": "long ago"})),
                Fingerprint::new(aspect::BRANCH_COUNT, json!({"branches": 99})),
            ],
        ),
        &TagContext::empty(),
    );
    assert!(!result.has_tag("dead?"));
    assert!(!result.tags.iter().any(|t| t.name.contains("branches")));
}

#[test]
fn tags_follow_declaration_order_then_combinations() {
    let fps = vec![
        actives(3),
        recency(2),
        Fingerprint::new(aspect::DOCKER_FROM, json!({})),
        Fingerprint::new(aspect::EXPOSED_SECRET, json!({})),
    ];
    let result = classifier().classify_cohort(&[repo("org/a", fps)]);
    let names: Vec<&str> = result.repositories[0]
        .tags
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["vulnerable", "docker", "hot"]);
}

#[test]
fn npm_libraries_are_tagged_after_node_and_monorepo() {
    let dep = |name: &str, path: &str| {
        Fingerprint::new(aspect::NPM_DEPS, json!({"version": "1.0.0"}))
            .named(name)
            .at_path(path)
    };
    let fps = vec![
        dep("react", "packages/web"),
        dep("mocha", "packages/api"),
        dep("chai", "packages/api"),
    ];
    let result = classifier().classify_cohort(&[repo("org/shop", fps)]);
    let names: Vec<&str> = result.repositories[0]
        .tags
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["node", "monorepo", "react", "chai", "mocha"]);
}

#[test]
fn fingerprint_usage_skips_failed_repositories() {
    let cohort = vec![
        repo("org/a", vec![Fingerprint::new(aspect::CI, json!(["jenkins"]))]),
        repo("org/b", vec![Fingerprint::new(aspect::CI, json!(["circle"]))]),
        RepositoryFingerprintSet::failed(
            RepoId::new("org/broken"),
            ExtractionFailure::repository("clone failed"),
        ),
    ];
    let usage = fingerprint_usage(&cohort);
    assert_eq!(usage.projects_analyzed, 2);
    let ci = usage.get(aspect::CI, aspect::CI).unwrap();
    assert_eq!((ci.appears_in, ci.variants), (2, 2));
}

#[test]
fn extension_combination_tagger_sees_context() {
    let above_average = CombinationTaggerDefinition::new(
        "well understood",
        "More aspects than the cohort average",
        |fps: &[Fingerprint], ctx: &TagContext| {
            fps.len() as f64 > ctx.average_fingerprint_count
        },
    );
    let classifier = classifier()
        .with_combination_taggers(vec![above_average])
        .unwrap();
    let result = classifier.classify_cohort(&[distinct("a", 2), distinct("b", 6)]);
    assert!(!result.get("a").unwrap().has_tag("well understood"));
    assert!(result.get("b").unwrap().has_tag("well understood"));
}

#[test]
fn malformed_rules_fail_before_classification() {
    let err = Classifier::with_rules(
        ClassifierConfig::default(),
        as_of(),
        vec![TaggerDefinition::has_type("", "no name", "ci")],
        vec![],
        vec![],
    );
    assert!(err.is_err());

    let config = ClassifierConfig {
        combinations: CombinationParams {
            min_average_aspect_count_fraction_to_expect: -1.0,
            ..CombinationParams::default()
        },
        ..ClassifierConfig::default()
    };
    assert!(Classifier::new(config, as_of()).is_err());
}

#[test]
fn cohort_summary_counts_and_severity_filter() {
    let cohort = vec![
        repo("org/a", vec![recency(400)]),
        repo("org/b", vec![recency(500)]),
        repo("org/c", vec![recency(1)]),
    ];
    let result = classifier().classify_cohort(&cohort);
    assert_eq!(result.tag_counts().get("dead?"), Some(&2));
    let errored: Vec<&str> = result
        .with_severity(Severity::Error)
        .map(|r| r.repo_id.as_str())
        .collect();
    assert_eq!(errored, vec!["org/a", "org/b"]);
}
