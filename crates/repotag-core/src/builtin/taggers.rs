//! Single-repository taggers shipped with repotag.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::freshest_commit;
use crate::aspect;
use crate::band::days_since;
use crate::config::TaggerParams;
use crate::domain::{Fingerprint, Payload, Severity};
use crate::tagger::TaggerDefinition;

/// The built-in tagger registry, in display order.
///
/// `as_of` is the instant date-based rules measure against.
pub fn taggers(params: &TaggerParams, as_of: DateTime<Utc>) -> Vec<TaggerDefinition> {
    vec![
        TaggerDefinition::has_type("vulnerable", "Has exposed secrets", aspect::EXPOSED_SECRET)
            .with_severity(Severity::Error),
        TaggerDefinition::has_type("docker", "Docker status", aspect::DOCKER_FROM),
        TaggerDefinition::has_type("node", "Node", aspect::NPM_DEPS),
        TaggerDefinition::has_type(
            "maven",
            "Direct Maven dependencies",
            aspect::DIRECT_MAVEN_DEPS,
        ),
        TaggerDefinition::has_type("typescript", "TypeScript version", aspect::TYPESCRIPT_VERSION),
        TaggerDefinition::has_type("tslint", "tslint (TypeScript)", aspect::TSLINT),
        TaggerDefinition::has_type("clojure", "Lein dependencies", aspect::LEIN_DEPS),
        TaggerDefinition::has_type(
            "spring-boot",
            "Spring Boot version",
            aspect::SPRING_BOOT_VERSION,
        ),
        TaggerDefinition::has_type("travis", "Travis CI script", aspect::TRAVIS_SCRIPTS),
        TaggerDefinition::has_type("python", "Python dependencies", aspect::PYTHON_DEPS),
        monorepo(),
        uses_node_library("angular", "Angular", |library| library.contains("angular")),
        uses_npm_package("react"),
        uses_npm_package("chai"),
        uses_npm_package("mocha"),
        ci_system("jenkins", "Jenkins", "jenkins"),
        ci_system("circleci", "circleci", "circle"),
        file_match(
            "azure-pipelines",
            "Azure pipelines files",
            |name, _| name.contains("azure-pipeline"),
        ),
        file_match("snyk", "Snyk policy", |_, glob| glob.contains("snyk")),
        file_match("csharp", "C# build", |name, _| name.contains("csproj")),
        inadequate_readme(params.min_readme_length),
        TaggerDefinition::any_fingerprint("solo", "Projects with one committer", |fp| {
            matches!(fp.payload(), Some(Payload::GitActives(1)))
        }),
        excessive_branch_count(params.max_branches),
        line_count(
            format!("huge (>{})", thousands(params.huge_lines)),
            {
                let huge = params.huge_lines;
                move |lines| lines > huge
            },
        ),
        line_count(
            format!(
                "big ({}-{})",
                thousands(params.big_lines),
                thousands(params.huge_lines)
            ),
            {
                let (big, huge) = (params.big_lines, params.huge_lines);
                move |lines| lines >= big && lines <= huge
            },
        ),
        line_count(format!("tiny (<{})", thousands(params.tiny_lines)), {
            let tiny = params.tiny_lines;
            move |lines| lines < tiny
        }),
        TaggerDefinition::has_type(
            "code-of-conduct",
            "Repositories should have a code of conduct",
            aspect::CODE_OF_CONDUCT,
        ),
        glob_present(
            "changelog",
            "Repositories should have a changelog",
            "CHANGELOG.md",
        ),
        glob_present(
            "contributing",
            "Repositories should have a contributing",
            "CONTRIBUTING.md",
        ),
        TaggerDefinition::any_fingerprint("license", "Repositories should have a license", |fp| {
            matches!(
                fp.payload(),
                Some(Payload::License { classification })
                    if !classification.is_empty() && classification != "None"
            )
        }),
        dead(params.dead_days, as_of),
    ]
}

/// Some fingerprint type was reported from two or more distinct sub-project paths.
fn monorepo() -> TaggerDefinition {
    TaggerDefinition::new(
        "monorepo",
        "Contains multiple virtual projects",
        |fps: &[Fingerprint]| {
            let mut paths: HashMap<&str, HashSet<&str>> = HashMap::new();
            for fp in fps {
                paths.entry(fp.fp_type()).or_default().insert(fp.path());
            }
            paths.values().any(|p| p.len() > 1)
        },
    )
    .with_severity(Severity::Warn)
}

/// Some npm dependency fingerprint names a library satisfying `pred`.
fn uses_node_library<F>(name: &str, description: &str, pred: F) -> TaggerDefinition
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    TaggerDefinition::any_fingerprint(name, description, move |fp| {
        fp.fp_type() == aspect::NPM_DEPS && pred(fp.name())
    })
}

fn uses_npm_package(library: &'static str) -> TaggerDefinition {
    uses_node_library(library, &format!("Uses npm library {library}"), move |name| {
        name == library
    })
}

fn ci_system(name: &str, description: &str, needle: &'static str) -> TaggerDefinition {
    TaggerDefinition::any_fingerprint(name, description, move |fp| {
        fp.fp_type() == aspect::CI
            && matches!(
                fp.payload(),
                Some(Payload::Ci(systems)) if systems.iter().any(|s| s.contains(needle))
            )
    })
}

/// A file-match fingerprint with at least one match whose name/glob satisfies `pred`.
fn file_match<F>(name: &str, description: &str, pred: F) -> TaggerDefinition
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    TaggerDefinition::any_fingerprint(name, description, move |fp| match fp.payload() {
        Some(Payload::FileMatch { glob, matches }) => matches > 0 && pred(fp.name(), &glob),
        _ => false,
    })
}

fn glob_present(name: &str, description: &str, pattern: &'static str) -> TaggerDefinition {
    TaggerDefinition::any_fingerprint(name, description, move |fp| {
        matches!(
            fp.payload(),
            Some(Payload::GlobMatch { glob, matches }) if glob == pattern && matches > 0
        )
    })
}

fn inadequate_readme(min_length: u64) -> TaggerDefinition {
    TaggerDefinition::any_fingerprint(
        "inadequate-readme",
        format!("README is shorter than {min_length} characters"),
        move |fp| matches!(fp.payload(), Some(Payload::Readme { length }) if length < min_length),
    )
    .with_severity(Severity::Warn)
}

fn excessive_branch_count(max_branches: u32) -> TaggerDefinition {
    let max = u64::from(max_branches);
    TaggerDefinition::any_fingerprint(format!(">{max_branches} branches"), "git branch count", move |fp| {
        matches!(fp.payload(), Some(Payload::BranchCount(count)) if count > max)
    })
    .with_severity(Severity::Warn)
}

fn line_count<F>(name: String, test: F) -> TaggerDefinition
where
    F: Fn(u64) -> bool + Send + Sync + 'static,
{
    TaggerDefinition::any_fingerprint(name, "Repo size", move |fp| {
        matches!(fp.payload(), Some(Payload::CodeMetrics { lines }) if test(lines))
    })
}

fn dead(dead_days: u32, as_of: DateTime<Utc>) -> TaggerDefinition {
    TaggerDefinition::new(
        "dead?",
        format!("No git activity in last {dead_days} days"),
        move |fps: &[Fingerprint]| {
            freshest_commit(fps).is_some_and(|at| days_since(at, as_of) > u64::from(dead_days))
        },
    )
    .with_severity(Severity::Error)
}

/// `10000` -> `10K`; values that are not whole thousands print as-is.
fn thousands(n: u64) -> String {
    if n >= 1_000 && n % 1_000 == 0 {
        format!("{}K", n / 1_000)
    } else {
        n.to_string()
    }
}
