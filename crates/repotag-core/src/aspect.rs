//! Fingerprint type names emitted by the extraction aspects.
//!
//! Aspects live outside this crate; these are the identifiers the built-in
//! rules match on.

pub const GIT_RECENCY: &str = "git-recency";
pub const GIT_ACTIVES: &str = "gitActives";
pub const BRANCH_COUNT: &str = "branch-count";
pub const CODE_METRICS: &str = "codeMetrics";
pub const CI: &str = "ci";
pub const FILE_MATCH: &str = "file-match";
pub const GLOB: &str = "glob";
pub const LICENSE: &str = "license";
pub const README: &str = "readme";
pub const EXPOSED_SECRET: &str = "exposed-secret";
pub const DOCKER_FROM: &str = "docker-base-image";
pub const NPM_DEPS: &str = "npm-project-deps";
pub const DIRECT_MAVEN_DEPS: &str = "direct-maven-dependencies";
pub const TYPESCRIPT_VERSION: &str = "typescript-version";
pub const TSLINT: &str = "tslint";
pub const LEIN_DEPS: &str = "lein-project";
pub const SPRING_BOOT_VERSION: &str = "spring-boot-version";
pub const TRAVIS_SCRIPTS: &str = "travis-scripts";
pub const PYTHON_DEPS: &str = "python-dependencies";
pub const CODE_OF_CONDUCT: &str = "codeOfConduct";
