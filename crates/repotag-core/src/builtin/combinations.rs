//! Combination taggers shipped with repotag.

use chrono::{DateTime, Utc};

use super::{freshest_commit, max_active_committers};
use crate::band::days_since;
use crate::cohort::TagContext;
use crate::combination::CombinationTaggerDefinition;
use crate::config::CombinationParams;
use crate::domain::repo::distinct_type_count;
use crate::domain::{Fingerprint, Severity};

/// The built-in combination tagger registry, in display order.
pub fn combination_taggers(
    params: &CombinationParams,
    as_of: DateTime<Utc>,
) -> Vec<CombinationTaggerDefinition> {
    vec![not_understood(params), hot(params, as_of)]
}

/// Fewer distinct fingerprint types than a fraction of the cohort average.
fn not_understood(params: &CombinationParams) -> CombinationTaggerDefinition {
    let fraction = params.min_average_aspect_count_fraction_to_expect;
    CombinationTaggerDefinition::new(
        "not understood",
        "You may want to write aspects for these outlier projects",
        move |fps: &[Fingerprint], ctx: &TagContext| {
            if ctx.average_fingerprint_count <= 0.0 {
                return false;
            }
            let threshold = ctx.average_fingerprint_count * fraction;
            (distinct_type_count(fps) as f64) < threshold
        },
    )
    .with_severity(Severity::Warn)
}

/// Recently committed to by several people.
fn hot(params: &CombinationParams, as_of: DateTime<Utc>) -> CombinationTaggerDefinition {
    let hot_days = u64::from(params.hot_days);
    let hot_contributors = u64::from(params.hot_contributors);
    CombinationTaggerDefinition::new(
        "hot",
        "How hot is git",
        move |fps: &[Fingerprint], _: &TagContext| {
            let (Some(last), Some(committers)) = (freshest_commit(fps), max_active_committers(fps))
            else {
                return false;
            };
            days_since(last, as_of) < hot_days && committers >= hot_contributors
        },
    )
}
