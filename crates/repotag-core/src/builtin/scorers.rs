//! Commit risk scorers shipped with repotag.

use crate::aspect;
use crate::config::CommitRiskParams;
use crate::risk::{CommitRiskScorer, FileChangeCount, FileChanged, FingerprintPresent};

/// The built-in scorer registry: file-change count, build descriptor
/// modified, exposed secrets introduced.
pub fn commit_risk_scorers(params: &CommitRiskParams) -> Vec<Box<dyn CommitRiskScorer>> {
    vec![
        Box::new(FileChangeCount {
            limit_to: params.file_change_limit,
            weight: params.file_change_weight,
        }),
        Box::new(FileChanged::new(
            params.build_descriptor.clone(),
            params.build_descriptor_weight,
        )),
        Box::new(FingerprintPresent {
            fp_type: aspect::EXPOSED_SECRET.to_string(),
            weight: params.exposed_secret_weight,
        }),
    ]
}
