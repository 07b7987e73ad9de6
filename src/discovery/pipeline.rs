//! Discovery driver.

use tracing::info;

use super::fallback::{unused_candidates, FallbackMatcher};
use super::keys::KeyClassifier;
use super::naming::match_candidates;
use super::rating::RelationshipRater;
use super::verify::RelationshipVerifier;
use super::{DiscoveryConfig, DiscoveryOutcome, DiscoveryResult};
use crate::source::Datasource;

/// Runs classification, name matching, verification and the rated fallback
/// in order, one query at a time.
pub struct DiscoveryPipeline<'a> {
    source: &'a dyn Datasource,
    rater: &'a dyn RelationshipRater,
    config: DiscoveryConfig,
}

impl<'a> DiscoveryPipeline<'a> {
    pub fn new(
        source: &'a dyn Datasource,
        rater: &'a dyn RelationshipRater,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            source,
            rater,
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub async fn run(&self) -> DiscoveryResult<DiscoveryOutcome> {
        let candidates = KeyClassifier::new(self.source)
            .with_auto_increment_ratio(self.config.auto_increment_ratio)
            .discover()
            .await?;

        let matches = match_candidates(
            &candidates.pk_candidates,
            &candidates.fk_candidates,
            self.config.name_normalization,
        );
        info!(matches = matches.len(), "name matching complete");

        let verifier = RelationshipVerifier::new(self.source)
            .with_integrity_threshold(self.config.integrity_threshold);
        let results = verifier.verify_all(&matches).await;

        let mut outcome = DiscoveryOutcome {
            pk_candidates: candidates.pk_candidates,
            fk_candidates: candidates.fk_candidates,
            untracked_tables: candidates.untracked_tables,
            matches,
            results,
        };
        info!(
            verified = outcome.verified_count(),
            candidates = outcome.matches.len(),
            "name-matched verification complete"
        );

        if self.config.fallback_enabled {
            let (unused_pks, unused_fks) = unused_candidates(
                &outcome.pk_candidates,
                &outcome.fk_candidates,
                outcome.verified().map(|(m, _)| m),
            );
            let accepted = FallbackMatcher::new(self.rater, &verifier)
                .with_min_strength(self.config.min_strength)
                .run(&unused_pks, &unused_fks)
                .await;
            for (candidate, result) in accepted {
                outcome.matches.push(candidate);
                outcome.results.push(result);
            }
        }

        info!(
            pk_candidates = outcome.pk_candidates.len(),
            fk_candidates = outcome.fk_candidates.len(),
            untracked = outcome.untracked_tables.len(),
            verified = outcome.verified_count(),
            "discovery complete"
        );
        Ok(outcome)
    }
}
