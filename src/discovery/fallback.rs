//! Exhaustive fallback over keys left unused by name matching.
//!
//! Leftover pk and fk candidates are cross-matched, the whole batch is rated
//! once, and pairs rated at least the minimum strength are verified again.
//! A rating alone never accepts a relationship.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::rating::{RelationshipRater, Strength};
use super::verify::RelationshipVerifier;
use super::{CandidateMatch, ColumnRef, MatchOrigin, VerificationResult};

/// PK candidates never on the pk side of a verified match, and FK candidates
/// never on the fk side. Input order is preserved.
pub fn unused_candidates<'m>(
    pk_candidates: &[ColumnRef],
    fk_candidates: &[ColumnRef],
    verified: impl IntoIterator<Item = &'m CandidateMatch>,
) -> (Vec<ColumnRef>, Vec<ColumnRef>) {
    let mut used_pks = HashSet::new();
    let mut used_fks = HashSet::new();
    for m in verified {
        used_pks.insert(&m.pk);
        used_fks.insert(&m.fk);
    }
    let unused_pks = pk_candidates
        .iter()
        .filter(|c| !used_pks.contains(c))
        .cloned()
        .collect();
    let unused_fks = fk_candidates
        .iter()
        .filter(|c| !used_fks.contains(c))
        .cloned()
        .collect();
    (unused_pks, unused_fks)
}

/// Every (pk, fk) pair across different tables, pk-major.
pub fn cross_match(pks: &[ColumnRef], fks: &[ColumnRef]) -> Vec<CandidateMatch> {
    pks.iter()
        .flat_map(|pk| {
            fks.iter()
                .filter(move |fk| fk.table != pk.table)
                .map(move |fk| CandidateMatch::new(pk.clone(), fk.clone()))
        })
        .collect()
}

/// Rates leftover pairs and re-verifies the promising ones.
pub struct FallbackMatcher<'a> {
    rater: &'a dyn RelationshipRater,
    verifier: &'a RelationshipVerifier<'a>,
    min_strength: Strength,
}

impl<'a> FallbackMatcher<'a> {
    pub fn new(rater: &'a dyn RelationshipRater, verifier: &'a RelationshipVerifier<'a>) -> Self {
        Self {
            rater,
            verifier,
            min_strength: Strength::Normal,
        }
    }

    pub fn with_min_strength(mut self, min_strength: Strength) -> Self {
        self.min_strength = min_strength;
        self
    }

    /// Rate the cross product once and keep pairs at or above the minimum
    /// strength, tagged with their rating.
    pub async fn rated_candidates(
        &self,
        unused_pks: &[ColumnRef],
        unused_fks: &[ColumnRef],
    ) -> Vec<CandidateMatch> {
        if unused_pks.is_empty() || unused_fks.is_empty() {
            return Vec::new();
        }
        let batch = cross_match(unused_pks, unused_fks);
        if batch.is_empty() {
            return Vec::new();
        }

        let mut ratings = self.rater.rate(&batch).await;
        if ratings.len() != batch.len() {
            warn!(
                expected = batch.len(),
                received = ratings.len(),
                "rating count mismatch, treating all pairs as weak"
            );
            ratings = Strength::unavailable(batch.len());
        }

        batch
            .into_iter()
            .zip(ratings)
            .filter_map(|(candidate, strength)| {
                debug!(candidate = %candidate, %strength, "rated");
                (strength >= self.min_strength)
                    .then(|| candidate.with_origin(MatchOrigin::Fallback { strength }))
            })
            .collect()
    }

    /// Verified fallback matches with their results.
    pub async fn run(
        &self,
        unused_pks: &[ColumnRef],
        unused_fks: &[ColumnRef],
    ) -> Vec<(CandidateMatch, VerificationResult)> {
        let survivors = self.rated_candidates(unused_pks, unused_fks).await;
        let tried = survivors.len();

        let mut accepted = Vec::new();
        for candidate in survivors {
            let result = self.verifier.verify(&candidate).await;
            if result.is_verified() {
                accepted.push((candidate, result));
            }
        }

        info!(
            rated_above_minimum = tried,
            verified = accepted.len(),
            "fallback complete"
        );
        accepted
    }
}
