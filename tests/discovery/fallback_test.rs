//! Rated fallback over leftover candidates.

use async_trait::async_trait;

use keyscout::discovery::{
    CandidateMatch, ColumnRef, DiscoveryConfig, DiscoveryPipeline, FallbackMatcher, MatchOrigin,
    OfflineRater, RelationshipRater, RelationshipVerifier, Strength,
};
use keyscout::source::SqliteSource;

/// Rates every pair the same.
struct FixedRater(Strength);

#[async_trait]
impl RelationshipRater for FixedRater {
    async fn rate(&self, matches: &[CandidateMatch]) -> Vec<Strength> {
        vec![self.0; matches.len()]
    }
}

/// Returns the wrong number of ratings.
struct ShortRater;

#[async_trait]
impl RelationshipRater for ShortRater {
    async fn rate(&self, _matches: &[CandidateMatch]) -> Vec<Strength> {
        vec![Strength::VeryStrong]
    }
}

fn billing() -> SqliteSource {
    let source = SqliteSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE customers (id INTEGER, name TEXT);
             INSERT INTO customers VALUES (1, 'acme'), (2, 'globex'), (3, 'initech');
             CREATE TABLE invoices (code TEXT, client_id INTEGER, agent_id INTEGER, client_ref INTEGER);
             INSERT INTO invoices VALUES ('a', 1, 40, 1), ('b', 1, 41, 1), ('c', 3, 40, 3);",
        )
        .unwrap();
    source
}

fn config() -> DiscoveryConfig {
    DiscoveryConfig::default()
}

#[tokio::test]
async fn test_strong_rating_recovers_unnamed_relationship() {
    let source = billing();
    let rater = FixedRater(Strength::VeryStrong);
    let outcome = DiscoveryPipeline::new(&source, &rater, config())
        .run()
        .await
        .unwrap();

    let verified: Vec<_> = outcome.verified().map(|(m, _)| m.clone()).collect();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].pk, ColumnRef::new("customers", "id"));
    assert_eq!(verified[0].fk, ColumnRef::new("invoices", "client_id"));
    assert_eq!(
        verified[0].origin,
        MatchOrigin::Fallback {
            strength: Strength::VeryStrong
        }
    );
}

#[tokio::test]
async fn test_very_weak_rating_excludes_pair() {
    let source = billing();
    let rater = FixedRater(Strength::VeryWeak);
    let outcome = DiscoveryPipeline::new(&source, &rater, config())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.verified_count(), 0);
}

#[tokio::test]
async fn test_very_weak_leftover_never_verified() {
    let source = billing();
    let verifier = RelationshipVerifier::new(&source);
    let rater = FixedRater(Strength::VeryWeak);
    let matcher = FallbackMatcher::new(&rater, &verifier);
    let pks = [ColumnRef::new("customers", "id")];
    let fks = [ColumnRef::new("invoices", "client_ref")];
    assert!(matcher.rated_candidates(&pks, &fks).await.is_empty());
    assert!(matcher.run(&pks, &fks).await.is_empty());

    // the same pair passes verification once rated high enough
    let normal = FixedRater(Strength::Normal);
    let accepted = FallbackMatcher::new(&normal, &verifier).run(&pks, &fks).await;
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].1.is_verified());
}

#[tokio::test]
async fn test_rating_alone_never_accepts() {
    // agent_id values are not customer ids
    let source = billing();
    let verifier = RelationshipVerifier::new(&source);
    let rater = FixedRater(Strength::VeryStrong);
    let accepted = FallbackMatcher::new(&rater, &verifier)
        .run(
            &[ColumnRef::new("customers", "id")],
            &[ColumnRef::new("invoices", "agent_id")],
        )
        .await;
    assert!(accepted.is_empty());
}

#[tokio::test]
async fn test_mismatched_rating_count_treated_as_weak() {
    let source = billing();
    let verifier = RelationshipVerifier::new(&source);
    let pks = [ColumnRef::new("customers", "id")];
    let fks = [
        ColumnRef::new("invoices", "client_id"),
        ColumnRef::new("invoices", "agent_id"),
    ];

    let at_normal = FallbackMatcher::new(&ShortRater, &verifier)
        .rated_candidates(&pks, &fks)
        .await;
    assert!(at_normal.is_empty());

    let at_weak = FallbackMatcher::new(&ShortRater, &verifier)
        .with_min_strength(Strength::Weak)
        .rated_candidates(&pks, &fks)
        .await;
    assert_eq!(at_weak.len(), 2);
    assert!(at_weak.iter().all(|m| m.origin
        == MatchOrigin::Fallback {
            strength: Strength::Weak
        }));
}

#[tokio::test]
async fn test_offline_rater_adds_nothing() {
    let source = billing();
    let outcome = DiscoveryPipeline::new(&source, &OfflineRater, config())
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.verified_count(), 0);
    assert_eq!(outcome.untracked_tables, vec!["invoices".to_string()]);
}
