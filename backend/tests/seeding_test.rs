mod helpers;

use helpers::*;
use secret_santa_backend::config::SlugCollisionPolicy;
use secret_santa_backend::error::{AppError, IngestError};
use secret_santa_backend::ingest::SkipReason;
use secret_santa_backend::models::WishlistKey;
use secret_santa_backend::services::DroppedPairReason;

// ============================================================================
// Family Seeding Tests
// ============================================================================

#[tokio::test]
async fn test_seed_family_creates_cycle() {
    let ctx = TestContext::new();

    let report = ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    assert_eq!(report.family.slug, "rossi");
    assert_eq!(report.family.name, "rossi");
    assert_eq!(report.members.len(), 3);
    assert_eq!(report.assignments.len(), 3);
    assert!(report.skipped_rows.is_empty());
    assert!(report.dropped_pairs.is_empty());

    let slugs: Vec<&str> = report.members.iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(slugs, vec!["ana", "luis", "marta"]);
    assert!(report.members.iter().all(|m| m.created));
    assert_eq!(
        report.members[0].url,
        "https://santa.example.com/families/rossi/ana"
    );

    let view = ctx.lookup.member_view("rossi", "ana").await.unwrap();
    assert_eq!(view.member.name, "Ana");
    assert_eq!(view.wishlist, "");
    let receiver = view.receiver.expect("Ana should have a receiver");
    assert_eq!(receiver.member.name, "Luis");
    assert_eq!(receiver.wishlist, "");

    // Every member got an empty wishlist row
    assert_eq!(ctx.store.wishlist_count().await, 3);
}

#[tokio::test]
async fn test_seed_family_uses_display_name_for_new_family() {
    let ctx = TestContext::new();

    let first = ctx
        .seeding
        .seed_family(ROSSI_CSV, Some("The Rossi Family"))
        .await
        .unwrap();
    assert_eq!(first.family.name, "The Rossi Family");

    // An existing family is never renamed
    let second = ctx
        .seeding
        .seed_family(ROSSI_CSV, Some("Someone Else"))
        .await
        .unwrap();
    assert_eq!(second.family.id, first.family.id);
    assert_eq!(second.family.name, "The Rossi Family");
}

#[tokio::test]
async fn test_reseed_is_idempotent_for_members() {
    let ctx = TestContext::new();

    let first = ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();
    let second = ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    assert_eq!(first.family.id, second.family.id);
    for (before, after) in first.members.iter().zip(second.members.iter()) {
        assert_eq!(before.id, after.id);
        assert!(!after.created);
    }

    let members = ctx
        .stores
        .members
        .list_by_family(first.family.id)
        .await
        .unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(ctx.store.wishlist_count().await, 3);
}

#[tokio::test]
async fn test_reseed_replaces_assignments() {
    let ctx = TestContext::new();

    let first = ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();
    let second = ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    let stored = ctx
        .stores
        .assignments
        .list_by_family(first.family.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);

    // Same edges, fresh rows
    let mut first_edges: Vec<_> = first.assignments.iter().map(|a| a.edge()).collect();
    let mut second_edges: Vec<_> = second.assignments.iter().map(|a| a.edge()).collect();
    first_edges.sort();
    second_edges.sort();
    assert_eq!(first_edges, second_edges);

    for old in &first.assignments {
        assert!(stored.iter().all(|a| a.id != old.id));
    }
}

#[tokio::test]
async fn test_reseed_keeps_wishlist_content() {
    let ctx = TestContext::new();
    ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    ctx.lookup
        .save_wishlist_by_slug("rossi", "luis", "socks")
        .await
        .unwrap();

    ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    let view = ctx.lookup.member_view("rossi", "ana").await.unwrap();
    assert_eq!(view.receiver.unwrap().wishlist, "socks");
}

#[tokio::test]
async fn test_reseed_keeps_stored_member_name() {
    let ctx = TestContext::new();
    ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    let renamed = "rossi\ngiver,receiver\nANA,Luis\nLuis,Marta\nMarta,ANA\n";
    let report = ctx.seeding.seed_family(renamed, None).await.unwrap();

    let ana = report.members.iter().find(|m| m.slug == "ana").unwrap();
    assert!(!ana.created);
    assert_eq!(ana.name, "Ana");
}

#[tokio::test]
async fn test_reseed_removed_member_has_no_receiver() {
    let ctx = TestContext::new();
    ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();

    let smaller = "rossi\ngiver,receiver\nAna,Luis\nLuis,Ana\n";
    let report = ctx.seeding.seed_family(smaller, None).await.unwrap();
    assert_eq!(report.assignments.len(), 2);

    // Marta stays, but without an assignment
    let view = ctx.lookup.member_view("rossi", "marta").await.unwrap();
    assert_eq!(view.member.name, "Marta");
    assert!(view.receiver.is_none());
}

#[tokio::test]
async fn test_seed_family_skips_malformed_rows() {
    let ctx = TestContext::new();
    let csv = "rossi\ngiver,receiver\nAna,Luis\nbroken\n,Marta\nLuis,Ana\nAna,Marta\n";

    let report = ctx.seeding.seed_family(csv, None).await.unwrap();

    assert_eq!(report.assignments.len(), 2);
    let reasons: Vec<SkipReason> = report.skipped_rows.iter().map(|s| s.reason).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::MissingFields,
            SkipReason::EmptyName,
            SkipReason::DuplicateGiver
        ]
    );
    // Marta only appears in skipped rows
    assert_eq!(report.members.len(), 2);
}

// ============================================================================
// Slug Collision Tests
// ============================================================================

#[tokio::test]
async fn test_slug_collision_rejected_by_default() {
    let ctx = TestContext::new();
    let csv = "rossi\ngiver,receiver\nAna,Luis\nLuis,Marta\nANA,Marta\n";

    let err = ctx.seeding.seed_family(csv, None).await.unwrap_err();
    assert_eq!(err.status_code(), 409);
    match err {
        AppError::Ingest(IngestError::SlugCollision { slug, first, second }) => {
            assert_eq!(slug, "ana");
            assert_eq!(first, "Ana");
            assert_eq!(second, "ANA");
        }
        other => panic!("expected slug collision, got {:?}", other),
    }

    // Nothing was written
    assert!(ctx.stores.families.find_by_slug("rossi").await.unwrap().is_none());
}

#[tokio::test]
async fn test_slug_collision_merged_when_configured() {
    let ctx = TestContext::with_policy(SlugCollisionPolicy::Merge);
    let csv = "rossi\ngiver,receiver\nAna,Luis\nLuis,Marta\nANA,Marta\n";

    let report = ctx.seeding.seed_family(csv, None).await.unwrap();

    assert_eq!(report.members.len(), 3);
    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.dropped_pairs.len(), 1);
    assert_eq!(
        report.dropped_pairs[0].reason,
        DroppedPairReason::GiverAlreadyAssigned
    );
    assert_eq!(report.dropped_pairs[0].pair.giver, "ANA");

    let view = ctx.lookup.member_view("rossi", "ana").await.unwrap();
    assert_eq!(view.member.name, "Ana");
    assert_eq!(view.receiver.unwrap().member.name, "Luis");
}

// ============================================================================
// Format Error Tests
// ============================================================================

#[tokio::test]
async fn test_seed_family_rejects_bad_slug_line() {
    let ctx = TestContext::new();
    let csv = "Rossi Family\ngiver,receiver\nAna,Luis\n";

    let err = ctx.seeding.seed_family(csv, None).await.unwrap_err();
    assert!(matches!(err, AppError::Ingest(IngestError::Format(_))));
    assert_eq!(err.status_code(), 400);
    assert!(ctx.stores.families.find_by_slug("rossi").await.unwrap().is_none());
}

#[tokio::test]
async fn test_seed_family_rejects_short_input() {
    let ctx = TestContext::new();

    let err = ctx
        .seeding
        .seed_family("rossi\ngiver,receiver\n", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Ingest(IngestError::Format(_))));
}

#[tokio::test]
async fn test_seed_family_rejects_unsluggable_name() {
    let ctx = TestContext::new();
    let csv = "rossi\ngiver,receiver\n!!!,Luis\nLuis,!!!\n";

    let err = ctx.seeding.seed_family(csv, None).await.unwrap_err();
    assert!(matches!(err, AppError::Ingest(IngestError::Format(_))));
    assert_eq!(ctx.store.wishlist_count().await, 0);
}

#[tokio::test]
async fn test_families_are_isolated() {
    let ctx = TestContext::new();
    ctx.seeding.seed_family(ROSSI_CSV, None).await.unwrap();
    ctx.seeding
        .seed_family("bianchi\ngiver,receiver\nAna,Paolo\nPaolo,Ana\n", None)
        .await
        .unwrap();

    let rossi_ana = ctx.lookup.member_view("rossi", "ana").await.unwrap();
    let bianchi_ana = ctx.lookup.member_view("bianchi", "ana").await.unwrap();

    assert_ne!(rossi_ana.member.id, bianchi_ana.member.id);
    assert_eq!(rossi_ana.receiver.unwrap().member.name, "Luis");
    assert_eq!(bianchi_ana.receiver.unwrap().member.name, "Paolo");

    let key = WishlistKey::Member(bianchi_ana.member.id);
    assert!(ctx.stores.wishlists.find(key).await.unwrap().is_some());
}
