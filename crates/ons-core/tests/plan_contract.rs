//! Contract Test: Plan
//!
//! Verifies the three-way diff as seen through the Reconciler.
//!
//! Constraints verified:
//! - Desired records missing from the zone are planned for addition
//! - Tracked records no longer desired are planned for removal with their live identifier
//! - Tracked records gone from the zone are reported with an unknown identifier
//! - Planning twice without changes yields the same plan and no second write
//! - A failed detail fetch aborts the plan instead of shrinking the live set

mod common;

use common::*;
use ons_core::Record;

#[tokio::test]
async fn declared_record_missing_from_zone_is_added() {
    let mut h = Harness::new(vec![rec("www", "1.2.3.4")], vec![], vec![]).await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(plan.to_add, vec![rec("www", "1.2.3.4")]);
    assert!(plan.to_remove.is_empty());
    assert!(!plan.tracked_changed);
    assert_eq!(h.tracked_store.save_count(), 0);
}

#[tokio::test]
async fn declared_record_present_in_zone_is_not_added() {
    let zone = vec![live("www", "1.2.3.4", 10), live("api", "5.6.7.8", 11)];
    let mut h = Harness::new(
        vec![rec("www", "1.2.3.4"), rec("api", "5.6.7.8")],
        vec![],
        zone,
    )
    .await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert!(plan.to_add.is_empty());
    assert!(plan.to_remove.is_empty());
}

#[tokio::test]
async fn plan_twice_is_idempotent() {
    let mut h = Harness::new(
        vec![rec("www", "1.2.3.4"), rec("api", "5.6.7.8")],
        vec![live("old", "9.9.9.9", 12)],
        vec![live("www", "1.2.3.4", 10), live("old", "9.9.9.9", 12)],
    )
    .await;

    let first = h.reconciler.plan(ZONE).await.unwrap();
    let second = h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(first.to_add, second.to_add);
    assert_eq!(first.to_remove, second.to_remove);
    assert!(first.tracked_changed, "adopting www must rewrite the tracked set");
    assert!(!second.tracked_changed);
    assert_eq!(h.tracked_store.save_count(), 1);
}

#[tokio::test]
async fn live_desired_record_is_adopted_into_tracked_set() {
    let mut h = Harness::new(
        vec![rec("www", "1.2.3.4")],
        vec![],
        vec![live("www", "1.2.3.4", 42)],
    )
    .await;

    h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(
        h.tracked_store.records().await,
        vec![live("www", "1.2.3.4", 42)]
    );
}

#[tokio::test]
async fn undesired_tracked_record_is_removed_with_live_identifier() {
    let zone = vec![live("www", "1.2.3.4", 10), live("api", "5.6.7.8", 11)];
    let mut h = Harness::new(vec![rec("api", "5.6.7.8")], zone.clone(), zone).await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert!(plan.to_add.is_empty());
    assert_eq!(plan.to_remove, vec![live("www", "1.2.3.4", 10)]);
}

#[tokio::test]
async fn drifted_record_is_reported_without_identifier() {
    let mut h = Harness::new(
        vec![rec("www", "1.2.3.4")],
        vec![live("www", "1.2.3.4", 10)],
        vec![],
    )
    .await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(plan.to_add, vec![rec("www", "1.2.3.4")]);
    assert_eq!(plan.to_remove, vec![rec("www", "1.2.3.4")]);
    assert!(plan.tracked_changed);
    assert_eq!(h.tracked_store.records().await, vec![rec("www", "1.2.3.4")]);
}

#[tokio::test]
async fn out_of_band_deletion_is_detected_on_next_plan() {
    let zone = vec![live("www", "1.2.3.4", 10)];
    let mut h = Harness::new(vec![rec("www", "1.2.3.4")], zone.clone(), zone).await;

    assert!(h.reconciler.plan(ZONE).await.unwrap().is_empty());

    h.api.drop_out_of_band(10);
    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(plan.to_add, vec![rec("www", "1.2.3.4")]);
    assert_eq!(plan.to_remove, vec![rec("www", "1.2.3.4")]);
}

#[tokio::test]
async fn round_robin_targets_are_planned_independently() {
    let zone = vec![live("www", "1.1.1.1", 1), live("www", "2.2.2.2", 2)];
    let mut h = Harness::new(
        vec![rec("www", "2.2.2.2"), rec("www", "3.3.3.3")],
        zone.clone(),
        zone,
    )
    .await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert_eq!(plan.to_add, vec![rec("www", "3.3.3.3")]);
    assert_eq!(plan.to_remove, vec![live("www", "1.1.1.1", 1)]);
}

#[tokio::test]
async fn other_zones_are_left_alone() {
    let foreign_desired = Record::new("other.org", "api", "8.8.8.8");
    let foreign_tracked = Record::new("other.org", "www", "9.9.9.9").with_id(ons_core::RecordId(99));
    let mut h = Harness::new(
        vec![foreign_desired, rec("www", "1.2.3.4")],
        vec![foreign_tracked.clone()],
        vec![live("www", "1.2.3.4", 10)],
    )
    .await;

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert!(plan.to_add.is_empty());
    assert!(plan.to_remove.is_empty());
    assert_eq!(
        h.tracked_store.records().await,
        vec![foreign_tracked, live("www", "1.2.3.4", 10)]
    );
}

#[tokio::test]
async fn failed_fetch_aborts_plan() {
    let zone = vec![live("www", "1.2.3.4", 10), live("api", "5.6.7.8", 11)];
    let mut h = Harness::new(vec![rec("www", "1.2.3.4")], zone.clone(), zone).await;
    h.api.fail_fetch_of(11);

    let err = h.reconciler.plan(ZONE).await.unwrap_err();

    assert!(err.is_provider());
    assert!(err.to_string().contains("11"));
    assert_eq!(h.tracked_store.save_count(), 0);
    assert_eq!(h.reconciler.tracked().records().len(), 2);
}

#[tokio::test]
async fn vanished_record_is_skipped() {
    let mut h = Harness::new(
        vec![rec("www", "1.2.3.4")],
        vec![],
        vec![live("www", "1.2.3.4", 10)],
    )
    .await;
    h.api.vanish(77);

    let plan = h.reconciler.plan(ZONE).await.unwrap();

    assert!(plan.is_empty());
    assert_eq!(h.api.fetch_call_count(), 2);
}

#[tokio::test]
async fn listing_marks_declared_records_and_sorts() {
    let h = Harness::new(
        vec![rec("www", "1.2.3.4")],
        vec![],
        vec![
            live("www", "1.2.3.4", 10),
            live("api", "5.6.7.8", 11),
            live("www", "0.0.0.1", 12),
        ],
    )
    .await;

    let listed = h.reconciler.list(ZONE).await.unwrap();

    let summary: Vec<(&str, &str, bool)> = listed
        .iter()
        .map(|l| (l.record.sub_domain.as_str(), l.record.target.as_str(), l.managed))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("api", "5.6.7.8", false),
            ("www", "0.0.0.1", false),
            ("www", "1.2.3.4", true),
        ]
    );
    assert_eq!(h.api.list_call_count(), 1);
}
