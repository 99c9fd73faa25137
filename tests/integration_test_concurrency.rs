mod common;

use chrono::{Duration, Utc};
use common::TestApp;
use rsvp_backend::domain::models::{guest::GuestStatus, notification::{AttemptStatus, Channel}};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_reminders_are_all_counted() {
    let app = Arc::new(TestApp::new().await);
    let wedding = app.create_wedding("stress").await;
    let deadline = Utc::now() + Duration::days(30);
    let guest = app.add_guest(&wedding.id, "Stress Guest", Some("+258841234567"), None, Some(deadline)).await;

    let total = 50;
    let mut set = JoinSet::new();
    for _ in 0..total {
        let app = app.clone();
        let guest_id = guest.id.clone();
        set.spawn(async move {
            app.lifecycle()
                .send_reminder(&guest_id, Channel::Whatsapp, &Value::Null, Utc::now())
                .await
        });
    }

    let mut ok = 0;
    while let Some(res) = set.join_next().await {
        res.expect("task panicked").expect("reminder failed");
        ok += 1;
    }
    assert_eq!(ok, total);

    let stored = app.lifecycle().get_guest(&guest.id).await.unwrap();
    assert_eq!(stored.reminder_count, total as i64);
    assert_eq!(stored.invite_sent_count, 0);

    let audit = app.lifecycle().list_notifications(&guest.id).await.unwrap();
    assert_eq!(audit.len(), total);
    assert!(audit.iter().all(|a| a.status == AttemptStatus::Sent));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_check_ins_share_one_timestamp() {
    let app = Arc::new(TestApp::new().await);
    let wedding = app.create_wedding("door").await;
    let guest = app.add_guest(&wedding.id, "Door Guest", None, None, None).await;
    app.lifecycle().confirm_or_reject(&guest.token, GuestStatus::Confirmed, Utc::now()).await.unwrap();

    let mut set = JoinSet::new();
    for i in 0..10 {
        let app = app.clone();
        let guest_id = guest.id.clone();
        set.spawn(async move {
            app.lifecycle().check_in(&guest_id, Utc::now() + Duration::seconds(i)).await
        });
    }

    let mut stamps = HashSet::new();
    while let Some(res) = set.join_next().await {
        let checked = res.expect("task panicked").expect("check-in failed");
        assert_eq!(checked.status, GuestStatus::CheckedIn);
        stamps.insert(checked.checked_in_at.expect("checked_in_at"));
    }
    assert_eq!(stamps.len(), 1, "every caller must observe the first check-in");

    let stored = app.lifecycle().get_guest(&guest.id).await.unwrap();
    assert_eq!(stored.checked_in_at.as_ref(), stamps.iter().next());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_counters_survive_interleaved_status_changes() {
    let app = Arc::new(TestApp::new().await);
    let wedding = app.create_wedding("mixed").await;
    let guest = app.add_guest(&wedding.id, "Mixed", Some("+258841234567"), None, None).await;

    let mut set = JoinSet::new();
    for i in 0..20 {
        let app = app.clone();
        let guest_id = guest.id.clone();
        let token = guest.token.clone();
        set.spawn(async move {
            if i % 2 == 0 {
                app.lifecycle()
                    .send_invite(&guest_id, Channel::Whatsapp, &Value::Null, Utc::now())
                    .await
                    .map(|_| ())
            } else {
                let decision = if i % 4 == 1 { GuestStatus::Confirmed } else { GuestStatus::Rejected };
                app.lifecycle()
                    .confirm_or_reject(&token, decision, Utc::now())
                    .await
                    .map(|_| ())
            }
        });
    }

    while let Some(res) = set.join_next().await {
        res.expect("task panicked").expect("operation failed");
    }

    let stored = app.lifecycle().get_guest(&guest.id).await.unwrap();
    assert_eq!(stored.invite_sent_count, 10);
    assert!(matches!(stored.status, GuestStatus::Confirmed | GuestStatus::Rejected));
}
