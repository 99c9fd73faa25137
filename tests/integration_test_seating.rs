mod common;

use common::TestApp;
use rsvp_backend::domain::{models::table::Table, services::lifecycle::NewGuest};

async fn seat(app: &TestApp, wedding_id: &str, name: &str, table: Option<&str>, companions: i32) -> String {
    app.lifecycle().add_guest(wedding_id, NewGuest {
        name: name.to_string(),
        phone: None,
        email: None,
        companions,
        table_name: table.map(str::to_string),
        rsvp_deadline: None,
    }).await.unwrap().id
}

async fn stored_capacities(app: &TestApp, wedding_id: &str) -> Vec<(String, i32)> {
    sqlx::query_as::<_, Table>("SELECT * FROM seating_tables WHERE wedding_id = ? ORDER BY name ASC")
        .bind(wedding_id)
        .fetch_all(&app.pool)
        .await
        .unwrap()
        .into_iter()
        .map(|t| (t.name, t.capacity))
        .collect()
}

#[tokio::test]
async fn test_derived_capacities_round_trip() {
    let app = TestApp::new().await;
    let wedding = app.create_wedding("tables").await;
    seat(&app, &wedding.id, "Ana", Some("1"), 2).await;
    seat(&app, &wedding.id, "Bruno", Some("1"), 0).await;
    seat(&app, &wedding.id, "Carla", Some("2"), 1).await;
    seat(&app, &wedding.id, "Dinis", None, 4).await;

    let rosters = app.lifecycle().list_tables(&wedding.id).await.unwrap();
    let summary: Vec<(String, i32, usize)> = rosters
        .iter()
        .map(|r| (r.name.clone(), r.total, r.guests.len()))
        .collect();
    assert_eq!(summary, vec![("1".to_string(), 4, 2), ("2".to_string(), 2, 1)]);

    let first = app.lifecycle().bulk_create_tables(&wedding.id).await.unwrap();
    assert_eq!(first.len(), 2);
    let after_first = stored_capacities(&app, &wedding.id).await;
    assert_eq!(after_first, vec![("1".to_string(), 4), ("2".to_string(), 2)]);

    app.lifecycle().bulk_create_tables(&wedding.id).await.unwrap();
    assert_eq!(stored_capacities(&app, &wedding.id).await, after_first);
}

#[tokio::test]
async fn test_reassignment_updates_capacity_and_keeps_old_tables() {
    let app = TestApp::new().await;
    let wedding = app.create_wedding("reseat").await;
    let ana = seat(&app, &wedding.id, "Ana", Some("1"), 1).await;
    seat(&app, &wedding.id, "Bruno", Some("1"), 0).await;
    app.lifecycle().bulk_create_tables(&wedding.id).await.unwrap();

    let moved = app.lifecycle().assign_seat(&ana, Some(" Noivos ")).await.unwrap();
    assert_eq!(moved.table_name.as_deref(), Some("Noivos"));
    app.lifecycle().bulk_create_tables(&wedding.id).await.unwrap();

    assert_eq!(
        stored_capacities(&app, &wedding.id).await,
        vec![("1".to_string(), 1), ("Noivos".to_string(), 2)]
    );

    let cleared = app.lifecycle().assign_seat(&ana, None).await.unwrap();
    assert_eq!(cleared.table_name, None);
    let names: Vec<String> = app.lifecycle().list_tables(&wedding.id).await.unwrap()
        .into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["1".to_string()]);
}

#[tokio::test]
async fn test_numeric_tables_are_listed_in_numeric_order() {
    let app = TestApp::new().await;
    let wedding = app.create_wedding("order").await;
    for (name, table) in [("a", "10"), ("b", "2"), ("c", "1")] {
        seat(&app, &wedding.id, name, Some(table), 0).await;
    }

    let names: Vec<String> = app.lifecycle().list_tables(&wedding.id).await.unwrap()
        .into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["1", "2", "10"]);
}
