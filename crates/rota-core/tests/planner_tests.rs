mod common;

use std::io::Write;

use common::{create_test_host, create_test_planner};
use jiff::civil::date;
use rota_core::{
    display::{Messages, PlannerTable},
    host::MemoryObject,
    DateKey, ObjectId, PlannerBuilder, PlannerConfig, PlannerState,
};
use tempfile::TempDir;

fn key(day: i8) -> DateKey {
    DateKey::encode(date(2024, 2, day))
}

#[tokio::test]
async fn test_complete_planner_workflow() {
    let host = create_test_host();
    let mut planner = create_test_planner(&host, PlannerConfig::default()).await;

    assert_eq!(planner.state(), PlannerState::Ready);
    assert_eq!(planner.rows().len(), 3);
    assert_eq!(
        planner.rows()[0].content_at(&key(29)),
        Some("Leap"),
        "leap day entry should be placed"
    );

    // Move e3 from Bob to Carol and change its day in one commit.
    host.update(&ObjectId::new("e3"), |entry| {
        entry
            .references
            .insert("resource".to_string(), ObjectId::new("r3"));
        entry
            .fields
            .insert("date".to_string(), date(2024, 2, 15).into());
    });
    host.notify(&ObjectId::new("e3"));
    planner.process_pending().await;

    let bob = planner.row(&ObjectId::new("r2")).expect("Bob should remain");
    let carol = planner.row(&ObjectId::new("r3")).expect("Carol should remain");
    assert!(bob.entries_by_date_key.is_empty());
    assert_eq!(carol.entry_at(&key(15)), Some(&ObjectId::new("e3")));

    // Drop Alice upstream.
    host.remove(&ObjectId::new("r1"));
    host.notify(&ObjectId::new("r1"));
    planner.process_pending().await;

    let ids: Vec<_> = planner.rows().iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(ids, vec!["r2", "r3"]);
    assert!(!host.is_watched(&ObjectId::new("e1")));
    assert!(!host.is_watched(&ObjectId::new("e2")));
    assert_eq!(host.active_watches(), 4);

    let table = PlannerTable::new(planner.days(), planner.rows()).to_string();
    assert!(table.contains("| Carol |"));
    assert!(!table.contains("Alice"));
    assert!(Messages(planner.messages()).to_string().is_empty());
}

#[tokio::test]
async fn test_new_resource_appears_only_after_full_reload() {
    let host = create_test_host();
    let mut planner = create_test_planner(&host, PlannerConfig::default()).await;

    host.insert(MemoryObject::resource("r4", "Dave"));
    host.notify(&ObjectId::new("r4"));
    planner.process_pending().await;
    assert_eq!(planner.rows().len(), 3);

    planner.reload().await;
    assert_eq!(planner.rows().len(), 4);
    assert_eq!(planner.rows()[3].label, "Dave");
}

#[tokio::test]
async fn test_builder_reads_configuration_file() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("planner.json");
    let mut file = std::fs::File::create(&config_path).expect("Failed to create config file");
    write!(
        file,
        r#"{{ "entries": {{ "title": null }}, "view": {{ "grid": {{ "full_weeks": false }} }} }}"#
    )
    .expect("Failed to write config file");

    let host = create_test_host();
    let mut planner = PlannerBuilder::new(host.clone())
        .with_config_path(Some(&config_path))
        .build()
        .expect("Failed to create planner");
    planner
        .load(host.get(&ObjectId::new("view")))
        .await;

    assert_eq!(planner.days().len(), 29);
    assert_eq!(planner.rows()[0].content_at(&key(1)), Some("{entry}"));
}

#[tokio::test]
async fn test_invalid_configuration_file_is_fatal_not_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("planner.json");
    std::fs::write(
        &config_path,
        r#"{ "view": { "year_attribute": "" }, "resources": { "title": { "kind": "attribute", "name": "" } } }"#,
    )
    .expect("Failed to write config file");

    let host = create_test_host();
    let mut planner = PlannerBuilder::new(host.clone())
        .with_config_path(Some(&config_path))
        .build()
        .expect("Failed to create planner");
    planner
        .load(host.get(&ObjectId::new("view")))
        .await;

    assert_eq!(planner.messages().len(), 2);
    assert!(planner.rows().is_empty());
    let rendered = Messages(planner.messages()).to_string();
    assert!(rendered.contains("Error: View :: No year attribute configured"));
}

#[tokio::test]
async fn test_unreadable_configuration_fails_build() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let result = PlannerBuilder::new(create_test_host())
        .with_config_path(Some(temp_dir.path().join("missing.json")))
        .build();

    assert!(result.is_err());
}
