use std::sync::Arc;

use dendro_domain::Project;
use dendro_testing_utils::{MockKeyValueStore, ProjectBuilder};
use dendro_workspace::{RecentProjects, Route, RECENT_PROJECTS_CAPACITY, RECENT_PROJECTS_KEY};

fn project(id: &str) -> Project {
    ProjectBuilder::new(id).build()
}

fn ids(projects: &[Project]) -> Vec<String> {
    projects.iter().map(|p| p.project_id.clone()).collect()
}

#[test]
fn test_recording_same_snapshot_is_a_no_op() {
    let store = MockKeyValueStore::new();
    let recent = RecentProjects::new(Arc::new(store.clone()));
    let p = project("p1");

    recent.record(&p).unwrap();
    recent.record(&p).unwrap();
    recent.record(&p).unwrap();

    assert_eq!(ids(&recent.entries()), vec!["p1"]);
    assert_eq!(store.writes(), 1);
}

#[test]
fn test_changed_snapshot_replaces_entry() {
    let store = MockKeyValueStore::new();
    let recent = RecentProjects::new(Arc::new(store.clone()));

    recent.record(&project("p1")).unwrap();
    recent.record(&project("p2")).unwrap();
    let renamed = ProjectBuilder::new("p1").with_name("Renamed").build();
    recent.record(&renamed).unwrap();

    let entries = recent.entries();
    assert_eq!(ids(&entries), vec!["p1", "p2"]);
    assert_eq!(entries[0].name, "Renamed");
    assert_eq!(store.writes(), 3);
}

#[test]
fn test_capacity_keeps_most_recent_first() {
    let recent = RecentProjects::new(Arc::new(MockKeyValueStore::new()));
    for i in 0..15 {
        recent.record(&project(&format!("p{i}"))).unwrap();
    }

    let entries = recent.entries();
    assert_eq!(entries.len(), RECENT_PROJECTS_CAPACITY);
    let expected: Vec<String> = (5..15).rev().map(|i| format!("p{i}")).collect();
    assert_eq!(ids(&entries), expected);
}

#[test]
fn test_corrupt_data_is_discarded() {
    for corrupt in ["not json", "{\"projectId\": \"p1\"}", "[1, 2, 3]", "[{\"name\": \"x\"}]"] {
        let store = MockKeyValueStore::new().with_value(RECENT_PROJECTS_KEY, corrupt);
        let recent = RecentProjects::new(Arc::new(store.clone()));

        assert!(recent.list(&["p1".to_string()]).is_empty());
        assert_eq!(store.value(RECENT_PROJECTS_KEY), None);

        recent.record(&project("p1")).unwrap();
        assert_eq!(ids(&recent.entries()), vec!["p1"]);
    }
}

#[test]
fn test_entries_missing_required_fields_are_discarded() {
    let stored = r#"[{"projectId":"p1","name":"n","timestampCreated":1.0,"timestampModified":2.0}]"#;
    let store = MockKeyValueStore::new().with_value(RECENT_PROJECTS_KEY, stored);
    let recent = RecentProjects::new(Arc::new(store.clone()));

    assert!(recent.entries().is_empty());
    assert_eq!(store.value(RECENT_PROJECTS_KEY), None);
}

#[test]
fn test_optional_fields_may_be_absent() {
    let stored = r#"[{"projectId":"p1","name":"n","description":"","tags":[],"timestampCreated":1.0,"timestampModified":2.0}]"#;
    let store = MockKeyValueStore::new().with_value(RECENT_PROJECTS_KEY, stored);
    let recent = RecentProjects::new(Arc::new(store));

    let entries = recent.entries();
    assert_eq!(ids(&entries), vec!["p1"]);
    assert_eq!(entries[0].compute_resource_id, None);
}

#[test]
fn test_unreadable_store_is_reset_and_recording_continues() {
    let store = MockKeyValueStore::new().with_value(RECENT_PROJECTS_KEY, "[]");
    store.set_fail_reads(true);
    let recent = RecentProjects::new(Arc::new(store.clone()));

    recent.record(&project("p1")).unwrap();
    assert_eq!(ids(&recent.entries()), vec!["p1"]);
}

#[test]
fn test_list_filters_by_access() {
    let recent = RecentProjects::new(Arc::new(MockKeyValueStore::new()));
    for id in ["a", "b", "c"] {
        recent.record(&project(id)).unwrap();
    }

    let visible = recent.list(&["a".to_string(), "c".to_string()]);
    assert_eq!(ids(&visible), vec!["c", "a"]);
}

#[test]
fn test_write_failure_is_reported() {
    let store = MockKeyValueStore::new();
    store.set_fail_writes(true);
    let recent = RecentProjects::new(Arc::new(store.clone()));

    assert!(recent.record(&project("p1")).is_err());
    assert!(recent.entries().is_empty());
}

#[test]
fn test_observe_records_only_loaded_project_pages() {
    let recent = RecentProjects::new(Arc::new(MockKeyValueStore::new()));
    let loaded = vec![project("p1"), project("p2")];

    recent.observe(&Route::parse("/projects"), &loaded).unwrap();
    recent.observe(&Route::parse("/project/unknown"), &loaded).unwrap();
    assert!(recent.entries().is_empty());

    recent.observe(&Route::parse("/project/p2"), &loaded).unwrap();
    assert_eq!(ids(&recent.entries()), vec!["p2"]);
}
