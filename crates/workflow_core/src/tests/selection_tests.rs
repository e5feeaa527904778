use super::*;

use chrono::{TimeZone, Utc};

fn file(name: &str) -> FileDescriptor {
    FileDescriptor {
        name: name.to_string(),
        size_bytes: 128,
        modified_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn loaded(names: &[&str]) -> FileSelection {
    let mut selection = FileSelection::default();
    selection.load_files(names.iter().map(|name| file(name)).collect());
    selection
}

fn assert_subset(selection: &FileSelection) {
    for name in selection.selected_names() {
        assert!(selection.is_listed(name), "{name} selected but not listed");
    }
}

#[test]
fn load_does_not_auto_select() {
    let mut selection = FileSelection::default();
    let outcome = selection.load_files(vec![file("a.csv"), file("b.csv")]);
    assert_eq!(outcome, LoadOutcome::Loaded(2));
    assert!(selection.selected_names().is_empty());
}

#[test]
fn empty_listing_is_empty_but_valid() {
    let mut selection = loaded(&["a.csv"]);
    selection.toggle("a.csv").expect("toggle");

    assert_eq!(selection.load_files(Vec::new()), LoadOutcome::EmptyButValid);
    assert!(selection.is_empty());
}

#[test]
fn duplicate_names_keep_first_occurrence() {
    let mut selection = FileSelection::default();
    let mut second = file("a.csv");
    second.size_bytes = 1;
    selection.load_files(vec![file("a.csv"), second, file("b.csv")]);

    assert_eq!(selection.current_files().len(), 2);
    assert_eq!(selection.current_files()[0].size_bytes, 128);
}

#[test]
fn toggle_flips_membership() {
    let mut selection = loaded(&["a.csv", "b.csv"]);
    assert_eq!(selection.toggle("a.csv"), Ok(true));
    assert!(selection.is_selected("a.csv"));
    assert_eq!(selection.toggle("a.csv"), Ok(false));
    assert!(!selection.is_selected("a.csv"));
}

#[test]
fn toggle_rejects_unlisted_names() {
    let mut selection = loaded(&["a.csv"]);
    assert_eq!(
        selection.toggle("ghost.csv"),
        Err(GuardRejection::UnknownFile("ghost.csv".to_string()))
    );
    assert!(selection.selected_names().is_empty());
}

#[test]
fn select_all_fills_partial_selection_then_clears() {
    let mut selection = loaded(&["a.csv", "b.csv", "c.csv"]);
    selection.toggle("b.csv").expect("toggle");

    selection.select_all();
    assert_eq!(selection.selected_names().len(), 3);

    selection.select_all();
    assert!(selection.selected_names().is_empty());
}

#[test]
fn select_all_tracks_a_reloaded_universe() {
    let mut selection = loaded(&["a.csv", "b.csv"]);
    selection.select_all();
    assert_eq!(selection.selected_names().len(), 2);

    selection.load_files(vec![file("a.csv"), file("b.csv"), file("c.csv")]);
    selection.select_all();
    assert_eq!(selection.selected_names().len(), 3);
    assert_subset(&selection);
}

#[test]
fn selection_stays_within_listing_across_mixed_operations() {
    let mut selection = loaded(&["a.csv", "b.csv", "c.csv"]);
    selection.toggle("a.csv").expect("toggle");
    selection.select_all();
    assert_subset(&selection);

    selection.load_files(vec![file("c.csv"), file("d.csv")]);
    assert_subset(&selection);
    selection.toggle("d.csv").expect("toggle");
    let _ = selection.toggle("a.csv");
    assert_subset(&selection);

    selection.clear();
    assert!(selection.is_empty());
}
