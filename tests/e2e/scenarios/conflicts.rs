use crate::harness::{recipe, ErrorMatch, Scenario, StoreOp};

#[test]
fn test_new_recipe_on_occupied_path() {
    Scenario::new("new_on_occupied_path")
        .from_fixture("default")
        .save(recipe("Curry", "main", &["rice"], &["cook"]))
        .fails_with(ErrorMatch::Occupied)
        .assert_calls(StoreOp::Create, 1)
        .assert_calls(StoreOp::Update, 0)
        .assert_calls(StoreOp::Delete, 0)
        .assert_file_contains("docs/main/Curry.md", "* curry roux\n")
        .assert_fresh()
        .run()
        .unwrap();
}

#[test]
fn test_stale_update_is_rejected() {
    Scenario::new("stale_update")
        .from_fixture("default")
        .load("main", "Curry")
        .external_write("docs/main/Curry.md", b"# Curry\n\nedited elsewhere\n")
        .edit_and_save(|r| r.memo = "mine".to_string())
        .fails_with(ErrorMatch::StaleRevision)
        .assert_file_content("docs/main/Curry.md", "# Curry\n\nedited elsewhere\n")
        .assert_loaded_at("docs/main/Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_reload_after_conflict() {
    Scenario::new("reload_after_conflict")
        .from_fixture("default")
        .load("main", "Curry")
        .external_write("docs/main/Curry.md", b"# Curry\n\n## \xE6\x9D\x90\xE6\x96\x99\n* naan\n")
        .edit_and_save(|r| r.memo = "mine".to_string())
        .fails_with(ErrorMatch::StaleRevision)
        .load("main", "Curry")
        .edit_and_save(|r| r.memo = "mine".to_string())
        .assert_file_contains("docs/main/Curry.md", "* naan\n")
        .assert_file_contains("docs/main/Curry.md", "## メモ\nmine\n")
        .run()
        .unwrap();
}

#[test]
fn test_update_of_vanished_recipe() {
    Scenario::new("vanished_recipe")
        .from_fixture("default")
        .load("main", "Curry")
        .external_delete("docs/main/Curry.md")
        .edit_and_save(|r| r.memo = "too late".to_string())
        .fails_with(ErrorMatch::StaleRevision)
        .assert_file_missing("docs/main/Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_stale_move_keeps_both_outcomes_visible() {
    Scenario::new("stale_move")
        .from_fixture("default")
        .load("main", "Curry")
        .external_write("docs/main/Curry.md", b"# Curry\n\nedited elsewhere\n")
        .edit_and_save(|r| r.title = "Red Curry".to_string())
        .fails_with(ErrorMatch::SaveIncomplete(recipe_core::SaveStep::OldDocumentDelete))
        // The concurrent edit survives next to the moved copy
        .assert_file_content("docs/main/Curry.md", "# Curry\n\nedited elsewhere\n")
        .assert_file_exists("docs/main/Red Curry.md")
        .assert_loaded_at("docs/main/Red Curry.md")
        .run()
        .unwrap();
}
