use crate::harness::{ErrorMatch, Scenario, StoreOp};
use recipe_core::SaveStep;

#[test]
fn test_title_change_moves_document() {
    Scenario::new("title_change_moves")
        .from_fixture("default")
        .load("main", "Curry")
        .clear_call_log()
        .edit_and_save(|r| r.title = "Beef Curry".to_string())
        .assert_call_sequence(&[
            "create docs/main/Beef Curry.md",
            "delete docs/main/Curry.md",
        ])
        .assert_file_missing("docs/main/Curry.md")
        .assert_file_contains("docs/main/Beef Curry.md", "# Beef Curry\n")
        .assert_loaded_at("docs/main/Beef Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_category_change_moves_document() {
    Scenario::new("category_change_moves")
        .from_fixture("default")
        .load("汁物", "Miso Soup")
        .clear_call_log()
        .edit_and_save(|r| r.category = "soup/japanese".to_string())
        .assert_calls(StoreOp::Create, 1)
        .assert_calls(StoreOp::Delete, 1)
        .assert_calls(StoreOp::Update, 0)
        .assert_file_exists("docs/soup/japanese/Miso Soup.md")
        // The emptied category directory is gone
        .assert_categories(&["main", "main/meat", "soup", "soup/japanese"])
        .run()
        .unwrap();
}

#[test]
fn test_moved_record_can_be_updated() {
    Scenario::new("update_after_move")
        .from_fixture("default")
        .load("main", "Curry")
        .edit_and_save(|r| r.category = "rice".to_string())
        .clear_call_log()
        .edit_and_save(|r| r.memo = "moved".to_string())
        .assert_call_sequence(&["update docs/rice/Curry.md"])
        .run()
        .unwrap();
}

#[test]
fn test_move_onto_existing_recipe() {
    Scenario::new("move_onto_existing")
        .from_fixture("default")
        .load("main", "Curry")
        .clear_call_log()
        .edit_and_save(|r| {
            r.title = "Braised Pork".to_string();
            r.category = "main/meat".to_string();
        })
        .fails_with(ErrorMatch::Occupied)
        .assert_calls(StoreOp::Delete, 0)
        .assert_file_exists("docs/main/Curry.md")
        .assert_file_contains("docs/main/meat/Braised Pork.md", "pork 200g")
        .assert_loaded_at("docs/main/Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_move_with_failed_delete() {
    Scenario::new("move_failed_delete")
        .from_fixture("default")
        .load("main", "Curry")
        .store_fails_next(StoreOp::Delete)
        .edit_and_save(|r| r.title = "Green Curry".to_string())
        .fails_with(ErrorMatch::SaveIncomplete(SaveStep::OldDocumentDelete))
        // Both copies exist; the session follows the new one
        .assert_file_exists("docs/main/Curry.md")
        .assert_file_exists("docs/main/Green Curry.md")
        .assert_loaded_at("docs/main/Green Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_move_with_failed_create() {
    Scenario::new("move_failed_create")
        .from_fixture("default")
        .load("main", "Curry")
        .store_fails_next(StoreOp::Create)
        .clear_call_log()
        .edit_and_save(|r| r.title = "Green Curry".to_string())
        .fails_with(ErrorMatch::Unreachable)
        .assert_call_sequence(&["create docs/main/Green Curry.md"])
        .assert_file_exists("docs/main/Curry.md")
        .assert_file_missing("docs/main/Green Curry.md")
        .assert_loaded_at("docs/main/Curry.md")
        .run()
        .unwrap();
}

#[test]
fn test_category_move_rebases_image_link() {
    Scenario::new("category_move_rebases_image")
        .from_fixture("default")
        .load("main/meat", "Braised Pork")
        .edit_and_save(|r| r.category = "main".to_string())
        .assert_file_missing("docs/main/meat/Braised Pork.md")
        .assert_file_contains(
            "docs/main/Braised Pork.md",
            "![Braised Pork](../images/20250101000000.jpg)",
        )
        // docs/main/../images/20250101000000.jpg
        .assert_file_exists("docs/images/20250101000000.jpg")
        .assert_file_contains("docs/main/Braised Pork.md", "tastes better  \nthe next day")
        .run()
        .unwrap();
}
