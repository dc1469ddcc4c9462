use crate::harness::{recipe, sample_png, ErrorMatch, Scenario};
use image::GenericImageView;
use recipe_core::SaveStep;
use std::time::Duration;

#[test]
fn test_new_recipe_with_image() {
    Scenario::new("new_with_image")
        .save_with_image(
            recipe("Braised Pork", "main/meat", &["pork"], &["simmer"]),
            sample_png(2400, 1600),
        )
        .assert_call_sequence(&[
            "read docs/main/meat/Braised Pork.md",
            "create docs/images/20260102030405.jpg",
            "create docs/main/meat/Braised Pork.md",
        ])
        .assert_image_uploaded("docs/images/20260102030405.jpg")
        .assert_file_contains(
            "docs/main/meat/Braised Pork.md",
            "# Braised Pork\n\n![Braised Pork](../../images/20260102030405.jpg)\n\n## 材料\n",
        )
        .assert_that(Box::new(|_, workspace| {
            let bytes = workspace.read_file("docs/images/20260102030405.jpg")?;
            let img = image::load_from_memory(&bytes)?;
            assert_eq!(img.dimensions(), (1200, 800));
            assert!(!img.color().has_alpha());
            Ok(())
        }))
        .run()
        .unwrap();
}

#[test]
fn test_update_with_image() {
    Scenario::new("update_with_image")
        .from_fixture("default")
        .load("main", "Curry")
        .clear_call_log()
        .edit_and_save_with_image(|_| {}, sample_png(64, 64))
        .assert_call_sequence(&[
            "create docs/images/20260102030405.jpg",
            "update docs/main/Curry.md",
        ])
        .assert_last_message("Update recipe: Curry")
        .assert_file_contains("docs/main/Curry.md", "![Curry](../images/20260102030405.jpg)")
        .run()
        .unwrap();
}

#[test]
fn test_images_named_by_upload_time() {
    Scenario::new("images_by_time")
        .save_with_image(recipe("Pudding", "dessert", &["egg"], &["steam"]), sample_png(10, 10))
        .wait(Duration::from_secs(61))
        .save_with_image(recipe("Jelly", "dessert", &["gelatin"], &["chill"]), sample_png(10, 10))
        .assert_image_uploaded("docs/images/20260102030506.jpg")
        .assert_file_exists("docs/images/20260102030405.jpg")
        .assert_categories(&["dessert"])
        .run()
        .unwrap();
}

#[test]
fn test_occupied_target_uploads_nothing() {
    Scenario::new("occupied_with_image")
        .from_fixture("default")
        .save_with_image(recipe("Curry", "main", &["rice"], &["cook"]), sample_png(10, 10))
        .fails_with(ErrorMatch::Occupied)
        .assert_call_sequence(&["read docs/main/Curry.md"])
        .assert_file_missing("docs/images/20260102030405.jpg")
        .run()
        .unwrap();
}

#[test]
fn test_failure_after_upload_reports_orphan() {
    Scenario::new("orphaned_image")
        .from_fixture("default")
        .load("main", "Curry")
        .external_write("docs/main/Curry.md", b"# Curry\n\nedited elsewhere\n")
        .edit_and_save_with_image(|_| {}, sample_png(10, 10))
        .fails_with(ErrorMatch::SaveIncomplete(SaveStep::DocumentWrite))
        // Never rolled back
        .assert_file_exists("docs/images/20260102030405.jpg")
        .assert_file_content("docs/main/Curry.md", "# Curry\n\nedited elsewhere\n")
        .run()
        .unwrap();
}

#[test]
fn test_clearing_image_reference() {
    Scenario::new("clear_image")
        .from_fixture("default")
        .load("main/meat", "Braised Pork")
        .edit_and_save(|r| r.image_reference.clear())
        .assert_that(Box::new(|_, workspace| {
            let text = String::from_utf8(workspace.read_file("docs/main/meat/Braised Pork.md")?)?;
            assert!(!text.contains("!["));
            assert!(text.starts_with("# Braised Pork\n\n## 材料\n"));
            Ok(())
        }))
        // The asset itself is left alone
        .assert_file_exists("docs/images/20250101000000.jpg")
        .run()
        .unwrap();
}
