use crate::harness::{Scenario, StoreOp};

#[test]
fn test_fixture_categories() {
    Scenario::new("fixture_categories")
        .from_fixture("default")
        .assert_categories(&["main", "main/meat", "汁物"])
        .assert_call_sequence(&["list_tree docs"])
        .run()
        .unwrap();
}

#[test]
fn test_empty_store_has_no_categories() {
    Scenario::new("empty_store")
        .assert_categories(&[])
        .run()
        .unwrap();
}

#[test]
fn test_hidden_directories_are_skipped() {
    Scenario::new("hidden_directories")
        .with_file("docs/images/thumbs/a.jpg", b"jpg")
        .with_file("docs/main/.cache/state", b"x")
        .with_file("docs/main/Curry.md", b"# Curry\n")
        .with_file("docs/.git-keep/x", b"x")
        .with_file("README.md", b"# Recipes\n")
        .assert_categories(&["main"])
        .run()
        .unwrap();
}

#[test]
fn test_unreachable_store_lists_nothing() {
    Scenario::new("unreachable_listing")
        .from_fixture("default")
        .store_fails_next(StoreOp::ListTree)
        .assert_categories(&[])
        // Recovers once the store answers again
        .assert_categories(&["main", "main/meat", "汁物"])
        .run()
        .unwrap();
}
