use super::*;
use crate::models::NodeKind;

fn tree() -> FileTree {
    let mut tree = FileTree::new("root");
    tree.insert_child("", "src", NodeKind::Dir).unwrap();
    tree.insert_child("src", "App.ts", NodeKind::File).unwrap();
    tree.insert_child("src", "utils", NodeKind::Dir).unwrap();
    tree
}

#[test]
fn rejects_malformed_names() {
    assert_eq!(validate_name(""), Err(NameError::Empty));
    assert_eq!(validate_name("."), Err(NameError::Reserved));
    assert_eq!(validate_name(".."), Err(NameError::Reserved));
    assert_eq!(validate_name("a/b"), Err(NameError::ContainsSeparator));
    assert_eq!(validate_name("a\0b"), Err(NameError::ContainsNul));
    assert_eq!(validate_name(" a"), Err(NameError::SurroundingWhitespace));
    assert_eq!(validate_name("a\t"), Err(NameError::SurroundingWhitespace));
    assert_eq!(validate_name("a\u{7}b"), Err(NameError::ControlCharacter));
}

#[test]
fn accepts_ordinary_names() {
    for name in ["a.ts", ".gitignore", "...", "my file.txt", "数据.rs", "a..b"] {
        assert!(is_valid_name(name), "{name}");
    }
}

#[test]
fn uniqueness_is_case_insensitive() {
    let tree = tree();
    let mut index = SiblingIndex::new();

    assert!(!index.is_unique(&tree, "src", "app.ts", None));
    assert!(!index.is_unique(&tree, "src", "UTILS", None));
    assert!(index.is_unique(&tree, "src", "main.ts", None));
    assert!(index.is_unique(&tree, "", "App.ts", None));
}

#[test]
fn rename_may_keep_or_recase_its_own_name() {
    let tree = tree();
    let mut index = SiblingIndex::new();

    assert!(index.is_unique(&tree, "src", "app.TS", Some("App.ts")));
    assert!(!index.is_unique(&tree, "src", "utils", Some("App.ts")));
}

#[test]
fn cache_follows_child_list_changes() {
    let mut tree = tree();
    let mut index = SiblingIndex::new();

    assert!(index.is_unique(&tree, "src", "new.ts", None));
    assert_eq!(index.cached_parents(), 1);

    tree.insert_child("src", "New.ts", NodeKind::File).unwrap();
    assert!(!index.is_unique(&tree, "src", "new.ts", None));

    tree.remove("src/New.ts").unwrap();
    assert!(index.is_unique(&tree, "src", "new.ts", None));

    assert!(index.invalidate("src"));
    assert!(!index.invalidate("src"));
    index.clear();
    assert_eq!(index.cached_parents(), 0);
}

#[test]
fn check_reports_the_first_failure() {
    let tree = tree();
    let mut index = SiblingIndex::new();

    assert_eq!(
        index.check(&tree, "src", "app.ts", None),
        Err(ExplorerError::DuplicateName {
            parent: "src".into(),
            name: "app.ts".into(),
        })
    );
    assert!(matches!(
        index.check(&tree, "src", "", None),
        Err(ExplorerError::InvalidName {
            reason: NameError::Empty,
            ..
        })
    ));
    assert_eq!(index.check(&tree, "src", "main.ts", None), Ok(()));
}
