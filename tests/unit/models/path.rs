use super::*;

#[test]
fn join_handles_root_parent() {
    assert_eq!(join("", "src"), "src");
    assert_eq!(join("src", "app.ts"), "src/app.ts");
}

#[test]
fn parent_and_name() {
    assert_eq!(parent_of(""), None);
    assert_eq!(parent_of("src"), Some(""));
    assert_eq!(parent_of("src/utils/a.ts"), Some("src/utils"));
    assert_eq!(file_name("src/utils/a.ts"), "a.ts");
    assert_eq!(file_name("README.md"), "README.md");
}

#[test]
fn depth_counts_ancestors() {
    assert_eq!(depth_of("src"), 0);
    assert_eq!(depth_of("src/app.ts"), 1);
    assert_eq!(depth_of("a/b/c/d"), 3);
}

#[test]
fn is_within_respects_component_boundaries() {
    assert!(is_within("src/app.ts", "src"));
    assert!(is_within("src", "src"));
    assert!(!is_within("srcx/app.ts", "src"));
    assert!(is_within("anything", ""));
}

#[test]
fn rebase_moves_descendants() {
    assert_eq!(rebase("src/app.ts", "src", "source").as_deref(), Some("source/app.ts"));
    assert_eq!(rebase("src", "src", "lib/src").as_deref(), Some("lib/src"));
    assert_eq!(rebase("srcx/a", "src", "lib"), None);
}

#[test]
fn ancestors_are_outermost_first() {
    assert_eq!(ancestors("a/b/c.ts"), vec!["a", "a/b"]);
    assert!(ancestors("top.ts").is_empty());
}
