use super::*;

#[test]
fn absent_paths_are_collapsed() {
    let state = ExpansionState::new();
    assert!(!state.is_expanded("src"));
    assert!(state.is_empty());
}

#[test]
fn set_reports_changes() {
    let mut state = ExpansionState::new();
    assert!(state.set("src", true));
    assert!(!state.set("src", true));
    assert!(state.is_expanded("src"));
    assert!(state.set("src", false));
    assert!(!state.set("src", false));
    assert!(!state.is_expanded("src"));
}

#[test]
fn rebase_moves_nested_entries() {
    let mut state = ExpansionState::new();
    state.set("src", true);
    state.set("src/utils", true);
    state.set("srcx", true);

    state.rebase("src", "source");

    assert!(state.is_expanded("source"));
    assert!(state.is_expanded("source/utils"));
    assert!(!state.is_expanded("src"));
    assert!(!state.is_expanded("src/utils"));
    assert!(state.is_expanded("srcx"));
}

#[test]
fn remove_subtree_and_prune() {
    let mut state = ExpansionState::new();
    state.set("a", true);
    state.set("a/b", true);
    state.set("c", true);

    assert!(state.remove_subtree("a"));
    assert_eq!(state.len(), 1);

    state.set("gone", true);
    let pruned = state.prune(|p| p == "c");
    assert_eq!(pruned, 1);
    assert!(state.is_expanded("c"));
}
