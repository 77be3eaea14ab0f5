use super::*;
use crate::kernel::services::ports::RemoteEvent;

fn push(store: &mut Store, event: RemoteEvent) -> DispatchResult {
    store.dispatch(Action::Remote(event))
}

fn loaded_src() -> Store {
    let mut store = store();
    expand(&mut store, "src");
    load(&mut store, "src", &[("app.ts", FILE), ("utils", DIR)]);
    store
}

#[test]
fn add_under_fetched_parent_is_inserted_sorted() {
    let mut store = loaded_src();

    let result = push(
        &mut store,
        RemoteEvent::FileAdded {
            path: "src/b.ts".into(),
        },
    );
    assert!(result.state_changed);
    assert!(result.effects.is_empty());
    assert_eq!(
        row_paths(&store),
        vec![
            "node_modules",
            "src",
            "src/utils",
            "src/app.ts",
            "src/b.ts",
            "README.md"
        ]
    );

    push(
        &mut store,
        RemoteEvent::FolderAdded {
            path: "src/api".into(),
        },
    );
    let tree = store.state().explorer.tree();
    assert!(tree.is_dir("src/api"));
    assert_eq!(tree.load_state("src/api"), Some(LoadState::NotLoaded));
}

#[test]
fn add_under_unfetched_parent_waits_for_listing() {
    let mut store = store();

    let result = push(
        &mut store,
        RemoteEvent::FileAdded {
            path: "src/late.ts".into(),
        },
    );

    assert!(!result.state_changed);
    assert!(!store.state().explorer.tree().contains("src/late.ts"));
}

#[test]
fn echo_of_local_create_is_ignored() {
    let mut store = loaded_src();
    store.dispatch(Action::Create {
        parent: "src".into(),
        name: "mine.ts".to_string(),
        kind: FILE,
    });
    let revision = store.state().explorer.tree().revision();

    let result = push(
        &mut store,
        RemoteEvent::FileAdded {
            path: "src/mine.ts".into(),
        },
    );

    assert!(!result.state_changed);
    assert_eq!(store.state().explorer.tree().revision(), revision);
}

#[test]
fn ignored_and_invalid_names_are_dropped() {
    let mut store = loaded_src();

    assert!(!push(
        &mut store,
        RemoteEvent::FolderAdded {
            path: "src/.git".into(),
        },
    )
    .state_changed);
    assert!(!push(
        &mut store,
        RemoteEvent::FileAdded {
            path: "src/ bad".into(),
        },
    )
    .state_changed);
}

#[test]
fn unlink_removes_subtree_and_evicts_open_files() {
    let mut store = loaded_src();
    expand(&mut store, "src/utils");
    load(&mut store, "src/utils", &[("a.ts", FILE)]);
    store.dispatch(Action::FileOpened {
        path: "src/utils/a.ts".into(),
        content: "a".to_string(),
    });
    store.dispatch(Action::Select {
        path: Some("src/utils/a.ts".into()),
    });

    let result = push(
        &mut store,
        RemoteEvent::FolderUnlinked {
            path: "src/utils".into(),
        },
    );

    assert!(result.state_changed);
    let state = store.state();
    assert!(!state.explorer.tree().contains("src/utils"));
    assert!(!state.explorer.tree().is_expanded("src/utils"));
    assert!(!state.open_files.is_cached("src/utils/a.ts"));
    assert!(state.open_files.tabs().is_empty());
    assert_eq!(state.explorer.selected(), Some("src"));

    let unknown = push(
        &mut store,
        RemoteEvent::FileUnlinked {
            path: "src/ghost.ts".into(),
        },
    );
    assert!(!unknown.state_changed);
}

#[test]
fn change_updates_only_cached_files() {
    let mut store = loaded_src();
    store.dispatch(Action::FileOpened {
        path: "src/app.ts".into(),
        content: "old".to_string(),
    });

    let cached = push(
        &mut store,
        RemoteEvent::FileChanged {
            path: "src/app.ts".into(),
            content: "new".to_string(),
        },
    );
    assert!(cached.state_changed);
    assert_eq!(store.state().open_files.content("src/app.ts"), Some("new"));

    let uncached = push(
        &mut store,
        RemoteEvent::FileChanged {
            path: "README.md".into(),
            content: "x".to_string(),
        },
    );
    assert!(!uncached.state_changed);
    assert!(!store.state().open_files.is_cached("README.md"));
}

#[test]
fn bulk_add_builds_nested_folders_shallow_first() {
    let mut store = loaded_src();

    let result = push(
        &mut store,
        RemoteEvent::FolderAddBulk(vec![
            "src/gen/a/b".into(),
            "src/gen".into(),
            "src/gen/a".into(),
            "src/gen/c".into(),
            "elsewhere/x".into(),
        ]),
    );

    assert!(result.state_changed);
    let tree = store.state().explorer.tree();
    assert!(tree.is_dir("src/gen/a/b"));
    assert!(tree.is_dir("src/gen/c"));
    assert_eq!(tree.node_at("src/gen/a/b").unwrap().depth, 3);
    assert_eq!(tree.load_state("src/gen"), Some(LoadState::Loaded));
    assert_eq!(tree.load_state("src/gen/a/b"), Some(LoadState::NotLoaded));
    assert!(!tree.contains("elsewhere"));
}

#[test]
fn bulk_delete_tolerates_nested_and_unknown_paths() {
    let mut store = loaded_src();
    push(
        &mut store,
        RemoteEvent::FolderAddBulk(vec!["src/gen".into(), "src/gen/a".into()]),
    );

    let result = push(
        &mut store,
        RemoteEvent::FolderDelBulk(vec![
            "src/gen/a".into(),
            "src/gen".into(),
            "src/missing".into(),
        ]),
    );

    assert!(result.state_changed);
    let tree = store.state().explorer.tree();
    assert!(!tree.contains("src/gen"));
    assert!(tree.contains("src/utils"));
}
