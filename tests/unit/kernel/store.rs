use super::*;
use crate::kernel::services::ports::{ExplorerConfig, FetchRequest, RemoteEntry, RemoteEvent};
use crate::kernel::ExplorerError;
use crate::models::{path, FlatRow, LoadState, NodeKind};
use compact_str::CompactString;

const DIR: NodeKind = NodeKind::Dir;
const FILE: NodeKind = NodeKind::File;

fn request(folder: &str, large: bool) -> FetchRequest {
    FetchRequest {
        path: folder.into(),
        depth: if folder.is_empty() { 0 } else { path::depth_of(folder) },
        large,
    }
}

fn listing(folder: &str, items: &[(&str, NodeKind)]) -> Vec<RemoteEntry> {
    let depth = if folder.is_empty() { 0 } else { path::depth_of(folder) + 1 };
    items
        .iter()
        .map(|&(name, kind)| RemoteEntry {
            name: name.into(),
            path: path::join(folder, name),
            kind,
            depth,
        })
        .collect()
}

fn load(store: &mut Store, folder: &str, items: &[(&str, NodeKind)]) -> DispatchResult {
    store.dispatch(Action::ChildrenLoaded {
        request: request(folder, false),
        entries: listing(folder, items),
    })
}

fn store() -> Store {
    let mut store = Store::new(AppState::with_root("root", ExplorerConfig::default()));
    store.dispatch(Action::LoadRoot);
    load(
        &mut store,
        "",
        &[("src", DIR), ("README.md", FILE), ("node_modules", DIR)],
    );
    store
}

fn expand(store: &mut Store, folder: &str) -> DispatchResult {
    store.dispatch(Action::Expand {
        path: folder.into(),
    })
}

fn row_paths(store: &Store) -> Vec<String> {
    store
        .state()
        .explorer
        .rows()
        .rows
        .iter()
        .map(|r| r.path().to_string())
        .collect()
}

#[test]
fn load_root_fetches_once() {
    let mut store = Store::new(AppState::with_root("root", ExplorerConfig::default()));

    let first = store.dispatch(Action::LoadRoot);
    assert_eq!(first.effects, vec![Effect::FetchChildren(request("", false))]);
    let second = store.dispatch(Action::LoadRoot);
    assert!(second.effects.is_empty());

    load(&mut store, "", &[("b.txt", FILE), ("a", DIR)]);
    assert_eq!(row_paths(&store), vec!["a", "b.txt"]);
}

#[test]
fn expand_fetches_once_then_expands_on_arrival() {
    let mut store = store();

    let first = expand(&mut store, "src");
    assert_eq!(first.effects, vec![Effect::FetchChildren(request("src", false))]);
    assert_eq!(
        store.state().explorer.tree().load_state("src"),
        Some(LoadState::Loading)
    );
    assert!(!store.state().explorer.tree().is_expanded("src"));

    let again = expand(&mut store, "src");
    assert!(again.effects.is_empty());

    load(&mut store, "src", &[("app.ts", FILE), ("utils", DIR)]);
    assert!(store.state().explorer.tree().is_expanded("src"));
    assert_eq!(
        row_paths(&store),
        vec!["node_modules", "src", "src/utils", "src/app.ts", "README.md"]
    );
}

#[test]
fn fetched_folder_expands_without_fetch() {
    let mut store = store();
    expand(&mut store, "src");
    load(&mut store, "src", &[("app.ts", FILE)]);

    store.dispatch(Action::Collapse { path: "src".into() });
    assert_eq!(store.state().explorer.rows().len(), 3);

    let result = expand(&mut store, "src");
    assert!(result.effects.is_empty());
    assert!(result.state_changed);
    assert_eq!(store.state().explorer.rows().len(), 4);
}

#[test]
fn late_response_after_collapse_does_not_expand() {
    let mut store = store();
    expand(&mut store, "src");
    store.dispatch(Action::Collapse { path: "src".into() });

    load(&mut store, "src", &[("app.ts", FILE)]);

    let tree = store.state().explorer.tree();
    assert!(!tree.is_expanded("src"));
    assert_eq!(tree.load_state("src"), Some(LoadState::Loaded));
    assert!(expand(&mut store, "src").effects.is_empty());
    assert!(store.state().explorer.tree().is_expanded("src"));
}

#[test]
fn fetch_failure_leaves_folder_retryable() {
    let mut store = store();
    expand(&mut store, "src");

    store.dispatch(Action::ChildrenLoadFailed {
        request: request("src", false),
        error: "connection reset".to_string(),
    });

    let tree = store.state().explorer.tree();
    assert!(!tree.is_expanded("src"));
    assert_eq!(tree.load_state("src"), Some(LoadState::NotLoaded));
    assert!(matches!(
        store.state().notifications.latest().map(|n| &n.error),
        Some(ExplorerError::FetchFailed { .. })
    ));
    assert_eq!(expand(&mut store, "src").effects.len(), 1);
}

#[test]
fn large_directory_uses_depth_keyed_trigger() {
    let mut store = store();

    let result = expand(&mut store, "node_modules");
    assert_eq!(
        result.effects,
        vec![Effect::FetchChildren(request("node_modules", true))]
    );
    assert!(expand(&mut store, "node_modules").effects.is_empty());

    store.dispatch(Action::ChildrenLoaded {
        request: request("node_modules", true),
        entries: listing("node_modules", &[("react", DIR), ("lodash", DIR)]),
    });
    assert!(store.state().explorer.tree().is_expanded("node_modules"));

    store.dispatch(Action::Collapse {
        path: "node_modules".into(),
    });
    assert!(expand(&mut store, "node_modules").effects.is_empty());
}

#[test]
fn renaming_a_loading_folder_lets_the_new_path_fetch_again() {
    let mut store = store();
    expand(&mut store, "src");
    store.dispatch(Action::Rename {
        path: "src".into(),
        new_name: "lib".to_string(),
    });
    assert_eq!(
        store.state().explorer.tree().load_state("lib"),
        Some(LoadState::NotLoaded)
    );

    let late = load(&mut store, "src", &[("app.ts", FILE)]);
    assert!(!late.state_changed);
    assert!(!store.state().explorer.tree().contains("lib/app.ts"));

    let result = expand(&mut store, "lib");
    assert_eq!(result.effects, vec![Effect::FetchChildren(request("lib", false))]);
    load(&mut store, "lib", &[("app.ts", FILE)]);
    assert!(store.state().explorer.tree().is_expanded("lib"));
    assert!(store.state().explorer.tree().contains("lib/app.ts"));
}

#[test]
fn moving_a_loading_folder_drops_the_late_listing() {
    let mut store = store();
    expand(&mut store, "src");
    load(&mut store, "src", &[("utils", DIR)]);
    expand(&mut store, "src/utils");
    store.dispatch(Action::Move {
        path: "src/utils".into(),
        new_parent: "".into(),
    });

    load(&mut store, "src/utils", &[("a.ts", FILE)]);
    assert!(!store.state().explorer.tree().contains("utils/a.ts"));
    assert_eq!(
        expand(&mut store, "utils").effects,
        vec![Effect::FetchChildren(request("utils", false))]
    );
}

#[test]
fn large_listing_for_a_removed_folder_is_not_remembered() {
    let mut store = store();
    expand(&mut store, "node_modules");
    store.dispatch(Action::Remote(RemoteEvent::FolderUnlinked {
        path: "node_modules".into(),
    }));
    store.dispatch(Action::ChildrenLoaded {
        request: request("node_modules", true),
        entries: listing("node_modules", &[("react", DIR)]),
    });
    store.dispatch(Action::Remote(RemoteEvent::FolderAdded {
        path: "node_modules".into(),
    }));

    let result = expand(&mut store, "node_modules");
    assert_eq!(
        result.effects,
        vec![Effect::FetchChildren(request("node_modules", true))]
    );
    let tree = store.state().explorer.tree();
    assert!(!tree.is_expanded("node_modules"));
    assert_eq!(tree.load_state("node_modules"), Some(LoadState::Loading));
}

#[test]
fn listing_ignores_foreign_and_ignored_entries() {
    let mut store = store();
    expand(&mut store, "src");
    let mut entries = listing("src", &[("app.ts", FILE), (".git", DIR)]);
    entries.extend(listing("lib", &[("stray.ts", FILE)]));

    store.dispatch(Action::ChildrenLoaded {
        request: request("src", false),
        entries,
    });

    let tree = store.state().explorer.tree();
    assert!(tree.contains("src/app.ts"));
    assert!(!tree.contains("src/.git"));
    assert!(!tree.contains("src/stray.ts"));
}

#[test]
fn reveal_path_expands_ancestors_in_order() {
    let mut store = store();

    let first = store.dispatch(Action::RevealPath {
        path: "src/utils/a.ts".into(),
    });
    assert_eq!(first.effects, vec![Effect::FetchChildren(request("src", false))]);

    let second = load(&mut store, "src", &[("utils", DIR), ("app.ts", FILE)]);
    assert_eq!(
        second.effects,
        vec![Effect::FetchChildren(request("src/utils", false))]
    );

    let last = load(&mut store, "src/utils", &[("a.ts", FILE)]);
    assert_eq!(
        last.effects,
        vec![Effect::ScrollIntoView {
            path: "src/utils/a.ts".into(),
            row: 3,
        }]
    );
    assert_eq!(store.state().explorer.selected(), Some("src/utils/a.ts"));
    assert!(store.state().explorer.reveal.is_none());
}

#[test]
fn reveal_of_visible_path_scrolls_immediately() {
    let mut store = store();
    expand(&mut store, "src");
    load(&mut store, "src", &[("app.ts", FILE)]);

    let result = store.dispatch(Action::RevealPath {
        path: "src/app.ts".into(),
    });

    assert_eq!(
        result.effects,
        vec![Effect::ScrollIntoView {
            path: "src/app.ts".into(),
            row: 2,
        }]
    );
}

#[test]
fn reveal_aborts_on_missing_ancestor_or_failed_fetch() {
    let mut store = store();

    let missing = store.dispatch(Action::RevealPath {
        path: "lib/x.ts".into(),
    });
    assert!(missing.effects.is_empty());
    assert_eq!(
        store.state().notifications.latest().map(|n| &n.error),
        Some(&ExplorerError::NotFound("lib/x.ts".into()))
    );

    store.dispatch(Action::RevealPath {
        path: "src/a.ts".into(),
    });
    store.dispatch(Action::ChildrenLoadFailed {
        request: request("src", false),
        error: "boom".to_string(),
    });
    assert!(store.state().explorer.reveal.is_none());
}

#[test]
fn toggle_and_collapse_all() {
    let mut store = store();
    expand(&mut store, "src");
    load(&mut store, "src", &[("utils", DIR)]);
    expand(&mut store, "src/utils");
    load(&mut store, "src/utils", &[]);

    store.dispatch(Action::Toggle {
        path: "src/utils".into(),
    });
    assert!(!store.state().explorer.tree().is_expanded("src/utils"));

    let result = store.dispatch(Action::CollapseAll);
    assert!(result.state_changed);
    assert!(store.state().explorer.tree().expansion().is_empty());
    assert_eq!(store.state().explorer.rows().len(), 3);
}

#[test]
fn activate_opens_files_through_the_cache() {
    let mut store = store();

    let first = store.dispatch(Action::Activate {
        path: "README.md".into(),
    });
    assert_eq!(first.effects, vec![Effect::OpenFile("README.md".into())]);
    store.dispatch(Action::FileOpened {
        path: "README.md".into(),
        content: "# hi".to_string(),
    });

    let again = store.dispatch(Action::Activate {
        path: "README.md".into(),
    });
    assert!(again.effects.is_empty());
    assert_eq!(store.state().open_files.active(), Some("README.md"));
    assert_eq!(store.state().open_files.content("README.md"), Some("# hi"));
}

#[test]
fn select_requires_existing_path() {
    let mut store = store();
    assert!(!store
        .dispatch(Action::Select {
            path: Some("nope".into()),
        })
        .state_changed);
    assert!(store
        .dispatch(Action::Select {
            path: Some(CompactString::from("src")),
        })
        .state_changed);
    assert_eq!(store.state().explorer.selected(), Some("src"));
}

#[test]
fn viewport_actions_update_window() {
    let mut store = store();
    expand(&mut store, "node_modules");
    let names: Vec<String> = (0..100).map(|i| format!("pkg{i:03}")).collect();
    let items: Vec<(&str, NodeKind)> = names.iter().map(|n| (n.as_str(), DIR)).collect();
    store.dispatch(Action::ChildrenLoaded {
        request: request("node_modules", true),
        entries: listing("node_modules", &items),
    });

    assert!(store.dispatch(Action::ViewportResize { height: 220 }).state_changed);
    assert!(store
        .dispatch(Action::ViewportScroll { scroll_top: 440 })
        .state_changed);

    let explorer = &store.state().explorer;
    assert_eq!(explorer.viewport().first_visible(), 20);
    assert_eq!(explorer.rows().expanded["node_modules"].visible_start_offset, 19);
    assert!(matches!(explorer.visible_rows()[0], FlatRow::Folder(_)));
    assert_eq!(explorer.visible_rows().len(), 26);
}

#[path = "store/remote_events.rs"]
mod remote_events;
