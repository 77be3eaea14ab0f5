use super::*;

fn create_service_with_raw_channel(
    workspace_root: &Path,
    bulk_threshold: usize,
) -> (FileWatcherService, mpsc::Sender<notify::Event>) {
    let (tx, rx) = mpsc::channel();
    let watcher = RecommendedWatcher::new(
        |_| {},
        Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
    )
    .expect("create watcher");
    (
        FileWatcherService {
            _watcher: watcher,
            raw_event_rx: rx,
            workspace_root: workspace_root
                .canonicalize()
                .expect("canonicalize workspace"),
            ignored: vec![".git".to_string(), "node_modules".to_string()],
            bulk_threshold,
            open_files: FxHashMap::default(),
        },
        tx,
    )
}

fn event(kind: EventKind, paths: Vec<PathBuf>) -> notify::Event {
    notify::Event {
        kind,
        paths,
        attrs: Default::default(),
    }
}

#[test]
fn modify_name_events_are_normalized_as_modified() {
    let path = PathBuf::from("/tmp/vexplorer-watch-name-modified.ts");
    let deltas = normalize_notify_event(event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
        vec![path.clone()],
    ));
    assert_eq!(deltas, vec![FsDelta::Modified { path }]);
}

#[test]
fn created_files_and_folders_become_add_events() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    std::fs::create_dir(root.join("src")).expect("mkdir");
    std::fs::write(root.join("src/app.ts"), "").expect("write");

    let (mut service, tx) = create_service_with_raw_channel(&root, 8);
    tx.send(event(
        EventKind::Create(CreateKind::File),
        vec![root.join("src/app.ts")],
    ))
    .expect("send");
    tx.send(event(
        EventKind::Create(CreateKind::Folder),
        vec![root.join("src")],
    ))
    .expect("send");

    assert_eq!(
        service.drain_events(),
        vec![
            RemoteEvent::FolderAdded { path: "src".into() },
            RemoteEvent::FileAdded {
                path: "src/app.ts".into()
            },
        ]
    );
    assert!(service.drain_events().is_empty());
}

#[test]
fn removals_come_before_adds_and_shallow_first() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    std::fs::write(root.join("fresh.ts"), "").expect("write");

    let (mut service, tx) = create_service_with_raw_channel(&root, 8);
    tx.send(event(
        EventKind::Create(CreateKind::File),
        vec![root.join("fresh.ts")],
    ))
    .expect("send");
    tx.send(event(
        EventKind::Remove(RemoveKind::File),
        vec![root.join("lib/deep/gone.ts")],
    ))
    .expect("send");
    tx.send(event(
        EventKind::Remove(RemoveKind::Folder),
        vec![root.join("lib")],
    ))
    .expect("send");

    assert_eq!(
        service.drain_events(),
        vec![
            RemoteEvent::FolderUnlinked { path: "lib".into() },
            RemoteEvent::FileUnlinked {
                path: "lib/deep/gone.ts".into()
            },
            RemoteEvent::FileAdded {
                path: "fresh.ts".into()
            },
        ]
    );
}

#[test]
fn ignored_and_outside_paths_are_dropped() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let outside = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    std::fs::create_dir_all(root.join("node_modules/react")).expect("mkdir");
    std::fs::write(outside.path().join("x.ts"), "").expect("write");

    let (mut service, tx) = create_service_with_raw_channel(&root, 8);
    tx.send(event(
        EventKind::Create(CreateKind::Folder),
        vec![root.join("node_modules/react")],
    ))
    .expect("send");
    tx.send(event(
        EventKind::Create(CreateKind::File),
        vec![outside.path().join("x.ts")],
    ))
    .expect("send");

    assert!(service.drain_events().is_empty());
}

#[test]
fn sibling_folder_bursts_are_coalesced_into_bulk_events() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    let mut folders = Vec::new();
    for i in 0..3 {
        let folder = root.join(format!("pkg{i}"));
        std::fs::create_dir(&folder).expect("mkdir");
        folders.push(folder);
    }
    std::fs::write(root.join("pkg0/index.ts"), "").expect("write");

    let (mut service, tx) = create_service_with_raw_channel(&root, 3);
    for folder in &folders {
        tx.send(event(
            EventKind::Create(CreateKind::Folder),
            vec![folder.clone()],
        ))
        .expect("send");
    }
    tx.send(event(
        EventKind::Create(CreateKind::File),
        vec![root.join("pkg0/index.ts")],
    ))
    .expect("send");

    assert_eq!(
        service.drain_events(),
        vec![
            RemoteEvent::FolderAddBulk(vec!["pkg0".into(), "pkg1".into(), "pkg2".into()]),
            RemoteEvent::FileAdded {
                path: "pkg0/index.ts".into()
            },
        ]
    );

    for folder in &folders {
        std::fs::remove_dir_all(folder).expect("rmdir");
        tx.send(event(
            EventKind::Remove(RemoveKind::Folder),
            vec![folder.clone()],
        ))
        .expect("send");
    }
    assert_eq!(
        service.drain_events(),
        vec![RemoteEvent::FolderDelBulk(vec![
            "pkg0".into(),
            "pkg1".into(),
            "pkg2".into()
        ])]
    );
}

#[test]
fn content_changes_are_reported_only_for_open_files() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    std::fs::write(root.join("open.ts"), "a").expect("write");
    std::fs::write(root.join("closed.ts"), "a").expect("write");

    let (mut service, tx) = create_service_with_raw_channel(&root, 8);
    service.sync_open_files(["open.ts"]);

    std::fs::write(root.join("open.ts"), "changed").expect("write");
    std::fs::write(root.join("closed.ts"), "changed").expect("write");
    tx.send(event(
        EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)),
        vec![root.join("open.ts"), root.join("closed.ts")],
    ))
    .expect("send");

    assert_eq!(
        service.drain_events(),
        vec![RemoteEvent::FileChanged {
            path: "open.ts".into(),
            content: "changed".to_string(),
        }]
    );

    tx.send(event(
        EventKind::Modify(ModifyKind::Metadata(notify::event::MetadataKind::Any)),
        vec![root.join("open.ts")],
    ))
    .expect("send");
    assert!(
        service.drain_events().is_empty(),
        "unchanged fingerprint should not report a change"
    );
}

#[test]
fn atomic_save_rename_reports_unlink_add_and_change() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let root = dir.path().canonicalize().expect("canonicalize");
    let target = root.join("a.ts");
    std::fs::write(&target, "old").expect("write target");

    let (mut service, tx) = create_service_with_raw_channel(&root, 8);
    service.sync_open_files(["a.ts"]);

    let tmp = root.join(".a.ts.tmp");
    std::fs::write(&tmp, "new content").expect("write tmp");
    std::fs::rename(&tmp, &target).expect("rename");
    tx.send(event(
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
        vec![tmp, target],
    ))
    .expect("send");

    let events = service.drain_events();
    assert!(events.contains(&RemoteEvent::FileUnlinked {
        path: ".a.ts.tmp".into()
    }));
    assert!(events.contains(&RemoteEvent::FileAdded {
        path: "a.ts".into()
    }));
    assert!(events.contains(&RemoteEvent::FileChanged {
        path: "a.ts".into(),
        content: "new content".to_string(),
    }));
}

#[test]
fn relative_tree_path_maps_below_root_only() {
    let root = Path::new("/work/project");
    let ignored = vec![".git".to_string()];
    assert_eq!(
        relative_tree_path(root, Path::new("/work/project/src/app.ts"), &ignored),
        Some(CompactString::from("src/app.ts"))
    );
    assert_eq!(relative_tree_path(root, root, &ignored), None);
    assert_eq!(
        relative_tree_path(root, Path::new("/work/other/a.ts"), &ignored),
        None
    );
    assert_eq!(
        relative_tree_path(root, Path::new("/work/project/.git/HEAD"), &ignored),
        None
    );
}
