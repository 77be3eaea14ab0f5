use super::*;
use tempfile::tempdir;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn fixture() -> (tempfile::TempDir, LocalFsAuthority) {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("src/utils")).unwrap();
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();
    std::fs::write(dir.path().join("src/app.ts"), "app").unwrap();
    std::fs::write(dir.path().join("README.md"), "# readme").unwrap();
    let authority = LocalFsAuthority::new(dir.path(), &ExplorerConfig::default());
    (dir, authority)
}

fn names(entries: &[RemoteEntry]) -> Vec<&str> {
    let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    names.sort_unstable();
    names
}

#[test]
fn lists_children_without_ignored_names() {
    let (_dir, authority) = fixture();

    let root = block_on(authority.fetch_children(FetchRequest {
        path: "".into(),
        depth: 0,
        large: false,
    }))
    .unwrap();
    assert_eq!(names(&root), vec!["README.md", "src"]);
    assert!(root.iter().all(|e| e.depth == 0));

    let src = block_on(authority.fetch_children(FetchRequest {
        path: "src".into(),
        depth: 0,
        large: false,
    }))
    .unwrap();
    let utils = src.iter().find(|e| e.name == "utils").unwrap();
    assert_eq!(utils.path, "src/utils");
    assert_eq!(utils.kind, NodeKind::Dir);
    assert_eq!(utils.depth, 1);
}

#[test]
fn listing_a_missing_folder_is_not_found() {
    let (_dir, authority) = fixture();
    let outcome = block_on(authority.fetch_children(FetchRequest {
        path: "nope".into(),
        depth: 0,
        large: false,
    }));
    assert!(matches!(outcome, Err(RemoteError::NotFound(p)) if p == "nope"));
}

#[test]
fn create_writes_files_and_folders() {
    let (dir, authority) = fixture();

    let file = block_on(authority.create("src/new.ts".into(), NodeKind::File)).unwrap();
    assert!(file.success);
    assert!(dir.path().join("src/new.ts").is_file());

    block_on(authority.create("docs".into(), NodeKind::Dir)).unwrap();
    assert!(dir.path().join("docs").is_dir());

    let again = block_on(authority.create("docs".into(), NodeKind::Dir));
    assert!(matches!(again, Err(RemoteError::AlreadyExists(p)) if p == "docs"));
}

#[test]
fn rename_move_and_delete_touch_the_disk() {
    let (dir, authority) = fixture();

    block_on(authority.rename("src".into(), "lib".into())).unwrap();
    assert!(dir.path().join("lib/app.ts").is_file());

    block_on(authority.move_path("lib/app.ts".into(), "app.ts".into())).unwrap();
    assert!(dir.path().join("app.ts").is_file());

    let clash = block_on(authority.rename("app.ts".into(), "README.md".into()));
    assert!(matches!(clash, Err(RemoteError::AlreadyExists(p)) if p == "README.md"));
    let gone = block_on(authority.move_path("nope.ts".into(), "src2.ts".into()));
    assert!(matches!(gone, Err(RemoteError::NotFound(_))));

    block_on(authority.delete("lib".into())).unwrap();
    assert!(!dir.path().join("lib").exists());
    assert!(block_on(authority.delete("".into())).is_err());
    assert!(matches!(
        block_on(authority.delete("lib".into())),
        Err(RemoteError::NotFound(_))
    ));
}

#[test]
fn resolve_stays_under_root() {
    let (dir, authority) = fixture();
    assert_eq!(authority.resolve("../etc/passwd"), dir.path().join("etc/passwd"));
    assert_eq!(authority.resolve(""), dir.path());
}
