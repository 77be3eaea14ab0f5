use std::time::{Duration, Instant};

use vexplorer::models::{
    flatten, path, reachable_count, ExpansionState, FileTree, FlattenOptions, NodeKind,
    TreeError,
};
use vexplorer::views::ExplorerViewport;

fn main() {
    let mut packages: usize = 400;
    let mut files: usize = 25;
    let mut iterations: usize = 50;

    for arg in std::env::args().skip(1) {
        if let Some(value) = arg.strip_prefix("--packages=") {
            packages = value.parse().unwrap_or(packages);
        } else if let Some(value) = arg.strip_prefix("--files=") {
            files = value.parse().unwrap_or(files);
        } else if let Some(value) = arg.strip_prefix("--iterations=") {
            iterations = value.parse().unwrap_or(iterations);
        }
    }

    let build_start = Instant::now();
    let (tree, folders) = match build_fixture_tree(packages, files) {
        Ok(fixture) => fixture,
        Err(error) => {
            eprintln!("failed to build fixture tree: {error}");
            std::process::exit(1);
        }
    };
    println!(
        "build: nodes={} folders={} total={:?}",
        tree.node_count(),
        folders.len(),
        build_start.elapsed()
    );

    let mut expansion = ExpansionState::new();
    expansion.set("src", true);
    bench_flatten("collapsed deps", &tree, &expansion, iterations);

    expansion.set("node_modules", true);
    bench_flatten("deps listed", &tree, &expansion, iterations);

    for folder in &folders {
        expansion.set(folder, true);
    }
    bench_flatten("fully expanded", &tree, &expansion, iterations);

    let rows = flatten(&tree, &expansion, &FlattenOptions::default(), None);
    let mut viewport = ExplorerViewport::new(22, 8);
    viewport.set_height(900);
    viewport.set_row_count(rows.len());
    let scroll_start = Instant::now();
    let mut materialized = 0usize;
    let step = 22 * 7;
    let mut top = 0u64;
    while top < viewport.total_height() {
        viewport.scroll_to(top);
        materialized += viewport.visible_range().len();
        top += step;
    }
    println!(
        "scroll: rows={} materialized={} total={:?}",
        rows.len(),
        materialized,
        scroll_start.elapsed()
    );
}

fn build_fixture_tree(
    packages: usize,
    files: usize,
) -> Result<(FileTree, Vec<String>), TreeError> {
    let mut tree = FileTree::new("bench");
    let mut folders = Vec::new();
    tree.insert_children(
        "",
        [
            ("src", NodeKind::Dir),
            ("node_modules", NodeKind::Dir),
            ("README.md", NodeKind::File),
        ],
    )?;
    folders.push("src".to_string());
    folders.push("node_modules".to_string());

    let src_files: Vec<String> = (0..files * 4).map(|i| format!("module_{i}.ts")).collect();
    tree.insert_children("src", src_files.iter().map(|n| (n.as_str(), NodeKind::File)))?;

    let names: Vec<String> = (0..packages).map(|i| format!("pkg-{i}")).collect();
    tree.insert_children(
        "node_modules",
        names.iter().map(|n| (n.as_str(), NodeKind::Dir)),
    )?;
    let file_names: Vec<String> = (0..files).map(|i| format!("file_{i}.js")).collect();
    for name in &names {
        let package = path::join("node_modules", name);
        tree.insert_children(
            &package,
            [("lib", NodeKind::Dir), ("package.json", NodeKind::File)],
        )?;
        let lib = path::join(&package, "lib");
        tree.insert_children(&lib, file_names.iter().map(|n| (n.as_str(), NodeKind::File)))?;
        folders.push(package.to_string());
        folders.push(lib.to_string());
    }
    Ok((tree, folders))
}

fn bench_flatten(label: &str, tree: &FileTree, expansion: &ExpansionState, iterations: usize) {
    let reachable = reachable_count(tree, expansion);
    let start = Instant::now();
    let mut rows = 0usize;
    for _ in 0..iterations {
        rows = flatten(tree, expansion, &FlattenOptions::default(), None).len();
    }
    let elapsed = start.elapsed();
    print_flatten_summary(label, rows, reachable, iterations, elapsed);
}

fn print_flatten_summary(
    label: &str,
    rows: usize,
    reachable: usize,
    iterations: usize,
    elapsed: Duration,
) {
    let per_pass = elapsed.as_secs_f64() / iterations.max(1) as f64;
    let ns_per_row = if rows > 0 {
        per_pass * 1_000_000_000.0 / rows as f64
    } else {
        0.0
    };
    println!(
        "flatten[{label}]: rows={rows} reachable={reachable} us/pass={:.1} ns/row={:.1}",
        per_pass * 1_000_000.0,
        ns_per_row
    );
}
