use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use compact_str::CompactString;
use vexplorer::app::ExplorerApp;
use vexplorer::kernel::services::adapters::{
    ensure_settings_file, load_settings, relative_tree_path, AsyncRuntime, FileWatcherService,
    LocalFsAuthority,
};
use vexplorer::kernel::{Action, AppState, Effect};
use vexplorer::models::{FlatRow, LoadState};

mod logging;

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);
const WATCH_TICK: Duration = Duration::from_millis(100);

const USAGE: &str = "usage: vexplorer [PATH] [--reveal <tree/path>] [--watch]";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    path: Option<String>,
    reveal: Option<String>,
    watch: bool,
}

#[derive(Debug)]
struct StartupPaths {
    root: PathBuf,
    open_file: Option<PathBuf>,
}

fn parse_args<I>(args: I) -> io::Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--watch" || arg == "-w" {
            out.watch = true;
        } else if arg == "--reveal" {
            let value = args.next().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "--reveal needs a path")
            })?;
            out.reveal = Some(value);
        } else if let Some(value) = arg.strip_prefix("--reveal=") {
            out.reveal = Some(value.to_string());
        } else if arg.starts_with('-') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown option `{arg}`\n{USAGE}"),
            ));
        } else if out.path.is_none() {
            out.path = Some(arg);
        } else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, USAGE));
        }
    }
    Ok(out)
}

/// A directory argument becomes the workspace root. A file argument keeps the
/// current directory as root when it lives inside it, otherwise its parent.
fn resolve_startup_paths(cwd: &Path, arg: Option<&str>) -> io::Result<StartupPaths> {
    let Some(arg) = arg else {
        return Ok(StartupPaths {
            root: cwd.to_path_buf(),
            open_file: None,
        });
    };
    let raw = Path::new(arg);
    let target = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        cwd.join(raw)
    };
    let meta = std::fs::metadata(&target)?;
    if meta.is_dir() {
        return Ok(StartupPaths {
            root: target,
            open_file: None,
        });
    }

    let root = if target.starts_with(cwd) {
        cwd.to_path_buf()
    } else {
        target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf())
    };
    Ok(StartupPaths {
        root,
        open_file: Some(target),
    })
}

fn print_rows(out: &mut impl Write, app: &ExplorerApp) -> io::Result<()> {
    let explorer = &app.state().explorer;
    let selected = explorer.selected();
    for row in &explorer.rows().rows {
        let marker = if selected == Some(row.path()) { '>' } else { ' ' };
        let indent = "  ".repeat(row.depth() as usize);
        match row {
            FlatRow::Folder(folder) => {
                let arrow = if folder.is_expanded { 'v' } else { '>' };
                let suffix = match folder.load_state {
                    LoadState::Loading => " (loading)",
                    _ => "",
                };
                writeln!(out, "{marker} {indent}{arrow} {}/{suffix}", folder.name)?;
            }
            FlatRow::File(file) => writeln!(out, "{marker} {indent}  {}", file.name)?,
            FlatRow::Input(input) => writeln!(out, "{marker} {indent}  [{}]", input.value)?,
        }
    }
    for notification in app.state().notifications.iter() {
        writeln!(out, "! {}", notification.error)?;
    }
    out.flush()
}

fn main() -> io::Result<()> {
    let _logging = logging::init();
    let args = parse_args(std::env::args().skip(1))?;
    if let Err(error) = ensure_settings_file() {
        tracing::warn!(error = %error, "cannot create settings file");
    }
    let settings = load_settings();
    let cwd = std::env::current_dir()?;
    let requested = args.path.clone().or_else(|| settings.workspace.clone());
    let startup = resolve_startup_paths(&cwd, requested.as_deref())?;
    let config = settings.explorer;
    tracing::info!(root = %startup.root.display(), watch = args.watch, "starting explorer");

    let root_name = startup
        .root
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("workspace")
        .to_string();
    let runtime = Arc::new(AsyncRuntime::new()?);
    let authority = LocalFsAuthority::new(&startup.root, &config);
    let mut app = ExplorerApp::new(
        AppState::with_root(&root_name, config.clone()),
        Arc::new(authority.clone()),
        runtime,
    );
    if args.watch {
        match FileWatcherService::new(&startup.root, &config) {
            Ok(watcher) => app = app.with_file_watcher(watcher),
            Err(error) => tracing::warn!(error = %error, "file watcher unavailable"),
        }
    }

    app.dispatch(Action::LoadRoot);
    let loaded = app.run_until(LOAD_TIMEOUT, |s| {
        s.explorer.tree().load_state("") != Some(LoadState::Loading)
    });
    if !loaded {
        tracing::warn!("workspace root listing timed out");
    }

    let reveal = args.reveal.map(CompactString::from).or_else(|| {
        startup
            .open_file
            .as_deref()
            .and_then(|file| relative_tree_path(&startup.root, file, &[]))
    });
    if let Some(target) = reveal {
        app.dispatch(Action::RevealPath {
            path: target.clone(),
        });
        app.run_until(LOAD_TIMEOUT, |s| {
            s.explorer.selected() == Some(target.as_str()) || !s.notifications.is_empty()
        });
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{root_name}")?;
    print_rows(&mut out, &app)?;

    if !args.watch {
        return Ok(());
    }
    loop {
        let mut changed = app.pump(WATCH_TICK);
        for effect in app.take_ui_effects() {
            if let Effect::OpenFile(target) = effect {
                match std::fs::read_to_string(authority.resolve(&target)) {
                    Ok(content) => {
                        changed |= app.dispatch(Action::FileOpened {
                            path: target,
                            content,
                        });
                    }
                    Err(error) => {
                        tracing::warn!(path = %target, error = %error, "failed to open file");
                    }
                }
            }
        }
        if changed {
            writeln!(out, "--- {root_name}")?;
            print_rows(&mut out, &app)?;
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/cli_startup_paths.rs"]
mod tests;
