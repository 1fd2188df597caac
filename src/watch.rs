//! Watches the deck definition file so edits reload the running deck.

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use notify::{
    Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Result as NotifyResult, Watcher,
    event::{CreateKind, ModifyKind, RemoveKind},
};
use tracing::warn;

use crate::events::DeckFileChanged;

/// Watch the directory containing `deck_path` and forward a notification
/// whenever the deck file itself is created, rewritten, or replaced.
///
/// The parent directory is watched rather than the file: editors commonly
/// save via write-to-temp-then-rename, which drops a watch registered on the
/// file inode itself.
pub fn start_watcher(deck_path: &Path, tx: Sender<DeckFileChanged>) -> NotifyResult<RecommendedWatcher> {
    let target: PathBuf = deck_path.to_path_buf();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => handle_event(event, &target, &tx),
        Err(e) => warn!("deck watch error: {e}"),
    })?;

    watcher.configure(Config::default())?;

    let dir = deck_path.parent().filter(|p| !p.as_os_str().is_empty());
    match dir {
        Some(dir) => watcher.watch(dir, RecursiveMode::NonRecursive)?,
        None => watcher.watch(Path::new("."), RecursiveMode::NonRecursive)?,
    }
    Ok(watcher)
}

fn handle_event(event: Event, target: &Path, tx: &Sender<DeckFileChanged>) {
    let relevant = matches!(
        event.kind,
        EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
            | EventKind::Remove(RemoveKind::File)
    );
    if !relevant {
        return;
    }
    if event.paths.iter().any(|p| paths_match(p, target)) {
        let _ = tx.send(DeckFileChanged);
    }
}

fn paths_match(candidate: &Path, target: &Path) -> bool {
    if candidate == target {
        return true;
    }
    // Watchers report absolute paths; the configured deck path may be
    // relative. Compare file names within the watched directory.
    candidate.file_name().is_some() && candidate.file_name() == target.file_name()
}
