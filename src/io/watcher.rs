use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to whoever owns the board session.
#[derive(Debug)]
pub enum BoardEvent {
    /// Card files or board.toml changed on disk; the board must refresh.
    Changed(Vec<PathBuf>),
}

/// A file system watcher for the board/ directory.
pub struct BoardWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<BoardEvent>,
}

/// Whether a changed path should trigger a refresh
fn is_relevant(board_dir: &Path, path: &Path) -> bool {
    if !path.starts_with(board_dir) {
        return false;
    }
    // Atomic rewrites go through temp files next to the card
    if let Some(name) = path.file_name().and_then(|n| n.to_str())
        && name.starts_with(".tmp")
    {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("toml")
    )
}

impl BoardWatcher {
    /// Start watching the given `board/` directory.
    pub fn start(board_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let board_dir_owned = board_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                let relevant: Vec<PathBuf> = event
                    .paths
                    .into_iter()
                    .filter(|p| is_relevant(&board_dir_owned, p))
                    .collect();

                if !relevant.is_empty() {
                    let _ = tx.send(BoardEvent::Changed(relevant));
                }
            },
            Config::default(),
        )?;

        watcher.watch(board_dir, RecursiveMode::Recursive)?;
        Ok(BoardWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events.
    pub fn poll(&self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block up to `timeout` for the next event, then drain anything queued
    /// behind it so a burst of writes becomes one refresh.
    pub fn wait(&self, timeout: Duration) -> Vec<BoardEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll());
                events
            }
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_filter() {
        let dir = Path::new("/b/board");
        assert!(is_relevant(dir, Path::new("/b/board/cards/a.md")));
        assert!(is_relevant(dir, Path::new("/b/board/board.toml")));
        assert!(!is_relevant(dir, Path::new("/b/board/cards/.tmpX1y2.md")));
        assert!(!is_relevant(dir, Path::new("/b/board/cards/a.txt")));
        assert!(!is_relevant(dir, Path::new("/elsewhere/a.md")));
    }
}
