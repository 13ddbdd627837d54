//! Deck watching for live reload.
//!
//! Uses notify crate for cross-platform file system events.
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::deck::DeckSource;

/// Watches a deck source and emits debounced reload notifications.
///
/// Directory decks react to any `.md` / `.cast` file inside the watched
/// directory; single-document decks react only to the document itself.
pub struct DeckWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    /// Set in single-document mode; directory decks accept any slide file.
    document: Option<PathBuf>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl DeckWatcher {
    /// Create a watcher for `source`.
    ///
    /// # Errors
    /// Returns an error if the file watcher cannot be created or the
    /// directory cannot be watched.
    pub fn new(source: &DeckSource, debounce: Duration) -> notify::Result<Self> {
        // Canonicalize so event paths from the OS (which are always absolute
        // and canonical) match our stored paths.
        let watch_root = source
            .watch_dir()
            .canonicalize()
            .unwrap_or_else(|_| source.watch_dir().to_path_buf());
        let document = match source {
            DeckSource::Directory(_) => None,
            DeckSource::Document(path) => {
                Some(path.canonicalize().unwrap_or_else(|_| path.clone()))
            }
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            document,
            debounce,
            pending_since: None,
        })
    }

    /// The canonical directory being watched.
    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    /// Returns true once a debounced deck change is ready. Each relevant
    /// event restarts the quiet period, collapsing save bursts into one
    /// reload.
    pub fn take_reload_ready(&mut self) -> bool {
        let mut saw_relevant_event = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => {
                    saw_relevant_event = true;
                }
                Ok(ev) => {
                    tracing::debug!(kind = ?ev.kind, paths = ?ev.paths, "ignoring watcher event");
                }
                Err(err) => {
                    tracing::warn!("watcher error: {err}");
                }
            }
        }

        if saw_relevant_event {
            self.pending_since = Some(Instant::now());
        }

        let Some(pending_since) = self.pending_since else {
            return false;
        };
        if pending_since.elapsed() >= self.debounce {
            self.pending_since = None;
            return true;
        }
        false
    }

    fn is_relevant(&self, event: &Event) -> bool {
        if let Some(document) = &self.document {
            let name = document.file_name();
            return event.paths.iter().any(|path| {
                path == document
                    || path == &self.watch_root
                    || name.is_some_and(|n| path.file_name().is_some_and(|f| f == n))
            });
        }
        event
            .paths
            .iter()
            .any(|path| path == &self.watch_root || has_slide_extension(path))
    }
}

fn has_slide_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "md" || ext == "cast")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event_for(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_slide_files_are_relevant_in_directory_mode() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical_dir.join("01_intro.md"), "# Hi").expect("write");
        let source = DeckSource::Directory(canonical_dir.clone());
        let watcher = DeckWatcher::new(&source, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event_for(vec![canonical_dir.join("01_intro.md")])));
        assert!(watcher.is_relevant(&event_for(vec![canonical_dir.join("02_demo.cast")])));
        assert!(
            !watcher.is_relevant(&event_for(vec![canonical_dir.join("notes.txt")])),
            "non-slide files must not trigger a reload"
        );
    }

    #[test]
    fn test_directory_level_event_is_relevant() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical_dir.join("01_intro.md"), "# Hi").expect("write");
        let source = DeckSource::Directory(canonical_dir.clone());
        let watcher = DeckWatcher::new(&source, Duration::from_millis(10)).expect("watcher");

        // Event with canonical directory path (as macOS FSEvents would report)
        let event = event_for(vec![canonical_dir]);
        assert!(
            watcher.is_relevant(&event),
            "directory-level events should count as relevant for many backends"
        );
    }

    #[test]
    fn test_document_mode_ignores_sibling_slides() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let doc = canonical_dir.join("deck.md");
        std::fs::write(&doc, "# Deck").expect("write");
        std::fs::write(canonical_dir.join("other.md"), "# Other").expect("write");
        let source = DeckSource::Document(doc.clone());
        let watcher = DeckWatcher::new(&source, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.is_relevant(&event_for(vec![doc])));
        assert!(
            !watcher.is_relevant(&event_for(vec![canonical_dir.join("other.md")])),
            "sibling files must not reload a single-document deck"
        );
    }

    #[test]
    fn test_real_slide_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("01_intro.md");
        std::fs::write(&path, "# Original").expect("write");

        let source = DeckSource::Directory(canonical_dir);
        let mut watcher = DeckWatcher::new(&source, Duration::from_millis(50)).expect("watcher");

        // Give FSEvents time to register the watch
        std::thread::sleep(Duration::from_millis(500));

        // Modify the slide
        std::fs::write(&path, "# Modified").expect("write");

        // Poll until the reload is ready or timeout after 5 seconds
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_reload_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        assert!(
            detected,
            "watcher should detect slide modification within 5 seconds"
        );
    }

    /// Test with the same debounce and poll interval as the real event loop.
    #[test]
    fn test_new_slide_with_app_timing() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        std::fs::write(canonical_dir.join("01_intro.md"), "# Intro").expect("write");

        // Same debounce as the real app (100ms)
        let source = DeckSource::Directory(canonical_dir.clone());
        let mut watcher = DeckWatcher::new(&source, Duration::from_millis(100)).expect("watcher");

        // Give FSEvents time to register
        std::thread::sleep(Duration::from_millis(500));

        // Drop a new slide in (simulates another process saving)
        std::fs::write(canonical_dir.join("02_added.md"), "# Added").expect("write");

        // Poll at 250ms intervals (same as event loop)
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_reload_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(250));
        }

        assert!(
            detected,
            "watcher should detect a new slide with real app timing (100ms debounce, 250ms poll)"
        );
    }
}
