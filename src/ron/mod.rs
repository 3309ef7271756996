//! RON file loading and directory watching.
//!
//! Settings live in plain `.ron` files. This module reads every `.ron` file
//! in a directory into a typed value and offers a small `notify` based
//! watcher that raises a shared flag whenever one of those files is modified,
//! so the game can hot-reload its tuning while running.

use bevy::log::{error, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// File-watcher handle used for RON hot-reload.
pub struct RonWatcher {
    pub changed: Arc<Mutex<bool>>, // Set to `true` by the notify thread when a watched file changes.
    _watcher: Option<RecommendedWatcher>, // Kept alive so the OS watch is not dropped.
}

impl RonWatcher {
    /// A watcher with no OS backing. `changed` never flips on its own.
    ///
    /// Used as a fallback when the platform watcher cannot be created.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(Mutex::new(false)),
            _watcher: None,
        }
    }

    /// Whether an OS watcher is attached.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self._watcher.is_some()
    }

    /// Return the pending change flag and clear it.
    ///
    /// A poisoned mutex is recovered rather than propagated: the flag is a
    /// plain bool and cannot be left half-written.
    pub fn take_changed(&self) -> bool {
        let mut flag = match self.changed.lock() {
            Ok(flag) => flag,
            Err(poisoned) => {
                warn!("ron watcher mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        std::mem::take(&mut *flag)
    }
}

fn is_ron_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ron")
}

/// Load all `.ron` files from a directory and deserialize them into `T`.
///
/// Files are visited in name order so the result is stable across
/// platforms. Files that fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(path) {
        Ok(entries) => entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.is_file() && is_ron_file(p))
            .collect(),
        Err(_) => return Vec::new(),
    };
    paths.sort();

    let mut items = Vec::new();
    for p in paths {
        let Ok(content) = std::fs::read_to_string(&p) else { continue };
        match ron::from_str::<T>(&content) {
            Ok(item) => items.push(item),
            Err(e) => warn!("failed to parse {}: {e}", p.display()),
        }
    }
    items
}

/// Watch `path` (non-recursively) for modifications of `.ron` files.
///
/// # Errors
/// Returns a `notify::Error` if the platform watcher cannot be created or
/// cannot be registered for `path`.
pub fn setup_ron_watcher(path: &str) -> Result<RonWatcher, notify::Error> {
    let changed = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&changed);
    let watched: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    let canon = std::fs::canonicalize(p).unwrap_or_else(|_| p.clone());
                    canon.starts_with(&watched) && is_ron_file(&canon)
                });
                if relevant {
                    match flag.lock() {
                        Ok(mut f) => *f = true,
                        Err(poisoned) => *poisoned.into_inner() = true,
                    }
                }
            }
            Err(e) => error!("watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, _watcher: Some(watcher) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Knob {
        value: u32,
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stride-ron-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_ron_files_in_name_order_and_skips_broken_ones() {
        let dir = scratch_dir("order");
        std::fs::write(dir.join("b.ron"), "(value: 2)").unwrap();
        std::fs::write(dir.join("a.ron"), "(value: 1)").unwrap();
        std::fs::write(dir.join("c.ron"), "(value: oops)").unwrap();
        std::fs::write(dir.join("notes.txt"), "(value: 9)").unwrap();

        let items: Vec<Knob> = load_ron_files(dir.to_str().unwrap());
        assert_eq!(items, vec![Knob { value: 1 }, Knob { value: 2 }]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let items: Vec<Knob> = load_ron_files("definitely/not/a/real/dir");
        assert!(items.is_empty());
    }

    #[test]
    fn stub_watcher_reports_no_changes_until_flagged() {
        let w = RonWatcher::stub();
        assert!(!w.is_live());
        assert!(!w.take_changed());
        *w.changed.lock().unwrap() = true;
        assert!(w.take_changed());
        assert!(!w.take_changed());
    }
}
