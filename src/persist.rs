//! Persisted window-state file handling.
//!
//! JSON format: a `windows` array of `{id, title, x, y, width, height,
//! state}` objects plus a `focused_window` id with `-1` meaning "none".
//! The `-1` sentinel exists only at this file boundary; in memory the
//! focused window is an `Option`.
//!
//! Loading validates the entire snapshot before any window is
//! materialized, so a malformed file can never leave a partially restored
//! set behind.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::EventClock;
use crate::config::WmConfig;
use crate::window::{Window, WindowError, WindowId, WindowState};

pub(crate) const NO_FOCUS: i64 = -1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("window state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("window state file is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown window state tag {0}")]
    UnknownState(u8),

    #[error("duplicate window id {0}")]
    DuplicateId(u64),

    #[error("focused window {0} is not in the snapshot")]
    FocusedMissing(i64),

    #[error("invalid window entry: {0}")]
    InvalidWindow(#[from] WindowError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SavedWindow {
    id: u64,
    title: String,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    state: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Snapshot {
    windows: Vec<SavedWindow>,
    focused_window: i64,
}

/// A fully validated restored window set, ready to swap in.
pub(crate) struct RestoredState {
    pub windows: HashMap<WindowId, Window>,
    pub focused: Option<WindowId>,
    pub max_id: u64,
}

fn state_tag(state: WindowState) -> u8 {
    match state {
        WindowState::Normal => 0,
        WindowState::Minimized => 1,
        WindowState::Maximized => 2,
        WindowState::Fullscreen => 3,
        WindowState::Hidden => 4,
    }
}

fn state_from_tag(tag: u8) -> Result<WindowState, PersistError> {
    match tag {
        0 => Ok(WindowState::Normal),
        1 => Ok(WindowState::Minimized),
        2 => Ok(WindowState::Maximized),
        3 => Ok(WindowState::Fullscreen),
        4 => Ok(WindowState::Hidden),
        other => Err(PersistError::UnknownState(other)),
    }
}

/// Serialize every live window plus the focused id to `path`.
pub(crate) fn save(
    path: &Path,
    windows: &HashMap<WindowId, Window>,
    focused: Option<WindowId>,
) -> Result<(), PersistError> {
    let mut saved: Vec<SavedWindow> = windows
        .values()
        .map(|window| {
            let g = window.geometry();
            // Minimized/hidden windows persist the coarse state even
            // though visibility is a separate flag in memory.
            let state = if window.is_visible() || window.state() != WindowState::Normal {
                window.state()
            } else {
                WindowState::Hidden
            };
            SavedWindow {
                id: window.id().0,
                title: window.title().to_string(),
                x: g.x,
                y: g.y,
                width: g.width,
                height: g.height,
                state: state_tag(state),
            }
        })
        .collect();
    // Stable file contents regardless of map iteration order
    saved.sort_by_key(|w| w.id);

    let snapshot = Snapshot {
        windows: saved,
        focused_window: focused.map_or(NO_FOCUS, |id| id.0 as i64),
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load and fully validate a snapshot, materializing windows into a
/// staging set. The caller swaps the result in only on success.
pub(crate) fn load(
    path: &Path,
    config: &WmConfig,
    clock: &EventClock,
) -> Result<RestoredState, PersistError> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;

    let mut windows = HashMap::with_capacity(snapshot.windows.len());
    let mut max_id = 0;
    for saved in snapshot.windows {
        let state = state_from_tag(saved.state)?;
        let id = WindowId(saved.id);
        let window = Window::from_saved(
            id,
            saved.title,
            saved.x,
            saved.y,
            saved.width,
            saved.height,
            state,
            config,
            clock.clone(),
        )?;
        if windows.insert(id, window).is_some() {
            return Err(PersistError::DuplicateId(saved.id));
        }
        max_id = max_id.max(saved.id);
    }

    let focused = match snapshot.focused_window {
        NO_FOCUS => None,
        id if id >= 0 && windows.contains_key(&WindowId(id as u64)) => Some(WindowId(id as u64)),
        id => return Err(PersistError::FocusedMissing(id)),
    };

    Ok(RestoredState {
        windows,
        focused,
        max_id,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn state_tags_round_trip() {
        for state in [
            WindowState::Normal,
            WindowState::Minimized,
            WindowState::Maximized,
            WindowState::Fullscreen,
            WindowState::Hidden,
        ] {
            assert_eq!(state_from_tag(state_tag(state)).unwrap(), state);
        }
        assert!(matches!(state_from_tag(5), Err(PersistError::UnknownState(5))));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"windows\": [").unwrap();
        let result = load(&path, &WmConfig::default(), &EventClock::new());
        assert!(matches!(result, Err(PersistError::Json(_))));
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"windows": [], "focused_window": -1, "surprise": true}"#,
        )
        .unwrap();
        let result = load(&path, &WmConfig::default(), &EventClock::new());
        assert!(matches!(result, Err(PersistError::Json(_))));
    }

    #[test]
    fn load_rejects_focus_outside_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, r#"{"windows": [], "focused_window": 3}"#).unwrap();
        let result = load(&path, &WmConfig::default(), &EventClock::new());
        assert!(matches!(result, Err(PersistError::FocusedMissing(3))));
    }

    #[test]
    fn load_rejects_invalid_window_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"windows": [{"id": 1, "title": "", "x": 0, "y": 0, "width": 100, "height": 100, "state": 0}], "focused_window": -1}"#,
        )
        .unwrap();
        let result = load(&path, &WmConfig::default(), &EventClock::new());
        assert!(matches!(result, Err(PersistError::InvalidWindow(WindowError::EmptyTitle))));
    }
}
