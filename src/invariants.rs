//! Invariant validation for manager state.
//!
//! Checked after mutating manager operations in debug builds.

use std::collections::HashMap;

use crate::window::{Window, WindowId, WindowState};

/// Error indicating which invariant was violated.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    #[error("focused window {0} is not a live window")]
    FocusedWindowMissing(String),

    #[error("window map key {key} does not match window id {id}")]
    IdMismatch { key: String, id: String },

    #[error("window {0} geometry is outside its size bounds")]
    GeometryOutOfBounds(String),
}

/// Validate core invariants. Returns the first violation found.
pub fn validate(
    windows: &HashMap<WindowId, Window>,
    focused: Option<WindowId>,
) -> Result<(), InvariantError> {
    // 1. Focused window must be live (or focus must be clear)
    if let Some(id) = focused {
        if !windows.contains_key(&id) {
            return Err(InvariantError::FocusedWindowMissing(format!("{id}")));
        }
    }

    for (&key, window) in windows {
        // 2. Map keys match window identities
        if key != window.id() {
            return Err(InvariantError::IdMismatch {
                key: format!("{key}"),
                id: format!("{}", window.id()),
            });
        }

        // 3. Width/height stay within bounds. Maximized/fullscreen
        // geometry comes from display bounds and is exempt, matching how
        // those states bypass resize().
        if window.state() == WindowState::Normal {
            let g = window.geometry();
            if g.width < g.min_width
                || g.height < g.min_height
                || g.width > g.max_width
                || g.height > g.max_height
            {
                return Err(InvariantError::GeometryOutOfBounds(format!("{key}")));
            }
        }
    }

    Ok(())
}
