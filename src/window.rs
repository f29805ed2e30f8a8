//! Window entity: geometry, state machine, behavioral flags, event sink.
//!
//! A `Window` never destroys itself and never decides focus; it emits
//! request events through its sink and lets the owning manager arbitrate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::clock::EventClock;
use crate::config::{DisplayBounds, WmConfig};
use crate::event::{EventCallback, EventKind, WindowEvent};

/// Unique, opaque identifier for a managed window.
///
/// Assigned by the manager, strictly increasing, never reused within a
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "win:{}", self.0)
    }
}

/// Window state. The live state machine ranges over the first four
/// variants; `Hidden` exists for the persistence format, where visibility
/// is folded into the coarse state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
    Hidden,
}

/// Window type hints. Each type implies a default flag bundle at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Dialog,
    Tooltip,
    Popup,
    Utility,
}

/// Position, size, and size bounds of a window.
///
/// Coordinates are logical; nothing clamps them against display extents.
/// Width and height stay within `[min, max]` once bounds are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        let defaults = crate::config::WindowDefaults::default();
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            min_width: defaults.min_width,
            min_height: defaults.min_height,
            max_width: defaults.max_width,
            max_height: defaults.max_height,
        }
    }
}

impl WindowGeometry {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
}

/// Construction-time argument validation failures.
///
/// These are caller programming errors; an invalid argument never produces
/// a half-constructed window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("window title must not be empty")]
    EmptyTitle,
    #[error("window dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
}

/// A managed window.
///
/// All mutation goes through the operations below; there are no public
/// fields. Events are emitted synchronously into the bound sink before the
/// operation returns.
pub struct Window {
    id: WindowId,
    title: String,
    window_type: WindowType,
    state: WindowState,
    geometry: WindowGeometry,
    /// Snapshot taken on leaving `Normal` for `Maximized`/`Fullscreen`.
    restore_geometry: Option<WindowGeometry>,
    display: DisplayBounds,
    visible: bool,
    focused: bool,
    resizable: bool,
    movable: bool,
    always_on_top: bool,
    opacity: f32,
    clock: EventClock,
    callback: Option<EventCallback>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("window_type", &self.window_type)
            .field("state", &self.state)
            .field("geometry", &self.geometry)
            .field("visible", &self.visible)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create a window with type-derived default flags.
    ///
    /// Rejects an empty title and non-positive dimensions. Accepted
    /// dimensions are clamped into the configured size bounds, so the
    /// geometry satisfies `[min, max]` from birth.
    pub fn new(
        id: WindowId,
        title: impl Into<String>,
        width: i32,
        height: i32,
        window_type: WindowType,
        config: &WmConfig,
        clock: EventClock,
    ) -> Result<Self, WindowError> {
        let title = title.into();
        if title.is_empty() {
            return Err(WindowError::EmptyTitle);
        }
        if width <= 0 || height <= 0 {
            return Err(WindowError::InvalidDimensions { width, height });
        }

        let defaults = config.window_defaults;
        let geometry = WindowGeometry {
            x: 0,
            y: 0,
            width: width.clamp(defaults.min_width, defaults.max_width),
            height: height.clamp(defaults.min_height, defaults.max_height),
            min_width: defaults.min_width,
            min_height: defaults.min_height,
            max_width: defaults.max_width,
            max_height: defaults.max_height,
        };

        let (mut resizable, mut movable, mut always_on_top) = (true, true, false);
        match window_type {
            WindowType::Dialog => {
                always_on_top = true;
                resizable = false;
            }
            WindowType::Tooltip => {
                always_on_top = true;
                movable = false;
                resizable = false;
            }
            WindowType::Popup => {
                always_on_top = true;
            }
            WindowType::Utility => {
                resizable = false;
            }
            WindowType::Normal => {}
        }

        Ok(Self {
            id,
            title,
            window_type,
            state: WindowState::Normal,
            geometry,
            restore_geometry: None,
            display: config.display,
            visible: true,
            focused: false,
            resizable,
            movable,
            always_on_top,
            opacity: 1.0,
            clock,
            callback: None,
        })
    }

    /// Materialize a window from persisted state without emitting events.
    pub(crate) fn from_saved(
        id: WindowId,
        title: String,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        state: WindowState,
        config: &WmConfig,
        clock: EventClock,
    ) -> Result<Self, WindowError> {
        let mut window = Self::new(id, title, width, height, WindowType::Normal, config, clock)?;
        window.geometry.x = x;
        window.geometry.y = y;

        match state {
            WindowState::Normal => {}
            WindowState::Minimized => {
                window.state = WindowState::Minimized;
                window.visible = false;
            }
            WindowState::Maximized => {
                window.restore_geometry = Some(window.geometry);
                window.state = WindowState::Maximized;
                window.apply_display_bounds();
            }
            WindowState::Fullscreen => {
                window.restore_geometry = Some(window.geometry);
                window.state = WindowState::Fullscreen;
                window.apply_display_bounds();
            }
            WindowState::Hidden => {
                window.visible = false;
            }
        }

        Ok(window)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_focus(&self) -> bool {
        self.focused
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn is_movable(&self) -> bool {
        self.movable
    }

    pub fn is_always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    // ── Mutating operations ──────────────────────────────────────────

    /// Update the title. Rejects an empty title; always emits on success.
    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if title.is_empty() {
            return false;
        }
        self.title = title;
        self.emit(&WindowEvent::new(
            self.id,
            EventKind::StateChanged { previous: None },
            &self.clock,
        ));
        true
    }

    /// Move to logical coordinates. Always succeeds; no screen clamping.
    pub fn move_to(&mut self, x: i32, y: i32) {
        let (old_x, old_y) = (self.geometry.x, self.geometry.y);
        self.geometry.x = x;
        self.geometry.y = y;
        self.emit(&WindowEvent::moved(self.id, x, y, old_x, old_y, &self.clock));
    }

    /// Resize within the current size bounds. Rejects out-of-bounds sizes.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width < self.geometry.min_width || height < self.geometry.min_height {
            return false;
        }
        if width > self.geometry.max_width || height > self.geometry.max_height {
            return false;
        }

        let (old_width, old_height) = (self.geometry.width, self.geometry.height);
        self.geometry.width = width;
        self.geometry.height = height;
        self.emit(&WindowEvent::resized(
            self.id, width, height, old_width, old_height, &self.clock,
        ));
        true
    }

    /// Minimize. No-op when already minimized.
    pub fn minimize(&mut self) {
        if self.state == WindowState::Minimized {
            return;
        }
        let previous = self.state;
        self.state = WindowState::Minimized;
        self.visible = false;
        self.emit_state_changed(previous);
    }

    /// Maximize into the display bounds. Snapshots geometry when leaving
    /// `Normal`. No-op when already maximized.
    pub fn maximize(&mut self) {
        if self.state == WindowState::Maximized {
            return;
        }
        let previous = self.state;
        if previous == WindowState::Normal {
            self.restore_geometry = Some(self.geometry);
        }
        self.state = WindowState::Maximized;
        self.apply_display_bounds();
        self.emit_state_changed(previous);
    }

    /// Return to `Normal`, reinstating the pre-maximize/fullscreen
    /// geometry snapshot. No-op when already normal.
    pub fn restore(&mut self) {
        if self.state == WindowState::Normal {
            return;
        }
        let previous = self.state;
        self.state = WindowState::Normal;
        self.visible = true;
        if matches!(previous, WindowState::Maximized | WindowState::Fullscreen) {
            if let Some(saved) = self.restore_geometry.take() {
                self.geometry = saved;
            }
        }
        self.emit_state_changed(previous);
    }

    /// Enter/leave fullscreen. Both directions are idempotent.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if fullscreen == (self.state == WindowState::Fullscreen) {
            return;
        }
        let previous = self.state;
        if fullscreen {
            if previous == WindowState::Normal {
                self.restore_geometry = Some(self.geometry);
            }
            self.state = WindowState::Fullscreen;
            self.apply_display_bounds();
        } else {
            self.state = WindowState::Normal;
            if let Some(saved) = self.restore_geometry.take() {
                self.geometry = saved;
            }
        }
        self.emit_state_changed(previous);
    }

    /// Make the window visible. Emits only on an actual change.
    pub fn show(&mut self) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.emit(&WindowEvent::new(
            self.id,
            EventKind::StateChanged { previous: None },
            &self.clock,
        ));
    }

    /// Hide the window. Emits only on an actual change.
    pub fn hide(&mut self) {
        if !self.visible {
            return;
        }
        self.visible = false;
        self.emit(&WindowEvent::new(
            self.id,
            EventKind::StateChanged { previous: None },
            &self.clock,
        ));
    }

    /// Request closing. The window never removes itself; the owning
    /// manager reacts to the `CloseRequest`.
    pub fn close(&self) {
        self.emit(&WindowEvent::new(self.id, EventKind::CloseRequest, &self.clock));
    }

    pub fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    pub fn set_movable(&mut self, movable: bool) {
        self.movable = movable;
    }

    pub fn set_always_on_top(&mut self, always_on_top: bool) {
        self.always_on_top = always_on_top;
    }

    /// Tighten the minimum size bounds. Rejects dimensions ≤ 0. The
    /// current size is clamped silently; no `Resized` event fires.
    pub fn set_minimum_size(&mut self, min_width: i32, min_height: i32) -> bool {
        if min_width <= 0 || min_height <= 0 {
            return false;
        }
        self.geometry.min_width = min_width;
        self.geometry.min_height = min_height;
        if self.geometry.width < min_width {
            self.geometry.width = min_width;
        }
        if self.geometry.height < min_height {
            self.geometry.height = min_height;
        }
        true
    }

    /// Tighten the maximum size bounds. Rejects dimensions ≤ 0. The
    /// current size is clamped silently; no `Resized` event fires.
    pub fn set_maximum_size(&mut self, max_width: i32, max_height: i32) -> bool {
        if max_width <= 0 || max_height <= 0 {
            return false;
        }
        self.geometry.max_width = max_width;
        self.geometry.max_height = max_height;
        if self.geometry.width > max_width {
            self.geometry.width = max_width;
        }
        if self.geometry.height > max_height {
            self.geometry.height = max_height;
        }
        true
    }

    /// Set opacity in `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) -> bool {
        if !(0.0..=1.0).contains(&opacity) {
            return false;
        }
        self.opacity = opacity;
        true
    }

    /// Request focus. Emits a `FocusGained` request for the manager to
    /// arbitrate; the focus flag itself only changes via [`handle_event`].
    ///
    /// [`handle_event`]: Window::handle_event
    pub fn set_focus(&self) {
        if self.focused {
            return;
        }
        self.emit(&WindowEvent::new(self.id, EventKind::FocusGained, &self.clock));
    }

    /// React to an event routed to this window.
    ///
    /// Focus events update the focus flag; every event is then forwarded
    /// unmodified to the bound sink.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event.kind {
            EventKind::FocusGained => self.focused = true,
            EventKind::FocusLost => self.focused = false,
            _ => {}
        }
        self.emit(event);
    }

    /// Bind the event sink. Last registration wins.
    pub fn set_event_callback(&mut self, callback: EventCallback) {
        self.callback = Some(callback);
    }

    /// Align the focus flag with the owner's bookkeeping without event
    /// delivery. Used when windows are materialized from persisted state.
    pub(crate) fn mark_focused(&mut self) {
        self.focused = true;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_display_bounds(&mut self) {
        self.geometry.x = self.display.x;
        self.geometry.y = self.display.y;
        self.geometry.width = self.display.width;
        self.geometry.height = self.display.height;
    }

    fn emit_state_changed(&self, previous: WindowState) {
        self.emit(&WindowEvent::new(
            self.id,
            EventKind::StateChanged {
                previous: Some(previous),
            },
            &self.clock,
        ));
    }

    fn emit(&self, event: &WindowEvent) {
        if let Some(callback) = &self.callback {
            match callback.try_borrow_mut() {
                Ok(mut callback) => callback(event),
                // Already inside this sink: re-entrant emission is dropped
                // rather than recursing.
                Err(_) => warn!("dropping re-entrant event {:?} for {}", event.kind, self.id),
            }
        }
    }
}
