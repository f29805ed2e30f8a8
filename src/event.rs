//! Event model: everything observable about windows flows through
//! [`WindowEvent`] values.
//!
//! Events are plain data stamped with a logical timestamp from the
//! manager's [`EventClock`]. Lifecycle and geometry events originate
//! inside the crate; input events (mouse, key, drag) originate in the
//! hosting shell and are routed in via the manager.

use std::cell::RefCell;
use std::rc::Rc;

use bitflags::bitflags;

use crate::clock::EventClock;
use crate::window::{WindowId, WindowState};

/// Shared mutable event sink bound into each window.
///
/// `Rc<RefCell<..>>` rather than a plain box because the manager binds one
/// sink into every window it owns.
pub type EventCallback = Rc<RefCell<dyn FnMut(&WindowEvent)>>;

bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT     = 1 << 0;
        const CTRL      = 1 << 1;
        const ALT       = 1 << 2;
        const META      = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK  = 1 << 5;
    }
}

/// Mouse button identity for press/release events, plus the held-button
/// mask carried by every pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

bitflags! {
    /// Buttons held down during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        const LEFT    = 1 << 0;
        const MIDDLE  = 1 << 1;
        const RIGHT   = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

/// Pointer event payload.
///
/// `x`/`y` are window-local; `global_x`/`global_y` are in desktop
/// coordinates. `delta_x`/`delta_y` carry motion since the previous
/// pointer event, `wheel_delta` the scroll step for wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerData {
    pub x: i32,
    pub y: i32,
    pub global_x: i32,
    pub global_y: i32,
    pub button: MouseButton,
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
    pub delta_x: i32,
    pub delta_y: i32,
    pub wheel_delta: i32,
}

/// Keyboard event payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyData {
    pub key_code: u32,
    /// Text produced by the key, empty for non-printing keys.
    pub text: String,
    pub modifiers: Modifiers,
    pub auto_repeat: bool,
}

/// Drag-and-drop event payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DragData {
    pub start_x: i32,
    pub start_y: i32,
    pub current_x: i32,
    pub current_y: i32,
    pub payload: Vec<u8>,
}

/// What happened. Lifecycle, focus, and geometry kinds are emitted by the
/// crate; the input kinds are routed in from the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Created,
    Closing,
    Destroyed,
    FocusGained,
    FocusLost,
    Moved { x: i32, y: i32, old_x: i32, old_y: i32 },
    Resized { width: i32, height: i32, old_width: i32, old_height: i32 },
    Minimized,
    Maximized,
    Restored,
    /// Coarse state transition; `previous` is `None` for changes that are
    /// not state-machine transitions (title, visibility).
    StateChanged { previous: Option<WindowState> },
    MouseEnter(PointerData),
    MouseLeave(PointerData),
    MouseMove(PointerData),
    MousePress(PointerData),
    MouseRelease(PointerData),
    MouseWheel(PointerData),
    KeyPress(KeyData),
    KeyRelease(KeyData),
    CloseRequest,
    DragBegin(DragData),
    DragMove(DragData),
    DragEnd(DragData),
}

/// An event concerning one window, stamped at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub window_id: WindowId,
    /// Logical ordering token, unique and increasing per manager.
    pub timestamp: u64,
    pub kind: EventKind,
}

impl WindowEvent {
    pub fn new(window_id: WindowId, kind: EventKind, clock: &EventClock) -> Self {
        Self {
            window_id,
            timestamp: clock.next(),
            kind,
        }
    }

    pub fn created(window_id: WindowId, clock: &EventClock) -> Self {
        Self::new(window_id, EventKind::Created, clock)
    }

    pub fn moved(
        window_id: WindowId,
        x: i32,
        y: i32,
        old_x: i32,
        old_y: i32,
        clock: &EventClock,
    ) -> Self {
        Self::new(window_id, EventKind::Moved { x, y, old_x, old_y }, clock)
    }

    pub fn resized(
        window_id: WindowId,
        width: i32,
        height: i32,
        old_width: i32,
        old_height: i32,
        clock: &EventClock,
    ) -> Self {
        Self::new(
            window_id,
            EventKind::Resized { width, height, old_width, old_height },
            clock,
        )
    }

    pub fn mouse_move(
        window_id: WindowId,
        x: i32,
        y: i32,
        global_x: i32,
        global_y: i32,
        modifiers: Modifiers,
        clock: &EventClock,
    ) -> Self {
        Self::new(
            window_id,
            EventKind::MouseMove(PointerData {
                x,
                y,
                global_x,
                global_y,
                modifiers,
                ..PointerData::default()
            }),
            clock,
        )
    }
}
