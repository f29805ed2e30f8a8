//! CloudFlow WM — shell-agnostic window manager core
//!
//! This crate contains the window-management logic of the CloudFlow
//! desktop (window lifecycle, geometry, focus arbitration, state
//! transitions) with zero dependencies on display protocols or rendering.
//! Shell components (taskbar, desktop icons) interact with windows by id
//! only and observe everything through a single event subscriber.
//!
//! Everything is single-threaded and synchronous: each operation runs to
//! completion, including event delivery, before returning. Callers that
//! need cross-thread access serialize it themselves.
//!
//! # Quick Start
//! ```
//! use cloudflow_wm::{WindowManager, WindowType};
//!
//! let mut wm = WindowManager::new();
//! wm.set_event_callback(|event| println!("{:?} for {}", event.kind, event.window_id));
//!
//! let id = wm.create_window("Terminal", 800, 600, WindowType::Normal).unwrap();
//! assert_eq!(wm.focused_window(), Some(id));
//!
//! wm.move_window(id, 100, 50);
//! wm.maximize_window(id);
//! wm.close_window(id);
//! assert_eq!(wm.focused_window(), None);
//! ```

pub mod clock;
pub mod config;
pub mod event;
pub mod invariants;
pub mod persist;
pub mod window;

// Re-export primary API types at crate root
pub use clock::EventClock;
pub use config::{DisplayBounds, WmConfig};
pub use event::{
    DragData, EventKind, KeyData, Modifiers, MouseButton, MouseButtons, PointerData, WindowEvent,
};
pub use window::{Window, WindowGeometry, WindowId, WindowState, WindowType};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, error, warn};

use event::EventCallback;

/// The single external subscriber slot. Events from the manager and from
/// every owned window funnel through here.
#[derive(Default)]
struct EventRouter {
    subscriber: RefCell<Option<Box<dyn FnMut(&WindowEvent)>>>,
}

impl EventRouter {
    fn dispatch(&self, event: &WindowEvent) {
        match self.subscriber.try_borrow_mut() {
            Ok(mut slot) => {
                if let Some(callback) = slot.as_mut() {
                    callback(event);
                }
            }
            // The subscriber is already running; dropping the nested event
            // bounds re-entrant recursion without locks.
            Err(_) => warn!(
                "dropping re-entrant event {:?} for {}",
                event.kind, event.window_id
            ),
        }
    }
}

/// The window manager engine.
///
/// Exclusively owns all [`Window`]s. Callers hold [`WindowId`]s, never
/// window references, so a closed window can never be used after disposal.
/// The public surface is stable; internals may be replaced.
pub struct WindowManager {
    windows: HashMap<WindowId, Window>,
    /// Monotonic id counter. Never decremented, never reused.
    next_id: u64,
    focused: Option<WindowId>,
    router: Rc<EventRouter>,
    /// Shared sink bound into every owned window, forwarding to `router`.
    forward: EventCallback,
    clock: EventClock,
    config: WmConfig,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowManager {
    /// Create a manager with default configuration.
    pub fn new() -> Self {
        Self::with_config(WmConfig::default())
    }

    /// Create a manager with the given configuration.
    pub fn with_config(config: WmConfig) -> Self {
        let router = Rc::new(EventRouter::default());
        let sink = Rc::clone(&router);
        let forward: EventCallback =
            Rc::new(RefCell::new(move |event: &WindowEvent| sink.dispatch(event)));

        Self {
            windows: HashMap::new(),
            next_id: 1,
            focused: None,
            router,
            forward,
            clock: EventClock::new(),
            config,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create a window and give it focus.
    ///
    /// Returns `None` on invalid arguments (empty title, non-positive
    /// dimensions); nothing is emitted and no id is consumed in that case.
    pub fn create_window(
        &mut self,
        title: &str,
        width: i32,
        height: i32,
        window_type: WindowType,
    ) -> Option<WindowId> {
        let id = WindowId(self.next_id);
        let mut window = match window::Window::new(
            id,
            title,
            width,
            height,
            window_type,
            &self.config,
            self.clock.clone(),
        ) {
            Ok(window) => window,
            Err(e) => {
                warn!("refusing to create window: {e}");
                return None;
            }
        };
        window.set_event_callback(Rc::clone(&self.forward));

        self.next_id += 1;
        self.windows.insert(id, window);
        debug!("created {id} ({title:?}, {width}x{height}, {window_type:?})");

        self.set_focus(id);
        self.router.dispatch(&WindowEvent::created(id, &self.clock));
        self.check_invariants();
        Some(id)
    }

    /// Close and destroy a window. Emission order is strict: `Closing`,
    /// removal, `FocusGained` for the re-focus target if the closed window
    /// held focus, `Destroyed`.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }

        self.router
            .dispatch(&WindowEvent::new(id, EventKind::Closing, &self.clock));
        self.windows.remove(&id);
        debug!("closed {id}");

        if self.focused == Some(id) {
            // Arbitrary remaining window; map enumeration order is not
            // insertion order and callers must not rely on the pick.
            self.focused = self.windows.keys().next().copied();
            if let Some(next) = self.focused {
                let event = WindowEvent::new(next, EventKind::FocusGained, &self.clock);
                if let Some(window) = self.windows.get_mut(&next) {
                    window.handle_event(&event);
                }
            }
        }

        self.router
            .dispatch(&WindowEvent::new(id, EventKind::Destroyed, &self.clock));
        self.check_invariants();
        true
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// Focus a window. At most one `FocusLost`/`FocusGained` pair fires;
    /// refocusing the focused window is a no-op success.
    pub fn set_focus(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        if self.focused == Some(id) {
            return true;
        }

        if let Some(previous) = self.focused {
            let event = WindowEvent::new(previous, EventKind::FocusLost, &self.clock);
            if let Some(window) = self.windows.get_mut(&previous) {
                window.handle_event(&event);
            }
        }

        let event = WindowEvent::new(id, EventKind::FocusGained, &self.clock);
        if let Some(window) = self.windows.get_mut(&id) {
            window.handle_event(&event);
        }

        self.focused = Some(id);
        self.check_invariants();
        true
    }

    /// The focused window, or `None` when no window holds focus.
    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused
    }

    // ── Delegated window operations ──────────────────────────────────

    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.minimize();
                true
            }
            None => false,
        }
    }

    pub fn maximize_window(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.maximize();
                true
            }
            None => false,
        }
    }

    pub fn restore_window(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.restore();
                true
            }
            None => false,
        }
    }

    pub fn move_window(&mut self, id: WindowId, x: i32, y: i32) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) => {
                window.move_to(x, y);
                true
            }
            None => false,
        }
    }

    pub fn resize_window(&mut self, id: WindowId, width: i32, height: i32) -> bool {
        self.windows
            .get_mut(&id)
            .map_or(false, |window| window.resize(width, height))
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Live window ids. Enumeration order is unspecified.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn window_geometry(&self, id: WindowId) -> Option<WindowGeometry> {
        self.windows.get(&id).map(Window::geometry)
    }

    pub fn window_state(&self, id: WindowId) -> Option<WindowState> {
        self.windows.get(&id).map(Window::state)
    }

    pub fn window_title(&self, id: WindowId) -> Option<String> {
        self.windows.get(&id).map(|window| window.title().to_string())
    }

    pub fn window_has_focus(&self, id: WindowId) -> Option<bool> {
        self.windows.get(&id).map(Window::has_focus)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Register the single external event subscriber. Last write wins;
    /// multiple interested parties multiplex behind one callback.
    pub fn set_event_callback(&mut self, callback: impl FnMut(&WindowEvent) + 'static) {
        match self.router.subscriber.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(callback)),
            Err(_) => warn!("ignoring subscriber registration from within event dispatch"),
        }
    }

    /// Route an externally originated event to its window. Unknown ids
    /// are dropped.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match self.windows.get_mut(&event.window_id) {
            Some(window) => window.handle_event(event),
            None => debug!("dropping event {:?} for unknown {}", event.kind, event.window_id),
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Save id, title, geometry, coarse state of every window plus the
    /// focused id to a JSON file.
    pub fn save_window_state(&self, path: impl AsRef<Path>) -> bool {
        match persist::save(path.as_ref(), &self.windows, self.focused) {
            Ok(()) => true,
            Err(e) => {
                error!("failed to save window state: {e}");
                false
            }
        }
    }

    /// Replace the live window set with the one persisted at `path`.
    ///
    /// The file is validated in full before anything is touched; on any
    /// failure the live set is left exactly as it was. The id counter is
    /// advanced past every restored id so future ids never collide.
    pub fn restore_window_state(&mut self, path: impl AsRef<Path>) -> bool {
        let restored = match persist::load(path.as_ref(), &self.config, &self.clock) {
            Ok(restored) => restored,
            Err(e) => {
                error!("failed to restore window state: {e}");
                return false;
            }
        };

        let mut windows = restored.windows;
        for window in windows.values_mut() {
            window.set_event_callback(Rc::clone(&self.forward));
        }

        self.windows = windows;
        self.focused = restored.focused;
        // Materialization skips event delivery, so the restored focus
        // holder's flag is aligned directly.
        if let Some(id) = self.focused {
            if let Some(window) = self.windows.get_mut(&id) {
                window.mark_focused();
            }
        }
        self.next_id = self.next_id.max(restored.max_id + 1);
        debug!(
            "restored {} windows, next id {}",
            self.windows.len(),
            self.next_id
        );
        self.check_invariants();
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn check_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = invariants::validate(&self.windows, self.focused) {
            warn!("invariant violation: {e}");
        }
    }
}
