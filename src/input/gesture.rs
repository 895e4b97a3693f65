//! Gesture adapter: mouse and single-finger touch as one grab/drag/drop protocol.
//!
//! # State Machine
//!
//! Each attached target owns a [`GestureAdapter`]:
//!
//! ```text
//! Idle --press-------> Active   emits Grab, acquires a window capture
//! Active --move------> Active   emits Drag (total and incremental delta)
//! Active --release---> Idle     emits Drop, then Click if |dx| < 2 && |dy| < 2
//! Active --cancel----> Idle     emits Drop at the last position, never Click
//! ```
//!
//! The [`GestureRouter`] plays the role of the window: presses go to the
//! target under the pointer, moves and releases go to every target holding a
//! capture. Captures are the only window-scoped resource and are released on
//! every exit path: drop, touch-cancel, `detach` and `detach_all`.
//!
//! # Invariants
//!
//! 1. Exactly one `Drop` is emitted per grab.
//! 2. `Click` follows `Drop` iff both total displacement components are below
//!    the click threshold.
//! 3. A target holds a capture iff its adapter is `Active`.
//! 4. Only single-finger sequences are honored. Touch presses, moves and
//!    releases involving more than one finger are ignored.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::constants::CLICK_THRESHOLD;
use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
        meta: false,
    };

    /// Modifier that makes a symbol click toggle instead of solo-select.
    pub fn toggles_selection(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer events in page coordinates, as delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    MouseDown { page: Point, modifiers: Modifiers },
    MouseMove { page: Point, modifiers: Modifiers },
    MouseUp { page: Point, modifiers: Modifiers },
    /// All touches currently on the surface.
    TouchStart { touches: Vec<Point> },
    /// All touches currently on the surface.
    TouchMove { touches: Vec<Point> },
    /// The touches that were lifted.
    TouchEnd { changed: Vec<Point> },
    TouchCancel,
}

impl RawInput {
    pub fn mouse_down(x: f32, y: f32) -> Self {
        Self::MouseDown {
            page: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::MouseMove {
            page: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn mouse_up(x: f32, y: f32) -> Self {
        Self::MouseUp {
            page: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn touch_start(x: f32, y: f32) -> Self {
        Self::TouchStart {
            touches: vec![Point::new(x, y)],
        }
    }

    pub fn touch_move(x: f32, y: f32) -> Self {
        Self::TouchMove {
            touches: vec![Point::new(x, y)],
        }
    }

    pub fn touch_end(x: f32, y: f32) -> Self {
        Self::TouchEnd {
            changed: vec![Point::new(x, y)],
        }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        match self {
            Self::MouseDown { page, .. } => Self::MouseDown { page, modifiers },
            Self::MouseMove { page, .. } => Self::MouseMove { page, modifiers },
            Self::MouseUp { page, .. } => Self::MouseUp { page, modifiers },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch,
}

// ---------------------------------------------------------------------------
// Semantic events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureKind {
    /// `local` is relative to the target's origin captured at grab time.
    Grab { page: Point, local: Point },
    Drag { total: Point, delta: Point },
    /// `local` is relative to the target's origin at drop time.
    Drop { page: Point, total: Point, local: Point },
    Click { page: Point, local: Point },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent<T> {
    pub target: T,
    pub kind: GestureKind,
    pub source: PointerSource,
    pub modifiers: Modifiers,
}

// ---------------------------------------------------------------------------
// GestureAdapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    source: PointerSource,
    grab_page: Point,
    origin: Point,
    last_total: Point,
    modifiers: Modifiers,
}

/// Idle/Active lifecycle of one target.
#[derive(Debug, Clone)]
pub struct GestureAdapter {
    active: Option<ActiveGesture>,
    click_threshold: f32,
}

impl Default for GestureAdapter {
    fn default() -> Self {
        Self::new(CLICK_THRESHOLD)
    }
}

impl GestureAdapter {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            active: None,
            click_threshold,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn source(&self) -> Option<PointerSource> {
        self.active.map(|a| a.source)
    }

    /// Begin a gesture. Returns `None` if one is already in progress.
    pub fn press(
        &mut self,
        page: Point,
        origin: Point,
        source: PointerSource,
        modifiers: Modifiers,
    ) -> Option<GestureKind> {
        if self.active.is_some() {
            return None;
        }
        self.active = Some(ActiveGesture {
            source,
            grab_page: page,
            origin,
            last_total: Point::ZERO,
            modifiers,
        });
        Some(GestureKind::Grab {
            page,
            local: page - origin,
        })
    }

    pub fn motion(&mut self, page: Point) -> Option<GestureKind> {
        let active = self.active.as_mut()?;
        let total = page - active.grab_page;
        let delta = total - active.last_total;
        active.last_total = total;
        Some(GestureKind::Drag { total, delta })
    }

    /// End the gesture. Yields `Drop`, followed by `Click` when the pointer
    /// barely moved.
    pub fn release(&mut self, page: Point, current_origin: Option<Point>) -> Vec<GestureKind> {
        let Some(active) = self.active.take() else {
            return Vec::new();
        };
        let total = page - active.grab_page;
        let local = page - current_origin.unwrap_or(active.origin);

        let mut out = vec![GestureKind::Drop { page, total, local }];
        if total.x.abs() < self.click_threshold && total.y.abs() < self.click_threshold {
            out.push(GestureKind::Click { page, local });
        }
        out
    }

    /// Abandon the gesture as an implicit drop at the last known position.
    pub fn cancel(&mut self, current_origin: Option<Point>) -> Option<GestureKind> {
        let active = self.active.take()?;
        let page = active.grab_page + active.last_total;
        Some(GestureKind::Drop {
            page,
            total: active.last_total,
            local: page - current_origin.unwrap_or(active.origin),
        })
    }

    fn grab_modifiers(&self) -> Modifiers {
        self.active.map(|a| a.modifiers).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// GestureRouter
// ---------------------------------------------------------------------------

/// Resolves page positions to targets for the router.
pub trait TargetLocator<T> {
    /// Topmost target under `page`.
    fn hit_test(&self, page: Point) -> Option<T>;

    /// Page position of the target's top-left corner, if it still exists.
    fn origin(&self, target: &T) -> Option<Point>;
}

/// Events produced by one raw input, plus whether the input was consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<T> {
    pub events: Vec<GestureEvent<T>>,
    pub handled: bool,
}

impl<T> Default for Routed<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            handled: false,
        }
    }
}

/// Owns the adapters of every attached target and the window captures.
#[derive(Debug)]
pub struct GestureRouter<T> {
    adapters: HashMap<T, GestureAdapter>,
    captures: HashSet<T>,
    click_threshold: f32,
}

impl<T> Default for GestureRouter<T>
where
    T: Hash + Eq + Clone + Debug,
{
    fn default() -> Self {
        Self::new(CLICK_THRESHOLD)
    }
}

impl<T> GestureRouter<T>
where
    T: Hash + Eq + Clone + Debug,
{
    pub fn new(click_threshold: f32) -> Self {
        Self {
            adapters: HashMap::new(),
            captures: HashSet::new(),
            click_threshold,
        }
    }

    /// Start listening for presses on `target`. Returns false if already attached.
    pub fn attach(&mut self, target: T) -> bool {
        if self.adapters.contains_key(&target) {
            return false;
        }
        self.adapters
            .insert(target, GestureAdapter::new(self.click_threshold));
        true
    }

    /// Stop listening on `target` and release its capture. Safe to call twice.
    pub fn detach(&mut self, target: &T) -> bool {
        let released = self.captures.remove(target);
        if released {
            debug!(?target, "Released window capture on detach");
        }
        self.adapters.remove(target).is_some()
    }

    pub fn detach_all(&mut self) {
        if !self.captures.is_empty() {
            debug!(count = self.captures.len(), "Releasing window captures");
        }
        self.captures.clear();
        self.adapters.clear();
    }

    pub fn is_attached(&self, target: &T) -> bool {
        self.adapters.contains_key(target)
    }

    pub fn attached(&self) -> impl Iterator<Item = &T> {
        self.adapters.keys()
    }

    pub fn attached_count(&self) -> usize {
        self.adapters.len()
    }

    /// Number of targets currently listening at window scope.
    pub fn window_listener_count(&self) -> usize {
        self.captures.len()
    }

    pub fn is_captured(&self, target: &T) -> bool {
        self.captures.contains(target)
    }

    pub fn route(&mut self, input: &RawInput, locator: &dyn TargetLocator<T>) -> Routed<T> {
        match input {
            RawInput::MouseDown { page, modifiers } => {
                self.press(*page, PointerSource::Mouse, *modifiers, locator)
            }
            RawInput::MouseMove { page, .. } => self.motion(*page, PointerSource::Mouse),
            RawInput::MouseUp { page, modifiers } => {
                self.release(*page, PointerSource::Mouse, *modifiers, locator)
            }
            RawInput::TouchStart { touches } => match touches.as_slice() {
                [page] => self.press(*page, PointerSource::Touch, Modifiers::NONE, locator),
                _ => Routed::default(),
            },
            RawInput::TouchMove { touches } => match touches.as_slice() {
                [page] => self.motion(*page, PointerSource::Touch),
                _ => Routed::default(),
            },
            RawInput::TouchEnd { changed } => match changed.as_slice() {
                [page] => self.release(*page, PointerSource::Touch, Modifiers::NONE, locator),
                _ => Routed::default(),
            },
            RawInput::TouchCancel => self.cancel_touches(locator),
        }
    }

    fn press(
        &mut self,
        page: Point,
        source: PointerSource,
        modifiers: Modifiers,
        locator: &dyn TargetLocator<T>,
    ) -> Routed<T> {
        let Some(target) = locator.hit_test(page) else {
            return Routed::default();
        };
        let Some(adapter) = self.adapters.get_mut(&target) else {
            return Routed::default();
        };
        let origin = locator.origin(&target).unwrap_or(page);
        let Some(kind) = adapter.press(page, origin, source, modifiers) else {
            debug!(?target, ?source, "Ignoring press on target with a gesture in progress");
            return Routed {
                events: Vec::new(),
                handled: true,
            };
        };

        debug!(?target, ?source, x = page.x, y = page.y, "Grab");
        self.captures.insert(target.clone());
        Routed {
            events: vec![GestureEvent {
                target,
                kind,
                source,
                modifiers,
            }],
            handled: true,
        }
    }

    fn captured_by(&self, source: PointerSource) -> Vec<T> {
        self.captures
            .iter()
            .filter(|t| {
                self.adapters
                    .get(*t)
                    .and_then(|a| a.source())
                    .is_some_and(|s| s == source)
            })
            .cloned()
            .collect()
    }

    fn motion(&mut self, page: Point, source: PointerSource) -> Routed<T> {
        let mut routed = Routed::default();
        for target in self.captured_by(source) {
            let Some(adapter) = self.adapters.get_mut(&target) else {
                continue;
            };
            let modifiers = adapter.grab_modifiers();
            if let Some(kind) = adapter.motion(page) {
                routed.events.push(GestureEvent {
                    target,
                    kind,
                    source,
                    modifiers,
                });
                routed.handled = true;
            }
        }
        routed
    }

    fn release(
        &mut self,
        page: Point,
        source: PointerSource,
        modifiers: Modifiers,
        locator: &dyn TargetLocator<T>,
    ) -> Routed<T> {
        let mut routed = Routed::default();
        for target in self.captured_by(source) {
            self.captures.remove(&target);
            let Some(adapter) = self.adapters.get_mut(&target) else {
                continue;
            };
            let kinds = adapter.release(page, locator.origin(&target));
            debug!(?target, ?source, clicked = kinds.len() > 1, "Drop");
            routed.handled |= !kinds.is_empty();
            routed
                .events
                .extend(kinds.into_iter().map(|kind| GestureEvent {
                    target: target.clone(),
                    kind,
                    source,
                    modifiers,
                }));
        }
        routed
    }

    fn cancel_touches(&mut self, locator: &dyn TargetLocator<T>) -> Routed<T> {
        let mut routed = Routed::default();
        for target in self.captured_by(PointerSource::Touch) {
            warn!(?target, "Touch cancelled mid-gesture; treating as drop");
            self.captures.remove(&target);
            let Some(adapter) = self.adapters.get_mut(&target) else {
                continue;
            };
            let modifiers = adapter.grab_modifiers();
            if let Some(kind) = adapter.cancel(locator.origin(&target)) {
                routed.events.push(GestureEvent {
                    target,
                    kind,
                    source: PointerSource::Touch,
                    modifiers,
                });
                routed.handled = true;
            }
        }
        routed
    }
}
