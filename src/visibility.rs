//! Visibility-gated triggers.
//!
//! Entrance animations play once, the first time their element scrolls
//! into view. A [`VisibilityLatch`] models that as a three-state machine:
//!
//! ```text
//!   mount            first intersecting event
//! Unobserved ──► Observing ─────────────────────► Triggered
//!      ▲  (no element yet:          (observation detached,
//!      │   stays here until bind)     terminal for this instance)
//! ```
//!
//! Observations live in an [`ObserverHost`] and are addressed by generational
//! [`ObservationId`]s. The host delivers events asynchronously with respect
//! to mount; the latch accepts an event only if it carries its own id and
//! the host still considers that id live, so events that were already in
//! flight when a component unmounted are dropped on the floor.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque reference to a rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Axis-aligned box in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edge-inclusive overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.width < 0.0 || self.height < 0.0 || other.width < 0.0 || other.height < 0.0 {
            return false;
        }
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid root margin '{0}': expected 1 to 4 pixel values like \"0px 0px -100px\"")]
pub struct RootMarginError(String);

/// Grows (positive) or shrinks (negative) the viewport before testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub fn uniform(px: f64) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    pub fn apply(&self, viewport: &Rect) -> Rect {
        Rect {
            x: viewport.x - self.left,
            y: viewport.y - self.top,
            width: viewport.width + self.left + self.right,
            height: viewport.height + self.top + self.bottom,
        }
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    /// CSS shorthand order: top, right, bottom, left.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RootMarginError(s.to_string());
        let values = s
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                number
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(err)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [top, right, bottom, left] = match values[..] {
            [a] => [a, a, a, a],
            [v, h] => [v, h, v, h],
            [t, h, b] => [t, h, b, h],
            [t, r, b, l] => [t, r, b, l],
            _ => return Err(err()),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = RootMarginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(m: RootMargin) -> String {
        m.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

// =============================================================================
// Observer host
// =============================================================================

new_key_type! {
    /// Handle of one live observation.
    pub struct ObservationId;
}

#[derive(Debug, Clone)]
struct Observation {
    element: ElementHandle,
    margin: RootMargin,
}

/// One delivery from the host to a latch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEvent {
    pub id: ObservationId,
    pub element: ElementHandle,
    pub is_intersecting: bool,
}

/// Owns all intersection observations of a page.
#[derive(Debug, Default)]
pub struct ObserverHost {
    observations: SlotMap<ObservationId, Observation>,
}

impl ObserverHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, element: ElementHandle, margin: RootMargin) -> ObservationId {
        let id = self.observations.insert(Observation { element, margin });
        tracing::trace!(element = element.raw(), "observing element");
        id
    }

    /// Stop an observation. Returns `false` if it was already gone.
    pub fn unobserve(&mut self, id: ObservationId) -> bool {
        let removed = self.observations.remove(id);
        if let Some(obs) = &removed {
            tracing::trace!(element = obs.element.raw(), "stopped observing element");
        }
        removed.is_some()
    }

    pub fn is_live(&self, id: ObservationId) -> bool {
        self.observations.contains_key(id)
    }

    /// Number of live observations.
    pub fn active(&self) -> usize {
        self.observations.len()
    }

    /// Test every live observation against the viewport.
    ///
    /// `bounds` returns the element's current box, or `None` if it is not
    /// laid out; such elements produce no event.
    pub fn check<F>(&self, viewport: &Rect, bounds: F) -> Vec<IntersectionEvent>
    where
        F: Fn(ElementHandle) -> Option<Rect>,
    {
        self.observations
            .iter()
            .filter_map(|(key, obs)| {
                let rect = bounds(obs.element)?;
                Some(IntersectionEvent {
                    id: key,
                    element: obs.element,
                    is_intersecting: rect.intersects(&obs.margin.apply(viewport)),
                })
            })
            .collect()
    }
}

// =============================================================================
// Latch
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchState {
    Unobserved,
    Observing(ObservationId),
    Triggered,
}

/// One-way visibility flag of a mounted component.
#[derive(Debug)]
pub struct VisibilityLatch {
    element: Option<ElementHandle>,
    margin: RootMargin,
    state: LatchState,
    mounted: bool,
}

impl VisibilityLatch {
    pub fn new(element: Option<ElementHandle>, margin: RootMargin) -> Self {
        Self {
            element,
            margin,
            state: LatchState::Unobserved,
            mounted: false,
        }
    }

    pub fn state(&self) -> LatchState {
        self.state
    }

    pub fn is_triggered(&self) -> bool {
        self.state == LatchState::Triggered
    }

    pub fn margin(&self) -> RootMargin {
        self.margin
    }

    /// Start observing. Without an element this only records the mount.
    pub fn mount(&mut self, host: &mut ObserverHost) {
        self.mounted = true;
        self.start(host);
    }

    /// Supply the element once it exists.
    pub fn bind(&mut self, element: ElementHandle, host: &mut ObserverHost) {
        if self.state != LatchState::Unobserved {
            return;
        }
        self.element = Some(element);
        if self.mounted {
            self.start(host);
        }
    }

    fn start(&mut self, host: &mut ObserverHost) {
        if let (LatchState::Unobserved, Some(element)) = (self.state, self.element) {
            self.state = LatchState::Observing(host.observe(element, self.margin));
        }
    }

    /// Feed an event from the host. Returns `true` only for the event that
    /// flips the latch.
    pub fn handle(&mut self, event: &IntersectionEvent, host: &mut ObserverHost) -> bool {
        let LatchState::Observing(id) = self.state else {
            return false;
        };
        if event.id != id || !host.is_live(id) || !event.is_intersecting {
            return false;
        }
        host.unobserve(id);
        self.state = LatchState::Triggered;
        tracing::debug!(element = event.element.raw(), "visibility latch triggered");
        true
    }

    /// Detach any live observation. The latch is gone afterwards.
    pub fn unmount(self, host: &mut ObserverHost) {
        if let LatchState::Observing(id) = self.state {
            host.unobserve(id);
        }
    }
}
