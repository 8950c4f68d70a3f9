//! Scroll-linked effects.
//!
//! Scroll-driven visuals are pull-based: a single per-frame driver asks each
//! tracked region how far it has scrolled, maps that fraction through the
//! effect's control points, and optionally smooths the result.
//!
//! ```text
//! region rect ──► progress_through() ──► ScrollMapping::map() ──► SpringFilter ──► PropertySet
//!                   fraction in [0,1]       per property           geometry only
//! ```
//!
//! | Module | Role |
//! |--------|------|
//! | [`mapping`] | Validated control points, clamped interpolation, multi-property effects |
//! | [`spring`] | Critically damped smoothing filter |
//! | [`driver`] | Frame driver with cancellable subscriptions |

pub mod driver;
pub mod mapping;
pub mod spring;

pub use driver::{FrameDriver, FrameOutput, ScrollTrack, SubscriptionId};
pub use mapping::{MappingError, ScrollEffect, ScrollMapping, map_progress, progress_through};
pub use spring::SpringFilter;
