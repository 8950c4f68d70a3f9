//! # Aisle
//!
//! The motion layer for wedding-planning sites: a catalog of named entrance
//! animations, viewport-triggered reveals, scroll-linked effects, and a
//! capability model that scales everything down for slow devices and turns it
//! off for visitors who prefer reduced motion.
//!
//! # Architecture
//!
//! ```text
//! environment signals ──► capability::resolve ──► CapabilityDescriptor
//!                                                        │
//!  motion::builtin + [[motion.animations]] ──► VariantRegistry ──► descriptors per tier
//!                                                        │
//!              visibility latch (one-shot) ──► component::MotionComponent ──► hidden / visible
//!                                                        │
//!        scroll progress ──► scroll::ScrollEffect ──► spring smoothing ──► per-frame styles
//! ```
//!
//! The same registry feeds two consumers. The in-process model
//! ([`component`], [`visibility`], [`scroll`]) decides what a given element
//! shows at any moment. [`generate`] renders every tier of every animation
//! into static CSS plus a small runtime script, so a site gets identical
//! behavior without a Rust process in the browser.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`capability`] | Reduced-motion, user opt-out and device probe signals resolved into a tier |
//! | [`motion`] | Animation descriptors, the built-in catalog, and the tier-aware registry |
//! | [`visibility`] | Viewport geometry, the observer host, and the one-shot visibility latch |
//! | [`component`] | Animated element wrapper: props in, current state and transition out |
//! | [`scroll`] | Progress-to-value mapping, spring smoothing, and the per-frame driver |
//! | [`config`] | Layered `config.toml` loading, validation, and CSS color variables |
//! | [`generate`] | Fingerprinted CSS/JS/JSON assets and the preview page, rendered with Maud |
//! | [`output`] | CLI output formatting, pure `format_*` functions with thin `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Tiers Are Derived, Not Authored
//!
//! Every animation is written once, at full intensity. The medium tier is a
//! uniform scale-down of travel, rotation, blur and timing; the low tier is a
//! near-instant fade that keeps its offsets but drops rotation, blur, delays
//! and the particle overlay. Authors never keep three copies of a descriptor
//! in sync.
//!
//! ## Latches Never Un-Trigger
//!
//! An entrance plays once. After the first intersection the latch drops its
//! observation, so scrolling back and forth over a gallery does not replay
//! every reveal.
//!
//! ## Handles Over References
//!
//! Observers and scroll subscriptions live in a `slotmap::SlotMap` and are
//! addressed by generational keys. Unmounting a component removes its slot;
//! a stale key held elsewhere simply stops resolving instead of dangling.

pub mod capability;
pub mod component;
pub mod config;
pub mod generate;
pub mod motion;
pub mod output;
pub mod scroll;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_helpers;
