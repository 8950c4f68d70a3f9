//! Declarative animation definitions and the registry that serves them.
//!
//! | Module | Role |
//! |--------|------|
//! | [`descriptor`] | `AnimationDescriptor` and its parts: states, transitions, overlays |
//! | [`builtin`] | The closed set of animations the site ships with |
//! | [`registry`] | Name → descriptor lookup with tiering, overrides and degradation |

pub mod builtin;
pub mod descriptor;
pub mod registry;

pub use descriptor::{
    AnimationDescriptor, AnimationOverrides, CubicBezier, DescriptorError, HIDDEN, MIN_DURATION,
    PropertyKind, PropertySet, Transition, VISIBLE,
};
pub use registry::{LookupMode, RegistryBuilder, RegistryError, VariantRegistry};
