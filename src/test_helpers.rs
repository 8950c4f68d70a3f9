//! Shared test utilities for the aisle test suite.
//!
//! Provides compact constructors for property sets and capabilities, float
//! assertions, and a scratch source directory for config-driven tests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let hidden = props(&[(PropertyKind::Opacity, 0.0), (PropertyKind::Y, 40.0)]);
//! for cap in all_capabilities() {
//!     let d = registry.get("fadeInUp", &cap).unwrap();
//!     assert_close(d.visible().opacity.unwrap(), 1.0);
//! }
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::capability::{CapabilityDescriptor, IntensityTier};
use crate::motion::descriptor::{PropertyKind, PropertySet};

// =========================================================================
// Builders
// =========================================================================

/// Property set from `(kind, value)` pairs. Clip entries are ignored.
pub fn props(values: &[(PropertyKind, f64)]) -> PropertySet {
    let mut set = PropertySet::default();
    for &(kind, value) in values {
        set.set_scalar(kind, value);
    }
    set
}

/// Every capability shape the resolver can produce, plus a motion-on
/// capability with particles switched off.
pub fn all_capabilities() -> Vec<CapabilityDescriptor> {
    let mut caps: Vec<_> = IntensityTier::ALL
        .into_iter()
        .map(CapabilityDescriptor::with_tier)
        .collect();
    caps.push(CapabilityDescriptor::motionless());
    caps.push(CapabilityDescriptor {
        particles_enabled: false,
        ..CapabilityDescriptor::with_tier(IntensityTier::High)
    });
    caps
}

// =========================================================================
// Assertions
// =========================================================================

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Temp source directory holding `config.toml` with the given contents.
pub fn source_with_config(toml: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_config(tmp.path(), toml);
    tmp
}

pub fn write_config(dir: &Path, toml: &str) {
    std::fs::write(dir.join("config.toml"), toml).unwrap();
}
