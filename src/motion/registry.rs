//! Process-wide animation registry.
//!
//! The registry is assembled once (built-ins plus any custom animations
//! from `config.toml`), validated, and then only read. Lookups never hand
//! out references into the registry: every call returns a fresh
//! [`AnimationDescriptor`] with tier scaling, per-call overrides and
//! degradation applied, so one component tweaking its timing can never leak
//! into another.
//!
//! ## Unknown Names
//!
//! [`VariantRegistry::get`] always reports [`RegistryError::NotFound`].
//! [`VariantRegistry::lookup`] applies the registry's [`LookupMode`]: strict
//! registries (development) return the error, lenient registries
//! (production) log a warning and return a pass-through animation, since a
//! typo in an animation name must never blank out a page.

use super::builtin;
use super::descriptor::{AnimationDescriptor, AnimationOverrides, DescriptorError};
use crate::capability::{CapabilityDescriptor, IntensityTier};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("no animation registered under '{0}'")]
    NotFound(String),
    #[error("animation '{0}' is already registered")]
    Duplicate(String),
    #[error("invalid animation: {0}")]
    Invalid(#[from] DescriptorError),
}

/// What [`VariantRegistry::lookup`] does with unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// Unknown names are errors.
    Strict,
    /// Unknown names fall back to a pass-through animation.
    Lenient,
}

impl LookupMode {
    /// Strict in debug builds, lenient in release builds.
    pub fn for_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

#[derive(Debug, Clone)]
pub struct VariantRegistry {
    entries: BTreeMap<String, Arc<AnimationDescriptor>>,
    mode: LookupMode,
}

impl VariantRegistry {
    /// Registry holding only the built-in animations.
    pub fn builtin() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The shared built-in registry, created on first use.
    pub fn global() -> &'static VariantRegistry {
        static GLOBAL: OnceLock<VariantRegistry> = OnceLock::new();
        GLOBAL.get_or_init(VariantRegistry::builtin)
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The base (high tier) definition.
    pub fn base(&self, name: &str) -> Result<Arc<AnimationDescriptor>, RegistryError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Descriptor for `name` under the given capability.
    pub fn get(
        &self,
        name: &str,
        capability: &CapabilityDescriptor,
    ) -> Result<AnimationDescriptor, RegistryError> {
        self.get_with(name, capability, &AnimationOverrides::default())
    }

    /// Descriptor for `name` at `tier`, motion assumed enabled.
    pub fn get_for_tier(
        &self,
        name: &str,
        tier: IntensityTier,
    ) -> Result<AnimationDescriptor, RegistryError> {
        self.get(name, &CapabilityDescriptor::with_tier(tier))
    }

    /// Descriptor for `name` with per-call overrides merged in.
    ///
    /// Overrides are applied before degradation, so a degraded descriptor
    /// stays near-instant whatever the caller asked for.
    pub fn get_with(
        &self,
        name: &str,
        capability: &CapabilityDescriptor,
        overrides: &AnimationOverrides,
    ) -> Result<AnimationDescriptor, RegistryError> {
        let base = self.base(name)?;
        let tier = if capability.motion_enabled {
            capability.intensity_tier
        } else {
            IntensityTier::Low
        };
        let mut resolved = match tier {
            IntensityTier::Medium => base.for_tier(IntensityTier::Medium),
            IntensityTier::High | IntensityTier::Low => (*base).clone(),
        };
        if !overrides.is_empty() {
            overrides.validate(name)?;
            resolved = resolved.with_overrides(overrides);
        }
        if capability.is_degraded() {
            resolved = resolved.degraded();
        } else if !capability.particles_enabled {
            resolved.overlay = None;
        }
        Ok(resolved)
    }

    /// [`get_with`](Self::get_with), with unknown names and invalid
    /// overrides handled per [`LookupMode`].
    pub fn lookup(
        &self,
        name: &str,
        capability: &CapabilityDescriptor,
        overrides: &AnimationOverrides,
    ) -> Result<AnimationDescriptor, RegistryError> {
        match self.get_with(name, capability, overrides) {
            Err(RegistryError::NotFound(missing)) if self.mode == LookupMode::Lenient => {
                tracing::warn!(animation = %missing, "unknown animation, rendering without motion");
                Ok(AnimationDescriptor::passthrough(missing))
            }
            Err(RegistryError::Invalid(err)) if self.mode == LookupMode::Lenient => {
                tracing::warn!(animation = name, error = %err, "ignoring invalid overrides");
                self.get(name, capability)
            }
            other => other,
        }
    }
}

/// Collects animations before the registry is frozen.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, Arc<AnimationDescriptor>>,
    mode: LookupMode,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Builder pre-loaded with the built-in set.
    pub fn new() -> Self {
        let entries = builtin::all()
            .into_iter()
            .map(|d| (d.name.clone(), Arc::new(d)))
            .collect();
        Self {
            entries,
            mode: LookupMode::for_build(),
        }
    }

    /// Builder with no animations at all.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
            mode: LookupMode::for_build(),
        }
    }

    pub fn mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a custom animation. Names are unique, built-ins included.
    pub fn register(&mut self, descriptor: AnimationDescriptor) -> Result<&mut Self, RegistryError> {
        descriptor.validate()?;
        if self.entries.contains_key(&descriptor.name) {
            return Err(RegistryError::Duplicate(descriptor.name));
        }
        tracing::debug!(animation = %descriptor.name, "registered custom animation");
        self.entries
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(self)
    }

    pub fn build(self) -> VariantRegistry {
        VariantRegistry {
            entries: self.entries,
            mode: self.mode,
        }
    }
}
