//! Preference resolution: what kind of motion this visitor gets.
//!
//! Every animated surface on the site asks the same question before it
//! picks a variant: is motion allowed at all, and how rich may it be? The
//! answer is a [`CapabilityDescriptor`], derived once per session from three
//! environment signals:
//!
//! ```text
//! explicit user opt-out   ──┐
//! OS reduced-motion flag  ──┼──► resolve() ──► CapabilityDescriptor
//! device performance probe ─┘                  { motion, tier, particles }
//! ```
//!
//! ## Precedence
//!
//! 1. A user who switched motion off gets no motion, whatever the device.
//! 2. Otherwise the OS `prefers-reduced-motion` flag is honored.
//! 3. Otherwise the probe picks the [`IntensityTier`].
//!
//! Missing or unusable probes never fail: they resolve to [`IntensityTier::Medium`]
//! with motion enabled.
//!
//! ## Preference Changes
//!
//! The descriptor is immutable. When a signal changes (the user flips the
//! site toggle, the OS setting changes mid-session) the [`PreferenceStore`]
//! computes a fresh descriptor and bumps its generation; consumers compare
//! generations rather than caching a descriptor across a change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Coarse animation richness level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl IntensityTier {
    pub const ALL: [IntensityTier; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for IntensityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective animation capability for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub motion_enabled: bool,
    pub intensity_tier: IntensityTier,
    pub particles_enabled: bool,
}

impl CapabilityDescriptor {
    /// Capability with motion on at the given tier.
    pub fn with_tier(tier: IntensityTier) -> Self {
        Self {
            motion_enabled: true,
            intensity_tier: tier,
            particles_enabled: tier != IntensityTier::Low,
        }
    }

    /// Capability with motion switched off.
    pub fn motionless() -> Self {
        Self {
            motion_enabled: false,
            intensity_tier: IntensityTier::Low,
            particles_enabled: false,
        }
    }

    /// Whether animations must use their degraded form.
    pub fn is_degraded(&self) -> bool {
        !self.motion_enabled || self.intensity_tier == IntensityTier::Low
    }
}

impl Default for CapabilityDescriptor {
    fn default() -> Self {
        Self::with_tier(IntensityTier::Medium)
    }
}

/// The visitor's explicit choice from the site's motion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserPreference {
    /// No explicit choice; defer to the OS and the device.
    #[default]
    System,
    /// Motion switched off on the site.
    Off,
}

/// Device performance hints gathered by the client.
///
/// Every field is optional: browsers expose different subsets, and the
/// probe itself may fail entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerformanceProbe {
    /// Unmasked WebGL renderer string.
    pub gpu_renderer: Option<String>,
    /// JS heap headroom (limit minus used), in MiB.
    pub heap_headroom_mb: Option<u64>,
    /// `navigator.hardwareConcurrency`.
    pub logical_cores: Option<u32>,
    /// `navigator.deviceMemory`, in GB.
    pub device_memory_gb: Option<f32>,
}

/// Device class inferred from a [`PerformanceProbe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeviceClass {
    LowEnd,
    MidRange,
    HighEnd,
}

impl DeviceClass {
    pub fn tier(self) -> IntensityTier {
        match self {
            Self::LowEnd => IntensityTier::Low,
            Self::MidRange => IntensityTier::Medium,
            Self::HighEnd => IntensityTier::High,
        }
    }
}

pub(crate) const SOFTWARE_RENDERERS: &[&str] = &["swiftshader", "llvmpipe", "software", "basic render"];
pub(crate) const INTEGRATED_RENDERERS: &[&str] = &["intel", "mali", "adreno", "powervr", "uhd graphics"];
pub(crate) const DISCRETE_RENDERERS: &[&str] = &["nvidia", "geforce", "rtx", "radeon rx", "apple m"];

const LOW_HEAP_MB: u64 = 256;
const HIGH_HEAP_MB: u64 = 1024;
const LOW_CORES: u32 = 2;
const HIGH_CORES: u32 = 8;
const LOW_MEMORY_GB: f32 = 2.0;
const HIGH_MEMORY_GB: f32 = 8.0;

fn classify_renderer(renderer: &str) -> Option<DeviceClass> {
    let renderer = renderer.to_ascii_lowercase();
    let matches = |needles: &[&str]| needles.iter().any(|n| renderer.contains(n));
    if matches(SOFTWARE_RENDERERS) {
        Some(DeviceClass::LowEnd)
    } else if matches(DISCRETE_RENDERERS) {
        Some(DeviceClass::HighEnd)
    } else if matches(INTEGRATED_RENDERERS) {
        Some(DeviceClass::MidRange)
    } else {
        None
    }
}

fn threshold_vote<T: PartialOrd>(value: T, low: T, high: T) -> DeviceClass {
    if value <= low {
        DeviceClass::LowEnd
    } else if value >= high {
        DeviceClass::HighEnd
    } else {
        DeviceClass::MidRange
    }
}

impl PerformanceProbe {
    /// Classify the device from whatever signals are present.
    ///
    /// Any low-end vote wins. High-end needs at least one high-end vote and
    /// no mid-range GPU. Returns `None` when no signal is usable.
    pub fn classify(&self) -> Option<DeviceClass> {
        let gpu = self.gpu_renderer.as_deref().and_then(classify_renderer);
        let mut votes = Vec::with_capacity(4);
        votes.extend(gpu);
        votes.extend(
            self.heap_headroom_mb
                .map(|mb| threshold_vote(mb, LOW_HEAP_MB - 1, HIGH_HEAP_MB)),
        );
        votes.extend(
            self.logical_cores
                .map(|cores| threshold_vote(cores, LOW_CORES, HIGH_CORES)),
        );
        votes.extend(
            self.device_memory_gb
                .filter(|gb| gb.is_finite())
                .map(|gb| threshold_vote(gb, LOW_MEMORY_GB, HIGH_MEMORY_GB)),
        );

        if votes.is_empty() {
            return None;
        }
        if votes.contains(&DeviceClass::LowEnd) {
            return Some(DeviceClass::LowEnd);
        }
        if votes.contains(&DeviceClass::HighEnd) && gpu != Some(DeviceClass::MidRange) {
            return Some(DeviceClass::HighEnd);
        }
        Some(DeviceClass::MidRange)
    }
}

/// Everything [`resolve`] looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentSignals {
    /// `prefers-reduced-motion: reduce`; `None` when the query is unavailable.
    pub reduced_motion: Option<bool>,
    pub user_preference: UserPreference,
    pub probe: Option<PerformanceProbe>,
}

/// Derive the session capability from environment signals. Pure; never fails.
pub fn resolve(signals: &EnvironmentSignals) -> CapabilityDescriptor {
    if signals.user_preference == UserPreference::Off {
        return CapabilityDescriptor::motionless();
    }
    if signals.reduced_motion == Some(true) {
        return CapabilityDescriptor::motionless();
    }
    let tier = signals
        .probe
        .as_ref()
        .and_then(PerformanceProbe::classify)
        .map(DeviceClass::tier)
        .unwrap_or_default();
    CapabilityDescriptor::with_tier(tier)
}

// =============================================================================
// Preference change handling
// =============================================================================

/// A single environment signal changing mid-session.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceChange {
    ReducedMotion(Option<bool>),
    User(UserPreference),
    Probe(Option<PerformanceProbe>),
}

/// Holds the current signals and the capability derived from them.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    signals: EnvironmentSignals,
    current: Arc<CapabilityDescriptor>,
    generation: u64,
}

impl PreferenceStore {
    pub fn new(signals: EnvironmentSignals) -> Self {
        let current = Arc::new(resolve(&signals));
        Self {
            signals,
            current,
            generation: 0,
        }
    }

    pub fn current(&self) -> Arc<CapabilityDescriptor> {
        Arc::clone(&self.current)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn signals(&self) -> &EnvironmentSignals {
        &self.signals
    }

    /// Apply a change event and re-derive the capability.
    ///
    /// Returns `true` when the effective capability changed. The previous
    /// descriptor is left untouched for anyone still holding it.
    pub fn apply(&mut self, change: PreferenceChange) -> bool {
        match change {
            PreferenceChange::ReducedMotion(flag) => self.signals.reduced_motion = flag,
            PreferenceChange::User(pref) => self.signals.user_preference = pref,
            PreferenceChange::Probe(probe) => self.signals.probe = probe,
        }
        let next = resolve(&self.signals);
        if next == *self.current {
            return false;
        }
        tracing::debug!(
            from_tier = %self.current.intensity_tier,
            to_tier = %next.intensity_tier,
            motion = next.motion_enabled,
            "motion capability changed"
        );
        self.current = Arc::new(next);
        self.generation += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_gpu(renderer: &str) -> PerformanceProbe {
        PerformanceProbe {
            gpu_renderer: Some(renderer.to_string()),
            ..Default::default()
        }
    }

    fn signals_with(probe: PerformanceProbe) -> EnvironmentSignals {
        EnvironmentSignals {
            probe: Some(probe),
            ..Default::default()
        }
    }

    // =========================================================================
    // resolve precedence
    // =========================================================================

    #[test]
    fn no_signals_defaults_to_medium_with_motion() {
        let cap = resolve(&EnvironmentSignals::default());
        assert!(cap.motion_enabled);
        assert_eq!(cap.intensity_tier, IntensityTier::Medium);
        assert!(cap.particles_enabled);
    }

    #[test]
    fn user_off_overrides_everything() {
        let signals = EnvironmentSignals {
            reduced_motion: Some(false),
            user_preference: UserPreference::Off,
            probe: Some(probe_gpu("NVIDIA GeForce RTX 4090")),
        };
        let cap = resolve(&signals);
        assert!(!cap.motion_enabled);
        assert!(!cap.particles_enabled);
    }

    #[test]
    fn os_reduced_motion_disables_particles_regardless_of_probe() {
        for renderer in ["NVIDIA GeForce RTX 4090", "Intel UHD Graphics 620", "SwiftShader"] {
            let signals = EnvironmentSignals {
                reduced_motion: Some(true),
                probe: Some(probe_gpu(renderer)),
                ..Default::default()
            };
            let cap = resolve(&signals);
            assert!(!cap.motion_enabled, "{renderer}");
            assert!(!cap.particles_enabled, "{renderer}");
        }
    }

    #[test]
    fn unavailable_reduced_motion_query_is_not_reduced() {
        let signals = EnvironmentSignals {
            reduced_motion: None,
            ..Default::default()
        };
        assert!(resolve(&signals).motion_enabled);
    }

    #[test]
    fn low_tier_never_has_particles() {
        let cap = resolve(&signals_with(probe_gpu("Google SwiftShader")));
        assert!(cap.motion_enabled);
        assert_eq!(cap.intensity_tier, IntensityTier::Low);
        assert!(!cap.particles_enabled);
    }

    #[test]
    fn discrete_gpu_resolves_high() {
        let cap = resolve(&signals_with(probe_gpu("ANGLE (NVIDIA GeForce GTX 1080)")));
        assert_eq!(cap.intensity_tier, IntensityTier::High);
        assert!(cap.particles_enabled);
    }

    // =========================================================================
    // Probe classification
    // =========================================================================

    #[test]
    fn empty_probe_has_no_class() {
        assert_eq!(PerformanceProbe::default().classify(), None);
        let cap = resolve(&signals_with(PerformanceProbe::default()));
        assert_eq!(cap.intensity_tier, IntensityTier::Medium);
    }

    #[test]
    fn unknown_renderer_is_ignored() {
        assert_eq!(probe_gpu("Mystery Renderer 9000").classify(), None);
    }

    #[test]
    fn integrated_gpu_is_mid_range() {
        assert_eq!(
            probe_gpu("Intel(R) Iris(R) Xe").classify(),
            Some(DeviceClass::MidRange)
        );
    }

    #[test]
    fn any_low_vote_wins() {
        let probe = PerformanceProbe {
            gpu_renderer: Some("NVIDIA GeForce RTX 3070".into()),
            heap_headroom_mb: Some(100),
            ..Default::default()
        };
        assert_eq!(probe.classify(), Some(DeviceClass::LowEnd));
    }

    #[test]
    fn integrated_gpu_caps_high_votes() {
        let probe = PerformanceProbe {
            gpu_renderer: Some("Mali-G78".into()),
            logical_cores: Some(8),
            device_memory_gb: Some(8.0),
            ..Default::default()
        };
        assert_eq!(probe.classify(), Some(DeviceClass::MidRange));
    }

    #[test]
    fn hardware_numbers_alone_can_reach_high() {
        let probe = PerformanceProbe {
            logical_cores: Some(12),
            device_memory_gb: Some(16.0),
            heap_headroom_mb: Some(2048),
            ..Default::default()
        };
        assert_eq!(probe.classify(), Some(DeviceClass::HighEnd));
    }

    #[test]
    fn two_cores_is_low_end() {
        let probe = PerformanceProbe {
            logical_cores: Some(2),
            ..Default::default()
        };
        assert_eq!(probe.classify(), Some(DeviceClass::LowEnd));
    }

    #[test]
    fn nan_device_memory_is_ignored() {
        let probe = PerformanceProbe {
            device_memory_gb: Some(f32::NAN),
            ..Default::default()
        };
        assert_eq!(probe.classify(), None);
    }

    // =========================================================================
    // PreferenceStore
    // =========================================================================

    #[test]
    fn store_recomputes_on_change() {
        let mut store = PreferenceStore::new(EnvironmentSignals::default());
        let before = store.current();
        assert_eq!(store.generation(), 0);

        assert!(store.apply(PreferenceChange::ReducedMotion(Some(true))));
        assert_eq!(store.generation(), 1);
        assert!(!store.current().motion_enabled);
        // The descriptor handed out earlier is not mutated.
        assert!(before.motion_enabled);
    }

    #[test]
    fn store_ignores_changes_with_same_outcome() {
        let mut store = PreferenceStore::new(EnvironmentSignals {
            user_preference: UserPreference::Off,
            ..Default::default()
        });
        assert!(!store.apply(PreferenceChange::ReducedMotion(Some(true))));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn store_probe_change_moves_tier() {
        let mut store = PreferenceStore::new(EnvironmentSignals::default());
        assert!(store.apply(PreferenceChange::Probe(Some(probe_gpu("llvmpipe")))));
        assert_eq!(store.current().intensity_tier, IntensityTier::Low);
        assert!(store.apply(PreferenceChange::Probe(None)));
        assert_eq!(store.current().intensity_tier, IntensityTier::Medium);
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&IntensityTier::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
