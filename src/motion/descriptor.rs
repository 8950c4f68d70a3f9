//! Declarative animation descriptors.
//!
//! An [`AnimationDescriptor`] names a set of visual states (`hidden`,
//! `visible`, optionally `hover` and friends) and the [`Transition`] used to
//! move between them. Descriptors are plain values: every transformation in
//! this module (tier scaling, overrides, degradation) returns a new
//! descriptor and leaves the input untouched.

use crate::capability::IntensityTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const HIDDEN: &str = "hidden";
pub const VISIBLE: &str = "visible";

/// Transition length used by degraded descriptors, in seconds.
///
/// Not zero: a zero-length transition makes some engines skip the style
/// change entirely, which shows up as a flash of the hidden state.
pub const MIN_DURATION: f64 = 0.01;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("animation '{name}' is missing the '{state}' state")]
    MissingState { name: String, state: &'static str },
    #[error("animation '{name}': {field} must be a finite number")]
    NonFinite { name: String, field: String },
    #[error("animation '{name}': {field} is out of range ({reason})")]
    OutOfRange {
        name: String,
        field: String,
        reason: &'static str,
    },
    #[error("animation '{name}' must have a positive transition duration")]
    NonPositiveDuration { name: String },
    #[error("animation name must not be empty")]
    EmptyName,
}

// =============================================================================
// Properties
// =============================================================================

/// Animatable property kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Opacity,
    X,
    Y,
    Scale,
    Rotate,
    Blur,
    Clip,
}

/// How a property follows a continuously changing driver value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    Linear,
    Spring,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 7] = [
        Self::Opacity,
        Self::X,
        Self::Y,
        Self::Scale,
        Self::Rotate,
        Self::Blur,
        Self::Clip,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Opacity => "opacity",
            Self::X => "x",
            Self::Y => "y",
            Self::Scale => "scale",
            Self::Rotate => "rotate",
            Self::Blur => "blur",
            Self::Clip => "clip",
        }
    }

    /// Decorative properties are dropped from degraded descriptors.
    pub fn is_decorative(self) -> bool {
        matches!(self, Self::Rotate | Self::Blur)
    }

    /// Whether the property holds a single number (clip is a four-sided inset).
    pub fn is_scalar(self) -> bool {
        self != Self::Clip
    }

    /// Smoothing rule for scroll-driven values.
    ///
    /// Geometry (translation, scale, rotation) is spring-smoothed so fast
    /// scroll input does not jitter; opacity, blur and clip always track the
    /// driver linearly so content never lags behind its reveal.
    pub fn smoothing(self) -> Smoothing {
        match self {
            Self::X | Self::Y | Self::Scale | Self::Rotate => Smoothing::Spring,
            Self::Opacity | Self::Blur | Self::Clip => Smoothing::Linear,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `inset()` clip in percent of the element box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipInset {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ClipInset {
    pub const NONE: ClipInset = ClipInset {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    fn sides(&self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    pub fn lerp(&self, to: &ClipInset, t: f64) -> ClipInset {
        ClipInset {
            top: lerp(self.top, to.top, t),
            right: lerp(self.right, to.right, t),
            bottom: lerp(self.bottom, to.bottom, t),
            left: lerp(self.left, to.left, t),
        }
    }
}

/// Visual properties of one animation state. Unset properties keep the
/// element's natural value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertySet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Horizontal offset in px.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical offset in px.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Blur radius in px.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip: Option<ClipInset>,
}

impl PropertySet {
    pub fn is_empty(&self) -> bool {
        *self == PropertySet::default()
    }

    /// Value of a scalar property. Always `None` for [`PropertyKind::Clip`].
    pub fn scalar(&self, kind: PropertyKind) -> Option<f64> {
        match kind {
            PropertyKind::Opacity => self.opacity,
            PropertyKind::X => self.x,
            PropertyKind::Y => self.y,
            PropertyKind::Scale => self.scale,
            PropertyKind::Rotate => self.rotate,
            PropertyKind::Blur => self.blur,
            PropertyKind::Clip => None,
        }
    }

    /// Set a scalar property. Setting [`PropertyKind::Clip`] is ignored.
    pub fn set_scalar(&mut self, kind: PropertyKind, value: f64) {
        let slot = match kind {
            PropertyKind::Opacity => &mut self.opacity,
            PropertyKind::X => &mut self.x,
            PropertyKind::Y => &mut self.y,
            PropertyKind::Scale => &mut self.scale,
            PropertyKind::Rotate => &mut self.rotate,
            PropertyKind::Blur => &mut self.blur,
            PropertyKind::Clip => return,
        };
        *slot = Some(value);
    }

    /// Kinds that carry a value in this set.
    pub fn kinds(&self) -> Vec<PropertyKind> {
        PropertyKind::ALL
            .into_iter()
            .filter(|&k| match k {
                PropertyKind::Clip => self.clip.is_some(),
                _ => self.scalar(k).is_some(),
            })
            .collect()
    }

    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merged(&self, other: &PropertySet) -> PropertySet {
        PropertySet {
            opacity: other.opacity.or(self.opacity),
            x: other.x.or(self.x),
            y: other.y.or(self.y),
            scale: other.scale.or(self.scale),
            rotate: other.rotate.or(self.rotate),
            blur: other.blur.or(self.blur),
            clip: other.clip.or(self.clip),
        }
    }

    /// Interpolate towards `to`. A property set on only one side
    /// interpolates from/to its natural value.
    pub fn lerp(&self, to: &PropertySet, t: f64) -> PropertySet {
        let mut out = PropertySet::default();
        for kind in PropertyKind::ALL.into_iter().filter(|k| k.is_scalar()) {
            let (a, b) = (self.scalar(kind), to.scalar(kind));
            if a.is_none() && b.is_none() {
                continue;
            }
            let natural = natural_value(kind);
            out.set_scalar(
                kind,
                lerp(a.unwrap_or(natural), b.unwrap_or(natural), t),
            );
        }
        if self.clip.is_some() || to.clip.is_some() {
            let from = self.clip.unwrap_or(ClipInset::NONE);
            out.clip = Some(from.lerp(&to.clip.unwrap_or(ClipInset::NONE), t));
        }
        out
    }

    fn scaled(&self, scale: &TierScale) -> PropertySet {
        PropertySet {
            opacity: self.opacity,
            x: self.x.map(|v| v * scale.travel),
            y: self.y.map(|v| v * scale.travel),
            // Scale travels around 1.0, not 0.0.
            scale: self.scale.map(|v| 1.0 + (v - 1.0) * scale.travel),
            rotate: self.rotate.map(|v| v * scale.rotation),
            blur: self.blur.map(|v| v * scale.blur),
            clip: self.clip,
        }
    }

    fn strip_decorative(&mut self) {
        self.rotate = None;
        self.blur = None;
    }

    fn validate(&self, name: &str, state: &str) -> Result<(), DescriptorError> {
        let field = |prop: &str| format!("{state}.{prop}");
        for kind in PropertyKind::ALL.into_iter().filter(|k| k.is_scalar()) {
            if let Some(v) = self.scalar(kind) {
                if !v.is_finite() {
                    return Err(DescriptorError::NonFinite {
                        name: name.to_string(),
                        field: field(kind.as_str()),
                    });
                }
            }
        }
        if let Some(clip) = &self.clip {
            if clip.sides().iter().any(|v| !v.is_finite()) {
                return Err(DescriptorError::NonFinite {
                    name: name.to_string(),
                    field: field("clip"),
                });
            }
        }
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(DescriptorError::OutOfRange {
                    name: name.to_string(),
                    field: field("opacity"),
                    reason: "expected 0..=1",
                });
            }
        }
        if self.scale.is_some_and(|v| v < 0.0) {
            return Err(DescriptorError::OutOfRange {
                name: name.to_string(),
                field: field("scale"),
                reason: "must not be negative",
            });
        }
        if self.blur.is_some_and(|v| v < 0.0) {
            return Err(DescriptorError::OutOfRange {
                name: name.to_string(),
                field: field("blur"),
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}

/// Value a property has when no state sets it.
pub fn natural_value(kind: PropertyKind) -> f64 {
    match kind {
        PropertyKind::Opacity | PropertyKind::Scale => 1.0,
        _ => 0.0,
    }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// =============================================================================
// Timing
// =============================================================================

/// CSS-style cubic Bézier easing curve `(x1, y1, x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicBezier(pub [f64; 4]);

impl CubicBezier {
    pub const LINEAR: CubicBezier = CubicBezier([0.0, 0.0, 1.0, 1.0]);
    pub const EASE_OUT: CubicBezier = CubicBezier([0.0, 0.0, 0.58, 1.0]);
    pub const EASE_IN_OUT: CubicBezier = CubicBezier([0.42, 0.0, 0.58, 1.0]);
    /// Long, soft landing used by the signature entrances.
    pub const SILK: CubicBezier = CubicBezier([0.22, 1.0, 0.36, 1.0]);

    pub fn to_css(&self) -> String {
        let [x1, y1, x2, y2] = self.0;
        format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
    }

    /// Eased progress for linear time `t` in `[0, 1]`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        if t == 0.0 || t == 1.0 {
            return t;
        }
        let [x1, y1, x2, y2] = self.0;
        let bez = |p1: f64, p2: f64, s: f64| {
            let inv = 1.0 - s;
            3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
        };
        // x(s) is monotonic for x1, x2 in [0, 1]; bisect for the parameter.
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut s = t;
        for _ in 0..48 {
            let x = bez(x1, x2, s);
            if (x - t).abs() < 1e-7 {
                break;
            }
            if x < t {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        bez(y1, y2, s)
    }

    fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Default for CubicBezier {
    fn default() -> Self {
        Self::EASE_OUT
    }
}

/// Physical spring parameters (unit mass unless stated).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
}

fn default_mass() -> f64 {
    1.0
}

impl SpringParams {
    pub fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass: 1.0,
        }
    }

    /// Damping ratio ζ. 1.0 is critically damped.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// Approximate time to settle within ~2% of the target, in seconds.
    pub fn settle_duration(&self) -> f64 {
        let omega = (self.stiffness / self.mass).sqrt();
        4.0 / (self.damping_ratio().min(1.0) * omega)
    }

    fn is_valid(&self) -> bool {
        [self.stiffness, self.damping, self.mass]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Delay between successive children of a staggered container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stagger {
    /// Seconds between two consecutive children.
    pub each: f64,
    /// Seconds before the first child starts.
    #[serde(default)]
    pub delay_children: f64,
}

/// Per-property deviation from the transition defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyTransition {
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub ease: Option<CubicBezier>,
}

/// Resolved timing for one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyTiming {
    pub duration: f64,
    pub delay: f64,
    pub ease: CubicBezier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transition {
    /// Seconds.
    pub duration: f64,
    pub ease: CubicBezier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spring: Option<SpringParams>,
    /// Seconds before the transition starts.
    pub delay: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<PropertyKind, PropertyTransition>,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: 0.5,
            ease: CubicBezier::EASE_OUT,
            spring: None,
            delay: 0.0,
            stagger: None,
            overrides: BTreeMap::new(),
        }
    }
}

impl Transition {
    pub fn tween(duration: f64, ease: CubicBezier) -> Self {
        Self {
            duration,
            ease,
            ..Default::default()
        }
    }

    /// Timing for `kind`, with per-property overrides applied.
    pub fn timing(&self, kind: PropertyKind) -> PropertyTiming {
        let over = self.overrides.get(&kind).copied().unwrap_or_default();
        PropertyTiming {
            duration: over.duration.unwrap_or(self.duration),
            delay: over.delay.unwrap_or(self.delay),
            ease: over.ease.unwrap_or(self.ease),
        }
    }

    /// Time from trigger until every property has arrived.
    pub fn total_time(&self) -> f64 {
        PropertyKind::ALL
            .into_iter()
            .map(|k| {
                let t = self.timing(k);
                t.delay + t.duration
            })
            .fold(0.0, f64::max)
    }

    fn scaled(&self, scale: &TierScale) -> Transition {
        let mut out = self.clone();
        out.duration *= scale.time;
        out.delay *= scale.time;
        out.stagger = self.stagger.map(|s| Stagger {
            each: s.each * scale.time,
            delay_children: s.delay_children * scale.time,
        });
        for over in out.overrides.values_mut() {
            over.duration = over.duration.map(|d| d * scale.time);
            over.delay = over.delay.map(|d| d * scale.time);
        }
        out
    }

    fn validate(&self, name: &str) -> Result<(), DescriptorError> {
        let non_finite = |field: &str| DescriptorError::NonFinite {
            name: name.to_string(),
            field: format!("transition.{field}"),
        };
        if !self.duration.is_finite() {
            return Err(non_finite("duration"));
        }
        if self.duration <= 0.0 {
            return Err(DescriptorError::NonPositiveDuration {
                name: name.to_string(),
            });
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(non_finite("delay"));
        }
        if !self.ease.is_finite() {
            return Err(non_finite("ease"));
        }
        if let Some(spring) = &self.spring {
            if !spring.is_valid() {
                return Err(DescriptorError::OutOfRange {
                    name: name.to_string(),
                    field: "transition.spring".into(),
                    reason: "stiffness, damping and mass must be positive",
                });
            }
        }
        if let Some(stagger) = &self.stagger {
            if !stagger.each.is_finite() || !stagger.delay_children.is_finite() {
                return Err(non_finite("stagger"));
            }
        }
        for (kind, over) in &self.overrides {
            let values = [over.duration, over.delay].into_iter().flatten();
            if values.into_iter().any(|v| !v.is_finite() || v < 0.0)
                || over.ease.is_some_and(|e| !e.is_finite())
            {
                return Err(non_finite(&format!("overrides.{kind}")));
            }
            if over.duration == Some(0.0) {
                return Err(DescriptorError::NonPositiveDuration {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Overlays and per-call overrides
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    Petals,
    Sparkles,
    Confetti,
}

/// Decorative particle trail rendered alongside the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParticleOverlay {
    pub kind: ParticleKind,
    /// Particle count at the high tier.
    pub count: u32,
}

/// Caller-supplied timing that wins over the registry defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationOverrides {
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub ease: Option<CubicBezier>,
}

impl AnimationOverrides {
    pub fn is_empty(&self) -> bool {
        *self == AnimationOverrides::default()
    }

    /// Reject values no transition can use: non-finite numbers, a duration
    /// that is not positive, a negative delay.
    pub fn validate(&self, name: &str) -> Result<(), DescriptorError> {
        let non_finite = |field: &str| DescriptorError::NonFinite {
            name: name.to_string(),
            field: format!("overrides.{field}"),
        };
        if let Some(duration) = self.duration {
            if !duration.is_finite() {
                return Err(non_finite("duration"));
            }
            if duration <= 0.0 {
                return Err(DescriptorError::NonPositiveDuration {
                    name: name.to_string(),
                });
            }
        }
        if let Some(delay) = self.delay {
            if !delay.is_finite() {
                return Err(non_finite("delay"));
            }
            if delay < 0.0 {
                return Err(DescriptorError::OutOfRange {
                    name: name.to_string(),
                    field: "overrides.delay".into(),
                    reason: "must not be negative",
                });
            }
        }
        if self.ease.is_some_and(|e| !e.is_finite()) {
            return Err(non_finite("ease"));
        }
        Ok(())
    }
}

/// Multipliers applied when stepping down from the high tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierScale {
    pub travel: f64,
    pub rotation: f64,
    pub blur: f64,
    pub time: f64,
    pub particles: f64,
}

pub const MEDIUM_SCALE: TierScale = TierScale {
    travel: 0.6,
    rotation: 0.5,
    blur: 0.5,
    time: 0.8,
    particles: 0.5,
};

// =============================================================================
// AnimationDescriptor
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationDescriptor {
    pub name: String,
    pub states: BTreeMap<String, PropertySet>,
    #[serde(default)]
    pub transition: Transition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<ParticleOverlay>,
}

impl AnimationDescriptor {
    /// Build a descriptor from its `hidden` and `visible` states.
    pub fn new(
        name: impl Into<String>,
        hidden: PropertySet,
        visible: PropertySet,
        transition: Transition,
    ) -> Self {
        let states = BTreeMap::from([(HIDDEN.to_string(), hidden), (VISIBLE.to_string(), visible)]);
        Self {
            name: name.into(),
            states,
            transition,
            overlay: None,
        }
    }

    pub fn with_state(mut self, name: impl Into<String>, props: PropertySet) -> Self {
        self.states.insert(name.into(), props);
        self
    }

    pub fn with_overlay(mut self, overlay: ParticleOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Animation that shows its element immediately.
    ///
    /// Stands in for unknown names when lookups are lenient.
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self::new(
            name,
            PropertySet {
                opacity: Some(1.0),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(1.0),
                ..Default::default()
            },
            Transition::tween(MIN_DURATION, CubicBezier::LINEAR),
        )
    }

    pub fn state(&self, name: &str) -> Option<&PropertySet> {
        self.states.get(name)
    }

    pub fn hidden(&self) -> &PropertySet {
        self.states.get(HIDDEN).unwrap_or(&EMPTY_SET)
    }

    pub fn visible(&self) -> &PropertySet {
        self.states.get(VISIBLE).unwrap_or(&EMPTY_SET)
    }

    /// Start delay of the `index`-th child of a staggered container.
    pub fn child_delay(&self, index: usize) -> f64 {
        match &self.transition.stagger {
            Some(s) => s.delay_children + s.each * index as f64,
            None => 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        for required in [HIDDEN, VISIBLE] {
            if !self.states.contains_key(required) {
                return Err(DescriptorError::MissingState {
                    name: self.name.clone(),
                    state: required,
                });
            }
        }
        for (state, props) in &self.states {
            props.validate(&self.name, state)?;
        }
        self.transition.validate(&self.name)
    }

    /// The form served at `tier` (motion assumed enabled).
    pub fn for_tier(&self, tier: IntensityTier) -> AnimationDescriptor {
        match tier {
            IntensityTier::High => self.clone(),
            IntensityTier::Medium => self.scaled(&MEDIUM_SCALE),
            IntensityTier::Low => self.degraded(),
        }
    }

    /// Scale travel, timing and particle budget.
    pub fn scaled(&self, scale: &TierScale) -> AnimationDescriptor {
        AnimationDescriptor {
            name: self.name.clone(),
            states: self
                .states
                .iter()
                .map(|(k, v)| (k.clone(), v.scaled(scale)))
                .collect(),
            transition: self.transition.scaled(scale),
            overlay: self.overlay.map(|o| ParticleOverlay {
                kind: o.kind,
                count: ((o.count as f64) * scale.particles).round() as u32,
            }),
        }
    }

    /// Reduced-motion-safe form.
    ///
    /// Near-zero duration, no delays, no spring, no decorative properties,
    /// no particles. `hidden`/`visible` always carry opacity, and `visible`
    /// is never fully transparent. Applying it twice changes nothing.
    pub fn degraded(&self) -> AnimationDescriptor {
        let mut states = self.states.clone();
        for props in states.values_mut() {
            props.strip_decorative();
        }
        let hidden = states.entry(HIDDEN.to_string()).or_default();
        hidden.opacity.get_or_insert(0.0);
        let visible = states.entry(VISIBLE.to_string()).or_default();
        match visible.opacity {
            Some(o) if o > 0.0 => {}
            _ => visible.opacity = Some(1.0),
        }

        AnimationDescriptor {
            name: self.name.clone(),
            states,
            transition: Transition {
                duration: MIN_DURATION,
                ease: CubicBezier::LINEAR,
                spring: None,
                delay: 0.0,
                stagger: None,
                overrides: BTreeMap::new(),
            },
            overlay: None,
        }
    }

    /// Merge per-call overrides into a fresh descriptor.
    ///
    /// An override replaces the default and every per-property value of the
    /// same field. An explicit duration also replaces the spring, whose
    /// settle time would otherwise decide the length.
    pub fn with_overrides(&self, overrides: &AnimationOverrides) -> AnimationDescriptor {
        let mut out = self.clone();
        let t = &mut out.transition;
        if let Some(duration) = overrides.duration {
            t.duration = duration;
            t.spring = None;
            t.overrides.values_mut().for_each(|o| o.duration = None);
        }
        if let Some(delay) = overrides.delay {
            t.delay = delay;
            t.overrides.values_mut().for_each(|o| o.delay = None);
        }
        if let Some(ease) = overrides.ease {
            t.ease = ease;
            t.overrides.values_mut().for_each(|o| o.ease = None);
        }
        t.overrides.retain(|_, o| *o != PropertyTransition::default());
        out
    }
}

static EMPTY_SET: PropertySet = PropertySet {
    opacity: None,
    x: None,
    y: None,
    scale: None,
    rotate: None,
    blur: None,
    clip: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{assert_close, props};

    fn rising() -> AnimationDescriptor {
        let mut transition = Transition::tween(0.8, CubicBezier::SILK);
        transition.delay = 0.2;
        transition.overrides.insert(
            PropertyKind::Opacity,
            PropertyTransition {
                duration: Some(0.4),
                ..Default::default()
            },
        );
        AnimationDescriptor::new(
            "rising",
            PropertySet {
                opacity: Some(0.0),
                y: Some(40.0),
                rotate: Some(-4.0),
                blur: Some(6.0),
                ..Default::default()
            },
            props(&[(PropertyKind::Opacity, 1.0), (PropertyKind::Y, 0.0)]),
            transition,
        )
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn valid_descriptor_passes() {
        assert!(rising().validate().is_ok());
    }

    #[test]
    fn missing_visible_state_is_rejected() {
        let mut d = rising();
        d.states.remove(VISIBLE);
        assert_eq!(
            d.validate(),
            Err(DescriptorError::MissingState {
                name: "rising".into(),
                state: VISIBLE
            })
        );
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let mut d = rising();
        d.states.get_mut(HIDDEN).unwrap().x = Some(f64::INFINITY);
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("hidden.x"));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut d = rising();
        d.transition.duration = 0.0;
        assert!(matches!(
            d.validate(),
            Err(DescriptorError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn opacity_above_one_is_rejected() {
        let mut d = rising();
        d.states.get_mut(VISIBLE).unwrap().opacity = Some(1.5);
        assert!(matches!(
            d.validate(),
            Err(DescriptorError::OutOfRange { .. })
        ));
    }

    // =========================================================================
    // Degradation
    // =========================================================================

    #[test]
    fn degraded_strips_decorative_and_collapses_timing() {
        let d = rising().degraded();
        assert_eq!(d.transition.duration, MIN_DURATION);
        assert_eq!(d.transition.delay, 0.0);
        assert!(d.transition.overrides.is_empty());
        assert!(d.hidden().rotate.is_none());
        assert!(d.hidden().blur.is_none());
        assert_eq!(d.hidden().y, Some(40.0));
    }

    #[test]
    fn degraded_fills_missing_opacity_endpoints() {
        let d = AnimationDescriptor::new(
            "slide",
            props(&[(PropertyKind::X, -30.0)]),
            props(&[(PropertyKind::X, 0.0)]),
            Transition::default(),
        )
        .degraded();
        assert_eq!(d.hidden().opacity, Some(0.0));
        assert_eq!(d.visible().opacity, Some(1.0));
    }

    #[test]
    fn degraded_never_leaves_visible_transparent() {
        let mut d = rising();
        d.states.get_mut(VISIBLE).unwrap().opacity = Some(0.0);
        assert_eq!(d.degraded().visible().opacity, Some(1.0));
    }

    #[test]
    fn degraded_is_idempotent() {
        let once = rising()
            .with_overlay(ParticleOverlay {
                kind: ParticleKind::Petals,
                count: 24,
            })
            .degraded();
        assert_eq!(once.degraded(), once);
        assert!(once.overlay.is_none());
    }

    // =========================================================================
    // Tier scaling and overrides
    // =========================================================================

    #[test]
    fn medium_tier_shortens_travel_and_time() {
        let d = rising().for_tier(IntensityTier::Medium);
        assert_close(d.hidden().y.unwrap(), 24.0);
        assert_close(d.hidden().rotate.unwrap(), -2.0);
        assert_close(d.transition.duration, 0.64);
        assert_close(d.transition.timing(PropertyKind::Opacity).duration, 0.32);
    }

    #[test]
    fn medium_scale_pivots_around_one() {
        let d = AnimationDescriptor::new(
            "grow",
            props(&[(PropertyKind::Scale, 0.5)]),
            props(&[(PropertyKind::Scale, 1.0)]),
            Transition::default(),
        );
        assert_close(d.for_tier(IntensityTier::Medium).hidden().scale.unwrap(), 0.7);
    }

    #[test]
    fn high_tier_is_unchanged() {
        assert_eq!(rising().for_tier(IntensityTier::High), rising());
    }

    #[test]
    fn override_duration_wins_over_defaults() {
        let base = rising();
        let d = base.with_overrides(&AnimationOverrides {
            duration: Some(1.5),
            ..Default::default()
        });
        assert_eq!(d.transition.duration, 1.5);
        assert_eq!(d.transition.timing(PropertyKind::Opacity).duration, 1.5);
        // The source is not touched.
        assert_eq!(base.transition.duration, 0.8);
    }

    #[test]
    fn override_drops_spring() {
        let mut base = rising();
        base.transition.spring = Some(SpringParams::new(120.0, 14.0));
        let d = base.with_overrides(&AnimationOverrides {
            duration: Some(0.3),
            ..Default::default()
        });
        assert!(d.transition.spring.is_none());
    }

    #[test]
    fn timing_uses_per_property_override() {
        let t = rising().transition;
        assert_eq!(t.timing(PropertyKind::Opacity).duration, 0.4);
        assert_eq!(t.timing(PropertyKind::Y).duration, 0.8);
        assert_close(t.total_time(), 1.0);
    }

    // =========================================================================
    // Easing, springs, interpolation
    // =========================================================================

    #[test]
    fn bezier_endpoints_and_linear() {
        for curve in [CubicBezier::EASE_OUT, CubicBezier::SILK, CubicBezier::EASE_IN_OUT] {
            assert_eq!(curve.evaluate(0.0), 0.0);
            assert_eq!(curve.evaluate(1.0), 1.0);
        }
        assert!((CubicBezier::LINEAR.evaluate(0.3) - 0.3).abs() < 1e-4);
    }

    #[test]
    fn ease_out_is_ahead_of_linear() {
        assert!(CubicBezier::EASE_OUT.evaluate(0.5) > 0.5);
    }

    #[test]
    fn bezier_css() {
        assert_eq!(
            CubicBezier::EASE_OUT.to_css(),
            "cubic-bezier(0, 0, 0.58, 1)"
        );
    }

    #[test]
    fn critically_damped_spring_ratio() {
        let spring = SpringParams::new(100.0, 20.0);
        assert_close(spring.damping_ratio(), 1.0);
        assert_close(spring.settle_duration(), 0.4);
    }

    #[test]
    fn lerp_uses_natural_value_for_one_sided_props() {
        let from = props(&[(PropertyKind::Opacity, 0.0), (PropertyKind::Scale, 0.5)]);
        let to = props(&[(PropertyKind::Opacity, 1.0)]);
        let mid = from.lerp(&to, 0.5);
        assert_close(mid.opacity.unwrap(), 0.5);
        assert_close(mid.scale.unwrap(), 0.75);
        assert!(mid.x.is_none());
    }

    #[test]
    fn child_delay_steps_by_stagger() {
        let mut d = rising();
        d.transition.stagger = Some(Stagger {
            each: 0.1,
            delay_children: 0.3,
        });
        assert_close(d.child_delay(0), 0.3);
        assert_close(d.child_delay(4), 0.7);
        assert_eq!(rising().child_delay(4), 0.0);
    }

    #[test]
    fn descriptor_parses_from_toml() {
        let d: AnimationDescriptor = toml::from_str(
            r#"
name = "ringSparkle"

[states.hidden]
opacity = 0.0
scale = 0.8

[states.visible]
opacity = 1.0
scale = 1.0

[transition]
duration = 0.6
ease = [0.2, 0.0, 0.2, 1.0]
"#,
        )
        .unwrap();
        assert_eq!(d.name, "ringSparkle");
        assert_eq!(d.transition.ease, CubicBezier([0.2, 0.0, 0.2, 1.0]));
        assert!(d.validate().is_ok());
    }
}
