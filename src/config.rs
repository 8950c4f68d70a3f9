//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the source directory overrides them
//! key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Aisle"
//! tagline = "Weddings, planned beautifully"
//! base_url = "/"
//!
//! [motion]
//! preference = "system"            # "system" or "off"
//! root_margin = "0px 0px -80px 0px" # Entrance trigger margin
//! # reduced_motion = true          # Preview the OS reduced-motion flag
//! # strict_lookup = true           # Unknown animation names are errors
//!
//! [motion.probe]                   # Preview a device (omit for medium tier)
//! gpu_renderer = "ANGLE (Apple, Apple M2, OpenGL 4.1)"
//! logical_cores = 8
//!
//! [[motion.animations]]            # Custom animations next to the built-ins
//! name = "ribbonUnfurl"
//! [motion.animations.states.hidden]
//! opacity = 0.0
//! x = -80.0
//! [motion.animations.states.visible]
//! opacity = 1.0
//! x = 0.0
//!
//! [scroll.heroParallax]            # Named scroll-linked effects
//! smooth = true
//! stiffness = 170.0
//! [scroll.heroParallax.y]
//! input = [0.0, 1.0]
//! output = [0.0, -120.0]
//!
//! [colors]
//! background = "#fdfbf7"
//! text = "#2d2a26"
//! muted = "#8a817c"
//! gold = "#c9a96e"
//! blush = "#e8c4c4"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [colors]
//! gold = "#b8955a"
//! ```
//!
//! Unknown keys are rejected to catch typos early. Scroll mappings and
//! custom animations are checked as part of validation, so a config that
//! loads is a config whose effects can all be sampled.

use crate::capability::{EnvironmentSignals, PerformanceProbe, UserPreference};
use crate::motion::descriptor::{AnimationDescriptor, PropertyKind};
use crate::motion::registry::{LookupMode, VariantRegistry};
use crate::scroll::driver::ScrollTrack;
use crate::scroll::mapping::{MappingError, ScrollEffect, ScrollMapping};
use crate::scroll::spring::DEFAULT_STIFFNESS;
use crate::visibility::RootMargin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity shown on the preview page.
    pub site: SiteInfo,
    /// Preference preview, lookup mode and custom animations.
    pub motion: MotionConfig,
    /// Named scroll-linked effects.
    pub scroll: BTreeMap<String, ScrollEffectConfig>,
    /// Brand palette exported as CSS custom properties.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteInfo::default(),
            motion: MotionConfig::default(),
            scroll: default_scroll_effects(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate values and build everything that is built from config once,
    /// so errors surface at load time rather than on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        let url = &self.site.base_url;
        if !(url.starts_with('/') || url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.base_url must be absolute or start with '/', got '{url}'"
            )));
        }
        for (name, effect) in &self.scroll {
            if !effect.stiffness.is_finite() || effect.stiffness <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "scroll.{name}.stiffness must be positive"
                )));
            }
            effect
                .effect()
                .map_err(|e| ConfigError::Validation(format!("scroll.{name}: {e}")))?;
        }
        self.registry()?;
        Ok(())
    }

    /// Built-in animations plus the custom ones declared under
    /// `[[motion.animations]]`.
    pub fn registry(&self) -> Result<VariantRegistry, ConfigError> {
        let mut builder = VariantRegistry::builder().mode(self.motion.lookup_mode());
        for descriptor in &self.motion.animations {
            builder
                .register(descriptor.clone())
                .map_err(|e| ConfigError::Validation(format!("motion.animations: {e}")))?;
        }
        Ok(builder.build())
    }

    /// Look up a scroll effect by name.
    pub fn scroll_effect(&self, name: &str) -> Option<&ScrollEffectConfig> {
        self.scroll.get(name)
    }
}

/// Site identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    /// Prefix for generated asset URLs.
    pub base_url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Aisle".to_string(),
            tagline: "Weddings, planned beautifully".to_string(),
            base_url: "/".to_string(),
        }
    }
}

/// Motion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// The site-level motion toggle.
    pub preference: UserPreference,
    /// Pretend the OS reports `prefers-reduced-motion`. Unset means the
    /// query is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_motion: Option<bool>,
    /// Force strict or lenient animation lookup. Unset follows the build
    /// profile: strict in debug builds, lenient in release builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_lookup: Option<bool>,
    /// Viewport margin used by the entrance trigger.
    pub root_margin: RootMargin,
    /// Device to preview. Unset resolves to the medium tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<PerformanceProbe>,
    /// Extra animations registered next to the built-ins.
    pub animations: Vec<AnimationDescriptor>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            preference: UserPreference::System,
            reduced_motion: None,
            strict_lookup: None,
            root_margin: RootMargin {
                bottom: -80.0,
                ..RootMargin::default()
            },
            probe: None,
            animations: Vec::new(),
        }
    }
}

impl MotionConfig {
    /// Environment signals as configured for previews.
    pub fn signals(&self) -> EnvironmentSignals {
        EnvironmentSignals {
            reduced_motion: self.reduced_motion,
            user_preference: self.preference,
            probe: self.probe.clone(),
        }
    }

    pub fn lookup_mode(&self) -> LookupMode {
        match self.strict_lookup {
            Some(true) => LookupMode::Strict,
            Some(false) => LookupMode::Lenient,
            None => LookupMode::for_build(),
        }
    }
}

/// One named scroll effect: smoothing settings plus a mapping per property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollEffectConfig {
    /// Spring-smooth offsets, scale and rotation.
    pub smooth: bool,
    /// Spring stiffness when smoothing.
    pub stiffness: f64,
    /// Property tables (`[scroll.<name>.opacity]`, `[scroll.<name>.y]`, ...).
    /// Any key that is not a property name is rejected.
    #[serde(flatten)]
    pub properties: BTreeMap<PropertyKind, ScrollMapping>,
}

impl Default for ScrollEffectConfig {
    fn default() -> Self {
        Self {
            smooth: false,
            stiffness: DEFAULT_STIFFNESS,
            properties: BTreeMap::new(),
        }
    }
}

impl ScrollEffectConfig {
    pub fn effect(&self) -> Result<ScrollEffect, MappingError> {
        ScrollEffect::new(self.properties.clone())
    }

    /// A fresh track for one subscriber.
    pub fn track(&self) -> Result<ScrollTrack, MappingError> {
        let effect = self.effect()?;
        Ok(if self.smooth {
            ScrollTrack::smoothed(effect, self.stiffness)
        } else {
            ScrollTrack::linear(effect)
        })
    }
}

fn mapping(input: &[f64], output: &[f64]) -> ScrollMapping {
    ScrollMapping::new(input.to_vec(), output.to_vec()).expect("stock scroll mapping must be valid")
}

fn default_scroll_effects() -> BTreeMap<String, ScrollEffectConfig> {
    BTreeMap::from([
        (
            "heroParallax".to_string(),
            ScrollEffectConfig {
                smooth: true,
                stiffness: DEFAULT_STIFFNESS,
                properties: BTreeMap::from([
                    (PropertyKind::Y, mapping(&[0.0, 1.0], &[0.0, -120.0])),
                    (
                        PropertyKind::Opacity,
                        mapping(&[0.0, 0.6, 1.0], &[1.0, 1.0, 0.2]),
                    ),
                ]),
            },
        ),
        (
            "galleryDrift".to_string(),
            ScrollEffectConfig {
                smooth: false,
                stiffness: DEFAULT_STIFFNESS,
                properties: BTreeMap::from([(
                    PropertyKind::X,
                    mapping(&[0.0, 1.0], &[-40.0, 40.0]),
                )]),
            },
        ),
    ])
}

/// Brand palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Page background (ivory).
    pub background: String,
    /// Body text.
    pub text: String,
    /// Captions and secondary text.
    pub muted: String,
    /// Primary accent, also the shimmer and sparkle color.
    pub gold: String,
    /// Secondary accent, also the petal color.
    pub blush: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#fdfbf7".to_string(),
            text: "#2d2a26".to_string(),
            muted: "#8a817c".to_string(),
            gold: "#c9a96e".to_string(),
            blush: "#e8c4c4".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(
        root = %root.display(),
        custom_animations = config.motion.animations.len(),
        scroll_effects = config.scroll.len(),
        "loaded config"
    );
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Aisle Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as config.toml in the source directory. It is merged on
# top of the stock defaults key by key. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
name = "Aisle"
tagline = "Weddings, planned beautifully"
# Prefix for generated asset URLs ("/" or an absolute URL).
base_url = "/"

# ---------------------------------------------------------------------------
# Motion
# ---------------------------------------------------------------------------
[motion]
# The site-level motion toggle: "system" follows the OS and device,
# "off" disables all motion.
preference = "system"

# Viewport margin for entrance triggers, CSS shorthand (top right bottom left).
# A negative bottom margin waits until the element is that far inside.
root_margin = "0px 0px -80px 0px"

# Preview the OS prefers-reduced-motion flag.
# reduced_motion = true

# Unknown animation names: true = error, false = show the element without
# motion. Unset follows the build (strict in debug, lenient in release).
# strict_lookup = true

# Preview a device. Any subset of the fields may be given; with no probe
# the medium tier is used.
# [motion.probe]
# gpu_renderer = "ANGLE (Apple, Apple M2, OpenGL 4.1)"
# heap_headroom_mb = 2048
# logical_cores = 8
# device_memory_gb = 8.0

# Custom animations, registered next to the built-ins. Each needs a unique
# name and both a "hidden" and a "visible" state.
# [[motion.animations]]
# name = "ribbonUnfurl"
# [motion.animations.states.hidden]
# opacity = 0.0
# x = -80.0
# [motion.animations.states.visible]
# opacity = 1.0
# x = 0.0
# [motion.animations.transition]
# duration = 0.9
# ease = [0.22, 1.0, 0.36, 1.0]

# ---------------------------------------------------------------------------
# Scroll-linked effects
# ---------------------------------------------------------------------------
# Each effect maps scroll progress through its region (0 = entering at the
# bottom, 1 = leaving at the top) to property values. Inputs must be
# strictly increasing within [0, 1], with one output per input.
# Offsets, scale and rotation are spring-smoothed when smooth = true;
# opacity and blur always follow the mapping exactly.
[scroll.heroParallax]
smooth = true
stiffness = 170.0

[scroll.heroParallax.opacity]
input = [0.0, 0.6, 1.0]
output = [1.0, 1.0, 0.2]

[scroll.heroParallax.y]
input = [0.0, 1.0]
output = [0.0, -120.0]

[scroll.galleryDrift]
smooth = false
stiffness = 170.0

[scroll.galleryDrift.x]
input = [0.0, 1.0]
output = [-40.0, 40.0]

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#fdfbf7"
text = "#2d2a26"
muted = "#8a817c"       # Captions, secondary text
gold = "#c9a96e"        # Accent, shimmer and sparkles
blush = "#e8c4c4"       # Petals
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-background: {background};
    --color-text: {text};
    --color-muted: {muted};
    --color-gold: {gold};
    --color-blush: {blush};
}}"#,
        background = colors.background,
        text = colors.text,
        muted = colors.muted,
        gold = colors.gold,
        blush = colors.blush,
    )
}
