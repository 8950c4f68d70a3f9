//! Motion asset generation.
//!
//! Turns the registry and the site config into the static files the site
//! loads. Everything the browser needs to reproduce the registry's behavior
//! is precomputed here, per tier, so the client runtime only has to pick a
//! tier and flip attributes.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Preview page, one specimen per animation
//! ├── motion.3f9a2c1e.css        # Tiered animation rules + palette
//! ├── motion.b41d07aa.js         # Runtime: tier, entrance latches, scroll driver
//! └── motion.0c6e58f2.json       # Resolved descriptors per tier + scroll effects
//! ```
//!
//! Asset names carry the first 8 hex digits of their SHA-256, so a changed
//! animation busts caches without any manual versioning. Fingerprinted files
//! left over from earlier builds are removed.
//!
//! ## CSS Layout
//!
//! Elements carry `data-motion="<name>"`; the runtime sets
//! `data-motion-tier` on `<html>` and `data-visible` on each element once.
//!
//! | Selector scope | Descriptor |
//! |----------------|------------|
//! | none | medium tier (the default when no probe ran) |
//! | `[data-motion-tier="high"]` | high tier |
//! | `[data-motion-tier="low"]` | degraded |
//! | `@media (prefers-reduced-motion: reduce)` | degraded, emitted last so it wins |
//!
//! ## Static Assets
//!
//! Embedded at compile time:
//! - `static/motion.css`: base rules and preview page styles (palette injected from config)
//! - `static/motion.js`: the client runtime

use crate::capability::{self, CapabilityDescriptor, IntensityTier, UserPreference};
use crate::config::{self, ScrollEffectConfig, SiteConfig};
use crate::motion::descriptor::{
    AnimationDescriptor, HIDDEN, PropertyKind, PropertySet, VISIBLE,
};
use crate::motion::registry::{RegistryError, VariantRegistry};
use crate::visibility::RootMargin;
use maud::{DOCTYPE, Markup, html};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

const CSS_STATIC: &str = include_str!("../static/motion.css");
const JS: &str = include_str!("../static/motion.js");

/// Children of a staggered container that get an explicit delay rule.
const STAGGER_CHILDREN: usize = 12;

/// Hex digits of the content hash kept in asset names.
const FINGERPRINT_LEN: usize = 8;

/// One file written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    pub name: String,
    pub bytes: usize,
}

/// Summary of a [`generate`] run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub files: Vec<GeneratedFile>,
    pub animations: usize,
    pub scroll_effects: usize,
    /// Stale fingerprinted assets that were deleted.
    pub pruned: Vec<String>,
}

/// Client-side manifest written to `motion.json`.
#[derive(Debug, Serialize)]
pub struct MotionManifest<'a> {
    pub site: &'a str,
    pub root_margin: RootMargin,
    /// Tier name → animation name → resolved descriptor.
    pub tiers: BTreeMap<&'static str, BTreeMap<String, AnimationDescriptor>>,
    pub scroll: &'a BTreeMap<String, ScrollEffectConfig>,
}

pub fn generate(
    config: &SiteConfig,
    registry: &VariantRegistry,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;

    let css = format!(
        "{}\n\n{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC,
        render_motion_css(registry)?
    );
    let manifest = serde_json::to_string_pretty(&build_manifest(config, registry)?)?;

    let css_name = fingerprinted_name("motion", "css", css.as_bytes());
    let js_name = fingerprinted_name("motion", "js", JS.as_bytes());
    let json_name = fingerprinted_name("motion", "json", manifest.as_bytes());

    let assets = PageAssets {
        css: asset_url(&config.site.base_url, &css_name),
        js: asset_url(&config.site.base_url, &js_name),
        manifest: asset_url(&config.site.base_url, &json_name),
    };
    let index = render_preview(config, registry, &assets).into_string();

    let mut files = Vec::new();
    for (name, contents) in [
        (css_name, css.as_str()),
        (js_name, JS),
        (json_name, manifest.as_str()),
        ("index.html".to_string(), index.as_str()),
    ] {
        fs::write(output_dir.join(&name), contents)?;
        tracing::info!(file = %name, bytes = contents.len(), "generated");
        files.push(GeneratedFile {
            name,
            bytes: contents.len(),
        });
    }

    let pruned = prune_stale(output_dir, &files)?;

    Ok(GenerateReport {
        output_dir: output_dir.to_path_buf(),
        files,
        animations: registry.len(),
        scroll_effects: config.scroll.len(),
        pruned,
    })
}

// ============================================================================
// Fingerprinting
// ============================================================================

/// First [`FINGERPRINT_LEN`] hex digits of the SHA-256 of `bytes`.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..FINGERPRINT_LEN].to_string()
}

/// `motion.3f9a2c1e.css` style name for an asset.
pub fn fingerprinted_name(stem: &str, ext: &str, bytes: &[u8]) -> String {
    format!("{stem}.{}.{ext}", fingerprint(bytes))
}

fn is_fingerprinted_asset(name: &str) -> bool {
    let mut parts = name.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("motion"), Some(hash), Some("css" | "js" | "json"), None) => {
            hash.len() == FINGERPRINT_LEN && hash.chars().all(|c| c.is_ascii_hexdigit())
        }
        _ => false,
    }
}

fn prune_stale(output_dir: &Path, keep: &[GeneratedFile]) -> Result<Vec<String>, GenerateError> {
    let mut pruned = Vec::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_fingerprinted_asset(&name) && !keep.iter().any(|f| f.name == name) {
            fs::remove_file(entry.path())?;
            tracing::debug!(file = %name, "removed stale asset");
            pruned.push(name);
        }
    }
    pruned.sort();
    Ok(pruned)
}

fn asset_url(base_url: &str, name: &str) -> String {
    if base_url.ends_with('/') {
        format!("{base_url}{name}")
    } else {
        format!("{base_url}/{name}")
    }
}

// ============================================================================
// Manifest
// ============================================================================

pub fn build_manifest<'a>(
    config: &'a SiteConfig,
    registry: &VariantRegistry,
) -> Result<MotionManifest<'a>, GenerateError> {
    let mut tiers = BTreeMap::new();
    for tier in IntensityTier::ALL {
        let resolved = registry
            .names()
            .map(|name| Ok((name.to_string(), registry.get_for_tier(name, tier)?)))
            .collect::<Result<BTreeMap<_, _>, RegistryError>>()?;
        tiers.insert(tier.as_str(), resolved);
    }
    Ok(MotionManifest {
        site: &config.site.name,
        root_margin: config.motion.root_margin,
        tiers,
        scroll: &config.scroll,
    })
}

// ============================================================================
// CSS
// ============================================================================

/// Round to 4 decimals so scaled timings print as `0.56`, not `0.5599999999999999`.
fn num(v: f64) -> String {
    let rounded = (v * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn css_property(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::Opacity => "opacity",
        PropertyKind::X | PropertyKind::Y | PropertyKind::Scale | PropertyKind::Rotate => {
            "transform"
        }
        PropertyKind::Blur => "filter",
        PropertyKind::Clip => "clip-path",
    }
}

fn transform_css(props: &PropertySet) -> Option<String> {
    let mut parts = Vec::new();
    if props.x.is_some() || props.y.is_some() {
        parts.push(format!(
            "translate({}px, {}px)",
            num(props.x.unwrap_or(0.0)),
            num(props.y.unwrap_or(0.0))
        ));
    }
    if let Some(scale) = props.scale {
        parts.push(format!("scale({})", num(scale)));
    }
    if let Some(rotate) = props.rotate {
        parts.push(format!("rotate({}deg)", num(rotate)));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// CSS declarations for a property set.
pub fn state_declarations(props: &PropertySet) -> Vec<String> {
    let mut decls = Vec::new();
    if let Some(opacity) = props.opacity {
        decls.push(format!("opacity: {}", num(opacity)));
    }
    if let Some(transform) = transform_css(props) {
        decls.push(format!("transform: {transform}"));
    }
    if let Some(blur) = props.blur {
        decls.push(format!("filter: blur({}px)", num(blur)));
    }
    if let Some(clip) = &props.clip {
        decls.push(format!(
            "clip-path: inset({}% {}% {}% {}%)",
            num(clip.top),
            num(clip.right),
            num(clip.bottom),
            num(clip.left)
        ));
    }
    decls
}

/// `transition` shorthand covering every CSS property the animation moves.
///
/// Transform components share one CSS property; the first of them present
/// decides its timing.
fn transition_css(desc: &AnimationDescriptor) -> Option<String> {
    let mut kinds = desc.hidden().kinds();
    kinds.extend(desc.visible().kinds());
    let mut seen = Vec::new();
    let mut parts = Vec::new();
    for kind in PropertyKind::ALL.into_iter().filter(|k| kinds.contains(k)) {
        let property = css_property(kind);
        if seen.contains(&property) {
            continue;
        }
        seen.push(property);
        let timing = desc.transition.timing(kind);
        parts.push(format!(
            "{property} {}s {} {}s",
            num(timing.duration),
            timing.ease.to_css(),
            num(timing.delay)
        ));
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

fn rule(selector: &str, decls: &[String]) -> String {
    let body: String = decls.iter().map(|d| format!("    {d};\n")).collect();
    format!("{selector} {{\n{body}}}\n")
}

/// Rules for one resolved descriptor, with every selector prefixed by `scope`.
pub fn render_animation_css(desc: &AnimationDescriptor, scope: &str) -> String {
    let base = format!("{scope}[data-motion=\"{}\"]", desc.name);
    // Fill one-sided properties with their natural value so both ends
    // declare the same CSS properties.
    let hidden = desc.visible().lerp(desc.hidden(), 1.0);
    let visible = desc.hidden().lerp(desc.visible(), 1.0);

    let mut hidden_decls = state_declarations(&hidden);
    if let Some(transition) = transition_css(desc) {
        hidden_decls.push(format!("transition: {transition}"));
    }
    let mut css = rule(&base, &hidden_decls);
    css.push_str(&rule(
        &format!("{base}[data-visible]"),
        &state_declarations(&visible),
    ));

    for (state, props) in desc
        .states
        .iter()
        .filter(|(name, _)| *name != HIDDEN && *name != VISIBLE)
    {
        let selector = if state == "hover" {
            format!("{base}[data-visible]:hover")
        } else {
            format!("{base}[data-motion-state=\"{state}\"]")
        };
        css.push_str(&rule(&selector, &state_declarations(&visible.merged(props))));
    }

    if desc.transition.stagger.is_some() {
        css.push_str(&stagger_css(&base, |i| desc.child_delay(i)));
    }
    css
}

/// Per-child `transition-delay` rules under a staggering container.
fn stagger_css(container: &str, delay: impl Fn(usize) -> f64) -> String {
    (0..STAGGER_CHILDREN)
        .map(|i| {
            rule(
                &format!("{container} > [data-motion]:nth-child({})", i + 1),
                &[format!("transition-delay: {}s", num(delay(i)))],
            )
        })
        .collect()
}

/// Zero delays for children of containers that stagger at a richer tier.
///
/// The unscoped medium rules would otherwise still apply under a degraded
/// scope; the scoped selectors here are more specific.
fn stagger_reset_css(registry: &VariantRegistry, scope: &str) -> Result<String, GenerateError> {
    let mut css = String::new();
    for name in registry.names() {
        if registry.base(name)?.transition.stagger.is_some() {
            let container = format!("{scope}[data-motion=\"{name}\"]");
            css.push_str(&stagger_css(&container, |_| 0.0));
        }
    }
    Ok(css)
}

/// The tiered animation stylesheet.
pub fn render_motion_css(registry: &VariantRegistry) -> Result<String, GenerateError> {
    let mut css = String::from("/* Medium tier (default) */\n");
    for name in registry.names() {
        css.push_str(&render_animation_css(
            &registry.get_for_tier(name, IntensityTier::Medium)?,
            "",
        ));
    }
    for (tier, label) in [(IntensityTier::High, "High"), (IntensityTier::Low, "Low")] {
        css.push_str(&format!("\n/* {label} tier */\n"));
        let scope = format!("[data-motion-tier=\"{tier}\"] ");
        for name in registry.names() {
            css.push_str(&render_animation_css(
                &registry.get_for_tier(name, tier)?,
                &scope,
            ));
        }
        if tier == IntensityTier::Low {
            css.push_str(&stagger_reset_css(registry, &scope)?);
        }
    }
    css.push_str("\n@media (prefers-reduced-motion: reduce) {\n");
    let motionless = CapabilityDescriptor::motionless();
    for name in registry.names() {
        css.push_str(&render_animation_css(&registry.get(name, &motionless)?, ":root "));
    }
    css.push_str(&stagger_reset_css(registry, ":root ")?);
    css.push_str("}\n");
    Ok(css)
}

// ============================================================================
// Preview page
// ============================================================================

struct PageAssets {
    css: String,
    js: String,
    manifest: String,
}

/// Tier forced by the config's preview signals, if any are set.
fn preview_tier(config: &SiteConfig) -> Option<&'static str> {
    let motion = &config.motion;
    let configured = motion.reduced_motion.is_some()
        || motion.probe.is_some()
        || motion.preference == UserPreference::Off;
    if !configured {
        return None;
    }
    let cap = capability::resolve(&motion.signals());
    Some(if cap.motion_enabled {
        cap.intensity_tier.as_str()
    } else {
        "off"
    })
}

fn base_document(title: &str, preview: Option<&str>, assets: &PageAssets, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" data-motion-preview=[preview] {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href=(assets.css);
            }
            body {
                (content)
            }
        }
    }
}

fn render_specimen(desc: &AnimationDescriptor) -> Markup {
    let t = &desc.transition;
    html! {
        article.specimen data-motion=(desc.name) {
            h2 { (desc.name) }
            dl {
                dt { "duration" } dd { (num(t.duration)) "s" }
                dt { "ease" } dd { code { (t.ease.to_css()) } }
                @if t.delay > 0.0 {
                    dt { "delay" } dd { (num(t.delay)) "s" }
                }
                @if let Some(spring) = &t.spring {
                    dt { "spring" } dd { (num(spring.stiffness)) " / " (num(spring.damping)) }
                }
                @if let Some(overlay) = &desc.overlay {
                    dt { "particles" } dd { (overlay.count) }
                }
            }
            @if t.stagger.is_some() {
                @for i in 0..4 {
                    p data-motion="staggerItem" { "Item " (i + 1) }
                }
            }
        }
    }
}

fn render_preview(config: &SiteConfig, registry: &VariantRegistry, assets: &PageAssets) -> Markup {
    // Specimens show the default (medium) form; the stylesheet swaps tiers.
    let specimens: Vec<AnimationDescriptor> = registry
        .names()
        .filter_map(|name| registry.get_for_tier(name, IntensityTier::Medium).ok())
        .collect();
    let content = html! {
        header.preview-header data-motion="fadeIn" {
            h1 { (config.site.name) }
            p { (config.site.tagline) }
        }
        main {
            section.specimens {
                @for desc in &specimens {
                    (render_specimen(desc))
                }
            }
            @for name in config.scroll.keys() {
                section.scroll-stage {
                    div data-scroll=(name) { (name) }
                }
            }
        }
        script src=(assets.js)
            data-manifest=(assets.manifest)
            data-root-margin=(config.motion.root_margin.to_string())
            defer {}
    };
    base_document(&config.site.name, preview_tier(config), assets, content)
}
