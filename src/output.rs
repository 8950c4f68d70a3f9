//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with the thing the user asked about (an animation, a scroll
//! effect, a capability) and shows the numbers behind it as indented context
//! lines. File names only appear where files were actually written.
//!
//! # Output Format
//!
//! ## Animations
//!
//! ```text
//! Animations (12)
//! 001 cardLift
//!     States: hidden, hover, visible
//!     Timing: 0.4s cubic-bezier(0, 0, 0.58, 1)
//! 006 royalEntrance
//!     States: hidden, visible
//!     Timing: 0.96s cubic-bezier(0.22, 1, 0.36, 1) after 0.12s, spring 90/15
//!     Particles: petals x16
//! ```
//!
//! ## Sample
//!
//! ```text
//! heroParallax (smoothed, stiffness 170)
//! progress   opacity         y
//!     0.00     1.000     0.000
//!     0.50     1.000   -60.000
//!     1.00     0.200  -120.000
//! ```
//!
//! ## Build
//!
//! ```text
//! motion.3f9a2c1e.css (18.2 KB)
//! motion.b41d07aa.js (4.1 KB)
//! motion.0c6e58f2.json (31.7 KB)
//! index.html (6.0 KB)
//! Generated 4 files for 12 animations, 2 scroll effects in dist
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::capability::CapabilityDescriptor;
use crate::generate::{GenerateReport, state_declarations};
use crate::motion::descriptor::{AnimationDescriptor, PropertyKind, Transition};
use crate::motion::registry::{RegistryError, VariantRegistry};
use crate::scroll::mapping::ScrollEffect;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn seconds(v: f64) -> String {
    format!("{}s", (v * 1000.0).round() / 1000.0)
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

/// One-line timing summary.
///
/// ```text
/// 0.7s cubic-bezier(0.22, 1, 0.36, 1)
/// 1.2s cubic-bezier(0.22, 1, 0.36, 1) after 0.15s, spring 90/15
/// ```
fn timing_line(t: &Transition) -> String {
    let mut line = format!("{} {}", seconds(t.duration), t.ease.to_css());
    if t.delay > 0.0 {
        line.push_str(&format!(" after {}", seconds(t.delay)));
    }
    if let Some(spring) = &t.spring {
        line.push_str(&format!(", spring {}/{}", spring.stiffness, spring.damping));
    }
    line
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

// ============================================================================
// resolve
// ============================================================================

pub fn format_capability(cap: &CapabilityDescriptor) -> Vec<String> {
    vec![
        "Capability".to_string(),
        format!("{}Motion: {}", indent(1), on_off(cap.motion_enabled)),
        format!("{}Tier: {}", indent(1), cap.intensity_tier),
        format!("{}Particles: {}", indent(1), on_off(cap.particles_enabled)),
    ]
}

pub fn print_capability(cap: &CapabilityDescriptor) {
    for line in format_capability(cap) {
        println!("{}", line);
    }
}

// ============================================================================
// animations
// ============================================================================

fn animation_context(desc: &AnimationDescriptor, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let states: Vec<&str> = desc.states.keys().map(String::as_str).collect();
    let mut lines = vec![
        format!("{pad}States: {}", states.join(", ")),
        format!("{pad}Timing: {}", timing_line(&desc.transition)),
    ];
    for (kind, over) in &desc.transition.overrides {
        let timing = desc.transition.timing(*kind);
        let mut detail = format!("{pad}    {kind}: {}", seconds(timing.duration));
        if over.ease.is_some() {
            detail.push_str(&format!(" {}", timing.ease.to_css()));
        }
        lines.push(detail);
    }
    if let Some(stagger) = &desc.transition.stagger {
        lines.push(format!(
            "{pad}Stagger: {} each after {}",
            seconds(stagger.each),
            seconds(stagger.delay_children)
        ));
    }
    if let Some(overlay) = &desc.overlay {
        let kind = serde_json::to_value(overlay.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        lines.push(format!("{pad}Particles: {kind} x{}", overlay.count));
    }
    lines
}

/// List every registered animation as resolved for `cap`.
pub fn format_animation_list(
    registry: &VariantRegistry,
    cap: &CapabilityDescriptor,
) -> Result<Vec<String>, RegistryError> {
    let mut lines = vec![format!("Animations ({})", registry.len())];
    for (i, name) in registry.names().enumerate() {
        let desc = registry.get(name, cap)?;
        lines.push(format!("{} {}", format_index(i + 1), name));
        lines.extend(animation_context(&desc, 1));
    }
    Ok(lines)
}

pub fn print_animation_list(
    registry: &VariantRegistry,
    cap: &CapabilityDescriptor,
) -> Result<(), RegistryError> {
    for line in format_animation_list(registry, cap)? {
        println!("{}", line);
    }
    Ok(())
}

// ============================================================================
// show
// ============================================================================

/// Full detail of one resolved descriptor, states rendered as CSS.
pub fn format_descriptor(desc: &AnimationDescriptor, cap: &CapabilityDescriptor) -> Vec<String> {
    let mode = if cap.is_degraded() {
        "degraded".to_string()
    } else {
        format!("{} tier", cap.intensity_tier)
    };
    let mut lines = vec![format!("{} ({mode})", desc.name)];
    lines.extend(animation_context(desc, 1));
    for (state, props) in &desc.states {
        lines.push(format!("{}{state}", indent(1)));
        let decls = state_declarations(props);
        if decls.is_empty() {
            lines.push(format!("{}(natural)", indent(2)));
        }
        for decl in decls {
            lines.push(format!("{}{decl}", indent(2)));
        }
    }
    lines
}

pub fn print_descriptor(desc: &AnimationDescriptor, cap: &CapabilityDescriptor) {
    for line in format_descriptor(desc, cap) {
        println!("{}", line);
    }
}

// ============================================================================
// sample
// ============================================================================

/// Mapped values at `steps + 1` evenly spaced scroll fractions.
pub fn format_sample_table(name: &str, effect: &ScrollEffect, smoothing: Option<f64>, steps: usize) -> Vec<String> {
    let steps = steps.max(1);
    let kinds: Vec<PropertyKind> = effect.properties().keys().copied().collect();

    let title = match smoothing {
        Some(stiffness) => format!("{name} (smoothed, stiffness {stiffness})"),
        None => name.to_string(),
    };
    let mut header = format!("{:<8}", "progress");
    for kind in &kinds {
        header.push_str(&format!("{:>10}", kind.as_str()));
    }
    let mut lines = vec![title, header];

    for i in 0..=steps {
        let fraction = i as f64 / steps as f64;
        let sample = effect.sample(fraction);
        let mut row = format!("{:>8.2}", fraction);
        for kind in &kinds {
            let value = sample.scalar(*kind).unwrap_or_default();
            row.push_str(&format!("{:>10.3}", value));
        }
        lines.push(row);
    }
    lines
}

pub fn print_sample_table(name: &str, effect: &ScrollEffect, smoothing: Option<f64>, steps: usize) {
    for line in format_sample_table(name, effect, smoothing, steps) {
        println!("{}", line);
    }
}

// ============================================================================
// build / check
// ============================================================================

pub fn format_generate_report(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .files
        .iter()
        .map(|f| format!("{} ({})", f.name, format_bytes(f.bytes)))
        .collect();
    for stale in &report.pruned {
        lines.push(format!("Removed {stale}"));
    }
    lines.push(format!(
        "Generated {} files for {} animations, {} scroll effects in {}",
        report.files.len(),
        report.animations,
        report.scroll_effects,
        report.output_dir.display()
    ));
    lines
}

pub fn print_generate_report(report: &GenerateReport) {
    for line in format_generate_report(report) {
        println!("{}", line);
    }
}

pub fn format_check_summary(registry: &VariantRegistry, custom: usize, scroll_effects: usize) -> Vec<String> {
    vec![
        "Config OK".to_string(),
        format!(
            "{}Animations: {} ({} built-in, {} custom)",
            indent(1),
            registry.len(),
            registry.len() - custom,
            custom
        ),
        format!("{}Scroll effects: {}", indent(1), scroll_effects),
        format!("{}Lookup: {:?}", indent(1), registry.mode()),
    ]
}

pub fn print_check_summary(registry: &VariantRegistry, custom: usize, scroll_effects: usize) {
    for line in format_check_summary(registry, custom, scroll_effects) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
