//! Piecewise-linear scroll mappings.

use crate::motion::descriptor::{PropertyKind, PropertySet, lerp};
use crate::visibility::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("invalid scroll mapping: {0}")]
    InvalidMapping(String),
}

fn invalid(reason: impl Into<String>) -> MappingError {
    MappingError::InvalidMapping(reason.into())
}

/// Control points from scroll fraction to output value.
///
/// Validated on construction; [`map`](Self::map) never re-checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMapping", into = "RawMapping")]
pub struct ScrollMapping {
    input: Vec<f64>,
    output: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMapping {
    input: Vec<f64>,
    output: Vec<f64>,
}

impl TryFrom<RawMapping> for ScrollMapping {
    type Error = MappingError;

    fn try_from(raw: RawMapping) -> Result<Self, Self::Error> {
        ScrollMapping::new(raw.input, raw.output)
    }
}

impl From<ScrollMapping> for RawMapping {
    fn from(m: ScrollMapping) -> Self {
        RawMapping {
            input: m.input,
            output: m.output,
        }
    }
}

impl ScrollMapping {
    pub fn new(input: Vec<f64>, output: Vec<f64>) -> Result<Self, MappingError> {
        if input.len() != output.len() {
            return Err(invalid(format!(
                "{} input points but {} output values",
                input.len(),
                output.len()
            )));
        }
        if input.len() < 2 {
            return Err(invalid("at least two control points are required"));
        }
        if let Some(bad) = input.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(invalid(format!("input point {bad} is outside [0, 1]")));
        }
        if let Some(pair) = input.windows(2).find(|w| w[1] <= w[0]) {
            return Err(invalid(format!(
                "input range must be strictly increasing ({} then {})",
                pair[0], pair[1]
            )));
        }
        if output.iter().any(|v| !v.is_finite()) {
            return Err(invalid("output values must be finite"));
        }
        Ok(Self { input, output })
    }

    /// Two-point mapping over the whole scroll range.
    pub fn linear(from: f64, to: f64) -> Result<Self, MappingError> {
        Self::new(vec![0.0, 1.0], vec![from, to])
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Value at fraction 0 or below.
    pub fn first_value(&self) -> f64 {
        self.output[0]
    }

    /// Value at the last control point or beyond.
    pub fn final_value(&self) -> f64 {
        self.output[self.output.len() - 1]
    }

    /// Interpolate between the bracketing control points, clamping outside.
    pub fn map(&self, fraction: f64) -> f64 {
        let last = self.input.len() - 1;
        if !fraction.is_finite() || fraction <= self.input[0] {
            return self.output[0];
        }
        if fraction >= self.input[last] {
            return self.output[last];
        }
        let upper = self.input.partition_point(|&x| x <= fraction);
        let lower = upper - 1;
        let span = self.input[upper] - self.input[lower];
        let t = (fraction - self.input[lower]) / span;
        lerp(self.output[lower], self.output[upper], t)
    }
}

/// Free-function form of [`ScrollMapping::map`].
pub fn map_progress(fraction: f64, mapping: &ScrollMapping) -> f64 {
    mapping.map(fraction)
}

/// Independent mappings for several properties driven by one scroll region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<PropertyKind, ScrollMapping>", into = "BTreeMap<PropertyKind, ScrollMapping>")]
pub struct ScrollEffect {
    properties: BTreeMap<PropertyKind, ScrollMapping>,
}

impl TryFrom<BTreeMap<PropertyKind, ScrollMapping>> for ScrollEffect {
    type Error = MappingError;

    fn try_from(properties: BTreeMap<PropertyKind, ScrollMapping>) -> Result<Self, Self::Error> {
        ScrollEffect::new(properties)
    }
}

impl From<ScrollEffect> for BTreeMap<PropertyKind, ScrollMapping> {
    fn from(effect: ScrollEffect) -> Self {
        effect.properties
    }
}

impl ScrollEffect {
    pub fn new(properties: BTreeMap<PropertyKind, ScrollMapping>) -> Result<Self, MappingError> {
        if let Some(kind) = properties.keys().find(|k| !k.is_scalar()) {
            return Err(invalid(format!("'{kind}' cannot be scroll-mapped")));
        }
        if properties.is_empty() {
            return Err(invalid("a scroll effect needs at least one property"));
        }
        Ok(Self { properties })
    }

    pub fn with(mut self, kind: PropertyKind, mapping: ScrollMapping) -> Result<Self, MappingError> {
        if !kind.is_scalar() {
            return Err(invalid(format!("'{kind}' cannot be scroll-mapped")));
        }
        self.properties.insert(kind, mapping);
        Ok(self)
    }

    pub fn properties(&self) -> &BTreeMap<PropertyKind, ScrollMapping> {
        &self.properties
    }

    /// Every property mapped at `fraction`.
    pub fn sample(&self, fraction: f64) -> PropertySet {
        let mut out = PropertySet::default();
        for (&kind, mapping) in &self.properties {
            out.set_scalar(kind, mapping.map(fraction));
        }
        out
    }

    /// Resting values shown when motion is off.
    pub fn final_state(&self) -> PropertySet {
        let mut out = PropertySet::default();
        for (&kind, mapping) in &self.properties {
            out.set_scalar(kind, mapping.final_value());
        }
        out
    }
}

/// How far `region` has travelled through `viewport`.
///
/// 0 when the region's top edge meets the viewport's bottom edge, 1 when its
/// bottom edge leaves through the top.
pub fn progress_through(region: &Rect, viewport: &Rect) -> f64 {
    let travel = viewport.height + region.height;
    if travel <= 0.0 {
        return 0.0;
    }
    ((viewport.bottom() - region.y) / travel).clamp(0.0, 1.0)
}
