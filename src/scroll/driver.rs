//! Per-frame driver for scroll-linked effects.
//!
//! One driver serves the whole page. Components subscribe a [`ScrollTrack`]
//! for the region they follow and keep the returned [`SubscriptionId`];
//! every display frame the host calls [`FrameDriver::tick`], which pulls the
//! current progress of each region and returns the property values to
//! apply. Unsubscribing removes the track immediately, so no output is ever
//! produced for a component that has gone away.

use super::mapping::ScrollEffect;
use super::spring::SpringFilter;
use crate::capability::CapabilityDescriptor;
use crate::motion::descriptor::{PropertyKind, PropertySet, Smoothing};
use crate::visibility::ElementHandle;
use slotmap::{SlotMap, new_key_type};
use std::collections::BTreeMap;

/// A scroll effect plus the smoothing state it carries between frames.
#[derive(Debug, Clone)]
pub struct ScrollTrack {
    effect: ScrollEffect,
    springs: BTreeMap<PropertyKind, SpringFilter>,
}

impl ScrollTrack {
    /// Track without smoothing: output follows the mapping exactly.
    pub fn linear(effect: ScrollEffect) -> Self {
        Self {
            effect,
            springs: BTreeMap::new(),
        }
    }

    /// Track that spring-smooths the geometric properties of `effect`.
    pub fn smoothed(effect: ScrollEffect, stiffness: f64) -> Self {
        let springs = effect
            .properties()
            .keys()
            .filter(|k| k.smoothing() == Smoothing::Spring)
            .map(|&k| (k, SpringFilter::new(stiffness)))
            .collect();
        Self { effect, springs }
    }

    pub fn effect(&self) -> &ScrollEffect {
        &self.effect
    }

    pub fn is_smoothed(&self) -> bool {
        !self.springs.is_empty()
    }

    /// Output for this frame.
    ///
    /// With motion disabled the track is static: final values, no
    /// smoothing, and the springs forget their state so re-enabling motion
    /// does not replay a stale glide.
    pub fn sample(&mut self, fraction: f64, dt: f64, capability: &CapabilityDescriptor) -> PropertySet {
        if !capability.motion_enabled {
            self.springs.values_mut().for_each(SpringFilter::reset);
            return self.effect.final_state();
        }
        let mut out = self.effect.sample(fraction);
        for (&kind, spring) in self.springs.iter_mut() {
            if let Some(raw) = out.scalar(kind) {
                out.set_scalar(kind, spring.step(raw, dt));
            }
        }
        out
    }
}

new_key_type! {
    /// Handle of one scroll subscription.
    pub struct SubscriptionId;
}

#[derive(Debug)]
struct Subscription {
    region: ElementHandle,
    track: ScrollTrack,
}

/// Values produced for one live subscription in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub id: SubscriptionId,
    pub region: ElementHandle,
    pub state: PropertySet,
}

#[derive(Debug, Default)]
pub struct FrameDriver {
    subscriptions: SlotMap<SubscriptionId, Subscription>,
    frames: u64,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, region: ElementHandle, track: ScrollTrack) -> SubscriptionId {
        self.subscriptions.insert(Subscription { region, track })
    }

    /// Cancel a subscription. Returns `false` if it was already cancelled.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(id).is_some()
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(id)
    }

    pub fn active(&self) -> usize {
        self.subscriptions.len()
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one frame of `dt` seconds.
    ///
    /// `progress` reports each region's scroll fraction, or `None` if the
    /// region is not laid out this frame; those subscriptions are skipped.
    pub fn tick<F>(
        &mut self,
        dt: f64,
        capability: &CapabilityDescriptor,
        progress: F,
    ) -> Vec<FrameOutput>
    where
        F: Fn(ElementHandle) -> Option<f64>,
    {
        self.frames += 1;
        self.subscriptions
            .iter_mut()
            .filter_map(|(key, sub)| {
                let fraction = progress(sub.region)?;
                Some(FrameOutput {
                    id: key,
                    region: sub.region,
                    state: sub.track.sample(fraction, dt, capability),
                })
            })
            .collect()
    }
}
