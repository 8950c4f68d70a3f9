//! Presentation binding: one animated element on a page.
//!
//! A [`MotionComponent`] is what a page section, card or heading uses to
//! animate in. It pulls its descriptor from the registry at mount time
//! (already resolved for the session's capability), then shows the `hidden`
//! state until its [`VisibilityLatch`] fires and the `visible` state
//! afterwards.
//!
//! The capability can change mid-session (the visitor flips the OS
//! reduced-motion switch, or the site toggle). Hosts pass the current
//! capability to [`MotionComponent::refresh`] before delivering events, and
//! the component re-resolves its descriptor when it differs from the one it
//! was resolved for.
//!
//! ```text
//! mount ─► render() = hidden ─► handle_intersection() ─► render() = visible
//!                                  (latch flips once)       (every re-render)
//! ```

use crate::capability::CapabilityDescriptor;
use crate::motion::descriptor::{
    AnimationDescriptor, AnimationOverrides, HIDDEN, PropertyKind, PropertySet, Transition,
    VISIBLE,
};
use crate::motion::registry::{RegistryError, VariantRegistry};
use crate::visibility::{
    ElementHandle, IntersectionEvent, ObserverHost, RootMargin, VisibilityLatch,
};

/// What a component asks for at mount time.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProps {
    pub animation: String,
    pub overrides: AnimationOverrides,
    pub root_margin: RootMargin,
}

impl MotionProps {
    pub fn new(animation: impl Into<String>) -> Self {
        Self {
            animation: animation.into(),
            overrides: AnimationOverrides::default(),
            root_margin: RootMargin::default(),
        }
    }

    pub fn overrides(mut self, overrides: AnimationOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedState {
    /// `hidden` or `visible`.
    pub state: &'static str,
    pub properties: PropertySet,
    pub transition: Transition,
}

#[derive(Debug)]
pub struct MotionComponent {
    props: MotionProps,
    capability: CapabilityDescriptor,
    animation: AnimationDescriptor,
    latch: VisibilityLatch,
    transitions: u32,
}

impl MotionComponent {
    /// Resolve the animation and start watching for visibility.
    ///
    /// Unknown names follow the registry's lookup mode.
    pub fn mount(
        props: &MotionProps,
        registry: &VariantRegistry,
        capability: &CapabilityDescriptor,
        element: Option<ElementHandle>,
        host: &mut ObserverHost,
    ) -> Result<Self, RegistryError> {
        let animation = registry.lookup(&props.animation, capability, &props.overrides)?;
        let mut latch = VisibilityLatch::new(element, props.root_margin);
        latch.mount(host);
        tracing::debug!(animation = %animation.name, tier = %capability.intensity_tier, "mounted motion component");
        Ok(Self {
            props: props.clone(),
            capability: *capability,
            animation,
            latch,
            transitions: 0,
        })
    }

    /// Re-resolve the descriptor if `capability` differs from the one it
    /// was resolved for. Returns `true` when the descriptor changed.
    ///
    /// The latch is left alone: an entrance that already played stays
    /// played, it just renders its settled state from the new descriptor.
    pub fn refresh(
        &mut self,
        registry: &VariantRegistry,
        capability: &CapabilityDescriptor,
    ) -> Result<bool, RegistryError> {
        if *capability == self.capability {
            return Ok(false);
        }
        let animation = registry.lookup(&self.props.animation, capability, &self.props.overrides)?;
        tracing::debug!(
            animation = %animation.name,
            tier = %capability.intensity_tier,
            motion = capability.motion_enabled,
            "re-resolved motion component"
        );
        self.capability = *capability;
        let changed = animation != self.animation;
        self.animation = animation;
        Ok(changed)
    }

    /// Capability the current descriptor was resolved for.
    pub fn capability(&self) -> &CapabilityDescriptor {
        &self.capability
    }

    pub fn animation(&self) -> &AnimationDescriptor {
        &self.animation
    }

    pub fn latch(&self) -> &VisibilityLatch {
        &self.latch
    }

    pub fn is_visible(&self) -> bool {
        self.latch.is_triggered()
    }

    /// How many times the component has switched to `visible`. Never above 1.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// Attach the element once it has been rendered.
    pub fn bind(&mut self, element: ElementHandle, host: &mut ObserverHost) {
        self.latch.bind(element, host);
    }

    /// Feed an intersection event. Returns `true` when this event started
    /// the entrance.
    pub fn handle_intersection(&mut self, event: &IntersectionEvent, host: &mut ObserverHost) -> bool {
        let fired = self.latch.handle(event, host);
        if fired {
            self.transitions += 1;
        }
        fired
    }

    pub fn render(&self) -> RenderedState {
        let state = if self.is_visible() { VISIBLE } else { HIDDEN };
        RenderedState {
            state,
            properties: self.animation.state(state).cloned().unwrap_or_default(),
            transition: self.animation.transition.clone(),
        }
    }

    /// Interpolated properties `elapsed` seconds after the entrance began.
    ///
    /// Each property follows its own delay, duration and easing curve.
    /// Before the latch fires this is the `hidden` state.
    pub fn render_at(&self, elapsed: f64) -> PropertySet {
        let from = self.animation.hidden();
        if !self.is_visible() {
            return from.clone();
        }
        let to = self.animation.visible();
        let mut out = PropertySet::default();
        for kind in PropertyKind::ALL {
            let timing = self.animation.transition.timing(kind);
            let t = ((elapsed - timing.delay) / timing.duration).clamp(0.0, 1.0);
            let frame = from.lerp(to, timing.ease.evaluate(t));
            match kind {
                PropertyKind::Clip => out.clip = frame.clip,
                _ => {
                    if let Some(v) = frame.scalar(kind) {
                        out.set_scalar(kind, v);
                    }
                }
            }
        }
        out
    }

    /// Entrance delay for the `index`-th child of this component.
    pub fn child_delay(&self, index: usize) -> f64 {
        self.animation.child_delay(index)
    }

    /// Tear down; any live observation is detached before this returns.
    pub fn unmount(self, host: &mut ObserverHost) {
        self.latch.unmount(host);
    }
}
