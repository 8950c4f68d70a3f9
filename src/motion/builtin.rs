//! The site's built-in animation set.
//!
//! These are the only names presentation components may use without
//! registering their own. Each is defined at the high tier; lower tiers are
//! derived in [`AnimationDescriptor::for_tier`].

use super::descriptor::{
    AnimationDescriptor, ClipInset, CubicBezier, ParticleKind, ParticleOverlay, PropertyKind,
    PropertySet, PropertyTransition, SpringParams, Stagger, Transition,
};

pub const FADE_IN: &str = "fadeIn";
pub const FADE_IN_UP: &str = "fadeInUp";
pub const SLIDE_IN_LEFT: &str = "slideInLeft";
pub const SLIDE_IN_RIGHT: &str = "slideInRight";
pub const SCALE_IN: &str = "scaleIn";
pub const ROYAL_ENTRANCE: &str = "royalEntrance";
pub const HERO_REVEAL: &str = "heroReveal";
pub const GOLD_SHIMMER: &str = "goldShimmer";
pub const FLOATING_PETALS: &str = "floatingPetals";
pub const STAGGER_CONTAINER: &str = "staggerContainer";
pub const STAGGER_ITEM: &str = "staggerItem";
pub const CARD_LIFT: &str = "cardLift";

pub const NAMES: [&str; 12] = [
    FADE_IN,
    FADE_IN_UP,
    SLIDE_IN_LEFT,
    SLIDE_IN_RIGHT,
    SCALE_IN,
    ROYAL_ENTRANCE,
    HERO_REVEAL,
    GOLD_SHIMMER,
    FLOATING_PETALS,
    STAGGER_CONTAINER,
    STAGGER_ITEM,
    CARD_LIFT,
];

fn opacity(value: f64) -> PropertySet {
    PropertySet {
        opacity: Some(value),
        ..Default::default()
    }
}

fn shown() -> PropertySet {
    opacity(1.0)
}

fn slide(name: &str, x: f64, y: f64, duration: f64) -> AnimationDescriptor {
    AnimationDescriptor::new(
        name,
        PropertySet {
            opacity: Some(0.0),
            x: (x != 0.0).then_some(x),
            y: (y != 0.0).then_some(y),
            ..Default::default()
        },
        PropertySet {
            opacity: Some(1.0),
            x: (x != 0.0).then_some(0.0),
            y: (y != 0.0).then_some(0.0),
            ..Default::default()
        },
        Transition::tween(duration, CubicBezier::SILK),
    )
}

/// All built-in descriptors, in [`NAMES`] order.
pub fn all() -> Vec<AnimationDescriptor> {
    vec![
        AnimationDescriptor::new(
            FADE_IN,
            opacity(0.0),
            shown(),
            Transition::tween(0.6, CubicBezier::EASE_OUT),
        ),
        slide(FADE_IN_UP, 0.0, 40.0, 0.7),
        slide(SLIDE_IN_LEFT, -60.0, 0.0, 0.7),
        slide(SLIDE_IN_RIGHT, 60.0, 0.0, 0.7),
        AnimationDescriptor::new(
            SCALE_IN,
            PropertySet {
                opacity: Some(0.0),
                scale: Some(0.85),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(1.0),
                scale: Some(1.0),
                ..Default::default()
            },
            Transition {
                duration: 0.6,
                spring: Some(SpringParams::new(260.0, 24.0)),
                ..Default::default()
            },
        ),
        royal_entrance(),
        AnimationDescriptor::new(
            HERO_REVEAL,
            PropertySet {
                opacity: Some(0.0),
                scale: Some(1.08),
                clip: Some(ClipInset {
                    bottom: 100.0,
                    ..ClipInset::NONE
                }),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(1.0),
                scale: Some(1.0),
                clip: Some(ClipInset::NONE),
                ..Default::default()
            },
            Transition::tween(1.4, CubicBezier::SILK),
        ),
        AnimationDescriptor::new(
            GOLD_SHIMMER,
            PropertySet {
                opacity: Some(0.0),
                blur: Some(8.0),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(1.0),
                blur: Some(0.0),
                ..Default::default()
            },
            Transition::tween(1.1, CubicBezier::EASE_IN_OUT),
        )
        .with_overlay(ParticleOverlay {
            kind: ParticleKind::Sparkles,
            count: 18,
        }),
        AnimationDescriptor::new(
            FLOATING_PETALS,
            PropertySet {
                opacity: Some(0.0),
                y: Some(-30.0),
                rotate: Some(-12.0),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(0.9),
                y: Some(0.0),
                rotate: Some(0.0),
                ..Default::default()
            },
            Transition::tween(2.4, CubicBezier::EASE_IN_OUT),
        )
        .with_overlay(ParticleOverlay {
            kind: ParticleKind::Petals,
            count: 24,
        }),
        AnimationDescriptor::new(
            STAGGER_CONTAINER,
            opacity(0.0),
            shown(),
            Transition {
                duration: 0.3,
                stagger: Some(Stagger {
                    each: 0.12,
                    delay_children: 0.2,
                }),
                ..Default::default()
            },
        ),
        slide(STAGGER_ITEM, 0.0, 24.0, 0.5),
        AnimationDescriptor::new(
            CARD_LIFT,
            PropertySet {
                opacity: Some(0.0),
                y: Some(24.0),
                ..Default::default()
            },
            PropertySet {
                opacity: Some(1.0),
                y: Some(0.0),
                scale: Some(1.0),
                ..Default::default()
            },
            Transition::tween(0.5, CubicBezier::EASE_OUT),
        )
        .with_state(
            "hover",
            PropertySet {
                y: Some(-8.0),
                scale: Some(1.02),
                ..Default::default()
            },
        ),
    ]
}

/// The signature entrance: rise, settle and sharpen, with a petal trail.
fn royal_entrance() -> AnimationDescriptor {
    let mut transition = Transition::tween(1.2, CubicBezier::SILK);
    transition.delay = 0.15;
    transition.spring = Some(SpringParams::new(90.0, 15.0));
    transition.overrides.insert(
        PropertyKind::Opacity,
        PropertyTransition {
            duration: Some(0.8),
            ease: Some(CubicBezier::EASE_OUT),
            ..Default::default()
        },
    );
    transition.overrides.insert(
        PropertyKind::Blur,
        PropertyTransition {
            duration: Some(0.9),
            ..Default::default()
        },
    );

    AnimationDescriptor::new(
        ROYAL_ENTRANCE,
        PropertySet {
            opacity: Some(0.0),
            y: Some(60.0),
            scale: Some(0.92),
            rotate: Some(-2.0),
            blur: Some(10.0),
            ..Default::default()
        },
        PropertySet {
            opacity: Some(1.0),
            y: Some(0.0),
            scale: Some(1.0),
            rotate: Some(0.0),
            blur: Some(0.0),
            ..Default::default()
        },
        transition,
    )
    .with_overlay(ParticleOverlay {
        kind: ParticleKind::Petals,
        count: 32,
    })
}
