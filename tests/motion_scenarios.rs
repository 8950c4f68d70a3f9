//! End-to-end scenarios through the public API: capability resolution,
//! registry lookup, component entrances, scroll-driven frames, and a full
//! asset build into a scratch directory.

use aisle::capability::{
    CapabilityDescriptor, EnvironmentSignals, IntensityTier, PerformanceProbe, PreferenceChange,
    PreferenceStore, resolve,
};
use aisle::component::{MotionComponent, MotionProps};
use aisle::config::{self, SiteConfig};
use aisle::generate;
use aisle::motion::builtin::{self, FLOATING_PETALS, GOLD_SHIMMER, ROYAL_ENTRANCE};
use aisle::motion::descriptor::{MIN_DURATION, PropertyKind};
use aisle::motion::{RegistryError, VariantRegistry};
use aisle::scroll::FrameDriver;
use aisle::visibility::{ElementHandle, ObserverHost, Rect};
use std::fs;

const VIEWPORT: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 1280.0,
    height: 800.0,
};

const FRAME: f64 = 1.0 / 60.0;

fn in_view(_: ElementHandle) -> Option<Rect> {
    Some(Rect::new(0.0, 300.0, 600.0, 200.0))
}

fn below_fold(_: ElementHandle) -> Option<Rect> {
    Some(Rect::new(0.0, 2400.0, 600.0, 200.0))
}

fn deliver(
    component: &mut MotionComponent,
    host: &mut ObserverHost,
    bounds: fn(ElementHandle) -> Option<Rect>,
) -> bool {
    let events = host.check(&VIEWPORT, bounds);
    events
        .iter()
        .fold(false, |fired, e| component.handle_intersection(e, host) || fired)
}

// =============================================================================
// Entrances
// =============================================================================

#[test]
fn royal_entrance_plays_once_on_a_capable_device() {
    let signals = EnvironmentSignals {
        probe: Some(PerformanceProbe {
            gpu_renderer: Some("NVIDIA GeForce RTX 4070".to_string()),
            logical_cores: Some(16),
            ..Default::default()
        }),
        ..Default::default()
    };
    let cap = resolve(&signals);
    assert_eq!(cap, CapabilityDescriptor::with_tier(IntensityTier::High));

    let registry = VariantRegistry::builtin();
    let mut host = ObserverHost::new();
    let mut component = MotionComponent::mount(
        &MotionProps::new(ROYAL_ENTRANCE),
        &registry,
        &cap,
        Some(ElementHandle::new(7)),
        &mut host,
    )
    .unwrap();
    assert!(component.animation().overlay.is_some());

    assert!(!deliver(&mut component, &mut host, below_fold));
    assert_eq!(component.render().state, "hidden");

    assert!(deliver(&mut component, &mut host, in_view));
    for _ in 0..1000 {
        assert!(!deliver(&mut component, &mut host, in_view));
        deliver(&mut component, &mut host, below_fold);
    }
    assert_eq!(component.transition_count(), 1);
    assert_eq!(component.render().state, "visible");
    assert_eq!(host.active(), 0);

    let base = registry.base(ROYAL_ENTRANCE).unwrap();
    let settled = component.render_at(base.transition.total_time() + 1.0);
    for kind in PropertyKind::ALL.into_iter().filter(|k| k.is_scalar()) {
        match (settled.scalar(kind), base.visible().scalar(kind)) {
            (Some(got), Some(want)) => assert!((got - want).abs() < 1e-9, "{kind:?}"),
            (got, want) => assert_eq!(got, want, "{kind:?}"),
        }
    }
}

#[test]
fn reduced_motion_degrades_every_builtin() {
    let cap = resolve(&EnvironmentSignals {
        reduced_motion: Some(true),
        ..Default::default()
    });
    assert!(!cap.motion_enabled);
    assert!(!cap.particles_enabled);

    let registry = VariantRegistry::builtin();
    for name in builtin::NAMES {
        let desc = registry.get(name, &cap).unwrap();
        assert_eq!(desc.transition.duration, MIN_DURATION, "{name}");
        assert_eq!(desc.transition.delay, 0.0, "{name}");
        assert!(desc.transition.spring.is_none(), "{name}");
        assert!(desc.overlay.is_none(), "{name}");
        assert!(desc.visible().opacity.unwrap() > 0.0, "{name}");
        for state in desc.states.values() {
            assert!(state.rotate.is_none() && state.blur.is_none(), "{name}");
        }
    }
}

#[test]
fn medium_tier_keeps_overlays_with_fewer_particles() {
    let registry = VariantRegistry::builtin();
    let medium = CapabilityDescriptor::with_tier(IntensityTier::Medium);
    for name in [GOLD_SHIMMER, FLOATING_PETALS] {
        let base = registry.base(name).unwrap().overlay.unwrap();
        let scaled = registry.get(name, &medium).unwrap().overlay.unwrap();
        assert_eq!(scaled.kind, base.kind);
        assert!(scaled.count < base.count, "{name}");
    }
}

#[test]
fn preference_change_reaches_mounted_components() {
    let registry = VariantRegistry::builtin();
    let mut store = PreferenceStore::new(EnvironmentSignals::default());
    let mut host = ObserverHost::new();

    let mut unplayed = MotionComponent::mount(
        &MotionProps::new(ROYAL_ENTRANCE),
        &registry,
        &store.current(),
        Some(ElementHandle::new(1)),
        &mut host,
    )
    .unwrap();
    assert!(unplayed.animation().transition.duration > MIN_DURATION);
    assert!(unplayed.animation().overlay.is_some());

    assert!(store.apply(PreferenceChange::ReducedMotion(Some(true))));
    assert_eq!(store.generation(), 1);
    assert!(unplayed.refresh(&registry, &store.current()).unwrap());

    assert!(deliver(&mut unplayed, &mut host, in_view));
    let rendered = unplayed.render();
    assert_eq!(rendered.transition.duration, MIN_DURATION);
    assert!(rendered.transition.spring.is_none());
    assert!(rendered.properties.blur.is_none());
    assert!(unplayed.animation().overlay.is_none());
}

// =============================================================================
// Scroll
// =============================================================================

#[test]
fn default_scroll_effects_drive_frames() {
    let site = SiteConfig::default();
    let cap = CapabilityDescriptor::with_tier(IntensityTier::High);
    let hero = ElementHandle::new(1);
    let drift = ElementHandle::new(2);
    let offscreen = ElementHandle::new(3);

    let mut driver = FrameDriver::new();
    driver.subscribe(hero, site.scroll_effect("heroParallax").unwrap().track().unwrap());
    driver.subscribe(drift, site.scroll_effect("galleryDrift").unwrap().track().unwrap());
    driver.subscribe(offscreen, site.scroll_effect("galleryDrift").unwrap().track().unwrap());

    let halfway = |el: ElementHandle| (el != offscreen).then_some(0.5);
    let frame = driver.tick(FRAME, &cap, halfway);
    assert_eq!(frame.len(), 2);
    let hero_state = &frame.iter().find(|f| f.region == hero).unwrap().state;
    assert!((hero_state.y.unwrap() + 60.0).abs() < 1e-9);
    assert_eq!(hero_state.opacity, Some(1.0));
    let drift_state = &frame.iter().find(|f| f.region == drift).unwrap().state;
    assert!(drift_state.x.unwrap().abs() < 1e-9);

    // Jump to the end: opacity follows at once, the offset glides.
    let frame = driver.tick(FRAME, &cap, |el| (el == hero).then_some(1.0));
    let hero_state = &frame[0].state;
    assert!((hero_state.opacity.unwrap() - 0.2).abs() < 1e-9);
    let y = hero_state.y.unwrap();
    assert!(y < -60.0 && y > -120.0, "y = {y}");

    let mut last = y;
    for _ in 0..600 {
        last = driver.tick(FRAME, &cap, |el| (el == hero).then_some(1.0))[0]
            .state
            .scalar(PropertyKind::Y)
            .unwrap();
    }
    assert!((last + 120.0).abs() < 1e-3, "settled at {last}");
}

#[test]
fn motionless_scroll_holds_final_values() {
    let site = SiteConfig::default();
    let region = ElementHandle::new(1);
    let mut driver = FrameDriver::new();
    let id = driver.subscribe(region, site.scroll_effect("heroParallax").unwrap().track().unwrap());

    let off = CapabilityDescriptor::motionless();
    for fraction in [0.0, 0.25, 0.75, 0.1] {
        let frame = driver.tick(FRAME, &off, |_| Some(fraction));
        assert_eq!(frame[0].state.y, Some(-120.0));
        assert_eq!(frame[0].state.opacity, Some(0.2));
    }

    assert!(driver.unsubscribe(id));
    assert!(driver.tick(FRAME, &off, |_| Some(0.5)).is_empty());
}

// =============================================================================
// Config and build
// =============================================================================

const SITE_TOML: &str = r#"
[site]
name = "Rosewood & Rye"

[motion]
strict_lookup = true

[[motion.animations]]
name = "ribbonUnfurl"

[motion.animations.states.hidden]
opacity = 0.0
x = -80.0

[motion.animations.states.visible]
opacity = 1.0
x = 0.0
"#;

#[test]
fn build_writes_fingerprinted_assets_and_prunes_stale_ones() {
    let source = tempfile::TempDir::new().unwrap();
    let dist = tempfile::TempDir::new().unwrap();
    fs::write(source.path().join("config.toml"), SITE_TOML).unwrap();

    let site = config::load_config(source.path()).unwrap();
    let registry = site.registry().unwrap();
    assert!(registry.contains("ribbonUnfurl"));

    let first = generate::generate(&site, &registry, dist.path()).unwrap();
    assert_eq!(first.files.len(), 4);
    assert_eq!(first.animations, builtin::NAMES.len() + 1);
    assert!(first.pruned.is_empty());
    for file in &first.files {
        assert!(dist.path().join(&file.name).exists(), "{}", file.name);
    }

    let css_name = &first.files.iter().find(|f| f.name.ends_with(".css")).unwrap().name;
    let css = fs::read_to_string(dist.path().join(css_name)).unwrap();
    assert!(css.contains("ribbonUnfurl"));
    let index = fs::read_to_string(dist.path().join("index.html")).unwrap();
    assert!(index.contains("Rosewood &amp; Rye"));
    assert!(index.contains(css_name.as_str()));

    // Same input, same names, nothing pruned.
    let again = generate::generate(&site, &registry, dist.path()).unwrap();
    assert_eq!(again.files, first.files);
    assert!(again.pruned.is_empty());

    // A palette change renames the stylesheet and removes the old one.
    let mut recolored = site.clone();
    recolored.colors.gold = "#b8860b".to_string();
    let third = generate::generate(&recolored, &registry, dist.path()).unwrap();
    assert_eq!(third.pruned, vec![css_name.clone()]);
    assert!(!dist.path().join(css_name).exists());
}

#[test]
fn strict_config_rejects_unknown_animation_names() {
    let source = tempfile::TempDir::new().unwrap();
    fs::write(source.path().join("config.toml"), SITE_TOML).unwrap();
    let site = config::load_config(source.path()).unwrap();
    let registry = site.registry().unwrap();

    let mut host = ObserverHost::new();
    let err = MotionComponent::mount(
        &MotionProps::new("confettiBurst"),
        &registry,
        &CapabilityDescriptor::default(),
        None,
        &mut host,
    )
    .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(name) if name == "confettiBurst"));
    assert_eq!(host.active(), 0);
}

#[test]
fn stock_config_round_trips_through_loader() {
    let source = tempfile::TempDir::new().unwrap();
    fs::write(source.path().join("config.toml"), config::stock_config_toml()).unwrap();
    let site = config::load_config(source.path()).unwrap();
    assert_eq!(site, SiteConfig::default());
}
