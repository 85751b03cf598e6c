//! End-to-end runs of the effects driven through an `EffectHost`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use astral_effects::aurora::{RECYCLE_Y, REENTRY_Y};
use astral_effects::{
    AuroraSystem, EffectHost, LoaderSettings, LoaderState, Starfield, Viewport, mount_aurora,
    mount_countdown, mount_loader, mount_moon_phase, mount_starfield,
};
use chrono::{TimeDelta, TimeZone, Utc};

#[test]
fn test_every_aurora_particle_wraps_within_2000_steps() {
    let mut system = AuroraSystem::new(2024, 100);
    // Slowest particle rises 0.005 per frame; two frames per step carry it
    // 20 units, past the 15 bound from any start height.
    for step in 0..2000 {
        system.advance(2.0, step as f32 / 60.0);
        for p in system.particles() {
            assert!(p.position.y <= RECYCLE_Y);
        }
    }
    assert_eq!(system.len(), 100);
    for (i, p) in system.particles().iter().enumerate() {
        assert!(p.respawns >= 1, "particle {i} never wrapped");
        assert!(p.position.y >= REENTRY_Y);
    }
}

#[test]
fn test_loader_completes_once_at_60ms_ticks() {
    let host = EffectHost::new();
    let calls = Rc::new(Cell::new(0u32));
    let progress_seen = Rc::new(RefCell::new(Vec::new()));

    let c = calls.clone();
    let p = progress_seen.clone();
    let loader = mount_loader(
        &host,
        LoaderSettings::default(),
        Viewport::new(1280, 720),
        move || c.set(c.get() + 1),
        move |frame| p.borrow_mut().push(frame.progress),
    );

    for _ in 0..50 {
        host.tick(Duration::from_millis(60));
    }
    assert_eq!(host.elapsed(), Duration::from_millis(3000));
    assert_eq!(loader.state().progress(), 100);
    assert_eq!(
        loader.state().state(),
        LoaderState::Complete {
            reached_at: Duration::from_millis(3000)
        }
    );
    assert_eq!(calls.get(), 0);

    for _ in 0..100 {
        host.tick(Duration::from_millis(60));
    }
    assert_eq!(calls.get(), 1);

    let reached = Duration::from_millis(3000);
    let finished = loader.state().finished_at().expect("callback ran");
    assert!(finished - reached <= Duration::from_millis(1000));

    let seen = progress_seen.borrow();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|&p| p <= 100));

    drop(seen);
    drop(loader);
    assert_eq!(host.active_subscriptions(), 0);
}

#[test]
fn test_repeated_mount_cycles_do_not_leak() {
    let host = EffectHost::new();
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    for cycle in 0..25u64 {
        let stars = mount_starfield(&host, Starfield::new(cycle, 50), |_| {});
        let aurora = mount_aurora(&host, AuroraSystem::new(cycle, 50), |_| {});
        let loader = mount_loader(
            &host,
            LoaderSettings::default(),
            Viewport::new(1024, 768),
            || {},
            |_| {},
        );
        let moon = mount_moon_phase(&host, start, Duration::from_secs(3600), |_| {});
        let countdown = mount_countdown(&host, start + TimeDelta::days(7), start, |_| {});

        for _ in 0..10 {
            host.tick(Duration::from_millis(16));
        }
        assert!(host.active_subscriptions() >= 5);

        drop((stars, aurora, loader, moon, countdown));
        assert_eq!(host.active_subscriptions(), 0, "leak after cycle {cycle}");
    }
}

#[test]
fn test_narrow_viewport_skip_completes_without_frames() {
    let host = EffectHost::new();
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    let settings = LoaderSettings {
        skip_on_narrow_viewport: true,
        ..Default::default()
    };
    let loader = mount_loader(&host, settings, Viewport::new(390, 844), move || f.set(true), |_| {});
    assert!(fired.get());
    assert_eq!(loader.state().progress(), 100);
    assert_eq!(loader.subscription_count(), 1);
}
