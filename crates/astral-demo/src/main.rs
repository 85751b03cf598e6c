//! Headless demo that mounts every Astral effect on a virtual frame host and
//! logs what a renderer would draw.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p astral-demo -- --frames 600 --width 375 --skip-narrow true`.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use astral_config::{CliArgs, Config, default_config_dir};
use astral_effects::{
    AuroraSystem, Countdown, EffectHost, LoaderSettings, SECTIONS, Starfield, Subscription,
    Viewport, active_section, hero_parallax, mount_aurora, mount_countdown, mount_loader,
    mount_moon_phase, mount_starfield, pack_instances,
};
use chrono::{TimeDelta, Utc};
use clap::Parser;
use tracing::{info, warn};

fn loader_settings(config: &Config) -> LoaderSettings {
    LoaderSettings {
        tick_interval: Duration::from_millis(config.loader.tick_ms),
        step: config.loader.step,
        completion_delay: Duration::from_millis(config.loader.completion_delay_ms),
        skip_on_narrow_viewport: config.loader.skip_on_narrow_viewport,
        narrow_viewport_px: config.loader.narrow_viewport_px,
    }
}

/// How often the demo checks `config.ron` for edits, in host time.
const CONFIG_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll `config.ron` on the host clock. `on_change` receives each edited
/// config once; parse failures are logged and the last good config is kept.
fn watch_config(
    host: &EffectHost,
    config_dir: PathBuf,
    on_disk: Config,
    period: Duration,
    mut on_change: impl FnMut(&Config) + 'static,
) -> Subscription {
    let mut current = on_disk;
    host.set_interval(period, move |_| match current.reload(&config_dir) {
        Ok(Some(edited)) => {
            on_change(&edited);
            current = edited;
        }
        Ok(None) => {}
        Err(e) => warn!("Config reload failed: {e}"),
    })
}

fn run(config: &Config, config_dir: &Path, on_disk: Config) {
    let host = EffectHost::new();
    let _config_watch = watch_config(
        &host,
        config_dir.to_path_buf(),
        on_disk,
        CONFIG_POLL_INTERVAL,
        |edited| {
            info!(
                log_level = %edited.debug.log_level,
                stars = edited.starfield.count,
                particles = edited.aurora.count,
                "config.ron changed; restart the demo to apply"
            )
        },
    );
    let viewport = Viewport::new(config.viewport.width, config.viewport.height);
    let started_at = Utc::now();

    let loaded = Rc::new(Cell::new(false));
    let loaded_flag = loaded.clone();
    let progress_log = Rc::new(Cell::new(u32::MAX));
    let loader = mount_loader(
        &host,
        loader_settings(config),
        viewport,
        move || loaded_flag.set(true),
        move |frame| {
            // Log at every 10% step.
            if frame.progress / 10 != progress_log.get() / 10 {
                info!("{}", frame.status_line());
                progress_log.set(frame.progress);
            }
        },
    );

    let star_bytes = Rc::new(Cell::new(0usize));
    let sb = star_bytes.clone();
    let starfield = Starfield::new(config.starfield.seed, config.starfield.count)
        .with_rotation_speeds(
            config.starfield.rotation_speed_y,
            config.starfield.rotation_speed_z,
        );
    let stars = mount_starfield(&host, starfield, move |frame| {
        sb.set(std::mem::size_of_val(pack_instances(&frame.instances, 1.0).as_slice()));
    });

    let recycled = Rc::new(Cell::new(0usize));
    let rc = recycled.clone();
    let aurora = mount_aurora(
        &host,
        AuroraSystem::new(config.aurora.seed, config.aurora.count),
        move |frame| rc.set(rc.get() + frame.recycled),
    );

    let moon = mount_moon_phase(
        &host,
        started_at,
        Duration::from_secs(config.moon.refresh_seconds.max(1)),
        |sample| info!(phase = %sample.name, fraction = sample.fraction, "moon phase refreshed"),
    );

    let countdown_log = Rc::new(RefCell::new(None));
    let cl = countdown_log.clone();
    let next_event = started_at + TimeDelta::days(3) + TimeDelta::hours(4);
    let countdown = mount_countdown(&host, next_event, started_at, move |c| {
        *cl.borrow_mut() = Some(*c)
    });

    let frame_time = Duration::from_millis(config.debug.demo_frame_ms.max(1));
    for _ in 0..config.debug.demo_frames {
        host.tick(frame_time);
    }

    let sample = moon.state().sample();
    info!(
        phase = %sample.name,
        illumination = sample.illumination(),
        "moon at start"
    );
    let remaining = countdown_log.borrow().unwrap_or_else(|| countdown.state().current());
    match remaining {
        Countdown::Remaining {
            days,
            hours,
            minutes,
        } => info!("next event in {days}d {hours}h {minutes}m"),
        Countdown::Reached => info!("next event has started"),
    }

    // One viewport-tall band per section.
    let section_offsets: Vec<f32> = (0..SECTIONS.len())
        .map(|i| i as f32 * config.viewport.height as f32)
        .collect();
    let scrolled = viewport.scrolled_to(config.viewport.height as f32 * 0.5);
    let parallax = hero_parallax(0.5);
    info!(
        offset_y = parallax.offset_y,
        opacity = parallax.opacity,
        nav_scrolled = scrolled.nav_scrolled(),
        section = active_section(&section_offsets, scrolled.scroll_y)
            .map_or(SECTIONS[0], |i| SECTIONS[i]),
        "hero at half scroll"
    );
    info!(
        stars = stars.state().len(),
        instance_bytes = star_bytes.get(),
        aurora = aurora.state().len(),
        recycled = recycled.get(),
        elapsed_ms = host.elapsed().as_millis() as u64,
        "effects simulated"
    );

    if loaded.get() {
        info!("loading screen dismissed");
    } else {
        warn!(
            progress = loader.state().progress(),
            "loading screen still visible; simulate more frames"
        );
    }

    drop((loader, stars, aurora, moon, countdown));
    info!(leaked = host.active_subscriptions(), "effects unmounted");
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from(".astral"));

    let on_disk = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    astral_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(config_dir = %config_dir.display(), "starting astral effects demo");
    run(&config, &config_dir, on_disk);
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: Duration = Duration::from_millis(100);

    fn watched(dir: &Path) -> (EffectHost, Subscription, Rc<RefCell<Vec<u32>>>) {
        let config = Config::default();
        config.save(dir).unwrap();
        let host = EffectHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let watch = watch_config(&host, dir.to_path_buf(), config, POLL, move |c| {
            s.borrow_mut().push(c.starfield.count)
        });
        (host, watch, seen)
    }

    #[test]
    fn test_config_watch_reports_each_edit_once() {
        let dir = tempfile::tempdir().unwrap();
        let (host, _watch, seen) = watched(dir.path());
        host.tick(POLL);
        assert!(seen.borrow().is_empty(), "unchanged file reported as edited");

        let mut edited = Config::default();
        edited.starfield.count = 50;
        edited.save(dir.path()).unwrap();
        for _ in 0..3 {
            host.tick(POLL);
        }
        assert_eq!(*seen.borrow(), vec![50]);
    }

    #[test]
    fn test_config_watch_keeps_polling_after_bad_edit() {
        let dir = tempfile::tempdir().unwrap();
        let (host, _watch, seen) = watched(dir.path());
        std::fs::write(dir.path().join("config.ron"), "(starfield: (count: -5))").unwrap();
        host.tick(POLL);
        assert!(seen.borrow().is_empty());

        let mut edited = Config::default();
        edited.starfield.count = 7;
        edited.save(dir.path()).unwrap();
        host.tick(POLL);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_dropping_watch_stops_polling() {
        let dir = tempfile::tempdir().unwrap();
        let (host, watch, seen) = watched(dir.path());
        drop(watch);
        let mut edited = Config::default();
        edited.starfield.count = 9;
        edited.save(dir.path()).unwrap();
        host.tick(POLL);
        assert!(seen.borrow().is_empty());
        assert_eq!(host.active_subscriptions(), 0);
    }

    #[test]
    fn test_loader_settings_from_config() {
        let mut config = Config::default();
        config.loader.tick_ms = 30;
        config.loader.skip_on_narrow_viewport = true;
        let settings = loader_settings(&config);
        assert_eq!(settings.tick_interval, Duration::from_millis(30));
        assert_eq!(settings.completion_delay, Duration::from_millis(1000));
        assert!(settings.skip_on_narrow_viewport);
    }
}
