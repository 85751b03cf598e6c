//! Binding generators to an [`EffectHost`].
//!
//! Each `mount_*` function registers the callbacks an effect needs and
//! returns a [`Mounted`] handle that owns both the effect state and its
//! subscriptions. Dropping the handle is the unmount: every timer and frame
//! callback goes with it.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::aurora::{AuroraFrame, AuroraSystem};
use crate::countdown::{Countdown, CountdownTimer};
use crate::host::{EffectHost, FrameTime, Subscription};
use crate::loader::{LoaderFrame, LoaderSettings, OrbitalLoader};
use crate::moon_phase::{MoonPhaseSample, MoonPhaseTracker};
use crate::starfield::{Starfield, StarfieldFrame};
use crate::viewport::Viewport;

/// A mounted effect: its state plus the subscriptions driving it.
pub struct Mounted<T> {
    state: Rc<RefCell<T>>,
    subscriptions: Vec<Subscription>,
}

impl<T> Mounted<T> {
    /// Borrow the effect state.
    ///
    /// Panics if called from inside one of this effect's own callbacks.
    pub fn state(&self) -> Ref<'_, T> {
        self.state.borrow()
    }

    /// Number of host registrations this mount holds.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Tear down explicitly. Equivalent to dropping.
    pub fn unmount(self) {}
}

/// Time since mount for a callback's frame time.
fn since(mounted_at: Duration, time: FrameTime) -> Duration {
    time.elapsed.saturating_sub(mounted_at)
}

/// Drive a starfield from host frames; `sink` receives each frame.
pub fn mount_starfield(
    host: &EffectHost,
    starfield: Starfield,
    mut sink: impl FnMut(&StarfieldFrame) + 'static,
) -> Mounted<Starfield> {
    let state = Rc::new(RefCell::new(starfield));
    let mounted_at = host.elapsed();
    let field = state.clone();
    let sub = host.on_frame(move |time| {
        let frame = field
            .borrow()
            .advance(since(mounted_at, time).as_secs_f32());
        sink(&frame);
    });
    Mounted {
        state,
        subscriptions: vec![sub],
    }
}

/// Drive an aurora system from host frames; `sink` receives each frame.
pub fn mount_aurora(
    host: &EffectHost,
    aurora: AuroraSystem,
    mut sink: impl FnMut(&AuroraFrame) + 'static,
) -> Mounted<AuroraSystem> {
    let state = Rc::new(RefCell::new(aurora));
    let mounted_at = host.elapsed();
    let system = state.clone();
    let sub = host.on_frame(move |time| {
        let frame = system.borrow_mut().advance(
            time.delta_frames(),
            since(mounted_at, time).as_secs_f32(),
        );
        sink(&frame);
    });
    Mounted {
        state,
        subscriptions: vec![sub],
    }
}

/// Start the orbital loader and drive it from host frames.
///
/// `on_complete` runs once, from inside a host tick, after the loader's state
/// has been released, so it may read the returned handle.
pub fn mount_loader(
    host: &EffectHost,
    settings: LoaderSettings,
    viewport: Viewport,
    on_complete: impl FnOnce() + 'static,
    mut sink: impl FnMut(&LoaderFrame) + 'static,
) -> Mounted<OrbitalLoader> {
    let state = Rc::new(RefCell::new(OrbitalLoader::start_for_viewport(
        settings,
        viewport,
        on_complete,
    )));
    let mounted_at = host.elapsed();
    let mut subscriptions = Vec::with_capacity(2);

    // Fire completion on its exact due time rather than the next frame.
    let due = state.borrow().completion_due();
    if let Some(due) = due {
        let loader = state.clone();
        subscriptions.push(host.set_timeout(due, move |time| {
            let done = loader
                .borrow_mut()
                .take_due_completion(since(mounted_at, time));
            if let Some(on_complete) = done {
                on_complete();
            }
        }));
    }

    let loader = state.clone();
    subscriptions.push(host.on_frame(move |time| {
        let (frame, done) = {
            let mut loader = loader.borrow_mut();
            let done = loader.take_due_completion(since(mounted_at, time));
            (loader.frame(), done)
        };
        if let Some(on_complete) = done {
            on_complete();
        }
        sink(&frame);
    }));
    Mounted {
        state,
        subscriptions,
    }
}

/// Keep a moon phase tracker fresh. Wall-clock time is `started_at` plus host
/// time since mount. The host checks every `refresh` and the tracker decides
/// whether its sample is stale; `sink` receives each recomputed sample.
pub fn mount_moon_phase(
    host: &EffectHost,
    started_at: DateTime<Utc>,
    refresh: Duration,
    mut sink: impl FnMut(&MoonPhaseSample) + 'static,
) -> Mounted<MoonPhaseTracker> {
    let refresh_delta = TimeDelta::from_std(refresh).unwrap_or(MoonPhaseTracker::DEFAULT_REFRESH);
    let state = Rc::new(RefCell::new(MoonPhaseTracker::new(started_at, refresh_delta)));
    let mounted_at = host.elapsed();
    let tracker = state.clone();
    let sub = host.set_interval(refresh, move |time| {
        let now = wall_clock(started_at, since(mounted_at, time));
        let refreshed = tracker.borrow_mut().refresh_if_due(now);
        if let Some(sample) = refreshed {
            sink(&sample);
        }
    });
    Mounted {
        state,
        subscriptions: vec![sub],
    }
}

/// Tick an event countdown once per second; `sink` receives changed values.
pub fn mount_countdown(
    host: &EffectHost,
    target: DateTime<Utc>,
    started_at: DateTime<Utc>,
    mut sink: impl FnMut(&Countdown) + 'static,
) -> Mounted<CountdownTimer> {
    let state = Rc::new(RefCell::new(CountdownTimer::new(target, started_at)));
    let mounted_at = host.elapsed();
    let timer = state.clone();
    let sub = host.set_interval(CountdownTimer::REFRESH, move |time| {
        let now = wall_clock(started_at, since(mounted_at, time));
        let changed = timer.borrow_mut().tick(now);
        if changed {
            let current = timer.borrow().current();
            sink(&current);
        }
    });
    Mounted {
        state,
        subscriptions: vec![sub],
    }
}

fn wall_clock(started_at: DateTime<Utc>, since_mount: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(since_mount)
        .ok()
        .and_then(|delta| started_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use chrono::TimeZone;

    use crate::moon_phase::{PhaseName, compute_phase, reference_new_moon};

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_mount_and_unmount_leaves_no_subscriptions() {
        let host = EffectHost::new();
        for _ in 0..10 {
            let stars = mount_starfield(&host, Starfield::new(1, 20), |_| {});
            let aurora = mount_aurora(&host, AuroraSystem::new(2, 20), |_| {});
            let moon = mount_moon_phase(
                &host,
                reference_new_moon(),
                Duration::from_secs(3600),
                |_| {},
            );
            assert_eq!(host.active_subscriptions(), 3);
            host.tick(FRAME);
            drop(stars);
            aurora.unmount();
            drop(moon);
        }
        assert_eq!(host.active_subscriptions(), 0);
    }

    #[test]
    fn test_starfield_time_is_relative_to_mount() {
        let host = EffectHost::new();
        host.tick(Duration::from_millis(200));
        let frames = Rc::new(RefCell::new(Vec::new()));
        let f = frames.clone();
        let mounted = mount_starfield(&host, Starfield::new(3, 5), move |frame| {
            f.borrow_mut().push(frame.clone())
        });
        host.tick(Duration::from_millis(100));
        let expected = mounted.state().advance(0.1);
        assert_eq!(frames.borrow()[0], expected);
    }

    #[test]
    fn test_aurora_moves_one_velocity_per_60hz_frame() {
        let host = EffectHost::new();
        let mounted = mount_aurora(&host, AuroraSystem::new(4, 10), |_| {});
        let before = mounted.state().particles().to_vec();
        host.tick(Duration::from_secs_f64(1.0 / 60.0));
        for (a, b) in before.iter().zip(mounted.state().particles()) {
            assert!((b.position - (a.position + a.velocity)).length() < 1e-4);
        }
    }

    #[test]
    fn test_unmounted_loader_never_completes() {
        let host = EffectHost::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let loader = mount_loader(
            &host,
            LoaderSettings::default(),
            Viewport::new(1280, 720),
            move || f.set(true),
            |_| {},
        );
        for _ in 0..175 {
            host.tick(Duration::from_millis(20));
        }
        assert_eq!(loader.state().progress(), 100);
        assert!(!loader.state().is_finished());
        drop(loader);
        for _ in 0..100 {
            host.tick(Duration::from_millis(20));
        }
        assert!(!fired.get());
        assert_eq!(host.active_subscriptions(), 0);
    }

    #[test]
    fn test_completion_callback_can_read_mounted_loader() {
        let host = EffectHost::new();
        let slot: Rc<RefCell<Option<Mounted<OrbitalLoader>>>> = Rc::new(RefCell::new(None));
        let seen = Rc::new(Cell::new(None));

        let s = slot.clone();
        let seen_in_cb = seen.clone();
        let mounted = mount_loader(
            &host,
            LoaderSettings::default(),
            Viewport::new(1280, 720),
            move || {
                if let Some(loader) = s.borrow().as_ref() {
                    let state = loader.state();
                    seen_in_cb.set(Some((state.progress(), state.is_finished())));
                }
            },
            |_| {},
        );
        *slot.borrow_mut() = Some(mounted);

        for _ in 0..100 {
            host.tick(Duration::from_millis(60));
        }
        assert_eq!(seen.get(), Some((100, true)));

        slot.borrow_mut().take();
        assert_eq!(host.active_subscriptions(), 0);
    }

    #[test]
    fn test_moon_phase_refreshes_on_interval() {
        let host = EffectHost::new();
        let samples = Rc::new(RefCell::new(Vec::new()));
        let s = samples.clone();
        let start = reference_new_moon();
        let _moon = mount_moon_phase(&host, start, Duration::from_millis(100), move |sample| {
            s.borrow_mut().push(*sample)
        });
        host.tick(Duration::from_millis(250));
        assert_eq!(samples.borrow().len(), 2);
        assert!(samples.borrow().iter().all(|s| s.name == PhaseName::NewMoon));
    }

    #[test]
    fn test_moon_tracker_sample_follows_host_clock() {
        let host = EffectHost::new();
        let start = reference_new_moon();
        let refreshes = Rc::new(Cell::new(0u32));
        let r = refreshes.clone();
        let moon = mount_moon_phase(&host, start, Duration::from_secs(1), move |_| {
            r.set(r.get() + 1)
        });
        for _ in 0..9 {
            host.tick(Duration::from_millis(250));
        }
        assert_eq!(refreshes.get(), 2);
        let expected_at = start + TimeDelta::seconds(2);
        assert_eq!(moon.state().computed_at(), expected_at);
        assert_eq!(moon.state().sample(), compute_phase(expected_at));
    }

    #[test]
    fn test_countdown_reports_changes_only() {
        let host = EffectHost::new();
        let start = Utc.with_ymd_and_hms(2025, 8, 12, 20, 58, 30).unwrap();
        let target = Utc.with_ymd_and_hms(2025, 8, 12, 21, 0, 0).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let mounted = mount_countdown(&host, target, start, move |c| s.borrow_mut().push(*c));
        assert_eq!(mounted.state().current().parts(), (0, 0, 1));
        for _ in 0..400 {
            host.tick(Duration::from_millis(250));
        }
        assert_eq!(
            *seen.borrow(),
            vec![
                Countdown::Remaining {
                    days: 0,
                    hours: 0,
                    minutes: 0
                },
                Countdown::Reached
            ]
        );
        assert_eq!(mounted.subscription_count(), 1);
    }
}
