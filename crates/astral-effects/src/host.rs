//! Host frame surface: virtual clock, per-frame subscribers and interval
//! timers for a single rendering thread.
//!
//! Every registration returns a [`Subscription`] guard. Dropping the guard
//! unregisters the callback, so a timer can never outlive the surface that
//! mounted it. Callbacks are never invoked or dropped while the registry is
//! borrowed, which lets them subscribe and cancel freely.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::warn;

/// Longest frame the host will simulate in one tick. Longer gaps (a
/// backgrounded tab, a debugger pause) are clamped rather than replayed.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(250);

/// Reference frame rate that particle velocities are expressed against.
pub const REFERENCE_FPS: f32 = 60.0;

/// Shortest allowed interval period.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Timing passed to every callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTime {
    /// Virtual time since the host started. For timers, the time they fell due.
    pub elapsed: Duration,
    /// Length of the frame being dispatched (after clamping).
    pub delta: Duration,
    /// Frame counter, starting at 1 for the first tick.
    pub frame: u64,
}

impl FrameTime {
    /// Elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Frame length in reference frames (1.0 at 60 Hz).
    pub fn delta_frames(&self) -> f32 {
        self.delta.as_secs_f32() * REFERENCE_FPS
    }
}

type Callback = Box<dyn FnMut(FrameTime)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Schedule {
    EveryFrame,
    Interval { period: Duration, next_due: Duration },
    Timeout { due: Duration },
}

impl Schedule {
    fn due(&self) -> Option<Duration> {
        match *self {
            Schedule::EveryFrame => None,
            Schedule::Interval { next_due, .. } => Some(next_due),
            Schedule::Timeout { due } => Some(due),
        }
    }
}

struct Entry {
    schedule: Schedule,
    // `None` while the callback is running.
    callback: Option<Callback>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    elapsed: Duration,
    frame: u64,
    entries: BTreeMap<u64, Entry>,
}

/// Single-threaded frame host.
#[derive(Default)]
pub struct EffectHost {
    registry: Rc<RefCell<Registry>>,
}

/// Registration guard. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription immediately unregisters its callback"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl EffectHost {
    /// Create a host at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since the host started.
    pub fn elapsed(&self) -> Duration {
        self.registry.borrow().elapsed
    }

    /// Number of ticks run so far.
    pub fn frame_count(&self) -> u64 {
        self.registry.borrow().frame
    }

    /// Live registrations. Zero once every mounted effect is torn down.
    pub fn active_subscriptions(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Call `callback` once per tick.
    pub fn on_frame(&self, callback: impl FnMut(FrameTime) + 'static) -> Subscription {
        self.register(Schedule::EveryFrame, Box::new(callback))
    }

    /// Call `callback` every `period`, first at `now + period`.
    pub fn set_interval(
        &self,
        period: Duration,
        callback: impl FnMut(FrameTime) + 'static,
    ) -> Subscription {
        let period = period.max(MIN_INTERVAL);
        let next_due = self.elapsed() + period;
        self.register(Schedule::Interval { period, next_due }, Box::new(callback))
    }

    /// Call `callback` once at `now + delay`.
    pub fn set_timeout(
        &self,
        delay: Duration,
        callback: impl FnOnce(FrameTime) + 'static,
    ) -> Subscription {
        let due = self.elapsed() + delay;
        let mut once = Some(callback);
        self.register(
            Schedule::Timeout { due },
            Box::new(move |time| {
                if let Some(callback) = once.take() {
                    callback(time);
                }
            }),
        )
    }

    fn register(&self, schedule: Schedule, callback: Callback) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.insert(
            id,
            Entry {
                schedule,
                callback: Some(callback),
            },
        );
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Advance virtual time by `frame_time` and dispatch: first every timer
    /// that fell due (in due order, intervals catching up tick by tick),
    /// then every frame subscriber once.
    pub fn tick(&self, frame_time: Duration) -> FrameTime {
        let delta = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time.as_secs_f64() * 1000.0,
                MAX_FRAME_TIME.as_secs_f64() * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        let now = {
            let mut registry = self.registry.borrow_mut();
            registry.elapsed += delta;
            registry.frame += 1;
            FrameTime {
                elapsed: registry.elapsed,
                delta,
                frame: registry.frame,
            }
        };

        while let Some((id, due)) = self.next_due_timer(now.elapsed) {
            self.dispatch_timer(id, due, now);
        }

        let frame_ids: Vec<u64> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|(_, e)| e.schedule == Schedule::EveryFrame)
            .map(|(&id, _)| id)
            .collect();
        for id in frame_ids {
            self.run_callback(id, now);
        }

        now
    }

    fn next_due_timer(&self, now: Duration) -> Option<(u64, Duration)> {
        self.registry
            .borrow()
            .entries
            .iter()
            .filter(|(_, e)| e.callback.is_some())
            .filter_map(|(&id, e)| e.schedule.due().map(|due| (id, due)))
            .filter(|&(_, due)| due <= now)
            .min_by_key(|&(id, due)| (due, id))
    }

    fn dispatch_timer(&self, id: u64, due: Duration, now: FrameTime) {
        let is_timeout = {
            let mut registry = self.registry.borrow_mut();
            let Some(entry) = registry.entries.get_mut(&id) else {
                return;
            };
            match &mut entry.schedule {
                Schedule::Interval { period, next_due } => {
                    *next_due += *period;
                    false
                }
                Schedule::Timeout { .. } => true,
                Schedule::EveryFrame => return,
            }
        };

        let time = FrameTime {
            elapsed: due,
            ..now
        };

        if is_timeout {
            let removed = self.registry.borrow_mut().entries.remove(&id);
            if let Some(mut callback) = removed.and_then(|e| e.callback) {
                callback(time);
            }
        } else {
            self.run_callback(id, time);
        }
    }

    fn run_callback(&self, id: u64, time: FrameTime) {
        let taken = self
            .registry
            .borrow_mut()
            .entries
            .get_mut(&id)
            .and_then(|e| e.callback.take());
        let Some(mut callback) = taken else {
            return;
        };

        callback(time);

        // Cancelled while running: drop the callback outside the borrow.
        let leftover = {
            let mut registry = self.registry.borrow_mut();
            match registry.entries.get_mut(&id) {
                Some(entry) => {
                    entry.callback = Some(callback);
                    None
                }
                None => Some(callback),
            }
        };
        drop(leftover);
    }
}

impl fmt::Debug for EffectHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.borrow();
        f.debug_struct("EffectHost")
            .field("elapsed", &registry.elapsed)
            .field("frame", &registry.frame)
            .field("subscriptions", &registry.entries.len())
            .finish()
    }
}

impl Subscription {
    /// Unregister now. Equivalent to dropping the guard.
    pub fn cancel(self) {}

    /// Returns `true` while the host still holds the callback. Timeouts go
    /// inactive once fired.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().entries.contains_key(&self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry.borrow_mut().entries.remove(&self.id);
            drop(removed);
        }
    }
}
