//! Orbital loading animation: a progress counter that ticks to 100% while
//! six decorative bodies circle a central sun.
//!
//! The loader is driven by absolute elapsed time since it started. Progress
//! is the number of whole ticks that fit into that time, and every orbit
//! angle is recomputed from it, so nothing drifts however the host slices
//! its frames.

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use tracing::{debug, info};

use crate::viewport::{NARROW_VIEWPORT_PX, Viewport};

/// Interval between progress ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(60);
/// Progress added per tick, in percent.
pub const PROGRESS_STEP: u32 = 2;
/// Delay between reaching 100% and invoking the completion callback.
pub const COMPLETION_DELAY: Duration = Duration::from_millis(1000);
/// Seconds for a body with speed 1.0 to complete one orbit.
pub const ORBIT_PERIOD_SCALE: f32 = 30.0;

/// A decorative body on a circular orbit around the loader's centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitBody {
    /// Display name.
    pub name: &'static str,
    /// Diameter in logical pixels.
    pub size: f32,
    /// sRGB color.
    pub color: [u8; 3],
    /// Orbit radius in logical pixels.
    pub orbit_radius: f32,
    /// Relative orbital speed; one revolution takes `30 / speed` seconds.
    pub speed: f32,
    /// Angle at t = 0, in radians.
    pub phase_offset: f32,
    /// Self-rotation period in seconds.
    pub spin_period: f32,
    /// Drawn with a ring.
    pub has_rings: bool,
}

/// The six loader bodies, innermost first.
pub const ORBIT_BODIES: [OrbitBody; 6] = [
    OrbitBody {
        name: "mercury",
        size: 8.0,
        color: [0xFF, 0xA5, 0x00],
        orbit_radius: 120.0,
        speed: 4.0,
        phase_offset: 0.0,
        spin_period: 10.0,
        has_rings: false,
    },
    OrbitBody {
        name: "venus",
        size: 12.0,
        color: [0xFF, 0xC6, 0x49],
        orbit_radius: 160.0,
        speed: 3.2,
        phase_offset: 0.0,
        spin_period: 12.0,
        has_rings: false,
    },
    OrbitBody {
        name: "earth",
        size: 14.0,
        color: [0x6B, 0x93, 0xD6],
        orbit_radius: 200.0,
        speed: 2.8,
        phase_offset: 0.0,
        spin_period: 14.0,
        has_rings: false,
    },
    OrbitBody {
        name: "mars",
        size: 10.0,
        color: [0xCD, 0x5C, 0x5C],
        orbit_radius: 240.0,
        speed: 2.4,
        phase_offset: 0.0,
        spin_period: 16.0,
        has_rings: false,
    },
    OrbitBody {
        name: "jupiter",
        size: 28.0,
        color: [0xD2, 0x69, 0x1E],
        orbit_radius: 320.0,
        speed: 1.8,
        phase_offset: 0.0,
        spin_period: 18.0,
        has_rings: false,
    },
    OrbitBody {
        name: "saturn",
        size: 24.0,
        color: [0xFA, 0xD5, 0xA5],
        orbit_radius: 380.0,
        speed: 1.4,
        phase_offset: 0.0,
        spin_period: 20.0,
        has_rings: true,
    },
];

impl OrbitBody {
    /// Angular velocity in radians per second.
    pub fn angular_velocity(&self) -> f32 {
        self.speed * std::f32::consts::TAU / ORBIT_PERIOD_SCALE
    }

    /// Orbit angle at `elapsed` seconds, wrapped to [0, 2π).
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        (self.phase_offset + elapsed * self.angular_velocity()).rem_euclid(std::f32::consts::TAU)
    }

    /// Offset from the orbit centre at `elapsed` seconds.
    pub fn position_at(&self, elapsed: f32) -> Vec2 {
        Vec2::from_angle(self.angle_at(elapsed)) * self.orbit_radius
    }

    /// Self-rotation angle at `elapsed` seconds, wrapped to [0, 2π).
    pub fn spin_at(&self, elapsed: f32) -> f32 {
        (elapsed / self.spin_period * std::f32::consts::TAU).rem_euclid(std::f32::consts::TAU)
    }
}

/// Loader timing and policy.
#[derive(Clone, Debug, PartialEq)]
pub struct LoaderSettings {
    /// Interval between progress ticks.
    pub tick_interval: Duration,
    /// Progress added per tick, in percent.
    pub step: u32,
    /// Delay between reaching 100% and the completion callback.
    pub completion_delay: Duration,
    /// Skip the animation on narrow viewports.
    pub skip_on_narrow_viewport: bool,
    /// Width below which a viewport is narrow.
    pub narrow_viewport_px: u32,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            step: PROGRESS_STEP,
            completion_delay: COMPLETION_DELAY,
            skip_on_narrow_viewport: false,
            narrow_viewport_px: NARROW_VIEWPORT_PX,
        }
    }
}

/// Loader state machine. `Complete` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    /// Progress is still ticking.
    Running,
    /// Progress reached 100% at `reached_at` (elapsed since start).
    Complete {
        /// When progress hit 100%.
        reached_at: Duration,
    },
}

/// Orbit body sample for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyFrame {
    /// Body name.
    pub name: &'static str,
    /// Orbit angle in radians.
    pub angle: f32,
    /// Offset from the orbit centre in logical pixels.
    pub position: Vec2,
    /// Self-rotation angle in radians.
    pub spin: f32,
}

/// Render state of one loader frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LoaderFrame {
    /// Progress in percent, in [0, 100].
    pub progress: u32,
    /// Current state.
    pub state: LoaderState,
    /// Whether the completion callback has run.
    pub finished: bool,
    /// One entry per orbit body.
    pub bodies: Vec<BodyFrame>,
}

impl LoaderFrame {
    /// Overlay opacity: fades out once complete.
    pub fn overlay_opacity(&self) -> f32 {
        match self.state {
            LoaderState::Running => 1.0,
            LoaderState::Complete { .. } => 0.0,
        }
    }

    /// Progress caption.
    pub fn status_line(&self) -> String {
        format!("INITIALIZING STELLAR NAVIGATION... {}%", self.progress)
    }
}

/// Completion callback handed out by [`OrbitalLoader::take_due_completion`].
pub type CompletionFn = Box<dyn FnOnce()>;

/// Running loader animation. Dropping it cancels any pending completion.
pub struct OrbitalLoader {
    settings: LoaderSettings,
    state: LoaderState,
    progress: u32,
    elapsed: Duration,
    finished_at: Option<Duration>,
    on_complete: Option<CompletionFn>,
}

impl OrbitalLoader {
    /// Start the animation. `on_complete` runs once, `completion_delay`
    /// after progress reaches 100%.
    pub fn start(settings: LoaderSettings, on_complete: impl FnOnce() + 'static) -> Self {
        let settings = LoaderSettings {
            tick_interval: settings.tick_interval.max(Duration::from_millis(1)),
            step: settings.step.max(1),
            ..settings
        };
        debug!(
            tick_ms = settings.tick_interval.as_millis() as u64,
            step = settings.step,
            "loader started"
        );
        Self {
            settings,
            state: LoaderState::Running,
            progress: 0,
            elapsed: Duration::ZERO,
            finished_at: None,
            on_complete: Some(Box::new(on_complete)),
        }
    }

    /// Start against a known viewport. With `skip_on_narrow_viewport` set
    /// and a narrow viewport, the loader starts complete and `on_complete`
    /// runs before this returns.
    pub fn start_for_viewport(
        settings: LoaderSettings,
        viewport: Viewport,
        on_complete: impl FnOnce() + 'static,
    ) -> Self {
        let skip =
            settings.skip_on_narrow_viewport && viewport.is_narrow(settings.narrow_viewport_px);
        let mut loader = Self::start(settings, on_complete);
        if skip {
            info!(width = viewport.width, "narrow viewport, skipping loader");
            loader.progress = 100;
            loader.state = LoaderState::Complete {
                reached_at: Duration::ZERO,
            };
            if let Some(on_complete) = loader.take_completion() {
                on_complete();
            }
        }
        loader
    }

    /// Current state.
    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Current progress in percent.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Whether the completion callback has run or been handed out to run.
    pub fn is_finished(&self) -> bool {
        self.on_complete.is_none()
    }

    /// Elapsed time at which the completion callback ran.
    pub fn finished_at(&self) -> Option<Duration> {
        self.finished_at
    }

    /// Elapsed time at which the completion callback is due, or `None`
    /// once it has run. Known up front because ticks are fixed.
    pub fn completion_due(&self) -> Option<Duration> {
        if self.is_finished() {
            return None;
        }
        let reached_at = match self.state {
            LoaderState::Running => self.settings.tick_interval * self.ticks_to_complete(),
            LoaderState::Complete { reached_at } => reached_at,
        };
        Some(reached_at + self.settings.completion_delay)
    }

    /// Latest elapsed time seen.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance to `elapsed` since start and return the frame, running the
    /// completion callback in place once it falls due.
    ///
    /// Time never runs backwards: an earlier `elapsed` is treated as the
    /// latest time already seen.
    pub fn advance_to(&mut self, elapsed: Duration) -> LoaderFrame {
        if let Some(on_complete) = self.take_due_completion(elapsed) {
            on_complete();
        }
        self.frame()
    }

    /// Advance to `elapsed` and hand back the completion callback if it fell
    /// due. The loader counts as finished from this point; the caller runs
    /// the callback, typically after releasing any borrow of the loader.
    pub fn take_due_completion(&mut self, elapsed: Duration) -> Option<CompletionFn> {
        self.elapsed = self.elapsed.max(elapsed);

        if self.state == LoaderState::Running {
            let ticks = self.elapsed.as_nanos() / self.settings.tick_interval.as_nanos();
            let progress = ticks
                .saturating_mul(u128::from(self.settings.step))
                .min(100) as u32;
            self.progress = self.progress.max(progress);

            if self.progress >= 100 {
                let reached_at = self.settings.tick_interval * self.ticks_to_complete();
                self.state = LoaderState::Complete { reached_at };
                debug!(reached_ms = reached_at.as_millis() as u64, "loader reached 100%");
            }
        }

        match self.state {
            LoaderState::Complete { reached_at }
                if self.elapsed >= reached_at + self.settings.completion_delay =>
            {
                self.take_completion()
            }
            _ => None,
        }
    }

    /// Frame for the latest elapsed time without advancing.
    pub fn frame(&self) -> LoaderFrame {
        let t = self.elapsed.as_secs_f32();
        LoaderFrame {
            progress: self.progress,
            state: self.state,
            finished: self.is_finished(),
            bodies: ORBIT_BODIES
                .iter()
                .map(|body| BodyFrame {
                    name: body.name,
                    angle: body.angle_at(t),
                    position: body.position_at(t),
                    spin: body.spin_at(t),
                })
                .collect(),
        }
    }

    fn ticks_to_complete(&self) -> u32 {
        100u32.div_ceil(self.settings.step)
    }

    fn take_completion(&mut self) -> Option<CompletionFn> {
        let callback = self.on_complete.take()?;
        self.finished_at = Some(self.elapsed);
        info!(elapsed_ms = self.elapsed.as_millis() as u64, "loader complete");
        Some(callback)
    }
}

impl fmt::Debug for OrbitalLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalLoader")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("elapsed", &self.elapsed)
            .field("finished_at", &self.finished_at)
            .finish()
    }
}
