//! Procedural visual effects for the Astral Explorers site: starfield,
//! aurora particles, orbital loader, moon phase and event countdowns.
//!
//! Generators are host-agnostic. They take time as an explicit input and
//! return render state; [`EffectHost`] supplies frames and timers and bounds
//! each effect's lifetime through [`Subscription`] guards.

pub mod aurora;
pub mod countdown;
pub mod host;
pub mod loader;
pub mod moon_phase;
pub mod mount;
pub mod render_state;
pub mod starfield;
pub mod viewport;

pub use aurora::{AuroraFrame, AuroraParticle, AuroraSystem};
pub use countdown::{Countdown, CountdownTimer};
pub use host::{EffectHost, FrameTime, Subscription};
pub use loader::{
    BodyFrame, LoaderFrame, LoaderSettings, LoaderState, ORBIT_BODIES, OrbitBody, OrbitalLoader,
};
pub use moon_phase::{MoonPhaseSample, MoonPhaseTracker, PhaseName, compute_phase};
pub use mount::{
    Mounted, mount_aurora, mount_countdown, mount_loader, mount_moon_phase, mount_starfield,
};
pub use render_state::{InstanceRaw, InstanceState, pack_instances};
pub use starfield::{Star, StarClass, Starfield, StarfieldFrame};
pub use viewport::{HeroParallax, SECTIONS, Viewport, active_section, hero_parallax};
