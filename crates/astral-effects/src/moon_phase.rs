//! Lunar phase from wall-clock time.
//!
//! The phase fraction is the position within the current synodic month,
//! measured from a known new moon: 0.0 is new, 0.5 is full.

use std::fmt;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

/// Mean synodic month in days.
pub const SYNODIC_PERIOD_DAYS: f64 = 29.530_588_67;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Reference new moon: 2024-01-11T11:57:00Z, in Unix milliseconds.
pub const REFERENCE_NEW_MOON_MS: i64 = 1_704_974_220_000;

/// Reference new moon as a timestamp.
pub fn reference_new_moon() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(REFERENCE_NEW_MOON_MS)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// The eight named phases, in cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    ThirdQuarter,
    WaningCrescent,
}

impl PhaseName {
    /// Name for a phase fraction. Bands are 1/8 wide and centred on the
    /// principal phases, so New Moon covers `[15/16, 1) ∪ [0, 1/16)`.
    pub fn from_fraction(fraction: f64) -> Self {
        let f = fraction.rem_euclid(1.0);
        if !(0.0625..0.9375).contains(&f) {
            PhaseName::NewMoon
        } else if f < 0.1875 {
            PhaseName::WaxingCrescent
        } else if f < 0.3125 {
            PhaseName::FirstQuarter
        } else if f < 0.4375 {
            PhaseName::WaxingGibbous
        } else if f < 0.5625 {
            PhaseName::FullMoon
        } else if f < 0.6875 {
            PhaseName::WaningGibbous
        } else if f < 0.8125 {
            PhaseName::ThirdQuarter
        } else {
            PhaseName::WaningCrescent
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PhaseName::NewMoon => "New Moon",
            PhaseName::WaxingCrescent => "Waxing Crescent",
            PhaseName::FirstQuarter => "First Quarter",
            PhaseName::WaxingGibbous => "Waxing Gibbous",
            PhaseName::FullMoon => "Full Moon",
            PhaseName::WaningGibbous => "Waning Gibbous",
            PhaseName::ThirdQuarter => "Third Quarter",
            PhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Horizontal span of the lit part of the disc, as percentages of its width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LitSpan {
    /// Left edge, percent.
    pub from_pct: f64,
    /// Right edge, percent.
    pub to_pct: f64,
}

/// Phase at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoonPhaseSample {
    /// Position in the synodic month, in [0, 1).
    pub fraction: f64,
    /// Named phase band.
    pub name: PhaseName,
}

impl MoonPhaseSample {
    /// `|cos(fraction · 360°)|`. Only sizes the rendered lit region.
    pub fn illumination(&self) -> f64 {
        (self.fraction * std::f64::consts::TAU).cos().abs()
    }

    /// Lit region of the disc. Waxing grows right of centre, waning left.
    pub fn lit_span(&self) -> LitSpan {
        let extent = self.illumination() * 50.0;
        if self.fraction < 0.5 {
            LitSpan {
                from_pct: 50.0,
                to_pct: 50.0 + extent,
            }
        } else {
            LitSpan {
                from_pct: 50.0 - extent,
                to_pct: 50.0,
            }
        }
    }
}

/// Phase fraction at `now`, in [0, 1), including times before the reference.
pub fn phase_fraction(now: DateTime<Utc>) -> f64 {
    let days = (now.timestamp_millis() - REFERENCE_NEW_MOON_MS) as f64 / MILLIS_PER_DAY;
    let fraction = days.rem_euclid(SYNODIC_PERIOD_DAYS) / SYNODIC_PERIOD_DAYS;
    // rem_euclid can round up to the divisor for tiny negative inputs.
    if fraction >= 1.0 { 0.0 } else { fraction }
}

/// Phase fraction and name at `now`.
pub fn compute_phase(now: DateTime<Utc>) -> MoonPhaseSample {
    let fraction = phase_fraction(now);
    MoonPhaseSample {
        fraction,
        name: PhaseName::from_fraction(fraction),
    }
}

/// Caches the phase and recomputes it once the refresh interval has passed.
#[derive(Debug, Clone)]
pub struct MoonPhaseTracker {
    refresh: TimeDelta,
    sample: MoonPhaseSample,
    computed_at: DateTime<Utc>,
}

impl MoonPhaseTracker {
    /// Default refresh interval: one hour.
    pub const DEFAULT_REFRESH: TimeDelta = TimeDelta::hours(1);

    /// Compute the phase at `now` and cache it.
    pub fn new(now: DateTime<Utc>, refresh: TimeDelta) -> Self {
        Self {
            refresh,
            sample: compute_phase(now),
            computed_at: now,
        }
    }

    /// Cached sample.
    pub fn sample(&self) -> MoonPhaseSample {
        self.sample
    }

    /// When the cached sample was computed.
    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    /// Recompute if the refresh interval has elapsed since the last sample.
    /// Returns the new sample when it was recomputed.
    pub fn refresh_if_due(&mut self, now: DateTime<Utc>) -> Option<MoonPhaseSample> {
        if now - self.computed_at >= self.refresh || now < self.computed_at {
            Some(self.refresh_now(now))
        } else {
            None
        }
    }

    /// Recompute unconditionally.
    pub fn refresh_now(&mut self, now: DateTime<Utc>) -> MoonPhaseSample {
        self.sample = compute_phase(now);
        self.computed_at = now;
        tracing::debug!(fraction = self.sample.fraction, phase = %self.sample.name, "moon phase refreshed");
        self.sample
    }
}
