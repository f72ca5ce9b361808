//! Time representation for cue placement
//!
//! Timecodes are exact rationals: an integer tick count over a ticks-per-second
//! scale. The raw `(ticks, scale)` pair is kept as given so values written to
//! disk read back identically, while comparison and hashing treat equivalent
//! values at different scales as equal.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use crate::error::{CueSheetError, Result};
use crate::timescale;

/// A point in time, `ticks / scale` seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "TimecodeRepr", into = "TimecodeRepr")]
pub struct Timecode {
    ticks: i64,
    /// Ticks per second, always positive.
    scale: i32,
}

#[derive(Serialize, Deserialize)]
struct TimecodeRepr {
    ticks: i64,
    scale: i32,
}

impl TryFrom<TimecodeRepr> for Timecode {
    type Error = CueSheetError;

    fn try_from(repr: TimecodeRepr) -> Result<Self> {
        Self::try_new(repr.ticks, repr.scale)
    }
}

impl From<Timecode> for TimecodeRepr {
    fn from(time: Timecode) -> Self {
        Self {
            ticks: time.ticks,
            scale: time.scale,
        }
    }
}

impl Timecode {
    /// Zero time constant.
    pub const ZERO: Self = Self { ticks: 0, scale: 1 };

    /// Placeholder for an unbounded or unknown upper bound.
    ///
    /// Compares greater than every practical timestamp. Arithmetic involving
    /// it yields `INDEFINITE` again.
    pub const INDEFINITE: Self = Self {
        ticks: i64::MAX,
        scale: 1,
    };

    /// Create a timecode of `ticks / scale` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive. Use [`Timecode::try_new`] for
    /// untrusted input.
    #[inline]
    pub const fn new(ticks: i64, scale: i32) -> Self {
        assert!(scale > 0, "timecode scale must be positive");
        Self { ticks, scale }
    }

    /// Create a timecode, rejecting a non-positive scale.
    pub fn try_new(ticks: i64, scale: i32) -> Result<Self> {
        if scale <= 0 {
            return Err(CueSheetError::InvalidTimescale(scale as i64));
        }
        Ok(Self { ticks, scale })
    }

    /// Create a timecode from seconds, rounding to the nearest tick of
    /// `preferred_scale`.
    pub fn from_seconds(seconds: f64, preferred_scale: i32) -> Result<Self> {
        if preferred_scale <= 0 {
            return Err(CueSheetError::InvalidTimescale(preferred_scale as i64));
        }
        if !seconds.is_finite() {
            return Err(CueSheetError::InvalidSeconds(seconds));
        }
        let ticks = (seconds * preferred_scale as f64).round();
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
        if ticks < i64::MIN as f64 || ticks >= i64::MAX as f64 {
            return Err(CueSheetError::InvalidSeconds(seconds));
        }
        Ok(Self {
            ticks: ticks as i64,
            scale: preferred_scale,
        })
    }

    /// Create a timecode from seconds at nanosecond resolution.
    pub fn from_seconds_max_resolution(seconds: f64) -> Result<Self> {
        Self::from_seconds(seconds, timescale::MAX_RESOLUTION)
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        self.ticks as f64 / self.scale as f64
    }

    /// Raw tick count.
    #[inline]
    pub fn ticks(self) -> i64 {
        self.ticks
    }

    /// Ticks per second.
    #[inline]
    pub fn scale(self) -> i32 {
        self.scale
    }

    /// Check if this is the indefinite sentinel.
    #[inline]
    pub fn is_indefinite(self) -> bool {
        self == Self::INDEFINITE
    }

    /// Check if this time is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.ticks == 0
    }

    /// The value as a reduced 64-bit rational.
    pub fn to_rational(self) -> num_rational::Rational64 {
        num_rational::Rational64::new(self.ticks, self.scale as i64)
    }

    /// Re-express this time at another scale, rounding half away from zero.
    pub fn rescaled(self, scale: i32) -> Result<Self> {
        if scale <= 0 {
            return Err(CueSheetError::InvalidTimescale(scale as i64));
        }
        if self.is_indefinite() {
            return Ok(Self::INDEFINITE);
        }
        if scale == self.scale {
            return Ok(self);
        }
        let ticks = div_round(self.ticks as i128 * scale as i128, self.scale as i128);
        Ok(Self {
            ticks: saturate(ticks),
            scale,
        })
    }

    fn exact(self) -> Ratio<i128> {
        Ratio::new(self.ticks as i128, self.scale as i128)
    }

    /// Narrow an exact result back to a timecode. Keeps the reduced
    /// denominator when it fits, otherwise falls back to nanoseconds.
    fn from_exact(value: Ratio<i128>) -> Self {
        let (numer, denom) = (*value.numer(), *value.denom());
        if let (Ok(ticks), Ok(scale)) = (i64::try_from(numer), i32::try_from(denom)) {
            return Self { ticks, scale };
        }
        let scale = timescale::MAX_RESOLUTION;
        Self {
            ticks: saturate(div_round(numer * scale as i128, denom)),
            scale,
        }
    }

    fn combine(self, rhs: Self, negate_rhs: bool) -> Self {
        if self.is_indefinite() || rhs.is_indefinite() {
            return Self::INDEFINITE;
        }
        if self.scale == rhs.scale {
            let ticks = if negate_rhs {
                self.ticks.checked_sub(rhs.ticks)
            } else {
                self.ticks.checked_add(rhs.ticks)
            };
            if let Some(ticks) = ticks {
                return Self {
                    ticks,
                    scale: self.scale,
                };
            }
        }
        let value = if negate_rhs {
            self.exact() - rhs.exact()
        } else {
            self.exact() + rhs.exact()
        };
        Self::from_exact(value)
    }
}

fn div_round(numer: i128, denom: i128) -> i128 {
    let quotient = numer / denom;
    let remainder = numer % denom;
    if 2 * remainder.abs() >= denom {
        quotient + numer.signum()
    } else {
        quotient
    }
}

fn saturate(ticks: i128) -> i64 {
    i64::try_from(ticks).unwrap_or(if ticks > 0 { i64::MAX } else { i64::MIN })
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

impl PartialEq for Timecode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timecode {}

impl Ord for Timecode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiply in 128 bits; i64 * i32 cannot overflow there.
        let lhs = self.ticks as i128 * other.scale as i128;
        let rhs = other.ticks as i128 * self.scale as i128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Timecode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Timecode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let divisor = gcd(self.ticks as i128, self.scale as i128).max(1);
        (self.ticks as i128 / divisor).hash(state);
        (self.scale as i128 / divisor).hash(state);
    }
}

impl Default for Timecode {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Timecode {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, false)
    }
}

impl Sub for Timecode {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, true)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_indefinite() {
            write!(f, "indefinite")
        } else {
            write!(f, "{:.3}s", self.to_seconds_f64())
        }
    }
}

/// A time range with inclusive start and exclusive end. `start < end` always
/// holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CueRangeRepr", into = "CueRangeRepr")]
pub struct CueRange {
    start: Timecode,
    end: Timecode,
}

#[derive(Serialize, Deserialize)]
struct CueRangeRepr {
    start: Timecode,
    end: Timecode,
}

impl TryFrom<CueRangeRepr> for CueRange {
    type Error = CueSheetError;

    fn try_from(repr: CueRangeRepr) -> Result<Self> {
        Self::new(repr.start, repr.end)
    }
}

impl From<CueRange> for CueRangeRepr {
    fn from(range: CueRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl CueRange {
    /// From zero to the indefinite sentinel.
    pub const INDEFINITE: Self = Self {
        start: Timecode::ZERO,
        end: Timecode::INDEFINITE,
    };

    /// Create a range, rejecting `start >= end`.
    pub fn new(start: Timecode, end: Timecode) -> Result<Self> {
        if start >= end {
            return Err(CueSheetError::inverted(start, end));
        }
        Ok(Self { start, end })
    }

    /// Create a range from seconds at the given scale.
    pub fn from_seconds(start: f64, end: f64, scale: i32) -> Result<Self> {
        Self::new(
            Timecode::from_seconds(start, scale)?,
            Timecode::from_seconds(end, scale)?,
        )
    }

    /// Start time (inclusive).
    #[inline]
    pub fn start(self) -> Timecode {
        self.start
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> Timecode {
        self.end
    }

    /// Length of the range. Indefinite if the end is.
    #[inline]
    pub fn duration(self) -> Timecode {
        self.end - self.start
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: Timecode) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// This range with a new start.
    pub fn with_start(self, start: Timecode) -> Result<Self> {
        Self::new(start, self.end)
    }

    /// This range with a new end.
    pub fn with_end(self, end: Timecode) -> Result<Self> {
        Self::new(self.start, end)
    }
}

impl fmt::Display for CueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
