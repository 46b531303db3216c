//! Calendar-aligned tick generation for time scales
//!
//! Picks a tick interval from a fixed ladder of calendar units so that roughly
//! `count` ticks cover the domain:
//!
//! ```text
//! 1s 5s 15s 30s | 1m 5m 15m 30m | 1h 3h 6h 12h | 1d 2d | 1w | 1mo 3mo | 1y
//! ```
//!
//! Spans finer than one second fall back to millisecond steps and spans wider
//! than the ladder use multi-year steps, both chosen with the 1/2/5 × 10ⁿ rule.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};

const MILLIS_SECOND: i64 = 1_000;
const MILLIS_MINUTE: i64 = MILLIS_SECOND * 60;
const MILLIS_HOUR: i64 = MILLIS_MINUTE * 60;
const MILLIS_DAY: i64 = MILLIS_HOUR * 24;
const MILLIS_WEEK: i64 = MILLIS_DAY * 7;
const MILLIS_MONTH: i64 = MILLIS_DAY * 30;
const MILLIS_YEAR: i64 = MILLIS_DAY * 365;

/// Calendar unit a tick interval is aligned to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    /// Weeks start on Sunday
    Week,
    Month,
    Year,
}

/// (unit, step, approximate duration in ms)
const TICK_LADDER: [(TimeUnit, i64, i64); 18] = [
    (TimeUnit::Second, 1, MILLIS_SECOND),
    (TimeUnit::Second, 5, 5 * MILLIS_SECOND),
    (TimeUnit::Second, 15, 15 * MILLIS_SECOND),
    (TimeUnit::Second, 30, 30 * MILLIS_SECOND),
    (TimeUnit::Minute, 1, MILLIS_MINUTE),
    (TimeUnit::Minute, 5, 5 * MILLIS_MINUTE),
    (TimeUnit::Minute, 15, 15 * MILLIS_MINUTE),
    (TimeUnit::Minute, 30, 30 * MILLIS_MINUTE),
    (TimeUnit::Hour, 1, MILLIS_HOUR),
    (TimeUnit::Hour, 3, 3 * MILLIS_HOUR),
    (TimeUnit::Hour, 6, 6 * MILLIS_HOUR),
    (TimeUnit::Hour, 12, 12 * MILLIS_HOUR),
    (TimeUnit::Day, 1, MILLIS_DAY),
    (TimeUnit::Day, 2, 2 * MILLIS_DAY),
    (TimeUnit::Week, 1, MILLIS_WEEK),
    (TimeUnit::Month, 1, MILLIS_MONTH),
    (TimeUnit::Month, 3, 3 * MILLIS_MONTH),
    (TimeUnit::Year, 1, MILLIS_YEAR),
];

impl TimeUnit {
    /// Round down to the start of the unit containing `t`
    fn floor(self, t: DateTime<Utc>) -> DateTime<Utc> {
        let naive = t.naive_utc();
        let date = naive.date();
        let floored = match self {
            TimeUnit::Millisecond => {
                DateTime::<Utc>::from_timestamp_millis(t.timestamp_millis()).map(|d| d.naive_utc())
            }
            TimeUnit::Second => naive.with_nanosecond(0),
            TimeUnit::Minute => date.and_hms_opt(naive.hour(), naive.minute(), 0),
            TimeUnit::Hour => date.and_hms_opt(naive.hour(), 0, 0),
            TimeUnit::Day => date.and_hms_opt(0, 0, 0),
            TimeUnit::Week => {
                let back = Duration::days(i64::from(date.weekday().num_days_from_sunday()));
                (date - back).and_hms_opt(0, 0, 0)
            }
            TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            TimeUnit::Year => {
                NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        };
        floored.map(|n| Utc.from_utc_datetime(&n)).unwrap_or(t)
    }

    /// Advance by exactly one unit
    fn next(self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeUnit::Millisecond => t.checked_add_signed(Duration::milliseconds(1)),
            TimeUnit::Second => t.checked_add_signed(Duration::seconds(1)),
            TimeUnit::Minute => t.checked_add_signed(Duration::minutes(1)),
            TimeUnit::Hour => t.checked_add_signed(Duration::hours(1)),
            TimeUnit::Day => t.checked_add_signed(Duration::days(1)),
            TimeUnit::Week => t.checked_add_signed(Duration::weeks(1)),
            TimeUnit::Month => t.checked_add_months(Months::new(1)),
            TimeUnit::Year => t.checked_add_months(Months::new(12)),
        }
    }

    /// Smallest unit boundary at or after `t`
    fn ceil(self, t: DateTime<Utc>) -> DateTime<Utc> {
        let before = self.floor(t - Duration::milliseconds(1));
        match self.next(before) {
            Some(next) => self.floor(next),
            None => t,
        }
    }

    /// Value a multi-step interval aligns on (seconds of the minute, month of the year, ...)
    fn field(self, t: DateTime<Utc>) -> i64 {
        match self {
            TimeUnit::Millisecond => t.timestamp_millis(),
            TimeUnit::Second => i64::from(t.second()),
            TimeUnit::Minute => i64::from(t.minute()),
            TimeUnit::Hour => i64::from(t.hour()),
            TimeUnit::Day => i64::from(t.day0()),
            TimeUnit::Week => 0,
            TimeUnit::Month => i64::from(t.month0()),
            TimeUnit::Year => i64::from(t.year()),
        }
    }
}

/// A calendar unit repeated every `step` units
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickInterval {
    pub unit: TimeUnit,
    pub step: i64,
}

impl TickInterval {
    /// Pick the interval producing roughly `count` ticks over `[start, stop]`.
    ///
    /// Returns `None` when no sensible interval exists.
    pub fn choose(start: DateTime<Utc>, stop: DateTime<Utc>, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let start_ms = start.timestamp_millis() as f64;
        let stop_ms = stop.timestamp_millis() as f64;
        let target = (stop_ms - start_ms).abs() / count as f64;

        let i = TICK_LADDER
            .iter()
            .position(|&(_, _, duration)| duration as f64 > target)
            .unwrap_or(TICK_LADDER.len());

        if i == TICK_LADDER.len() {
            let year = MILLIS_YEAR as f64;
            let step = tick_step(start_ms / year, stop_ms / year, count).floor();
            return (step >= 1.0).then_some(Self {
                unit: TimeUnit::Year,
                step: step as i64,
            });
        }

        if i == 0 {
            let step = tick_step(start_ms, stop_ms, count).max(1.0).floor();
            return Some(Self {
                unit: TimeUnit::Millisecond,
                step: step as i64,
            });
        }

        let (_, _, below) = TICK_LADDER[i - 1];
        let (_, _, above) = TICK_LADDER[i];
        let (unit, step, _) = if target / (below as f64) < (above as f64) / target {
            TICK_LADDER[i - 1]
        } else {
            TICK_LADDER[i]
        };
        Some(Self { unit, step })
    }

    /// Every aligned boundary in `[start, stop)`
    pub fn range(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if self.unit == TimeUnit::Millisecond {
            return self.millisecond_range(start, stop);
        }

        let mut ticks = Vec::new();
        let mut current = self.unit.ceil(start);
        while current < stop {
            if self.step <= 1 || self.unit.field(current).rem_euclid(self.step) == 0 {
                ticks.push(current);
            }
            match self.unit.next(current) {
                Some(next) => current = self.unit.floor(next),
                None => break,
            }
        }
        ticks
    }

    fn millisecond_range(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        let step = self.step.max(1);
        let start_ms = start.timestamp_millis();
        let stop_ms = stop.timestamp_millis();
        let mut ms = start_ms.div_euclid(step) * step;
        if ms < start_ms {
            ms += step;
        }

        let mut ticks = Vec::new();
        while ms < stop_ms {
            if let Some(t) = DateTime::<Utc>::from_timestamp_millis(ms) {
                ticks.push(t);
            }
            ms += step;
        }
        ticks
    }
}

/// Tick spacing of 1, 2 or 5 × 10ⁿ giving about `count` ticks over `[start, stop]`.
///
/// Negative when `stop < start`, zero for an empty span.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let step0 = (stop - start).abs() / count.max(1) as f64;
    let mut step1 = 10f64.powf(step0.log10().floor());
    let error = step0 / step1;
    if error >= 50f64.sqrt() {
        step1 *= 10.0;
    } else if error >= 10f64.sqrt() {
        step1 *= 5.0;
    } else if error >= 2f64.sqrt() {
        step1 *= 2.0;
    }
    if stop < start {
        -step1
    } else {
        step1
    }
}

/// Tick instants for a time domain, in domain order (descending for an inverted domain)
pub fn ticks(start: DateTime<Utc>, stop: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };

    let Some(interval) = TickInterval::choose(lo, hi, count) else {
        return Vec::new();
    };

    let mut ticks = interval.range(lo, hi + Duration::milliseconds(1));
    if reverse {
        ticks.reverse();
    }
    ticks
}
