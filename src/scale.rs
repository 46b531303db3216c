//! Time scales mapping the dataset onto the canvas

use crate::data::{time_value, year_date, Dataset};
use crate::ticks;
use chrono::{DateTime, Utc};

/// Fixed canvas geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Padding applied on all four sides
    pub padding: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            padding: 50.0,
        }
    }
}

/// Linear mapping from instants to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (DateTime<Utc>, DateTime<Utc>),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Pixel position of `t`. A degenerate domain maps everything to the middle of the range.
    pub fn map(&self, t: DateTime<Utc>) -> f64 {
        let d0 = self.domain.0.timestamp_millis() as f64;
        let d1 = self.domain.1.timestamp_millis() as f64;
        let (r0, r1) = self.range;

        let span = d1 - d0;
        let normalized = if span == 0.0 {
            0.5
        } else {
            (t.timestamp_millis() as f64 - d0) / span
        };
        r0 + normalized * (r1 - r0)
    }

    /// About `count` calendar-aligned ticks, in domain order
    pub fn ticks(&self, count: usize) -> Vec<DateTime<Utc>> {
        ticks::ticks(self.domain.0, self.domain.1, count)
    }
}

/// Both chart scales, derived from one dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    /// Elapsed time to vertical pixel; faster times sit higher
    pub time: TimeScale,
    /// Race year to horizontal pixel
    pub year: TimeScale,
    /// Instant whose month, day and time of day every year date shares
    pub anchor: DateTime<Utc>,
}

impl Scales {
    /// Compute scales for `dataset`, or `None` if it has no records
    pub fn compute(dataset: &Dataset, canvas: &Canvas, anchor: DateTime<Utc>) -> Option<Self> {
        let (min_seconds, max_seconds) = dataset.seconds_extent()?;
        let (min_year, max_year) = dataset.year_extent()?;

        let time = TimeScale::new(
            (time_value(max_seconds), time_value(min_seconds)),
            (canvas.height - canvas.padding, canvas.padding),
        );
        let year = TimeScale::new(
            (year_date(anchor, min_year - 1), year_date(anchor, max_year + 1)),
            (canvas.padding, canvas.width - canvas.padding),
        );

        Some(Self { time, year, anchor })
    }

    /// Horizontal position of a race year
    pub fn x(&self, year: i32) -> f64 {
        self.year.map(year_date(self.anchor, year))
    }

    /// Vertical position of an elapsed time in seconds
    pub fn y(&self, seconds: f64) -> f64 {
        self.time.map(time_value(seconds))
    }
}
