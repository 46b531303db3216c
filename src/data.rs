//! Race records and the dataset they are loaded into

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single race result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Calendar year of the race
    #[serde(rename = "Year")]
    pub year: i32,
    /// Elapsed time in seconds
    #[serde(rename = "Seconds")]
    pub seconds: f64,
    /// Allegation description, empty when there is none
    #[serde(rename = "Doping", default)]
    pub doping: String,
    /// Rider name
    #[serde(rename = "Name")]
    pub name: String,
    /// Finishing place, as displayed
    #[serde(rename = "Place", deserialize_with = "display_string")]
    pub place: String,
    /// Elapsed time as displayed (e.g. "36:50")
    #[serde(rename = "Time")]
    pub time: String,
    /// Rider nationality code (e.g. "ITA")
    #[serde(rename = "Nationality", default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    /// Source link for the allegation
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Record {
    /// Whether the record carries a doping allegation
    pub fn has_allegation(&self) -> bool {
        !self.doping.is_empty()
    }

    /// The elapsed time as an instant `seconds` after the Unix epoch
    pub fn time_value(&self) -> DateTime<Utc> {
        time_value(self.seconds)
    }

    /// ISO-8601 timestamp of the time value, with millisecond precision
    pub fn time_iso(&self) -> String {
        self.time_value().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// The anchor instant moved into this record's year
    pub fn year_date(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        year_date(anchor, self.year)
    }
}

/// Convert elapsed seconds into an instant relative to the Unix epoch
pub fn time_value(seconds: f64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis((seconds * 1000.0).trunc() as i64).unwrap_or_default()
}

/// Replace the year of `anchor`, keeping month, day and time of day.
///
/// Feb 29 in a non-leap target year rolls over to Mar 1.
pub fn year_date(anchor: DateTime<Utc>, year: i32) -> DateTime<Utc> {
    anchor.with_year(year).unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(year, 3, 1)
            .map(|date| Utc.from_utc_datetime(&date.and_time(anchor.time())))
            .unwrap_or(anchor)
    })
}

/// Accept either a JSON string or a JSON number and keep it as display text
fn display_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

/// Ordered race records, in source order
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Smallest and largest elapsed time, `None` when empty
    pub fn seconds_extent(&self) -> Option<(f64, f64)> {
        self.records.iter().map(|r| r.seconds).fold(None, |acc, s| match acc {
            None => Some((s, s)),
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
        })
    }

    /// Earliest and latest year, `None` when empty
    pub fn year_extent(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_record(year: i32, seconds: f64, doping: &str) -> Record {
        Record {
            year,
            seconds,
            doping: doping.to_string(),
            name: format!("Rider {}", year),
            place: "1".to_string(),
            time: format!("{}:{:02}", seconds as i64 / 60, seconds as i64 % 60),
            nationality: None,
            url: None,
        }
    }

    #[test]
    fn test_deserialize_upstream_record() {
        let json = r#"[
            {
                "Time": "36:50",
                "Place": 1,
                "Seconds": 2210,
                "Name": "Marco Pantani",
                "Year": 1995,
                "Nationality": "ITA",
                "Doping": "Alleged drug use during 1995 due to high hematocrit levels",
                "URL": "https://en.wikipedia.org/wiki/Marco_Pantani#Alleged_drug_use"
            },
            {
                "Time": "39:50",
                "Place": "35",
                "Seconds": 2390,
                "Name": "Nairo Quintana",
                "Year": 2015,
                "Doping": ""
            }
        ]"#;

        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.len(), 2);

        let first = dataset.get(0).unwrap();
        assert_eq!(first.year, 1995);
        assert_eq!(first.place, "1");
        assert_eq!(first.nationality.as_deref(), Some("ITA"));
        assert!(first.has_allegation());

        let second = dataset.get(1).unwrap();
        assert_eq!(second.place, "35");
        assert_eq!(second.url, None);
        assert!(!second.has_allegation());
    }

    #[test]
    fn test_missing_doping_defaults_to_empty() {
        let json = r#"{"Time": "37:00", "Place": 2, "Seconds": 2220, "Name": "X", "Year": 2000}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.doping, "");
        assert!(!record.has_allegation());
    }

    #[test]
    fn test_time_value_and_iso() {
        let record = make_record(1995, 2210.0, "");
        assert_eq!(record.time_value().timestamp_millis(), 2_210_000);
        assert_eq!(record.time_iso(), "1970-01-01T00:36:50.000Z");
    }

    #[test]
    fn test_time_value_truncates_sub_millisecond() {
        assert_eq!(time_value(2210.0009).timestamp_millis(), 2_210_000);
        assert_eq!(time_value(-0.0019).timestamp_millis(), -1);
    }

    #[test]
    fn test_year_date_keeps_month_and_day() {
        let anchor = Utc.with_ymd_and_hms(2026, 10, 16, 12, 30, 0).unwrap();
        let date = year_date(anchor, 1998);
        assert_eq!(date, Utc.with_ymd_and_hms(1998, 10, 16, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_year_date_leap_day_rolls_over() {
        let anchor = Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap();
        assert_eq!(
            year_date(anchor, 1999),
            Utc.with_ymd_and_hms(1999, 3, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(
            year_date(anchor, 2000),
            Utc.with_ymd_and_hms(2000, 2, 29, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_extents() {
        let dataset = Dataset::from_records(vec![
            make_record(2001, 2300.0, ""),
            make_record(1994, 2250.0, "yes"),
            make_record(2015, 2390.0, ""),
        ]);
        assert_eq!(dataset.seconds_extent(), Some((2250.0, 2390.0)));
        assert_eq!(dataset.year_extent(), Some((1994, 2015)));

        let empty = Dataset::new();
        assert_eq!(empty.seconds_extent(), None);
        assert_eq!(empty.year_extent(), None);
    }
}
