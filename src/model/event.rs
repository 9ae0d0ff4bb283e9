use chrono::{NaiveDate, NaiveTime};
use chrono_humanize::{Accuracy, HumanTime, Tense};
use color_eyre::eyre::{bail, eyre, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::grid::SlotGrid;
use crate::configuration::config::Config;

/// Namespace prefix of event keys in the store
pub const KEY_PREFIX: &str = "event-";

/// The shortest duration the board accepts, in minutes
pub const MIN_DURATION_MINUTES: i64 = 15;

const DAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// One entry on the board
///
/// The day plus the start time also serve as the record's identity: two
/// records sharing both will collide in the store and the later save wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    pub day: NaiveDate,
    #[serde(with = "wall_clock")]
    pub start: NaiveTime,
    #[serde(with = "wall_clock")]
    pub end: NaiveTime,
    pub kind: String,
    pub capacity: String,
}

/// Serialize times of day as "HH:MM", the same shape the store has always used
mod wall_clock {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let buf = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&buf, super::TIME_FORMAT).map_err(Error::custom)
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.title,
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT)
        )
    }
}

impl EventRecord {
    /// The key under which this record is stored
    pub fn storage_key(&self) -> String {
        format!(
            "{}{}-{}",
            KEY_PREFIX,
            self.day.format(DAY_FORMAT),
            self.start.format(TIME_FORMAT)
        )
    }

    /// Recover the day and start time encoded in a storage key
    pub fn parse_storage_key(key: &str) -> Result<(NaiveDate, NaiveTime)> {
        let pattern = Regex::new(r"^event-(\d{4}-\d{2}-\d{2})-(\d{2}:\d{2})$")?;
        let captures = pattern
            .captures(key)
            .ok_or(eyre!("'{}' is not an event key", key))?;

        let day = NaiveDate::parse_from_str(&captures[1], DAY_FORMAT)?;
        let start = NaiveTime::parse_from_str(&captures[2], TIME_FORMAT)?;

        Ok((day, start))
    }

    /// Signed length of the event in minutes
    ///
    /// Computed as same-day wall-clock subtraction, so an end before the
    /// start (e.g. an event meant to span midnight) comes out negative.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Validate the duration rule for new events
    ///
    /// The end must be at least [`MIN_DURATION_MINUTES`] after the start;
    /// exactly 15 minutes is accepted.
    pub fn check_duration(start: NaiveTime, end: NaiveTime) -> Result<()> {
        let minutes = (end - start).num_minutes();
        if minutes < MIN_DURATION_MINUTES {
            bail!(
                "the end time must be at least {} minutes after the start time (got {} minutes)",
                MIN_DURATION_MINUTES,
                minutes
            );
        }

        Ok(())
    }

    /// Returns an EventContext suitable for providing values to Tera templates
    pub fn context(&self, grid: &SlotGrid, config: &Config) -> EventContext {
        let block = grid.block(self.start, self.end);

        EventContext {
            key: self.storage_key(),
            title: self.title.clone(),
            start: self.start.format(&config.event_start_format).to_string(),
            end: self.end.format(&config.event_end_format).to_string(),
            kind: self.kind.clone(),
            capacity: self.capacity.clone(),
            duration: HumanTime::from(self.end - self.start)
                .to_text_en(Accuracy::Precise, Tense::Present),
            color: config.color_for(&self.kind).map(|c| c.to_hex_string()),
            top: block.top,
            height: block.height,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventContext {
    /// Storage key, carried on the rendered block as a back-reference only
    pub key: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub kind: String,
    pub capacity: String,
    pub duration: String,
    pub color: Option<String>,
    pub top: i64,
    pub height: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> EventRecord {
        EventRecord {
            title: "Back massage".into(),
            day: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            kind: "Massage".into(),
            capacity: "8".into(),
        }
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn storage_keys_join_day_and_start() {
        assert_eq!(record().storage_key(), "event-2024-06-05-10:00");
    }

    #[test]
    fn storage_keys_parse_back() {
        let record = record();
        let (day, start) = EventRecord::parse_storage_key(&record.storage_key()).unwrap();
        assert_eq!(day, record.day);
        assert_eq!(start, record.start);
    }

    #[test]
    fn foreign_keys_are_rejected() {
        assert!(EventRecord::parse_storage_key("settings-theme").is_err());
        assert!(EventRecord::parse_storage_key("event-2024-06-05").is_err());
    }

    #[test]
    fn records_serialize_with_wall_clock_times() {
        assert_eq!(
            serde_json::to_value(record()).unwrap(),
            json!({
                "title": "Back massage",
                "day": "2024-06-05",
                "start": "10:00",
                "end": "10:30",
                "kind": "Massage",
                "capacity": "8",
            })
        );
    }

    #[test]
    fn records_round_trip_through_serde() {
        let record = record();
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<EventRecord>(&text).unwrap(), record);
    }

    #[test]
    fn ten_minute_events_are_rejected() {
        assert!(EventRecord::check_duration(time(9, 0), time(9, 10)).is_err());
    }

    #[test]
    fn fifteen_minutes_is_exactly_enough() {
        assert!(EventRecord::check_duration(time(9, 0), time(9, 15)).is_ok());
    }

    #[test]
    fn midnight_spanning_events_count_as_negative_and_fail() {
        let mut record = record();
        record.start = time(23, 30);
        record.end = time(0, 15);
        assert!(record.duration_minutes() < 0);
        assert!(EventRecord::check_duration(record.start, record.end).is_err());
    }

    #[test]
    fn contexts_carry_the_block_placement() {
        let grid = SlotGrid::new(6, 16, 60, 28, 2);
        let config = Config::default();
        let context = record().context(&grid, &config);
        assert_eq!(context.key, "event-2024-06-05-10:00");
        assert_eq!(context.top, 270);
        assert_eq!(context.height, 24);
        assert_eq!(context.start, "10:00");
        assert_eq!(context.color, None);
    }
}
