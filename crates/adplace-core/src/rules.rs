//! Targeting rule models: display rules, schedule, visitor conditions, geo

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Time, Weekday, format_description::FormatItem, macros::format_description};

use crate::context::{CountryCode, DeviceClass, PageType};

/// Sets over the taxonomy dimensions a display rule can match on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyFilter {
    pub post_types: BTreeSet<String>,
    pub post_ids: BTreeSet<u64>,
    pub categories: BTreeSet<u64>,
    pub tags: BTreeSet<u64>,
    pub page_types: BTreeSet<PageType>,
}

impl TaxonomyFilter {
    pub fn is_empty(&self) -> bool {
        self.post_types.is_empty()
            && self.post_ids.is_empty()
            && self.categories.is_empty()
            && self.tags.is_empty()
            && self.page_types.is_empty()
    }
}

/// Taxonomy/page based targeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayRule {
    /// Show everywhere except where an exclusion matches
    All {
        #[serde(default)]
        exclude: TaxonomyFilter,
    },
    /// Show only where at least one inclusion matches
    Specific {
        #[serde(default)]
        include: TaxonomyFilter,
    },
}

impl Default for DisplayRule {
    fn default() -> Self {
        DisplayRule::All {
            exclude: TaxonomyFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
            Weekday::Sunday => DayOfWeek::Sunday,
        }
    }
}

/// Date/day/time window an ad may run in.
///
/// Stored values that fail to parse are read as "no bound".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Schedule {
    #[serde(with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,

    #[serde(with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,

    /// Empty = every day
    pub days: BTreeSet<DayOfWeek>,

    #[serde(with = "lenient_time", skip_serializing_if = "Option::is_none")]
    pub time_start: Option<Time>,

    #[serde(with = "lenient_time", skip_serializing_if = "Option::is_none")]
    pub time_end: Option<Time>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[default]
    Any,
    LoggedIn,
    LoggedOut,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitorConditions {
    /// Empty = all devices
    pub devices: BTreeSet<DeviceClass>,
    pub user_status: UserStatus,
    /// Empty = all roles
    pub roles: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoMode {
    #[default]
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoRule {
    pub enabled: bool,
    pub mode: GeoMode,
    pub countries: BTreeSet<CountryCode>,
    pub show_unknown: bool,
}

impl Default for GeoRule {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: GeoMode::Include,
            countries: BTreeSet::new(),
            show_unknown: true,
        }
    }
}

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
const TIME_FORMAT_SECONDS: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

/// Any stored value: strings are parsed, native TOML dates and times are
/// read field by field, everything else is dropped
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Datetime(toml::value::Datetime),
    Other(serde::de::IgnoredAny),
}

fn raw_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RawValue>, D::Error> {
    Ok(match Option::<RawValue>::deserialize(deserializer)? {
        Some(RawValue::Other(_)) => {
            tracing::warn!("Ignoring schedule value that is neither text nor a date/time");
            None
        }
        other => other,
    })
}

/// Parse `YYYY-MM-DD`, `None` on anything else
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), DATE_FORMAT).ok()
}

/// Parse `HH:MM` or `HH:MM:SS`, `None` on anything else
pub fn parse_time(value: &str) -> Option<Time> {
    let value = value.trim();
    Time::parse(value, TIME_FORMAT_SECONDS)
        .or_else(|_| Time::parse(value, TIME_FORMAT))
        .ok()
}

mod lenient_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match value.and_then(|d| d.format(DATE_FORMAT).ok()) {
            Some(text) => serializer.serialize_some(&text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Date>, D::Error> {
        Ok(match raw_value(deserializer)? {
            Some(RawValue::Text(text)) => parse_date(&text),
            Some(RawValue::Datetime(dt)) => dt.date.and_then(|d| parse_date(&d.to_string())),
            _ => None,
        })
    }
}

mod lenient_time {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Time>, serializer: S) -> Result<S::Ok, S::Error> {
        match value.and_then(|t| t.format(TIME_FORMAT_SECONDS).ok()) {
            Some(text) => serializer.serialize_some(&text),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Time>, D::Error> {
        Ok(match raw_value(deserializer)? {
            Some(RawValue::Text(text)) => parse_time(&text),
            Some(RawValue::Datetime(dt)) => dt.time.and_then(|t| parse_time(&t.to_string())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn test_schedule_parses_bounds() {
        let schedule: Schedule = serde_json::from_str(
            r#"{"start_date": "2026-01-01", "end_date": "2026-12-31", "time_start": "09:00", "time_end": "17:30:15", "days": ["monday", "friday"]}"#,
        )
        .unwrap();

        assert_eq!(schedule.start_date, Some(date!(2026 - 01 - 01)));
        assert_eq!(schedule.end_date, Some(date!(2026 - 12 - 31)));
        assert_eq!(schedule.time_start, Some(time!(09:00)));
        assert_eq!(schedule.time_end, Some(time!(17:30:15)));
        assert_eq!(schedule.days.len(), 2);
    }

    #[test]
    fn test_schedule_unparsable_is_unbounded() {
        let schedule: Schedule = serde_json::from_str(
            r#"{"start_date": "next tuesday", "end_date": 20261231, "time_start": "25:99"}"#,
        )
        .unwrap();

        assert_eq!(schedule, Schedule::default());
    }

    #[test]
    fn test_schedule_native_toml_values() {
        let schedule: Schedule = toml::from_str(
            "start_date = 2026-01-01\nend_date = 2020-01-01T23:59:00\ntime_start = 09:30:00\ntime_end = \"17:00\"\n",
        )
        .unwrap();

        assert_eq!(schedule.start_date, Some(date!(2026 - 01 - 01)));
        assert_eq!(schedule.end_date, Some(date!(2020 - 01 - 01)));
        assert_eq!(schedule.time_start, Some(time!(09:30)));
        assert_eq!(schedule.time_end, Some(time!(17:00)));

        // A bare date has no time part
        let schedule: Schedule = toml::from_str("time_start = 2026-01-01\n").unwrap();
        assert_eq!(schedule.time_start, None);
    }

    #[test]
    fn test_display_rule_modes() {
        let rule: DisplayRule =
            serde_json::from_str(r#"{"mode": "specific", "include": {"categories": [4, 7]}}"#).unwrap();
        match rule {
            DisplayRule::Specific { include } => assert_eq!(include.categories.len(), 2),
            other => panic!("unexpected rule: {:?}", other),
        }

        let rule: DisplayRule = serde_json::from_str(r#"{"mode": "all"}"#).unwrap();
        assert_eq!(rule, DisplayRule::default());
    }

    #[test]
    fn test_geo_defaults() {
        let geo: GeoRule = serde_json::from_str(r#"{"enabled": true, "countries": ["us"]}"#).unwrap();
        assert!(geo.show_unknown);
        assert_eq!(geo.mode, GeoMode::Include);
        assert!(geo.countries.contains(&CountryCode::new("US")));
    }

    #[test]
    fn test_schedule_round_trip_keeps_bounds() {
        let schedule = Schedule {
            start_date: Some(date!(2026 - 03 - 01)),
            time_end: Some(time!(18:00)),
            ..Schedule::default()
        };
        let json = serde_json::to_string(&schedule).unwrap();
        let parsed: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, schedule);
    }
}
