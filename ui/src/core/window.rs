//! Previous-period window resolution.
//!
//! Runs upstream of the query pipeline: given the primary (current) window and
//! the comparison mode picked in the control panel, produce the window the
//! "previous" series is fetched for.
//!
//! Every mode keeps the primary window's exact duration. Year and Month move
//! the start back one calendar unit, clamping a day that does not exist in the
//! target month to that month's last day (`2024-02-29` minus one year is
//! `2023-02-28`), and the end follows at the original duration. Week is a
//! plain seven-day shift. Range ends where the primary window starts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, Duration, Month, PrimitiveDateTime};

use super::error::{KpiError, Result};

/// Separator the host uses between the bounds of an explicit time range.
pub const RANGE_SEPARATOR: &str = " : ";

/// How the previous-period window is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonMode {
    #[default]
    #[serde(rename = "y")]
    Year,
    #[serde(rename = "w")]
    Week,
    #[serde(rename = "m")]
    Month,
    #[serde(rename = "r")]
    Range,
    #[serde(rename = "c")]
    Custom,
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 5] = [
        ComparisonMode::Year,
        ComparisonMode::Week,
        ComparisonMode::Month,
        ComparisonMode::Range,
        ComparisonMode::Custom,
    ];

    /// Form-data code persisted by the host.
    pub fn code(self) -> &'static str {
        match self {
            ComparisonMode::Year => "y",
            ComparisonMode::Week => "w",
            ComparisonMode::Month => "m",
            ComparisonMode::Range => "r",
            ComparisonMode::Custom => "c",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComparisonMode::Year => "Year",
            ComparisonMode::Week => "Week",
            ComparisonMode::Month => "Month",
            ComparisonMode::Range => "Range",
            ComparisonMode::Custom => "Custom",
        })
    }
}

impl FromStr for ComparisonMode {
    type Err = KpiError;

    fn from_str(raw: &str) -> Result<Self> {
        let needle = raw.trim();
        ComparisonMode::ALL
            .into_iter()
            .find(|mode| {
                mode.code().eq_ignore_ascii_case(needle)
                    || mode.to_string().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| KpiError::Config(format!("unknown comparison mode `{raw}`")))
    }
}

/// Half-open window `[start, end)` in host wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl TimeRange {
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self> {
        if end < start {
            return Err(KpiError::InvalidTimeRange(format!(
                "end {} precedes start {}",
                format_bound(end),
                format_bound(start)
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering whole days `[start, end)`.
    pub fn from_dates(start: Date, end: Date) -> Result<Self> {
        Self::new(start.midnight(), end.midnight())
    }

    /// Parse the host's explicit `start : end` syntax.
    pub fn parse(raw: &str) -> Result<Self> {
        let (start, end) = raw
            .split_once(RANGE_SEPARATOR)
            .ok_or_else(|| {
                KpiError::InvalidTimeRange(format!("expected `start{RANGE_SEPARATOR}end`, got `{raw}`"))
            })?;
        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{RANGE_SEPARATOR}{}",
            format_bound(self.start),
            format_bound(self.end)
        )
    }
}

impl FromStr for TimeRange {
    type Err = KpiError;

    fn from_str(raw: &str) -> Result<Self> {
        TimeRange::parse(raw)
    }
}

impl Serialize for TimeRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeRange::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn parse_bound(raw: &str) -> Result<PrimitiveDateTime> {
    let raw = raw.trim();
    let with_t = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, with_t) {
        return Ok(dt);
    }
    let with_space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, with_space) {
        return Ok(dt);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(Date::midnight)
        .map_err(|err| KpiError::InvalidTimeRange(format!("`{raw}`: {err}")))
}

fn format_bound(value: PrimitiveDateTime) -> String {
    value
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

/// Resolve the previous-period window for `mode`.
///
/// `custom` is only consulted (and then required) for [`ComparisonMode::Custom`].
pub fn resolve(
    mode: ComparisonMode,
    primary: TimeRange,
    custom: Option<TimeRange>,
) -> Result<TimeRange> {
    let resolved = match mode {
        ComparisonMode::Year => anchored(shift_months(primary.start, -12)?, primary.duration())?,
        ComparisonMode::Month => anchored(shift_months(primary.start, -1)?, primary.duration())?,
        ComparisonMode::Week => TimeRange::new(
            shift_duration(primary.start, Duration::weeks(1))?,
            shift_duration(primary.end, Duration::weeks(1))?,
        )?,
        ComparisonMode::Range => {
            TimeRange::new(shift_duration(primary.start, primary.duration())?, primary.start)?
        }
        ComparisonMode::Custom => custom.ok_or(KpiError::UnresolvedCustomWindow)?,
    };

    tracing::debug!(mode = %mode, primary = %primary, previous = %resolved, "resolved comparison window");
    Ok(resolved)
}

/// Window of `duration` starting at `start`.
fn anchored(start: PrimitiveDateTime, duration: Duration) -> Result<TimeRange> {
    let end = start
        .checked_add(duration)
        .ok_or_else(|| KpiError::InvalidTimeRange(format!("{} out of range", format_bound(start))))?;
    TimeRange::new(start, end)
}

fn shift_duration(value: PrimitiveDateTime, back: Duration) -> Result<PrimitiveDateTime> {
    value
        .checked_sub(back)
        .ok_or_else(|| KpiError::InvalidTimeRange(format!("{} out of range", format_bound(value))))
}

/// Move `value` by `months` calendar months, clamping the day to the target month.
fn shift_months(value: PrimitiveDateTime, months: i32) -> Result<PrimitiveDateTime> {
    let date = value.date();
    let ordinal = date.year() * 12 + (date.month() as i32 - 1) + months;
    let year = ordinal.div_euclid(12);
    let month = Month::try_from((ordinal.rem_euclid(12) + 1) as u8)
        .map_err(|err| KpiError::InvalidTimeRange(err.to_string()))?;
    let day = date.day().min(days_in_month(year, month));

    let shifted = Date::from_calendar_date(year, month, day)
        .map_err(|err| KpiError::InvalidTimeRange(err.to_string()))?;
    Ok(PrimitiveDateTime::new(shifted, value.time()))
}

fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn window(start: Date, end: Date) -> TimeRange {
        TimeRange::from_dates(start, end).unwrap()
    }

    #[test]
    fn year_shift_keeps_calendar_alignment() {
        let primary = window(date!(2024 - 01 - 01), date!(2024 - 02 - 01));
        let previous = resolve(ComparisonMode::Year, primary, None).unwrap();
        assert_eq!(previous, window(date!(2023 - 01 - 01), date!(2023 - 02 - 01)));
    }

    #[test]
    fn year_shift_clamps_leap_day() {
        let primary = window(date!(2024 - 02 - 29), date!(2024 - 03 - 01));
        let previous = resolve(ComparisonMode::Year, primary, None).unwrap();
        assert_eq!(previous, window(date!(2023 - 02 - 28), date!(2023 - 03 - 01)));
    }

    #[test]
    fn month_shift_handles_short_months() {
        let primary = window(date!(2024 - 03 - 31), date!(2024 - 04 - 30));
        let previous = resolve(ComparisonMode::Month, primary, None).unwrap();
        assert_eq!(previous, window(date!(2024 - 02 - 29), date!(2024 - 03 - 30)));

        let january = window(date!(2024 - 01 - 15), date!(2024 - 02 - 15));
        let previous = resolve(ComparisonMode::Month, january, None).unwrap();
        assert_eq!(previous, window(date!(2023 - 12 - 15), date!(2024 - 01 - 15)));
    }

    #[test]
    fn month_shift_keeps_duration_when_start_clamps() {
        let primary = window(date!(2024 - 03 - 30), date!(2024 - 03 - 31));
        let previous = resolve(ComparisonMode::Month, primary, None).unwrap();
        assert_eq!(previous, window(date!(2024 - 02 - 29), date!(2024 - 03 - 01)));
        assert_eq!(previous.duration(), primary.duration());
    }

    #[test]
    fn year_shift_keeps_duration_across_leap_february() {
        let primary = window(date!(2024 - 02 - 28), date!(2024 - 03 - 01));
        let previous = resolve(ComparisonMode::Year, primary, None).unwrap();
        assert_eq!(previous, window(date!(2023 - 02 - 28), date!(2023 - 03 - 02)));
        assert_eq!(previous.duration(), Duration::days(2));
    }

    #[test]
    fn week_shift_is_seven_days() {
        let primary = TimeRange::new(
            datetime!(2024 - 03 - 04 08:30),
            datetime!(2024 - 03 - 11 08:30),
        )
        .unwrap();
        let previous = resolve(ComparisonMode::Week, primary, None).unwrap();
        assert_eq!(previous.start, datetime!(2024 - 02 - 26 08:30));
        assert_eq!(previous.end, datetime!(2024 - 03 - 04 08:30));
    }

    #[test]
    fn range_precedes_primary_across_leap_day() {
        let primary = window(date!(2024 - 03 - 10), date!(2024 - 03 - 20));
        let previous = resolve(ComparisonMode::Range, primary, None).unwrap();
        assert_eq!(previous, window(date!(2024 - 02 - 29), date!(2024 - 03 - 10)));
        assert_eq!(previous.duration(), Duration::days(10));
        assert_eq!(previous.end, primary.start);
    }

    #[test]
    fn custom_requires_window() {
        let primary = window(date!(2024 - 03 - 10), date!(2024 - 03 - 20));
        assert_eq!(
            resolve(ComparisonMode::Custom, primary, None),
            Err(KpiError::UnresolvedCustomWindow)
        );

        let custom = window(date!(2023 - 11 - 01), date!(2023 - 11 - 11));
        assert_eq!(
            resolve(ComparisonMode::Custom, primary, Some(custom)),
            Ok(custom)
        );
    }

    #[test]
    fn custom_window_is_ignored_by_other_modes() {
        let primary = window(date!(2024 - 03 - 10), date!(2024 - 03 - 20));
        let custom = window(date!(2000 - 01 - 01), date!(2000 - 01 - 02));
        let previous = resolve(ComparisonMode::Range, primary, Some(custom)).unwrap();
        assert_ne!(previous, custom);
    }

    #[test]
    fn parses_host_range_syntax() {
        let range: TimeRange = "2024-01-01 : 2024-02-01T12:00:00".parse().unwrap();
        assert_eq!(range.start, datetime!(2024 - 01 - 01 0:00));
        assert_eq!(range.end, datetime!(2024 - 02 - 01 12:00));
        assert_eq!(range.to_string(), "2024-01-01T00:00:00 : 2024-02-01T12:00:00");
    }

    #[test]
    fn rejects_inverted_or_malformed_ranges() {
        assert!(matches!(
            TimeRange::parse("2024-02-01 : 2024-01-01"),
            Err(KpiError::InvalidTimeRange(_))
        ));
        assert!(matches!(
            TimeRange::parse("Last week"),
            Err(KpiError::InvalidTimeRange(_))
        ));
    }

    #[test]
    fn mode_codes_round_trip_through_serde() {
        for mode in ComparisonMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.code()));
            assert_eq!(mode.code().parse::<ComparisonMode>().unwrap(), mode);
        }
        assert_eq!("Month".parse::<ComparisonMode>().unwrap(), ComparisonMode::Month);
        let unknown = "q".parse::<ComparisonMode>();
        assert!(unknown.is_err());
    }
}
