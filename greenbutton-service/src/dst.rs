//! Decoding of ESPI packed daylight-saving rules.
//!
//! A rule is a 32-bit value laid out as:
//!
//! | bits  | field        | range                          |
//! |-------|--------------|--------------------------------|
//! | 0-11  | seconds      | 0-3599                         |
//! | 12-16 | hours        | 0-23                           |
//! | 17-19 | day of week  | 0 = n/a, 1-7 (Monday = 1)      |
//! | 20-24 | day of month | 0 = n/a, 1-31                  |
//! | 25-27 | operator     | 0-7                            |
//! | 28-31 | month        | 1-12                           |
//!
//! Operators: 0 exact day of month; 1 first day of week on or after the day
//! of month; 2-6 first to fifth day of week in the month; 7 last day of week
//! in the month. `0xFFFFFFFF` disables the rule.

use greenbutton_model::DstRuleValue;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::bits::extract_bits;

pub const DST_RULE_DISABLED: u32 = 0xFFFF_FFFF;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DstRuleError {
    #[error("{field} should be from {min} - {max}, got {value}")]
    FieldOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("day of month must be provided for operator {0}")]
    MissingDayOfMonth(u8),
    #[error("day of week must be provided for operator {0}")]
    MissingDayOfWeek(u8),
    #[error("DST rule '{0}' is not a hexadecimal u32")]
    InvalidHex(String),
    #[error("no date in {year} matches the DST rule")]
    NoMatchingDate { year: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstRule {
    pub seconds: u16,
    pub hours: u8,
    pub day_of_week: u8,
    pub day_of_month: u8,
    pub operator: u8,
    pub month: Month,
}

fn field(raw: u32, name: &'static str, from: u32, to: u32, min: u32, max: u32) -> Result<u32, DstRuleError> {
    let value = extract_bits(raw, from, to);
    if value < min || value > max {
        return Err(DstRuleError::FieldOutOfRange {
            field: name,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

impl DstRule {
    /// Decodes a packed rule. `Ok(None)` means the rule is disabled.
    pub fn decode(raw: u32) -> Result<Option<Self>, DstRuleError> {
        if raw == DST_RULE_DISABLED {
            return Ok(None);
        }

        let seconds = field(raw, "seconds", 0, 11, 0, 3599)?;
        let hours = field(raw, "hours", 12, 16, 0, 23)?;
        let day_of_week = field(raw, "day_of_week", 17, 19, 0, 7)?;
        let day_of_month = field(raw, "day_of_month", 20, 24, 0, 31)?;
        let operator = field(raw, "operator", 25, 27, 0, 7)?;
        let month = field(raw, "month", 28, 31, 1, 12)?;

        // Ranges above keep every narrowing cast lossless.
        let month = Month::try_from(month as u8).map_err(|_| DstRuleError::FieldOutOfRange {
            field: "month",
            value: month,
            min: 1,
            max: 12,
        })?;

        Ok(Some(Self {
            seconds: seconds as u16,
            hours: hours as u8,
            day_of_week: day_of_week as u8,
            day_of_month: day_of_month as u8,
            operator: operator as u8,
            month,
        }))
    }

    /// Decodes a rule written as hex text, with or without a `0x` prefix.
    pub fn parse_hex(text: &str) -> Result<Option<Self>, DstRuleError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let raw = u32::from_str_radix(digits, 16).map_err(|_| DstRuleError::InvalidHex(text.to_string()))?;
        Self::decode(raw)
    }

    pub fn from_value(value: &DstRuleValue) -> Result<Option<Self>, DstRuleError> {
        match value {
            DstRuleValue::Packed(raw) => Self::decode(*raw),
            DstRuleValue::Hex(text) => Self::parse_hex(text),
        }
    }

    fn matches_weekday(&self, date: Date) -> bool {
        date.weekday().number_from_monday() == self.day_of_week
    }

    /// The calendar date the rule fires on in `year`.
    pub fn date_in(&self, year: i32) -> Result<Date, DstRuleError> {
        let no_match = DstRuleError::NoMatchingDate { year };

        match self.operator {
            0 => {
                if self.day_of_month == 0 {
                    return Err(DstRuleError::MissingDayOfMonth(0));
                }
                Date::from_calendar_date(year, self.month, self.day_of_month).map_err(|_| no_match)
            }
            1 => {
                if self.day_of_month == 0 {
                    return Err(DstRuleError::MissingDayOfMonth(1));
                }
                if self.day_of_week == 0 {
                    return Err(DstRuleError::MissingDayOfWeek(1));
                }
                let mut date =
                    Date::from_calendar_date(year, self.month, self.day_of_month).map_err(|_| no_match.clone())?;
                // May spill into the following month, but never into the next year.
                for _ in 0..7 {
                    if self.matches_weekday(date) {
                        return Ok(date);
                    }
                    date = match date.next_day() {
                        Some(next) if next.year() == year => next,
                        _ => break,
                    };
                }
                Err(no_match)
            }
            op => {
                if self.day_of_week == 0 {
                    return Err(DstRuleError::MissingDayOfWeek(op));
                }
                let days_in_month = time::util::days_in_year_month(year, self.month);
                let dow = self.day_of_week;

                let day = if op == 7 {
                    let last = Date::from_calendar_date(year, self.month, days_in_month).map_err(|_| no_match.clone())?;
                    let back = (last.weekday().number_from_monday() + 7 - dow) % 7;
                    days_in_month - back
                } else {
                    let first = Date::from_calendar_date(year, self.month, 1).map_err(|_| no_match.clone())?;
                    let ahead = (dow + 7 - first.weekday().number_from_monday()) % 7;
                    let nth = op - 1;
                    1 + ahead + 7 * (nth - 1)
                };

                if day == 0 || day > days_in_month {
                    return Err(no_match);
                }
                Date::from_calendar_date(year, self.month, day).map_err(|_| no_match)
            }
        }
    }

    /// The instant the rule fires in `year`: the matching date at midnight
    /// UTC plus the rule's hours and seconds.
    pub fn instant_in(&self, year: i32) -> Result<OffsetDateTime, DstRuleError> {
        let date = self.date_in(year)?;
        let offset = i64::from(self.hours) * 3600 + i64::from(self.seconds);
        Ok(date.midnight().assume_utc() + Duration::seconds(offset))
    }
}

/// Resolves a feed rule value to its transition instant in `year`.
/// `Ok(None)` when the rule is disabled.
pub fn transition_instant(value: &DstRuleValue, year: i32) -> Result<Option<OffsetDateTime>, DstRuleError> {
    match DstRule::from_value(value)? {
        Some(rule) => rule.instant_in(year).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    // Third Friday in March at 01:45 (seconds 2700, hours 1).
    const THIRD_FRIDAY_MARCH: u32 = 0x380A_1A8C;
    // First Sunday on or after March 8 at 02:00.
    const SUNDAY_AFTER_MARCH_8: u32 = 0x328E_2000;
    // Last Sunday in October at 01:00.
    const LAST_SUNDAY_OCTOBER: u32 = 0xAE0E_1000;

    #[test]
    fn decodes_documented_example_fields() {
        let rule = DstRule::decode(THIRD_FRIDAY_MARCH).unwrap().unwrap();
        assert_eq!(rule.seconds, 2700);
        assert_eq!(rule.hours, 1);
        assert_eq!(rule.day_of_week, 5);
        assert_eq!(rule.day_of_month, 0);
        assert_eq!(rule.operator, 4);
        assert_eq!(rule.month, Month::March);
    }

    #[test]
    fn documented_example_fires_third_friday_at_0145() {
        let rule = DstRule::decode(THIRD_FRIDAY_MARCH).unwrap().unwrap();
        assert_eq!(rule.instant_in(2024).unwrap(), datetime!(2024-03-15 01:45:00 UTC));
        assert_eq!(rule.instant_in(2025).unwrap(), datetime!(2025-03-21 01:45:00 UTC));
    }

    #[test]
    fn disabled_sentinel_yields_no_rule() {
        assert_eq!(DstRule::decode(DST_RULE_DISABLED), Ok(None));
        assert_eq!(DstRule::parse_hex("FFFFFFFF"), Ok(None));
        assert_eq!(transition_instant(&DstRuleValue::Packed(DST_RULE_DISABLED), 2024), Ok(None));
    }

    #[test]
    fn hex_text_with_and_without_prefix() {
        let plain = DstRule::parse_hex("380A1A8C").unwrap();
        let prefixed = DstRule::parse_hex("0x380a1a8c").unwrap();
        assert_eq!(plain, prefixed);
        assert_eq!(plain, DstRule::decode(THIRD_FRIDAY_MARCH).unwrap());
        assert!(matches!(DstRule::parse_hex("not-hex"), Err(DstRuleError::InvalidHex(_))));
    }

    #[test]
    fn on_or_after_operator_finds_next_weekday() {
        let rule = DstRule::decode(SUNDAY_AFTER_MARCH_8).unwrap().unwrap();
        assert_eq!(rule.date_in(2024).unwrap(), date!(2024-03-10));
        assert_eq!(rule.instant_in(2024).unwrap(), datetime!(2024-03-10 02:00:00 UTC));
    }

    #[test]
    fn on_or_after_operator_spills_into_next_month() {
        // Wednesday on or after April 30 2024 (a Tuesday) is May 1.
        let rule = DstRule {
            seconds: 0,
            hours: 0,
            day_of_week: 3,
            day_of_month: 30,
            operator: 1,
            month: Month::April,
        };
        assert_eq!(rule.date_in(2024).unwrap(), date!(2024-05-01));
    }

    #[test]
    fn on_or_after_operator_does_not_spill_out_of_december() {
        // Wednesday on or after December 30 2024 would be January 1 2025.
        let rule = DstRule::decode(0xC3E6_0000).unwrap().unwrap();
        assert_eq!(rule.date_in(2024), Err(DstRuleError::NoMatchingDate { year: 2024 }));
    }

    #[test]
    fn last_occurrence_operator() {
        let rule = DstRule::decode(LAST_SUNDAY_OCTOBER).unwrap().unwrap();
        assert_eq!(rule.instant_in(2024).unwrap(), datetime!(2024-10-27 01:00:00 UTC));
        assert_eq!(rule.date_in(2025).unwrap(), date!(2025-10-26));
    }

    #[test]
    fn nth_occurrence_operators_in_one_month() {
        // Sundays in June 2024: 2, 9, 16, 23, 30.
        let cases = [(2, 2), (3, 9), (4, 16), (5, 23), (6, 30), (7, 30)];
        for (operator, day) in cases {
            let rule = DstRule {
                seconds: 0,
                hours: 2,
                day_of_week: 7,
                day_of_month: 0,
                operator,
                month: Month::June,
            };
            assert_eq!(
                rule.date_in(2024).unwrap(),
                Date::from_calendar_date(2024, Month::June, day).unwrap(),
                "operator {operator}"
            );
        }

        // Fourth Sunday in June, packed.
        let rule = DstRule::decode(0x6A0E_0000).unwrap().unwrap();
        assert_eq!(rule.operator, 5);
        assert_eq!(rule.instant_in(2024).unwrap(), datetime!(2024-06-23 00:00:00 UTC));
    }

    #[test]
    fn fifth_occurrence_missing_is_an_error() {
        // Fifth Friday of February 2024 does not exist.
        let rule = DstRule::decode(0x2C0A_0000).unwrap().unwrap();
        assert_eq!(rule.operator, 6);
        assert_eq!(rule.date_in(2024), Err(DstRuleError::NoMatchingDate { year: 2024 }));
    }

    #[test]
    fn exact_day_operator_requires_day_of_month() {
        let rule = DstRule::decode(0x3000_0000).unwrap().unwrap();
        assert_eq!(rule.date_in(2024), Err(DstRuleError::MissingDayOfMonth(0)));

        let rule = DstRule::decode(0x30F0_0000).unwrap().unwrap();
        assert_eq!(rule.date_in(2024).unwrap(), date!(2024-03-15));
    }

    #[test]
    fn exact_day_operator_rejects_impossible_dates() {
        // February 30.
        let rule = DstRule::decode(0x21E0_0000).unwrap().unwrap();
        assert_eq!(rule.day_of_month, 30);
        assert_eq!(rule.date_in(2024), Err(DstRuleError::NoMatchingDate { year: 2024 }));
    }

    #[test]
    fn weekday_operators_require_day_of_week() {
        let rule = DstRule::decode(0x3800_0000).unwrap().unwrap();
        assert_eq!(rule.date_in(2024), Err(DstRuleError::MissingDayOfWeek(4)));

        let rule = DstRule::decode(0x3280_0000).unwrap().unwrap();
        assert_eq!(rule.date_in(2024), Err(DstRuleError::MissingDayOfWeek(1)));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        assert!(matches!(
            DstRule::decode(0x3000_0E10),
            Err(DstRuleError::FieldOutOfRange { field: "seconds", value: 3600, .. })
        ));
        assert!(matches!(
            DstRule::decode(0x3001_8000),
            Err(DstRuleError::FieldOutOfRange { field: "hours", value: 24, .. })
        ));
        assert!(matches!(
            DstRule::decode(0x0000_0000),
            Err(DstRuleError::FieldOutOfRange { field: "month", value: 0, .. })
        ));
        assert!(matches!(
            DstRule::decode(0xD000_0000),
            Err(DstRuleError::FieldOutOfRange { field: "month", value: 13, .. })
        ));
    }
}
