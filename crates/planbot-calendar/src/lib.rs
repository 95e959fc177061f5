//! # Planbot Calendar
//!
//! Classifies dates as workday or holiday and expands date ranges. Pure
//! functions of the date — no I/O, no locking, safe to call from any thread.

mod holidays;

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

/// Holiday data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarMode {
    /// Embedded official-holiday table; weekend rule outside its coverage.
    Official,
    /// Weekends only — the fallback when rich holiday data is disabled.
    WeekendOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    mode: CalendarMode,
}

impl Calendar {
    pub fn new(mode: CalendarMode) -> Self {
        Self { mode }
    }

    /// True unless the date is a weekend or a recognized public holiday.
    /// Compensatory workdays on weekends count as workdays.
    pub fn is_workday(&self, date: NaiveDate) -> bool {
        if self.mode == CalendarMode::Official && holidays::covers(date.year()) {
            if holidays::holiday_name(date).is_some() {
                return false;
            }
            if holidays::is_makeup_workday(date) {
                return true;
            }
        }
        !is_weekend(date)
    }

    /// Human-readable reason a date is off ("Weekend" or the holiday name);
    /// `None` for workdays.
    pub fn holiday_label(&self, date: NaiveDate) -> Option<String> {
        if self.is_workday(date) {
            return None;
        }
        if self.mode == CalendarMode::Official
            && let Some(name) = holidays::holiday_name(date)
        {
            return Some(name.to_string());
        }
        Some("Weekend".to_string())
    }

    /// Every workday in `[start, end]`, ascending.
    pub fn workdays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        dates_in_range(start, end)
            .filter(|d| self.is_workday(*d))
            .collect()
    }

    /// Every non-workday in `[start, end]` with its label.
    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> BTreeMap<NaiveDate, String> {
        dates_in_range(start, end)
            .filter_map(|d| self.holiday_label(d).map(|label| (d, label)))
            .collect()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn dates_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn plain_weekday_is_workday() {
        let cal = Calendar::new(CalendarMode::Official);
        // 2025-06-03 is a Tuesday with no holiday nearby.
        assert!(cal.is_workday(d(2025, 6, 3)));
        assert_eq!(cal.holiday_label(d(2025, 6, 3)), None);
    }

    #[test]
    fn national_day_is_labeled() {
        let cal = Calendar::new(CalendarMode::Official);
        assert!(!cal.is_workday(d(2025, 10, 1)));
        assert_eq!(cal.holiday_label(d(2025, 10, 1)).as_deref(), Some("National Day"));
    }

    #[test]
    fn makeup_sunday_counts_as_workday() {
        let cal = Calendar::new(CalendarMode::Official);
        // 2025-09-28 is a Sunday worked in exchange for the October break.
        assert!(cal.is_workday(d(2025, 9, 28)));
        assert_eq!(cal.holiday_label(d(2025, 9, 28)), None);
    }

    #[test]
    fn weekend_only_mode_ignores_holidays() {
        let cal = Calendar::new(CalendarMode::WeekendOnly);
        // National Day 2025 falls on a Wednesday.
        assert!(cal.is_workday(d(2025, 10, 1)));
        assert!(!cal.is_workday(d(2025, 10, 4)));
        assert_eq!(cal.holiday_label(d(2025, 10, 4)).as_deref(), Some("Weekend"));
    }

    #[test]
    fn uncovered_year_falls_back_to_weekend_rule() {
        let cal = Calendar::new(CalendarMode::Official);
        // 2026-01-01 is a Thursday; without table data it counts as a workday.
        assert!(cal.is_workday(d(2026, 1, 1)));
        assert_eq!(cal.holiday_label(d(2026, 1, 3)).as_deref(), Some("Weekend"));
    }

    #[test]
    fn label_and_is_workday_are_consistent() {
        for mode in [CalendarMode::Official, CalendarMode::WeekendOnly] {
            let cal = Calendar::new(mode);
            let mut date = d(2024, 1, 1);
            let end = d(2025, 12, 31);
            while date <= end {
                assert_eq!(
                    cal.holiday_label(date).is_some(),
                    !cal.is_workday(date),
                    "inconsistent classification for {date} ({mode:?})"
                );
                date = date.succ_opt().unwrap();
            }
        }
    }

    #[test]
    fn workdays_in_range_matches_filter() {
        let cal = Calendar::new(CalendarMode::Official);
        let start = d(2025, 4, 28);
        let end = d(2025, 5, 12);
        let workdays = cal.workdays_in_range(start, end);
        assert!(workdays.windows(2).all(|w| w[0] < w[1]));
        assert!(workdays.iter().all(|d| cal.is_workday(*d)));
        // Labour Day break May 1–5 is fully excluded.
        assert!(!workdays.contains(&d(2025, 5, 1)));
        assert!(!workdays.contains(&d(2025, 5, 5)));
        assert!(workdays.contains(&d(2025, 5, 6)));
    }

    #[test]
    fn holidays_in_range_collects_labels() {
        let cal = Calendar::new(CalendarMode::Official);
        let holidays = cal.holidays_in_range(d(2025, 9, 29), d(2025, 10, 12));
        assert_eq!(holidays.get(&d(2025, 10, 1)).map(String::as_str), Some("National Day"));
        assert_eq!(holidays.get(&d(2025, 10, 8)).map(String::as_str), Some("National Day"));
        // Makeup Saturday is a workday, so it is absent.
        assert!(!holidays.contains_key(&d(2025, 10, 11)));
        assert_eq!(holidays.get(&d(2025, 10, 12)).map(String::as_str), Some("Weekend"));
    }
}
