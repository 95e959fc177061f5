//! Embedded public-holiday schedule.
//!
//! Covers the officially published 2024–2025 arrangements, including the
//! compensatory workdays that move a weekend into the working week. Years
//! outside this table fall back to the weekend rule in the caller.

use chrono::{Datelike, NaiveDate};

struct Span {
    start: (i32, u32, u32),
    end: (i32, u32, u32),
    name: &'static str,
}

const HOLIDAYS: &[Span] = &[
    // 2024
    Span { start: (2024, 1, 1), end: (2024, 1, 1), name: "New Year's Day" },
    Span { start: (2024, 2, 10), end: (2024, 2, 17), name: "Spring Festival" },
    Span { start: (2024, 4, 4), end: (2024, 4, 6), name: "Qingming Festival" },
    Span { start: (2024, 5, 1), end: (2024, 5, 5), name: "Labour Day" },
    Span { start: (2024, 6, 8), end: (2024, 6, 10), name: "Dragon Boat Festival" },
    Span { start: (2024, 9, 15), end: (2024, 9, 17), name: "Mid-Autumn Festival" },
    Span { start: (2024, 10, 1), end: (2024, 10, 7), name: "National Day" },
    // 2025
    Span { start: (2025, 1, 1), end: (2025, 1, 1), name: "New Year's Day" },
    Span { start: (2025, 1, 28), end: (2025, 2, 4), name: "Spring Festival" },
    Span { start: (2025, 4, 4), end: (2025, 4, 6), name: "Qingming Festival" },
    Span { start: (2025, 5, 1), end: (2025, 5, 5), name: "Labour Day" },
    Span { start: (2025, 5, 31), end: (2025, 6, 2), name: "Dragon Boat Festival" },
    Span { start: (2025, 10, 1), end: (2025, 10, 8), name: "National Day" },
];

/// Weekend days worked in exchange for an adjacent long holiday.
const MAKEUP_WORKDAYS: &[(i32, u32, u32)] = &[
    (2024, 2, 4),
    (2024, 2, 18),
    (2024, 4, 7),
    (2024, 4, 28),
    (2024, 5, 11),
    (2024, 9, 14),
    (2024, 9, 29),
    (2024, 10, 12),
    (2025, 1, 26),
    (2025, 2, 8),
    (2025, 4, 27),
    (2025, 9, 28),
    (2025, 10, 11),
];

/// Whether the table has data for this year.
pub(crate) fn covers(year: i32) -> bool {
    (2024..=2025).contains(&year)
}

pub(crate) fn holiday_name(date: NaiveDate) -> Option<&'static str> {
    let key = (date.year(), date.month(), date.day());
    HOLIDAYS
        .iter()
        .find(|span| span.start <= key && key <= span.end)
        .map(|span| span.name)
}

pub(crate) fn is_makeup_workday(date: NaiveDate) -> bool {
    MAKEUP_WORKDAYS.contains(&(date.year(), date.month(), date.day()))
}
