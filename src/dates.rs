//! Expiry date resolution
//!
//! Turns explicit or relative date phrases into calendar dates, and only
//! when the surrounding text frames them as an expiry. Dates appearing
//! without an expiry keyword are deliberately ignored; a wrong expiry is
//! worse than a missing one.

use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Field order for numeric dates where both fields could be a month.
/// The auto-swap heuristic (one field exceeding 12) applies on top of
/// either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    DayFirst,
    MonthFirst,
}

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

fn month_index(name: &str) -> Option<u32> {
    MONTH_NAMES.iter().find(|(n, _)| *n == name).map(|(_, m)| *m)
}

fn month_pattern() -> String {
    let mut names: Vec<&str> = MONTH_NAMES.iter().map(|(n, _)| *n).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    names.join("|")
}

static EXPIRY_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:expiry|expires?|expiring|valid\s+(?:until|till)|use\s+by|best\s+before|good\s+(?:until|till)|sell\s+by)\b",
    )
    .expect("Invalid regex pattern")
});

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/.-](\d{1,2})(?:[/.-](\d{2,4}))?\b").expect("Invalid regex pattern")
});

static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({})(?:\s+(\d{{4}}))?\b",
        month_pattern()
    ))
    .expect("Invalid regex pattern")
});

static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({})\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:\s+(\d{{4}}))?\b",
        month_pattern()
    ))
    .expect("Invalid regex pattern")
});

static DAY_AFTER_TOMORROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bday\s+after\s+tomorrow\b").expect("Invalid regex pattern"));

static IN_N_UNITS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+(\d+)\s+(day|week|month|year)s?\b").expect("Invalid regex pattern")
});

static N_UNITS_FROM_NOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+)\s+(day|week|month|year)s?\s+from\s+(?:now|today)\b")
        .expect("Invalid regex pattern")
});

static NEXT_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bnext\s+({})\b", WEEKDAYS.join("|"))).expect("Invalid regex pattern")
});

static NEXT_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(next|this)\s+(week|month|year)\b").expect("Invalid regex pattern")
});

/// Resolves expiry phrases against a caller-supplied reference date.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpiryResolver {
    order: DateOrder,
}

impl ExpiryResolver {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    /// Resolve an expiry date from `text`, anchored at `today`. Returns
    /// `None` unless the text frames a date as an expiry, and `None` for
    /// invalid calendar dates rather than guessing.
    pub fn resolve(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        if !EXPIRY_CONTEXT.is_match(text) {
            return None;
        }
        self.explicit_date(text, today)
            .or_else(|| relative_date(text, today))
    }

    fn explicit_date(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        if let Some(cap) = NUMERIC_DATE.captures(text) {
            return self.numeric_date(&cap, today);
        }
        if let Some(cap) = DAY_MONTH.captures(text) {
            let day: u32 = cap[1].parse().ok()?;
            let month = month_index(&cap[2])?;
            let year = cap.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
            return named_month_date(day, month, year, today);
        }
        if let Some(cap) = MONTH_DAY.captures(text) {
            let month = month_index(&cap[1])?;
            let day: u32 = cap[2].parse().ok()?;
            let year = cap.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
            return named_month_date(day, month, year, today);
        }
        None
    }

    fn numeric_date(&self, cap: &regex::Captures, today: NaiveDate) -> Option<NaiveDate> {
        let a: u32 = cap[1].parse().ok()?;
        let b: u32 = cap[2].parse().ok()?;
        let (day, month) = match self.order {
            DateOrder::DayFirst => {
                if b > 12 && a <= 12 {
                    (b, a)
                } else {
                    (a, b)
                }
            }
            DateOrder::MonthFirst => {
                if a > 12 && b <= 12 {
                    (a, b)
                } else {
                    (b, a)
                }
            }
        };
        match cap.get(3) {
            Some(y) => {
                let y: i32 = y.as_str().parse().ok()?;
                let y = if y < 100 { y + 2000 } else { y };
                NaiveDate::from_ymd_opt(y, month, day)
            }
            None => named_month_date(day, month, None, today),
        }
    }
}

/// A date with a named or inferred month. A missing year means the current
/// year, or the next one when the named month has already passed.
fn named_month_date(day: u32, month: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(y) => NaiveDate::from_ymd_opt(y, month, day),
        None => {
            let mut y = today.year();
            if month < today.month() {
                y += 1;
            }
            NaiveDate::from_ymd_opt(y, month, day)
        }
    }
}

fn relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if DAY_AFTER_TOMORROW.is_match(text) {
        return today.checked_add_days(Days::new(2));
    }
    if contains_word(text, "tomorrow") {
        return today.checked_add_days(Days::new(1));
    }
    if let Some(cap) = IN_N_UNITS
        .captures(text)
        .or_else(|| N_UNITS_FROM_NOW.captures(text))
    {
        let n: u32 = cap[1].parse().ok()?;
        return add_period(today, &cap[2], n);
    }
    if let Some(cap) = NEXT_WEEKDAY.captures(text) {
        let target = WEEKDAYS.iter().position(|d| *d == &cap[1])? as u32;
        let current = today.weekday().num_days_from_monday();
        let mut ahead = (target + 7 - current) % 7;
        if ahead == 0 {
            ahead = 7;
        }
        return today.checked_add_days(Days::new(ahead as u64));
    }
    if let Some(cap) = NEXT_PERIOD.captures(text) {
        let next = &cap[1] == "next";
        return match (&cap[2], next) {
            ("week", true) => today.checked_add_days(Days::new(7)),
            ("week", false) => end_of_week(today),
            ("month", true) => today.checked_add_months(Months::new(1)),
            ("month", false) => end_of_month(today),
            ("year", true) => today.checked_add_months(Months::new(12)),
            ("year", false) => NaiveDate::from_ymd_opt(today.year(), 12, 31),
            _ => None,
        };
    }
    if contains_word(text, "today") || contains_word(text, "tonight") {
        return Some(today);
    }
    None
}

fn add_period(date: NaiveDate, unit: &str, n: u32) -> Option<NaiveDate> {
    match unit {
        "day" => date.checked_add_days(Days::new(n as u64)),
        "week" => date.checked_add_days(Days::new(n as u64 * 7)),
        "month" => date.checked_add_months(Months::new(n)),
        "year" => date.checked_add_months(Months::new(n.checked_mul(12)?)),
        _ => None,
    }
}

fn end_of_week(date: NaiveDate) -> Option<NaiveDate> {
    let remaining = 6 - date.weekday().num_days_from_monday();
    date.checked_add_days(Days::new(remaining as u64))
}

fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split_whitespace().any(|t| t == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-03-10 is a Monday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_expiry_keyword_means_no_date() {
        let resolver = ExpiryResolver::default();
        assert_eq!(resolver.resolve("add rice 12/5/2026", today()), None);
        assert_eq!(resolver.resolve("delivered on 15 march", today()), None);
    }

    #[test]
    fn test_numeric_date_day_first() {
        let resolver = ExpiryResolver::new(DateOrder::DayFirst);
        assert_eq!(
            resolver.resolve("expiry 12/5/2026", today()),
            Some(date(2026, 5, 12))
        );
        assert_eq!(
            resolver.resolve("expiry 12-5-26", today()),
            Some(date(2026, 5, 12))
        );
    }

    #[test]
    fn test_numeric_date_month_first() {
        let resolver = ExpiryResolver::new(DateOrder::MonthFirst);
        assert_eq!(
            resolver.resolve("expiry 5/12/2026", today()),
            Some(date(2026, 5, 12))
        );
    }

    #[test]
    fn test_auto_swap() {
        let day_first = ExpiryResolver::new(DateOrder::DayFirst);
        assert_eq!(
            day_first.resolve("expiry 3/15/2026", today()),
            Some(date(2026, 3, 15))
        );
        let month_first = ExpiryResolver::new(DateOrder::MonthFirst);
        assert_eq!(
            month_first.resolve("expiry 15/3/2026", today()),
            Some(date(2026, 3, 15))
        );
    }

    #[test]
    fn test_invalid_date_rejected() {
        let resolver = ExpiryResolver::default();
        assert_eq!(resolver.resolve("expiry 32/13/2026", today()), None);
        assert_eq!(resolver.resolve("expiry 30/2/2026", today()), None);
    }

    #[test]
    fn test_day_month_name() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("expires 15 march", today()),
            Some(date(2025, 3, 15))
        );
        assert_eq!(
            resolver.resolve("expires 15th march 2026", today()),
            Some(date(2026, 3, 15))
        );
    }

    #[test]
    fn test_month_day_name() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("best before march 15 2026", today()),
            Some(date(2026, 3, 15))
        );
    }

    #[test]
    fn test_passed_month_rolls_to_next_year() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("expires 15 january", today()),
            Some(date(2026, 1, 15))
        );
    }

    #[test]
    fn test_tomorrow_and_today() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("expiry tomorrow", today()),
            Some(date(2025, 3, 11))
        );
        assert_eq!(
            resolver.resolve("expiry day after tomorrow", today()),
            Some(date(2025, 3, 12))
        );
        assert_eq!(resolver.resolve("expires today", today()), Some(today()));
    }

    #[test]
    fn test_in_n_units() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("use by in 10 days", today()),
            Some(date(2025, 3, 20))
        );
        assert_eq!(
            resolver.resolve("expiry in 2 weeks", today()),
            Some(date(2025, 3, 24))
        );
        assert_eq!(
            resolver.resolve("expiry 2 months from now", today()),
            Some(date(2025, 5, 10))
        );
    }

    #[test]
    fn test_month_addition_clamps_day() {
        let resolver = ExpiryResolver::default();
        let end_of_jan = date(2025, 1, 31);
        assert_eq!(
            resolver.resolve("expiry in 1 month", end_of_jan),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn test_next_weekday() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("sell by next friday", today()),
            Some(date(2025, 3, 14))
        );
        // "next monday" on a Monday wraps a full week
        assert_eq!(
            resolver.resolve("expiry next monday", today()),
            Some(date(2025, 3, 17))
        );
    }

    #[test]
    fn test_next_and_this_periods() {
        let resolver = ExpiryResolver::default();
        assert_eq!(
            resolver.resolve("valid until next week", today()),
            Some(date(2025, 3, 17))
        );
        assert_eq!(
            resolver.resolve("good till this week", today()),
            Some(date(2025, 3, 16))
        );
        assert_eq!(
            resolver.resolve("expiry this month", today()),
            Some(date(2025, 3, 31))
        );
        assert_eq!(
            resolver.resolve("expiry next year", today()),
            Some(date(2026, 3, 10))
        );
    }
}
