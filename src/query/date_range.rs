//! Relative date phrases resolved against a reference day

use chrono::{Duration, NaiveDate};

/// Longest span accepted by "last N days"
const MAX_DAYS: i64 = 3660;

/// Half-open range of calendar days, `from` inclusive and `to` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Parse a phrase such as "today", "yesterday", "last week" or
/// "last 30 days". Returns `None` for anything unrecognised.
pub fn parse_date_filter(phrase: &str, today: NaiveDate) -> Option<DateRange> {
    let lowered = phrase.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let (from, to) = match words.as_slice() {
        ["today"] => (today, today.checked_add_signed(Duration::days(1))?),
        ["yesterday"] => (days_before(today, 1)?, today),
        ["last", "week"] => (days_before(today, 7)?, today),
        ["last", "month"] => (days_before(today, 30)?, today),
        ["last", n, "day" | "days"] => {
            let days: i64 = n.parse().ok()?;
            if days <= 0 || days > MAX_DAYS {
                return None;
            }
            (days_before(today, days)?, today)
        }
        _ => return None,
    };

    Some(DateRange { from, to })
}

fn days_before(today: NaiveDate, days: i64) -> Option<NaiveDate> {
    today.checked_sub_signed(Duration::days(days))
}
