use crate::error::{Error, Result};
use crate::model::PlayHistory;
use time::Date;
use time::macros::format_description;

const DATE_PREFIX_LEN: usize = 10;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|source| {
        Error::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Date portion of an export timestamp such as `2025-01-15T10:00:00Z`.
pub fn timestamp_date(timestamp: &str) -> Result<Date> {
    let prefix = timestamp
        .get(..DATE_PREFIX_LEN)
        .ok_or_else(|| Error::InvalidTimestamp(timestamp.to_string()))?;
    parse_date(prefix).map_err(|_| Error::InvalidTimestamp(timestamp.to_string()))
}

fn check_bounds(start: Date, end: Date) -> Result<()> {
    if start > end {
        return Err(Error::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Every calendar day from `start` through `end`, inclusive.
pub fn build_date_range(start: Date, end: Date) -> Result<Vec<Date>> {
    check_bounds(start, end)?;

    let mut days = Vec::with_capacity((end - start).whole_days() as usize + 1);
    let mut day = start;
    loop {
        days.push(day);
        if day == end {
            break;
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    Ok(days)
}

impl PlayHistory {
    /// Events whose play date falls on a day in `start..=end`, in their
    /// original order.
    pub fn filter_by_date_range(&self, start: Date, end: Date) -> Result<PlayHistory> {
        check_bounds(start, end)?;

        let mut kept = Vec::new();
        for event in self {
            let date = event.date()?;
            if start <= date && date <= end {
                kept.push(event.clone());
            }
        }
        Ok(PlayHistory::new(kept))
    }
}
