//! Date-range filtering for the request history
//!
//! All parsing is timezone-free (`chrono::NaiveDate`). The comparison is the
//! fixed contract here: local-timezone parsing would shift entries across a
//! day boundary depending on where the server runs.

use crate::error::{ClientError, Result};
use crate::models::RequestLog;
use chrono::NaiveDate;

/// An optional inclusive date range, both bounds `YYYY-MM-DD`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parse from form input; empty strings mean "unbounded"
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_bound(start, "start date")?,
            end: parse_bound(end, "end date")?,
        })
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

fn parse_bound(value: &str, what: &str) -> Result<Option<NaiveDate>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            ClientError::Validation(format!(
                "Invalid {}: expected YYYY-MM-DD, got '{}'",
                what, value
            ))
        })
}

/// Parse a log's `thai_date`
///
/// The backend sends either `YYYY-MM-DD` or the long `%d %B %Y` form
/// depending on revision; try both.
pub fn parse_log_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d %B %Y"))
        .ok()
}

/// Filter request logs by an inclusive date range
///
/// If either bound is missing the list is returned unfiltered. Otherwise an
/// entry is kept iff its `thai_date` parses and falls within
/// `[start, end]`; unparseable dates are excluded from a bounded filter.
pub fn filter_logs(logs: &[RequestLog], range: &DateRange) -> Vec<RequestLog> {
    let (Some(start), Some(end)) = (range.start, range.end) else {
        return logs.to_vec();
    };
    logs.iter()
        .filter(|log| {
            parse_log_date(&log.thai_date)
                .map(|d| d >= start && d <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Validate picker constraints before a range is applied
///
/// The start must not pass the end, and the end must not pass `today`
/// (requests cannot exist in the future).
pub fn validate_range(range: &DateRange, today: NaiveDate) -> Result<()> {
    if let (Some(start), Some(end)) = (range.start, range.end) {
        if start > end {
            return Err(ClientError::Validation(
                "The start date must not be after the end date.".into(),
            ));
        }
    }
    if let Some(end) = range.end {
        if end > today {
            return Err(ClientError::Validation(
                "The end date must not be after today.".into(),
            ));
        }
    }
    Ok(())
}
