//! Cron Schedule Validation
//!
//! Checks that a schedule is a five-field cron expression:
//!
//! ```text
//! ┌──────── minute        (0-59)
//! │ ┌────── hour          (0-23)
//! │ │ ┌──── day of month  (1-31)
//! │ │ │ ┌── month         (1-12)
//! │ │ │ │ ┌ day of week   (0-6, Sunday = 0)
//! * * * * *
//! ```
//!
//! Each field is a comma-separated list of items; an item is `*`, a
//! value, or a `start-end` range, optionally followed by `/step`.

use std::fmt;

use thiserror::Error;

/// Position of a field within the expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronPosition {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl CronPosition {
    const ALL: [CronPosition; 5] = [
        CronPosition::Minute,
        CronPosition::Hour,
        CronPosition::DayOfMonth,
        CronPosition::Month,
        CronPosition::DayOfWeek,
    ];

    /// Inclusive value bounds for this position.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            CronPosition::Minute => (0, 59),
            CronPosition::Hour => (0, 23),
            CronPosition::DayOfMonth => (1, 31),
            CronPosition::Month => (1, 12),
            CronPosition::DayOfWeek => (0, 6),
        }
    }
}

impl fmt::Display for CronPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CronPosition::Minute => "minute",
            CronPosition::Hour => "hour",
            CronPosition::DayOfMonth => "day-of-month",
            CronPosition::Month => "month",
            CronPosition::DayOfWeek => "day-of-week",
        };
        f.write_str(name)
    }
}

/// Why a schedule was rejected.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CronError {
    #[error("Invalid cron expression: expected 5 fields, found {0}")]
    FieldCount(usize),

    #[error("Invalid cron expression: {position} field '{value}' {reason}")]
    InvalidField {
        position: CronPosition,
        value: String,
        reason: String,
    },
}

/// Validates a five-field cron expression.
///
/// # Example
///
/// ```
/// use jobflow::validation::validate_cron;
///
/// assert!(validate_cron("*/15 9-17 * * 1-5").is_ok());
/// assert!(validate_cron("99 * * * *").is_err());
/// ```
pub fn validate_cron(expression: &str) -> Result<(), CronError> {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != CronPosition::ALL.len() {
        return Err(CronError::FieldCount(fields.len()));
    }

    for (raw, position) in fields.into_iter().zip(CronPosition::ALL) {
        validate_field(raw, position).map_err(|reason| CronError::InvalidField {
            position,
            value: raw.to_string(),
            reason,
        })?;
    }

    Ok(())
}

fn validate_field(raw: &str, position: CronPosition) -> Result<(), String> {
    for item in raw.split(',') {
        if item.is_empty() {
            return Err("has an empty list item".to_string());
        }
        validate_item(item, position)?;
    }
    Ok(())
}

fn validate_item(item: &str, position: CronPosition) -> Result<(), String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step)),
        None => (item, None),
    };

    if let Some(step) = step {
        let step: u32 = step
            .parse()
            .map_err(|_| format!("has an invalid step '{}'", step))?;
        if step == 0 {
            return Err("has a step of zero".to_string());
        }
    }

    if range == "*" {
        return Ok(());
    }

    match range.split_once('-') {
        Some((start, end)) => {
            let start = parse_value(start, position)?;
            let end = parse_value(end, position)?;
            if start > end {
                return Err(format!("has a reversed range {}-{}", start, end));
            }
            Ok(())
        }
        None => parse_value(range, position).map(|_| ()),
    }
}

fn parse_value(raw: &str, position: CronPosition) -> Result<u32, String> {
    let (min, max) = position.bounds();

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("has a non-numeric value '{}'", raw));
    }

    let value: u32 = raw
        .parse()
        .map_err(|_| format!("has an invalid value '{}'", raw))?;

    if value < min || value > max {
        return Err(format!("is out of range ({}-{})", min, max));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_minute() {
        assert!(validate_cron("* * * * *").is_ok());
    }

    #[test]
    fn test_common_schedules() {
        for expr in [
            "0 0 * * *",
            "*/5 * * * *",
            "0 9-17 * * 1-5",
            "15,45 */2 1 1,6,12 0",
            "0-30/10 0 1-31 * 6",
            "  0   12 * * *  ",
        ] {
            assert!(validate_cron(expr).is_ok(), "expected valid: {}", expr);
        }
    }

    #[test]
    fn test_minute_out_of_range() {
        let err = validate_cron("99 * * * *").unwrap_err();
        assert!(matches!(
            err,
            CronError::InvalidField {
                position: CronPosition::Minute,
                ..
            }
        ));
        assert!(err.to_string().contains("out of range (0-59)"));
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(validate_cron("* * * *"), Err(CronError::FieldCount(4)));
        assert_eq!(validate_cron("* * * * * *"), Err(CronError::FieldCount(6)));
        assert_eq!(validate_cron(""), Err(CronError::FieldCount(0)));
    }

    #[test]
    fn test_position_bounds() {
        assert!(validate_cron("* 24 * * *").is_err());
        assert!(validate_cron("* * 0 * *").is_err());
        assert!(validate_cron("* * 32 * *").is_err());
        assert!(validate_cron("* * * 13 *").is_err());
        assert!(validate_cron("* * * * 7").is_err());
    }

    #[test]
    fn test_malformed_items() {
        assert!(validate_cron("*/0 * * * *").is_err());
        assert!(validate_cron("5-1 * * * *").is_err());
        assert!(validate_cron("1,,2 * * * *").is_err());
        assert!(validate_cron("a * * * *").is_err());
        assert!(validate_cron("-1 * * * *").is_err());
        assert!(validate_cron("*/x * * * *").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = validate_cron("* * * jan *").unwrap_err();
        assert!(err.to_string().contains("month field 'jan'"));
    }
}
