use chrono::{NaiveDate, NaiveTime};

use crate::error::AppError;

/// Parse a `YYYY-MM-DD` field, rejecting before any store mutation.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::ValidationError(format!("{} {:?} is not a valid date (YYYY-MM-DD)", field, value))
    })
}

/// Parse an `HH:MM:SS` field; bare `HH:MM` is accepted as well.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            AppError::ValidationError(format!(
                "{} {:?} is not a valid time (HH:MM:SS or HH:MM)",
                field, value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_expected_formats() {
        assert!(parse_date("appointment_date", "2025-11-01").is_ok());
        assert!(parse_time("appointment_time", "10:00:00").is_ok());
        assert!(parse_time("appointment_time", "10:00").is_ok());
    }

    #[test]
    fn rejects_malformed_fields() {
        assert!(matches!(
            parse_date("dob", "01/11/2025"),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            parse_time("appointment_time", "25:00:00"),
            Err(AppError::ValidationError(msg)) if msg.contains("HH:MM:SS or HH:MM")
        ));
    }
}
