pub mod reservation;
pub mod restaurant;
pub mod user;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Calendar date format on the wire, e.g. `2025/06/01`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";
/// Time-of-day format on the wire, e.g. `18:00`.
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ApiError::Validation(format!("Invalid date '{raw}', expected YYYY/MM/DD")))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| ApiError::Validation(format!("Invalid time '{raw}', expected HH:MM")))
}

/// Serializer writing `NaiveDate` as `YYYY/MM/DD`.
pub mod wire_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(super::DATE_FORMAT))
    }
}

/// Serializer writing `NaiveTime` as `HH:MM`.
pub mod wire_time {
    use chrono::NaiveTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(super::TIME_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_date_and_time() {
        assert_eq!(
            parse_date("2025/06/01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(
            parse_time("18:00").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
    }

    #[test]
    fn rejects_other_date_layouts() {
        assert!(matches!(parse_date("2025-06-01"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_date("2025/13/01"), Err(ApiError::Validation(_))));
        assert!(matches!(parse_time("6pm"), Err(ApiError::Validation(_))));
    }
}
