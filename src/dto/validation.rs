//! Validation helpers for DTOs.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use validator::ValidationError;

use crate::pairing::GameResult;

const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATE_TIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

/// Validates a chess.com username: 3 to 25 characters, letters, digits, `_` or `-`.
///
/// # Examples
///
/// ```ignore
/// validate_chesscom_username("Hikaru")      // Ok
/// validate_chesscom_username("ab")          // Err - too short
/// validate_chesscom_username("magnus c")    // Err - space
/// ```
pub fn validate_chesscom_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if !(3..=25).contains(&length) {
        let mut err = ValidationError::new("chesscom_username_length");
        err.message = Some(
            format!("chess.com username must be 3 to 25 characters (got {length})").into(),
        );
        return Err(err);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("chesscom_username_format");
        err.message =
            Some("chess.com username may only contain letters, digits, `_` and `-`".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a schedule value: a date, a local date-time (`YYYY-MM-DDTHH:MM`) or RFC 3339.
pub fn validate_schedule_time(value: &str) -> Result<(), ValidationError> {
    let parsed = Date::parse(value, DATE).is_ok()
        || PrimitiveDateTime::parse(value, DATE_TIME).is_ok()
        || OffsetDateTime::parse(value, &Rfc3339).is_ok();

    if parsed {
        Ok(())
    } else {
        let mut err = ValidationError::new("schedule_time_format");
        err.message = Some(format!("`{value}` is not a date or date-time").into());
        Err(err)
    }
}

/// Validates a result in white-first notation (`1-0`, `0-1`, `1/2-1/2`, `0-0`).
pub fn validate_result_notation(value: &str) -> Result<(), ValidationError> {
    match GameResult::parse(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("result_notation");
            err.message = Some("result must be one of 1-0, 0-1, 1/2-1/2, 0-0".into());
            Err(err)
        }
    }
}
