//! Conversions between user-facing values and contract integers.

use chrono::{DateTime, NaiveDate, Utc};
use ethers::types::U256;
use ethers::utils::{format_ether, parse_ether};

use crate::error::QuizTokenError;

/// Escrow cap used for quizzes without a taker limit.
pub const DEFAULT_CAP: u64 = 1000;

/// Parses a decimal token amount ("10", "0.5") into 18-decimal fixed point.
pub fn parse_amount(amount: &str) -> Result<U256, QuizTokenError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(QuizTokenError::InvalidAmount(amount.to_string()));
    }
    parse_ether(trimmed).map_err(|e| QuizTokenError::InvalidAmount(format!("{amount}: {e}")))
}

pub fn format_amount(amount: U256) -> String {
    format_ether(amount)
}

/// Tokens locked at creation: one reward per potential winner.
pub fn escrow_amount(reward_per_winner: U256, taker_limit: u64) -> Result<U256, QuizTokenError> {
    let cap = if taker_limit == 0 { DEFAULT_CAP } else { taker_limit };
    reward_per_winner
        .checked_mul(U256::from(cap))
        .ok_or_else(|| QuizTokenError::InvalidAmount(format!("escrow for {cap} winners overflows")))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_quiz_date(value: &str) -> Result<DateTime<Utc>, QuizTokenError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| QuizTokenError::InvalidDate(value.to_string()))
}

pub fn unix_seconds(date: DateTime<Utc>) -> Result<U256, QuizTokenError> {
    u64::try_from(date.timestamp())
        .map(U256::from)
        .map_err(|_| QuizTokenError::InvalidDate(date.to_rfc3339()))
}

/// Inverse of [`unix_seconds`]; `None` for values no date can hold.
pub fn from_unix_seconds(seconds: U256) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(to_u64(seconds)?).ok()?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
}

pub fn to_u64(value: U256) -> Option<u64> {
    if value > U256::from(u64::MAX) {
        None
    } else {
        Some(value.as_u64())
    }
}

pub fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), QuizTokenError> {
    if start >= end {
        return Err(QuizTokenError::InvalidRange {
            start: start.timestamp(),
            end: end.timestamp(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_uses_taker_limit_or_default_cap() {
        let reward = parse_amount("10").unwrap();
        for (limit, cap) in [(0u64, DEFAULT_CAP), (1, 1), (1000, 1000), (50_000, 50_000)] {
            assert_eq!(escrow_amount(reward, limit).unwrap(), reward * U256::from(cap), "limit {limit}");
        }
    }

    #[test]
    fn escrow_overflow_is_rejected() {
        assert!(matches!(
            escrow_amount(U256::MAX, 2),
            Err(QuizTokenError::InvalidAmount(_))
        ));
    }

    #[test]
    fn amounts_are_18_decimal_fixed_point() {
        assert_eq!(parse_amount("10").unwrap(), U256::exp10(19));
        assert_eq!(parse_amount("0.5").unwrap(), U256::exp10(17) * U256::from(5u64));
        assert!(format_amount(U256::exp10(19)).starts_with("10."));
    }

    #[test]
    fn bad_amounts_are_rejected() {
        for bad in ["", "  ", "-1", "ten"] {
            assert!(matches!(parse_amount(bad), Err(QuizTokenError::InvalidAmount(_))), "{bad:?}");
        }
    }

    #[test]
    fn dates_accept_plain_days_and_rfc3339() {
        let day = parse_quiz_date("2025-01-01").unwrap();
        assert_eq!(day.timestamp(), 1_735_689_600);

        let ts = parse_quiz_date("2025-01-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.timestamp(), 1_735_725_600);

        assert!(matches!(parse_quiz_date("01/02/2025"), Err(QuizTokenError::InvalidDate(_))));
    }

    #[test]
    fn range_must_be_strictly_increasing() {
        let start = parse_quiz_date("2025-03-01").unwrap();
        let end = parse_quiz_date("2025-01-01").unwrap();
        assert!(matches!(validate_range(start, end), Err(QuizTokenError::InvalidRange { .. })));
        assert!(validate_range(start, start).is_err());
        assert!(validate_range(end, start).is_ok());
    }

    #[test]
    fn pre_epoch_dates_cannot_be_sent() {
        let date = parse_quiz_date("1969-12-31").unwrap();
        assert!(matches!(unix_seconds(date), Err(QuizTokenError::InvalidDate(_))));
        assert_eq!(from_unix_seconds(U256::MAX), None);
    }
}
