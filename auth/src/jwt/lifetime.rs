use chrono::Duration;

use super::errors::JwtError;

/// Parse a token lifetime such as `"7d"`, `"12h"`, `"30m"`, `"45s"` or `"2w"`.
///
/// A bare integer is read as seconds. The result must be positive.
///
/// # Errors
/// * `InvalidLifetime` - Empty, unknown unit, non-numeric, zero or overflowing
pub fn parse_lifetime(input: &str) -> Result<Duration, JwtError> {
    let trimmed = input.trim();
    let invalid = || JwtError::InvalidLifetime(input.to_string());

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);

    let amount: i64 = digits.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }

    let seconds_per_unit: i64 = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(seconds_per_unit)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_lifetime("7d").unwrap(), Duration::days(7));
        assert_eq!(parse_lifetime("12h").unwrap(), Duration::hours(12));
        assert_eq!(parse_lifetime("30m").unwrap(), Duration::minutes(30));
        assert_eq!(parse_lifetime("45s").unwrap(), Duration::seconds(45));
        assert_eq!(parse_lifetime("2w").unwrap(), Duration::weeks(2));
    }

    #[test]
    fn test_bare_number_is_seconds() {
        assert_eq!(parse_lifetime("3600").unwrap(), Duration::hours(1));
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(parse_lifetime(" 1d ").unwrap(), Duration::days(1));
    }

    #[test]
    fn test_rejects_bad_input() {
        for input in ["", "d", "0d", "7y", "-1d", "1.5h", "abc"] {
            assert!(
                matches!(parse_lifetime(input), Err(JwtError::InvalidLifetime(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_lifetime("9223372036854775807w").is_err());
    }
}
