//! Date token detection and normalization

use chrono::NaiveDate;

/// `D[-/]M[-/]Y` (1-2 digit day/month, 2-4 digit year) or `Y[-/]M[-/]D` (4-digit year first)
pub(crate) const DATE_PATTERN: &str =
    r"(\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}[-/]\d{1,2}[-/]\d{1,2})";

/// Normalize a date token to a calendar date
///
/// Component order is decided by which component has 4 digits:
/// - first → `Y-M-D`
/// - last → `D-M-Y`
/// - neither → `D-M-YY`, with the year taken as `20YY`
///
/// Returns `None` for tokens that do not name a real calendar date.
pub fn normalize_date(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.trim().split(['-', '/']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = if parts[0].len() == 4 {
        (parts[0].to_string(), parts[1], parts[2])
    } else if parts[2].len() == 4 {
        (parts[2].to_string(), parts[1], parts[0])
    } else if parts[2].len() == 2 {
        (format!("20{}", parts[2]), parts[1], parts[0])
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_year_first() {
        assert_eq!(normalize_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(normalize_date("2024/3/5"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_year_last() {
        assert_eq!(normalize_date("12/01/2024"), Some(ymd(2024, 1, 12)));
        assert_eq!(normalize_date("5-3-2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(normalize_date("12/01/24"), Some(ymd(2024, 1, 12)));
        assert_eq!(normalize_date("1-9-99"), Some(ymd(2099, 9, 1)));
    }

    #[test]
    fn test_normalized_form_is_idempotent() {
        for token in ["2024-03-05", "1999-12-31", "2024-02-29"] {
            let date = normalize_date(token).unwrap();
            assert_eq!(date.to_string(), token);
            assert_eq!(normalize_date(&date.to_string()), Some(date));
        }
    }

    #[test]
    fn test_rejects_impossible_dates() {
        assert_eq!(normalize_date("31/02/2024"), None);
        assert_eq!(normalize_date("2024-13-01"), None);
        assert_eq!(normalize_date("29/02/2023"), None);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert_eq!(normalize_date("12/01"), None);
        assert_eq!(normalize_date("12/01/202"), None);
        assert_eq!(normalize_date("ab/cd/2024"), None);
        assert_eq!(normalize_date(""), None);
    }
}
