//! Optional date range options
//!
//! Adds three options to a command: a month (`YYYY-MM`) or an explicit
//! from/to pair (`YYYY-MM-DD`). A month takes precedence and expands to its
//! first and last day.

use chrono::{Months, NaiveDate};
use serde_json::Value;

use crate::context::Context;
use crate::errors::{ConsoleError, ConsoleResult};
use crate::input::{InputDefinition, OptionSpec};

const MONTH_ERROR: &str = "Invalid month value. expected format: YYYY-MM.";
const FROM_DATE_ERROR: &str = "Invalid from date value. expected format: YYYY-MM-DD.";
const TO_DATE_ERROR: &str = "Invalid to date value. expected format: YYYY-MM-DD.";
const RANGE_ERROR: &str = "To date should be greater than from date.";

/// Names and shortcuts of the three options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeNames {
    pub month: String,
    pub from_date: String,
    pub to_date: String,
    pub month_shortcut: Option<char>,
    pub from_date_shortcut: Option<char>,
    pub to_date_shortcut: Option<char>,
}

impl Default for DateRangeNames {
    fn default() -> Self {
        Self {
            month: "for-month".to_string(),
            from_date: "from-date".to_string(),
            to_date: "to-date".to_string(),
            month_shortcut: Some('m'),
            from_date_shortcut: Some('d'),
            to_date_shortcut: Some('t'),
        }
    }
}

pub fn add_date_range_option(definition: &mut InputDefinition, names: &DateRangeNames) {
    let option = |name: &str, shortcut: Option<char>, description: &str| {
        let spec = OptionSpec::value(name).describe(description);
        match shortcut {
            Some(shortcut) => spec.shortcut(shortcut),
            None => spec,
        }
    };

    definition
        .add_option(option(
            &names.month,
            names.month_shortcut,
            "For the specific month. Format: YYYY-MM.",
        ))
        .add_option(option(
            &names.from_date,
            names.from_date_shortcut,
            "From date. Format: YYYY-MM-DD.",
        ))
        .add_option(option(
            &names.to_date,
            names.to_date_shortcut,
            "To date. Format: YYYY-MM-DD.",
        ));
}

/// Reads the range from the running command's options.
pub fn date_range_option(
    cx: &Context<'_>,
    names: &DateRangeNames,
) -> ConsoleResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    let text = |name: &str| match cx.option(name, Value::Null) {
        Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    };
    resolve_date_range(
        text(&names.month).as_deref(),
        text(&names.from_date).as_deref(),
        text(&names.to_date).as_deref(),
    )
}

pub fn resolve_date_range(
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> ConsoleResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    let (from, to) = match month {
        Some(month) => {
            let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
                .map_err(|_| ConsoleError::DateRange(MONTH_ERROR.to_string()))?;
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .ok_or_else(|| ConsoleError::DateRange(MONTH_ERROR.to_string()))?;
            (Some(first), Some(last))
        }
        None => (
            from.map(|from| parse_date(from, FROM_DATE_ERROR)).transpose()?,
            to.map(|to| parse_date(to, TO_DATE_ERROR)).transpose()?,
        ),
    };

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ConsoleError::DateRange(RANGE_ERROR.to_string()));
        }
    }
    Ok((from, to))
}

fn parse_date(value: &str, error: &str) -> ConsoleResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConsoleError::DateRange(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_expands_to_whole_month() {
        assert_eq!(
            resolve_date_range(Some("2024-03"), None, None).unwrap(),
            (Some(date(2024, 3, 1)), Some(date(2024, 3, 31)))
        );
        assert_eq!(
            resolve_date_range(Some("2024-02"), Some("2000-01-01"), None).unwrap(),
            (Some(date(2024, 2, 1)), Some(date(2024, 2, 29)))
        );
        assert_eq!(
            resolve_date_range(Some("2023-12"), None, None).unwrap().1,
            Some(date(2023, 12, 31))
        );
    }

    #[test]
    fn test_explicit_dates() {
        assert_eq!(
            resolve_date_range(None, Some("2024-01-05"), None).unwrap(),
            (Some(date(2024, 1, 5)), None)
        );
        assert_eq!(resolve_date_range(None, None, None).unwrap(), (None, None));
    }

    #[test]
    fn test_errors() {
        let err = resolve_date_range(Some("March"), None, None).unwrap_err();
        assert_eq!(err.to_string(), MONTH_ERROR);

        let err = resolve_date_range(None, Some("05/01/2024"), None).unwrap_err();
        assert_eq!(err.to_string(), FROM_DATE_ERROR);

        let err = resolve_date_range(None, None, Some("2024-13-01")).unwrap_err();
        assert_eq!(err.to_string(), TO_DATE_ERROR);

        let err = resolve_date_range(None, Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
        assert_eq!(err.to_string(), RANGE_ERROR);
    }

    #[test]
    fn test_options_are_declared() {
        let mut definition = InputDefinition::new();
        add_date_range_option(&mut definition, &DateRangeNames::default());
        assert_eq!(definition.option("for-month").unwrap().shortcut, Some('m'));
        assert_eq!(definition.option("from-date").unwrap().shortcut, Some('d'));
        assert_eq!(definition.option("to-date").unwrap().shortcut, Some('t'));
        assert!(definition.validate().is_ok());
    }
}
