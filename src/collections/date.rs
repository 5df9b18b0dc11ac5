//! Record dates.
//!
//! Blog posts and Q&A entries carry their date as `day.month.year`
//! (`03.03.2020`). Templates get the parts separately, with the month as a
//! localized name.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// `chrono` format of record dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

/// Date split for templates: `{{ day }} {{ month }} {{ year }}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateParts {
    pub day: u32,
    pub month: String,
    pub year: i32,
}

impl DateParts {
    /// `month_names` lists January first; a short list yields an empty month.
    pub fn new(date: NaiveDate, month_names: &[String]) -> Self {
        let month = month_names
            .get(date.month0() as usize)
            .cloned()
            .unwrap_or_default();
        Self {
            day: date.day(),
            month,
            year: date.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn parses_day_month_year() {
        let date = parse_date("15.06.2021").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 6, 15).unwrap());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_date("\n  01.01.2020 ").is_ok());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_date("2021-06-15").is_err());
        assert!(parse_date("31.02.2021").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn parts_use_localized_month() {
        let months = SiteConfig::default().month_names;
        let parts = DateParts::new(parse_date("03.03.2020").unwrap(), &months);
        assert_eq!(
            parts,
            DateParts {
                day: 3,
                month: "Марта".into(),
                year: 2020,
            }
        );
    }

    #[test]
    fn december_is_last_name() {
        let months = SiteConfig::default().month_names;
        let parts = DateParts::new(parse_date("31.12.1999").unwrap(), &months);
        assert_eq!(parts.month, "Декабря");
    }
}
