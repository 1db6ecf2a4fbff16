//! Date parsing configuration

use chrono::NaiveDate;

/// Formats tried, in order, when parsing date strings from clinical tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatConfig {
    /// chrono format strings
    pub date_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO: 2010-05-01
                "%m/%d/%Y".to_string(), // US: 05/01/2010
                "%Y/%m/%d".to_string(),
                "%Y%m%d".to_string(),
            ],
        }
    }
}

impl DateFormatConfig {
    /// Create a configuration from a list of formats
    #[must_use]
    pub fn new<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            date_formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a date string with the first format that accepts it
    ///
    /// Time-of-day suffixes (`2010-05-01 00:00:00`) are ignored.
    #[must_use]
    pub fn parse(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        let date_part = value.split_whitespace().next().unwrap_or(value);
        self.date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
    }
}
