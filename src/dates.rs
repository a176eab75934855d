//! Reference dates and instants
//!
//! Instants in the parameter tree are fixed-width ISO strings, so comparing
//! them lexicographically is the same as comparing the dates.

use crate::error::{BillmarkError, Result};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Valid ISO date regex"));

/// Parse a strict `YYYY-MM-DD` calendar date
pub fn parse_iso_date(value: &str) -> Result<NaiveDate> {
    if !ISO_DATE.is_match(value) {
        return Err(BillmarkError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| BillmarkError::InvalidDate(value.to_string()))
}

/// Format a date as an instant key
pub fn instant_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Same calendar day one year earlier; 29 February rolls over to 1 March.
pub fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    let year = date.year() - 1;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date)
}
