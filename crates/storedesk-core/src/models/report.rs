//! Reporting windows for the analysis endpoint.

use chrono::NaiveDate;

use super::validation::ValidationError;

/// Date format the analysis endpoint expects.
const ANALYSIS_DATE_FORMAT: &str = "%Y/%m/%d";

/// Inclusive date range for `GET /admin/analysis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisRange {
    /// Build a range, rejecting a start after the end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::InvertedRange);
        }
        Ok(())
    }

    /// `startDate` / `endDate` query pairs.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("startDate", self.start.format(ANALYSIS_DATE_FORMAT).to_string()),
            ("endDate", self.end.format(ANALYSIS_DATE_FORMAT).to_string()),
        ]
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
