//! Filters applied when listing shipment records.

use super::shipment::{EventDate, EventDateParseError};

/// Longest accepted search term, in characters.
pub const SEARCH_MAX: usize = 128;

/// Validation errors for [`RecordFilter`] inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordFilterError {
    /// The `date` parameter was not `YYYY-MM-DD`.
    #[error(transparent)]
    Date(#[from] EventDateParseError),
    /// The search term was too long.
    #[error("search must be at most {max} characters")]
    SearchTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Case-insensitive substring matched against AWB, submitter and the
/// kind-specific text columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Build a term; blank input yields `None`.
    pub fn new(raw: &str) -> Result<Option<Self>, RecordFilterError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > SEARCH_MAX {
            return Err(RecordFilterError::SearchTooLong { max: SEARCH_MAX });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }

    /// Term as typed, trimmed.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `LIKE` pattern that matches the term anywhere, escaping wildcards with
    /// a backslash.
    ///
    /// # Examples
    /// ```
    /// use courier_backend::domain::SearchTerm;
    ///
    /// let term = SearchTerm::new("50%_off").unwrap().unwrap();
    /// assert_eq!(term.like_pattern(), "%50\\%\\_off%");
    /// ```
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for ch in self.0.chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        pattern
    }
}

/// Optional exact-date and free-text constraints for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only records whose event date equals this date.
    pub date: Option<EventDate>,
    /// Only records matching this term.
    pub search: Option<SearchTerm>,
}

impl RecordFilter {
    /// Parse raw query parameters. Blank values mean "no constraint".
    pub fn from_query(
        date: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, RecordFilterError> {
        let date = date
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(EventDate::parse)
            .transpose()?;
        let search = search.map(SearchTerm::new).transpose()?.flatten();
        Ok(Self { date, search })
    }
}
