// Sort keys for listing tasks

use crate::error::Error;
use std::str::FromStr;

/// The enumerated set of fields `list` may sort on.
///
/// Sorting is ascending over the raw TEXT column, so priority sorts
/// alphabetically (high, low, medium) rather than by rank. Rows with a
/// NULL due date sort first under SQLite's NULL ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Priority,
    DueDate,
}

impl SortKey {
    pub(crate) fn to_sql(self) -> &'static str {
        match self {
            SortKey::Priority => "priority",
            SortKey::DueDate => "due_date",
        }
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "priority" => Ok(SortKey::Priority),
            "due_date" => Ok(SortKey::DueDate),
            other => Err(Error::Validation(format!(
                "cannot sort by {} (expected priority or due_date)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_to_sql() {
        assert_eq!(SortKey::Priority.to_sql(), "priority");
        assert_eq!(SortKey::DueDate.to_sql(), "due_date");
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("priority".parse::<SortKey>().unwrap(), SortKey::Priority);
        assert_eq!("due_date".parse::<SortKey>().unwrap(), SortKey::DueDate);
    }

    #[test]
    fn test_sort_key_rejects_unknown_field() {
        let err = "title".parse::<SortKey>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
