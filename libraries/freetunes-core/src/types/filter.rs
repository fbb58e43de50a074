/// Search criteria for listing endpoints
///
/// Every field is optional; absent criteria do not constrain the result. The
/// storage layer compiles a filter into a single parameterized statement.
use serde::Deserialize;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on rows per page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Limit/offset paging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Clamp out-of-range values into something the database accepts
    pub fn normalized(self) -> Self {
        let limit = if self.limit <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(MAX_PAGE_SIZE)
        };
        Self {
            limit,
            offset: self.offset.max(0),
        }
    }
}

/// Album search criteria; `artist` matches the owner's full name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumFilter {
    pub name: Option<String>,
    pub artist: Option<String>,
}

/// Song search criteria, combined with AND; `genre` matches the genre name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFilter {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub genre: Option<String>,
}

/// Public playlist search criteria, combined with OR
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistFilter {
    pub name: Option<String>,
    pub username: Option<String>,
}

/// User search criteria
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub fullname: Option<String>,
    pub username: Option<String>,
}

/// Trim a criterion and drop it when empty
pub fn criterion(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults() {
        assert_eq!(Page::default(), Page::new(20, 0));
    }

    #[test]
    fn page_normalization_clamps() {
        assert_eq!(Page::new(0, -5).normalized(), Page::new(20, 0));
        assert_eq!(Page::new(1000, 10).normalized(), Page::new(100, 10));
    }

    #[test]
    fn blank_criteria_are_ignored() {
        let blank = Some("   ".to_string());
        assert_eq!(criterion(blank.as_ref()), None);
        let set = Some(" rock ".to_string());
        assert_eq!(criterion(set.as_ref()), Some("rock"));
    }
}
