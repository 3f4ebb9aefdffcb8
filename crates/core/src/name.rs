//! Validated leaderboard names.

use std::fmt;

use crate::error::RankError;

/// A non-empty leaderboard name.
///
/// The Registry is keyed by this type rather than a bare `String` so that
/// "empty name" can't silently create a leaderboard nobody can query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeaderboardName(String);

impl LeaderboardName {
    /// Validate and wrap a leaderboard name.
    ///
    /// # Errors
    /// Returns [`RankError::InvalidInput`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self, RankError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RankError::InvalidInput {
                message: "leaderboard name must not be empty".to_string(),
            });
        }
        Ok(Self(name))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeaderboardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LeaderboardName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert!(LeaderboardName::new("").is_err());
    }

    #[test]
    fn accepts_nonempty_name() {
        let n = LeaderboardName::new("season-3").unwrap();
        assert_eq!(n.as_str(), "season-3");
        assert_eq!(n.to_string(), "season-3");
    }
}
