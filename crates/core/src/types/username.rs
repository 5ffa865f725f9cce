//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// The input string is empty.
    #[error("username cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains whitespace or control characters.
    #[error("username cannot contain whitespace or control characters")]
    InvalidCharacter,
}

/// A display name chosen at registration.
///
/// Usernames are unique in the `users` table and compared exactly
/// (case-sensitive), after trimming surrounding whitespace.
///
/// ```
/// use recipe_finder_core::Username;
///
/// assert_eq!(Username::parse("  julia ").unwrap().as_str(), "julia");
/// assert!(Username::parse("two words").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Maximum length of a username (the `users.username` column limit).
    pub const MAX_LENGTH: usize = 80;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 80
    /// characters, or contains whitespace or control characters.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(UsernameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Username::parse("julia_child").unwrap().as_str(), "julia_child");
        assert_eq!(Username::parse("Chef-42").unwrap().as_str(), "Chef-42");
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("\tgordon ").unwrap().as_str(), "gordon");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Username::parse(""), Err(UsernameError::Empty));
        assert_eq!(Username::parse("  "), Err(UsernameError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(Username::parse(&"a".repeat(80)).is_ok());
        assert_eq!(
            Username::parse(&"a".repeat(81)),
            Err(UsernameError::TooLong { max: 80 })
        );
    }

    #[test]
    fn test_parse_inner_whitespace() {
        assert_eq!(
            Username::parse("two words"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("bell\u{7}"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_serde_transparent() {
        let name = Username::parse("julia").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"julia\"");
    }
}
