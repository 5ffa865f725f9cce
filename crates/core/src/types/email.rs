//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons an address is rejected by [`Email::parse`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain whitespace")]
    Whitespace,
    /// No `@`, or nothing on one side of it.
    #[error("email must look like name@domain")]
    Malformed,
    /// The part after `@` is not a dotted host name.
    #[error("email domain `{0}` is not valid")]
    InvalidDomain(String),
}

/// A normalized email address, used as the login identifier.
///
/// Addresses are trimmed and lower-cased on parse so that the unique index
/// on `users.email` treats `Cook@Example.com` and `cook@example.com` as the
/// same account. Validation is deliberately shallow: one `@`, a non-empty
/// local part and a domain with an inner dot.
///
/// ```
/// use recipe_finder_core::Email;
///
/// assert_eq!(Email::parse(" Cook@Example.COM ").unwrap().as_str(), "cook@example.com");
/// assert!(Email::parse("cook@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// The `users.email` column limit.
    pub const MAX_LENGTH: usize = 120;

    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first problem found.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        match s.chars().count() {
            0 => return Err(EmailError::Empty),
            n if n > Self::MAX_LENGTH => {
                return Err(EmailError::TooLong {
                    max: Self::MAX_LENGTH,
                });
            }
            _ => {}
        }

        if s.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let Some((local, domain)) = s.split_once('@') else {
            return Err(EmailError::Malformed);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::Malformed);
        }

        let host = domain.trim_matches('.');
        if domain.contains('@') || host.len() != domain.len() || !host.contains('.') {
            return Err(EmailError::InvalidDomain(domain.to_owned()));
        }

        Ok(Self(s.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
