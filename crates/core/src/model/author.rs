use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorError {
    #[error("author identity cannot be empty")]
    Empty,
}

/// Caller-supplied identity attached to every write operation.
///
/// There is no ambient "current user" anywhere in the engine; whoever drives
/// the services decides what identity each write carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorId(String);

impl AuthorId {
    /// Creates an `AuthorId`, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    ///
    /// Returns `AuthorError::Empty` if the identity is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, AuthorError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(AuthorError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_id_rejects_blank() {
        assert_eq!(AuthorId::new("   ").unwrap_err(), AuthorError::Empty);
    }

    #[test]
    fn author_id_trims() {
        let author = AuthorId::new("  alice  ").unwrap();
        assert_eq!(author.as_str(), "alice");
    }
}
