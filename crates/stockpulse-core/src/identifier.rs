//! Validated SQL identifiers for the configurable table name.
//!
//! Table names cannot be bound as statement parameters, so the one place a
//! name is spliced into SQL text must only ever see a plain identifier.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ServiceError;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid regex"));

/// Returns `true` if `name` is an unquoted Postgres identifier.
#[must_use]
pub fn is_sql_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// A table or column name known to be safe to interpolate into SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier(String);

impl SqlIdentifier {
    /// # Errors
    ///
    /// Returns [`ServiceError::ValidationFailure`] when `name` is not a plain
    /// identifier (letters, digits, underscore; not starting with a digit).
    pub fn parse(name: &str) -> Result<Self, ServiceError> {
        if is_sql_identifier(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(ServiceError::ValidationFailure(format!(
                "invalid SQL identifier: {name:?}"
            )))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
