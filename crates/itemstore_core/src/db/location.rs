//! Connection-string parsing.
//!
//! Accepted shapes: `sqlite::memory:`, `sqlite://:memory:`, `sqlite:<path>`,
//! `sqlite://<path>` and the SQLAlchemy forms `sqlite:///<relative path>` and
//! `sqlite:////<absolute path>`. A `+driver` suffix on the scheme
//! (`sqlite+aiosqlite://...`) is accepted and ignored.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const SQLITE_SCHEME: &str = "sqlite";
const MEMORY_MARKERS: [&str; 2] = [":memory:", "memory:"];

/// Resolved target of a `DATABASE_URL` style connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parses a connection string.
    ///
    /// # Errors
    /// - Empty input, missing or unsupported scheme, empty path, or a query
    ///   string (connection options are not supported).
    pub fn parse(url: &str) -> Result<Self, ConnectionStringError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ConnectionStringError::Empty);
        }

        let Some((scheme, rest)) = trimmed.split_once(':') else {
            return Err(ConnectionStringError::MissingScheme(trimmed.to_string()));
        };

        let base_scheme = scheme.split('+').next().unwrap_or(scheme);
        if !base_scheme.eq_ignore_ascii_case(SQLITE_SCHEME) {
            return Err(ConnectionStringError::UnsupportedScheme(scheme.to_string()));
        }

        if rest.contains('?') {
            return Err(ConnectionStringError::UnsupportedOptions(trimmed.to_string()));
        }

        // `//` opens an empty authority; the next `/` only separates it from the path.
        let path = match rest.strip_prefix("//") {
            Some(after_authority) => after_authority
                .strip_prefix('/')
                .unwrap_or(after_authority),
            None => rest,
        };
        if MEMORY_MARKERS.contains(&path) {
            return Ok(Self::Memory);
        }
        if path.is_empty() {
            return Err(ConnectionStringError::MissingPath(trimmed.to_string()));
        }

        Ok(Self::File(PathBuf::from(path)))
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Display for DatabaseLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStringError {
    Empty,
    MissingScheme(String),
    UnsupportedScheme(String),
    MissingPath(String),
    UnsupportedOptions(String),
}

impl Display for ConnectionStringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "database url cannot be empty"),
            Self::MissingScheme(url) => write!(f, "database url `{url}` has no scheme"),
            Self::UnsupportedScheme(scheme) => write!(
                f,
                "unsupported database scheme `{scheme}`; expected `{SQLITE_SCHEME}`"
            ),
            Self::MissingPath(url) => write!(f, "database url `{url}` has no database path"),
            Self::UnsupportedOptions(url) => {
                write!(f, "database url `{url}` carries unsupported query options")
            }
        }
    }
}

impl Error for ConnectionStringError {}
