//! DID strings and their short form.
//!
//! A long-form Prism DID carries its initial state inline:
//!
//! ```text
//! did:prism:<hex sha256(state)>:<base64url(state)>
//! └────── short form ──────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of colon-separated segments kept by the short form.
pub const SHORT_FORM_SEGMENTS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DidError {
    #[error("Invalid DID '{0}': {1}")]
    Invalid(String, &'static str),

    #[error("Master key derivation failed")]
    KeyDerivation,

    #[error("DID '{0}' is not in long form")]
    NotLongForm(String),

    #[error("DID state is malformed: {0}")]
    MalformedState(String),

    #[error("Master key does not control this DID")]
    KeyMismatch,

    #[error("Failed to encode DID operation: {0}")]
    Encoding(String),
}

/// A validated DID string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    pub const SCHEME: &'static str = "did";

    /// Parse and validate a DID string.
    pub fn parse(s: &str) -> Result<Self, DidError> {
        let mut segments = s.split(':');
        if segments.next() != Some(Self::SCHEME) {
            return Err(DidError::Invalid(s.to_string(), "must start with 'did:'"));
        }
        let method = segments.next().unwrap_or_default();
        if method.is_empty()
            || !method
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(DidError::Invalid(s.to_string(), "method must be lowercase alphanumeric"));
        }
        match segments.next() {
            Some(id) if !id.is_empty() => {}
            _ => return Err(DidError::Invalid(s.to_string(), "missing method-specific identifier")),
        }
        if segments.any(str::is_empty) {
            return Err(DidError::Invalid(s.to_string(), "empty segment"));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// The DID truncated to its first three segments.
    pub fn short_form(&self) -> Did {
        Did(short_form(&self.0))
    }

    pub fn is_long_form(&self) -> bool {
        self.0.split(':').count() > SHORT_FORM_SEGMENTS
    }

    /// Method-specific segments after `did:<method>:`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':').skip(2)
    }
}

/// Keep only the first three colon-delimited segments of `did`.
pub fn short_form(did: &str) -> String {
    did.split(':')
        .take(SHORT_FORM_SEGMENTS)
        .collect::<Vec<_>>()
        .join(":")
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Did {
    type Error = DidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}
