//! Compiled pattern values.

use crate::error::{Error, Result};
use regex::{Match, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A regular expression validated and compiled once at load time.
///
/// Serializes as its source string, so configuration files stay plain JSON.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|e| Error::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Compile a list of patterns, keeping input order and dropping the
    /// ones that fail to compile.
    pub fn compile_all<S: AsRef<str>>(sources: &[S]) -> Vec<Pattern> {
        sources
            .iter()
            .filter_map(|s| match Pattern::new(s.as_ref()) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("Dropping pattern: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Check whether a source string compiles.
    pub fn is_valid(source: &str) -> bool {
        Regex::new(source).is_ok()
    }

    /// The pattern source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Check if the pattern matches anywhere in the text.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Leftmost match, only if it starts at the beginning of the text.
    pub fn leading<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.regex.find(text).filter(|m| m.start() == 0)
    }
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(source: String) -> Result<Self> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
