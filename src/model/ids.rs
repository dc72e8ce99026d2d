//! Thread and post identifiers
//!
//! Wikidot identifies threads as `t-<n>` and posts as `post-<n>`. The
//! prefixed form is what gets stored and compared; remote module calls want
//! the bare number.

use std::fmt;

const THREAD_PREFIX: &str = "t-";
const POST_PREFIX: &str = "post-";

/// Identifier of a forum thread, e.g. `t-1234567`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a thread ID from its bare number
    pub fn from_numeric(n: u64) -> Self {
        Self(format!("{THREAD_PREFIX}{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ID with the `t-` prefix stripped, as remote calls expect it
    pub fn numeric(&self) -> &str {
        self.0.strip_prefix(THREAD_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a single post, e.g. `post-7654321`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_numeric(n: u64) -> Self {
        Self(format!("{POST_PREFIX}{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ID with the `post-` prefix stripped
    pub fn numeric(&self) -> &str {
        self.0.strip_prefix(POST_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
