use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier for a question, shaped `<subject>_<index>`.
///
/// Only assigned when the full pool is loaded for custom-subset selection.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for the question at `index` (0-based) within `subject`.
    #[must_use]
    pub fn for_subject(subject: &str, index: usize) -> Self {
        Self(format!("{subject}_{index}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the identifier into its subject name and ordinal.
    ///
    /// Subject names may themselves contain underscores, so the split happens
    /// at the last one.
    #[must_use]
    pub fn parts(&self) -> Option<(&str, usize)> {
        let (subject, index) = self.0.rsplit_once('_')?;
        if subject.is_empty() {
            return None;
        }
        index.parse().ok().map(|index| (subject, index))
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QuestionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
