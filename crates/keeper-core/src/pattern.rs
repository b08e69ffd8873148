//! Glob selection over resource names with a global ignore list

use std::collections::BTreeSet;

use glob::Pattern;

use crate::error::{Error, Result};

/// A compiled glob matched against whole resource names.
///
/// `*` matches any substring, `?` one character, `[...]` a character
/// class. Matching is case-sensitive and anchored at both ends.
#[derive(Debug, Clone)]
pub struct NamePattern {
    pattern: Pattern,
}

impl NamePattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        Pattern::new(pattern)
            .map(|pattern| Self { pattern })
            .map_err(|e| Error::Pattern {
                pattern: pattern.to_string(),
                message: e.msg.to_string(),
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Selects names, always excluding those matched by an ignore pattern.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    ignore: Vec<NamePattern>,
}

impl PatternMatcher {
    /// Compile the ignore list. Order is preserved.
    pub fn new<I, S>(ignore_patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ignore = ignore_patterns
            .into_iter()
            .map(|p| NamePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { ignore })
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|p| p.matches(name))
    }

    /// Names that are not ignored and, if given, match `user_pattern`.
    ///
    /// The ignore list wins: an ignored name is never selected, whatever the
    /// user pattern says. An empty result is not an error.
    pub fn select<I, S>(&self, names: I, user_pattern: Option<&NamePattern>) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(Into::into)
            .filter(|name| !self.is_ignored(name))
            .filter(|name| user_pattern.is_none_or(|p| p.matches(name)))
            .collect()
    }
}

/// One-shot form of [`PatternMatcher::select`].
pub fn select<I, S>(
    names: I,
    ignore_patterns: &[String],
    user_pattern: Option<&str>,
) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let matcher = PatternMatcher::new(ignore_patterns)?;
    let user_pattern = user_pattern.map(NamePattern::parse).transpose()?;
    Ok(matcher.select(names, user_pattern.as_ref()))
}
