//! Keyword-based classification of formatted log lines
//!
//! The filter holds two immutable sets of case-insensitive patterns
//! compiled once at startup. A line is an alert iff it matches at least
//! one include pattern and no exclude pattern. Matching is unanchored
//! substring search.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};

/// Compiled include/exclude pattern sets for alert classification
#[derive(Debug)]
pub struct KeywordFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl KeywordFilter {
    /// Compile the pattern lists
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PatternError` if any pattern is not a valid
    /// regular expression.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: Self::compile(include)?,
            exclude: Self::compile(exclude)?,
        })
    }

    fn compile(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
        patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(ConfigError::from)
            })
            .collect()
    }

    /// Classify a formatted log line
    ///
    /// Returns true iff at least one include pattern matches and no
    /// exclude pattern matches anywhere in the line.
    pub fn classify(&self, line: &str) -> bool {
        self.include.iter().any(|pattern| pattern.is_match(line))
            && !self.exclude.iter().any(|pattern| pattern.is_match(line))
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn prop_excluded_line_never_classifies(line: String) -> bool {
        let include = vec!["error".to_string()];
        let exclude = vec!["error".to_string()];
        let filter = KeywordFilter::new(&include, &exclude).unwrap();

        // Exclude mirrors include, so every includable line is vetoed.
        !filter.classify(&line)
    }

    #[quickcheck]
    fn prop_classification_is_deterministic(line: String) -> bool {
        let include = vec!["error".to_string(), "fail".to_string()];
        let exclude = vec!["DCOM".to_string()];
        let filter = KeywordFilter::new(&include, &exclude).unwrap();

        filter.classify(&line) == filter.classify(&line)
    }
}
