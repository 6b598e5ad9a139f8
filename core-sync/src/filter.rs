//! Shell-style exclusion of item filenames and collection titles.

use core_runtime::config::MirrorConfig;
use glob::{MatchOptions, Pattern};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Optional glob deciding which names are skipped.
///
/// Without a pattern nothing is excluded. Matching is case-sensitive on every
/// platform and `*` also matches a leading dot.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    pattern: Option<Pattern>,
}

impl NameFilter {
    pub fn new(pattern: Option<Pattern>) -> Self {
        Self { pattern }
    }

    /// The exclusion glob of a validated configuration
    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config.exclude.clone())
    }

    /// A filter that excludes nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }
}
