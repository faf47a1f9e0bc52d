//! Parser configuration types

/// Configuration for the commit parser
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Keep commits that fail to parse, typed as "other"
    pub include_invalid: bool,
    /// Also parse conventional headers embedded in commit bodies
    pub parse_body_commits: bool,
}

impl ParserConfig {
    /// Set whether to keep invalid commits
    pub fn with_invalid(mut self, include: bool) -> Self {
        self.include_invalid = include;
        self
    }

    /// Set whether to parse body commits
    pub fn with_body_commits(mut self, parse: bool) -> Self {
        self.parse_body_commits = parse;
        self
    }
}
