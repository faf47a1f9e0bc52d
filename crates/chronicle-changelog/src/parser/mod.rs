//! Commit parsing

mod body;
mod conventional;
mod types;

pub use body::BodyCommits;
pub use conventional::{is_header_line, parse_message, ConventionalMessage, GrammarError};
pub use types::*;

use tracing::{debug, info};

use crate::types::{ParsedCommit, FALLBACK_TYPE};
use chronicle_git::CommitRecord;

/// Parser for Conventional Commits format
#[derive(Debug, Clone, Default)]
pub struct ConventionalParser {
    config: ParserConfig,
}

impl ConventionalParser {
    /// Create a new parser with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse one commit into zero or more parsed commits
    ///
    /// The header yields at most one entry: the parsed message, or an "other"
    /// fallback when invalid commits are kept. Body commits follow it when
    /// enabled, each under the same fallback policy.
    pub fn parse(&self, commit: &CommitRecord, source: usize) -> Vec<ParsedCommit> {
        let mut parsed: Vec<ParsedCommit> = self
            .interpret(&commit.message, source, false)
            .into_iter()
            .collect();

        if self.config.parse_body_commits {
            if let Some((_, body)) = commit.message.split_once('\n') {
                let embedded = BodyCommits::new(body)
                    .filter_map(|message| self.interpret(&message, source, true));
                parsed.extend(embedded);
            }
        }

        if parsed.is_empty() {
            info!(sha = %commit.sha, "skipping commit that doesn't follow conventional commit format");
        }

        parsed
    }

    /// Parse every commit in fetch order
    pub fn parse_all(&self, commits: &[CommitRecord]) -> Vec<ParsedCommit> {
        commits
            .iter()
            .enumerate()
            .flat_map(|(source, commit)| self.parse(commit, source))
            .collect()
    }

    fn interpret(&self, message: &str, source: usize, from_body: bool) -> Option<ParsedCommit> {
        match parse_message(message) {
            Ok(msg) => Some(ParsedCommit {
                commit_type: msg.commit_type,
                scope: msg.scope,
                subject: msg.subject,
                body: msg.body,
                notes: msg.notes,
                source,
                from_body,
            }),
            Err(err) if self.config.include_invalid => {
                debug!(source, error = %err, "keeping invalid commit as other");
                Some(ParsedCommit {
                    commit_type: FALLBACK_TYPE.to_string(),
                    scope: None,
                    subject: message.trim().to_string(),
                    body: None,
                    notes: Vec::new(),
                    source,
                    from_body,
                })
            }
            Err(err) => {
                debug!(source, error = %err, "dropping invalid commit");
                None
            }
        }
    }
}
