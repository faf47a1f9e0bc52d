//! Changelog types

use serde::{Deserialize, Serialize};

use chronicle_git::{CommitRecord, RelatedIssue};

/// Title of the footer note that marks an incompatible change
pub const BREAKING_CHANGE: &str = "BREAKING CHANGE";

/// Type given to commits kept despite failing to parse
pub const FALLBACK_TYPE: &str = "other";

/// A footer note from a conventional commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Footer token (e.g., "BREAKING CHANGE", "Refs")
    pub title: String,
    /// Footer value, continuation lines joined with newlines
    pub text: String,
}

impl Note {
    /// Create a new note
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }

    /// Whether this note announces a breaking change
    pub fn is_breaking(&self) -> bool {
        self.title == BREAKING_CHANGE
    }
}

/// A commit message interpreted against the conventional commit grammar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Commit type, lower-cased (feat, fix, ... or "other")
    pub commit_type: String,
    /// Scope (optional, in parentheses)
    pub scope: Option<String>,
    /// Subject line, reference markers still embedded
    pub subject: String,
    /// Commit body
    pub body: Option<String>,
    /// Footer notes in message order
    pub notes: Vec<Note>,
    /// Index of the originating commit in the run's commit list
    pub source: usize,
    /// Whether this entry was found inside another commit's body
    pub from_body: bool,
}

impl ParsedCommit {
    /// Breaking-change notes of this commit
    pub fn breaking_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| n.is_breaking())
    }
}

/// One breaking-change note, attached to the commit that carried it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    /// Full hash of the source commit
    pub sha: String,
    /// Web URL of the source commit
    pub url: String,
    /// Author login of the source commit
    pub author: Option<String>,
    /// Author profile URL
    pub author_url: Option<String>,
    /// Subject of the parsed commit carrying the note
    pub subject: String,
    /// Note body
    pub text: String,
}

/// One commit line of a changelog section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Full hash of the source commit
    pub sha: String,
    /// Web URL of the source commit
    pub url: String,
    /// Author login of the source commit
    pub author: Option<String>,
    /// Author profile URL
    pub author_url: Option<String>,
    /// Commit scope
    pub scope: Option<String>,
    /// Subject, reference markers still embedded
    pub subject: String,
    /// Pull requests referenced by a trailing `(#N)` marker
    pub pr_numbers: Vec<u64>,
    /// Issues closed by those pull requests
    pub related_issues: Vec<RelatedIssue>,
}

impl ChangelogEntry {
    /// Build an entry from a parsed commit and its source record
    pub fn new(commit: &ParsedCommit, record: &CommitRecord) -> Self {
        Self {
            sha: record.sha.clone(),
            url: record.url.clone(),
            author: record.author.clone(),
            author_url: record.author_url.clone(),
            scope: commit.scope.clone(),
            subject: commit.subject.clone(),
            pr_numbers: Vec::new(),
            related_issues: Vec::new(),
        }
    }

    /// First non-blank line of the subject
    ///
    /// Commits kept as "other" carry their whole raw message as subject; only
    /// this line is rendered.
    pub fn headline(&self) -> &str {
        self.subject
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
    }

    /// Short hash (first 7 characters)
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

impl BreakingChange {
    /// Short hash (first 7 characters)
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }
}

fn short_sha(sha: &str) -> &str {
    let end = sha.char_indices().nth(7).map(|(i, _)| i).unwrap_or(sha.len());
    &sha[..end]
}

/// A category section in a changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section label ("New Features", ...)
    pub label: String,
    /// Gitmoji shortcode for the header
    pub icon: String,
    /// Verb used on related-issue lines ("fixes", "addresses")
    pub issue_prefix: String,
    /// Entries in display order
    pub entries: Vec<ChangelogEntry>,
}

impl Section {
    /// Check if section is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one release contributes to the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogModel {
    /// Version label (the newer ref)
    pub version: String,
    /// Breaking changes, rendered before any section
    pub breaking_changes: Vec<BreakingChange>,
    /// Non-empty category sections in priority order
    pub sections: Vec<Section>,
}

impl ChangelogModel {
    /// Create an empty model for a version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            breaking_changes: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Check if there is nothing to render
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.breaking_changes.is_empty()
    }

    /// Every pull request number referenced by a section entry, in order
    pub fn pr_numbers(&self) -> impl Iterator<Item = u64> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.entries.iter())
            .flat_map(|e| e.pr_numbers.iter().copied())
    }
}
