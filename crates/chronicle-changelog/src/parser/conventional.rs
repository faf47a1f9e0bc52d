//! Conventional Commits parser
//!
//! Parses commit messages following the Conventional Commits specification:
//! https://www.conventionalcommits.org/
//!
//! Recognition runs in three phases over the message lines: the header line,
//! then body paragraphs, then trailing footers. A footer-shaped line only
//! switches to the footer phase when it opens a paragraph, except for
//! `BREAKING CHANGE` which is recognized on any body line. Once in the footer
//! phase, lines that are not footers continue the previous footer's value.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::types::{Note, BREAKING_CHANGE};

/// Regex for the header line
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<type>[A-Za-z][A-Za-z0-9_-]*)(?:\((?P<scope>[^()]+)\))?(?P<breaking>!)?: (?P<subject>.*\S.*)$",
    )
    .expect("Invalid regex")
});

/// Regex for footer lines (`Token: value` or `Token #value`)
static FOOTER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<token>(?i:BREAKING[ -]CHANGE)|[A-Za-z][A-Za-z0-9-]*)(?::[ \t]*(?P<value>.*)|[ \t](?P<hash>#.*))$",
    )
    .expect("Invalid regex")
});

/// Why a message does not follow the grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Message is empty or whitespace
    #[error("empty commit message")]
    EmptyMessage,

    /// First line is not `type[(scope)][!]: subject`
    #[error("missing `type: subject` header, got: {0}")]
    MissingHeader(String),
}

/// A message split into its conventional parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalMessage {
    /// Commit type, lower-cased
    pub commit_type: String,
    /// Scope
    pub scope: Option<String>,
    /// Whether the header carried the `!` marker
    pub breaking_marker: bool,
    /// Subject line
    pub subject: String,
    /// Body paragraphs
    pub body: Option<String>,
    /// Footers in message order
    pub notes: Vec<Note>,
}

impl ConventionalMessage {
    /// Whether the message announces a breaking change
    pub fn is_breaking(&self) -> bool {
        self.breaking_marker || self.notes.iter().any(Note::is_breaking)
    }
}

/// Check if a single line has the header shape
pub fn is_header_line(line: &str) -> bool {
    HEADER_REGEX.is_match(line.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Body,
    Footer,
}

/// Parse a raw commit message
pub fn parse_message(message: &str) -> Result<ConventionalMessage, GrammarError> {
    let normalized = message.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Err(GrammarError::EmptyMessage);
    }

    let mut lines = trimmed.lines();
    let header = lines.next().unwrap_or_default().trim();
    let caps = HEADER_REGEX
        .captures(header)
        .ok_or_else(|| GrammarError::MissingHeader(header.to_string()))?;

    let commit_type = caps["type"].to_lowercase();
    let scope = caps.name("scope").map(|m| m.as_str().trim().to_string());
    let breaking_marker = caps.name("breaking").is_some();
    let subject = caps["subject"].trim().to_string();

    let mut phase = Phase::Body;
    let mut paragraph_start = true;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut notes: Vec<Note> = Vec::new();

    for line in lines {
        match phase {
            Phase::Body => {
                if line.trim().is_empty() {
                    body_lines.push("");
                    paragraph_start = true;
                    continue;
                }

                match footer(line) {
                    Some(note) if paragraph_start || note.is_breaking() => {
                        phase = Phase::Footer;
                        notes.push(note);
                    }
                    _ => body_lines.push(line),
                }
                paragraph_start = false;
            }
            Phase::Footer => match footer(line) {
                Some(note) => notes.push(note),
                None => {
                    if let Some(last) = notes.last_mut() {
                        last.text.push('\n');
                        last.text.push_str(line.trim());
                    }
                }
            },
        }
    }

    for note in &mut notes {
        note.text = note.text.trim().to_string();
    }

    if breaking_marker && !notes.iter().any(Note::is_breaking) {
        notes.push(Note::new(BREAKING_CHANGE, subject.clone()));
    }

    let body = body_lines.join("\n").trim().to_string();

    Ok(ConventionalMessage {
        commit_type,
        scope: scope.filter(|s| !s.is_empty()),
        breaking_marker,
        subject,
        body: (!body.is_empty()).then_some(body),
        notes,
    })
}

fn footer(line: &str) -> Option<Note> {
    let caps = FOOTER_REGEX.captures(line.trim_end())?;
    let token = &caps["token"];

    let title = if token.len() == BREAKING_CHANGE.len()
        && token.to_ascii_uppercase().replace('-', " ") == BREAKING_CHANGE
    {
        BREAKING_CHANGE.to_string()
    } else {
        token.to_string()
    };

    let text = caps
        .name("value")
        .or_else(|| caps.name("hash"))
        .map(|m| m.as_str())
        .unwrap_or_default();

    Some(Note::new(title, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_feat() {
        let parsed = parse_message("feat: add new feature").unwrap();

        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.subject, "add new feature");
        assert!(parsed.scope.is_none());
        assert!(!parsed.is_breaking());
        assert!(parsed.body.is_none());
    }

    #[test]
    fn test_parse_with_scope() {
        let parsed = parse_message("fix(parser): handle edge case").unwrap();

        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.scope, Some("parser".to_string()));
        assert_eq!(parsed.subject, "handle edge case");
    }

    #[test]
    fn test_type_is_lowercased() {
        let parsed = parse_message("FEAT(Api): shout").unwrap();
        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.scope.as_deref(), Some("Api"));
    }

    #[test]
    fn test_breaking_marker_synthesizes_note() {
        let parsed = parse_message("refactor(core)!: drop legacy config").unwrap();

        assert!(parsed.breaking_marker);
        assert_eq!(parsed.notes, vec![Note::new(BREAKING_CHANGE, "drop legacy config")]);
    }

    #[test]
    fn test_breaking_marker_keeps_explicit_note() {
        let parsed =
            parse_message("feat!: new auth\n\nBREAKING CHANGE: tokens must be rotated").unwrap();

        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].text, "tokens must be rotated");
    }

    #[test]
    fn test_non_conventional_is_grammar_error() {
        assert_eq!(
            parse_message("Just a regular commit message"),
            Err(GrammarError::MissingHeader("Just a regular commit message".to_string()))
        );
        assert_eq!(parse_message("  \n "), Err(GrammarError::EmptyMessage));
        assert!(parse_message("feat:no space").is_err());
        assert!(parse_message("feat(): empty scope").is_err());
        assert!(parse_message("feat:   ").is_err());
    }

    #[test]
    fn test_parse_with_body() {
        let parsed = parse_message("feat: add feature\n\nThis is the body\n\nWith multiple paragraphs.")
            .unwrap();

        assert_eq!(
            parsed.body.as_deref(),
            Some("This is the body\n\nWith multiple paragraphs.")
        );
        assert!(parsed.notes.is_empty());
    }

    #[test]
    fn test_parse_with_footers() {
        let parsed = parse_message("feat: add feature\n\nBody text\n\nRefs #123\nReviewed-by: Z").unwrap();

        assert_eq!(parsed.body.as_deref(), Some("Body text"));
        assert_eq!(
            parsed.notes,
            vec![Note::new("Refs", "#123"), Note::new("Reviewed-by", "Z")]
        );
    }

    #[test]
    fn test_breaking_footer_variants() {
        for footer in [
            "BREAKING CHANGE: removed x",
            "BREAKING-CHANGE: removed x",
            "breaking change: removed x",
        ] {
            let parsed = parse_message(&format!("fix: y\n\n{}", footer)).unwrap();
            assert!(parsed.is_breaking(), "{footer}");
            assert_eq!(parsed.notes[0].title, BREAKING_CHANGE);
            assert_eq!(parsed.notes[0].text, "removed x");
        }
    }

    #[test]
    fn test_footer_continuation_lines() {
        let parsed = parse_message(
            "feat: x\n\nBREAKING CHANGE: the config format changed\n  migrate with `tool migrate`\n\nsee docs",
        )
        .unwrap();

        assert_eq!(
            parsed.notes[0].text,
            "the config format changed\nmigrate with `tool migrate`\n\nsee docs"
        );
    }

    #[test]
    fn test_footer_shape_mid_paragraph_stays_body() {
        let parsed = parse_message("fix: y\n\nWe changed things\nNote: this line is body").unwrap();

        assert!(parsed.notes.is_empty());
        assert_eq!(
            parsed.body.as_deref(),
            Some("We changed things\nNote: this line is body")
        );
    }

    #[test]
    fn test_breaking_footer_without_blank_line() {
        let parsed =
            parse_message("feat: new api\n\nRewrote the handler.\nBREAKING CHANGE: old endpoint removed")
                .unwrap();

        assert!(parsed.is_breaking());
        assert_eq!(parsed.body.as_deref(), Some("Rewrote the handler."));
        assert_eq!(parsed.notes, vec![Note::new(BREAKING_CHANGE, "old endpoint removed")]);
    }

    #[test]
    fn test_crlf_input() {
        let parsed = parse_message("fix: y\r\n\r\nBREAKING CHANGE: z\r\n").unwrap();
        assert_eq!(parsed.notes, vec![Note::new(BREAKING_CHANGE, "z")]);
    }

    #[test]
    fn test_is_header_line() {
        assert!(is_header_line("feat(ui): x"));
        assert!(is_header_line("  fix: y  "));
        assert!(!is_header_line("Merge branch 'main'"));
    }
}
