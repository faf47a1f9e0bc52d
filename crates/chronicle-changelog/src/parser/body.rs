//! Embedded commits in a message body
//!
//! Squash merges often carry one conventional header per original commit in
//! the body, usually as a bullet list. Each header-shaped line starts a new
//! sub-message; the lines after it, trimmed, belong to it until the next
//! header-shaped line. Lines before the first header belong to nothing.

use super::conventional::is_header_line;

/// Lazy iterator over the sub-messages of a body
pub struct BodyCommits<'a> {
    lines: std::iter::Peekable<std::str::Lines<'a>>,
}

impl<'a> BodyCommits<'a> {
    /// Split a commit body
    pub fn new(body: &'a str) -> Self {
        Self {
            lines: body.lines().peekable(),
        }
    }
}

/// Strip a markdown bullet in front of an embedded header
fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("* ")
        .or_else(|| trimmed.strip_prefix("- "))
        .unwrap_or(trimmed)
}

/// Trailer tokens without a hyphen that still have the header shape
const TRAILER_TOKENS: &[&str] = &["refs", "ref", "closes", "fixes", "resolves", "see", "cc"];

/// `Signed-off-by: x`, `BREAKING-CHANGE: x`, `Refs: #1`, ...
fn is_trailer(line: &str) -> bool {
    let Some((token, _)) = line.split_once(':') else {
        return false;
    };
    if token.contains('(') || token.ends_with('!') {
        return false;
    }

    let token = token.to_ascii_lowercase();
    token.contains('-') || TRAILER_TOKENS.contains(&token.as_str())
}

fn starts_sub_commit(line: &str) -> bool {
    let line = strip_bullet(line);
    is_header_line(line) && !is_trailer(line)
}

impl Iterator for BodyCommits<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // Skip to the next header-shaped line
        let header = loop {
            let line = self.lines.next()?;
            if starts_sub_commit(line) {
                break strip_bullet(line);
            }
        };

        let mut buffer = vec![header];
        while let Some(line) = self.lines.next_if(|l| !starts_sub_commit(l)) {
            buffer.push(line.trim());
        }

        Some(buffer.join("\n").trim_end().to_string())
    }
}
