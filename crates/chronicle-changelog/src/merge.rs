//! Changelog document merging
//!
//! New releases are spliced in above the most recent `## ` section, keeping
//! the document newest-first. A document whose most recent section already
//! carries the release label is left alone, so re-running is harmless.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use chronicle_core::error::ChangelogError;

use crate::formatter::RenderedChangelog;

/// Marker that starts a version section
const VERSION_HEADER: &str = "## ";

/// Header written when the document doesn't exist yet
pub const BOILERPLATE: &str = "# Changelog
All notable changes to this project will be documented in this file.

The format is based on [Keep a Changelog](https://keepachangelog.com/en/1.0.0/),
and this project adheres to [Semantic Versioning](https://semver.org/spec/v2.0.0.html).
";

/// A release ready to be spliced into the document
#[derive(Debug, Clone)]
pub struct ReleaseSection<'a> {
    /// Version label (`v1.2.0`)
    pub label: &'a str,
    /// Release date
    pub date: NaiveDate,
    /// Rendered section body
    pub body: &'a RenderedChangelog,
    /// Compare view for the release range
    pub compare_url: String,
}

impl ReleaseSection<'_> {
    fn header(&self) -> String {
        format!("## [{}] - {}", self.label, self.date.format("%Y-%m-%d"))
    }

    fn link_definition(&self) -> String {
        format!("[{}]: {}", self.label, self.compare_url)
    }
}

/// Result of merging a release into a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New document text
    Updated(String),
    /// The most recent section already is this release
    AlreadyReleased,
}

/// Merge a release into existing document text (or a fresh document)
#[instrument(skip(existing, release), fields(label = release.label))]
pub fn merge_document(existing: Option<&str>, release: &ReleaseSection<'_>) -> MergeOutcome {
    let text = existing.unwrap_or(BOILERPLATE).replace("\r\n", "\n");
    let lines: Vec<&str> = text.lines().collect();

    let anchor = lines.iter().position(|l| l.starts_with(VERSION_HEADER));
    let current = format!("## [{}]", release.label);

    if let Some(idx) = anchor {
        if lines[idx].starts_with(&current) {
            info!(label = release.label, "version already present in changelog");
            return MergeOutcome::AlreadyReleased;
        }
    }

    let split = anchor.unwrap_or(lines.len());
    let (before, after) = lines.split_at(split);

    let mut output: Vec<String> = before.iter().map(|l| l.to_string()).collect();
    while output.last().is_some_and(|l| l.trim().is_empty()) {
        output.pop();
    }
    if !output.is_empty() {
        output.push(String::new());
    }

    output.push(release.header());
    output.push(String::new());
    output.extend(release.body.lines.iter().cloned());
    if output.last().is_some_and(|l| !l.is_empty()) {
        output.push(String::new());
    }
    output.extend(after.iter().map(|l| l.to_string()));

    while output.last().is_some_and(|l| l.trim().is_empty()) {
        output.pop();
    }
    if !output.last().is_some_and(|l| is_link_definition(l)) {
        output.push(String::new());
    }
    output.push(release.link_definition());

    debug!(line_count = output.len(), anchored = anchor.is_some(), "changelog merged");

    let mut document = output.join("\n");
    document.push('\n');
    MergeOutcome::Updated(document)
}

fn is_link_definition(line: &str) -> bool {
    line.starts_with('[') && line.contains("]: ")
}

/// Read a document, `None` when it doesn't exist
pub fn read_document(path: &Path) -> Result<Option<String>, ChangelogError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ChangelogError::Io(e)),
    }
}

/// Replace a document in one step (write a sibling temp file, then rename)
#[instrument(skip(contents), fields(path = %path.display(), bytes = contents.len()))]
pub fn write_document(path: &Path, contents: &str) -> Result<(), ChangelogError> {
    let write_failed = |reason: String| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| write_failed(e.to_string()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| write_failed(e.to_string()))?;
    temp.persist(path)
        .map_err(|e| write_failed(e.error.to_string()))?;

    info!(path = %path.display(), "changelog written");
    Ok(())
}
