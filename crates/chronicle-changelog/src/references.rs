//! Pull request and issue references in commit subjects
//!
//! A subject ending in `(#N)` names the pull request it was merged through.
//! That marker is replaced by an attribution clause; any other `#N` in the
//! subject is decorated as a plain reference. The trailing marker is removed
//! before the inline pass, so its number is never decorated twice.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::formatter::{LinkStyle, RepoLinks};

/// Trailing pull request marker
static PR_ENDING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(#(\d+)\)$").expect("Invalid regex"));

/// Any `#N` reference
static PR_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B#(\d+)\b").expect("Invalid regex"));

/// Author of the commit a subject belongs to
#[derive(Debug, Clone, Copy, Default)]
pub struct Attribution<'a> {
    /// Platform login
    pub login: Option<&'a str>,
    /// Profile URL
    pub url: Option<&'a str>,
}

impl<'a> Attribution<'a> {
    /// Create an attribution
    pub fn new(login: Option<&'a str>, url: Option<&'a str>) -> Self {
        Self { login, url }
    }

    /// `@login`, linked when the style links references
    pub fn render(&self, style: LinkStyle) -> Option<String> {
        let login = self.login?;
        let handle = format!("@{}", login);
        Some(match self.url {
            Some(url) if style.links_references() => style.link(&handle, url),
            _ => handle,
        })
    }
}

/// A subject with its references rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedSubject {
    /// Rendered subject, attribution clause included
    pub text: String,
    /// Pull request numbers taken from the trailing marker
    pub pr_numbers: Vec<u64>,
}

/// Split off a trailing `(#N)` marker
pub fn trailing_pr(subject: &str) -> Option<(u64, &str)> {
    let subject = subject.trim_end();
    let caps = PR_ENDING_REGEX.captures(subject)?;
    let number = caps[1].parse().ok()?;
    let start = caps.get(0)?.start();
    Some((number, &subject[..start]))
}

/// Pull request numbers to look up for a subject
pub fn pr_numbers(subject: &str) -> Vec<u64> {
    trailing_pr(subject).map(|(n, _)| n).into_iter().collect()
}

fn decorate_inline(text: &str, skip: Option<u64>, style: LinkStyle, links: &RepoLinks) -> String {
    if !style.links_references() {
        return text.to_string();
    }

    PR_ID_REGEX
        .replace_all(text, |caps: &Captures| {
            let reference = &caps[0];
            match caps[1].parse::<u64>() {
                Ok(n) if Some(n) != skip => style.link(reference, &links.issue(n)),
                _ => reference.to_string(),
            }
        })
        .into_owned()
}

/// Render a subject's references for one link style
pub fn decorate_subject(
    subject: &str,
    author: Attribution<'_>,
    style: LinkStyle,
    links: &RepoLinks,
) -> DecoratedSubject {
    let em = style.emphasis();

    match trailing_pr(subject) {
        Some((number, rest)) => {
            let inline = decorate_inline(rest, Some(number), style, links);
            let pr_ref = format!("#{}", number);
            let pr_ref = if style.links_references() {
                style.link(&pr_ref, &links.pull(number))
            } else {
                pr_ref
            };

            let clause = match author.render(style) {
                Some(user) => format!("PR {} by {}", pr_ref, user),
                None => format!("PR {}", pr_ref),
            };

            DecoratedSubject {
                text: format!("{} {em}({}){em}", inline, clause),
                pr_numbers: vec![number],
            }
        }
        None => {
            let inline = decorate_inline(subject.trim_end(), None, style, links);
            let text = match author.render(style) {
                Some(user) => format!("{} {em}(commit by {}){em}", inline, user),
                None => inline,
            };

            DecoratedSubject {
                text,
                pr_numbers: Vec::new(),
            }
        }
    }
}
