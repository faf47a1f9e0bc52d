//! Line renderer for every changelog variant

use serde::Serialize;
use tracing::{debug, instrument};

use chronicle_git::RelatedIssue;

use super::{LinkStyle, RepoLinks};
use crate::references::{decorate_subject, Attribution};
use crate::types::{BreakingChange, ChangelogEntry, ChangelogModel, Section};

const BREAKING_LABEL: &str = "BREAKING CHANGES";
const BREAKING_ICON: &str = ":boom:";
const ISSUE_ICON: &str = ":arrow_lower_right:";

/// Rendered changelog lines
///
/// Sections are separated by one blank line and the last line is always a
/// blank terminator, so the text form ends with an empty line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedChangelog {
    /// Lines without line endings
    pub lines: Vec<String>,
}

impl RenderedChangelog {
    /// Check if nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    /// Lines joined, each followed by a newline
    pub fn to_text(&self) -> String {
        self.lines.iter().fold(String::new(), |mut out, line| {
            out.push_str(line);
            out.push('\n');
            out
        })
    }
}

/// Renders a changelog model in a given link style
#[derive(Debug, Clone)]
pub struct ChangelogRenderer {
    links: RepoLinks,
    use_gitmojis: bool,
}

impl ChangelogRenderer {
    /// Create a new renderer
    pub fn new(links: RepoLinks, use_gitmojis: bool) -> Self {
        Self {
            links,
            use_gitmojis,
        }
    }

    /// Render the model
    #[instrument(skip(self, model), fields(version = %model.version, sections = model.sections.len()))]
    pub fn render(&self, model: &ChangelogModel, style: LinkStyle) -> RenderedChangelog {
        let mut blocks: Vec<Vec<String>> = Vec::new();

        if !model.breaking_changes.is_empty() {
            blocks.push(self.breaking_block(&model.breaking_changes, style));
        }

        for section in model.sections.iter().filter(|s| !s.is_empty()) {
            blocks.push(self.section_block(section, style));
        }

        if blocks.is_empty() {
            return RenderedChangelog::default();
        }

        let mut lines: Vec<String> = Vec::new();
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.extend(block);
        }
        lines.push(String::new());

        debug!(?style, line_count = lines.len(), "changelog rendered");
        RenderedChangelog { lines }
    }

    fn header(&self, icon: &str, label: &str, style: LinkStyle) -> String {
        let title = if self.use_gitmojis {
            format!("{} {}", icon, label)
        } else {
            label.to_string()
        };

        match style {
            LinkStyle::Chat => format!("*{}*", title),
            _ => format!("### {}", title),
        }
    }

    fn commit_ref(&self, short_sha: &str, url: &str, style: LinkStyle) -> String {
        match style {
            LinkStyle::None => format!("`{}`", short_sha),
            LinkStyle::Chat => style.link(short_sha, url),
            _ => style.link(&format!("`{}`", short_sha), url),
        }
    }

    fn breaking_block(&self, changes: &[BreakingChange], style: LinkStyle) -> Vec<String> {
        let mut lines = vec![self.header(BREAKING_ICON, BREAKING_LABEL, style)];

        for change in changes {
            let author = Attribution::new(change.author.as_deref(), change.author_url.as_deref());
            let subject = decorate_subject(&change.subject, author, style, &self.links);
            let commit = self.commit_ref(change.short_sha(), &change.url, style);

            lines.push(format!("- due to {} - {}:", commit, subject.text));
            lines.push(String::new());
            lines.extend(change.text.lines().map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("  {}", line)
                }
            }));
        }

        lines
    }

    fn section_block(&self, section: &Section, style: LinkStyle) -> Vec<String> {
        let mut lines = vec![self.header(&section.icon, &section.label, style)];

        for entry in &section.entries {
            lines.push(self.entry_line(entry, style));
            lines.extend(
                entry
                    .related_issues
                    .iter()
                    .map(|issue| self.issue_line(issue, &section.issue_prefix, style)),
            );
        }

        lines
    }

    fn entry_line(&self, entry: &ChangelogEntry, style: LinkStyle) -> String {
        let author = Attribution::new(entry.author.as_deref(), entry.author_url.as_deref());
        let subject = decorate_subject(entry.headline(), author, style, &self.links);
        let commit = self.commit_ref(entry.short_sha(), &entry.url, style);

        let scope = match (&entry.scope, style) {
            (Some(scope), LinkStyle::Chat) => format!("*{}*: ", scope),
            (Some(scope), _) => format!("**{}**: ", scope),
            (None, _) => String::new(),
        };

        format!("- {} - {}{}", commit, scope, subject.text)
    }

    fn issue_line(&self, issue: &RelatedIssue, prefix: &str, style: LinkStyle) -> String {
        let em = style.emphasis();
        let icon = if self.use_gitmojis {
            format!("{} ", ISSUE_ICON)
        } else {
            String::new()
        };

        let number = format!("#{}", issue.number);
        let number = if style.links_references() {
            style.link(&number, &issue.url)
        } else {
            number
        };

        let opener = Attribution::new(issue.author_login.as_deref(), issue.author_url.as_deref())
            .render(style);

        match opener {
            Some(user) => format!("  - {icon}{em}{} issue {} opened by {}{em}", prefix, number, user),
            None => format!("  - {icon}{em}{} issue {}{em}", prefix, number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::RepoSlug;

    fn renderer(use_gitmojis: bool) -> ChangelogRenderer {
        ChangelogRenderer::new(
            RepoLinks::new("https://github.com", &RepoSlug::new("octo", "hello")),
            use_gitmojis,
        )
    }

    fn entry(sha: &str, scope: Option<&str>, subject: &str, author: Option<&str>) -> ChangelogEntry {
        ChangelogEntry {
            sha: sha.to_string(),
            url: format!("https://github.com/octo/hello/commit/{}", sha),
            author: author.map(str::to_string),
            author_url: author.map(|a| format!("https://github.com/{}", a)),
            scope: scope.map(str::to_string),
            subject: subject.to_string(),
            pr_numbers: vec![],
            related_issues: vec![],
        }
    }

    fn section(label: &str, icon: &str, prefix: &str, entries: Vec<ChangelogEntry>) -> Section {
        Section {
            label: label.to_string(),
            icon: icon.to_string(),
            issue_prefix: prefix.to_string(),
            entries,
        }
    }

    fn two_section_model() -> ChangelogModel {
        let mut model = ChangelogModel::new("v1.1.0");
        model.sections = vec![
            section(
                "New Features",
                ":sparkles:",
                "addresses",
                vec![entry("aaaaaaa1111", None, "add OAuth (#10)", Some("alice"))],
            ),
            section(
                "Bug Fixes",
                ":bug:",
                "fixes",
                vec![entry("bbbbbbb2222", None, "null pointer", None)],
            ),
        ];
        model
    }

    #[test]
    fn test_two_sections_plain() {
        let text = renderer(false)
            .render(&two_section_model(), LinkStyle::None)
            .to_text();

        assert_eq!(
            text,
            "### New Features\n\
             - `aaaaaaa` - add OAuth *(PR #10 by @alice)*\n\
             \n\
             ### Bug Fixes\n\
             - `bbbbbbb` - null pointer\n\
             \n"
        );
    }

    #[test]
    fn test_gitmoji_headers() {
        let rendered = renderer(true).render(&two_section_model(), LinkStyle::Permanent);
        assert_eq!(rendered.lines[0], "### :sparkles: New Features");
        assert_eq!(rendered.lines[3], "### :bug: Bug Fixes");
    }

    #[test]
    fn test_variants_stay_in_sync() {
        let mut model = two_section_model();
        model.breaking_changes.push(BreakingChange {
            sha: "ccccccc3333".to_string(),
            url: "https://github.com/octo/hello/commit/ccccccc3333".to_string(),
            author: None,
            author_url: None,
            subject: "drop v1 api".to_string(),
            text: "clients must upgrade".to_string(),
        });
        let r = renderer(true);

        let variants: Vec<RenderedChangelog> = [
            LinkStyle::None,
            LinkStyle::Transient,
            LinkStyle::Permanent,
            LinkStyle::Chat,
        ]
        .into_iter()
        .map(|style| r.render(&model, style))
        .collect();

        for variant in &variants {
            assert_eq!(variant.lines.len(), variants[0].lines.len());
            for (a, b) in variant.lines.iter().zip(&variants[0].lines) {
                assert_eq!(a.is_empty(), b.is_empty());
            }
        }
    }

    #[test]
    fn test_breaking_block_comes_first() {
        let mut model = two_section_model();
        model.breaking_changes.push(BreakingChange {
            sha: "ccccccc3333".to_string(),
            url: "https://github.com/octo/hello/commit/ccccccc3333".to_string(),
            author: Some("carol".to_string()),
            author_url: Some("https://github.com/carol".to_string()),
            subject: "drop v1 api".to_string(),
            text: "clients must upgrade\n\nsee migration guide".to_string(),
        });

        let rendered = renderer(false).render(&model, LinkStyle::Permanent);
        let lines = &rendered.lines;

        assert_eq!(lines[0], "### BREAKING CHANGES");
        assert_eq!(
            lines[1],
            "- due to [`ccccccc`](https://github.com/octo/hello/commit/ccccccc3333) - drop v1 api *(commit by [@carol](https://github.com/carol))*:"
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "  clients must upgrade");
        assert_eq!(lines[5], "  see migration guide");

        let breaking = lines.iter().position(|l| l.contains("BREAKING")).unwrap();
        let first_section = lines.iter().position(|l| l.contains("New Features")).unwrap();
        assert!(breaking < first_section);
        assert_eq!(lines[first_section - 1], "");
    }

    #[test]
    fn test_scope_and_issue_lines() {
        let mut fix = entry("ddddddd4444", Some("auth"), "expire sessions (#21)", Some("dave"));
        fix.related_issues.push(RelatedIssue {
            number: 20,
            url: "https://github.com/octo/hello/issues/20".to_string(),
            author_login: Some("erin".to_string()),
            author_url: Some("https://github.com/erin".to_string()),
        });
        fix.related_issues.push(RelatedIssue {
            number: 19,
            url: "https://github.com/octo/hello/issues/19".to_string(),
            author_login: None,
            author_url: None,
        });

        let mut model = ChangelogModel::new("v2.0.0");
        model.sections = vec![section("Bug Fixes", ":bug:", "fixes", vec![fix])];

        let permanent = renderer(true).render(&model, LinkStyle::Permanent);
        assert!(permanent.lines[1].contains("**auth**: expire sessions"));
        assert_eq!(
            permanent.lines[2],
            "  - :arrow_lower_right: *fixes issue [#20](https://github.com/octo/hello/issues/20) opened by [@erin](https://github.com/erin)*"
        );
        assert_eq!(permanent.lines[3], "  - :arrow_lower_right: *fixes issue [#19](https://github.com/octo/hello/issues/19)*");

        let chat = renderer(false).render(&model, LinkStyle::Chat);
        assert_eq!(chat.lines[0], "*Bug Fixes*");
        assert!(chat.lines[1].starts_with("- <https://github.com/octo/hello/commit/ddddddd4444|ddddddd> - *auth*: "));
        assert_eq!(
            chat.lines[2],
            "  - _fixes issue <https://github.com/octo/hello/issues/20|#20> opened by <https://github.com/erin|@erin>_"
        );
    }

    #[test]
    fn test_multiline_subject_renders_one_line() {
        let mut model = ChangelogModel::new("v1.1.0");
        model.sections = vec![section(
            "Other Changes",
            ":flying_saucer:",
            "addresses",
            vec![entry("aaaaaaa1111", None, "Update deps (#7)\n\n## Details\n- bump x", None)],
        )];

        for style in [LinkStyle::None, LinkStyle::Permanent, LinkStyle::Chat] {
            let rendered = renderer(false).render(&model, style);
            assert_eq!(rendered.lines.len(), 3);
            assert!(rendered.lines.iter().all(|l| !l.contains('\n')));
            assert!(rendered.lines[1].contains("Update deps"));
            assert!(!rendered.lines[1].contains("Details"));
        }
    }

    #[test]
    fn test_empty_model_renders_nothing() {
        let rendered = renderer(true).render(&ChangelogModel::new("v1"), LinkStyle::Permanent);
        assert!(rendered.is_empty());
        assert_eq!(rendered.to_text(), "");
    }
}
