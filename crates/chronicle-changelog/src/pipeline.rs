//! End-to-end changelog run
//!
//! Resolve the range, fetch its commits, generate the model, render the
//! requested variants and, when enabled, merge the release into the changelog
//! file. Fatal errors abort before anything is written.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use chronicle_core::{ChangelogSettings, RepoSlug};
use chronicle_git::{fetch_commits, resolve_range, CommitRange, HistoryProvider};

use crate::formatter::{ChangelogRenderer, LinkStyle, RepoLinks};
use crate::generator::{ChangelogGenerator, GeneratorOptions};
use crate::merge::{merge_document, read_document, write_document, MergeOutcome, ReleaseSection};
use crate::types::ChangelogModel;

/// Where and when a run happens
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Repository the links point at
    pub slug: RepoSlug,
    /// Directory relative changelog paths resolve against
    pub root: PathBuf,
    /// Date written in the release header
    pub date: NaiveDate,
}

impl RunContext {
    /// Create a context dated today (UTC)
    pub fn new(slug: RepoSlug, root: impl Into<PathBuf>) -> Self {
        Self {
            slug,
            root: root.into(),
            date: Utc::now().date_naive(),
        }
    }

    /// Override the release date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// What happened to the changelog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "path", rename_all = "snake_case")]
pub enum FileUpdate {
    /// Writing was not requested
    Disabled,
    /// The release was merged and the file rewritten
    Written(PathBuf),
    /// The file already starts with this release
    AlreadyReleased(PathBuf),
}

/// A successful run with something to report
#[derive(Debug, Clone, Serialize)]
pub struct ChangelogRun {
    /// Resolved range
    pub range: CommitRange,
    /// Generated model
    pub model: ChangelogModel,
    /// Output-variable markdown
    pub changes: String,
    /// Chat-formatted variant, when requested
    pub changes_for_slack: Option<String>,
    /// Changelog file result
    pub changelog_file: FileUpdate,
    /// Non-fatal problems (failed issue lookups)
    pub warnings: Vec<String>,
}

/// Result of a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Changelog generated
    Generated(ChangelogRun),
    /// Every category and breaking change was filtered out
    NothingToAdd {
        /// Resolved range
        range: CommitRange,
    },
}

/// Run the whole pipeline against a provider
#[instrument(skip(provider, settings, context), fields(provider = provider.name(), repo = %context.slug))]
pub async fn run_changelog<P>(
    provider: &P,
    settings: &ChangelogSettings,
    context: &RunContext,
) -> chronicle_core::Result<RunOutcome>
where
    P: HistoryProvider + ?Sized,
{
    let request = settings.range_request()?;
    let range = resolve_range(provider, &request).await?;
    let commits = fetch_commits(provider, &range).await?;

    let mut generator = ChangelogGenerator::new(provider, GeneratorOptions::from_settings(settings));
    let model = generator.generate(&range.newer, &commits).await?;
    let warnings: Vec<String> = generator.warnings().iter().map(|w| w.to_string()).collect();

    if model.is_empty() {
        warn!(range = %range, "nothing to add to changelog because of excluded types");
        return Ok(RunOutcome::NothingToAdd { range });
    }

    let links = RepoLinks::new(&settings.server_url, &context.slug);
    let renderer = ChangelogRenderer::new(links.clone(), settings.use_gitmojis);

    let output_style = if settings.include_links_to_github {
        LinkStyle::Transient
    } else {
        LinkStyle::None
    };
    let changes = renderer.render(&model, output_style).to_text();
    let changes_for_slack = settings
        .format_for_slack
        .then(|| renderer.render(&model, LinkStyle::Chat).to_text());

    let changelog_file = if settings.write_to_file {
        let path = context.root.join(&settings.changelog_file_path);
        let body = renderer.render(&model, LinkStyle::Permanent);
        let release = ReleaseSection {
            label: &range.newer,
            date: context.date,
            body: &body,
            compare_url: links.compare(&range),
        };
        update_file(&path, &release)?
    } else {
        FileUpdate::Disabled
    };

    info!(
        range = %range,
        sections = model.sections.len(),
        breaking = model.breaking_changes.len(),
        "changelog generated"
    );

    Ok(RunOutcome::Generated(ChangelogRun {
        range,
        model,
        changes,
        changes_for_slack,
        changelog_file,
        warnings,
    }))
}

fn update_file(path: &Path, release: &ReleaseSection<'_>) -> chronicle_core::Result<FileUpdate> {
    let existing = read_document(path)?;

    match merge_document(existing.as_deref(), release) {
        MergeOutcome::Updated(text) => {
            write_document(path, &text)?;
            Ok(FileUpdate::Written(path.to_path_buf()))
        }
        MergeOutcome::AlreadyReleased => {
            warn!(
                path = %path.display(),
                label = release.label,
                "existing version found in changelog, skipping write"
            );
            Ok(FileUpdate::AlreadyReleased(path.to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::error::{ConfigError, RangeError};
    use chronicle_core::{ChronicleError, Language};
    use chronicle_git::{CommitRecord, MockHistoryProvider, RelatedIssue};
    use tempfile::TempDir;

    fn make_commit(sha: &str, message: &str, author: Option<&str>) -> CommitRecord {
        let record = CommitRecord::new(
            sha,
            format!("https://github.com/octo/hello/commit/{}", sha),
            message,
        );
        match author {
            Some(login) => record.with_author(login, format!("https://github.com/{}", login)),
            None => record,
        }
    }

    fn scenario_provider() -> MockHistoryProvider {
        MockHistoryProvider::new()
            .with_tags(["v1.1.0", "v1.0.0"])
            .with_commits(vec![
                make_commit("aaaaaaa1111", "feat: add OAuth (#10)", Some("alice")),
                make_commit("bbbbbbb2222", "fix: null pointer", None),
            ])
            .with_issues(
                10,
                vec![RelatedIssue {
                    number: 9,
                    url: "https://github.com/octo/hello/issues/9".to_string(),
                    author_login: Some("bob".to_string()),
                    author_url: Some("https://github.com/bob".to_string()),
                }],
            )
    }

    fn settings(temp: &TempDir) -> ChangelogSettings {
        ChangelogSettings {
            tag: Some("v1.1.0".to_string()),
            exclude_types: vec![],
            use_gitmojis: false,
            include_ref_issues: false,
            changelog_file_path: temp.path().join("CHANGELOG.md"),
            ..Default::default()
        }
    }

    fn context(temp: &TempDir) -> RunContext {
        RunContext::new(RepoSlug::new("octo", "hello"), temp.path())
            .with_date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    fn generated(outcome: RunOutcome) -> ChangelogRun {
        match outcome {
            RunOutcome::Generated(run) => run,
            RunOutcome::NothingToAdd { .. } => panic!("expected a generated changelog"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_commit_scenario() {
        let temp = TempDir::new().unwrap();
        let provider = scenario_provider();
        let settings = ChangelogSettings {
            include_links_to_github: false,
            write_to_file: false,
            ..settings(&temp)
        };

        let run = generated(run_changelog(&provider, &settings, &context(&temp)).await.unwrap());

        assert_eq!(run.range, CommitRange::new("v1.0.0", "v1.1.0"));
        assert_eq!(
            run.changes,
            "### New Features\n\
             - `aaaaaaa` - add OAuth *(PR #10 by @alice)*\n\
             \n\
             ### Bug Fixes\n\
             - `bbbbbbb` - null pointer\n\
             \n"
        );
        assert!(run.changes_for_slack.is_none());
        assert_eq!(run.changelog_file, FileUpdate::Disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chinese_section_headers() {
        let temp = TempDir::new().unwrap();
        let provider = scenario_provider();
        let settings = ChangelogSettings {
            language: Language::Zh,
            use_gitmojis: true,
            include_links_to_github: false,
            write_to_file: false,
            ..settings(&temp)
        };

        let run = generated(run_changelog(&provider, &settings, &context(&temp)).await.unwrap());

        let headers: Vec<&str> = run.changes.lines().filter(|l| l.starts_with("###")).collect();
        assert_eq!(headers, vec!["### :sparkles: 新特性", "### :bug: `Bug` 修复"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_file_written_once() {
        let temp = TempDir::new().unwrap();
        let provider = scenario_provider();
        let settings = ChangelogSettings {
            include_ref_issues: true,
            format_for_slack: true,
            ..settings(&temp)
        };
        let path = temp.path().join("CHANGELOG.md");

        let first = generated(run_changelog(&provider, &settings, &context(&temp)).await.unwrap());
        assert_eq!(first.changelog_file, FileUpdate::Written(path.clone()));
        let after_first = std::fs::read_to_string(&path).unwrap();

        assert!(after_first.contains("## [v1.1.0] - 2024-05-01"));
        assert!(after_first.contains("[#10](https://github.com/octo/hello/pull/10)"));
        assert!(after_first.contains("*addresses issue [#9](https://github.com/octo/hello/issues/9) opened by [@bob](https://github.com/bob)*"));
        assert!(after_first.ends_with("[v1.1.0]: https://github.com/octo/hello/compare/v1.0.0...v1.1.0\n"));
        assert!(run_contains_slack(&first));

        let second = generated(run_changelog(&provider, &settings, &context(&temp)).await.unwrap());
        assert_eq!(second.changelog_file, FileUpdate::AlreadyReleased(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
    }

    fn run_contains_slack(run: &ChangelogRun) -> bool {
        run.changes_for_slack
            .as_deref()
            .is_some_and(|text| text.contains("*New Features*"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_to_add_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let provider = scenario_provider();
        let settings = ChangelogSettings {
            restrict_to_types: vec!["perf".to_string()],
            ..settings(&temp)
        };

        let outcome = run_changelog(&provider, &settings, &context(&temp)).await.unwrap();

        assert!(matches!(outcome, RunOutcome::NothingToAdd { .. }));
        assert!(!temp.path().join("CHANGELOG.md").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_range_is_fatal() {
        let temp = TempDir::new().unwrap();
        let settings = ChangelogSettings {
            tag: None,
            ..settings(&temp)
        };

        let err = run_changelog(&scenario_provider(), &settings, &context(&temp))
            .await
            .unwrap_err();
        assert!(matches!(err, ChronicleError::Config(ConfigError::MissingRange)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_commit_body_stays_out_of_document() {
        let temp = TempDir::new().unwrap();
        let provider = MockHistoryProvider::new()
            .with_tags(["v1.1.0", "v1.0.0"])
            .with_commits(vec![make_commit(
                "aaaaaaa1111",
                "Update deps\n\n## Details\n- bump x",
                None,
            )]);
        let settings = ChangelogSettings {
            include_invalid_commits: true,
            ..settings(&temp)
        };

        let run = generated(run_changelog(&provider, &settings, &context(&temp)).await.unwrap());
        let document = std::fs::read_to_string(temp.path().join("CHANGELOG.md")).unwrap();

        assert!(document.contains(
            "- [`aaaaaaa`](https://github.com/octo/hello/commit/aaaaaaa1111) - Update deps\n"
        ));
        assert!(!document.contains("## Details"));
        assert!(!run.changes.contains("bump x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_range_is_fatal_and_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let provider = MockHistoryProvider::new().with_tags(["v1.1.0", "v1.0.0"]);

        let err = run_changelog(&provider, &settings(&temp), &context(&temp))
            .await
            .unwrap_err();

        assert!(matches!(err, ChronicleError::Range(RangeError::NoCommits { .. })));
        assert!(!temp.path().join("CHANGELOG.md").exists());
    }
}
