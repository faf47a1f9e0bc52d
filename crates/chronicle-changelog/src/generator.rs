//! Changelog generation
//!
//! Turns the raw commits of a range into a [`ChangelogModel`]: parse, collect
//! breaking changes, classify into sections, then look up the issues closed
//! by every referenced pull request.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use chronicle_core::error::{ChangelogError, ProviderError};
use chronicle_core::{ChangelogSettings, Language};
use chronicle_git::{CommitRecord, HistoryProvider, RelatedIssue};

use crate::categories::{classify, CategoryFilter};
use crate::parser::{ConventionalParser, ParserConfig};
use crate::references::pr_numbers;
use crate::types::{BreakingChange, ChangelogEntry, ChangelogModel, ParsedCommit, Section};

/// Pause before each issue lookup
pub const ISSUE_LOOKUP_DELAY: Duration = Duration::from_millis(500);

/// Options that shape a generated changelog
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Parser policy
    pub parser: ParserConfig,
    /// Category and scope filters
    pub filter: CategoryFilter,
    /// Reverse the fetch order
    pub reverse_order: bool,
    /// Look up issues closed by referenced pull requests
    pub include_ref_issues: bool,
    /// Pause before each issue lookup
    pub lookup_delay: Duration,
    /// Section header language
    pub language: Language,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            filter: CategoryFilter::default(),
            reverse_order: false,
            include_ref_issues: true,
            lookup_delay: ISSUE_LOOKUP_DELAY,
            language: Language::default(),
        }
    }
}

impl GeneratorOptions {
    /// Derive options from settings
    pub fn from_settings(settings: &ChangelogSettings) -> Self {
        Self {
            parser: ParserConfig::default()
                .with_invalid(settings.include_invalid_commits)
                .with_body_commits(settings.parse_body_commits),
            filter: CategoryFilter::from_settings(settings),
            reverse_order: settings.reverse_order,
            include_ref_issues: settings.include_ref_issues,
            lookup_delay: ISSUE_LOOKUP_DELAY,
            language: settings.language,
        }
    }
}

/// Changelog generator
pub struct ChangelogGenerator<'p, P: ?Sized> {
    provider: &'p P,
    parser: ConventionalParser,
    options: GeneratorOptions,
    issue_cache: HashMap<u64, Vec<RelatedIssue>>,
    warnings: Vec<ProviderError>,
}

impl<'p, P> ChangelogGenerator<'p, P>
where
    P: HistoryProvider + ?Sized,
{
    /// Create a new generator
    pub fn new(provider: &'p P, options: GeneratorOptions) -> Self {
        Self {
            provider,
            parser: ConventionalParser::with_config(options.parser.clone()),
            options,
            issue_cache: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Issue lookups that failed and were skipped
    pub fn warnings(&self) -> &[ProviderError] {
        &self.warnings
    }

    /// Generate the changelog model for `version` from the range's commits
    ///
    /// Fails only when no commit parses at all. A model with nothing in it is
    /// returned as is; callers treat that as a warning.
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    pub async fn generate(
        &mut self,
        version: &str,
        commits: &[CommitRecord],
    ) -> chronicle_core::Result<ChangelogModel> {
        info!(version, commit_count = commits.len(), "generating changelog entry");

        let mut parsed = self.parser.parse_all(commits);
        if parsed.is_empty() {
            return Err(ChangelogError::NoValidCommits.into());
        }
        if self.options.reverse_order {
            parsed.reverse();
        }

        let mut model = ChangelogModel::new(version);
        model.breaking_changes = breaking_changes(&parsed, commits);

        for (category, members) in classify(&parsed, &self.options.filter) {
            let mut entries = Vec::with_capacity(members.len());
            for commit in members {
                let Some(record) = commits.get(commit.source) else {
                    continue;
                };
                let mut entry = ChangelogEntry::new(commit, record);
                entry.pr_numbers = pr_numbers(entry.headline());
                entries.push(entry);
            }

            model.sections.push(Section {
                label: category.label_in(self.options.language).to_string(),
                icon: category.icon.to_string(),
                issue_prefix: category.related_issue_prefix.to_string(),
                entries,
            });
        }

        debug!(
            section_count = model.sections.len(),
            breaking_count = model.breaking_changes.len(),
            "changelog sections built"
        );

        if self.options.include_ref_issues {
            self.attach_related_issues(&mut model).await;
        }

        Ok(model)
    }

    /// Look up closing issues for every trailing PR reference, one at a time
    async fn attach_related_issues(&mut self, model: &mut ChangelogModel) {
        for section in &mut model.sections {
            for entry in &mut section.entries {
                let mut issues = Vec::new();
                for pr in entry.pr_numbers.clone() {
                    issues.extend(self.closing_issues(pr, &entry.sha).await);
                }
                entry.related_issues = issues;
            }
        }
    }

    async fn closing_issues(&mut self, pr: u64, sha: &str) -> Vec<RelatedIssue> {
        if let Some(cached) = self.issue_cache.get(&pr) {
            return cached.clone();
        }

        tokio::time::sleep(self.options.lookup_delay).await;
        debug!(pr, sha, "querying related issues");

        match self.provider.list_closing_issues(pr).await {
            Ok(issues) => {
                self.issue_cache.insert(pr, issues.clone());
                issues
            }
            Err(err) => {
                warn!(pr, sha, error = %err, "failed to query related issues, skipping");
                self.warnings.push(ProviderError::ClosingIssues {
                    pr,
                    reason: err.to_string(),
                });
                Vec::new()
            }
        }
    }
}

/// Breaking changes in commit order, each (commit, text) pair once
fn breaking_changes(parsed: &[ParsedCommit], commits: &[CommitRecord]) -> Vec<BreakingChange> {
    let mut seen: HashSet<(usize, String)> = HashSet::new();
    let mut changes = Vec::new();

    for commit in parsed {
        let Some(record) = commits.get(commit.source) else {
            continue;
        };

        for note in commit.breaking_notes() {
            if !seen.insert((commit.source, note.text.clone())) {
                continue;
            }
            changes.push(BreakingChange {
                sha: record.sha.clone(),
                url: record.url.clone(),
                author: record.author.clone(),
                author_url: record.author_url.clone(),
                subject: commit.subject.clone(),
                text: note.text.clone(),
            });
        }
    }

    changes
}
