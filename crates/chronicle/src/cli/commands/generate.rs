//! Generate command
//!
//! Every flag can also come from the environment, using the variable names
//! GitHub Actions sets for action inputs (`INPUT_FROMTAG`, ...). Blank values
//! count as unset.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use tracing::{debug, info};

use chronicle_changelog::{run_changelog, ChangelogRun, FileUpdate, RunContext, RunOutcome};
use chronicle_core::config::{
    load_settings, load_settings_or_default, parse_list, require_token, validate_settings,
};
use chronicle_core::error::ConfigError;
use chronicle_core::{ChangelogSettings, ChronicleError, Language, RepoSlug};
use chronicle_git::{GitHubProvider, GitRepo, DEFAULT_REMOTE};

use crate::cli::{output, Cli, OutputFormat};

/// Generate the changelog for a tag range
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Config file to use instead of searching for one
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitHub API token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository as owner/name (defaults to the origin remote)
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Web base URL used in links
    #[arg(long, env = "GITHUB_SERVER_URL")]
    pub server_url: Option<String>,

    /// Latest tag; compared against the tag before it
    #[arg(long, env = "INPUT_TAG")]
    pub tag: Option<String>,

    /// Newer end of an explicit range
    #[arg(long, env = "INPUT_FROMTAG")]
    pub from_tag: Option<String>,

    /// Older end of an explicit range
    #[arg(long, env = "INPUT_TOTAG")]
    pub to_tag: Option<String>,

    /// Comma-separated commit types to exclude
    #[arg(long, env = "INPUT_EXCLUDETYPES")]
    pub exclude_types: Option<String>,

    /// Comma-separated commit types to keep (overrides --exclude-types)
    #[arg(long, env = "INPUT_RESTRICTTOTYPES")]
    pub restrict_to_types: Option<String>,

    /// Comma-separated scopes to exclude
    #[arg(long, env = "INPUT_EXCLUDESCOPES")]
    pub exclude_scopes: Option<String>,

    /// Merge the release into the changelog file
    #[arg(long, env = "INPUT_WRITETOFILE", value_name = "BOOL")]
    pub write_to_file: Option<String>,

    /// Changelog file path
    #[arg(long, env = "INPUT_CHANGELOGFILEPATH")]
    pub changelog_file_path: Option<String>,

    /// Look up issues closed by referenced pull requests
    #[arg(long, env = "INPUT_INCLUDEREFISSUES", value_name = "BOOL")]
    pub include_ref_issues: Option<String>,

    /// Prefix headers with gitmojis
    #[arg(long, env = "INPUT_USEGITMOJIS", value_name = "BOOL")]
    pub use_gitmojis: Option<String>,

    /// Keep non-conventional commits under "Other Changes"
    #[arg(long, env = "INPUT_INCLUDEINVALIDCOMMITS", value_name = "BOOL")]
    pub include_invalid_commits: Option<String>,

    /// List commits in reverse order
    #[arg(long, env = "INPUT_REVERSEORDER", value_name = "BOOL")]
    pub reverse_order: Option<String>,

    /// Also produce a Slack-formatted variant
    #[arg(long, env = "INPUT_FORMATFORSLACK", value_name = "BOOL")]
    pub format_for_slack: Option<String>,

    /// Keep links in the printed changes
    #[arg(long, env = "INPUT_INCLUDELINKSTOGITHUB", value_name = "BOOL")]
    pub include_links_to_github: Option<String>,

    /// Split commit bodies into embedded conventional commits
    #[arg(long, env = "INPUT_PARSEBODYCOMMITS", value_name = "BOOL")]
    pub parse_body_commits: Option<String>,

    /// Section header language (en or zh)
    #[arg(long, env = "INPUT_LANGUAGE")]
    pub language: Option<String>,

    /// File to append step outputs to
    #[arg(long, env = "GITHUB_OUTPUT", value_name = "FILE")]
    pub github_output: Option<String>,
}

impl GenerateCommand {
    /// Execute the generate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing generate command");
        let cwd = std::env::current_dir()?;

        let mut settings = match &self.config {
            Some(path) => load_settings(path)?,
            None => load_settings_or_default(&cwd)?.0,
        };
        self.apply(&mut settings)?;
        if settings.token.is_none() {
            settings.token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
        }
        validate_settings(&settings)?;

        let token = require_token(&settings)?;
        let slug = resolve_slug(&settings, &cwd)?;
        debug!(repo = %slug, api_url = %settings.api_url, "resolved repository");

        let provider = GitHubProvider::new(token, slug.clone()).with_api_base(&settings.api_url);
        let context = RunContext::new(slug, &cwd);

        let rt = tokio::runtime::Runtime::new()?;
        let outcome = rt.block_on(run_changelog(&provider, &settings, &context))?;

        if let (RunOutcome::Generated(run), Some(path)) = (&outcome, self.output_file()) {
            write_step_outputs(&path, run)?;
            debug!(path = %path.display(), "step outputs written");
        }

        if cli.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }

        match &outcome {
            RunOutcome::Generated(run) => print_run(run, cli.quiet),
            RunOutcome::NothingToAdd { range } => {
                if !cli.quiet {
                    output::warning(&format!(
                        "Nothing to add to the changelog for {} because of excluded types",
                        output::tag(range)
                    ));
                }
            }
        }

        Ok(())
    }

    /// Overlay flag and environment values onto loaded settings
    fn apply(&self, settings: &mut ChangelogSettings) -> anyhow::Result<()> {
        overlay_text(&mut settings.token, &self.token);
        overlay_text(&mut settings.repository, &self.repository);
        overlay_text(&mut settings.tag, &self.tag);
        overlay_text(&mut settings.from_tag, &self.from_tag);
        overlay_text(&mut settings.to_tag, &self.to_tag);

        if let Some(url) = non_blank(&self.api_url) {
            settings.api_url = url.to_string();
        }
        if let Some(url) = non_blank(&self.server_url) {
            settings.server_url = url.to_string();
        }
        if let Some(path) = non_blank(&self.changelog_file_path) {
            settings.changelog_file_path = PathBuf::from(path);
        }

        if let Some(language) = non_blank(&self.language) {
            settings.language = language.parse::<Language>().map_err(|message| {
                ChronicleError::from(ConfigError::InvalidValue {
                    field: "language".to_string(),
                    message,
                })
            })?;
        }

        if let Some(list) = &self.exclude_types {
            settings.exclude_types = parse_list(list);
        }
        if let Some(list) = &self.restrict_to_types {
            settings.restrict_to_types = parse_list(list);
        }
        if let Some(list) = &self.exclude_scopes {
            settings.exclude_scopes = parse_list(list);
        }

        for (field, input, target) in [
            ("writeToFile", &self.write_to_file, &mut settings.write_to_file),
            ("includeRefIssues", &self.include_ref_issues, &mut settings.include_ref_issues),
            ("useGitmojis", &self.use_gitmojis, &mut settings.use_gitmojis),
            ("includeInvalidCommits", &self.include_invalid_commits, &mut settings.include_invalid_commits),
            ("reverseOrder", &self.reverse_order, &mut settings.reverse_order),
            ("formatForSlack", &self.format_for_slack, &mut settings.format_for_slack),
            ("includeLinksToGithub", &self.include_links_to_github, &mut settings.include_links_to_github),
            ("parseBodyCommits", &self.parse_body_commits, &mut settings.parse_body_commits),
        ] {
            if let Some(value) = parse_flag(field, input)? {
                *target = value;
            }
        }

        Ok(())
    }

    fn output_file(&self) -> Option<PathBuf> {
        non_blank(&self.github_output).map(PathBuf::from)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn overlay_text(target: &mut Option<String>, input: &Option<String>) {
    if let Some(value) = non_blank(input) {
        *target = Some(value.to_string());
    }
}

/// Parse a boolean input, `None` when blank
fn parse_flag(field: &str, input: &Option<String>) -> Result<Option<bool>, ChronicleError> {
    let Some(value) = non_blank(input) else {
        return Ok(None);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Some(true)),
        "false" | "no" | "off" | "0" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("expected true or false, got '{}'", value),
        }
        .into()),
    }
}

/// Repository from settings, else from the origin remote
fn resolve_slug(settings: &ChangelogSettings, cwd: &Path) -> Result<RepoSlug, ChronicleError> {
    if let Some(repository) = non_blank(&settings.repository) {
        return repository.parse::<RepoSlug>().map_err(|message| {
            ConfigError::InvalidValue {
                field: "repository".to_string(),
                message,
            }
            .into()
        });
    }

    Ok(GitRepo::discover(cwd)?.repo_slug(DEFAULT_REMOTE)?)
}

/// Changes go to stdout; the summary and status lines are skipped when quiet
fn print_run(run: &ChangelogRun, quiet: bool) {
    if !quiet {
        eprintln!("{}", output::title(format!("Changelog for {}", run.range.newer)));
        eprintln!("{}", output::field("Range", output::tag(&run.range)));
        eprintln!("{}", output::field("Breaking changes", run.model.breaking_changes.len()));
        eprintln!("{}", output::field("Sections", run.model.sections.len()));
        eprintln!();
    }

    print!("{}", run.changes);
    if let Some(slack) = &run.changes_for_slack {
        if !quiet {
            eprintln!("{}", output::title("Slack"));
        }
        print!("{}", slack);
    }

    if quiet {
        return;
    }

    for warning in &run.warnings {
        output::warning(warning);
    }

    match &run.changelog_file {
        FileUpdate::Disabled => {}
        FileUpdate::Written(path) => output::success(&format!("Updated {}", output::path(path))),
        FileUpdate::AlreadyReleased(path) => output::info(&format!(
            "{} already lists {}, left unchanged",
            output::path(path),
            output::tag(&run.range.newer)
        )),
    }
}

/// Append `changes` (and `changesForSlack`) to a step output file
fn write_step_outputs(path: &Path, run: &ChangelogRun) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    write_output(&mut file, "changes", &run.changes)?;
    if let Some(slack) = &run.changes_for_slack {
        write_output(&mut file, "changesForSlack", slack)?;
    }

    Ok(())
}

/// Write one `name<<DELIMITER` multi-line output entry
fn write_output(out: &mut impl Write, name: &str, value: &str) -> std::io::Result<()> {
    let delimiter = output_delimiter(value);

    writeln!(out, "{}<<{}", name, delimiter)?;
    out.write_all(value.as_bytes())?;
    if !value.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out, "{}", delimiter)
}

/// A delimiter that doesn't occur as a line of the value
fn output_delimiter(value: &str) -> String {
    let mut seed = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    loop {
        let delimiter = format!("ghadelimiter_{:x}", seed);
        if !value.lines().any(|line| line == delimiter) {
            return delimiter;
        }
        seed = seed.wrapping_add(1);
    }
}
