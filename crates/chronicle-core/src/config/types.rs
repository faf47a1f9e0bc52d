//! Configuration types

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_API_URL, DEFAULT_CHANGELOG_FILE, DEFAULT_EXCLUDE_TYPES, DEFAULT_SERVER_URL,
};

/// Inputs for one changelog run
///
/// Keys are camelCase so that a config file reads the same as the action
/// inputs it mirrors (`excludeTypes`, `writeToFile`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangelogSettings {
    /// API token for the history provider
    #[serde(skip_serializing)]
    pub token: Option<String>,

    /// Repository as `owner/name`
    pub repository: Option<String>,

    /// REST/GraphQL API base URL
    pub api_url: String,

    /// Web base URL used for links in the rendered changelog
    pub server_url: String,

    /// Latest tag (single-tag mode)
    pub tag: Option<String>,

    /// Newer end of an explicit range
    pub from_tag: Option<String>,

    /// Older end of an explicit range
    pub to_tag: Option<String>,

    /// Commit types whose categories are dropped
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_types: Vec<String>,

    /// Only keep categories with at least one of these types
    #[serde(deserialize_with = "string_or_list")]
    pub restrict_to_types: Vec<String>,

    /// Commit scopes to leave out
    #[serde(deserialize_with = "string_or_list")]
    pub exclude_scopes: Vec<String>,

    /// Whether to splice the result into the changelog file
    pub write_to_file: bool,

    /// Changelog file path
    pub changelog_file_path: PathBuf,

    /// Whether to look up issues closed by referenced pull requests
    pub include_ref_issues: bool,

    /// Whether headers get an emoji prefix
    pub use_gitmojis: bool,

    /// Whether non-conventional commits are kept as "other"
    pub include_invalid_commits: bool,

    /// Whether commits are listed newest-last instead of fetch order
    pub reverse_order: bool,

    /// Whether to produce the chat-formatted variant
    pub format_for_slack: bool,

    /// Whether the output variable carries links
    pub include_links_to_github: bool,

    /// Whether commit bodies are scanned for embedded conventional commits
    pub parse_body_commits: bool,

    /// Language of the section headers
    pub language: Language,
}

impl Default for ChangelogSettings {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            api_url: DEFAULT_API_URL.to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            tag: None,
            from_tag: None,
            to_tag: None,
            exclude_types: DEFAULT_EXCLUDE_TYPES.iter().map(|t| t.to_string()).collect(),
            restrict_to_types: Vec::new(),
            exclude_scopes: Vec::new(),
            write_to_file: true,
            changelog_file_path: PathBuf::from(DEFAULT_CHANGELOG_FILE),
            include_ref_issues: true,
            use_gitmojis: true,
            include_invalid_commits: false,
            reverse_order: false,
            format_for_slack: false,
            include_links_to_github: true,
            parse_body_commits: false,
            language: Language::default(),
        }
    }
}

/// Section header language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Simplified Chinese
    Zh,
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            other => Err(format!("expected en or zh, got '{}'", other)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::En => write!(f, "en"),
            Self::Zh => write!(f, "zh"),
        }
    }
}

/// Requested commit range, as supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// Compare the supplied (latest) tag against the tag before it
    LatestTag(String),
    /// Compare two explicit refs
    Explicit {
        /// Newer ref
        from: String,
        /// Older ref
        to: String,
    },
}

impl ChangelogSettings {
    /// Interpret the tag inputs as a range request
    ///
    /// Blank strings count as absent, since CI inputs are never truly unset.
    pub fn range_request(&self) -> crate::Result<RangeRequest> {
        use crate::error::ConfigError;

        let tag = non_blank(&self.tag);
        let from = non_blank(&self.from_tag);
        let to = non_blank(&self.to_tag);

        match (tag, from, to) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::AmbiguousRange.into()),
            (Some(tag), None, None) => Ok(RangeRequest::LatestTag(tag.to_string())),
            (None, Some(from), Some(to)) => Ok(RangeRequest::Explicit {
                from: from.to_string(),
                to: to.to_string(),
            }),
            (None, Some(_), None) => Err(ConfigError::MissingField("toTag".to_string()).into()),
            (None, None, Some(_)) => Err(ConfigError::MissingField("fromTag".to_string()).into()),
            (None, None, None) => Err(ConfigError::MissingRange.into()),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Split a comma-separated input into trimmed, non-empty items
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accept either `"a, b"` or `["a", "b"]`
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => parse_list(&s),
        StringOrList::List(items) => items
            .iter()
            .flat_map(|item| parse_list(item))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChronicleError, ConfigError};

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("feat, fix,,  chore "), vec!["feat", "fix", "chore"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_defaults() {
        let settings = ChangelogSettings::default();
        assert!(settings.write_to_file);
        assert!(settings.include_links_to_github);
        assert_eq!(settings.changelog_file_path, PathBuf::from("CHANGELOG.md"));
        assert!(settings.exclude_types.contains(&"style".to_string()));
    }

    #[test]
    fn test_lists_accept_string_or_sequence() {
        let settings: ChangelogSettings =
            serde_yaml::from_str("excludeTypes: \"chore, test\"\nexcludeScopes: [deps, ci]\n")
                .unwrap();
        assert_eq!(settings.exclude_types, vec!["chore", "test"]);
        assert_eq!(settings.exclude_scopes, vec!["deps", "ci"]);
    }

    #[test]
    fn test_language_setting() {
        assert_eq!(ChangelogSettings::default().language, Language::En);

        let settings: ChangelogSettings = serde_yaml::from_str("language: zh\n").unwrap();
        assert_eq!(settings.language, Language::Zh);
        assert!(serde_yaml::from_str::<ChangelogSettings>("language: fr\n").is_err());

        assert_eq!(" ZH ".parse::<Language>(), Ok(Language::Zh));
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_range_request_single_tag() {
        let settings = ChangelogSettings {
            tag: Some("v1.2.0".to_string()),
            from_tag: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.range_request().unwrap(),
            RangeRequest::LatestTag("v1.2.0".to_string())
        );
    }

    #[test]
    fn test_range_request_explicit() {
        let settings = ChangelogSettings {
            from_tag: Some("v2.0.0".to_string()),
            to_tag: Some("v1.0.0".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.range_request().unwrap(),
            RangeRequest::Explicit {
                from: "v2.0.0".to_string(),
                to: "v1.0.0".to_string()
            }
        );
    }

    #[test]
    fn test_range_request_both_is_ambiguous() {
        let settings = ChangelogSettings {
            tag: Some("v2.0.0".to_string()),
            from_tag: Some("v2.0.0".to_string()),
            to_tag: Some("v1.0.0".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            settings.range_request(),
            Err(ChronicleError::Config(ConfigError::AmbiguousRange))
        ));
    }

    #[test]
    fn test_range_request_neither_is_missing() {
        let settings = ChangelogSettings::default();
        assert!(matches!(
            settings.range_request(),
            Err(ChronicleError::Config(ConfigError::MissingRange))
        ));
    }
}
