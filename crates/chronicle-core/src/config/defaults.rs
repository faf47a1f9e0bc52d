//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "chronicle.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "chronicle.yaml";

/// Default changelog document
pub const DEFAULT_CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Default GitHub API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default GitHub web base URL
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Types left out unless configured otherwise
pub const DEFAULT_EXCLUDE_TYPES: &[&str] = &["build", "ci", "doc", "docs", "other", "style"];

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".chronicle.toml",
        ".chronicle.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# chronicle configuration
apiUrl: https://api.github.com
serverUrl: https://github.com
excludeTypes: build,ci,doc,docs,other,style
restrictToTypes: ""
excludeScopes: ""
writeToFile: true
changelogFilePath: CHANGELOG.md
includeRefIssues: true
useGitmojis: true
includeInvalidCommits: false
reverseOrder: false
formatForSlack: false
includeLinksToGithub: true
parseBodyCommits: false
language: en
"#;
