//! Configuration validation

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use crate::types::RepoSlug;

use super::defaults::DEFAULT_EXCLUDE_TYPES;
use super::types::ChangelogSettings;

/// Validate settings
///
/// The tag inputs are not checked here: a config file usually leaves them to
/// the command line, so range validation happens when the range is resolved.
pub fn validate_settings(settings: &ChangelogSettings) -> Result<()> {
    debug!("validating configuration");
    validate_urls(settings)?;
    validate_repository(settings)?;
    validate_filters(settings);
    validate_output(settings)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_urls(settings: &ChangelogSettings) -> Result<()> {
    for (field, value) in [
        ("apiUrl", &settings.api_url),
        ("serverUrl", &settings.server_url),
    ] {
        let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "must be an http(s) URL".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_repository(settings: &ChangelogSettings) -> Result<()> {
    if let Some(repository) = &settings.repository {
        repository
            .parse::<RepoSlug>()
            .map_err(|message| ConfigError::InvalidValue {
                field: "repository".to_string(),
                message,
            })?;
    }

    Ok(())
}

fn validate_filters(settings: &ChangelogSettings) {
    let exclude_customized = settings
        .exclude_types
        .iter()
        .map(String::as_str)
        .ne(DEFAULT_EXCLUDE_TYPES.iter().copied());

    if !settings.restrict_to_types.is_empty() && exclude_customized {
        warn!(
            restrict = ?settings.restrict_to_types,
            exclude = ?settings.exclude_types,
            "restrictToTypes is set, excludeTypes will be ignored"
        );
    }
}

fn validate_output(settings: &ChangelogSettings) -> Result<()> {
    if settings.write_to_file && settings.changelog_file_path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelogFilePath".to_string(),
            message: "path cannot be empty when writeToFile is enabled".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Require a non-empty API token
pub fn require_token(settings: &ChangelogSettings) -> Result<&str> {
    settings
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConfigError::MissingField("token".to_string()).into())
}
