//! Exit codes for the CLI

use chronicle_core::ChronicleError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error (range inputs, token, settings file)
pub const CONFIG_ERROR: i32 = 2;

/// Local git error
pub const GIT_ERROR: i32 = 3;

/// Range error (missing tags, tag mismatch, empty range)
pub const RANGE_ERROR: i32 = 4;

/// History provider error
pub const PROVIDER_ERROR: i32 = 5;

/// Changelog error (nothing parsed, write failure)
pub const CHANGELOG_ERROR: i32 = 6;

/// Map an error to the process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ChronicleError>() {
        Some(ChronicleError::Config(_)) => CONFIG_ERROR,
        Some(ChronicleError::Git(_)) => GIT_ERROR,
        Some(ChronicleError::Range(_)) => RANGE_ERROR,
        Some(ChronicleError::Provider(_)) => PROVIDER_ERROR,
        Some(ChronicleError::Changelog(_)) => CHANGELOG_ERROR,
        _ => ERROR,
    }
}
