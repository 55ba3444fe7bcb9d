//! Error formatting helpers
//!
//! Turns library errors into messages suitable for CLI output and for
//! structured log records.

use crate::error::Error;

/// Format an error for end-user display on the CLI.
///
/// Adds a short hint for the error classes a user can act on; transport
/// and internal errors are passed through as-is.
pub fn format_error(error: &Error) -> String {
    match error {
        Error::Config { field, message } => {
            format!("configuration problem ({field}): {message}")
        }
        Error::ProbeMisconfigured { missing } => {
            format!(
                "login probe misconfigured: missing {missing} \
                 (marker-based detection requires both --probe-url and --marker)"
            )
        }
        Error::CachePersist { path, details } => {
            format!(
                "session was established but could not be cached to {}: {details}",
                path.display()
            )
        }
        other => other.to_string(),
    }
}

/// Format an error for log records: category prefix plus the display chain.
pub fn format_error_for_logging(error: &Error) -> String {
    let mut message = format!("[{}] {}", error.category(), error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(&format!(" | caused by: {cause}"));
        source = cause.source();
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_config_error() {
        let err = Error::config("cache.trigger", "unknown trigger 'sometimes'");
        let formatted = format_error(&err);
        assert!(formatted.contains("cache.trigger"));
        assert!(formatted.contains("unknown trigger"));
    }

    #[test]
    fn test_format_probe_error_has_hint() {
        let err = Error::probe_misconfigured("probe URL");
        let formatted = format_error(&err);
        assert!(formatted.contains("--probe-url"));
    }

    #[test]
    fn test_format_persist_error_names_path() {
        let err = Error::cache_persist("/tmp/site.session.json", "read-only file system");
        let formatted = format_error(&err);
        assert!(formatted.contains("/tmp/site.session.json"));
        assert!(formatted.contains("read-only file system"));
    }

    #[test]
    fn test_logging_format_has_category() {
        let err = Error::corrupt_cache("not JSON");
        let formatted = format_error_for_logging(&err);
        assert!(formatted.starts_with("[corrupt_cache]"));
    }
}
