//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key for error messages. Values without a
/// `${` reference are returned unchanged, so a bare `$` stays literal.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Expand an optional configuration string.
pub(crate) fn expand_opt(value: Option<&str>, field: &str) -> Result<Option<String>, ConfigError> {
    value.map(|v| expand_env(v, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_literal_unchanged() {
        assert_eq!(expand_env("Docs", "project.name").unwrap(), "Docs");
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(expand_env("price $5", "project.name").unwrap(), "price $5");
    }

    #[test]
    fn test_expand_default_value() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TREEDOC_EXPAND_UNSET");
        }
        let value = expand_env("${TREEDOC_EXPAND_UNSET:-fallback}", "project.name").unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn test_expand_missing_var_errors() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TREEDOC_EXPAND_MISSING");
        }
        let err = expand_env("${TREEDOC_EXPAND_MISSING}", "project.repository").unwrap_err();
        assert!(err.to_string().contains("TREEDOC_EXPAND_MISSING"));
        assert!(err.to_string().contains("project.repository"));
    }
}
