//! Engine settings.
//!
//! Every field has a default so a settings file only needs the values it
//! changes.

use crate::error::CfgweaveError;
use cfgweave_lexer::{
    LexerConfig, PathLexer, DEFAULT_DELIMITER, DEFAULT_MAX_ARRAY_INDEX, DEFAULT_PATH_PATTERN,
};
use cfgweave_substitution::{
    SubstitutionTreeBuilder, DEFAULT_CLOSING_TOKEN, DEFAULT_OPENING_TOKEN,
    DEFAULT_SUBSTITUTION_REGEX,
};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::policy::{ErrorPolicy, LogLevel};

/// Date/time format meaning RFC 3339.
pub const RFC3339: &str = "rfc3339";

/// Default pattern for keys whose values are secret.
pub const DEFAULT_SECRET_PATTERN: &str =
    "(?i)password|secret|token|private_key|api_key|apikey|credential";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Fail lookups that only produced warnings
    pub treat_warnings_as_errors: bool,

    /// A missing array index fails the lookup instead of leaving a gap
    pub treat_missing_array_index_as_error: bool,

    /// A missing required value fails the lookup
    pub treat_missing_values_as_errors: bool,

    /// A missing optional or defaulted value fails the lookup
    pub treat_missing_discretionary_values_as_errors: bool,

    /// Token opening a substitution (default: `${`)
    pub substitution_opening_token: String,

    /// Token closing a substitution (default: `}`)
    pub substitution_closing_token: String,

    /// Maximum nesting of substitutions, including re-expanded results (default: 5)
    pub max_substitution_nested_depth: usize,

    /// Pattern splitting a substitution into transform, key and default
    pub substitution_regex: String,

    /// chrono format for date-times, or `rfc3339`
    pub date_time_format: String,

    /// chrono format for dates (default: `%Y-%m-%d`)
    pub date_format: String,

    /// chrono format for local date-times (default: `%Y-%m-%dT%H:%M:%S`)
    pub local_date_time_format: String,

    /// Cache lookup results until the next reload
    pub cache_enabled: bool,

    /// Maximum nesting of decoders (default: 32)
    pub max_decode_depth: usize,

    /// Path word delimiter (default: `.`)
    pub path_delimiter: String,

    /// Pattern every path word must match
    pub path_pattern: String,

    /// Match path words case-sensitively (default: false)
    pub case_sensitive_paths: bool,

    /// Largest array index a path or source key may name (default: 10000)
    pub max_array_index: usize,

    /// Level for errors logged when a default or optional lookup falls back
    pub missing_value_log_level: LogLevel,

    /// Pattern for keys whose leaves are marked secret and uncached
    pub secret_pattern: String,

    /// Key prefix marking a node include (default: `$include`)
    pub include_keyword: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            treat_warnings_as_errors: false,
            treat_missing_array_index_as_error: true,
            treat_missing_values_as_errors: true,
            treat_missing_discretionary_values_as_errors: false,
            substitution_opening_token: DEFAULT_OPENING_TOKEN.to_string(),
            substitution_closing_token: DEFAULT_CLOSING_TOKEN.to_string(),
            max_substitution_nested_depth: 5,
            substitution_regex: DEFAULT_SUBSTITUTION_REGEX.to_string(),
            date_time_format: RFC3339.to_string(),
            date_format: "%Y-%m-%d".to_string(),
            local_date_time_format: "%Y-%m-%dT%H:%M:%S".to_string(),
            cache_enabled: true,
            max_decode_depth: 32,
            path_delimiter: DEFAULT_DELIMITER.to_string(),
            path_pattern: DEFAULT_PATH_PATTERN.to_string(),
            case_sensitive_paths: false,
            max_array_index: DEFAULT_MAX_ARRAY_INDEX,
            missing_value_log_level: LogLevel::Debug,
            secret_pattern: DEFAULT_SECRET_PATTERN.to_string(),
            include_keyword: "$include".to_string(),
        }
    }
}

impl CoreConfig {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CfgweaveError> {
        let config: CoreConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, CfgweaveError> {
        let contents =
            fs::read_to_string(path).map_err(|e| CfgweaveError::io(path.display().to_string(), e))?;
        Self::from_toml_str(&contents)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), CfgweaveError> {
        if self.substitution_opening_token.is_empty() || self.substitution_closing_token.is_empty()
        {
            return Err(CfgweaveError::InvalidConfig(
                "substitution tokens must not be empty".to_string(),
            ));
        }
        if self.substitution_opening_token == self.substitution_closing_token {
            return Err(CfgweaveError::InvalidConfig(
                "substitution opening and closing tokens must differ".to_string(),
            ));
        }
        if self.max_substitution_nested_depth == 0 {
            return Err(CfgweaveError::InvalidConfig(
                "max_substitution_nested_depth must be at least 1".to_string(),
            ));
        }
        if self.max_decode_depth == 0 {
            return Err(CfgweaveError::InvalidConfig(
                "max_decode_depth must be at least 1".to_string(),
            ));
        }
        for (name, format) in [
            ("date_time_format", &self.date_time_format),
            ("date_format", &self.date_format),
            ("local_date_time_format", &self.local_date_time_format),
        ] {
            if format.trim().is_empty() {
                return Err(CfgweaveError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        if self.include_keyword.is_empty() {
            return Err(CfgweaveError::InvalidConfig(
                "include_keyword must not be empty".to_string(),
            ));
        }

        Regex::new(&self.substitution_regex)
            .map_err(|e| CfgweaveError::pattern(&self.substitution_regex, e))?;
        Regex::new(&self.secret_pattern).map_err(|e| CfgweaveError::pattern(&self.secret_pattern, e))?;
        PathLexer::new(&self.lexer_config())?;
        Ok(())
    }

    /// Settings for the path lexer.
    pub fn lexer_config(&self) -> LexerConfig {
        LexerConfig {
            delimiter: self.path_delimiter.clone(),
            pattern: self.path_pattern.clone(),
            case_sensitive: self.case_sensitive_paths,
            max_array_index: self.max_array_index,
        }
    }

    pub fn substitution_builder(&self) -> SubstitutionTreeBuilder {
        SubstitutionTreeBuilder::new(
            self.substitution_opening_token.clone(),
            self.substitution_closing_token.clone(),
            self.max_substitution_nested_depth,
        )
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy {
            treat_warnings_as_errors: self.treat_warnings_as_errors,
            treat_missing_array_index_as_error: self.treat_missing_array_index_as_error,
            treat_missing_values_as_errors: self.treat_missing_values_as_errors,
            treat_missing_discretionary_values_as_errors: self
                .treat_missing_discretionary_values_as_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert!(!config.treat_warnings_as_errors);
        assert!(config.treat_missing_array_index_as_error);
        assert!(config.treat_missing_values_as_errors);
        assert!(!config.treat_missing_discretionary_values_as_errors);
        assert_eq!(config.substitution_opening_token, "${");
        assert_eq!(config.substitution_closing_token, "}");
        assert_eq!(config.max_substitution_nested_depth, 5);
        assert_eq!(config.missing_value_log_level, LogLevel::Debug);
        assert_eq!(config.max_array_index, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            treat_warnings_as_errors = true
            max_decode_depth = 8
            max_array_index = 64
            missing_value_log_level = "warn"
            "#,
        )
        .unwrap();
        assert!(config.treat_warnings_as_errors);
        assert_eq!(config.max_decode_depth, 8);
        assert_eq!(config.lexer_config().max_array_index, 64);
        assert_eq!(config.missing_value_log_level, LogLevel::Warn);
        assert_eq!(config.path_delimiter, ".");
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "path_delimiter = \"/\"").unwrap();
        let config = CoreConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.path_delimiter, "/");
    }

    #[test]
    fn test_missing_file() {
        let err = CoreConfig::from_toml_file(Path::new("/nonexistent/cfgweave.toml")).unwrap_err();
        assert!(matches!(err, CfgweaveError::Io { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let zero_depth = CoreConfig {
            max_substitution_nested_depth: 0,
            ..CoreConfig::default()
        };
        assert!(matches!(zero_depth.validate(), Err(CfgweaveError::InvalidConfig(_))));

        let same_tokens = CoreConfig {
            substitution_opening_token: "%".to_string(),
            substitution_closing_token: "%".to_string(),
            ..CoreConfig::default()
        };
        assert!(same_tokens.validate().is_err());

        let bad_regex = CoreConfig {
            substitution_regex: "(".to_string(),
            ..CoreConfig::default()
        };
        assert!(matches!(
            bad_regex.validate(),
            Err(CfgweaveError::InvalidPattern { .. })
        ));

        let empty_delimiter = CoreConfig {
            path_delimiter: String::new(),
            ..CoreConfig::default()
        };
        assert!(matches!(empty_delimiter.validate(), Err(CfgweaveError::Lexer(_))));
    }

    #[test]
    fn test_error_policy_mirrors_flags() {
        let config = CoreConfig {
            treat_warnings_as_errors: true,
            ..CoreConfig::default()
        };
        let policy = config.error_policy();
        assert!(policy.treat_warnings_as_errors);
        assert!(policy.treat_missing_values_as_errors);
    }
}
