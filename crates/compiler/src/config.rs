// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Compiler Configuration
//!
//! [`CompilerConfig`] selects the platform and the textual conventions of
//! the generated statements.
//!
//! ## Settings payload
//!
//! Hosts usually hand over a JSON settings object:
//!
//! ```json
//! {
//!   "unifiedQuery": {
//!     "platform": "hibernate",
//!     "aliasMode": "auto",
//!     "parameterPrefix": "p",
//!     "parameterMarker": ":",
//!     "escapeChar": "!",
//!     "logStatements": false,
//!     "maxDepth": 32,
//!     "catalogScope": "default"
//!   }
//! }
//! ```
//!
//! Instead of `platform`, a `provider` identifier such as
//! `"org.hibernate.jpa.HibernatePersistenceProvider"` may be given; the
//! platform is then detected from it. Every key is optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use unified_query_ir::Platform;
use unified_query_ir::expr::is_identifier;
use unified_query_lowering::{AliasMode, DEFAULT_MAX_DEPTH, Dialect};

/// Key of the compiler section in a settings payload
pub const SETTINGS_KEY: &str = "unifiedQuery";

/// Compiler settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilerConfig {
    /// Persistence provider the statements are generated for
    pub platform: Platform,

    /// Alias policy of select statements
    pub alias_mode: AliasMode,

    /// Prefix of generated parameter names (`p` gives `p0001`)
    pub parameter_prefix: String,

    /// Character introducing a parameter reference in statement text
    pub parameter_marker: char,

    /// Escape character of `LIKE` patterns
    pub escape_char: char,

    /// Log every compiled statement at `info`
    pub log_statements: bool,

    /// Maximum sub-query nesting
    pub max_depth: usize,

    /// Catalog scope used to resolve target names
    pub catalog_scope: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Unknown,
            alias_mode: AliasMode::Auto,
            parameter_prefix: "p".to_string(),
            parameter_marker: ':',
            escape_char: '!',
            log_statements: false,
            max_depth: DEFAULT_MAX_DEPTH,
            catalog_scope: "default".to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_alias_mode(mut self, alias_mode: AliasMode) -> Self {
        self.alias_mode = alias_mode;
        self
    }

    pub fn with_parameter_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.parameter_prefix = prefix.into();
        self
    }

    pub fn with_parameter_marker(mut self, marker: char) -> Self {
        self.parameter_marker = marker;
        self
    }

    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    pub fn with_log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_catalog_scope(mut self, scope: impl Into<String>) -> Self {
        self.catalog_scope = scope.into();
        self
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - Parameter names and references cannot be confused with identifiers,
    ///   literals or `LIKE` wildcards
    /// - The escape character is not itself a wildcard
    /// - Nesting depth and catalog scope are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.parameter_prefix) {
            return Err(ConfigError::InvalidParameterPrefix(self.parameter_prefix.clone()));
        }
        if !self.parameter_marker.is_ascii_punctuation()
            || matches!(self.parameter_marker, '\'' | '(' | ')' | ',' | '.' | '%' | '_')
        {
            return Err(ConfigError::InvalidParameterMarker(self.parameter_marker));
        }
        if !self.escape_char.is_ascii_punctuation()
            || matches!(self.escape_char, '%' | '_' | '\'')
        {
            return Err(ConfigError::InvalidEscapeChar(self.escape_char));
        }
        if self.escape_char == self.parameter_marker {
            return Err(ConfigError::InvalidEscapeChar(self.escape_char));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth);
        }
        if self.catalog_scope.trim().is_empty() {
            return Err(ConfigError::EmptyCatalogScope);
        }
        Ok(())
    }

    /// Dialect carrying this configuration's textual conventions
    pub fn dialect(&self) -> Dialect {
        Dialect::new(self.platform)
            .with_parameter_prefix(self.parameter_prefix.clone())
            .with_parameter_marker(self.parameter_marker)
            .with_escape_char(self.escape_char)
    }

    /// Parse the compiler section of a host settings payload
    ///
    /// A payload without the section yields the default configuration.
    /// The result is validated.
    pub fn from_settings(settings: &Value) -> Result<Self, ConfigError> {
        let Some(section) = settings.get(SETTINGS_KEY) else {
            return Self::default().validated();
        };
        let Value::Object(fields) = section else {
            return Err(ConfigError::InvalidSettings(format!(
                "'{}' must be an object",
                SETTINGS_KEY
            )));
        };

        let mut fields = fields.clone();
        let platform = fields.remove("platform");
        let provider = fields.remove("provider");
        let mut config: Self = serde_json::from_value(Value::Object(fields))
            .map_err(|e| ConfigError::InvalidSettings(e.to_string()))?;

        config.platform = match (platform, provider) {
            (Some(Value::String(name)), _) => {
                Platform::from_name(&name).ok_or(ConfigError::UnknownPlatform(name))?
            }
            (Some(other), _) => {
                return Err(ConfigError::InvalidSettings(format!(
                    "platform must be a string, got {}",
                    other
                )));
            }
            (None, Some(Value::String(provider))) => Platform::detect(&provider),
            (None, Some(other)) => {
                return Err(ConfigError::InvalidSettings(format!(
                    "provider must be a string, got {}",
                    other
                )));
            }
            (None, None) => Platform::Unknown,
        };
        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum ConfigError {
    #[error("Parameter prefix '{0}' is not an identifier")]
    InvalidParameterPrefix(String),

    #[error("Parameter marker '{0}' cannot introduce a parameter reference")]
    InvalidParameterMarker(char),

    #[error("'{0}' cannot be used as LIKE escape character")]
    InvalidEscapeChar(char),

    #[error("Maximum nesting depth must be > 0")]
    InvalidMaxDepth,

    #[error("Catalog scope is empty")]
    EmptyCatalogScope,

    #[error("Unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_is_valid() {
        let config = CompilerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.platform, Platform::Unknown);
        assert_eq!(config.dialect().parameter_name(1), "p0001");
    }

    #[test]
    fn test_builder() {
        let config = CompilerConfig::new(Platform::OpenJpa)
            .with_alias_mode(AliasMode::Default)
            .with_parameter_prefix("arg")
            .with_escape_char('\\')
            .with_max_depth(4);
        assert!(config.validate().is_ok());
        let dialect = config.dialect();
        assert_eq!(dialect.parameter_name(12), "arg0012");
        assert_eq!(dialect.escape_clause(), "ESCAPE '\\'");
    }

    #[test]
    fn test_validation_errors() {
        let prefix = CompilerConfig::default().with_parameter_prefix("1p");
        assert_eq!(
            prefix.validate(),
            Err(ConfigError::InvalidParameterPrefix("1p".into()))
        );
        let escape = CompilerConfig::default().with_escape_char('%');
        assert_eq!(escape.validate(), Err(ConfigError::InvalidEscapeChar('%')));
        let marker = CompilerConfig::default().with_parameter_marker('\'');
        assert_eq!(marker.validate(), Err(ConfigError::InvalidParameterMarker('\'')));
        let clash = CompilerConfig::default().with_escape_char(':');
        assert!(clash.validate().is_err());
        let depth = CompilerConfig::default().with_max_depth(0);
        assert_eq!(depth.validate(), Err(ConfigError::InvalidMaxDepth));
        let scope = CompilerConfig::default().with_catalog_scope(" ");
        assert_eq!(scope.validate(), Err(ConfigError::EmptyCatalogScope));
    }

    #[test]
    fn test_from_settings() {
        let settings = json!({
            "unifiedQuery": {
                "platform": "EclipseLink",
                "aliasMode": "default",
                "logStatements": true,
                "maxDepth": 8
            }
        });
        let config = CompilerConfig::from_settings(&settings).unwrap();
        assert_eq!(config.platform, Platform::EclipseLink);
        assert_eq!(config.alias_mode, AliasMode::Default);
        assert!(config.log_statements);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.parameter_prefix, "p");
    }

    #[test]
    fn test_from_settings_detects_provider() {
        let settings = json!({
            "unifiedQuery": { "provider": "org.datanucleus.api.jpa.PersistenceProviderImpl" }
        });
        let config = CompilerConfig::from_settings(&settings).unwrap();
        assert_eq!(config.platform, Platform::DataNucleus);

        let missing = CompilerConfig::from_settings(&json!({})).unwrap();
        assert_eq!(missing, CompilerConfig::default());
    }

    #[test]
    fn test_from_settings_errors() {
        let unknown = json!({ "unifiedQuery": { "platform": "toplinkx" } });
        assert_eq!(
            CompilerConfig::from_settings(&unknown),
            Err(ConfigError::UnknownPlatform("toplinkx".into()))
        );

        let typo = json!({ "unifiedQuery": { "aliasMod": "auto" } });
        assert!(matches!(
            CompilerConfig::from_settings(&typo),
            Err(ConfigError::InvalidSettings(_))
        ));

        let invalid = json!({ "unifiedQuery": { "escapeChar": "_" } });
        assert_eq!(
            CompilerConfig::from_settings(&invalid),
            Err(ConfigError::InvalidEscapeChar('_'))
        );
    }
}
