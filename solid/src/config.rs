//! Compilation settings.
//!
//! Every section falls back to its defaults when missing, so a partial
//! TOML document such as
//!
//! ```toml
//! [compiler_options]
//! constant_folding = false
//! ```
//!
//! is a complete configuration.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Syntax gates checked while decorating the CST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageFeatures {
    /// Tuple, record, set and map literal syntax
    pub literal_collections: bool,
    /// `?.` and `!.` access
    pub optional_access: bool,
}

impl Default for LanguageFeatures {
    fn default() -> Self {
        Self {
            literal_collections: true,
            optional_access: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Type assessable expressions by their value and emit them as constants
    pub constant_folding: bool,
    /// Let int values flow where float is expected
    pub int_coercion: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            constant_folding: true,
            int_coercion: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidConfig {
    pub language_features: LanguageFeatures,
    pub compiler_options: CompilerOptions,
}

/// Process-wide defaults used when no configuration is passed
pub static DEFAULT_CONFIG: Lazy<SolidConfig> = Lazy::new(SolidConfig::default);

impl SolidConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn with_constant_folding(mut self, enabled: bool) -> Self {
        self.compiler_options.constant_folding = enabled;
        self
    }

    pub fn with_int_coercion(mut self, enabled: bool) -> Self {
        self.compiler_options.int_coercion = enabled;
        self
    }

    pub fn with_literal_collections(mut self, enabled: bool) -> Self {
        self.language_features.literal_collections = enabled;
        self
    }

    pub fn with_optional_access(mut self, enabled: bool) -> Self {
        self.language_features.optional_access = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = &*DEFAULT_CONFIG;
        assert!(config.language_features.literal_collections);
        assert!(config.language_features.optional_access);
        assert!(config.compiler_options.constant_folding);
        assert!(config.compiler_options.int_coercion);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = SolidConfig::from_toml_str(
            "[compiler_options]\nconstant_folding = false\n",
        )
        .unwrap();
        assert!(!config.compiler_options.constant_folding);
        assert!(config.compiler_options.int_coercion);
        assert_eq!(config.language_features, LanguageFeatures::default());
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(SolidConfig::from_toml_str("").unwrap(), SolidConfig::default());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(SolidConfig::from_toml_str("[compiler_options]\nint_coercion = 3\n").is_err());
    }
}
