//! Lowering configuration
//!
//! Options are read from a TOML table; every key is optional and the
//! defaults give the standard lowering.
//!
//! ```toml
//! generate-fake-overrides = true
//! synthesize-data-members = true
//! synthesize-value-members = true
//! error-call-message = "Cannot find delegated constructor call"
//! data-hash-multiplier = 31
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Message carried by the error marker of an unresolved delegated constructor call
pub const DEFAULT_ERROR_CALL_MESSAGE: &str = "Cannot find delegated constructor call";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoweringOptions {
    /// Materialize inherited members as fake overrides
    pub generate_fake_overrides: bool,

    /// Generate `equals`/`hashCode`/`toString`/`componentN`/`copy` for data classes
    pub synthesize_data_members: bool,

    /// Generate `equals`/`hashCode`/`toString` for value classes
    pub synthesize_value_members: bool,

    /// Description placed on error markers for unresolved delegated calls
    pub error_call_message: String,

    /// Multiplier of the data-class `hashCode` fold
    pub data_hash_multiplier: i64,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            generate_fake_overrides: true,
            synthesize_data_members: true,
            synthesize_value_members: true,
            error_call_message: DEFAULT_ERROR_CALL_MESSAGE.to_owned(),
            data_hash_multiplier: 31,
        }
    }
}

impl LoweringOptions {
    /// Parse options from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse lowering options")
    }

    /// Load options from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lowering options from {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid lowering options in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_gives_defaults() {
        let options = LoweringOptions::from_toml_str("").unwrap();
        assert_eq!(options, LoweringOptions::default());
        assert_eq!(options.data_hash_multiplier, 31);
    }

    #[test]
    fn keys_are_kebab_case() {
        let options = LoweringOptions::from_toml_str(
            "generate-fake-overrides = false\nerror-call-message = \"unresolved\"\n",
        )
        .unwrap();
        assert!(!options.generate_fake_overrides);
        assert!(options.synthesize_data_members);
        assert_eq!(options.error_call_message, "unresolved");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = LoweringOptions::from_toml_str("fake-overrides = true").unwrap_err();
        assert!(error.to_string().contains("Failed to parse lowering options"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = LoweringOptions::load(Path::new("/nonexistent/lowering.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/lowering.toml"));
    }
}
