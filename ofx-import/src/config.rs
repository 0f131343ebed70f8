//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::securities::{Security, SecurityTable, SecurityType};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub securities: Vec<SecurityConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Host account receiving the imported transactions
    #[serde(default)]
    pub account_id: i64,
    /// Let libofx print its own diagnostics
    #[serde(default)]
    pub native_messages: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    pub security_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(rename = "type", default = "default_security_type")]
    pub security_type: SecurityType,
    #[serde(default)]
    pub alternate_id: String,
}

fn default_precision() -> u32 {
    2
}

fn default_security_type() -> SecurityType {
    SecurityType::Currency
}

impl AppConfig {
    /// Securities from the config, or the built-in currencies when none are listed
    pub fn security_table(&self) -> SecurityTable {
        if self.securities.is_empty() {
            return SecurityTable::default();
        }
        let securities = self
            .securities
            .iter()
            .enumerate()
            .map(|(i, s)| Security {
                security_id: s.security_id.unwrap_or(i as i64 + 1),
                name: s.name.clone(),
                description: s.description.clone(),
                symbol: s.symbol.clone(),
                precision: s.precision,
                security_type: s.security_type,
                alternate_id: s.alternate_id.clone(),
            })
            .collect();
        SecurityTable::new(securities)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [import]
            account_id = 7

            [[securities]]
            name = "USD"
            description = "US Dollar"
            symbol = "$"
            precision = 2
            type = "currency"
            alternate_id = "840"

            [[securities]]
            security_id = 42
            name = "VTI"
            symbol = "VTI"
            precision = 4
            type = "stock"
            alternate_id = "922908769"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.import.account_id, 7);
        assert!(!config.import.native_messages);
        assert_eq!(config.securities.len(), 2);

        let table = config.security_table();
        assert_eq!(table.by_name("USD").unwrap().security_id, 1);
        let vti = table.by_name("VTI").unwrap();
        assert_eq!(vti.security_id, 42);
        assert_eq!(vti.security_type, SecurityType::Stock);
        assert_eq!(vti.precision, 4);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.import.account_id, 0);
        assert!(config.securities.is_empty());
        assert!(config.security_table().by_name("EUR").is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[import]\naccount_id = 3\nnative_messages = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.import.account_id, 3);
        assert!(config.import.native_messages);
    }

    #[test]
    fn test_load_config_reports_path_on_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[import]\naccount_id = \"seven\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse config file"));
        assert!(load_config(Path::new("/nonexistent/ofx.toml")).is_err());
    }
}
