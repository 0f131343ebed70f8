//! Securities known to the importer
//!
//! Every account is denominated in a security (usually a currency) and
//! investment transactions move units of another one. Amounts are rendered
//! at the precision of the security they are expressed in.

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::import::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityType {
    Currency,
    Stock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub security_id: i64,
    pub name: String,
    pub description: String,
    pub symbol: String,
    /// Decimal digits to the right of the point
    pub precision: u32,
    pub security_type: SecurityType,
    /// ISO 4217 numeric code for currencies, CUSIP for stocks
    pub alternate_id: String,
}

/// Lookup table of securities
#[derive(Debug, Clone)]
pub struct SecurityTable {
    securities: Vec<Security>,
}

impl SecurityTable {
    pub fn new(securities: Vec<Security>) -> Self {
        Self { securities }
    }

    /// Find by name, falling back to the ticker symbol
    pub fn by_name(&self, name: &str) -> Result<&Security, ImportError> {
        self.securities
            .iter()
            .find(|s| s.name == name)
            .or_else(|| {
                self.securities
                    .iter()
                    .find(|s| s.security_type == SecurityType::Stock && s.symbol == name)
            })
            .ok_or_else(|| ImportError::SecurityNotFound(name.to_string()))
    }

    pub fn by_id(&self, security_id: i64) -> Option<&Security> {
        self.securities.iter().find(|s| s.security_id == security_id)
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }
}

impl Default for SecurityTable {
    fn default() -> Self {
        let currencies = [
            ("USD", "US Dollar", "$", 2, "840"),
            ("EUR", "Euro", "€", 2, "978"),
            ("GBP", "Pound Sterling", "£", 2, "826"),
            ("JPY", "Yen", "¥", 0, "392"),
            ("CAD", "Canadian Dollar", "$", 2, "124"),
            ("CHF", "Swiss Franc", "CHF", 2, "756"),
            ("AUD", "Australian Dollar", "$", 2, "036"),
        ];
        let securities = currencies
            .iter()
            .enumerate()
            .map(|(i, (name, description, symbol, precision, alternate_id))| Security {
                security_id: i as i64 + 1,
                name: name.to_string(),
                description: description.to_string(),
                symbol: symbol.to_string(),
                precision: *precision,
                security_type: SecurityType::Currency,
                alternate_id: alternate_id.to_string(),
            })
            .collect();
        Self::new(securities)
    }
}

/// Exact decimal for a native amount
///
/// Uses the shortest representation that round-trips the `f64`, so `0.1`
/// stays `0.1` instead of its binary expansion.
pub fn decimal(value: f64) -> Result<BigDecimal, ImportError> {
    if !value.is_finite() {
        return Err(ImportError::InvalidAmount(value.to_string()));
    }
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| ImportError::InvalidAmount(format!("{}: {}", value, e)))
}

/// Render `value` with exactly `precision` decimals, rounding half away from zero
pub fn format_amount(value: &BigDecimal, precision: u32) -> String {
    value
        .with_scale_round(i64::from(precision), RoundingMode::HalfUp)
        .to_string()
}
