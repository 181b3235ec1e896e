//! # Application Configuration
//!
//! Process-wide pricing rates and document defaults, externally owned and
//! persisted as a single blob. Projects snapshot the rates at save time;
//! proposal documents fall back to these defaults when a project does not
//! override a field.

use serde::{Deserialize, Serialize};

/// Pricing rates and company/document defaults.
///
/// The three rates are independent decimals (0.14 = 14%). They are not
/// clamped anywhere in the engine; validation is a caller concern.
///
/// ## JSON Example
///
/// ```json
/// {
///   "VAT_RATE": 0.14,
///   "DEFAULT_OVERHEAD": 0.1,
///   "DEFAULT_MARKUP": 0.25,
///   "appName": "ExhibiPrice",
///   "defaultPaymentTerms": "50% Down Payment, 50% on Delivery"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Flat VAT rate applied last in the pricing chain
    #[serde(rename = "VAT_RATE")]
    pub vat_rate: f64,

    /// Overhead rate applied to direct costs
    #[serde(rename = "DEFAULT_OVERHEAD")]
    pub default_overhead: f64,

    /// Profit margin applied on top of (direct costs + overhead)
    #[serde(rename = "DEFAULT_MARKUP")]
    pub default_markup: f64,

    /// Brand name shown on proposal headers
    pub app_name: String,

    /// Single-letter brand mark (or a logo reference when longer)
    pub app_icon: String,

    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub company_website: String,
    pub company_tax_id: String,

    /// Default terms-and-conditions text for new projects
    pub default_terms: String,

    /// Default payment terms line
    pub default_payment_terms: String,

    /// Default quote validity line
    pub default_validity_period: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            vat_rate: 0.14,
            default_overhead: 0.10,
            default_markup: 0.25,
            app_name: "ExhibiPrice".to_string(),
            app_icon: "E".to_string(),
            company_address: "Industrial Zone, 5th Settlement, New Cairo, Egypt".to_string(),
            company_phone: "+20 123 456 789".to_string(),
            company_email: "info@exhibiprice.com".to_string(),
            company_website: "www.exhibiprice.com".to_string(),
            company_tax_id: "Tax ID: 123-456-789".to_string(),
            default_terms: "1. Production materials remain company property unless purchased.\n2. Design ownership is reserved by the company.".to_string(),
            default_payment_terms: "50% Down Payment, 50% on Delivery".to_string(),
            default_validity_period: "15 Days".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let config = AppConfig::default();
        assert_eq!(config.vat_rate, 0.14);
        assert_eq!(config.default_overhead, 0.10);
        assert_eq!(config.default_markup, 0.25);
        assert_eq!(config.app_name, "ExhibiPrice");
        assert_eq!(config.default_validity_period, "15 Days");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        // Rate keys keep their legacy upper-case names; the rest is camelCase
        assert!(json.contains("\"VAT_RATE\":0.14"));
        assert!(json.contains("\"DEFAULT_MARKUP\":0.25"));
        assert!(json.contains("\"appName\":\"ExhibiPrice\""));
        assert!(json.contains("\"defaultPaymentTerms\""));

        let roundtrip: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, roundtrip);
    }
}
