//! Business configuration
//!
//! Identity and policy of the storefront's owner: contact channels, the
//! order-number prefix, the cash discount rate and the catalog currency.
//! Loadable from a YAML file, with defaults matching the reference deploy.

use std::{fs, io, path::Path};

use decimal_percentage::Percentage;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading business configuration.
#[derive(Debug, Error)]
pub enum BusinessError {
    /// The configuration file could not be read.
    #[error("failed to read business config: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid YAML.
    #[error("failed to parse business config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The cash discount rate must be a fraction between 0 and 1.
    #[error("cash discount rate {0} is not between 0 and 1")]
    InvalidRate(f64),
}

/// On-disk shape of the business configuration.
#[derive(Debug, Deserialize)]
struct BusinessFile {
    business_name: String,
    whatsapp_number: String,
    email: String,
    paypal_link: String,
    order_prefix: String,
    /// Cash discount as a fraction (e.g. `0.30`).
    cash_discount: f64,
    /// ISO alpha currency code (e.g. `USD`).
    currency: String,
}

/// The storefront owner's identity and pricing policy.
#[derive(Debug, Clone)]
pub struct BusinessInfo {
    business_name: String,
    whatsapp_number: String,
    email: String,
    paypal_link: String,
    order_prefix: String,
    cash_discount: Percentage,
    currency: &'static Currency,
}

impl BusinessInfo {
    /// Load the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`BusinessError`] if the file cannot be read or parsed, the
    /// currency code is unknown, or the discount rate is out of range.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BusinessError> {
        let raw = fs::read_to_string(path)?;
        let file: BusinessFile = serde_norway::from_str(&raw)?;

        Self::try_from(file)
    }

    /// Business display name, as printed on receipts.
    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    /// WhatsApp number the message handoff targets, digits only.
    #[must_use]
    pub fn whatsapp_number(&self) -> &str {
        &self.whatsapp_number
    }

    /// Business contact email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// PayPal payment link shared with customers.
    #[must_use]
    pub fn paypal_link(&self) -> &str {
        &self.paypal_link
    }

    /// Prefix embedded in every order number.
    #[must_use]
    pub fn order_prefix(&self) -> &str {
        &self.order_prefix
    }

    /// Discount fraction granted for cash payment.
    #[must_use]
    pub fn cash_discount(&self) -> Percentage {
        self.cash_discount
    }

    /// Currency all catalog prices are quoted in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

impl Default for BusinessInfo {
    fn default() -> Self {
        Self {
            business_name: "Jonathan Jose Rangel Betancourt (JJRB)".to_owned(),
            whatsapp_number: "584122891366".to_owned(),
            email: "rangeljose4747@gmail.com".to_owned(),
            paypal_link: "https://www.paypal.me/rangeljo".to_owned(),
            order_prefix: "JJRB".to_owned(),
            cash_discount: Percentage::from(0.30),
            currency: USD,
        }
    }
}

impl TryFrom<BusinessFile> for BusinessInfo {
    type Error = BusinessError;

    fn try_from(file: BusinessFile) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&file.cash_discount) {
            return Err(BusinessError::InvalidRate(file.cash_discount));
        }

        let currency = match file.currency.as_str() {
            "USD" => USD,
            "EUR" => EUR,
            "GBP" => GBP,
            other => return Err(BusinessError::UnknownCurrency(other.to_owned())),
        };

        Ok(Self {
            business_name: file.business_name,
            whatsapp_number: file.whatsapp_number,
            email: file.email,
            paypal_link: file.paypal_link,
            order_prefix: file.order_prefix,
            cash_discount: Percentage::from(file.cash_discount),
            currency,
        })
    }
}
