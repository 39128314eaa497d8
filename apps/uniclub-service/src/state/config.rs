//! # Configuration State
//!
//! Read-only after startup.

use uniclub_core::checkout::ShippingPolicy;
use uniclub_core::Money;

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct ConfigState {
    config: AppConfig,
    shipping: ShippingPolicy,
}

impl ConfigState {
    pub fn new(config: AppConfig) -> Self {
        let shipping = config.shipping_policy();
        ConfigState { config, shipping }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn shipping_policy(&self) -> &ShippingPolicy {
        &self.shipping
    }

    pub fn search_max_len(&self) -> usize {
        self.config.search_max_len
    }

    /// Amount with dot-grouped thousands and the configured symbol.
    pub fn format_currency(&self, amount: Money) -> String {
        let digits = amount.amount().unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if amount.is_negative() { "-" } else { "" };
        format!("{sign}{grouped} {}", self.config.currency_symbol)
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState::new(AppConfig::default())
    }
}
