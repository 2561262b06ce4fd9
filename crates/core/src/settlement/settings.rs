//! Per-ledger settlement policy.

use serde::{Deserialize, Serialize};
use tally_shared::config::SettlementConfig;

use crate::currency::{MinorUnitError, RoundingScale};

/// What to do with an expense recorded in a currency other than the ledger's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossCurrencyRule {
    /// Reject the expense. No conversion is ever attempted.
    #[default]
    Forbid,
}

/// Settlement policy for one ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Decimal places of one major unit in the ledger currency.
    #[serde(default)]
    pub rounding_scale: RoundingScale,
    /// Handling of foreign-currency expenses.
    #[serde(default)]
    pub cross_currency_rule: CrossCurrencyRule,
    /// Whether the payer joins equal splits when an expense does not say.
    #[serde(default = "default_include_payer_in_aa")]
    pub include_payer_in_aa: bool,
}

fn default_include_payer_in_aa() -> bool {
    true
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            rounding_scale: RoundingScale::default(),
            cross_currency_rule: CrossCurrencyRule::default(),
            include_payer_in_aa: default_include_payer_in_aa(),
        }
    }
}

impl LedgerSettings {
    /// Builds settings from the application's configured defaults.
    ///
    /// # Errors
    ///
    /// Returns `MinorUnitError::ScaleTooLarge` if the configured scale is unsupported.
    pub fn from_config(config: &SettlementConfig) -> Result<Self, MinorUnitError> {
        Ok(Self {
            rounding_scale: RoundingScale::new(config.rounding_scale)?,
            cross_currency_rule: CrossCurrencyRule::Forbid,
            include_payer_in_aa: config.include_payer_in_aa,
        })
    }
}
