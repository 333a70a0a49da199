//! Engine settings.
//!
//! Values come from built-in defaults, an optional settings file and
//! `SPLIT_*` environment variables, in that order of precedence (lowest
//! first). Amounts are given in cents.
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::SplitResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Largest difference treated as zero when comparing amounts
    pub tolerance: Money,
    /// Symbol used when formatting amounts for display
    pub currency_symbol: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tolerance: Money::from_cents(1),
            currency_symbol: "$".to_string(),
        }
    }
}

impl EngineSettings {
    /// Load settings from `path` (any format `config` understands, the file
    /// may be missing) overridden by `SPLIT_TOLERANCE` / `SPLIT_CURRENCY_SYMBOL`.
    pub fn load(path: &str) -> SplitResult<Self> {
        Self::load_from(path, Environment::with_prefix("SPLIT"))
    }

    fn load_from(path: &str, environment: Environment) -> SplitResult<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment.try_parsing(true))
            .build()?;

        let loaded: EngineSettings = settings.try_deserialize()?;
        tracing::debug!(
            tolerance = loaded.tolerance.cents(),
            symbol = %loaded.currency_symbol,
            "engine settings loaded"
        );
        Ok(loaded)
    }

    /// Format an amount with the configured currency symbol
    pub fn format(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }
}
