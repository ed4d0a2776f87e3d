use serde::{Deserialize, Serialize};

use crate::Currency;

/// One source → target exchange rate, as reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub source: Currency,
    pub target: Currency,
    pub rate: f64,
}

impl CurrencyRate {
    pub fn new(source: Currency, target: Currency, rate: f64) -> Self {
        Self { source, target, rate }
    }
}
