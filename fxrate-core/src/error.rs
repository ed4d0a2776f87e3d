//! Error taxonomy shared by the registry, the providers and the facade.

/// Errors surfaced by exchange rate lookups.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeRateError {
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Invalid currency code: source currency '{0}' is not supported")]
    InvalidSourceCurrency(String),

    #[error("Invalid currency code: target currency '{0}' is not supported")]
    InvalidTargetCurrency(String),

    #[error("Exchange rate provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("Provider '{0}' must be registered with a factory producing a RateProvider")]
    InvalidProviderKind(String),

    /// Upstream API reported a failure; `message` and `code` come from its error envelope.
    #[error("{message}")]
    Provider { message: String, code: i64 },

    #[error("No exchange rate provider configured")]
    NoProviderConfigured,
}

impl ExchangeRateError {
    /// True for any of the currency validation failures, directional or not.
    pub fn is_invalid_currency(&self) -> bool {
        matches!(
            self,
            ExchangeRateError::InvalidCurrency(_)
                | ExchangeRateError::InvalidSourceCurrency(_)
                | ExchangeRateError::InvalidTargetCurrency(_)
        )
    }

    /// Upstream error code, when the error came from a provider.
    pub fn code(&self) -> Option<i64> {
        match self {
            ExchangeRateError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T, E = ExchangeRateError> = std::result::Result<T, E>;
