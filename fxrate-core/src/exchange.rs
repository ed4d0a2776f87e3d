//! The [`ExchangeRate`] facade: validates caller-supplied currencies, then delegates to the
//! active provider.

use std::sync::Arc;
use tracing::debug;

use crate::{
    Currency, CurrencyParam, CurrencyRate, ProviderRegistry,
    error::{ExchangeRateError, Result},
    provider::RateProvider,
};

/// What to switch to in [`ExchangeRate::use_provider`]: a registered name or a ready instance.
#[derive(Debug)]
pub enum ProviderChoice {
    Name(String),
    Instance(Box<dyn RateProvider>),
}

impl From<&str> for ProviderChoice {
    fn from(value: &str) -> Self {
        ProviderChoice::Name(value.to_string())
    }
}

impl From<String> for ProviderChoice {
    fn from(value: String) -> Self {
        ProviderChoice::Name(value)
    }
}

impl From<Box<dyn RateProvider>> for ProviderChoice {
    fn from(value: Box<dyn RateProvider>) -> Self {
        ProviderChoice::Instance(value)
    }
}

#[derive(Debug)]
pub struct ExchangeRate {
    provider: Option<Box<dyn RateProvider>>,
    registry: Arc<ProviderRegistry>,
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRate {
    /// A facade without a provider, resolving names through the global registry.
    pub fn new() -> Self {
        Self::with_registry(ProviderRegistry::global())
    }

    pub fn with_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self { provider: None, registry }
    }

    pub fn with_provider(provider: impl RateProvider + 'static) -> Self {
        let mut exchange = Self::new();
        exchange.provider = Some(Box::new(provider));
        exchange
    }

    pub fn use_provider(&mut self, choice: impl Into<ProviderChoice>) -> Result<&mut Self> {
        let provider = match choice.into() {
            ProviderChoice::Name(name) => {
                debug!(provider = %name, "Switching to registered provider");
                self.registry.make(&name)?
            }
            ProviderChoice::Instance(provider) => provider,
        };

        self.provider = Some(provider);
        Ok(self)
    }

    pub fn provider(&self) -> Option<&dyn RateProvider> {
        self.provider.as_deref()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn active_provider(&self) -> Result<&dyn RateProvider> {
        self.provider().ok_or(ExchangeRateError::NoProviderConfigured)
    }

    /// Typed currencies pass through; strings are upper-cased and looked up.
    pub fn resolve_currency_param(&self, value: impl Into<CurrencyParam>) -> Result<Currency> {
        value.into().resolve()
    }

    /// Convert `amount` between two currencies.
    ///
    /// Both currencies are validated before the provider is consulted, so an invalid code never
    /// results in an upstream request.
    pub async fn convert(
        &self,
        amount: f64,
        from: impl Into<CurrencyParam>,
        to: impl Into<CurrencyParam>,
    ) -> Result<Option<f64>> {
        let from = directional(from.into(), ExchangeRateError::InvalidSourceCurrency)?;
        let to = directional(to.into(), ExchangeRateError::InvalidTargetCurrency)?;

        self.active_provider()?.convert(amount, from, to).await
    }

    /// Rates from `source` to each of `targets`.
    ///
    /// Only `source` accepts a raw code; targets must already be typed.
    pub async fn get_rates(
        &self,
        source: impl Into<CurrencyParam>,
        targets: &[Currency],
    ) -> Result<Vec<CurrencyRate>> {
        let source = directional(source.into(), ExchangeRateError::InvalidSourceCurrency)?;

        self.active_provider()?.get_rates(source, targets).await
    }
}

fn directional(
    param: CurrencyParam,
    error: fn(String) -> ExchangeRateError,
) -> Result<Currency> {
    param.resolve().map_err(|err| match err {
        ExchangeRateError::InvalidCurrency(code) => error(code),
        other => other,
    })
}
