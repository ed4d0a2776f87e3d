use crate::{
    Config, Currency, CurrencyRate, ProviderConfig, ProviderRegistry,
    error::Result,
    http::ReqwestHttpClient,
    provider::exchangerate_host::ExchangeRateHost,
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::debug;

pub mod exchangerate_host;

/// Capability set every exchange rate source exposes to the facade.
#[async_trait]
pub trait RateProvider: Send + Sync + Debug {
    /// Convert `amount` of `from` into `to`. `Ok(None)` means the source answered without a result.
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<Option<f64>>;

    async fn get_rates(&self, source: Currency, targets: &[Currency]) -> Result<Vec<CurrencyRate>>;
}

/// Built-in provider kinds that can be configured from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    ExchangeRateHost,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::ExchangeRateHost => "exchangeratehost",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::ExchangeRateHost]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "exchangeratehost" => Ok(ProviderId::ExchangeRateHost),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: exchangeratehost."
            )),
        }
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn RateProvider>> {
    let provider_config = config.provider_config(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `fxrate configure {id}` and enter your API key."
        )
    })?;

    Ok(build_provider(id, provider_config))
}

fn build_provider(id: ProviderId, provider_config: &ProviderConfig) -> Box<dyn RateProvider> {
    let mut http = ReqwestHttpClient::new();
    if let Some(secs) = provider_config.timeout_secs {
        http = http.with_timeout(Duration::from_secs(secs));
    }

    match id {
        ProviderId::ExchangeRateHost => {
            let mut provider =
                ExchangeRateHost::new(provider_config.api_key.clone()).use_http_client(http);
            if let Some(base_url) = &provider_config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Box::new(provider)
        }
    }
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn RateProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Register a factory for every built-in provider that has credentials in `config`.
///
/// Returns the names that were registered.
pub fn register_configured(registry: &ProviderRegistry, config: &Config) -> Vec<&'static str> {
    let mut registered = Vec::new();

    for &id in ProviderId::all() {
        let Some(provider_config) = config.provider_config(id).cloned() else {
            continue;
        };

        registry.register(id.as_str(), move || build_provider(id, &provider_config));

        debug!(provider = %id, "Registered configured provider");
        registered.push(id.as_str());
    }

    registered
}
