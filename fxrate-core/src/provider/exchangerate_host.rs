use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    Currency, CurrencyRate,
    error::{ExchangeRateError, Result},
    http::{HttpClient, ReqwestHttpClient, ResponseBody},
};

use super::RateProvider;

pub const BASE_URL: &str = "https://api.exchangerate.host";

/// Provider backed by the exchangerate.host API.
///
/// Only the `success` flag of the response envelope is inspected: an HTTP error status or a
/// transport failure without a JSON envelope is reported as "Unknown error".
#[derive(Debug)]
pub struct ExchangeRateHost {
    access_key: String,
    base_url: String,
    http: Box<dyn HttpClient>,
}

impl ExchangeRateHost {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: BASE_URL.to_string(),
            http: Box::new(ReqwestHttpClient::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn use_http_client(mut self, client: impl HttpClient + 'static) -> Self {
        self.http = Box::new(client);
        self
    }

    pub fn http_client(&self) -> &dyn HttpClient {
        self.http.as_ref()
    }

    pub fn http_client_mut(&mut self) -> &mut dyn HttpClient {
        self.http.as_mut()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<ResponseBody> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self.http.get(&url, params).await;
        let status = response.status_code();
        let body = response.into_body();

        if !is_truthy(body.get("success")) {
            let error = body.get("error");
            let message = error
                .and_then(|e| e.get("info"))
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            let code = error.and_then(|e| e.get("code")).and_then(Value::as_i64).unwrap_or(0);

            warn!(endpoint, status, code, %message, "exchangerate.host request failed");
            return Err(ExchangeRateError::Provider { message, code });
        }

        Ok(body)
    }

    /// Turn a `quotes` mapping into rates.
    ///
    /// Keys are the source and target codes concatenated (`"USDEUR"`); the target is read from
    /// everything after the first three characters.
    pub fn normalize_rates(
        source: Currency,
        quotes: &Map<String, Value>,
    ) -> Result<Vec<CurrencyRate>> {
        let mut rates = Vec::with_capacity(quotes.len());

        for (symbol, rate) in quotes {
            let target = symbol
                .get(3..)
                .and_then(|code| Currency::from_code(&code.to_uppercase()))
                .ok_or_else(|| ExchangeRateError::InvalidTargetCurrency(symbol.clone()))?;

            let Some(rate) = rate.as_f64() else {
                warn!(%symbol, %rate, "Skipping non-numeric quote");
                continue;
            };

            rates.push(CurrencyRate::new(source, target, rate));
        }

        Ok(rates)
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

#[async_trait]
impl RateProvider for ExchangeRateHost {
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<Option<f64>> {
        debug!(amount, %from, %to, "Converting via exchangerate.host");

        let body = self
            .fetch(
                "convert",
                &[
                    ("access_key", self.access_key.clone()),
                    ("from", from.code().to_string()),
                    ("to", to.code().to_string()),
                    ("amount", amount.to_string()),
                ],
            )
            .await?;

        Ok(body.get("result").and_then(Value::as_f64))
    }

    async fn get_rates(&self, source: Currency, targets: &[Currency]) -> Result<Vec<CurrencyRate>> {
        let currencies = targets.iter().map(Currency::code).collect::<Vec<_>>().join(",");
        debug!(%source, %currencies, "Fetching live rates from exchangerate.host");

        let body = self
            .fetch(
                "live",
                &[
                    ("access_key", self.access_key.clone()),
                    ("source", source.code().to_string()),
                    ("currencies", currencies),
                ],
            )
            .await?;

        match body.get("quotes").and_then(Value::as_object) {
            Some(quotes) => Self::normalize_rates(source, quotes),
            None => Ok(Vec::new()),
        }
    }
}
