//! Core library for the `fxrate` CLI.
//!
//! This crate defines:
//! - Supported currencies and exchange rate results
//! - A thin HTTP driver abstraction used by providers
//! - Abstraction over exchange rate providers and a name-keyed provider registry
//! - The [`ExchangeRate`] facade that validates input before delegating to a provider
//! - Configuration & credentials handling
//!
//! It is used by `fxrate-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod currency;
pub mod error;
pub mod exchange;
pub mod http;
pub mod model;
pub mod provider;
pub mod registry;

pub use config::{Config, ProviderConfig};
pub use currency::{Currency, CurrencyParam};
pub use error::ExchangeRateError;
pub use exchange::{ExchangeRate, ProviderChoice};
pub use model::CurrencyRate;
pub use provider::{ProviderId, RateProvider};
pub use registry::{ProviderFactory, ProviderRegistry};
