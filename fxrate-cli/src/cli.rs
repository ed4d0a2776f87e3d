use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fxrate_core::{
    Config, Currency, CurrencyRate, ExchangeRate, ExchangeRateError, ProviderId, ProviderRegistry,
    provider::register_configured,
};
use inquire::{Confirm, Password, PasswordDisplayMode};
use std::path::PathBuf;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "fxrate", version, about = "Currency exchange rate CLI")]
pub struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of the platform default.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "exchangeratehost".
        provider: String,
    },

    /// Convert an amount from one currency to another.
    Convert {
        amount: f64,

        /// Source currency code, e.g. "usd".
        from: String,

        /// Target currency code, e.g. "eur".
        to: String,

        /// Registered provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show live rates from one currency to several others.
    Rates {
        /// Source currency code.
        source: String,

        /// Target currency codes, space- or comma-separated.
        #[arg(required = true, value_delimiter = ',')]
        targets: Vec<String>,

        #[arg(long)]
        provider: Option<String>,

        /// Print rates as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List registered providers.
    Providers,

    /// List supported currency codes.
    Currencies,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure { provider } => configure(config, self.config, &provider)?,
            Command::Convert { amount, from, to, provider } => {
                let exchange = exchange_for(&config, provider.as_deref())?;
                let from = exchange.resolve_currency_param(from)?;
                let to = exchange.resolve_currency_param(to)?;

                match exchange.convert(amount, from, to).await? {
                    Some(result) => println!("{amount} {from} = {result:.4} {to}"),
                    None => println!("Provider returned no result for {from} -> {to}"),
                }
            }
            Command::Rates { source, targets, provider, json } => {
                let targets = parse_targets(&targets)?;
                let exchange = exchange_for(&config, provider.as_deref())?;
                let rates = exchange.get_rates(source, &targets).await?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&rates)?);
                } else {
                    print_rates(&rates);
                }
            }
            Command::Providers => {
                let registry = ProviderRegistry::global();
                register_configured(&registry, &config);

                let names = registry.names();
                if names.is_empty() {
                    println!("No providers configured.");
                    println!("Hint: run `fxrate configure exchangeratehost` and enter your API key.");
                }
                for name in names {
                    let marker = if config.default_provider.as_deref() == Some(name.as_str()) {
                        " (default)"
                    } else {
                        ""
                    };
                    println!("{name}{marker}");
                }
            }
            Command::Currencies => {
                for currency in Currency::all() {
                    println!("{currency}  {}", currency.name());
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config, path: Option<PathBuf>, provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let had_other_default =
        config.default_provider.as_deref().is_some_and(|current| current != id.as_str());
    config.upsert_provider_api_key(id, api_key.trim().to_string());

    if had_other_default
        && Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?
    {
        config.set_default_provider(id);
    }

    match &path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    let location = match path {
        Some(path) => path,
        None => Config::config_file_path()?,
    };
    println!("Saved {id} configuration to {}", location.display());
    Ok(())
}

/// Build a facade bound to `provider`, or to the configured default when none is given.
fn exchange_for(config: &Config, provider: Option<&str>) -> Result<ExchangeRate> {
    let registry = ProviderRegistry::global();
    register_configured(&registry, config);

    let name = match provider {
        Some(name) => name.to_string(),
        None => config.default_provider_id()?.as_str().to_string(),
    };

    let mut exchange = ExchangeRate::with_registry(registry);
    exchange.use_provider(name.as_str()).map_err(|err| match err {
        ExchangeRateError::ProviderNotFound(_) => anyhow::anyhow!(
            "{err}.\nHint: run `fxrate configure {name}` and enter your API key."
        ),
        other => other.into(),
    })?;

    Ok(exchange)
}

fn parse_targets(codes: &[String]) -> Result<Vec<Currency>> {
    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .map(|code| code.parse::<Currency>().with_context(|| format!("Unsupported target '{code}'")))
        .collect()
}

fn print_rates(rates: &[CurrencyRate]) {
    if rates.is_empty() {
        println!("No rates returned.");
        return;
    }
    for rate in rates {
        println!("{} -> {}  {:>14.6}", rate.source, rate.target, rate.rate);
    }
}
