//! ISO 4217 currency codes and the string-or-enum parameter accepted at the API boundary.
//!
//! The enum is generated by `define_currencies!`; to support a new code, add a line to the
//! invocation at the bottom of this file.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::ExchangeRateError;

macro_rules! define_currencies {
    ( $( $name:ident => $label:literal ),* $(,)? ) => {
        /// A supported currency, identified by its three-letter ISO 4217 code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum Currency {
            $( $name ),*
        }

        impl Currency {
            pub fn code(&self) -> &'static str {
                match self {
                    $( Currency::$name => stringify!($name) ),*
                }
            }

            /// Human-readable currency name.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Currency::$name => $label ),*
                }
            }

            pub const fn all() -> &'static [Currency] {
                &[ $( Currency::$name ),* ]
            }

            /// Exact (upper-case) code lookup.
            pub fn from_code(code: &str) -> Option<Currency> {
                match code {
                    $( stringify!($name) => Some(Currency::$name), )*
                    _ => None,
                }
            }
        }
    };
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ExchangeRateError;

    /// Case-insensitive: "usd", "USD" and "Usd" all resolve to [`Currency::USD`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(&s.to_uppercase())
            .ok_or_else(|| ExchangeRateError::InvalidCurrency(s.to_string()))
    }
}

impl TryFrom<&str> for Currency {
    type Error = ExchangeRateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A currency argument as callers supply it: either a raw code that still needs validation,
/// or an already-typed [`Currency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyParam {
    Code(String),
    Currency(Currency),
}

impl CurrencyParam {
    /// Resolve to a [`Currency`]. Raw codes are upper-cased before lookup.
    pub fn resolve(self) -> Result<Currency, ExchangeRateError> {
        match self {
            CurrencyParam::Currency(currency) => Ok(currency),
            CurrencyParam::Code(code) => code.parse(),
        }
    }
}

impl From<Currency> for CurrencyParam {
    fn from(value: Currency) -> Self {
        CurrencyParam::Currency(value)
    }
}

impl From<&str> for CurrencyParam {
    fn from(value: &str) -> Self {
        CurrencyParam::Code(value.to_string())
    }
}

impl From<String> for CurrencyParam {
    fn from(value: String) -> Self {
        CurrencyParam::Code(value)
    }
}

define_currencies! {
    AED => "United Arab Emirates Dirham",
    ARS => "Argentine Peso",
    AUD => "Australian Dollar",
    BGN => "Bulgarian Lev",
    BRL => "Brazilian Real",
    BTC => "Bitcoin",
    CAD => "Canadian Dollar",
    CHF => "Swiss Franc",
    CLP => "Chilean Peso",
    CNY => "Chinese Yuan",
    COP => "Colombian Peso",
    CZK => "Czech Koruna",
    DKK => "Danish Krone",
    EGP => "Egyptian Pound",
    EUR => "Euro",
    GBP => "British Pound Sterling",
    HKD => "Hong Kong Dollar",
    HUF => "Hungarian Forint",
    IDR => "Indonesian Rupiah",
    ILS => "Israeli New Sheqel",
    INR => "Indian Rupee",
    ISK => "Icelandic Krona",
    JPY => "Japanese Yen",
    KRW => "South Korean Won",
    KWD => "Kuwaiti Dinar",
    KZT => "Kazakhstani Tenge",
    MAD => "Moroccan Dirham",
    MXN => "Mexican Peso",
    MYR => "Malaysian Ringgit",
    NGN => "Nigerian Naira",
    NOK => "Norwegian Krone",
    NZD => "New Zealand Dollar",
    PEN => "Peruvian Nuevo Sol",
    PHP => "Philippine Peso",
    PKR => "Pakistani Rupee",
    PLN => "Polish Zloty",
    QAR => "Qatari Rial",
    RON => "Romanian Leu",
    RUB => "Russian Ruble",
    SAR => "Saudi Riyal",
    SEK => "Swedish Krona",
    SGD => "Singapore Dollar",
    THB => "Thai Baht",
    TRY => "Turkish Lira",
    TWD => "New Taiwan Dollar",
    UAH => "Ukrainian Hryvnia",
    USD => "United States Dollar",
    VND => "Vietnamese Dong",
    XAG => "Silver (troy ounce)",
    XAU => "Gold (troy ounce)",
    ZAR => "South African Rand",
}
