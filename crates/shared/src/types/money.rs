//! Money amounts as they cross into the payment provider.
//!
//! Amounts stay `Decimal` in major units everywhere in the domain. Only the
//! payment hold needs integer minor units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An amount in major units tagged with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Major units (dollars).
    pub amount: Decimal,
    /// Settlement currency.
    pub currency: Currency,
}

/// Currencies a hold can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Pound Sterling
    Gbp,
    /// Canadian Dollar
    Cad,
}

impl Currency {
    /// Every supported currency has two decimal places.
    const MINOR_PER_MAJOR: i64 = 100;

    /// Lowercase code, the form the provider API takes.
    #[must_use]
    pub const fn as_provider_code(self) -> &'static str {
        match self {
            Self::Usd => "usd",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Cad => "cad",
        }
    }
}

impl Money {
    /// Tags `amount` with `currency`.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Integer minor units (cents), or `None` for sub-cent precision and
    /// values past `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        let minor = self
            .amount
            .checked_mul(Decimal::from(Currency::MINOR_PER_MAJOR))?;
        if !minor.fract().is_zero() {
            return None;
        }
        minor.to_i64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(Money::new(dec!(1000), Currency::Usd).to_minor_units(), Some(100_000));
        assert_eq!(Money::new(dec!(12.34), Currency::Usd).to_minor_units(), Some(1234));
        assert_eq!(Money::new(dec!(0.5), Currency::Eur).to_minor_units(), Some(50));
    }

    #[test]
    fn test_to_minor_units_rejects_sub_cent() {
        assert_eq!(Money::new(dec!(1.005), Currency::Usd).to_minor_units(), None);
    }

    #[test]
    fn test_to_minor_units_overflow() {
        assert_eq!(Money::new(Decimal::MAX, Currency::Usd).to_minor_units(), None);
    }

    #[test]
    fn test_provider_code() {
        assert_eq!(Currency::Usd.as_provider_code(), "usd");
        assert_eq!(Currency::Gbp.as_provider_code(), "gbp");
    }

    #[test]
    fn test_currency_deserializes_uppercase() {
        let c: Currency = serde_json::from_str("\"CAD\"").unwrap();
        assert_eq!(c, Currency::Cad);
    }
}
