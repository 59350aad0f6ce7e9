//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from price construction and arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price amount cannot be negative")]
    Negative,
    /// Arithmetic between two different currencies.
    #[error("currency mismatch: {left:?} vs {right:?}")]
    CurrencyMismatch {
        left: CurrencyCode,
        right: CurrencyCode,
    },
}

/// A price with currency information.
///
/// Amounts are exact decimals in the currency's standard unit (e.g. dollars,
/// not cents). Arithmetic is only defined between prices of the same
/// currency; mixing currencies is an error rather than a silent coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price after checking that the amount is non-negative.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn non_negative(
        amount: Decimal,
        currency_code: CurrencyCode,
    ) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self::new(amount, currency_code))
    }

    /// The zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply the price by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(
            self.amount * Decimal::from(quantity),
            self.currency_code,
        )
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::CurrencyMismatch` when the currencies differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch {
                left: self.currency_code,
                right: other.currency_code,
            });
        }
        Ok(Self::new(self.amount + other.amount, self.currency_code))
    }

    /// Format for display (e.g. "N$79.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NAD,
    ZAR,
    USD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::NAD => "N$",
            Self::ZAR => "R",
            Self::USD => "$",
        }
    }

    /// ISO 4217 code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NAD => "NAD",
            Self::ZAR => "ZAR",
            Self::USD => "USD",
        }
    }
}
