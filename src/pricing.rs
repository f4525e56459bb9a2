//! Pricing
//!
//! Pure total computation over cart lines: subtotal, payment-method
//! conditional discount, and final total. Nothing here is cached or stored;
//! callers re-quote whenever the cart or payment method changes.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur while computing totals.
#[derive(Debug, Error)]
pub enum PricingError {
    /// A line total overflowed minor units.
    #[error("line total overflowed minor units")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How the customer intends to pay. Cash is the only method that discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    /// Bank transfer, paid out-of-band.
    #[default]
    BankTransfer,

    /// PayPal, paid out-of-band.
    PayPal,

    /// Cash on delivery; triggers the configured discount.
    Cash,
}

impl PaymentMethod {
    /// Customer-facing label, as it appears on receipts and handoff messages.
    ///
    /// The cash label embeds the discount it grants, mirroring the selector
    /// in the storefront UI.
    #[must_use]
    pub fn label(self, cash_discount: Percentage) -> String {
        match self {
            Self::BankTransfer => "Transferencia Bancaria".to_owned(),
            Self::PayPal => "PayPal".to_owned(),
            Self::Cash => format!("Efectivo ({}% descuento)", percent_points(cash_discount)),
        }
    }
}

/// Converts a fractional percentage to percent points for display.
#[must_use]
pub fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.30), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

/// Derived totals for a cart and payment method. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingResult {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl PricingResult {
    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Amount deducted from the subtotal; zero unless paying cash.
    #[must_use]
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Subtotal minus discount.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }
}

/// Price of one line: unit price times quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the multiplication overflows minor
/// units.
pub fn line_total(line: &CartLine) -> Result<Money<'static, Currency>, PricingError> {
    let minor = line
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, line.unit_price().currency()))
}

/// Sum of all line totals. An empty cart sums to zero in `currency`.
///
/// # Errors
///
/// Returns a [`PricingError`] on money arithmetic or overflow errors.
pub fn subtotal(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line_total(line)?)?)
        })
}

/// Calculate the discount amount in minor units for a percentage of a minor
/// unit amount, rounding midpoints away from zero.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows
/// or cannot be safely represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Quote a cart: subtotal, conditional cash discount, and total.
///
/// # Errors
///
/// Returns a [`PricingError`] on money arithmetic, overflow or percentage
/// conversion errors.
pub fn quote(
    lines: &[CartLine],
    method: PaymentMethod,
    cash_discount: Percentage,
    currency: &'static Currency,
) -> Result<PricingResult, PricingError> {
    let subtotal = subtotal(lines, currency)?;

    let discount_minor = if method == PaymentMethod::Cash {
        percent_of_minor(&cash_discount, subtotal.to_minor_units())?
    } else {
        0
    };

    let discount = Money::from_minor(discount_minor, currency);
    let total = subtotal.sub(discount)?;

    Ok(PricingResult {
        subtotal,
        discount,
        total,
    })
}
