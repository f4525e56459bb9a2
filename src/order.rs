//! Orders
//!
//! The immutable order snapshot handed to export channels, and the
//! persisted sequence that allocates human-readable order numbers.

use std::fmt;

use jiff::Timestamp;
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::CartLine,
    pricing::{PaymentMethod, PricingResult},
    storage::{KeyValueStore, StorageError},
};

/// Storage key the order-number counter is persisted under.
pub const ORDER_SEQ_KEY: &str = "order-seq";

/// Errors raised while allocating order numbers.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The advanced counter could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Customer details captured at submission time. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    name: String,
    email: String,
    phone: String,
    address: String,
}

impl CustomerInfo {
    /// Create customer details from already-sanitized fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Customer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Customer email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Customer phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Customer address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Human-readable order identifier: business prefix plus zero-padded counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// The order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted monotonic counter allocating unique order numbers.
#[derive(Debug)]
pub struct OrderSequence<S: KeyValueStore> {
    storage: S,
    prefix: String,
}

impl<S: KeyValueStore> OrderSequence<S> {
    /// Open the sequence, reading the last allocated value from storage.
    pub fn open(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    /// Allocate the next order number and persist the advanced counter.
    ///
    /// A missing or corrupt persisted counter restarts the sequence at 1
    /// rather than failing checkout.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if the advanced counter cannot be persisted.
    pub fn next(&mut self) -> Result<OrderNumber, OrderError> {
        let current = match self.storage.get(ORDER_SEQ_KEY) {
            None => 0,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) => value,
                Err(_err) => {
                    warn!(%raw, "persisted order counter unreadable; restarting at 1");
                    0
                }
            },
        };

        let next = current.saturating_add(1);
        self.storage.put(ORDER_SEQ_KEY, &next.to_string())?;

        Ok(OrderNumber(format!("{}-{next:06}", self.prefix)))
    }
}

/// An immutable, fully-copied record of an order at the moment of submission.
///
/// This is the sole contract handed to export channels. The lines are copied
/// out of the cart, so later cart mutations cannot change a built snapshot.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    order_number: OrderNumber,
    placed_at: Timestamp,
    customer: CustomerInfo,
    lines: Vec<CartLine>,
    payment_method: PaymentMethod,
    pricing: PricingResult,
}

impl OrderSnapshot {
    /// Assemble a snapshot. Called once per successful checkout.
    #[must_use]
    pub fn new(
        order_number: OrderNumber,
        placed_at: Timestamp,
        customer: CustomerInfo,
        lines: Vec<CartLine>,
        payment_method: PaymentMethod,
        pricing: PricingResult,
    ) -> Self {
        Self {
            order_number,
            placed_at,
            customer,
            lines,
            payment_method,
            pricing,
        }
    }

    /// The allocated order number.
    #[must_use]
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// When the order was submitted.
    #[must_use]
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Customer details captured at submission.
    #[must_use]
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// The ordered lines, copied from the cart at submission.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Payment method selected at submission.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Totals computed at submission.
    #[must_use]
    pub fn pricing(&self) -> &PricingResult {
        &self.pricing
    }
}
