//! Cart
//!
//! The cart store is the sole owner of the ordered line-item collection and
//! its durability: every mutating operation ends with a full write of the
//! cart to key-value storage, and opening a store loads whatever was
//! persisted, silently recovering corrupt data as an empty cart.

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    catalog::{Catalog, CatalogError, ProductId, VariantId},
    storage::{KeyValueStore, StorageError},
};

/// Storage key the serialized line array is persisted under.
pub const CART_KEY: &str = "cart";

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product or variant does not exist in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No cart line exists with the given id.
    #[error("cart line {0} not found")]
    LineNotFound(LineId),

    /// A quantity update overflowed.
    #[error("line quantity out of range")]
    QuantityOverflow,

    /// The cart could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be serialized for persistence.
    #[error("failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Unique identifier of a cart line, generated at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a fresh line id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single cart entry for one product+variant pair with a quantity.
///
/// Product name, variant label and unit price are denormalized into the line
/// at add time, so the cart (and any order snapshot built from it) stays
/// self-contained even if the catalog changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    line_id: LineId,
    product_id: ProductId,
    product_name: String,
    variant_id: VariantId,
    variant_label: String,
    unit_price: Money<'static, Currency>,
    quantity: u32,
}

impl CartLine {
    /// Create a new line with quantity 1 and a freshly generated id.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        variant_id: VariantId,
        variant_label: impl Into<String>,
        unit_price: Money<'static, Currency>,
    ) -> Self {
        Self {
            line_id: LineId::generate(),
            product_id,
            product_name: product_name.into(),
            variant_id,
            variant_label: variant_label.into(),
            unit_price,
            quantity: 1,
        }
    }

    /// The unique line id.
    #[must_use]
    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    /// Id of the product this line is for.
    #[must_use]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Product name at the time the line was added.
    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Id of the selected variant.
    #[must_use]
    pub fn variant_id(&self) -> &VariantId {
        &self.variant_id
    }

    /// Variant label at the time the line was added.
    #[must_use]
    pub fn variant_label(&self) -> &str {
        &self.variant_label
    }

    /// Price of one unit, frozen at add time.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }

    /// Number of units, always at least 1.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

#[cfg(test)]
impl CartLine {
    /// Test helper: build a line with a specific quantity.
    pub(crate) fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }
}

/// Persisted shape of a cart line.
///
/// Prices are stored in minor units; the currency is the store currency, so
/// the record round-trips losslessly without carrying a currency code.
#[derive(Debug, Serialize, Deserialize)]
struct StoredLine {
    line_id: LineId,
    product_id: ProductId,
    product_name: String,
    variant_id: VariantId,
    variant_label: String,
    unit_price_minor: i64,
    quantity: u32,
}

impl StoredLine {
    fn from_line(line: &CartLine) -> Self {
        Self {
            line_id: line.line_id,
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            variant_id: line.variant_id.clone(),
            variant_label: line.variant_label.clone(),
            unit_price_minor: line.unit_price.to_minor_units(),
            quantity: line.quantity,
        }
    }

    fn into_line(self, currency: &'static Currency) -> CartLine {
        CartLine {
            line_id: self.line_id,
            product_id: self.product_id,
            product_name: self.product_name,
            variant_id: self.variant_id,
            variant_label: self.variant_label,
            unit_price: Money::from_minor(self.unit_price_minor, currency),
            quantity: self.quantity.max(1),
        }
    }
}

/// Outcome of [`CartStore::add_item`], so callers can word their feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// A new line was created for this (product, variant) pair.
    Added(CartLine),
    /// An existing line's quantity was incremented.
    Merged(CartLine),
}

impl AddOutcome {
    /// The affected line, regardless of outcome.
    #[must_use]
    pub fn line(&self) -> &CartLine {
        match self {
            Self::Added(line) | Self::Merged(line) => line,
        }
    }
}

/// Outcome of [`CartStore::change_quantity`].
#[derive(Debug, Clone, PartialEq)]
pub enum QuantityChange {
    /// The line's quantity was updated in place.
    Updated(CartLine),
    /// The quantity dropped to zero or below and the line was removed.
    Removed(CartLine),
}

/// Owner of the cart state and its durability.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    storage: S,
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open a cart store, loading any persisted cart.
    ///
    /// Corrupt or unparseable persisted data is recovered as an empty cart;
    /// opening never fails.
    pub fn open(storage: S, currency: &'static Currency) -> Self {
        let lines = match storage.get(CART_KEY) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<StoredLine>>(&raw) {
                Ok(records) => records
                    .into_iter()
                    .map(|record| record.into_line(currency))
                    .collect(),
                Err(err) => {
                    warn!(%err, "persisted cart unreadable; starting empty");
                    Vec::new()
                }
            },
        };

        Self {
            storage,
            lines,
            currency,
        }
    }

    /// Add one unit of a (product, variant) selection to the cart.
    ///
    /// If a line for the same pair already exists its quantity is
    /// incremented; otherwise a new line is appended. The cart is persisted
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Catalog`] if the product or variant is
    /// unresolvable (the cart is left unchanged), or a persistence error.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product_id: ProductId,
        variant_id: &VariantId,
    ) -> Result<AddOutcome, CartError> {
        let (product, variant) = catalog.variant(product_id, variant_id)?;

        let existing = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id && &line.variant_id == variant_id);

        let outcome = if let Some(line) = existing {
            line.quantity = line
                .quantity
                .checked_add(1)
                .ok_or(CartError::QuantityOverflow)?;

            AddOutcome::Merged(line.clone())
        } else {
            let line = CartLine::new(
                product_id,
                product.name(),
                variant_id.clone(),
                variant.label(),
                *variant.unit_price(),
            );

            self.lines.push(line.clone());

            AddOutcome::Added(line)
        };

        self.persist()?;

        debug!(%product_id, variant = %variant_id, merged = matches!(outcome, AddOutcome::Merged(_)), "item added to cart");

        Ok(outcome)
    }

    /// Change a line's quantity by `delta`, removing it at zero or below.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line is absent (the cart is
    /// left unchanged), or a persistence error.
    pub fn change_quantity(
        &mut self,
        line_id: LineId,
        delta: i32,
    ) -> Result<QuantityChange, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;

        let Some(line) = self.lines.get_mut(position) else {
            return Err(CartError::LineNotFound(line_id));
        };

        let updated = i64::from(line.quantity) + i64::from(delta);

        if updated <= 0 {
            let removed = self.lines.remove(position);
            self.persist()?;

            return Ok(QuantityChange::Removed(removed));
        }

        line.quantity = u32::try_from(updated).map_err(|_err| CartError::QuantityOverflow)?;

        let changed = line.clone();
        self.persist()?;

        Ok(QuantityChange::Updated(changed))
    }

    /// Remove a line entirely, returning it for caller feedback.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the line is absent, or a
    /// persistence error.
    pub fn remove_item(&mut self, line_id: LineId) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.line_id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;

        let removed = self.lines.remove(position);
        self.persist()?;

        Ok(removed)
    }

    /// Empty the cart. Used after a successful order submission.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the emptied cart could not be written.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.lines.clear();
        self.persist()
    }

    /// Sum of all line quantities, for badge display.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    /// All cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The currency every line price is quoted in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn persist(&mut self) -> Result<(), CartError> {
        let records: Vec<StoredLine> = self.lines.iter().map(StoredLine::from_line).collect();
        let encoded = serde_json::to_string(&records)?;

        self.storage.put(CART_KEY, &encoded)?;

        Ok(())
    }
}
