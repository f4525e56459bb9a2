//! Catalog
//!
//! The read-only product catalog: products with selectable priced variants,
//! loaded once at startup and never mutated. All prices share one currency.

use std::fmt;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building or querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product exists with the given id.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product exists but has no variant with the given id.
    #[error("variant {1} of product {0} not found")]
    VariantNotFound(ProductId, VariantId),

    /// A variant's price currency differs from the catalog currency.
    #[error("variant {variant} of product {product} is priced in {found}, but the catalog uses {expected}")]
    CurrencyMismatch {
        /// Product owning the offending variant.
        product: ProductId,
        /// The offending variant.
        variant: VariantId,
        /// Catalog currency code.
        expected: &'static str,
        /// Variant price currency code.
        found: &'static str,
    },

    /// Two products share the same id.
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
}

/// Product identifier, stable across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u32);

impl ProductId {
    /// Create a product id from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The numeric value of the id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant identifier within a product (e.g. `win11`), stable across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(String);

impl VariantId {
    /// Create a variant id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A purchasable configuration of a product with its own price.
#[derive(Debug, Clone)]
pub struct Variant {
    id: VariantId,
    label: String,
    unit_price: Money<'static, Currency>,
}

impl Variant {
    /// Create a new variant.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        unit_price: Money<'static, Currency>,
    ) -> Self {
        Self {
            id: VariantId::new(id),
            label: label.into(),
            unit_price,
        }
    }

    /// The variant id.
    #[must_use]
    pub fn id(&self) -> &VariantId {
        &self.id
    }

    /// Human-readable variant label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Price of one unit of this variant.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'static, Currency> {
        &self.unit_price
    }
}

/// A product with its selectable variants.
#[derive(Debug, Clone)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    variants: Vec<Variant>,
}

impl Product {
    /// Create a new product.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        variants: Vec<Variant>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            variants,
        }
    }

    /// The product id.
    #[must_use]
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Product name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short product description for receipts and listings.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All variants of this product, in catalog order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id() == id)
    }
}

/// The immutable product catalog.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// Build a catalog from products, enforcing a single currency.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if any variant is priced in
    /// a different currency, or [`CatalogError::DuplicateProduct`] if two
    /// products share an id.
    pub fn new(products: Vec<Product>, currency: &'static Currency) -> Result<Self, CatalogError> {
        let mut index = FxHashMap::default();

        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id(), position).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id()));
            }

            for variant in product.variants() {
                let found = variant.unit_price().currency();

                if found != currency {
                    return Err(CatalogError::CurrencyMismatch {
                        product: product.id(),
                        variant: variant.id().clone(),
                        expected: currency.iso_alpha_code,
                        found: found.iso_alpha_code,
                    });
                }
            }
        }

        Ok(Self {
            products,
            index,
            currency,
        })
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has this id.
    pub fn product(&self, id: ProductId) -> Result<&Product, CatalogError> {
        self.index
            .get(&id)
            .and_then(|position| self.products.get(*position))
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Resolve a (product, variant) selection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] or
    /// [`CatalogError::VariantNotFound`] if either id is unresolvable.
    pub fn variant(
        &self,
        product_id: ProductId,
        variant_id: &VariantId,
    ) -> Result<(&Product, &Variant), CatalogError> {
        let product = self.product(product_id)?;

        let variant = product
            .variant(variant_id)
            .ok_or_else(|| CatalogError::VariantNotFound(product_id, variant_id.clone()))?;

        Ok((product, variant))
    }

    /// All products, in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The currency every catalog price is quoted in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
