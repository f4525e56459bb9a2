//! Vitrina prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    business::{BusinessError, BusinessInfo},
    cart::{AddOutcome, CartError, CartLine, CartStore, LineId, QuantityChange},
    catalog::{Catalog, CatalogError, Product, ProductId, Variant, VariantId},
    checkout::{CheckoutError, CheckoutFlow, CustomerForm, Field, FieldError, Stage},
    export::{
        ChannelOutcome, ExportError, MessageHandoff, OrderExporter, ReceiptData, ReceiptLine,
        dispatch,
    },
    order::{CustomerInfo, OrderError, OrderNumber, OrderSequence, OrderSnapshot},
    pricing::{PaymentMethod, PricingError, PricingResult, quote},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
