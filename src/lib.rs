//! Vitrina
//!
//! Vitrina is a client-embeddable storefront engine: a read-only product
//! catalog, a persisted shopping cart, a pure pricing engine with a
//! conditional cash discount, and a checkout state machine that produces an
//! immutable order snapshot for external receipt and messaging channels.
//!
//! The crate ends at the snapshot and payload contracts: rendering, document
//! drawing and message transport belong to the embedding layer.

pub mod business;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod export;
pub mod fixtures;
pub mod order;
pub mod prelude;
pub mod pricing;
pub mod storage;
