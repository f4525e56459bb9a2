//! Checkout
//!
//! The checkout state machine: it drives the storefront through browsing,
//! cart review, the checkout form and confirmation, validates customer
//! input, and on submission assembles the immutable order snapshot and
//! clears the cart. All transitions are user-driven.

use std::{fmt, sync::LazyLock};

use jiff::Timestamp;
use regex::Regex;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{
    business::BusinessInfo,
    cart::{CartError, CartStore},
    order::{CustomerInfo, OrderError, OrderSequence, OrderSnapshot},
    pricing::{self, PaymentMethod, PricingError},
    storage::KeyValueStore,
};

/// Maximum length of a sanitized customer field, in characters.
const MAX_FIELD_LEN: usize = 100;

#[expect(clippy::expect_used, reason = "the pattern is a compile-time literal")]
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

#[expect(clippy::expect_used, reason = "the pattern is a compile-time literal")]
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").expect("phone pattern compiles"));

/// The stage the storefront UI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Browsing the product grid.
    #[default]
    Browsing,

    /// Reviewing cart contents.
    CartReview,

    /// Filling in the checkout form.
    CheckoutForm,

    /// Order submitted; showing the confirmation view.
    Confirmation,
}

/// A customer form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Customer name.
    Name,
    /// Customer email address.
    Email,
    /// Customer phone number.
    Phone,
    /// Customer address.
    Address,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
        };

        f.write_str(name)
    }
}

/// A single field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field is empty after sanitization.
    #[error("{0} is required")]
    Missing(Field),

    /// The email address does not match `local@domain.tld`.
    #[error("email address is not valid")]
    InvalidEmail,

    /// The phone number is too short or contains invalid characters.
    #[error("phone number is not valid")]
    InvalidPhone,
}

/// Errors raised by checkout transitions and submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart is empty; checkout cannot proceed.
    #[error("cart is empty")]
    EmptyCart,

    /// Submission attempted outside the checkout form.
    #[error("submission is only allowed from the checkout form")]
    WrongStage(Stage),

    /// One or more customer fields failed validation.
    #[error("invalid customer details ({} field error(s))", .0.len())]
    Validation(SmallVec<[FieldError; 4]>),

    /// The cart could not be updated or persisted.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// An order number could not be allocated.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Raw customer form input, exactly as typed.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    /// Customer name.
    pub name: String,
    /// Customer email address.
    pub email: String,
    /// Customer phone number.
    pub phone: String,
    /// Customer address.
    pub address: String,
}

/// Strip angle brackets, trim whitespace, and cap the length.
///
/// A basic injection/length guard applied before validation, not a full
/// validator in itself.
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '<' | '>')).collect();

    cleaned.trim().chars().take(MAX_FIELD_LEN).collect()
}

/// Validate sanitized fields, collecting one error per offending field.
fn validate(form: &CustomerForm) -> SmallVec<[FieldError; 4]> {
    let mut errors = SmallVec::new();

    for (value, field) in [
        (&form.name, Field::Name),
        (&form.email, Field::Email),
        (&form.phone, Field::Phone),
        (&form.address, Field::Address),
    ] {
        if value.is_empty() {
            errors.push(FieldError::Missing(field));
        }
    }

    if !form.email.is_empty() && !EMAIL_PATTERN.is_match(&form.email) {
        errors.push(FieldError::InvalidEmail);
    }

    if !form.phone.is_empty() && !PHONE_PATTERN.is_match(&form.phone) {
        errors.push(FieldError::InvalidPhone);
    }

    errors
}

/// The checkout state machine.
///
/// Owns only the stage and the orthogonal payment-method selection; the cart
/// store and order sequence are passed in by the caller, so no state hides
/// at module scope.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    stage: Stage,
    payment_method: PaymentMethod,
}

impl CheckoutFlow {
    /// Start a flow at [`Stage::Browsing`] with the default payment method.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The currently selected payment method.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Open the cart review view. Allowed from any stage; never resets cart
    /// or customer data.
    pub fn open_cart(&mut self) {
        self.stage = Stage::CartReview;
    }

    /// Proceed from cart review to the checkout form.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart holds no items; the
    /// stage is left unchanged.
    pub fn proceed_to_checkout<S: KeyValueStore>(
        &mut self,
        cart: &CartStore<S>,
    ) -> Result<(), CheckoutError> {
        if cart.total_quantity() == 0 {
            return Err(CheckoutError::EmptyCart);
        }

        self.stage = Stage::CheckoutForm;

        Ok(())
    }

    /// Select the payment method. Callers re-quote totals afterwards, since
    /// pricing is recomputed from scratch on every render.
    pub fn select_payment(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Return to browsing from the confirmation view.
    pub fn continue_shopping(&mut self) {
        self.stage = Stage::Browsing;
    }

    /// Submit the order.
    ///
    /// Sanitizes and validates the form, allocates an order number, quotes
    /// the cart, assembles the immutable snapshot, clears the cart and moves
    /// to [`Stage::Confirmation`]. Export handoff happens after this call
    /// and never affects the committed transition.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::WrongStage`] outside the checkout form,
    /// [`CheckoutError::Validation`] with per-field errors (stage, cart and
    /// order counter untouched), [`CheckoutError::EmptyCart`] if the cart
    /// emptied while on the form, or an error from order-number allocation,
    /// pricing or cart persistence.
    pub fn submit<S: KeyValueStore, T: KeyValueStore>(
        &mut self,
        cart: &mut CartStore<S>,
        orders: &mut OrderSequence<T>,
        business: &BusinessInfo,
        form: &CustomerForm,
    ) -> Result<OrderSnapshot, CheckoutError> {
        if self.stage != Stage::CheckoutForm {
            return Err(CheckoutError::WrongStage(self.stage));
        }

        let sanitized = CustomerForm {
            name: sanitize(&form.name),
            email: sanitize(&form.email),
            phone: sanitize(&form.phone),
            address: sanitize(&form.address),
        };

        let errors = validate(&sanitized);
        if !errors.is_empty() {
            return Err(CheckoutError::Validation(errors));
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order_number = orders.next()?;

        let pricing = pricing::quote(
            cart.lines(),
            self.payment_method,
            business.cash_discount(),
            cart.currency(),
        )?;

        let customer = CustomerInfo::new(
            sanitized.name,
            sanitized.email,
            sanitized.phone,
            sanitized.address,
        );

        let snapshot = OrderSnapshot::new(
            order_number,
            Timestamp::now(),
            customer,
            cart.lines().to_vec(),
            self.payment_method,
            pricing,
        );

        cart.clear()?;
        self.stage = Stage::Confirmation;

        info!(order = %snapshot.order_number(), total = %snapshot.pricing().total(), "order submitted");

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        catalog::{Catalog, ProductId, VariantId},
        fixtures::demo_catalog,
        storage::MemoryStore,
    };

    use super::*;

    fn valid_form() -> CustomerForm {
        CustomerForm {
            name: "Maria Perez".to_owned(),
            email: "maria@example.com".to_owned(),
            phone: "+58 412 555 0199".to_owned(),
            address: "Av. Bolivar 123, Valencia".to_owned(),
        }
    }

    fn cart_with_items(catalog: &Catalog) -> Result<CartStore<MemoryStore>, CartError> {
        let mut cart = CartStore::open(MemoryStore::new(), USD);
        cart.add_item(catalog, ProductId::new(1), &VariantId::new("win10"))?;
        cart.add_item(catalog, ProductId::new(1), &VariantId::new("win10"))?;

        Ok(cart)
    }

    #[test]
    fn sanitize_strips_angle_brackets_and_trims() {
        assert_eq!(sanitize("  <script>Maria</script>  "), "scriptMaria/script");
    }

    #[test]
    fn sanitize_caps_length() {
        let long = "x".repeat(500);

        assert_eq!(sanitize(&long).chars().count(), MAX_FIELD_LEN);
    }

    #[test]
    fn empty_cart_guard_blocks_checkout() -> TestResult {
        let cart = CartStore::open(MemoryStore::new(), USD);
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        let result = flow.proceed_to_checkout(&cart);

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(flow.stage(), Stage::CartReview);

        Ok(())
    }

    #[test]
    fn non_empty_cart_reaches_checkout_form() -> TestResult {
        let catalog = demo_catalog()?;
        let cart = cart_with_items(&catalog)?;
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;

        assert_eq!(flow.stage(), Stage::CheckoutForm);

        Ok(())
    }

    #[test]
    fn submit_outside_checkout_form_is_rejected() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = cart_with_items(&catalog)?;
        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        let result = flow.submit(&mut cart, &mut orders, &business, &valid_form());

        assert!(matches!(
            result,
            Err(CheckoutError::WrongStage(Stage::Browsing))
        ));

        Ok(())
    }

    #[test]
    fn malformed_email_fails_validation_without_side_effects() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = cart_with_items(&catalog)?;
        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;

        let mut form = valid_form();
        form.email = "not-an-email".to_owned();

        let result = flow.submit(&mut cart, &mut orders, &business, &form);

        match result {
            Err(CheckoutError::Validation(errors)) => {
                assert_eq!(errors.as_slice(), &[FieldError::InvalidEmail]);
            }
            other => panic!("expected Validation error, got {other:?}"),
        }

        // Stage, cart and counter are untouched: the next submission succeeds
        // and gets the first order number.
        assert_eq!(flow.stage(), Stage::CheckoutForm);
        assert_eq!(cart.total_quantity(), 2);

        let snapshot = flow.submit(&mut cart, &mut orders, &business, &valid_form())?;

        assert_eq!(snapshot.order_number().as_str(), "JJRB-000001");

        Ok(())
    }

    #[test]
    fn missing_fields_are_all_reported() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = cart_with_items(&catalog)?;
        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;

        let result = flow.submit(&mut cart, &mut orders, &business, &CustomerForm::default());

        match result {
            Err(CheckoutError::Validation(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.contains(&FieldError::Missing(Field::Name)));
                assert!(errors.contains(&FieldError::Missing(Field::Address)));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn short_phone_fails_validation() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = cart_with_items(&catalog)?;
        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;

        let mut form = valid_form();
        form.phone = "12345".to_owned();

        let result = flow.submit(&mut cart, &mut orders, &business, &form);

        match result {
            Err(CheckoutError::Validation(errors)) => {
                assert_eq!(errors.as_slice(), &[FieldError::InvalidPhone]);
            }
            other => panic!("expected Validation error, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn successful_submission_commits_and_confirms() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = CartStore::open(MemoryStore::new(), USD);
        cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win7"))?;
        cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win7"))?;

        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;
        flow.select_payment(PaymentMethod::Cash);

        let snapshot = flow.submit(&mut cart, &mut orders, &business, &valid_form())?;

        assert_eq!(flow.stage(), Stage::Confirmation);
        assert!(cart.is_empty());
        assert_eq!(snapshot.pricing().subtotal(), Money::from_minor(20_00, USD));
        assert_eq!(snapshot.pricing().total(), Money::from_minor(14_00, USD));
        assert_eq!(snapshot.payment_method(), PaymentMethod::Cash);
        assert_eq!(snapshot.customer().name(), "Maria Perez");

        flow.continue_shopping();

        assert_eq!(flow.stage(), Stage::Browsing);

        Ok(())
    }

    #[test]
    fn snapshot_is_immune_to_later_cart_mutation() -> TestResult {
        let catalog = demo_catalog()?;
        let mut cart = cart_with_items(&catalog)?;
        let mut orders = OrderSequence::open(MemoryStore::new(), "JJRB");
        let business = BusinessInfo::default();
        let mut flow = CheckoutFlow::new();

        flow.open_cart();
        flow.proceed_to_checkout(&cart)?;

        let snapshot = flow.submit(&mut cart, &mut orders, &business, &valid_form())?;
        let lines_before = snapshot.lines().to_vec();

        cart.add_item(&catalog, ProductId::new(2), &VariantId::new("office2021"))?;

        assert_eq!(snapshot.lines(), lines_before.as_slice());

        Ok(())
    }
}
