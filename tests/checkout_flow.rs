//! End-to-end storefront scenarios

use rusty_money::{Money, iso::USD};
use testresult::TestResult;
use vitrina::{
    business::BusinessInfo,
    cart::CartStore,
    catalog::{ProductId, VariantId},
    checkout::{CheckoutError, CheckoutFlow, CustomerForm, Stage},
    export::{MessageHandoff, ReceiptData},
    fixtures::demo_catalog,
    order::OrderSequence,
    pricing::PaymentMethod,
    storage::FileStore,
};

fn valid_form() -> CustomerForm {
    CustomerForm {
        name: "Maria Perez".to_owned(),
        email: "maria@example.com".to_owned(),
        phone: "+58 412 555 0199".to_owned(),
        address: "Av. Bolivar 123, Valencia".to_owned(),
    }
}

#[test]
fn cash_checkout_end_to_end() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("storefront.json");

    let catalog = demo_catalog()?;
    let business = BusinessInfo::default();
    let mut cart = CartStore::open(FileStore::open(&store_path), USD);
    let mut orders = OrderSequence::open(FileStore::open(&store_path), business.order_prefix());
    let mut flow = CheckoutFlow::new();

    // Two adds of the same $10 variant merge into one line of quantity 2.
    cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win7"))?;
    cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win7"))?;

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total_quantity(), 2);

    flow.open_cart();
    flow.proceed_to_checkout(&cart)?;
    flow.select_payment(PaymentMethod::Cash);

    let snapshot = flow.submit(&mut cart, &mut orders, &business, &valid_form())?;

    assert_eq!(flow.stage(), Stage::Confirmation);
    assert!(cart.is_empty());
    assert_eq!(snapshot.pricing().subtotal(), Money::from_minor(20_00, USD));
    assert_eq!(snapshot.pricing().discount(), Money::from_minor(6_00, USD));
    assert_eq!(snapshot.pricing().total(), Money::from_minor(14_00, USD));
    assert_eq!(snapshot.order_number().as_str(), "JJRB-000001");

    // Both export payloads carry the order number verbatim.
    let receipt = ReceiptData::from_snapshot(&snapshot, &business)?;
    let link = MessageHandoff::new(&business).deep_link(&snapshot);

    assert_eq!(receipt.order_number, "JJRB-000001");
    assert_eq!(receipt.total, Money::from_minor(14_00, USD));
    assert!(link.starts_with("https://wa.me/584122891366?text="));

    Ok(())
}

#[test]
fn cart_round_trips_through_reopened_store() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("storefront.json");
    let catalog = demo_catalog()?;

    {
        let mut cart = CartStore::open(FileStore::open(&store_path), USD);
        cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win11"))?;
        cart.add_item(&catalog, ProductId::new(2), &VariantId::new("office2019"))?;
        cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win11"))?;
    }

    let reopened = CartStore::open(FileStore::open(&store_path), USD);

    let labels: Vec<&str> = reopened
        .lines()
        .iter()
        .map(|line| line.variant_label())
        .collect();

    // Insertion order and merged quantities both survive the reload.
    assert_eq!(labels, vec!["Windows 11 Pro", "Office 2019"]);
    assert_eq!(
        reopened.lines().first().map(vitrina::cart::CartLine::quantity),
        Some(2)
    );
    assert_eq!(reopened.total_quantity(), 3);

    Ok(())
}

#[test]
fn order_numbers_stay_monotonic_across_sessions() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("storefront.json");

    let first = {
        let mut orders = OrderSequence::open(FileStore::open(&store_path), "JJRB");
        orders.next()?
    };

    let mut orders = OrderSequence::open(FileStore::open(&store_path), "JJRB");
    let second = orders.next()?;

    assert_eq!(first.as_str(), "JJRB-000001");
    assert_eq!(second.as_str(), "JJRB-000002");

    Ok(())
}

#[test]
fn validation_failure_leaves_the_whole_session_intact() -> TestResult {
    let dir = tempfile::tempdir()?;
    let store_path = dir.path().join("storefront.json");

    let catalog = demo_catalog()?;
    let business = BusinessInfo::default();
    let mut cart = CartStore::open(FileStore::open(&store_path), USD);
    let mut orders = OrderSequence::open(FileStore::open(&store_path), business.order_prefix());
    let mut flow = CheckoutFlow::new();

    cart.add_item(&catalog, ProductId::new(2), &VariantId::new("office2021"))?;
    flow.open_cart();
    flow.proceed_to_checkout(&cart)?;

    let mut form = valid_form();
    form.email = "pedro at example dot com".to_owned();

    let result = flow.submit(&mut cart, &mut orders, &business, &form);

    assert!(matches!(result, Err(CheckoutError::Validation(_))));
    assert_eq!(flow.stage(), Stage::CheckoutForm);
    assert_eq!(cart.total_quantity(), 1);

    // No order number was consumed by the failed attempt.
    let snapshot = flow.submit(&mut cart, &mut orders, &business, &valid_form())?;

    assert_eq!(snapshot.order_number().as_str(), "JJRB-000001");

    Ok(())
}

#[test]
fn payment_method_switch_reprices_the_same_cart() -> TestResult {
    let catalog = demo_catalog()?;
    let business = BusinessInfo::default();
    let mut cart = CartStore::open(vitrina::storage::MemoryStore::new(), USD);
    let mut flow = CheckoutFlow::new();

    cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win10"))?;

    flow.select_payment(PaymentMethod::Cash);
    let cash = vitrina::pricing::quote(
        cart.lines(),
        flow.payment_method(),
        business.cash_discount(),
        cart.currency(),
    )?;

    flow.select_payment(PaymentMethod::PayPal);
    let paypal = vitrina::pricing::quote(
        cart.lines(),
        flow.payment_method(),
        business.cash_discount(),
        cart.currency(),
    )?;

    assert_eq!(cash.total(), Money::from_minor(10_50, USD));
    assert_eq!(paypal.total(), Money::from_minor(15_00, USD));

    Ok(())
}
