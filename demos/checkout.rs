//! Checkout Example
//!
//! Walks a full storefront session: browse the demo catalog, fill a cart,
//! pay cash, and print the payloads handed to the export channels.

use anyhow::Result;

use rusty_money::iso::USD;
use vitrina::{fixtures::demo_catalog, prelude::*};

#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let catalog = demo_catalog()?;
    let business = BusinessInfo::default();

    let mut cart = CartStore::open(MemoryStore::new(), USD);
    let mut orders = OrderSequence::open(MemoryStore::new(), business.order_prefix());
    let mut flow = CheckoutFlow::new();

    cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win10"))?;
    cart.add_item(&catalog, ProductId::new(1), &VariantId::new("win10"))?;
    cart.add_item(&catalog, ProductId::new(2), &VariantId::new("office2021"))?;

    println!("Cart ({} items):", cart.total_quantity());
    for line in cart.lines() {
        println!(
            "  {} x{} @ {}",
            line.variant_label(),
            line.quantity(),
            line.unit_price()
        );
    }

    flow.open_cart();
    flow.proceed_to_checkout(&cart)?;
    flow.select_payment(PaymentMethod::Cash);

    let form = CustomerForm {
        name: "Maria Perez".to_owned(),
        email: "maria@example.com".to_owned(),
        phone: "+58 412 555 0199".to_owned(),
        address: "Av. Bolivar 123, Valencia".to_owned(),
    };

    let snapshot = flow.submit(&mut cart, &mut orders, &business, &form)?;

    println!("\nOrder {} confirmed", snapshot.order_number());
    println!("  subtotal {}", snapshot.pricing().subtotal());
    println!("  discount {}", snapshot.pricing().discount());
    println!("  total    {}", snapshot.pricing().total());

    let handoff = MessageHandoff::new(&business);
    println!("\n--- WhatsApp message ---");
    println!("{}", handoff.message_text(&snapshot));
    println!("--- deep link ---");
    println!("{}", handoff.deep_link(&snapshot));

    let receipt = ReceiptData::from_snapshot(&snapshot, &business)?;
    println!("\n--- receipt ---");
    println!(
        "{} on {} at {}",
        receipt.order_number, receipt.date, receipt.time
    );
    for line in &receipt.lines {
        println!(
            "  {} ({}) x{} = {}",
            line.name, line.variant, line.quantity, line.line_total
        );
    }
    println!("  pay via {}: {}", receipt.payment_method, receipt.total);

    Ok(())
}
