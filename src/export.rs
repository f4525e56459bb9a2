//! Order export
//!
//! Consumers of the order snapshot after checkout commits: the receipt
//! document payload and the messaging deep-link handoff, plus a best-effort
//! dispatcher over external export channels. Export failures are reported but
//! never block or revert the committed checkout.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::tz::TimeZone;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{
    business::BusinessInfo,
    order::{CustomerInfo, OrderSnapshot},
    pricing::{self, PricingError},
};

/// Errors raised by export channels.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A channel failed to deliver; the committed order is unaffected.
    #[error("{channel} channel failed: {reason}")]
    Channel {
        /// Name of the failing channel.
        channel: &'static str,
        /// Human-readable failure description.
        reason: String,
    },

    /// A payload could not be derived from the snapshot.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// An external export channel consuming a finished order snapshot.
///
/// Implementations must not mutate the snapshot, and their failures must not
/// affect other channels or the already-committed checkout.
pub trait OrderExporter: fmt::Debug {
    /// Short channel name for reporting (e.g. `receipt`, `message`).
    fn channel(&self) -> &'static str;

    /// Deliver the order through this channel.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] describing the delivery failure.
    fn export(&mut self, snapshot: &OrderSnapshot) -> Result<(), ExportError>;
}

/// Per-channel result of a dispatch.
#[derive(Debug)]
pub struct ChannelOutcome {
    /// The channel that ran.
    pub channel: &'static str,
    /// What it reported.
    pub result: Result<(), ExportError>,
}

/// Hand the snapshot to every exporter, best-effort.
///
/// All channels run regardless of earlier failures; each failure is logged
/// and collected. Nothing is rolled back.
pub fn dispatch(
    snapshot: &OrderSnapshot,
    exporters: &mut [&mut dyn OrderExporter],
) -> Vec<ChannelOutcome> {
    exporters
        .iter_mut()
        .map(|exporter| {
            let channel = exporter.channel();
            let result = exporter.export(snapshot);

            if let Err(err) = &result {
                warn!(channel, %err, "order export failed");
            }

            ChannelOutcome { channel, result }
        })
        .collect()
}

/// Time-of-day greeting used in customer-facing output.
#[must_use]
pub fn greeting_for_hour(hour: i8) -> &'static str {
    match hour {
        5..12 => "Buenos días",
        12..18 => "Buenas tardes",
        _ => "Buenas noches",
    }
}

/// Builder for the messaging handoff: a structured order message and the
/// URL-encoded deep link an embedder opens.
#[derive(Debug, Clone, Copy)]
pub struct MessageHandoff<'a> {
    business: &'a BusinessInfo,
}

impl<'a> MessageHandoff<'a> {
    /// Create a handoff builder for the given business.
    #[must_use]
    pub fn new(business: &'a BusinessInfo) -> Self {
        Self { business }
    }

    /// The plain-text order message, before URL encoding.
    #[must_use]
    pub fn message_text(&self, snapshot: &OrderSnapshot) -> String {
        let placed = snapshot.placed_at().to_zoned(TimeZone::system());
        let greeting = greeting_for_hour(placed.hour());
        let customer = snapshot.customer();
        let method = snapshot
            .payment_method()
            .label(self.business.cash_discount());

        let mut text = String::new();

        text.push_str(&format!(
            "📋 *SOLICITUD DE PEDIDO - {}*\n",
            self.business.business_name()
        ));
        text.push_str("────────────────────────────────────\n");
        text.push_str(&format!("{greeting}, estimado cliente.\n"));
        text.push_str(&format!("\n*📦 Pedido N° {}*\n", snapshot.order_number()));
        text.push_str("\n*👤 Datos de Contacto:*\n");
        text.push_str(&format!("• Nombre: {}\n", customer.name()));
        text.push_str(&format!("• Teléfono: {}\n", customer.phone()));
        text.push_str(&format!("• Email: {}\n", customer.email()));
        text.push_str(&format!("• Dirección: {}\n", customer.address()));
        text.push_str("\n*💰 Resumen del Pago:*\n");
        text.push_str(&format!("• Total: {}\n", snapshot.pricing().total()));
        text.push_str(&format!("• Método: {method}\n"));
        text.push_str("\n📎 *Se ha generado un PDF con el recibo completo*\n");
        text.push_str(
            "\nMe comunicaré con usted en los próximos minutos para coordinar el agendamiento.\n",
        );
        text.push_str("\n⌛ *Tiempo estimado de respuesta: 15-30 minutos*\n");
        text.push_str("\n¡Agradecemos su preferencia! 🙏");

        text
    }

    /// The messaging deep link with the URL-encoded message as its payload.
    #[must_use]
    pub fn deep_link(&self, snapshot: &OrderSnapshot) -> String {
        let text = self.message_text(snapshot);
        let encoded = utf8_percent_encode(&text, NON_ALPHANUMERIC);

        format!(
            "https://wa.me/{}?text={encoded}",
            self.business.whatsapp_number()
        )
    }
}

/// One row of the receipt document.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    /// Product name.
    pub name: String,
    /// Variant label.
    pub variant: String,
    /// Units ordered.
    pub quantity: u32,
    /// Price of one unit.
    pub unit_price: Money<'static, Currency>,
    /// Unit price times quantity.
    pub line_total: Money<'static, Currency>,
}

/// Denormalized payload for the external receipt-document renderer.
///
/// Carries everything a renderer needs; the document's visual layout is not
/// this crate's concern.
#[derive(Debug, Clone)]
pub struct ReceiptData {
    /// The allocated order number, verbatim.
    pub order_number: String,
    /// Submission date, `dd/mm/yyyy`.
    pub date: String,
    /// Submission time, `HH:MM`.
    pub time: String,
    /// Customer details.
    pub customer: CustomerInfo,
    /// One row per ordered line.
    pub lines: Vec<ReceiptLine>,
    /// Sum over all lines before discount.
    pub subtotal: Money<'static, Currency>,
    /// Discount deducted; zero unless paying cash.
    pub discount: Money<'static, Currency>,
    /// Final amount due.
    pub total: Money<'static, Currency>,
    /// Customer-facing payment method label.
    pub payment_method: String,
    /// The discount fraction in force at submission.
    pub discount_rate: Percentage,
    /// Time-of-day greeting for the personal message block.
    pub greeting: &'static str,
    /// Business display name for the document header.
    pub business_name: String,
    /// Business contact phone for the footer.
    pub business_phone: String,
    /// Business contact email for the footer.
    pub business_email: String,
}

impl ReceiptData {
    /// Derive the receipt payload from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] if a line total cannot be computed.
    pub fn from_snapshot(
        snapshot: &OrderSnapshot,
        business: &BusinessInfo,
    ) -> Result<Self, ExportError> {
        let placed = snapshot.placed_at().to_zoned(TimeZone::system());

        let lines = snapshot
            .lines()
            .iter()
            .map(|line| {
                Ok(ReceiptLine {
                    name: line.product_name().to_owned(),
                    variant: line.variant_label().to_owned(),
                    quantity: line.quantity(),
                    unit_price: *line.unit_price(),
                    line_total: pricing::line_total(line)?,
                })
            })
            .collect::<Result<Vec<_>, PricingError>>()?;

        Ok(Self {
            order_number: snapshot.order_number().to_string(),
            date: placed.strftime("%d/%m/%Y").to_string(),
            time: placed.strftime("%H:%M").to_string(),
            customer: snapshot.customer().clone(),
            lines,
            subtotal: snapshot.pricing().subtotal(),
            discount: snapshot.pricing().discount(),
            total: snapshot.pricing().total(),
            payment_method: snapshot
                .payment_method()
                .label(business.cash_discount()),
            discount_rate: business.cash_discount(),
            greeting: greeting_for_hour(placed.hour()),
            business_name: business.business_name().to_owned(),
            business_phone: business.whatsapp_number().to_owned(),
            business_email: business.email().to_owned(),
        })
    }
}
