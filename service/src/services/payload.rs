// review_service/src/services/payload.rs
use review_gate::{CasePayload, Order, PayloadBuilder};
use serde_json::json;

/// Builds the provider's create-case body: purchase, products, recipient and payment data.
#[derive(Debug, Clone, Default)]
pub struct JsonPayloadBuilder;

impl PayloadBuilder for JsonPayloadBuilder {
  fn build(&self, order: &Order) -> anyhow::Result<CasePayload> {
    if order.currency.trim().is_empty() {
      anyhow::bail!("order '{}' has no currency", order.id);
    }
    if order.grand_total_cents < 0 {
      anyhow::bail!("order '{}' has a negative total", order.id);
    }

    let products: Vec<_> = order
      .lines
      .iter()
      .map(|line| {
        json!({
          "itemId": line.sku,
          "itemName": line.name,
          "itemQuantity": line.quantity,
          "itemPrice": cents_to_amount(line.unit_price_cents),
        })
      })
      .collect();

    Ok(CasePayload(json!({
      "purchase": {
        "orderId": order.id,
        "createdAt": order.created_at.to_rfc3339(),
        "totalPrice": cents_to_amount(order.grand_total_cents),
        "currency": order.currency,
        "browserIpAddress": order.x_forwarded_for,
        "orderChannel": order.origin_store_code.as_deref().unwrap_or(&order.store_code),
        "paymentGateway": order.payment_method,
        "products": products,
      },
      "recipient": {
        "confirmationEmail": order.customer_email,
      },
    })))
  }
}

fn cents_to_amount(cents: i64) -> f64 {
  cents as f64 / 100.0
}
