// storefront-core/src/models/order_line.rs

use serde::Serialize;
use sqlx::FromRow;

/// One product-quantity pairing within an order (`item_order` row).
///
/// Invariants enforced by the line editor: `quantity > 0` (a line reduced
/// to zero is deleted, never stored) and at most one line per
/// `(order_id, product_id)` pair.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
}

/// An order line joined with its product, as returned by the
/// `item_order -> products` select the confirmation screen renders from.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLineDetail {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  pub product_name: String,
  pub product_price_cents: i64,
  pub product_image_url: Option<String>,
}

impl OrderLineDetail {
  pub fn line_total_cents(&self) -> i64 {
    self.product_price_cents * i64::from(self.quantity)
  }
}
