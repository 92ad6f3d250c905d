// storefront-core/src/services/pricing.rs

//! Pricing engine. Pure: a function of the current lines, the
//! server-resolved shipping cost and an optional flat discount. Callers
//! recompute after every line mutation; nothing here caches or mutates.

use serde::Serialize;

use crate::models::OrderLineDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
  pub subtotal_cents: i64,
  pub shipping_cents: i64,
  pub discount_cents: i64,
  pub total_cents: i64,
}

/// Compute subtotal, shipping, discount and clamped total.
///
/// Shipping uses the server-resolved `send_price_cents` when it is priced
/// (> 0), else `fallback_shipping_cents`. The discount may never drive the
/// total negative.
pub fn compute_totals(
  lines: &[OrderLineDetail],
  send_price_cents: Option<i64>,
  fallback_shipping_cents: i64,
  discount_cents: i64,
) -> OrderTotals {
  let subtotal_cents: i64 = lines.iter().map(OrderLineDetail::line_total_cents).sum();

  let shipping_cents = match send_price_cents {
    Some(cents) if cents > 0 => cents,
    _ => fallback_shipping_cents,
  };

  let discount_cents = discount_cents.max(0);
  let total_cents = (subtotal_cents + shipping_cents - discount_cents).max(0);

  OrderTotals {
    subtotal_cents,
    shipping_cents,
    discount_cents,
    total_cents,
  }
}
