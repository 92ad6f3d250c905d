// storefront-core/src/models/coupon.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::warn;

use crate::money;

/// A flat-amount discount code. Created and administered externally; this
/// crate only reads, validates and (best-effort) bumps the usage counter.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Coupon {
  pub id: i64,
  /// Stored and matched uppercase.
  pub code: String,
  /// The `discount` column has an ambiguous numeric type in the hosted
  /// schema, so it is fetched as text and coerced through the strict
  /// parser. See [`Coupon::discount_cents`].
  pub discount_raw: Option<String>,
  pub is_active: bool,
  pub expires_at: Option<DateTime<Utc>>,
  pub usage_limit: Option<i32>,
  pub usage_count: Option<i32>,
}

impl Coupon {
  /// Flat discount in cents. Malformed stored values coerce to zero and
  /// are flagged, never trusted.
  pub fn discount_cents(&self) -> i64 {
    match self.discount_raw.as_deref() {
      None => 0,
      Some(raw) => match money::parse_cents(raw) {
        Some(cents) => cents,
        None => {
          warn!(coupon_id = self.id, code = %self.code, raw, "Malformed coupon discount value; treating as zero");
          0
        }
      },
    }
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    matches!(self.expires_at, Some(expiry) if now > expiry)
  }

  pub fn is_exhausted(&self) -> bool {
    match self.usage_limit {
      Some(limit) => self.usage_count.unwrap_or(0) >= limit,
      None => false,
    }
  }
}
