// storefront-core/src/services/coupons.rs

//! Coupon evaluator: validates a code against activation, expiry and
//! usage-limit rules and binds it to the session's order. Binding is
//! one-way; once `coupon_applied` holds an id it is never cleared or
//! replaced.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::{CouponRejection, Result};
use crate::models::{Coupon, Order};
use crate::store::OrderStore;

/// A successfully validated coupon and the flat discount it grants.
#[derive(Debug, Clone)]
pub struct CouponGrant {
  pub coupon: Coupon,
  pub discount_cents: i64,
}

pub struct CouponEvaluator {
  store: Arc<OrderStore>,
}

impl CouponEvaluator {
  pub fn new(store: Arc<OrderStore>) -> Self {
    Self { store }
  }

  /// Validate a code without touching the order.
  ///
  /// Rule order: active lookup (uppercase exact match), expiry, usage
  /// limit. A malformed stored discount coerces to zero rather than
  /// failing validation.
  #[instrument(skip(self))]
  pub async fn validate(&self, code: &str) -> Result<CouponGrant> {
    let code = code.trim();
    if code.is_empty() {
      return Err(CouponRejection::NotFound.into());
    }

    let coupon = self
      .store
      .gateway()
      .find_coupon_by_code(code)
      .await?
      .ok_or(CouponRejection::NotFound)?;

    if coupon.is_expired(Utc::now()) {
      return Err(CouponRejection::Expired.into());
    }
    if coupon.is_exhausted() {
      return Err(CouponRejection::Exhausted.into());
    }

    let discount_cents = coupon.discount_cents();
    info!(coupon_id = coupon.id, code = %coupon.code, discount_cents, "Coupon validated");
    Ok(CouponGrant { coupon, discount_cents })
  }

  /// Validate `code` and bind it to the session's order.
  ///
  /// Short-circuits with `AlreadyApplied` -- without querying the gateway
  /// -- when the order already carries a coupon id. The usage-count bump
  /// afterwards is best-effort: its failure is logged, never surfaced.
  #[instrument(skip(self))]
  pub async fn apply(&self, code: &str) -> Result<(Order, CouponGrant)> {
    let _op = self.store.begin_op().await;
    let current = self.store.current_order()?;

    if current.coupon_applied.is_some() {
      return Err(CouponRejection::AlreadyApplied.into());
    }

    let grant = self.validate(code).await?;

    let updated = self
      .store
      .gateway()
      .set_order_coupon_if_unset(current.id, grant.coupon.id)
      .await?
      .ok_or(CouponRejection::AlreadyApplied)?;
    self.store.set_order(updated.clone());

    if let Err(e) = self.store.gateway().increment_coupon_usage(&grant.coupon.code).await {
      warn!(code = %grant.coupon.code, error = %e, "Failed to bump coupon usage count; discount stands");
    }

    info!(order_id = updated.id, coupon_id = grant.coupon.id, "Coupon bound to order");
    Ok((updated, grant))
  }

  /// Discount currently granted to the session's order, for pricing.
  /// Orders without a bound coupon get zero.
  pub async fn current_discount_cents(&self) -> Result<i64> {
    let current = self.store.current_order()?;
    let Some(coupon_id) = current.coupon_applied else {
      return Ok(0);
    };
    match self.store.gateway().get_coupon_by_id(coupon_id).await? {
      Some(coupon) => Ok(coupon.discount_cents()),
      None => {
        warn!(order_id = current.id, coupon_id, "Bound coupon no longer resolvable; discount zero");
        Ok(0)
      }
    }
  }
}
