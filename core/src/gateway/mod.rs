// storefront-core/src/gateway/mod.rs

//! The Persistence Gateway seam. The hosted relational store already
//! provides persistence, querying and auth; this crate depends on it only
//! through the narrow [`OrderGateway`] trait so sessions can be wired to
//! the real Postgres service or to an in-memory double in tests.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Coupon, Order, OrderLine, OrderLineDetail, OrderStatus, OrderType, Product};

pub use postgres::PgGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Row not found: {0}")]
  NotFound(String),

  /// The bounded timeout around a gateway call elapsed. The call may or may
  /// not have reached the store; the session snapshot is left untouched.
  #[error("Gateway call timed out after {timeout_ms}ms: {operation}")]
  Timeout { operation: &'static str, timeout_ms: u64 },

  #[error("Gateway Error: {0}")]
  Other(#[source] anyhow::Error),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Partial update for a single `orders` row. Only `Some` fields are
/// written; every patch is applied as one atomic single-row update.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
  pub status: Option<OrderStatus>,
  pub confirmation_code: Option<String>,
  pub coupon_applied: Option<i64>,
  pub order_type: Option<OrderType>,
  pub user_phone: Option<String>,
}

impl OrderPatch {
  pub fn is_empty(&self) -> bool {
    self.status.is_none()
      && self.confirmation_code.is_none()
      && self.coupon_applied.is_none()
      && self.order_type.is_none()
      && self.user_phone.is_none()
  }
}

/// Row-level CRUD over `orders`, `item_order`, `products` and `coupons`.
///
/// Status- and coupon-affecting writes come in conditional
/// (compare-and-swap) form: the precondition travels with the update so an
/// editability check and the write it guards are one atomic step at the
/// store, not a read-check-then-write sequence.
#[async_trait]
pub trait OrderGateway: Send + Sync {
  // --- orders ---
  async fn get_order(&self, id: i64) -> GatewayResult<Order>;

  /// Order plus its lines joined with their products.
  async fn get_order_with_lines(&self, id: i64) -> GatewayResult<(Order, Vec<OrderLineDetail>)>;

  async fn get_orders_by_user_phone(&self, user_phone: &str) -> GatewayResult<Vec<Order>>;

  async fn get_orders_by_status(&self, status: OrderStatus) -> GatewayResult<Vec<Order>>;

  /// Unconditional single-row update; returns the new row.
  async fn update_order(&self, id: i64, patch: OrderPatch) -> GatewayResult<Order>;

  /// Conditional single-row update: applied only while the row still has
  /// `expected` status. `None` means the precondition no longer held.
  async fn update_order_where_status(
    &self,
    id: i64,
    expected: OrderStatus,
    patch: OrderPatch,
  ) -> GatewayResult<Option<Order>>;

  /// Bind a coupon id, only if none is bound yet. `None` means a coupon
  /// was already applied (or the row vanished).
  async fn set_order_coupon_if_unset(&self, id: i64, coupon_id: i64) -> GatewayResult<Option<Order>>;

  async fn delete_order(&self, id: i64) -> GatewayResult<()>;

  // --- order lines ---
  async fn insert_order_line(&self, order_id: i64, product_id: i64, quantity: i32) -> GatewayResult<OrderLine>;

  async fn update_order_line_quantity(&self, line_id: i64, quantity: i32) -> GatewayResult<OrderLine>;

  async fn delete_order_line(&self, line_id: i64) -> GatewayResult<()>;

  async fn find_order_line(&self, order_id: i64, product_id: i64) -> GatewayResult<Option<OrderLine>>;

  // --- products ---
  async fn get_all_products(&self) -> GatewayResult<Vec<Product>>;

  async fn get_products_by_category(&self, category: &str) -> GatewayResult<Vec<Product>>;

  // --- coupons ---
  /// Exact uppercase match among active coupons.
  async fn find_coupon_by_code(&self, code: &str) -> GatewayResult<Option<Coupon>>;

  async fn get_coupon_by_id(&self, id: i64) -> GatewayResult<Option<Coupon>>;

  /// Best-effort usage bump; callers log failures and move on.
  async fn increment_coupon_usage(&self, code: &str) -> GatewayResult<()>;
}
