// storefront-core/src/errors.rs

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::OrderStatus;

/// Why a coupon code was refused. The variants map one-to-one onto the
/// reason strings the storefront shows next to the coupon input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponRejection {
  #[error("coupon not found")]
  NotFound,

  #[error("coupon expired")]
  Expired,

  #[error("coupon exhausted")]
  Exhausted,

  #[error("a coupon is already applied to this order")]
  AlreadyApplied,
}

#[derive(Debug, Error)]
pub enum CoreError {
  /// Attempted mutation on an order that is no longer in `Init`.
  /// Recoverable: the caller should fall back to a read-only view.
  #[error("Order Locked: order {order_id} is {status} and can no longer be edited")]
  OrderLocked { order_id: i64, status: OrderStatus },

  /// Requested status regression or a target the current state cannot reach.
  #[error("Invalid Transition: {from} -> {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Coupon Rejected: {0}")]
  Coupon(#[from] CouponRejection),

  #[error("Validation Error: {0}")]
  Validation(String),

  /// A session operation was issued before any order was loaded into the store.
  #[error("No order loaded in this session")]
  NoOrderLoaded,

  #[error("Configuration Error: {0}")]
  Config(String),

  /// Any failure from the Persistence Gateway. Never retried by the core;
  /// the session snapshot keeps its last-known-good value.
  #[error("Gateway Error: {source}")]
  Gateway {
    #[from]
    source: GatewayError,
  },
}

impl CoreError {
  /// True when the failure is the editability gate, not a real fault.
  pub fn is_order_locked(&self) -> bool {
    matches!(self, CoreError::OrderLocked { .. })
  }
}

// Define a Result type alias for the crate
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
