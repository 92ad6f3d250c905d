// storefront-core/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;

/// Canonical order lifecycle. Stored as the `STATUS_ORDER` Postgres enum;
/// any human-facing label set (the storefront renders Spanish ones) is a
/// presentation concern and never reaches this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "STATUS_ORDER", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Init,
  Payed,
  InProgress,
  Ready,
  OnTheWay,
  Delivered,
}

impl OrderStatus {
  /// Position in the forward-only lifecycle. Transitions may only move to
  /// an equal (idempotent no-op) or greater rank.
  pub fn rank(self) -> u8 {
    match self {
      OrderStatus::Init => 0,
      OrderStatus::Payed => 1,
      OrderStatus::InProgress => 2,
      OrderStatus::Ready => 3,
      OrderStatus::OnTheWay => 4,
      OrderStatus::Delivered => 5,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Init => "INIT",
      OrderStatus::Payed => "PAYED",
      OrderStatus::InProgress => "IN_PROGRESS",
      OrderStatus::Ready => "READY",
      OrderStatus::OnTheWay => "ON_THE_WAY",
      OrderStatus::Delivered => "DELIVERED",
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Delivery method chosen at payment time. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "ORDER_TYPE", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
  CurbSide,
  OfficeDelivery,
}

impl OrderType {
  /// Methods that deliver to a structured address need a reachable contact
  /// before payment can complete.
  pub fn requires_contact_phone(self) -> bool {
    matches!(self, OrderType::OfficeDelivery)
  }
}

impl fmt::Display for OrderType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      OrderType::CurbSide => "CURB_SIDE",
      OrderType::OfficeDelivery => "OFFICE_DELIVERY",
    };
    f.write_str(s)
  }
}

/// The aggregate root tracked through its delivery lifecycle.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: i64,
  pub status: OrderStatus,
  /// Generated exactly once, at the transition into `Payed`. Immutable after.
  pub confirmation_code: Option<String>,
  /// Id of the bound coupon. One-way: once set it is never cleared or replaced.
  pub coupon_applied: Option<i64>,
  pub order_type: Option<OrderType>,
  /// Canonical `+<country><number>` form; written at most once.
  pub user_phone: Option<String>,
  /// Server-resolved shipping cost. `None` or zero means "not yet priced"
  /// and the session falls back to the configured default.
  pub send_price_cents: Option<i64>,
  pub created_at: DateTime<Utc>,
}

impl Order {
  /// Shipping amount this order should be charged, given the session fallback.
  pub fn shipping_cents(&self, fallback_cents: i64) -> i64 {
    match self.send_price_cents {
      Some(cents) if cents > 0 => cents,
      _ => fallback_cents,
    }
  }
}
