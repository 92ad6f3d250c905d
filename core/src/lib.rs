// src/lib.rs

//! storefront-core: the headless order engine of a mobile-web storefront.
//!
//! The storefront's catalog -> review -> payment -> tracking flow is a thin
//! presentation layer over a hosted relational store. This crate is the
//! part with real invariants, factored out of the UI:
//!  - The order lifecycle state machine (forward-only statuses, one-time
//!    confirmation code, conditional-update persistence).
//!  - The pricing engine (integer-cents subtotal/shipping/discount math,
//!    total clamped at zero).
//!  - The coupon evaluator (activation, expiry and usage-limit rules;
//!    one-way binding to an order).
//!  - The line editor (de-duplicated, editability-gated line CRUD).
//!  - A session-scoped snapshot store replacing the old process-wide one.
//!
//! Rendering, routing, toasts and auth stay outside; the hosted store is
//! reached only through the [`gateway::OrderGateway`] trait.

// Declare modules according to the planned structure
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod money;
pub mod phone;
pub mod services;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::config::AppConfig;
pub use crate::errors::{CoreError, CouponRejection, Result};

pub use crate::models::{Coupon, Order, OrderLine, OrderLineDetail, OrderStatus, OrderType, Product};

pub use crate::gateway::{GatewayError, OrderGateway, OrderPatch, PgGateway};

pub use crate::store::OrderStore;

pub use crate::services::{
  compute_totals, Catalog, CouponEvaluator, CouponGrant, LineEditor, OrderLifecycle, OrderTotals, PaymentDetails,
};
