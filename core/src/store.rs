// storefront-core/src/store.rs

//! Session-scoped mirror of one order and its lines.
//!
//! The storefront used to keep this in a process-wide store; here it is an
//! explicit, injectable container so every session (and every test) gets
//! its own instance. The mirror is rebuilt wholesale from the gateway on
//! each load -- no fine-grained reconciliation, so partial-state divergence
//! cannot occur. On any gateway failure the snapshot keeps its
//! last-known-good value.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::AppConfig;
use crate::errors::{CoreError, Result};
use crate::gateway::OrderGateway;
use crate::models::{Order, OrderLineDetail};
use crate::services::pricing::{self, OrderTotals};

#[derive(Debug, Default, Clone)]
struct Snapshot {
  order: Option<Order>,
  lines: Vec<OrderLineDetail>,
}

pub struct OrderStore {
  gateway: Arc<dyn OrderGateway>,
  fallback_shipping_cents: i64,
  snapshot: RwLock<Snapshot>,
  // Serializes lifecycle transitions and line edits issued against this
  // session: the editability check and the write it guards must never
  // interleave with a second in-flight operation.
  op_guard: tokio::sync::Mutex<()>,
}

impl OrderStore {
  pub fn new(gateway: Arc<dyn OrderGateway>, fallback_shipping_cents: i64) -> Self {
    Self {
      gateway,
      fallback_shipping_cents,
      snapshot: RwLock::new(Snapshot::default()),
      op_guard: tokio::sync::Mutex::new(()),
    }
  }

  pub fn from_config(gateway: Arc<dyn OrderGateway>, config: &AppConfig) -> Self {
    Self::new(gateway, config.default_shipping_cents)
  }

  /// Load just the order row. The line mirror is untouched.
  #[instrument(skip(self))]
  pub async fn load_order(&self, order_id: i64) -> Result<Order> {
    let order = self.gateway.get_order(order_id).await?;
    self.snapshot.write().order = Some(order.clone());
    Ok(order)
  }

  /// Load the order plus its lines joined with their products, replacing
  /// the whole mirror.
  #[instrument(skip(self))]
  pub async fn load_order_with_lines(&self, order_id: i64) -> Result<Order> {
    let (order, lines) = self.gateway.get_order_with_lines(order_id).await?;
    info!(order_id, line_count = lines.len(), "Order snapshot rebuilt");
    let mut snapshot = self.snapshot.write();
    snapshot.order = Some(order.clone());
    snapshot.lines = lines;
    Ok(order)
  }

  /// Rebuild the mirror for the currently loaded order.
  pub async fn refresh(&self) -> Result<Order> {
    let order_id = self.current_order()?.id;
    self.load_order_with_lines(order_id).await
  }

  pub fn order(&self) -> Option<Order> {
    self.snapshot.read().order.clone()
  }

  pub fn lines(&self) -> Vec<OrderLineDetail> {
    self.snapshot.read().lines.clone()
  }

  /// Current totals, recomputed from the live snapshot on every call.
  pub fn totals(&self, discount_cents: i64) -> Result<OrderTotals> {
    let snapshot = self.snapshot.read();
    let order = snapshot.order.as_ref().ok_or(CoreError::NoOrderLoaded)?;
    Ok(pricing::compute_totals(
      &snapshot.lines,
      order.send_price_cents,
      self.fallback_shipping_cents,
      discount_cents,
    ))
  }

  pub fn clear(&self) {
    let mut snapshot = self.snapshot.write();
    snapshot.order = None;
    snapshot.lines.clear();
  }

  pub fn fallback_shipping_cents(&self) -> i64 {
    self.fallback_shipping_cents
  }

  // --- crate-internal plumbing for the services ---

  pub(crate) fn gateway(&self) -> &Arc<dyn OrderGateway> {
    &self.gateway
  }

  /// Queue behind any in-flight operation on this session.
  pub(crate) async fn begin_op(&self) -> tokio::sync::MutexGuard<'_, ()> {
    self.op_guard.lock().await
  }

  pub(crate) fn current_order(&self) -> Result<Order> {
    self.snapshot.read().order.clone().ok_or(CoreError::NoOrderLoaded)
  }

  /// Install a gateway-confirmed order row into the mirror.
  pub(crate) fn set_order(&self, order: Order) {
    self.snapshot.write().order = Some(order);
  }
}
