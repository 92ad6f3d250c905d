// storefront-core/src/services/line_editor.rs

//! Line editor: add / set-quantity / remove on an editable order's lines.
//!
//! Every operation queues on the session guard, checks the editability
//! gate, applies exactly one row write at the gateway and then rebuilds
//! the snapshot wholesale. No in-place arithmetic ever happens on a stale
//! line collection.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::{CoreError, Result};
use crate::models::Order;
use crate::services::lifecycle::OrderLifecycle;
use crate::store::OrderStore;

pub struct LineEditor {
  store: Arc<OrderStore>,
}

impl LineEditor {
  pub fn new(store: Arc<OrderStore>) -> Self {
    Self { store }
  }

  /// Add `quantity` of a product to the order.
  ///
  /// If a line for the product already exists its quantity is incremented
  /// with a single update -- at most one line per (order, product) pair.
  #[instrument(skip(self))]
  pub async fn add_line(&self, product_id: i64, quantity: i32) -> Result<Order> {
    if quantity <= 0 {
      return Err(CoreError::Validation("Quantity must be a positive number.".to_string()));
    }

    let _op = self.store.begin_op().await;
    let order = self.store.current_order()?;
    OrderLifecycle::ensure_editable(&order)?;

    match self.store.gateway().find_order_line(order.id, product_id).await? {
      Some(existing) => {
        let new_quantity = existing.quantity.saturating_add(quantity);
        self
          .store
          .gateway()
          .update_order_line_quantity(existing.id, new_quantity)
          .await?;
        info!(order_id = order.id, product_id, new_quantity, "Existing line incremented");
      }
      None => {
        self.store.gateway().insert_order_line(order.id, product_id, quantity).await?;
        info!(order_id = order.id, product_id, quantity, "Line inserted");
      }
    }

    self.store.load_order_with_lines(order.id).await
  }

  /// Set a line's quantity in place. Zero or less deletes the line; a
  /// quantity of zero is never stored.
  #[instrument(skip(self))]
  pub async fn set_quantity(&self, line_id: i64, quantity: i32) -> Result<Order> {
    let _op = self.store.begin_op().await;
    let order = self.store.current_order()?;
    OrderLifecycle::ensure_editable(&order)?;

    if quantity <= 0 {
      self.store.gateway().delete_order_line(line_id).await?;
      info!(order_id = order.id, line_id, "Line removed (quantity reached zero)");
    } else {
      self.store.gateway().update_order_line_quantity(line_id, quantity).await?;
      info!(order_id = order.id, line_id, quantity, "Line quantity updated");
    }

    self.store.load_order_with_lines(order.id).await
  }

  /// Remove a line outright.
  #[instrument(skip(self))]
  pub async fn remove_line(&self, line_id: i64) -> Result<Order> {
    let _op = self.store.begin_op().await;
    let order = self.store.current_order()?;
    OrderLifecycle::ensure_editable(&order)?;

    self.store.gateway().delete_order_line(line_id).await?;
    info!(order_id = order.id, line_id, "Line removed");

    self.store.load_order_with_lines(order.id).await
  }
}
