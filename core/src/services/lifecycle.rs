// storefront-core/src/services/lifecycle.rs

//! Order lifecycle manager: owns the canonical status state machine and
//! serializes transition requests against the Persistence Gateway.
//!
//! `INIT -> PAYED -> IN_PROGRESS -> READY -> ON_THE_WAY -> DELIVERED`.
//! Forward moves may skip states; regressions are rejected. Paid orders
//! are immutable except for status progression and the fields explicitly
//! writable at payment time.

use rand::Rng;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::{CoreError, Result};
use crate::gateway::OrderPatch;
use crate::models::{Order, OrderStatus, OrderType};
use crate::phone;
use crate::store::OrderStore;

const CONFIRMATION_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CONFIRMATION_CODE_LEN: usize = 6;

/// Fields the checkout flow may write while completing payment.
#[derive(Debug, Clone, Default)]
pub struct PaymentDetails {
  pub order_type: Option<OrderType>,
  /// Contact phone, raw; normalized before the (one-time) write.
  pub user_phone: Option<String>,
}

pub struct OrderLifecycle {
  store: Arc<OrderStore>,
  phone_country_code: String,
}

impl OrderLifecycle {
  pub fn new(store: Arc<OrderStore>, phone_country_code: impl Into<String>) -> Self {
    Self {
      store,
      phone_country_code: phone_country_code.into(),
    }
  }

  pub fn from_config(store: Arc<OrderStore>, config: &AppConfig) -> Self {
    Self::new(store, config.default_phone_country_code.clone())
  }

  /// Orders accept line edits only while still in `Init`.
  pub fn is_editable(order: &Order) -> bool {
    order.status == OrderStatus::Init
  }

  pub(crate) fn ensure_editable(order: &Order) -> Result<()> {
    if Self::is_editable(order) {
      Ok(())
    } else {
      Err(CoreError::OrderLocked {
        order_id: order.id,
        status: order.status,
      })
    }
  }

  /// Move the session's order to `target`, persisting through one
  /// conditional update.
  ///
  /// Requesting the state the order is already in is an idempotent no-op
  /// success. Entering `Payed` generates the confirmation code exactly
  /// once and accepts the payment-time-writable fields in `details`.
  #[instrument(skip_all, fields(target_status = %target))]
  pub async fn transition(&self, target: OrderStatus, details: Option<PaymentDetails>) -> Result<Order> {
    let _op = self.store.begin_op().await;
    let current = self.store.current_order()?;

    if current.status == target {
      info!(order_id = current.id, status = %target, "Transition is a no-op; order already there");
      return Ok(current);
    }
    if target.rank() < current.status.rank() {
      return Err(CoreError::InvalidTransition {
        from: current.status,
        to: target,
      });
    }
    if details.is_some() && target != OrderStatus::Payed {
      return Err(CoreError::Validation(
        "payment details are only accepted on the transition into PAYED".to_string(),
      ));
    }

    let mut patch = OrderPatch {
      status: Some(target),
      ..OrderPatch::default()
    };

    if target == OrderStatus::Payed {
      if current.confirmation_code.is_none() {
        patch.confirmation_code = Some(generate_confirmation_code());
      }
      self.apply_payment_details(&current, details.unwrap_or_default(), &mut patch)?;
    }

    // One atomic conditional write: the status we read is the precondition.
    match self
      .store
      .gateway()
      .update_order_where_status(current.id, current.status, patch)
      .await?
    {
      Some(updated) => {
        info!(order_id = updated.id, from = %current.status, to = %updated.status, "Order transitioned");
        self.store.set_order(updated.clone());
        Ok(updated)
      }
      None => {
        // Someone else advanced the order between our read and the write.
        let fresh = self.store.gateway().get_order(current.id).await?;
        self.store.set_order(fresh.clone());
        if fresh.status == target {
          info!(order_id = fresh.id, status = %target, "Order already transitioned elsewhere; treating as success");
          Ok(fresh)
        } else {
          warn!(order_id = fresh.id, found = %fresh.status, requested = %target, "Transition precondition no longer holds");
          Err(CoreError::InvalidTransition {
            from: fresh.status,
            to: target,
          })
        }
      }
    }
  }

  fn apply_payment_details(&self, current: &Order, details: PaymentDetails, patch: &mut OrderPatch) -> Result<()> {
    if let Some(order_type) = details.order_type {
      patch.order_type = Some(order_type);
    }

    if let Some(raw_phone) = details.user_phone.as_deref() {
      let normalized = phone::normalize(raw_phone, &self.phone_country_code)
        .ok_or_else(|| CoreError::Validation(format!("invalid contact phone '{}'", raw_phone)))?;
      match current.user_phone.as_deref() {
        None => patch.user_phone = Some(normalized),
        Some(existing) if existing == normalized => {} // already canonical, nothing to write
        Some(_) => {
          return Err(CoreError::Validation(
            "contact phone is already set and cannot be changed".to_string(),
          ));
        }
      }
    }

    let effective_type = patch.order_type.or(current.order_type);
    let has_phone = patch.user_phone.is_some() || current.user_phone.is_some();
    if let Some(order_type) = effective_type {
      if order_type.requires_contact_phone() && !has_phone {
        return Err(CoreError::Validation(format!(
          "delivery method {} requires a contact phone before payment",
          order_type
        )));
      }
    }

    Ok(())
  }
}

fn generate_confirmation_code() -> String {
  let mut rng = rand::thread_rng();
  (0..CONFIRMATION_CODE_LEN)
    .map(|_| {
      let idx = rng.gen_range(0..CONFIRMATION_CODE_CHARS.len());
      CONFIRMATION_CODE_CHARS[idx] as char
    })
    .collect()
}
