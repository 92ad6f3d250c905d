// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

use storefront_core::gateway::{GatewayError, GatewayResult, OrderGateway, OrderPatch};
use storefront_core::models::{Coupon, Order, OrderLine, OrderLineDetail, OrderStatus, Product};
use storefront_core::OrderStore;

// --- In-memory stand-in for the hosted relational store ---

#[derive(Default)]
struct MockState {
  orders: HashMap<i64, Order>,
  lines: HashMap<i64, OrderLine>,
  products: HashMap<i64, Product>,
  coupons: Vec<Coupon>,
  next_line_id: i64,
  // Operations that should fail on their next invocation.
  failing_ops: HashSet<&'static str>,
}

#[derive(Default)]
pub struct MockGateway {
  state: Mutex<MockState>,
  pub coupon_lookups: AtomicUsize,
  pub usage_increments: AtomicUsize,
}

impl MockGateway {
  pub fn new() -> Arc<Self> {
    Arc::new(Self {
      state: Mutex::new(MockState {
        next_line_id: 1,
        ..MockState::default()
      }),
      ..Self::default()
    })
  }

  pub fn seed_order(&self, order: Order) {
    self.state.lock().orders.insert(order.id, order);
  }

  pub fn seed_product(&self, product: Product) {
    self.state.lock().products.insert(product.id, product);
  }

  pub fn seed_line(&self, order_id: i64, product_id: i64, quantity: i32) -> i64 {
    let mut state = self.state.lock();
    let id = state.next_line_id;
    state.next_line_id += 1;
    state.lines.insert(
      id,
      OrderLine {
        id,
        order_id,
        product_id,
        quantity,
      },
    );
    id
  }

  pub fn seed_coupon(&self, coupon: Coupon) {
    self.state.lock().coupons.push(coupon);
  }

  /// Make the next call to `op` fail with an injected gateway error.
  pub fn fail_next(&self, op: &'static str) {
    self.state.lock().failing_ops.insert(op);
  }

  /// Flip an order's status behind the session's back, simulating a
  /// concurrent writer.
  pub fn force_status(&self, order_id: i64, status: OrderStatus) {
    if let Some(order) = self.state.lock().orders.get_mut(&order_id) {
      order.status = status;
    }
  }

  pub fn stored_order(&self, order_id: i64) -> Option<Order> {
    self.state.lock().orders.get(&order_id).cloned()
  }

  pub fn stored_lines(&self, order_id: i64) -> Vec<OrderLine> {
    let mut lines: Vec<OrderLine> = self
      .state
      .lock()
      .lines
      .values()
      .filter(|l| l.order_id == order_id)
      .cloned()
      .collect();
    lines.sort_by_key(|l| l.id);
    lines
  }

  pub fn coupon_usage(&self, code: &str) -> Option<i32> {
    let state = self.state.lock();
    state
      .coupons
      .iter()
      .find(|c| c.code == code.to_uppercase())
      .map(|c| c.usage_count.unwrap_or(0))
  }

  fn check_injected_failure(&self, op: &'static str) -> GatewayResult<()> {
    if self.state.lock().failing_ops.remove(op) {
      Err(GatewayError::Other(anyhow::anyhow!("injected failure for {}", op)))
    } else {
      Ok(())
    }
  }

  fn apply_patch(order: &mut Order, patch: &OrderPatch) {
    if let Some(status) = patch.status {
      order.status = status;
    }
    if let Some(code) = &patch.confirmation_code {
      order.confirmation_code = Some(code.clone());
    }
    if let Some(coupon_id) = patch.coupon_applied {
      order.coupon_applied = Some(coupon_id);
    }
    if let Some(order_type) = patch.order_type {
      order.order_type = Some(order_type);
    }
    if let Some(phone) = &patch.user_phone {
      order.user_phone = Some(phone.clone());
    }
  }
}

#[async_trait]
impl OrderGateway for MockGateway {
  async fn get_order(&self, id: i64) -> GatewayResult<Order> {
    self.check_injected_failure("get_order")?;
    self
      .state
      .lock()
      .orders
      .get(&id)
      .cloned()
      .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))
  }

  async fn get_order_with_lines(&self, id: i64) -> GatewayResult<(Order, Vec<OrderLineDetail>)> {
    self.check_injected_failure("get_order_with_lines")?;
    let state = self.state.lock();
    let order = state
      .orders
      .get(&id)
      .cloned()
      .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))?;
    let mut details: Vec<OrderLineDetail> = state
      .lines
      .values()
      .filter(|l| l.order_id == id)
      .map(|l| {
        let product = state.products.get(&l.product_id).cloned().unwrap_or(Product {
          id: l.product_id,
          name: format!("product {}", l.product_id),
          price_cents: 0,
          image_url: None,
          category: None,
        });
        OrderLineDetail {
          id: l.id,
          order_id: l.order_id,
          product_id: l.product_id,
          quantity: l.quantity,
          product_name: product.name,
          product_price_cents: product.price_cents,
          product_image_url: product.image_url,
        }
      })
      .collect();
    details.sort_by_key(|d| d.id);
    Ok((order, details))
  }

  async fn get_orders_by_user_phone(&self, user_phone: &str) -> GatewayResult<Vec<Order>> {
    let state = self.state.lock();
    Ok(
      state
        .orders
        .values()
        .filter(|o| o.user_phone.as_deref() == Some(user_phone))
        .cloned()
        .collect(),
    )
  }

  async fn get_orders_by_status(&self, status: OrderStatus) -> GatewayResult<Vec<Order>> {
    let state = self.state.lock();
    Ok(state.orders.values().filter(|o| o.status == status).cloned().collect())
  }

  async fn update_order(&self, id: i64, patch: OrderPatch) -> GatewayResult<Order> {
    self.check_injected_failure("update_order")?;
    let mut state = self.state.lock();
    let order = state
      .orders
      .get_mut(&id)
      .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))?;
    Self::apply_patch(order, &patch);
    Ok(order.clone())
  }

  async fn update_order_where_status(
    &self,
    id: i64,
    expected: OrderStatus,
    patch: OrderPatch,
  ) -> GatewayResult<Option<Order>> {
    self.check_injected_failure("update_order_where_status")?;
    let mut state = self.state.lock();
    match state.orders.get_mut(&id) {
      Some(order) if order.status == expected => {
        Self::apply_patch(order, &patch);
        Ok(Some(order.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn set_order_coupon_if_unset(&self, id: i64, coupon_id: i64) -> GatewayResult<Option<Order>> {
    self.check_injected_failure("set_order_coupon_if_unset")?;
    let mut state = self.state.lock();
    match state.orders.get_mut(&id) {
      Some(order) if order.coupon_applied.is_none() => {
        order.coupon_applied = Some(coupon_id);
        Ok(Some(order.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn delete_order(&self, id: i64) -> GatewayResult<()> {
    let mut state = self.state.lock();
    state.orders.remove(&id);
    state.lines.retain(|_, l| l.order_id != id);
    Ok(())
  }

  async fn insert_order_line(&self, order_id: i64, product_id: i64, quantity: i32) -> GatewayResult<OrderLine> {
    self.check_injected_failure("insert_order_line")?;
    let mut state = self.state.lock();
    let id = state.next_line_id;
    state.next_line_id += 1;
    let line = OrderLine {
      id,
      order_id,
      product_id,
      quantity,
    };
    state.lines.insert(id, line.clone());
    Ok(line)
  }

  async fn update_order_line_quantity(&self, line_id: i64, quantity: i32) -> GatewayResult<OrderLine> {
    self.check_injected_failure("update_order_line_quantity")?;
    let mut state = self.state.lock();
    let line = state
      .lines
      .get_mut(&line_id)
      .ok_or_else(|| GatewayError::NotFound(format!("order line {}", line_id)))?;
    line.quantity = quantity;
    Ok(line.clone())
  }

  async fn delete_order_line(&self, line_id: i64) -> GatewayResult<()> {
    self.check_injected_failure("delete_order_line")?;
    self.state.lock().lines.remove(&line_id);
    Ok(())
  }

  async fn find_order_line(&self, order_id: i64, product_id: i64) -> GatewayResult<Option<OrderLine>> {
    self.check_injected_failure("find_order_line")?;
    let state = self.state.lock();
    Ok(
      state
        .lines
        .values()
        .find(|l| l.order_id == order_id && l.product_id == product_id)
        .cloned(),
    )
  }

  async fn get_all_products(&self) -> GatewayResult<Vec<Product>> {
    let state = self.state.lock();
    let mut products: Vec<Product> = state.products.values().cloned().collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn get_products_by_category(&self, category: &str) -> GatewayResult<Vec<Product>> {
    let state = self.state.lock();
    let mut products: Vec<Product> = state
      .products
      .values()
      .filter(|p| p.category.as_deref() == Some(category))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(products)
  }

  async fn find_coupon_by_code(&self, code: &str) -> GatewayResult<Option<Coupon>> {
    self.coupon_lookups.fetch_add(1, Ordering::SeqCst);
    self.check_injected_failure("find_coupon_by_code")?;
    let state = self.state.lock();
    let upper = code.to_uppercase();
    Ok(state.coupons.iter().find(|c| c.code == upper && c.is_active).cloned())
  }

  async fn get_coupon_by_id(&self, id: i64) -> GatewayResult<Option<Coupon>> {
    let state = self.state.lock();
    Ok(state.coupons.iter().find(|c| c.id == id && c.is_active).cloned())
  }

  async fn increment_coupon_usage(&self, code: &str) -> GatewayResult<()> {
    self.usage_increments.fetch_add(1, Ordering::SeqCst);
    self.check_injected_failure("increment_coupon_usage")?;
    let mut state = self.state.lock();
    let upper = code.to_uppercase();
    if let Some(coupon) = state.coupons.iter_mut().find(|c| c.code == upper) {
      coupon.usage_count = Some(coupon.usage_count.unwrap_or(0) + 1);
    }
    Ok(())
  }
}

// --- Fixture helpers ---

pub const FALLBACK_SHIPPING_CENTS: i64 = 250;

pub fn order(id: i64, status: OrderStatus) -> Order {
  Order {
    id,
    status,
    confirmation_code: None,
    coupon_applied: None,
    order_type: None,
    user_phone: None,
    send_price_cents: None,
    created_at: Utc::now(),
  }
}

pub fn product(id: i64, name: &str, price_cents: i64) -> Product {
  Product {
    id,
    name: name.to_string(),
    price_cents,
    image_url: None,
    category: None,
  }
}

pub fn coupon(id: i64, code: &str, discount: &str) -> Coupon {
  Coupon {
    id,
    code: code.to_string(),
    discount_raw: Some(discount.to_string()),
    is_active: true,
    expires_at: None,
    usage_limit: None,
    usage_count: None,
  }
}

/// A store over a fresh mock gateway with one order (and optional lines)
/// already loaded into the session.
pub async fn store_with_order(gateway: &Arc<MockGateway>, seeded: Order) -> Arc<OrderStore> {
  let id = seeded.id;
  gateway.seed_order(seeded);
  let store = Arc::new(OrderStore::new(gateway.clone() as Arc<dyn OrderGateway>, FALLBACK_SHIPPING_CENTS));
  store.load_order_with_lines(id).await.expect("seeded order should load");
  store
}

// --- Tracing Setup ---
pub fn setup_tracing() {
  use once_cell::sync::Lazy;
  static TRACING_INIT: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
      .with_max_level(Level::DEBUG)
      .with_test_writer()
      .try_init()
      .ok();
  });
  Lazy::force(&TRACING_INIT);
}
