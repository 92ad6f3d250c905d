// storefront-core/src/gateway/postgres.rs

//! Postgres implementation of [`OrderGateway`] (the hosted store is a
//! managed Postgres service). Uses the runtime query API; every call is
//! wrapped in a bounded timeout so a hung connection surfaces as
//! [`GatewayError::Timeout`] instead of stalling the lifecycle manager.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::instrument;

use super::{GatewayError, GatewayResult, OrderGateway, OrderPatch};
use crate::models::{Coupon, Order, OrderLine, OrderLineDetail, OrderStatus, Product};

const ORDER_COLUMNS: &str = "id, status, confirmation_code, coupon_applied, order_type, user_phone, send_price_cents, created_at";

const LINE_DETAIL_SELECT: &str = "SELECT io.id, io.order_id, io.product_id, io.quantity, \
   p.name AS product_name, p.price_cents AS product_price_cents, p.image_url AS product_image_url \
   FROM item_order io JOIN products p ON p.id = io.product_id";

const COUPON_SELECT: &str =
  "SELECT id, code, discount::text AS discount_raw, is_active, expires_at, usage_limit, usage_count FROM coupons";

const PRODUCT_COLUMNS: &str = "id, name, price_cents, image_url, category";

#[derive(Clone)]
pub struct PgGateway {
  pool: PgPool,
  call_timeout: Duration,
}

impl PgGateway {
  pub fn new(pool: PgPool, call_timeout: Duration) -> Self {
    Self { pool, call_timeout }
  }

  pub async fn connect(database_url: &str, call_timeout: Duration) -> GatewayResult<Self> {
    let pool = PgPool::connect(database_url).await?;
    tracing::info!("Successfully connected to the database.");
    Ok(Self::new(pool, call_timeout))
  }

  async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> GatewayResult<T>
  where
    F: Future<Output = GatewayResult<T>>,
  {
    match tokio::time::timeout(self.call_timeout, fut).await {
      Ok(result) => result,
      Err(_) => Err(GatewayError::Timeout {
        operation,
        timeout_ms: self.call_timeout.as_millis() as u64,
      }),
    }
  }

  /// `UPDATE orders SET <patch> WHERE id = $n [AND status = $m] RETURNING *`.
  /// One statement, so the precondition and the write are a single atomic
  /// step at the store.
  fn build_order_update<'a>(id: i64, expected: Option<OrderStatus>, patch: &'a OrderPatch) -> QueryBuilder<'a, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE orders SET ");
    let mut parts = qb.separated(", ");
    if let Some(status) = patch.status {
      parts.push("status = ").push_bind_unseparated(status);
    }
    if let Some(code) = &patch.confirmation_code {
      parts.push("confirmation_code = ").push_bind_unseparated(code);
    }
    if let Some(coupon_id) = patch.coupon_applied {
      parts.push("coupon_applied = ").push_bind_unseparated(coupon_id);
    }
    if let Some(order_type) = patch.order_type {
      parts.push("order_type = ").push_bind_unseparated(order_type);
    }
    if let Some(phone) = &patch.user_phone {
      parts.push("user_phone = ").push_bind_unseparated(phone);
    }
    qb.push(" WHERE id = ").push_bind(id);
    if let Some(expected) = expected {
      qb.push(" AND status = ").push_bind(expected);
    }
    qb.push(" RETURNING ").push(ORDER_COLUMNS);
    qb
  }
}

#[async_trait]
impl OrderGateway for PgGateway {
  #[instrument(skip(self))]
  async fn get_order(&self, id: i64) -> GatewayResult<Order> {
    self
      .bounded("get_order", async {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        sqlx::query_as::<_, Order>(&sql)
          .bind(id)
          .fetch_optional(&self.pool)
          .await?
          .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_order_with_lines(&self, id: i64) -> GatewayResult<(Order, Vec<OrderLineDetail>)> {
    self
      .bounded("get_order_with_lines", async {
        let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
          .bind(id)
          .fetch_optional(&self.pool)
          .await?
          .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))?;

        let sql = format!("{} WHERE io.order_id = $1 ORDER BY io.id", LINE_DETAIL_SELECT);
        let lines = sqlx::query_as::<_, OrderLineDetail>(&sql)
          .bind(id)
          .fetch_all(&self.pool)
          .await?;

        Ok((order, lines))
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_orders_by_user_phone(&self, user_phone: &str) -> GatewayResult<Vec<Order>> {
    self
      .bounded("get_orders_by_user_phone", async {
        let sql = format!(
          "SELECT {} FROM orders WHERE user_phone = $1 ORDER BY created_at DESC",
          ORDER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Order>(&sql).bind(user_phone).fetch_all(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_orders_by_status(&self, status: OrderStatus) -> GatewayResult<Vec<Order>> {
    self
      .bounded("get_orders_by_status", async {
        let sql = format!(
          "SELECT {} FROM orders WHERE status = $1 ORDER BY created_at DESC",
          ORDER_COLUMNS
        );
        Ok(sqlx::query_as::<_, Order>(&sql).bind(status).fetch_all(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self, patch))]
  async fn update_order(&self, id: i64, patch: OrderPatch) -> GatewayResult<Order> {
    self
      .bounded("update_order", async {
        if patch.is_empty() {
          return self.get_order(id).await;
        }
        let mut qb = Self::build_order_update(id, None, &patch);
        qb.build_query_as::<Order>()
          .fetch_optional(&self.pool)
          .await?
          .ok_or_else(|| GatewayError::NotFound(format!("order {}", id)))
      })
      .await
  }

  #[instrument(skip(self, patch))]
  async fn update_order_where_status(
    &self,
    id: i64,
    expected: OrderStatus,
    patch: OrderPatch,
  ) -> GatewayResult<Option<Order>> {
    self
      .bounded("update_order_where_status", async {
        if patch.is_empty() {
          let order = self.get_order(id).await?;
          return Ok(Some(order).filter(|o| o.status == expected));
        }
        let mut qb = Self::build_order_update(id, Some(expected), &patch);
        Ok(qb.build_query_as::<Order>().fetch_optional(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn set_order_coupon_if_unset(&self, id: i64, coupon_id: i64) -> GatewayResult<Option<Order>> {
    self
      .bounded("set_order_coupon_if_unset", async {
        let sql = format!(
          "UPDATE orders SET coupon_applied = $2 WHERE id = $1 AND coupon_applied IS NULL RETURNING {}",
          ORDER_COLUMNS
        );
        Ok(
          sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(coupon_id)
            .fetch_optional(&self.pool)
            .await?,
        )
      })
      .await
  }

  #[instrument(skip(self))]
  async fn delete_order(&self, id: i64) -> GatewayResult<()> {
    self
      .bounded("delete_order", async {
        sqlx::query("DELETE FROM orders WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
      })
      .await
  }

  #[instrument(skip(self))]
  async fn insert_order_line(&self, order_id: i64, product_id: i64, quantity: i32) -> GatewayResult<OrderLine> {
    self
      .bounded("insert_order_line", async {
        let row = sqlx::query_as::<_, OrderLine>(
          "INSERT INTO item_order (order_id, product_id, quantity) VALUES ($1, $2, $3) \
           RETURNING id, order_id, product_id, quantity",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn update_order_line_quantity(&self, line_id: i64, quantity: i32) -> GatewayResult<OrderLine> {
    self
      .bounded("update_order_line_quantity", async {
        sqlx::query_as::<_, OrderLine>(
          "UPDATE item_order SET quantity = $2 WHERE id = $1 RETURNING id, order_id, product_id, quantity",
        )
        .bind(line_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("order line {}", line_id)))
      })
      .await
  }

  #[instrument(skip(self))]
  async fn delete_order_line(&self, line_id: i64) -> GatewayResult<()> {
    self
      .bounded("delete_order_line", async {
        sqlx::query("DELETE FROM item_order WHERE id = $1")
          .bind(line_id)
          .execute(&self.pool)
          .await?;
        Ok(())
      })
      .await
  }

  #[instrument(skip(self))]
  async fn find_order_line(&self, order_id: i64, product_id: i64) -> GatewayResult<Option<OrderLine>> {
    self
      .bounded("find_order_line", async {
        Ok(
          sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, quantity FROM item_order WHERE order_id = $1 AND product_id = $2",
          )
          .bind(order_id)
          .bind(product_id)
          .fetch_optional(&self.pool)
          .await?,
        )
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_all_products(&self) -> GatewayResult<Vec<Product>> {
    self
      .bounded("get_all_products", async {
        let sql = format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_products_by_category(&self, category: &str) -> GatewayResult<Vec<Product>> {
    self
      .bounded("get_products_by_category", async {
        let sql = format!("SELECT {} FROM products WHERE category = $1 ORDER BY name", PRODUCT_COLUMNS);
        Ok(sqlx::query_as::<_, Product>(&sql).bind(category).fetch_all(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn find_coupon_by_code(&self, code: &str) -> GatewayResult<Option<Coupon>> {
    self
      .bounded("find_coupon_by_code", async {
        let sql = format!("{} WHERE code = $1 AND is_active = TRUE", COUPON_SELECT);
        Ok(
          sqlx::query_as::<_, Coupon>(&sql)
            .bind(code.to_uppercase())
            .fetch_optional(&self.pool)
            .await?,
        )
      })
      .await
  }

  #[instrument(skip(self))]
  async fn get_coupon_by_id(&self, id: i64) -> GatewayResult<Option<Coupon>> {
    self
      .bounded("get_coupon_by_id", async {
        let sql = format!("{} WHERE id = $1 AND is_active = TRUE", COUPON_SELECT);
        Ok(sqlx::query_as::<_, Coupon>(&sql).bind(id).fetch_optional(&self.pool).await?)
      })
      .await
  }

  #[instrument(skip(self))]
  async fn increment_coupon_usage(&self, code: &str) -> GatewayResult<()> {
    self
      .bounded("increment_coupon_usage", async {
        sqlx::query("UPDATE coupons SET usage_count = COALESCE(usage_count, 0) + 1 WHERE code = $1")
          .bind(code.to_uppercase())
          .execute(&self.pool)
          .await?;
        Ok(())
      })
      .await
  }
}
