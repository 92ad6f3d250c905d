// storefront-core/src/models/product.rs

use serde::Serialize;
use sqlx::FromRow;

/// Catalog entry. Read-only from this crate's perspective; catalog content
/// is administered externally.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub price_cents: i64,
  pub image_url: Option<String>,
  /// Grouping tag used by the catalog screens ("business" in the schema).
  pub category: Option<String>,
}
