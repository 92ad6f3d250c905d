// storefront-core/src/services/catalog.rs

//! Read-only mirror of the product catalog. Content is administered
//! externally; the mirror is replaced wholesale on each load, same as the
//! order snapshot.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::gateway::OrderGateway;
use crate::models::Product;

pub struct Catalog {
  gateway: Arc<dyn OrderGateway>,
  products: RwLock<Vec<Product>>,
}

impl Catalog {
  pub fn new(gateway: Arc<dyn OrderGateway>) -> Self {
    Self {
      gateway,
      products: RwLock::new(Vec::new()),
    }
  }

  #[instrument(skip(self))]
  pub async fn load_all(&self) -> Result<Vec<Product>> {
    let products = self.gateway.get_all_products().await?;
    info!(count = products.len(), "Catalog mirror rebuilt");
    *self.products.write() = products.clone();
    Ok(products)
  }

  #[instrument(skip(self))]
  pub async fn load_by_category(&self, category: &str) -> Result<Vec<Product>> {
    let products = self.gateway.get_products_by_category(category).await?;
    info!(category, count = products.len(), "Catalog mirror rebuilt for category");
    *self.products.write() = products.clone();
    Ok(products)
  }

  pub fn products(&self) -> Vec<Product> {
    self.products.read().clone()
  }
}
