// storefront-core/src/config.rs

use crate::errors::{CoreError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,

  /// Shipping applied when the order has no server-resolved `send_price` yet.
  pub default_shipping_cents: i64,

  /// Upper bound for any single Persistence Gateway call.
  pub gateway_timeout_ms: u64,

  /// Country prefix assumed for bare national phone numbers ("52" for MX).
  pub default_phone_country_code: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| CoreError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let database_url = get_env("DATABASE_URL")?;

    let default_shipping_cents = get_env("DEFAULT_SHIPPING_CENTS")
      .unwrap_or_else(|_| "250".to_string())
      .parse::<i64>()
      .map_err(|e| CoreError::Config(format!("Invalid DEFAULT_SHIPPING_CENTS: {}", e)))?;

    let gateway_timeout_ms = get_env("GATEWAY_TIMEOUT_MS")
      .unwrap_or_else(|_| "10000".to_string())
      .parse::<u64>()
      .map_err(|e| CoreError::Config(format!("Invalid GATEWAY_TIMEOUT_MS: {}", e)))?;

    let default_phone_country_code = get_env("DEFAULT_PHONE_COUNTRY_CODE").unwrap_or_else(|_| "52".to_string());
    if !default_phone_country_code.chars().all(|c| c.is_ascii_digit()) {
      return Err(CoreError::Config(format!(
        "Invalid DEFAULT_PHONE_COUNTRY_CODE '{}': digits only",
        default_phone_country_code
      )));
    }

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      database_url,
      default_shipping_cents,
      gateway_timeout_ms,
      default_phone_country_code,
    })
  }
}
