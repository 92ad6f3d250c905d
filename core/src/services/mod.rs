// storefront-core/src/services/mod.rs

//! Business services layered over the session store and the gateway.

pub mod catalog;
pub mod coupons;
pub mod lifecycle;
pub mod line_editor;
pub mod pricing;

pub use catalog::Catalog;
pub use coupons::{CouponEvaluator, CouponGrant};
pub use lifecycle::{OrderLifecycle, PaymentDetails};
pub use line_editor::LineEditor;
pub use pricing::{compute_totals, OrderTotals};
