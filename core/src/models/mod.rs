// storefront-core/src/models/mod.rs

//! Data structures mirroring the hosted store's tables.

pub mod coupon;
pub mod order;
pub mod order_line;
pub mod product;

pub use coupon::Coupon;
pub use order::{Order, OrderStatus, OrderType};
pub use order_line::{OrderLine, OrderLineDetail};
pub use product::Product;
