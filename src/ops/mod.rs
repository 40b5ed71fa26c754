pub mod drag;
pub mod drop_ops;
pub mod group_ops;
pub mod index;
pub mod order_cache;
pub mod selection;
pub mod session;
