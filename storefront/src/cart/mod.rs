// greenhouse_storefront/src/cart/mod.rs

//! Per-owner shopping carts: an observable in-memory store with persistence as
//! a side effect of every update.

pub mod hub;
pub mod items;
pub mod storage;
pub mod store;

pub use hub::{CartHub, CartOwner};
pub use items::{Cart, CartItem};
pub use storage::{CartError, CartStorage, FileCartStorage, MemoryCartStorage, CART_STORAGE_KEY};
pub use store::CartStore;
