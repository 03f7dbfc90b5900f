// greenhouse_storefront/src/lib.rs

//! Plant-nursery storefront: catalogue, carts, checkout and the quotation
//! lifecycle (buyer request, merchant bids, per-merchant order split).

pub mod cart;
pub mod config;
pub mod errors;
pub mod flows;
pub mod models;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
