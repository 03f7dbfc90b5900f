// greenhouse_storefront/src/services/mod.rs

pub mod catalog_service;
pub mod codes;
pub mod merchant_service;
pub mod order_service;
pub mod pricing;
pub mod profile_service;
pub mod quotation_service;
pub mod split;
