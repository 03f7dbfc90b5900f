// greenhouse_storefront/src/models/mod.rs

//! Data structures for store rows and their status lifecycles.

pub mod merchant;
pub mod order;
pub mod product;
pub mod profile;
pub mod quotation;
pub mod review;
pub mod status;

pub use merchant::{Merchant, MerchantStatus};
pub use order::{Order, OrderLine, OrderStatus};
pub use product::{NewProduct, Product, ProductUpdate};
pub use profile::{UserProfile, UserRole};
pub use quotation::{Quotation, QuotationItem, QuotationStatus, QuotationWithBids};
pub use review::{Review, ReviewSummary};
pub use status::{InvalidTransition, Lifecycle, StatusBadge};
