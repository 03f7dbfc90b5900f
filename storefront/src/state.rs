// greenhouse_storefront/src/state.rs

use crate::cart::{CartHub, CartStorage};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::flows;
use crate::services::quotation_service::QuotationService;
use crate::store::Store;
use greenhouse_flow::Flows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub carts: Arc<CartHub>,
  pub flows: Arc<Flows<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state and registers every storefront workflow.
  pub fn new(store: Arc<dyn Store>, cart_storage: Arc<dyn CartStorage>, config: AppConfig) -> Self {
    let flows = Arc::new(Flows::<AppError>::new());
    flows::register_all_flows(&flows);
    Self {
      store,
      carts: Arc::new(CartHub::with_capacity(cart_storage, config.cart_cache_capacity)),
      flows,
      config: Arc::new(config),
    }
  }

  pub fn quotations(&self) -> QuotationService {
    QuotationService::new(self.clone())
  }
}
