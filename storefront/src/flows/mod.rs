// greenhouse_storefront/src/flows/mod.rs

pub mod bid_flow;
pub mod cart_flow;
pub mod checkout_flow;
pub mod contexts;
pub mod quotation_request_flow;
pub mod selection_flow;

use crate::errors::AppError;
use greenhouse_flow::Flows;

pub fn register_all_flows(flows: &Flows<AppError>) {
  cart_flow::register_add_to_cart_flow(flows);
  quotation_request_flow::register_quotation_request_flow(flows);
  bid_flow::register_bid_flow(flows);
  selection_flow::register_selection_flow(flows);
  checkout_flow::register_checkout_flow(flows);
}
