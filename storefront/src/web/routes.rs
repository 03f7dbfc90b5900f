// greenhouse_storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::web::handlers::{
  admin_handlers, cart_handlers, checkout_handlers, merchant_handlers, order_handlers, product_handlers,
  profile_handlers, quotation_handlers,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}/reviews", web::get().to(product_handlers::list_reviews_handler))
          .route("/{product_id}/reviews", web::post().to(product_handlers::add_review_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/items/{product_id}", web::put().to(cart_handlers::set_cart_quantity_handler))
          .route("/items/{product_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
      )
      .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
      .service(
        web::scope("/quotations")
          .route("", web::post().to(quotation_handlers::create_quotation_handler))
          .route("", web::get().to(quotation_handlers::list_my_quotations_handler))
          .route("/{code}", web::get().to(quotation_handlers::get_quotation_handler))
          .route("/{code}/selection", web::post().to(quotation_handlers::select_merchants_handler))
          .route("/{code}/close", web::post().to(quotation_handlers::close_quotation_handler)),
      )
      .route("/merchants/register", web::post().to(merchant_handlers::register_merchant_handler))
      .service(
        web::scope("/merchant")
          .route("/me", web::get().to(merchant_handlers::merchant_me_handler))
          .route("/products", web::get().to(merchant_handlers::list_merchant_products_handler))
          .route("/products", web::post().to(merchant_handlers::create_merchant_product_handler))
          .route("/products/{product_id}", web::put().to(merchant_handlers::update_merchant_product_handler))
          .route("/quotations/available", web::get().to(merchant_handlers::available_quotations_handler))
          .route("/quotations", web::get().to(merchant_handlers::list_merchant_bids_handler))
          .route("/quotations/{code}/bids", web::post().to(merchant_handlers::submit_bid_handler))
          .route("/quotations/{code}/close", web::post().to(merchant_handlers::close_merchant_quotation_handler))
          .route("/orders", web::get().to(merchant_handlers::list_merchant_orders_handler))
          .route("/orders/{order_id}/status", web::put().to(merchant_handlers::update_merchant_order_status_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/merchants", web::get().to(admin_handlers::list_merchants_handler))
          .route("/merchants/{code}/status", web::put().to(admin_handlers::set_merchant_status_handler))
          .route("/quotations", web::get().to(admin_handlers::list_quotations_handler))
          .route("/quotations/{code}/status", web::put().to(admin_handlers::set_quotation_status_handler))
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          .route("/orders/{order_id}/status", web::put().to(admin_handlers::set_order_status_handler)),
      )
      .service(
        web::scope("/profile")
          .route("", web::get().to(profile_handlers::get_profile_handler))
          .route("", web::put().to(profile_handlers::upsert_profile_handler)),
      ),
  );
}
