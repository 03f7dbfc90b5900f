// greenhouse_storefront/src/flows/cart_flow.rs

use crate::cart::CartItem;
use crate::errors::AppError;
use crate::flows::contexts::AddToCartCtxData;
use greenhouse_flow::{FlowState, Flows, StepControl, Workflow};
use serde_json::Value;
use tracing::{info, warn};

pub fn register_add_to_cart_flow(flows: &Flows<AppError>) {
  let mut p = Workflow::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("check_product_stock_for_cart", false, None),
    ("merge_into_cart", false, None),
  ]);

  p.on_root("validate_cart_input", |ctx_data: FlowState<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      if quantity <= 0 || quantity > i64::from(u32::MAX) {
        warn!("Add to Cart: invalid quantity ({}).", quantity);
        return Err(AppError::Validation("Quantity must be a positive number.".to_string()));
      }
      Ok(StepControl::Continue)
    })
  });

  p.on_root("fetch_product_for_cart", |ctx_data: FlowState<AddToCartCtxData>| {
    Box::pin(async move {
      let (product_id, store) = {
        let guard = ctx_data.read();
        (guard.product_id, guard.app_state.store.clone())
      };

      let product = store
        .get_product(product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| {
          warn!("Add to Cart: product {} not found or inactive.", product_id);
          AppError::NotFound(format!("Product with ID {} not found.", product_id))
        })?;

      ctx_data.write().product = Some(product);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_root("check_product_stock_for_cart", |ctx_data: FlowState<AddToCartCtxData>| {
    Box::pin(async move {
      let (owner, product_id, quantity, stock, carts) = {
        let guard = ctx_data.read();
        let stock = guard.product.as_ref().map(|p| p.stock_quantity).unwrap_or(0);
        (
          guard.owner.clone(),
          guard.product_id,
          guard.quantity,
          stock,
          guard.app_state.carts.clone(),
        )
      };

      let cart = carts.cart_for(&owner).await?;
      let already_in_cart = cart
        .snapshot()
        .get(product_id)
        .map(|item| i64::from(item.quantity))
        .unwrap_or(0);

      if already_in_cart + quantity > i64::from(stock) {
        warn!(
          "Add to Cart: insufficient stock. Available: {}, in cart: {}, requested: {}.",
          stock, already_in_cart, quantity
        );
        return Err(AppError::Validation(format!(
          "Insufficient stock. Only {} available.",
          stock
        )));
      }

      ctx_data.write().cart = Some(cart);
      Ok(StepControl::Continue)
    })
  });

  p.on_root("merge_into_cart", |ctx_data: FlowState<AddToCartCtxData>| {
    Box::pin(async move {
      let (cart, item) = {
        let guard = ctx_data.read();
        let cart = guard
          .cart
          .clone()
          .ok_or_else(|| AppError::Internal("cart not opened before merge".to_string()))?;
        let product = guard
          .product
          .as_ref()
          .ok_or_else(|| AppError::Internal("product not loaded before merge".to_string()))?;
        let item = CartItem {
          id: product.id,
          name: product.name.clone(),
          category: product.category.clone(),
          price: product.price,
          quantity: guard.quantity as u32,
          image: product.image_url.clone(),
          year: None,
          size: None,
        };
        (cart, item)
      };

      let merged = cart.add_item(item).await?;
      info!(
        "Add to Cart: {} now holds {} x {}.",
        cart.key(),
        merged.quantity,
        merged.id
      );
      ctx_data.write().updated_cart_item = Some(merged);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  flows.register(p);
  info!("Add to Cart flow registered.");
}

/// Descriptive attributes copied from a cart line onto a quotation item.
pub(crate) fn cart_item_attributes(item: &CartItem) -> serde_json::Map<String, Value> {
  let mut attributes = serde_json::Map::new();
  attributes.insert("name".to_string(), Value::String(item.name.clone()));
  attributes.insert("category".to_string(), Value::String(item.category.clone()));
  if let Some(size) = &item.size {
    attributes.insert("size".to_string(), Value::String(size.clone()));
  }
  if let Some(year) = item.year {
    attributes.insert("year".to_string(), Value::from(year));
  }
  attributes
}
