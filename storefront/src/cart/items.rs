// greenhouse_storefront/src/cart/items.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cart line. `id` is the product id and identifies the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
  pub id: Uuid,
  pub name: String,
  pub category: String,
  /// Minor currency units, as shown when the item was added.
  pub price: i64,
  pub quantity: u32,
  pub image: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub year: Option<i32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub size: Option<String>,
}

/// Ordered cart lines; at most one line per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
  items: Vec<CartItem>,
}

impl Cart {
  pub fn from_items(items: Vec<CartItem>) -> Self {
    let mut cart = Cart::default();
    for item in items {
      cart.add(item);
    }
    cart
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn get(&self, id: Uuid) -> Option<&CartItem> {
    self.items.iter().find(|i| i.id == id)
  }

  /// Adds `item`, or increases the quantity of the line with the same id.
  /// Returns the resulting line.
  pub fn add(&mut self, item: CartItem) -> CartItem {
    if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
      existing.quantity = existing.quantity.saturating_add(item.quantity);
      return existing.clone();
    }
    self.items.push(item.clone());
    item
  }

  /// Sets the quantity of a line; zero removes it. Returns false if no such line.
  pub fn set_quantity(&mut self, id: Uuid, quantity: u32) -> bool {
    if quantity == 0 {
      return self.remove(id);
    }
    match self.items.iter_mut().find(|i| i.id == id) {
      Some(item) => {
        item.quantity = quantity;
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, id: Uuid) -> bool {
    let before = self.items.len();
    self.items.retain(|i| i.id != id);
    self.items.len() != before
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  pub fn item_count(&self) -> u32 {
    self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity))
  }

  /// Display total; saturates instead of overflowing. Checkout prices lines
  /// with checked arithmetic.
  pub fn total(&self) -> i64 {
    self
      .items
      .iter()
      .fold(0i64, |acc, i| acc.saturating_add(i.price.saturating_mul(i64::from(i.quantity))))
  }
}
