// greenhouse_storefront/src/seed.rs

//! Sample catalogue for local runs (`SEED_DB=true`).

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{NewProduct, Product, UserProfile, UserRole};
use crate::store::{ProductFilter, Store};

fn sample_products() -> Vec<NewProduct> {
  let plant = |name: &str, category: &str, price: i64, stock: i32| NewProduct {
    name: name.to_string(),
    category: category.to_string(),
    description: None,
    price,
    stock_quantity: stock,
    image_url: None,
  };
  vec![
    plant("Monstera Deliciosa", "Indoor", 4500, 25),
    plant("Fiddle Leaf Fig", "Indoor", 6000, 12),
    plant("Japanese Maple", "Trees", 18500, 6),
    plant("Lavender Hidcote", "Perennials", 900, 80),
    plant("Boston Fern", "Indoor", 2200, 30),
    plant("Olive Tree", "Trees", 24000, 4),
  ]
}

/// Inserts the sample house catalogue when the store has no products yet, and
/// promotes `admin_user_id` to admin when given.
pub async fn seed_store(store: &dyn Store, admin_user_id: Option<Uuid>) -> Result<()> {
  if store.list_products(&ProductFilter::default()).await?.is_empty() {
    let products = sample_products();
    let count = products.len();
    for new in products {
      store.insert_product(&Product::from_new(new, None)).await?;
    }
    info!("Seeded {} catalogue products.", count);
  } else {
    info!("Products already present; catalogue seeding skipped.");
  }

  if let Some(user_id) = admin_user_id {
    let now = Utc::now();
    let profile = match store.get_profile(user_id).await? {
      Some(existing) => UserProfile {
        role: UserRole::Admin,
        updated_at: now,
        ..existing
      },
      None => UserProfile {
        user_id,
        email: "admin@localhost".to_string(),
        full_name: Some("Administrator".to_string()),
        phone: None,
        role: UserRole::Admin,
        created_at: now,
        updated_at: now,
      },
    };
    store.upsert_profile(&profile).await?;
    info!(%user_id, "Admin profile seeded.");
  }
  Ok(())
}
