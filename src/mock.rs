//! Demo catalog and accounts for a fresh store.

use std::collections::BTreeMap;

use anyhow::Result;
use rand::Rng;

use crate::filters;
use crate::logging::{log, obj, v_num, Domain, Level, ProfileScope};
use crate::model::{Order, Product, ProductCategory, ProductStatus, Timestamp, User, UserRole};
use crate::store::{
    new_id, KvStore, EVENTS_KEY, FILTERS_KEY, ORDERS_KEY, PRODUCTS_KEY, SESSION_KEY, USERS_KEY,
};

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

struct Template {
    name: &'static str,
    category: ProductCategory,
    price: f64,
    brand: &'static str,
}

const TEMPLATES: [Template; 10] = [
    Template { name: "Wireless Bluetooth Headphones", category: ProductCategory::Electronics, price: 89.99, brand: "AudioTech" },
    Template { name: "Smart Watch Series 5", category: ProductCategory::Electronics, price: 299.99, brand: "TechTime" },
    Template { name: "Premium Cotton T-Shirt", category: ProductCategory::Clothing, price: 24.99, brand: "StyleCo" },
    Template { name: "Designer Jeans", category: ProductCategory::Clothing, price: 79.99, brand: "DenimPro" },
    Template { name: "Organic Green Tea Pack", category: ProductCategory::Food, price: 12.99, brand: "HealthyLeaf" },
    Template { name: "LED Desk Lamp", category: ProductCategory::Home, price: 45.99, brand: "BrightHome" },
    Template { name: "Fiction Bestseller Collection", category: ProductCategory::Books, price: 34.99, brand: "BookWorld" },
    Template { name: "Yoga Mat Premium", category: ProductCategory::Sports, price: 29.99, brand: "FitLife" },
    Template { name: "Building Blocks Set", category: ProductCategory::Toys, price: 49.99, brand: "PlayFun" },
    Template { name: "Skincare Kit", category: ProductCategory::Beauty, price: 64.99, brand: "GlowBeauty" },
];

/// What `seed` wrote; `false` means the key already existed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub products: bool,
    pub users: bool,
    pub orders: bool,
    pub filters: bool,
}

pub fn mock_products<R: Rng>(rng: &mut R, now: Timestamp) -> Vec<Product> {
    TEMPLATES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let seller = i % 3 + 1;
            let image = format!("https://via.placeholder.com/400x300?text={}", t.name.replace(' ', "%20"));
            let specifications: BTreeMap<String, String> = [
                ("Material", "Premium Quality"),
                ("Color", "Multiple Options"),
                ("Size", "Standard"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
            Product {
                id: new_id(),
                seller_id: format!("seller-{seller}"),
                seller_name: format!("Seller {seller}"),
                name: t.name.to_string(),
                description: format!(
                    "High-quality {} with excellent features and durability. Perfect for everyday use.",
                    t.name.to_lowercase()
                ),
                category: t.category,
                price: t.price,
                original_price: None,
                discount: None,
                stock: rng.gen_range(20..120),
                images: vec![image.clone(), format!("{image}+2")],
                specifications,
                brand: t.brand.to_string(),
                weight: Some("500g".into()),
                dimensions: Some("20x15x10 cm".into()),
                warranty: Some("1 Year".into()),
                return_policy: Some("30 days return".into()),
                status: ProductStatus::Active,
                rating: 0.0,
                review_count: 0,
                views: 0,
                created_at: now.saturating_sub(rng.gen_range(0..30 * DAY_MS)),
                updated_at: now,
            }
        })
        .collect()
}

pub fn mock_users() -> Vec<User> {
    let user = |id: &str, email: &str, name: &str, role, created_at| User {
        id: id.into(),
        email: email.into(),
        name: name.into(),
        role,
        created_at,
        avatar: None,
    };
    vec![
        user("admin-1", "admin@ecommerce.com", "Admin User", UserRole::Admin, 1_704_067_200_000),
        user("seller-1", "seller1@example.com", "Seller One", UserRole::SellerUser, 1_706_745_600_000),
        user("seller-2", "seller2@example.com", "Seller Two", UserRole::SellerUser, 1_707_955_200_000),
        user("buyer-1", "buyer1@example.com", "Buyer One", UserRole::BuyerUser, 1_709_251_200_000),
        user("buyer-2", "buyer2@example.com", "Buyer Two", UserRole::BuyerUser, 1_710_028_800_000),
    ]
}

/// Fill in whichever collections are missing. Existing data is left alone.
pub fn seed<R: Rng>(store: &mut KvStore, rng: &mut R, now: Timestamp) -> Result<SeedReport> {
    let _p = ProfileScope::new("mock_seed");
    let mut report = SeedReport::default();
    if !store.contains(PRODUCTS_KEY)? {
        store.put_json(PRODUCTS_KEY, &mock_products(rng, now))?;
        report.products = true;
    }
    if !store.contains(USERS_KEY)? {
        store.put_json(USERS_KEY, &mock_users())?;
        report.users = true;
    }
    if !store.contains(ORDERS_KEY)? {
        store.put_json(ORDERS_KEY, &Vec::<Order>::new())?;
        report.orders = true;
    }
    if !store.contains(FILTERS_KEY)? {
        filters::configuration(store, now)?;
        report.filters = true;
    }
    log(
        Level::Info,
        Domain::Store,
        "mock_seeded",
        obj(&[
            ("products", v_num(report.products as u8 as f64)),
            ("users", v_num(report.users as u8 as f64)),
            ("orders", v_num(report.orders as u8 as f64)),
            ("filters", v_num(report.filters as u8 as f64)),
        ]),
    );
    Ok(report)
}

/// Drop every storefront collection, per-user carts and wishlists included.
pub fn reset(store: &mut KvStore) -> Result<usize> {
    let mut removed = 0;
    for key in [PRODUCTS_KEY, USERS_KEY, ORDERS_KEY, EVENTS_KEY, FILTERS_KEY, SESSION_KEY] {
        if store.remove(key)? {
            removed += 1;
        }
    }
    removed += store.remove_prefix("cart_")?;
    removed += store.remove_prefix("wishlist_")?;
    log(Level::Warn, Domain::Store, "mock_reset", obj(&[("removed", v_num(removed as f64))]));
    Ok(removed)
}
