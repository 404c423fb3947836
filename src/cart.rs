//! Shopping cart and checkout.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::logging::log_checkout;
use crate::model::{CartItem, Order, Product, Timestamp, User};
use crate::store::{CartRepository, OrderRepository};
use crate::verify::invariants::assert_cart_item;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of `product`, merging into an existing line.
    pub fn add(&mut self, product: Product, quantity: u32) {
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product, quantity }),
        }
    }

    /// Set a line's quantity, clamped to `[1, stock]`. Returns the applied
    /// quantity, `None` if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Option<u32> {
        let item = self.items.iter_mut().find(|i| i.product.id == product_id)?;
        item.quantity = quantity.min(item.product.stock).max(1);
        Some(item.quantity)
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

/// Turn the buyer's stored cart into a pending order and empty the cart.
/// Every line must be within stock.
pub fn checkout<R>(repo: &mut R, buyer: &User, shipping_address: &str, now: Timestamp) -> Result<Order>
where
    R: CartRepository + OrderRepository,
{
    let cart = repo.cart(&buyer.id)?;
    if cart.is_empty() {
        bail!("cart is empty");
    }
    if shipping_address.trim().is_empty() {
        bail!("shipping address is required");
    }
    for item in cart.items() {
        assert_cart_item(item)?;
    }
    let order = repo.create_order(buyer, cart.into_items(), shipping_address.trim(), now)?;
    repo.clear_cart(&buyer.id)?;
    log_checkout(&buyer.id, &order.id, order.items.len(), order.total_amount);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductCategory, ProductStatus, UserRole};
    use crate::store::KvStore;
    use std::collections::BTreeMap;

    fn product(id: &str, price: f64, stock: u32) -> Product {
        Product {
            id: id.into(),
            seller_id: "seller-1".into(),
            seller_name: "Seller One".into(),
            name: id.into(),
            description: "d".into(),
            category: ProductCategory::Food,
            price,
            original_price: None,
            discount: None,
            stock,
            images: vec!["i".into()],
            specifications: BTreeMap::new(),
            brand: "HealthyLeaf".into(),
            weight: None,
            dimensions: None,
            warranty: None,
            return_policy: None,
            status: ProductStatus::Active,
            rating: 0.0,
            review_count: 0,
            views: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn buyer() -> User {
        User {
            id: "buyer-1".into(),
            email: "buyer1@example.com".into(),
            name: "Buyer One".into(),
            role: UserRole::BuyerUser,
            created_at: 0,
            avatar: None,
        }
    }

    #[test]
    fn add_merges_lines() {
        let mut cart = Cart::new();
        cart.add(product("tea", 12.99, 50), 1);
        cart.add(product("tea", 12.99, 50), 2);
        cart.add(product("mug", 5.0, 50), 1);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.total_items(), 4);
        assert!((cart.total_price() - (12.99 * 3.0 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn add_saturates_quantity() {
        let mut cart = Cart::new();
        cart.add(product("tea", 1.0, 5), u32::MAX);
        cart.add(product("tea", 1.0, 5), 1);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert_eq!(cart.total_items(), u32::MAX);
    }

    #[test]
    fn quantity_clamped_to_stock() {
        let mut cart = Cart::new();
        cart.add(product("tea", 1.0, 5), 1);
        assert_eq!(cart.update_quantity("tea", 99), Some(5));
        assert_eq!(cart.update_quantity("tea", 0), Some(1));
        assert_eq!(cart.update_quantity("nope", 2), None);
    }

    #[test]
    fn remove_line() {
        let mut cart = Cart::new();
        cart.add(product("tea", 1.0, 5), 1);
        assert!(cart.remove("tea"));
        assert!(!cart.remove("tea"));
        assert!(cart.is_empty());
    }

    #[test]
    fn checkout_creates_order_and_empties_cart() {
        let mut store = KvStore::open_in_memory().unwrap();
        let user = buyer();
        let mut cart = Cart::new();
        cart.add(product("tea", 10.0, 5), 2);
        store.save_cart(&user.id, &cart).unwrap();

        let order = checkout(&mut store, &user, " 1 Main St ", 42).unwrap();
        assert_eq!(order.total_amount, 20.0);
        assert_eq!(order.shipping_address, "1 Main St");
        assert!(store.cart(&user.id).unwrap().is_empty());
        assert_eq!(store.orders_by_buyer(&user.id).unwrap().len(), 1);
    }

    #[test]
    fn checkout_rejects_empty_cart_and_blank_address() {
        let mut store = KvStore::open_in_memory().unwrap();
        let user = buyer();
        assert!(checkout(&mut store, &user, "addr", 1).is_err());

        let mut cart = Cart::new();
        cart.add(product("tea", 10.0, 5), 1);
        store.save_cart(&user.id, &cart).unwrap();
        assert!(checkout(&mut store, &user, "   ", 1).is_err());
        assert!(!store.cart(&user.id).unwrap().is_empty());
    }

    #[test]
    fn checkout_rejects_lines_over_stock() {
        let mut store = KvStore::open_in_memory().unwrap();
        let user = buyer();
        let mut cart = Cart::new();
        cart.add(product("tea", 10.0, 2), 3);
        store.save_cart(&user.id, &cart).unwrap();
        assert!(checkout(&mut store, &user, "addr", 1).is_err());
        assert!(store.all_orders().unwrap().is_empty());
    }
}
