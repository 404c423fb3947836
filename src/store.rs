//! Key-value persistence standing in for a backend.
//!
//! Every collection lives under one key as a JSON document in a single
//! SQLite table. Callers see the typed repository traits below and receive
//! the store as an explicit parameter; nothing here is global.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cart::Cart;
use crate::filters::FilterConfiguration;
use crate::journey::EventLog;
use crate::logging::{log_audit, log_store_write, ts_epoch_ms};
use crate::model::{
    CartItem, Event, NewProduct, Order, OrderStatus, Product, ProductPatch, Timestamp, User,
    UserRole,
};
use crate::verify::invariants::{assert_new_product, assert_order_total, assert_product_invariants};
use crate::wishlist::Wishlist;

pub const PRODUCTS_KEY: &str = "products";
pub const USERS_KEY: &str = "users";
pub const ORDERS_KEY: &str = "orders";
pub const EVENTS_KEY: &str = "events";
pub const FILTERS_KEY: &str = "filter_configuration";
pub const SESSION_KEY: &str = "session_user";

pub fn cart_key(user_id: &str) -> String {
    format!("cart_{}", user_id)
}

pub fn wishlist_key(user_id: &str) -> String {
    format!("wishlist_{}", user_id)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Repository traits
// =============================================================================

pub trait ProductRepository {
    fn all_products(&self) -> Result<Vec<Product>>;
    fn create_product(&mut self, input: NewProduct, now: Timestamp) -> Result<Product>;
    /// `None` when no product has this id.
    fn update_product(&mut self, id: &str, patch: ProductPatch, now: Timestamp) -> Result<Option<Product>>;
    fn delete_product(&mut self, id: &str) -> Result<bool>;
    /// Returns the new view count, `None` for an unknown id.
    fn increment_views(&mut self, id: &str) -> Result<Option<u64>>;

    fn product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.all_products()?.into_iter().find(|p| p.id == id))
    }

    fn products_by_seller(&self, seller_id: &str) -> Result<Vec<Product>> {
        Ok(self
            .all_products()?
            .into_iter()
            .filter(|p| p.seller_id == seller_id)
            .collect())
    }
}

pub trait UserRepository {
    fn all_users(&self) -> Result<Vec<User>>;
    fn save_users(&mut self, users: &[User]) -> Result<()>;

    fn user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.all_users()?.into_iter().find(|u| u.id == id))
    }

    fn users_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        Ok(self.all_users()?.into_iter().filter(|u| u.role == role).collect())
    }
}

pub trait OrderRepository {
    fn all_orders(&self) -> Result<Vec<Order>>;
    fn create_order(
        &mut self,
        buyer: &User,
        items: Vec<CartItem>,
        shipping_address: &str,
        now: Timestamp,
    ) -> Result<Order>;

    fn orders_by_buyer(&self, buyer_id: &str) -> Result<Vec<Order>> {
        Ok(self
            .all_orders()?
            .into_iter()
            .filter(|o| o.buyer_id == buyer_id)
            .collect())
    }
}

pub trait EventRepository {
    fn load_events(&self) -> Result<EventLog>;
    fn append_event(&mut self, event: Event) -> Result<()>;
    fn clear_events(&mut self) -> Result<()>;
}

pub trait CartRepository {
    fn cart(&self, user_id: &str) -> Result<Cart>;
    fn save_cart(&mut self, user_id: &str, cart: &Cart) -> Result<()>;
    fn clear_cart(&mut self, user_id: &str) -> Result<()>;
}

pub trait WishlistRepository {
    fn wishlist(&self, user_id: &str) -> Result<Wishlist>;
    fn save_wishlist(&mut self, user_id: &str, wishlist: &Wishlist) -> Result<()>;
}

pub trait FilterConfigRepository {
    fn filter_configuration(&self) -> Result<Option<FilterConfiguration>>;
    fn save_filter_configuration(&mut self, config: &FilterConfiguration) -> Result<()>;
    fn remove_filter_configuration(&mut self) -> Result<()>;
}

pub trait SessionRepository {
    fn session_user(&self) -> Result<Option<User>>;
    fn save_session_user(&mut self, user: &User) -> Result<()>;
    fn clear_session_user(&mut self) -> Result<()>;
}

// =============================================================================
// SQLite-backed store
// =============================================================================

pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening store at {}", path))?;
        let mut store = Self { conn };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let mut store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    pub fn put_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, ts_epoch_ms() as i64],
        )?;
        log_store_write(key, value.len());
        Ok(())
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).with_context(|| format!("decoding key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn put_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("encoding key {}", key))?;
        self.put_raw(key, &raw)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key)?.is_some())
    }

    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let n = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    /// Remove every key starting with `prefix`. Returns the number removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> Result<usize> {
        let pattern = format!("{}%", prefix.replace('%', "\\%").replace('_', "\\_"));
        let n = self
            .conn
            .execute("DELETE FROM kv WHERE key LIKE ?1 ESCAPE '\\'", params![pattern])?;
        Ok(n)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    fn list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        Ok(self.get_json(key)?.unwrap_or_default())
    }
}

impl ProductRepository for KvStore {
    fn all_products(&self) -> Result<Vec<Product>> {
        self.list(PRODUCTS_KEY)
    }

    fn create_product(&mut self, input: NewProduct, now: Timestamp) -> Result<Product> {
        assert_new_product(&input)?;
        let mut products = self.all_products()?;
        let product = input.into_product(new_id(), now);
        products.push(product.clone());
        self.put_json(PRODUCTS_KEY, &products)?;
        Ok(product)
    }

    fn update_product(&mut self, id: &str, patch: ProductPatch, now: Timestamp) -> Result<Option<Product>> {
        let mut products = self.all_products()?;
        let Some(slot) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        let mut updated = slot.clone();
        patch.apply(&mut updated, now);
        assert_product_invariants(&updated)?;
        *slot = updated.clone();
        self.put_json(PRODUCTS_KEY, &products)?;
        Ok(Some(updated))
    }

    fn delete_product(&mut self, id: &str) -> Result<bool> {
        let products = self.all_products()?;
        let before = products.len();
        let kept: Vec<Product> = products.into_iter().filter(|p| p.id != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.put_json(PRODUCTS_KEY, &kept)?;
        Ok(true)
    }

    fn increment_views(&mut self, id: &str) -> Result<Option<u64>> {
        let mut products = self.all_products()?;
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.views += 1;
        let views = product.views;
        self.put_json(PRODUCTS_KEY, &products)?;
        Ok(Some(views))
    }
}

impl UserRepository for KvStore {
    fn all_users(&self) -> Result<Vec<User>> {
        self.list(USERS_KEY)
    }

    fn save_users(&mut self, users: &[User]) -> Result<()> {
        self.put_json(USERS_KEY, users)
    }
}

impl OrderRepository for KvStore {
    fn all_orders(&self) -> Result<Vec<Order>> {
        self.list(ORDERS_KEY)
    }

    fn create_order(
        &mut self,
        buyer: &User,
        items: Vec<CartItem>,
        shipping_address: &str,
        now: Timestamp,
    ) -> Result<Order> {
        let mut orders = self.all_orders()?;
        let total_amount = items.iter().map(CartItem::line_total).sum();
        let order = Order {
            id: new_id(),
            buyer_id: buyer.id.clone(),
            buyer_name: buyer.name.clone(),
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address: shipping_address.to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_order_total(&order, 1e-9)?;
        orders.push(order.clone());
        self.put_json(ORDERS_KEY, &orders)?;
        Ok(order)
    }
}

impl EventRepository for KvStore {
    fn load_events(&self) -> Result<EventLog> {
        Ok(EventLog::from(self.list::<Event>(EVENTS_KEY)?))
    }

    fn append_event(&mut self, event: Event) -> Result<()> {
        let mut log = self.load_events()?;
        log.record(event);
        self.put_json(EVENTS_KEY, &log)
    }

    fn clear_events(&mut self) -> Result<()> {
        let log = self.load_events()?;
        log_audit("events_cleared", &log.digest()?, log.len());
        self.remove(EVENTS_KEY)?;
        Ok(())
    }
}

impl CartRepository for KvStore {
    fn cart(&self, user_id: &str) -> Result<Cart> {
        Ok(self.get_json(&cart_key(user_id))?.unwrap_or_default())
    }

    fn save_cart(&mut self, user_id: &str, cart: &Cart) -> Result<()> {
        self.put_json(&cart_key(user_id), cart)
    }

    fn clear_cart(&mut self, user_id: &str) -> Result<()> {
        self.remove(&cart_key(user_id))?;
        Ok(())
    }
}

impl WishlistRepository for KvStore {
    fn wishlist(&self, user_id: &str) -> Result<Wishlist> {
        Ok(self.get_json(&wishlist_key(user_id))?.unwrap_or_default())
    }

    fn save_wishlist(&mut self, user_id: &str, wishlist: &Wishlist) -> Result<()> {
        self.put_json(&wishlist_key(user_id), wishlist)
    }
}

impl FilterConfigRepository for KvStore {
    fn filter_configuration(&self) -> Result<Option<FilterConfiguration>> {
        self.get_json(FILTERS_KEY)
    }

    fn save_filter_configuration(&mut self, config: &FilterConfiguration) -> Result<()> {
        self.put_json(FILTERS_KEY, config)
    }

    fn remove_filter_configuration(&mut self) -> Result<()> {
        self.remove(FILTERS_KEY)?;
        Ok(())
    }
}

impl SessionRepository for KvStore {
    fn session_user(&self) -> Result<Option<User>> {
        self.get_json(SESSION_KEY)
    }

    fn save_session_user(&mut self, user: &User) -> Result<()> {
        self.put_json(SESSION_KEY, user)
    }

    fn clear_session_user(&mut self) -> Result<()> {
        self.remove(SESSION_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, ProductCategory, ProductStatus};
    use std::collections::BTreeMap;

    fn input(name: &str, price: f64) -> NewProduct {
        NewProduct {
            seller_id: "seller-1".into(),
            seller_name: "Seller One".into(),
            name: name.into(),
            description: "desc".into(),
            category: ProductCategory::Books,
            price,
            original_price: None,
            discount: None,
            stock: 4,
            images: vec!["https://img".into()],
            specifications: BTreeMap::new(),
            brand: "BookWorld".into(),
            weight: None,
            dimensions: None,
            warranty: None,
            return_policy: None,
            status: ProductStatus::Active,
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
    fn raw_roundtrip_and_overwrite() {
        let mut store = KvStore::open_in_memory().unwrap();
        assert_eq!(store.get_raw("k").unwrap(), None);
        store.put_raw("k", "1").unwrap();
        store.put_raw("k", "2").unwrap();
        assert_eq!(store.get_raw("k").unwrap().as_deref(), Some("2"));
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
    }

    #[test]
    fn remove_prefix_only_hits_matching_keys() {
        let mut store = KvStore::open_in_memory().unwrap();
        store.put_raw("cart_a", "[]").unwrap();
        store.put_raw("cart_b", "[]").unwrap();
        store.put_raw("cartography", "[]").unwrap();
        assert_eq!(store.remove_prefix("cart_").unwrap(), 2);
        assert_eq!(store.keys().unwrap(), vec!["cartography".to_string()]);
    }

    #[test]
    fn product_crud() {
        let mut store = KvStore::open_in_memory().unwrap();
        let created = store.create_product(input("Novel", 12.5), 100).unwrap();
        assert_eq!(created.created_at, 100);
        assert_eq!(store.product(&created.id).unwrap().unwrap().name, "Novel");
        assert_eq!(store.products_by_seller("seller-1").unwrap().len(), 1);
        assert!(store.products_by_seller("seller-9").unwrap().is_empty());

        let patch = ProductPatch {
            stock: Some(9),
            ..Default::default()
        };
        let updated = store.update_product(&created.id, patch, 200).unwrap().unwrap();
        assert_eq!(updated.stock, 9);
        assert_eq!(updated.updated_at, 200);
        assert!(store
            .update_product("missing", ProductPatch::default(), 200)
            .unwrap()
            .is_none());

        assert_eq!(store.increment_views(&created.id).unwrap(), Some(1));
        assert_eq!(store.increment_views(&created.id).unwrap(), Some(2));
        assert_eq!(store.increment_views("missing").unwrap(), None);

        assert!(store.delete_product(&created.id).unwrap());
        assert!(!store.delete_product(&created.id).unwrap());
        assert!(store.all_products().unwrap().is_empty());
    }

    #[test]
    fn invalid_listing_is_rejected() {
        let mut store = KvStore::open_in_memory().unwrap();
        assert!(store.create_product(input("Free", 0.0), 1).is_err());
        let created = store.create_product(input("Novel", 5.0), 1).unwrap();
        let patch = ProductPatch {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(store.update_product(&created.id, patch, 2).is_err());
        // failed update leaves the stored product intact
        assert_eq!(store.product(&created.id).unwrap().unwrap().price, 5.0);
    }

    #[test]
    fn orders_total_and_filter_by_buyer() {
        let mut store = KvStore::open_in_memory().unwrap();
        let product = store.create_product(input("Novel", 10.0), 1).unwrap();
        let items = vec![CartItem { product, quantity: 3 }];
        let order = store.create_order(&buyer(), items, "1 Main St", 5).unwrap();
        assert_eq!(order.total_amount, 30.0);
        assert!(assert_order_total(&order, 1e-9).is_ok());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(store.orders_by_buyer("buyer-1").unwrap().len(), 1);
        assert!(store.orders_by_buyer("buyer-2").unwrap().is_empty());
    }

    #[test]
    fn events_append_and_clear() {
        let mut store = KvStore::open_in_memory().unwrap();
        let user = buyer();
        store.append_event(Event::new(&user, EventType::Login, 1, None)).unwrap();
        store.append_event(Event::new(&user, EventType::BrowseProducts, 2, None)).unwrap();
        let log = store.load_events().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].event_type, EventType::Login);
        store.clear_events().unwrap();
        assert!(store.load_events().unwrap().is_empty());
    }

    #[test]
    fn missing_collections_read_as_empty() {
        let store = KvStore::open_in_memory().unwrap();
        assert!(store.all_products().unwrap().is_empty());
        assert!(store.all_users().unwrap().is_empty());
        assert!(store.all_orders().unwrap().is_empty());
        assert!(store.cart("nobody").unwrap().is_empty());
        assert!(store.session_user().unwrap().is_none());
    }

    #[test]
    fn corrupt_value_surfaces_error() {
        let mut store = KvStore::open_in_memory().unwrap();
        store.put_raw(PRODUCTS_KEY, "not json").unwrap();
        assert!(store.all_products().is_err());
    }

    #[test]
    fn unknown_event_type_still_loads() {
        let mut store = KvStore::open_in_memory().unwrap();
        store
            .put_raw(
                EVENTS_KEY,
                r#"[
                    {"id":"e1","user_id":"u1","user_name":"u","user_role":"buyer_user","event_type":"LOGIN","timestamp":1},
                    {"id":"e2","user_id":"u1","user_name":"u","user_role":"buyer_user","event_type":"VIEW_WISHLIST","timestamp":2}
                ]"#,
            )
            .unwrap();

        let log = store.load_events().unwrap();
        assert_eq!(log.len(), 2);
        let graph = crate::journey::journey_for(&log, "u1");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        let node = graph.node("e2").unwrap();
        assert_eq!(node.icon, "📌");
        assert_eq!(node.color, "#6c757d");
        assert_eq!(node.label, "UNKNOWN");
    }
}
