//! Storefront data model: products, users, orders and tracked events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Free-form event metadata, kept in insertion order
pub type Metadata = Map<String, Value>;

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    SellerUser,
    BuyerUser,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::SellerUser => "seller_user",
            UserRole::BuyerUser => "buyer_user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "Electronics")]
    Electronics,
    #[serde(rename = "Clothing")]
    Clothing,
    #[serde(rename = "Food & Beverages")]
    Food,
    #[serde(rename = "Home & Garden")]
    Home,
    #[serde(rename = "Books")]
    Books,
    #[serde(rename = "Sports & Outdoors")]
    Sports,
    #[serde(rename = "Toys & Games")]
    Toys,
    #[serde(rename = "Beauty & Personal Care")]
    Beauty,
    #[serde(rename = "Automotive")]
    Automotive,
    #[serde(rename = "Other")]
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 10] = [
        ProductCategory::Electronics,
        ProductCategory::Clothing,
        ProductCategory::Food,
        ProductCategory::Home,
        ProductCategory::Books,
        ProductCategory::Sports,
        ProductCategory::Toys,
        ProductCategory::Beauty,
        ProductCategory::Automotive,
        ProductCategory::Other,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Clothing => "Clothing",
            ProductCategory::Food => "Food & Beverages",
            ProductCategory::Home => "Home & Garden",
            ProductCategory::Books => "Books",
            ProductCategory::Sports => "Sports & Outdoors",
            ProductCategory::Toys => "Toys & Games",
            ProductCategory::Beauty => "Beauty & Personal Care",
            ProductCategory::Automotive => "Automotive",
            ProductCategory::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    OutOfStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub seller_id: String,
    pub seller_name: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Discount in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub stock: u32,
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
    pub status: ProductStatus,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub views: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Seller-supplied fields of a product; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub seller_id: String,
    pub seller_name: String,
    pub name: String,
    pub description: String,
    pub category: ProductCategory,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    pub stock: u32,
    pub images: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub brand: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub return_policy: Option<String>,
    pub status: ProductStatus,
}

impl NewProduct {
    pub fn into_product(self, id: String, now: Timestamp) -> Product {
        Product {
            id,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            name: self.name,
            description: self.description,
            category: self.category,
            price: self.price,
            original_price: self.original_price,
            discount: self.discount,
            stock: self.stock,
            images: self.images,
            specifications: self.specifications,
            brand: self.brand,
            weight: self.weight,
            dimensions: self.dimensions,
            warranty: self.warranty,
            return_policy: self.return_policy,
            status: self.status,
            rating: 0.0,
            review_count: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied by a seller edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub images: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub brand: Option<String>,
    pub status: Option<ProductStatus>,
    pub weight: Option<String>,
    pub dimensions: Option<String>,
    pub warranty: Option<String>,
    pub return_policy: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: Timestamp) {
        if let Some(v) = self.name {
            product.name = v;
        }
        if let Some(v) = self.description {
            product.description = v;
        }
        if let Some(v) = self.category {
            product.category = v;
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = self.stock {
            product.stock = v;
        }
        if let Some(v) = self.images {
            product.images = v;
        }
        if let Some(v) = self.specifications {
            product.specifications = v;
        }
        if let Some(v) = self.brand {
            product.brand = v;
        }
        if let Some(v) = self.status {
            product.status = v;
        }
        if self.weight.is_some() {
            product.weight = self.weight;
        }
        if self.dimensions.is_some() {
            product.dimensions = self.dimensions;
        }
        if self.warranty.is_some() {
            product.warranty = self.warranty;
        }
        if self.return_policy.is_some() {
            product.return_policy = self.return_policy;
        }
        product.updated_at = now;
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub buyer_name: String,
    pub items: Vec<CartItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// =============================================================================
// Tracked events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Authentication
    Login,
    Logout,
    // Buyer
    BrowseProducts,
    ViewProductDetails,
    AddToCart,
    RemoveFromCart,
    ViewCart,
    ViewOrders,
    ProceedToCheckout,
    CompletePurchase,
    // Seller
    ViewSellerDashboard,
    CreateProduct,
    EditProduct,
    DeleteProduct,
    ViewProductList,
    // Admin
    ViewAdminDashboard,
    ViewSellersList,
    ViewBuyersList,
    ViewUserJourney,
    ViewMetrics,
    /// Any type this build does not know; read back without failing the log
    #[serde(other)]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Login => "LOGIN",
            EventType::Logout => "LOGOUT",
            EventType::BrowseProducts => "BROWSE_PRODUCTS",
            EventType::ViewProductDetails => "VIEW_PRODUCT_DETAILS",
            EventType::AddToCart => "ADD_TO_CART",
            EventType::RemoveFromCart => "REMOVE_FROM_CART",
            EventType::ViewCart => "VIEW_CART",
            EventType::ViewOrders => "VIEW_ORDERS",
            EventType::ProceedToCheckout => "PROCEED_TO_CHECKOUT",
            EventType::CompletePurchase => "COMPLETE_PURCHASE",
            EventType::ViewSellerDashboard => "VIEW_SELLER_DASHBOARD",
            EventType::CreateProduct => "CREATE_PRODUCT",
            EventType::EditProduct => "EDIT_PRODUCT",
            EventType::DeleteProduct => "DELETE_PRODUCT",
            EventType::ViewProductList => "VIEW_PRODUCT_LIST",
            EventType::ViewAdminDashboard => "VIEW_ADMIN_DASHBOARD",
            EventType::ViewSellersList => "VIEW_SELLERS_LIST",
            EventType::ViewBuyersList => "VIEW_BUYERS_LIST",
            EventType::ViewUserJourney => "VIEW_USER_JOURNEY",
            EventType::ViewMetrics => "VIEW_METRICS",
            EventType::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable label: `ADD_TO_CART` → `ADD TO CART`
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

/// One tracked user action. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub event_type: EventType,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Event {
    /// New event for `user` with a fresh id.
    pub fn new(user: &User, event_type: EventType, timestamp: Timestamp, metadata: Option<Metadata>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_role: user.role,
            event_type,
            timestamp,
            metadata,
        }
    }
}
