//! Catalog filter/sort engine.
//!
//! ```text
//! products ──► category ──► search ──► price ──► rating ──► stable sort ──► view
//!                                                                          │
//!                                                               Pager ◄────┘
//! ```
//!
//! Everything here is a pure read-side transformation: the input slice is
//! never mutated and a new ordered view is returned. The search term is
//! expected to be settled already (see [`crate::search`]); the engine never
//! debounces.

pub mod pager;

pub use pager::Pager;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::logging::log_view_derived;
use crate::model::{Product, ProductCategory};

/// Category selector: everything, or exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ProductCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ProductCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => f.write_str(c.label()),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(c: CategoryFilter) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        ProductCategory::from_label(&s)
            .map(CategoryFilter::Only)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Finite and not inverted. An invalid range admits nothing.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        self.is_valid() && self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1000.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Most recently created first
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    ViewsDesc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::RatingDesc => "rating-desc",
            SortKey::ViewsDesc => "views-desc",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Newest => b.created_at.cmp(&a.created_at),
            SortKey::PriceAsc => a.price.total_cmp(&b.price),
            SortKey::PriceDesc => b.price.total_cmp(&a.price),
            SortKey::RatingDesc => b.rating.total_cmp(&a.rating),
            SortKey::ViewsDesc => b.views.cmp(&a.views),
        }
    }
}

/// The active filter and sort parameters for a product list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub category: CategoryFilter,
    /// Settled search term; empty matches everything
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub price: PriceRange,
    /// Skipped when zero
    #[serde(default)]
    pub min_rating: f64,
    #[serde(default)]
    pub sort: SortKey,
}

impl FilterSpec {
    pub fn with_category(mut self, category: ProductCategory) -> Self {
        self.category = CategoryFilter::Only(category);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_price(mut self, min: f64, max: f64) -> Self {
        self.price = PriceRange::new(min, max);
        self
    }

    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Does `product` pass every filter?
    pub fn admits(&self, product: &Product) -> bool {
        self.admits_lowered(product, &self.search.to_lowercase())
    }

    fn admits_lowered(&self, product: &Product, needle: &str) -> bool {
        self.category.matches(product.category)
            && matches_search(product, needle)
            && self.price.contains(product.price)
            && (self.min_rating <= 0.0 || product.rating >= self.min_rating)
    }
}

/// Case-insensitive substring match on name, description and brand.
/// `needle` must already be lowercased.
fn matches_search(product: &Product, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.brand.to_lowercase().contains(needle)
}

/// Filter and sort without cloning. Ties keep input order.
pub fn derive_view_refs<'a>(products: &'a [Product], spec: &FilterSpec) -> Vec<&'a Product> {
    let needle = spec.search.to_lowercase();
    let mut view: Vec<&Product> = products
        .iter()
        .filter(|p| spec.admits_lowered(p, &needle))
        .collect();

    // slice::sort_by is stable
    view.sort_by(|a, b| spec.sort.compare(a, b));

    log_view_derived(
        products.len(),
        view.len(),
        spec.sort.as_str(),
        &spec.category.to_string(),
    );
    view
}

/// Derive the ordered product view for `spec`.
pub fn derive_view(products: &[Product], spec: &FilterSpec) -> Vec<Product> {
    derive_view_refs(products, spec).into_iter().cloned().collect()
}
