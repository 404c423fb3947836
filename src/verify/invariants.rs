use std::fmt;

use crate::model::{CartItem, NewProduct, Order, Product, ProductStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub field: &'static str,
    pub msg: String,
}

impl InvariantViolation {
    fn new(field: &'static str, msg: &str) -> Self {
        Self {
            field,
            msg: msg.to_string(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.msg)
    }
}

impl std::error::Error for InvariantViolation {}

/// Listing checks shared by create and update paths.
fn check_listing(
    name: &str,
    description: &str,
    brand: &str,
    price: f64,
    status: ProductStatus,
    images: &[String],
) -> Result<(), InvariantViolation> {
    if name.trim().is_empty() {
        return Err(InvariantViolation::new("name", "product name is required"));
    }
    if description.trim().is_empty() {
        return Err(InvariantViolation::new("description", "description is required"));
    }
    if brand.trim().is_empty() {
        return Err(InvariantViolation::new("brand", "brand is required"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(InvariantViolation::new("price", "price must be a finite non-negative number"));
    }
    if status == ProductStatus::Active && price <= 0.0 {
        return Err(InvariantViolation::new("price", "active products need a positive price"));
    }
    if !images.iter().any(|img| !img.trim().is_empty()) {
        return Err(InvariantViolation::new("images", "at least one product image is required"));
    }
    Ok(())
}

pub fn assert_new_product(input: &NewProduct) -> Result<(), InvariantViolation> {
    check_listing(
        &input.name,
        &input.description,
        &input.brand,
        input.price,
        input.status,
        &input.images,
    )
}

pub fn assert_product_invariants(product: &Product) -> Result<(), InvariantViolation> {
    check_listing(
        &product.name,
        &product.description,
        &product.brand,
        product.price,
        product.status,
        &product.images,
    )?;
    if !(0.0..=5.0).contains(&product.rating) {
        return Err(InvariantViolation::new("rating", "rating must be within 0..=5"));
    }
    Ok(())
}

pub fn assert_cart_item(item: &CartItem) -> Result<(), InvariantViolation> {
    if item.quantity == 0 {
        return Err(InvariantViolation::new("quantity", "quantity must be at least 1"));
    }
    if item.quantity > item.product.stock {
        return Err(InvariantViolation::new("quantity", "quantity exceeds stock"));
    }
    Ok(())
}

pub fn assert_order_total(order: &Order, tolerance: f64) -> Result<(), InvariantViolation> {
    let expected: f64 = order.items.iter().map(CartItem::line_total).sum();
    if (order.total_amount - expected).abs() > tolerance {
        return Err(InvariantViolation::new(
            "total_amount",
            "total not consistent with item prices",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductCategory;
    use std::collections::BTreeMap;

    fn input() -> NewProduct {
        NewProduct {
            seller_id: "seller-1".into(),
            seller_name: "Seller One".into(),
            name: "Yoga Mat Premium".into(),
            description: "Thick mat".into(),
            category: ProductCategory::Sports,
            price: 29.99,
            original_price: None,
            discount: None,
            stock: 3,
            images: vec!["https://img/mat".into()],
            specifications: BTreeMap::new(),
            brand: "FitLife".into(),
            weight: None,
            dimensions: None,
            warranty: None,
            return_policy: None,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn accepts_valid_listing() {
        assert!(assert_new_product(&input()).is_ok());
    }

    #[test]
    fn active_needs_positive_price() {
        let mut p = input();
        p.price = 0.0;
        assert_eq!(assert_new_product(&p).unwrap_err().field, "price");
        p.status = ProductStatus::Inactive;
        assert!(assert_new_product(&p).is_ok());
    }

    #[test]
    fn blank_images_do_not_count() {
        let mut p = input();
        p.images = vec!["  ".into(), String::new()];
        assert_eq!(assert_new_product(&p).unwrap_err().field, "images");
    }

    #[test]
    fn rating_out_of_range() {
        let mut product = input().into_product("p".into(), 0);
        product.rating = 5.5;
        assert_eq!(assert_product_invariants(&product).unwrap_err().field, "rating");
    }

    #[test]
    fn cart_quantity_bounded_by_stock() {
        let product = input().into_product("p".into(), 0);
        let item = CartItem { product, quantity: 4 };
        assert!(assert_cart_item(&item).is_err());
    }
}
