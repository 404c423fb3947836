use serde::{Deserialize, Serialize};

/// Product ids a user saved for later, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    product_ids: Vec<String>,
}

impl Wishlist {
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    /// No-op if already present.
    pub fn add(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            return false;
        }
        self.product_ids.push(product_id.to_string());
        true
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.product_ids.len();
        self.product_ids.retain(|id| id != product_id);
        self.product_ids.len() != before
    }

    /// Returns whether the product is in the wishlist afterwards.
    pub fn toggle(&mut self, product_id: &str) -> bool {
        if self.remove(product_id) {
            false
        } else {
            self.add(product_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut w = Wishlist::default();
        assert!(w.add("p1"));
        assert!(!w.add("p1"));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn toggle_flips_membership() {
        let mut w = Wishlist::default();
        assert!(w.toggle("p1"));
        assert!(w.contains("p1"));
        assert!(!w.toggle("p1"));
        assert!(w.is_empty());
    }

    #[test]
    fn keeps_insertion_order() {
        let mut w = Wishlist::default();
        w.add("b");
        w.add("a");
        w.add("c");
        w.remove("a");
        assert_eq!(w.product_ids(), &["b".to_string(), "c".to_string()]);
    }
}
