use std::collections::HashSet;

use anyhow::Result;
use serde::Serialize;

use crate::journey::EventLog;
use crate::model::{Event, Order, OrderStatus, Product, User, UserRole};
use crate::store::{EventRepository, OrderRepository, ProductRepository, UserRepository};

/// Admin dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_sellers: usize,
    pub total_buyers: usize,
    pub total_products: usize,
    pub total_orders: usize,
    /// Sum over orders that were not cancelled
    pub total_revenue: f64,
    pub total_events: usize,
    pub active_sellers: usize,
    pub active_buyers: usize,
    pub recent_events: Vec<Event>,
}

impl DashboardMetrics {
    pub fn compute(
        users: &[User],
        products: &[Product],
        orders: &[Order],
        events: &EventLog,
        recent_limit: usize,
    ) -> Self {
        let count_role = |role: UserRole| users.iter().filter(|u| u.role == role).count();
        let active_role = |role: UserRole| {
            events
                .events()
                .iter()
                .filter(|e| e.user_role == role)
                .map(|e| e.user_id.as_str())
                .collect::<HashSet<_>>()
                .len()
        };

        Self {
            total_sellers: count_role(UserRole::SellerUser),
            total_buyers: count_role(UserRole::BuyerUser),
            total_products: products.len(),
            total_orders: orders.len(),
            total_revenue: orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total_amount)
                .sum(),
            total_events: events.len(),
            active_sellers: active_role(UserRole::SellerUser),
            active_buyers: active_role(UserRole::BuyerUser),
            recent_events: events.recent(recent_limit).into_iter().cloned().collect(),
        }
    }

    /// Compute straight from a store.
    pub fn from_store<S>(store: &S, recent_limit: usize) -> Result<Self>
    where
        S: UserRepository + ProductRepository + OrderRepository + EventRepository,
    {
        let users = store.all_users()?;
        let products = store.all_products()?;
        let orders = store.all_orders()?;
        let events = store.load_events()?;
        Ok(Self::compute(&users, &products, &orders, &events, recent_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventType;

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            email: format!("{id}@example.com"),
            name: id.into(),
            role,
            created_at: 0,
            avatar: None,
        }
    }

    fn order(total: f64, status: OrderStatus) -> Order {
        Order {
            id: "o".into(),
            buyer_id: "b1".into(),
            buyer_name: "b1".into(),
            items: Vec::new(),
            total_amount: total,
            status,
            shipping_address: "addr".into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn counts_roles_activity_and_revenue() {
        let users = vec![
            user("a", UserRole::Admin),
            user("s1", UserRole::SellerUser),
            user("s2", UserRole::SellerUser),
            user("b1", UserRole::BuyerUser),
        ];
        let mut log = EventLog::new();
        log.record(Event::new(&users[1], EventType::Login, 1, None));
        log.record(Event::new(&users[1], EventType::CreateProduct, 2, None));
        log.record(Event::new(&users[3], EventType::Login, 3, None));
        log.record(Event::new(&users[0], EventType::ViewMetrics, 4, None));
        let orders = vec![order(20.0, OrderStatus::Pending), order(5.0, OrderStatus::Cancelled)];

        let m = DashboardMetrics::compute(&users, &[], &orders, &log, 2);
        assert_eq!((m.total_sellers, m.total_buyers), (2, 1));
        assert_eq!((m.active_sellers, m.active_buyers), (1, 1));
        assert_eq!(m.total_orders, 2);
        assert_eq!(m.total_revenue, 20.0);
        assert_eq!(m.total_events, 4);
        let recent: Vec<_> = m.recent_events.iter().map(|e| e.timestamp).collect();
        assert_eq!(recent, vec![4, 3]);
    }

    #[test]
    fn empty_inputs() {
        let m = DashboardMetrics::compute(&[], &[], &[], &EventLog::new(), 10);
        assert_eq!(m.total_events, 0);
        assert!(m.recent_events.is_empty());
    }
}
