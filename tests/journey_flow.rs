//! Event tracking through the store, replayed into journey graphs.

use serde_json::json;
use storefront::journey::{journey_for, record_event, EventLog};
use storefront::model::{Event, EventType, UserRole};
use storefront::session::{EventTracker, Session};
use storefront::store::{EventRepository, KvStore};

fn metadata(v: serde_json::Value) -> Option<storefront::model::Metadata> {
    v.as_object().cloned()
}

#[test]
fn buyer_session_becomes_a_chain() {
    let mut store = KvStore::open_in_memory().unwrap();
    let mut buyer = Session::default();
    let buyer_id = buyer
        .login(&mut store, "buyer1@example.com", UserRole::BuyerUser, 1_000)
        .unwrap()
        .id
        .clone();
    let mut seller = Session::default();
    seller
        .login(&mut store, "seller1@example.com", UserRole::SellerUser, 1_000)
        .unwrap();

    let steps = [
        (EventType::Login, 1_000, None),
        (EventType::BrowseProducts, 2_000, None),
        (EventType::ViewProductDetails, 3_000, metadata(json!({ "productId": "p1" }))),
        (EventType::AddToCart, 4_000, metadata(json!({ "productId": "p1", "quantity": 2 }))),
        (EventType::CompletePurchase, 6_000, None),
    ];
    for (event_type, ts, meta) in steps {
        EventTracker::track(&mut store, &buyer, event_type, meta, ts).unwrap();
    }
    // interleaved seller activity must not leak into the buyer's journey
    EventTracker::track(&mut store, &seller, EventType::CreateProduct, None, 2_500).unwrap();

    let log = store.load_events().unwrap();
    assert_eq!(log.len(), 6);

    let graph = journey_for(&log, &buyer_id);
    assert_eq!(graph.nodes.len(), 5);
    assert_eq!(graph.edges.len(), 4);
    let labels: Vec<_> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["LOGIN", "BROWSE PRODUCTS", "VIEW PRODUCT DETAILS", "ADD TO CART", "COMPLETE PURCHASE"]
    );
    for (i, node) in graph.nodes.iter().enumerate() {
        assert_eq!(node.position.x, if i % 2 == 0 { 100.0 } else { 400.0 });
        assert_eq!(node.position.y, 50.0 + 120.0 * i as f64);
    }
    let cart = &graph.nodes[3];
    assert_eq!((cart.icon.as_str(), cart.color.as_str()), ("🛒", "#f093fb"));
    assert_eq!(cart.metadata.as_ref().unwrap()["quantity"], 2);

    for (edge, pair) in graph.edges.iter().zip(graph.nodes.windows(2)) {
        assert_eq!(edge.source, pair[0].id);
        assert_eq!(edge.target, pair[1].id);
        assert_eq!(edge.id, format!("edge-{}-{}", pair[0].id, pair[1].id));
    }
}

#[test]
fn out_of_order_arrivals_are_sorted_by_time() {
    let mut store = KvStore::open_in_memory().unwrap();
    let mut session = Session::default();
    let user_id = session
        .login(&mut store, "late@example.com", UserRole::BuyerUser, 0)
        .unwrap()
        .id
        .clone();
    EventTracker::track(&mut store, &session, EventType::ViewCart, None, 30).unwrap();
    EventTracker::track(&mut store, &session, EventType::Login, None, 10).unwrap();
    EventTracker::track(&mut store, &session, EventType::BrowseProducts, None, 20).unwrap();

    let graph = journey_for(&store.load_events().unwrap(), &user_id);
    let stamps: Vec<_> = graph.nodes.iter().map(|n| n.timestamp).collect();
    assert_eq!(stamps, vec![10, 20, 30]);
    assert_eq!(graph.nodes[2].icon, "📌");
}

#[test]
fn clearing_the_log_empties_every_journey() {
    let mut store = KvStore::open_in_memory().unwrap();
    let mut session = Session::default();
    let user_id = session
        .login(&mut store, "a@example.com", UserRole::Admin, 0)
        .unwrap()
        .id
        .clone();
    EventTracker::track(&mut store, &session, EventType::ViewAdminDashboard, None, 1).unwrap();
    store.clear_events().unwrap();
    assert!(journey_for(&store.load_events().unwrap(), &user_id).is_empty());
}

#[test]
fn log_survives_jsonl_round_trip() {
    let mut store = KvStore::open_in_memory().unwrap();
    let mut session = Session::default();
    let user = session
        .login(&mut store, "j@example.com", UserRole::BuyerUser, 0)
        .unwrap()
        .clone();
    let mut log = EventLog::new();
    for (i, t) in [EventType::Login, EventType::ViewOrders, EventType::Logout].into_iter().enumerate() {
        log = record_event(log, Event::new(&user, t, i as u64, None));
    }

    let jsonl: String = log
        .events()
        .iter()
        .map(|e| serde_json::to_string(e).unwrap() + "\n")
        .collect();
    let mut replayed = EventLog::new();
    for line in jsonl.lines() {
        replayed = record_event(replayed, serde_json::from_str(line).unwrap());
    }

    assert_eq!(replayed.digest().unwrap(), log.digest().unwrap());
    assert_eq!(journey_for(&replayed, &user.id), journey_for(&log, &user.id));
}
