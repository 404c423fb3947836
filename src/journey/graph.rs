//! Journey graph: one node per event, one edge per chronological step.

use serde::{Deserialize, Serialize};

use super::EventLog;
use crate::logging::log_journey;
use crate::model::{Event, EventType, Metadata, Timestamp};

const ORIGIN_X: f64 = 100.0;
const ORIGIN_Y: f64 = 50.0;
const HORIZONTAL_SPACING: f64 = 300.0;
const VERTICAL_SPACING: f64 = 120.0;

/// Visual attributes of a node, fixed per event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStyle {
    pub icon: &'static str,
    pub color: &'static str,
}

impl NodeStyle {
    pub const DEFAULT: NodeStyle = NodeStyle { icon: "📌", color: "#6c757d" };

    const fn new(icon: &'static str, color: &'static str) -> Self {
        Self { icon, color }
    }
}

/// Style lookup. Every variant is named so a new event type must be placed
/// explicitly; the listed ones without a dedicated look share the default.
pub fn style_for(event_type: EventType) -> NodeStyle {
    match event_type {
        EventType::Login => NodeStyle::new("🔐", "#28a745"),
        EventType::Logout => NodeStyle::new("🚪", "#6c757d"),
        EventType::BrowseProducts => NodeStyle::new("👀", "#4facfe"),
        EventType::ViewProductDetails => NodeStyle::new("🔍", "#667eea"),
        EventType::AddToCart => NodeStyle::new("🛒", "#f093fb"),
        EventType::RemoveFromCart => NodeStyle::new("❌", "#dc3545"),
        EventType::ProceedToCheckout => NodeStyle::new("💳", "#ffc107"),
        EventType::CompletePurchase => NodeStyle::new("✅", "#28a745"),
        EventType::CreateProduct => NodeStyle::new("➕", "#17a2b8"),
        EventType::EditProduct => NodeStyle::new("✏️", "#ffc107"),
        EventType::DeleteProduct => NodeStyle::new("🗑️", "#dc3545"),
        EventType::ViewSellerDashboard => NodeStyle::new("📦", "#f5576c"),
        EventType::ViewAdminDashboard => NodeStyle::new("📊", "#4facfe"),
        EventType::ViewUserJourney => NodeStyle::new("🗺️", "#667eea"),
        EventType::ViewCart
        | EventType::ViewOrders
        | EventType::ViewProductList
        | EventType::ViewSellersList
        | EventType::ViewBuyersList
        | EventType::ViewMetrics
        | EventType::Unknown => NodeStyle::DEFAULT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyNode {
    /// Id of the event this node stands for
    pub id: String,
    pub event_type: EventType,
    pub label: String,
    pub icon: String,
    pub color: String,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JourneyGraph {
    pub nodes: Vec<JourneyNode>,
    pub edges: Vec<JourneyEdge>,
}

impl JourneyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The event behind a node, for detail panels.
    pub fn node(&self, id: &str) -> Option<&JourneyNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn node_at(index: usize, event: &Event) -> JourneyNode {
    let style = style_for(event.event_type);
    let x = if index % 2 == 0 {
        ORIGIN_X
    } else {
        ORIGIN_X + HORIZONTAL_SPACING
    };
    JourneyNode {
        id: event.id.clone(),
        event_type: event.event_type,
        label: event.event_type.label(),
        icon: style.icon.to_string(),
        color: style.color.to_string(),
        timestamp: event.timestamp,
        metadata: event.metadata.clone(),
        position: Position {
            x,
            y: ORIGIN_Y + VERTICAL_SPACING * index as f64,
        },
    }
}

/// Rebuild the journey of `user_id` from the log.
///
/// N matching events yield N nodes and N-1 edges; an unknown user yields an
/// empty graph.
pub fn journey_for(log: &EventLog, user_id: &str) -> JourneyGraph {
    let mut events = log.events_for(user_id);
    // stable: equal timestamps keep recording order
    events.sort_by_key(|e| e.timestamp);

    let nodes: Vec<JourneyNode> = events
        .iter()
        .enumerate()
        .map(|(i, e)| node_at(i, e))
        .collect();

    let edges: Vec<JourneyEdge> = events
        .windows(2)
        .map(|pair| JourneyEdge {
            id: format!("edge-{}-{}", pair[0].id, pair[1].id),
            source: pair[0].id.clone(),
            target: pair[1].id.clone(),
        })
        .collect();

    log_journey(user_id, nodes.len(), edges.len());
    JourneyGraph { nodes, edges }
}
