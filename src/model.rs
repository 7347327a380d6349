//! Data model for delivery routes, stops, and the orders they carry.
//!
//! Loads and capacities are kilograms throughout; the plant console tracks
//! a single weight unit upstream.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteId(pub Uuid);

impl RouteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RouteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a stop within a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopId(pub Uuid);

impl StopId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StopId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an order in the upstream order system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery status of an order as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Delivered,
}

/// Outcome of one stop on a delivery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopOutcome {
    Pending,
    Completed,
    Failed,
}

/// Terminal outcome reported by a dispatch-completion event. Distinct from
/// [`StopOutcome`] so a report can never set a stop back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopResolution {
    Completed,
    Failed,
}

impl From<StopResolution> for StopOutcome {
    fn from(resolution: StopResolution) -> Self {
        match resolution {
            StopResolution::Completed => StopOutcome::Completed,
            StopResolution::Failed => StopOutcome::Failed,
        }
    }
}

/// Route progression from planning board to completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Planning,
    Ready,
    InTransit,
    Completed,
}

/// Delivery destination (customer site, collection point, depot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub address: String,
}

/// A pending delivery or collection request supplied by the order system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub destination: Destination,
    pub load_kg: f64,
    pub date: NaiveDate,
    pub status: OrderStatus,
}

/// Snapshot of the order fields a route needs to render and to check
/// capacity without a round trip to the order system. The order itself
/// stays owned upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
    pub id: OrderId,
    pub destination: Destination,
    pub load_kg: f64,
}

impl From<&Order> for OrderRef {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            destination: order.destination.clone(),
            load_kg: order.load_kg,
        }
    }
}

/// One order's position within a route's visiting sequence.
///
/// Sequence numbers are 1-based and contiguous within the owning route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub route_id: RouteId,
    pub sequence: u32,
    pub order: OrderRef,
    pub outcome: StopOutcome,
}

/// A planned delivery run for one vehicle on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub date: NaiveDate,
    pub vehicle_plate: String,
    pub driver_name: String,
    pub capacity_kg: f64,
    pub status: RouteStatus,
    pub stops: Vec<Stop>,
    pub created_at: DateTime<Utc>,
}

impl Route {
    /// Sum of the loads of every stop currently on the route.
    pub fn current_load_kg(&self) -> f64 {
        self.stops.iter().map(|stop| stop.order.load_kg).sum()
    }

    /// Load as a percentage of capacity, for the planning board gauge.
    pub fn utilization_pct(&self) -> f64 {
        if self.capacity_kg <= 0.0 {
            return 0.0;
        }
        self.current_load_kg() / self.capacity_kg * 100.0
    }

    pub fn stop(&self, stop_id: StopId) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.id == stop_id)
    }

    pub fn carries_order(&self, order_id: &OrderId) -> bool {
        self.stops.iter().any(|stop| &stop.order.id == order_id)
    }
}
