//! Test fixtures for dispatch-planner.
//!
//! In-memory collaborators (order pool, vehicle fleet) and builders with
//! sensible defaults. Each suite pulls in what it needs.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use parking_lot::Mutex;

use dispatch_planner::catalog::RouteCatalog;
use dispatch_planner::engine::AssignmentEngine;
use dispatch_planner::model::{Destination, Order, OrderId, OrderStatus};
use dispatch_planner::traits::{OrderSource, SourceError, VehicleRegistry};

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

/// Builder for test orders with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestOrder {
    id: String,
    destination: String,
    load_kg: f64,
    date: NaiveDate,
}

impl TestOrder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            destination: format!("{id} dropoff"),
            load_kg: 100.0,
            date: date(14),
        }
    }

    pub fn load(mut self, kg: f64) -> Self {
        self.load_kg = kg;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn destination(mut self, name: &str) -> Self {
        self.destination = name.to_string();
        self
    }

    pub fn build(self) -> Order {
        Order {
            id: OrderId::new(self.id),
            destination: Destination {
                name: self.destination,
                address: "1 Creamery Rd".to_string(),
            },
            load_kg: self.load_kg,
            date: self.date,
            status: OrderStatus::Pending,
        }
    }
}

/// In-memory order pool implementing [`OrderSource`].
#[derive(Default)]
pub struct InMemoryOrders {
    orders: Mutex<HashMap<OrderId, Order>>,
    /// When set, the next `mark_status` call fails once.
    fail_next_mark: AtomicBool,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, order: TestOrder) -> Self {
        self.add(order.build());
        self
    }

    pub fn add(&self, order: Order) {
        self.orders.lock().insert(order.id.clone(), order);
    }

    pub fn status_of(&self, id: &str) -> Option<OrderStatus> {
        self.orders
            .lock()
            .get(&OrderId::new(id))
            .map(|order| order.status)
    }

    pub fn fail_next_mark(&self) {
        self.fail_next_mark.store(true, Ordering::SeqCst);
    }
}

impl OrderSource for InMemoryOrders {
    fn list_pending(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError> {
        let mut pending: Vec<Order> = self
            .orders
            .lock()
            .values()
            .filter(|order| order.date == date && order.status == OrderStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(pending)
    }

    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, SourceError> {
        Ok(self.orders.lock().get(id).cloned())
    }

    fn mark_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), SourceError> {
        if self.fail_next_mark.swap(false, Ordering::SeqCst) {
            return Err(SourceError::Transport("injected mark failure".to_string()));
        }
        let mut orders = self.orders.lock();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| SourceError::Transport(format!("unknown order {id}")))?;
        order.status = status;
        Ok(())
    }
}

/// Static plate→capacity table implementing [`VehicleRegistry`].
#[derive(Default)]
pub struct StaticFleet {
    capacities: HashMap<String, f64>,
}

impl StaticFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(mut self, plate: &str, capacity_kg: f64) -> Self {
        self.capacities.insert(plate.to_string(), capacity_kg);
        self
    }
}

impl VehicleRegistry for StaticFleet {
    fn capacity_for(&self, plate: &str) -> Result<Option<f64>, SourceError> {
        Ok(self.capacities.get(plate).copied())
    }
}

/// Catalog + engine wired to a shared in-memory order pool.
pub fn engine_with(
    orders: InMemoryOrders,
) -> (
    Arc<RouteCatalog>,
    Arc<InMemoryOrders>,
    AssignmentEngine<Arc<InMemoryOrders>>,
) {
    let catalog = Arc::new(RouteCatalog::new());
    let orders = Arc::new(orders);
    let engine = AssignmentEngine::new(Arc::clone(&catalog), Arc::clone(&orders));
    (catalog, orders, engine)
}
