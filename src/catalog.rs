//! Route ownership and lookup.
//!
//! The catalog is the sole owner of routes. Each route sits behind its own
//! mutex so mutations against one route serialize while distinct routes
//! proceed in parallel (the engine holds the lock for a whole
//! validate-and-commit unit).

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;

use crate::error::DispatchError;
use crate::model::{Route, RouteId, RouteStatus};

#[derive(Default)]
pub struct RouteCatalog {
    routes: DashMap<RouteId, Arc<Mutex<Route>>>,
    /// Ids in creation order, for stable day listings.
    creation_order: Mutex<Vec<RouteId>>,
}

impl RouteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a route in `PLANNING` with no stops.
    pub fn create_route(
        &self,
        date: NaiveDate,
        vehicle_plate: impl Into<String>,
        driver_name: impl Into<String>,
        capacity_kg: f64,
    ) -> Result<Route, DispatchError> {
        // Written so NaN fails too, not just zero and negatives.
        if !(capacity_kg > 0.0) {
            return Err(DispatchError::InvalidCapacity { capacity_kg });
        }

        let route = Route {
            id: RouteId::new(),
            date,
            vehicle_plate: vehicle_plate.into(),
            driver_name: driver_name.into(),
            capacity_kg,
            status: RouteStatus::Planning,
            stops: Vec::new(),
            created_at: Utc::now(),
        };

        info!(
            route = %route.id,
            plate = %route.vehicle_plate,
            capacity_kg,
            %date,
            "route created"
        );

        self.routes
            .insert(route.id, Arc::new(Mutex::new(route.clone())));
        self.creation_order.lock().push(route.id);
        Ok(route)
    }

    /// Shared handle to a route's lock; the engine's mutation entry point.
    pub fn get(&self, route_id: RouteId) -> Result<Arc<Mutex<Route>>, DispatchError> {
        self.routes
            .get(&route_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(DispatchError::RouteNotFound(route_id))
    }

    /// Point-in-time copy of a route, for read paths.
    pub fn snapshot(&self, route_id: RouteId) -> Result<Route, DispatchError> {
        Ok(self.get(route_id)?.lock().clone())
    }

    /// All routes for a service date, in creation order.
    pub fn list_routes(&self, date: NaiveDate) -> Vec<Route> {
        let order = self.creation_order.lock().clone();
        order
            .iter()
            .filter_map(|id| self.routes.get(id))
            .map(|entry| entry.value().lock().clone())
            .filter(|route| route.date == date)
            .collect()
    }
}
