//! The capacity-assignment engine.
//!
//! Every stop mutation runs as one unit of work under the target route's
//! mutex: read load and capacity, validate, commit. The cross-route rule
//! that an order sits on at most one route is enforced by a claim ledger
//! keyed by order id; claiming is a compare-and-swap inside the critical
//! section, so two dispatchers cannot double-book an order or both pass a
//! stale capacity check.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{info, warn};

use crate::catalog::RouteCatalog;
use crate::error::DispatchError;
use crate::lifecycle;
use crate::model::{
    Order, OrderId, OrderRef, OrderStatus, Route, RouteId, RouteStatus, Stop, StopId,
    StopOutcome, StopResolution,
};
use crate::sequence;
use crate::traits::OrderSource;

pub struct AssignmentEngine<S> {
    catalog: Arc<RouteCatalog>,
    source: S,
    /// Which route currently holds each assigned order.
    claims: DashMap<OrderId, RouteId>,
}

impl<S: OrderSource> AssignmentEngine<S> {
    pub fn new(catalog: Arc<RouteCatalog>, source: S) -> Self {
        Self {
            catalog,
            source,
            claims: DashMap::new(),
        }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// Pending order pool for the dispatcher's board.
    pub fn pending_orders(&self, date: NaiveDate) -> Result<Vec<Order>, DispatchError> {
        Ok(self.source.list_pending(date)?)
    }

    /// Resolve the order through the source, then assign it.
    ///
    /// Route existence is the first precondition, so an unknown route
    /// reports before an unknown order does.
    pub fn assign_by_id(
        &self,
        route_id: RouteId,
        order_id: &OrderId,
    ) -> Result<Stop, DispatchError> {
        self.catalog.get(route_id)?;
        let order = self
            .source
            .fetch(order_id)?
            .ok_or_else(|| DispatchError::OrderNotFound(order_id.clone()))?;
        self.assign(route_id, &order)
    }

    /// Assign a pending order to a route, appending a stop at position N+1.
    ///
    /// This is the only way an order moves `PENDING → ASSIGNED`. The
    /// mutation either fully commits or leaves no trace: the claim is taken
    /// only after the capacity check passes, and released again if the
    /// upstream status flip fails.
    pub fn assign(&self, route_id: RouteId, order: &Order) -> Result<Stop, DispatchError> {
        let handle = self.catalog.get(route_id)?;
        let mut route = handle.lock();

        if !lifecycle::accepts_stops(route.status) {
            return Err(DispatchError::RouteNotOpen {
                status: route.status,
            });
        }

        if order.status != OrderStatus::Pending {
            let holder = self
                .claims
                .get(&order.id)
                .map(|entry| *entry.value())
                .unwrap_or(route_id);
            return Err(DispatchError::OrderAlreadyAssigned {
                order: order.id.clone(),
                route: holder,
            });
        }

        let load_kg = route.current_load_kg() + order.load_kg;
        if load_kg > route.capacity_kg {
            return Err(DispatchError::CapacityExceeded {
                overage_kg: load_kg - route.capacity_kg,
                load_kg,
                capacity_kg: route.capacity_kg,
            });
        }

        // Atomic claim: losing the race here means another route got the
        // order between our status read and now.
        match self.claims.entry(order.id.clone()) {
            Entry::Occupied(entry) => {
                return Err(DispatchError::OrderAlreadyAssigned {
                    order: order.id.clone(),
                    route: *entry.get(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(route_id);
            }
        }

        if let Err(err) = self.source.mark_status(&order.id, OrderStatus::Assigned) {
            self.claims.remove(&order.id);
            return Err(err.into());
        }

        let stop = sequence::append(&mut route, OrderRef::from(order));
        info!(
            route = %route_id,
            order = %order.id,
            sequence = stop.sequence,
            load_kg,
            capacity_kg = route.capacity_kg,
            "stop assigned"
        );
        Ok(stop)
    }

    /// Remove a stop and return its order, back in the pending pool.
    ///
    /// Only stops whose outcome is still pending can be unassigned; a
    /// delivered or failed stop is history.
    pub fn unassign(&self, route_id: RouteId, stop_id: StopId) -> Result<Order, DispatchError> {
        let handle = self.catalog.get(route_id)?;
        let mut route = handle.lock();

        let stop = route.stop(stop_id).ok_or(DispatchError::StopNotFound {
            route: route_id,
            stop: stop_id,
        })?;
        if stop.outcome != StopOutcome::Pending {
            return Err(DispatchError::StopAlreadyResolved { stop: stop_id });
        }
        let order_id = stop.order.id.clone();

        // Flip upstream first: if that fails nothing has changed locally.
        self.source.mark_status(&order_id, OrderStatus::Pending)?;

        let removed = sequence::remove(&mut route, stop_id)?;
        self.claims.remove(&order_id);
        info!(route = %route_id, order = %order_id, "stop unassigned");
        Ok(Order {
            id: removed.order.id,
            destination: removed.order.destination,
            load_kg: removed.order.load_kg,
            date: route.date,
            status: OrderStatus::Pending,
        })
    }

    /// Move a stop to a new 1-based position in the visiting sequence.
    pub fn reorder(
        &self,
        route_id: RouteId,
        stop_id: StopId,
        new_position: u32,
    ) -> Result<Route, DispatchError> {
        let handle = self.catalog.get(route_id)?;
        let mut route = handle.lock();

        if !lifecycle::accepts_stops(route.status) {
            return Err(DispatchError::RouteNotOpen {
                status: route.status,
            });
        }

        sequence::move_to(&mut route, stop_id, new_position)?;
        Ok(route.clone())
    }

    /// Ingress for a dispatch-completion event: record one stop's outcome.
    ///
    /// Valid only while the route is on the road; each stop's outcome is
    /// written once. Upstream order status is settled when the whole route
    /// completes.
    pub fn record_outcome(
        &self,
        route_id: RouteId,
        stop_id: StopId,
        resolution: StopResolution,
    ) -> Result<Stop, DispatchError> {
        let handle = self.catalog.get(route_id)?;
        let mut route = handle.lock();

        if route.status != RouteStatus::InTransit {
            return Err(DispatchError::RouteNotOpen {
                status: route.status,
            });
        }

        let stop = route
            .stops
            .iter_mut()
            .find(|stop| stop.id == stop_id)
            .ok_or(DispatchError::StopNotFound {
                route: route_id,
                stop: stop_id,
            })?;
        if stop.outcome != StopOutcome::Pending {
            return Err(DispatchError::StopAlreadyResolved { stop: stop_id });
        }

        stop.outcome = resolution.into();
        let stop = stop.clone();
        info!(route = %route_id, stop = %stop_id, outcome = ?stop.outcome, "outcome recorded");
        Ok(stop)
    }

    /// Advance the route lifecycle one step.
    ///
    /// Completing a route settles its orders: delivered stops mark their
    /// orders `DELIVERED`, failed stops return theirs to `PENDING` for
    /// re-dispatch, and every claim is released.
    pub fn advance(&self, route_id: RouteId, target: RouteStatus) -> Result<Route, DispatchError> {
        let handle = self.catalog.get(route_id)?;
        let mut route = handle.lock();

        lifecycle::advance(&mut route, target)?;
        info!(route = %route_id, status = ?route.status, "route advanced");

        if route.status == RouteStatus::Completed {
            self.settle_completed(&route);
        }

        Ok(route.clone())
    }

    /// Release claims and push final order statuses upstream after the
    /// `COMPLETED` transition has committed. A failed upstream flip is
    /// logged and skipped; the order system re-syncs from route history.
    fn settle_completed(&self, route: &Route) {
        for stop in &route.stops {
            self.claims.remove(&stop.order.id);
            let status = match stop.outcome {
                StopOutcome::Completed => OrderStatus::Delivered,
                // IncompleteDelivery guard ran already, so anything not
                // completed is a failed drop going back to the pool.
                StopOutcome::Failed | StopOutcome::Pending => OrderStatus::Pending,
            };
            if let Err(err) = self.source.mark_status(&stop.order.id, status) {
                warn!(
                    route = %route.id,
                    order = %stop.order.id,
                    ?status,
                    %err,
                    "failed to settle order status upstream"
                );
            }
        }
    }
}
