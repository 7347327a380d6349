//! Error taxonomy for the assignment engine.
//!
//! Every variant is a business-rule rejection: the mutation was checked and
//! refused before any state changed. Transient data-store faults surface as
//! [`DispatchError::Source`] and are the caller's concern to retry.

use thiserror::Error;

use crate::model::{OrderId, RouteId, RouteStatus, StopId};
use crate::traits::SourceError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("capacity must be greater than zero, got {capacity_kg}kg")]
    InvalidCapacity { capacity_kg: f64 },

    #[error("requested capacity {requested_kg}kg exceeds rated capacity {rated_kg}kg for vehicle {plate}")]
    CapacityAboveRated {
        plate: String,
        requested_kg: f64,
        rated_kg: f64,
    },

    #[error("route {0} not found")]
    RouteNotFound(RouteId),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("stop {stop} not found on route {route}")]
    StopNotFound { route: RouteId, stop: StopId },

    #[error("order {order} is already assigned to route {route}")]
    OrderAlreadyAssigned { order: OrderId, route: RouteId },

    #[error("capacity exceeded by {overage_kg:.1}kg ({load_kg:.1}kg of {capacity_kg:.1}kg)")]
    CapacityExceeded {
        overage_kg: f64,
        load_kg: f64,
        capacity_kg: f64,
    },

    #[error("route is {status:?} and no longer accepts stop changes")]
    RouteNotOpen { status: RouteStatus },

    #[error("stop {stop} already has a recorded outcome and cannot be changed")]
    StopAlreadyResolved { stop: StopId },

    #[error("position {requested} is outside the valid range 1..={len}")]
    InvalidPosition { requested: u32, len: u32 },

    #[error("cannot move route from {from:?} to {to:?}")]
    InvalidStatusTransition { from: RouteStatus, to: RouteStatus },

    #[error("route has no stops and cannot be marked ready")]
    EmptyRoute,

    #[error("{pending} stop(s) still pending delivery; record every outcome before completing")]
    IncompleteDelivery { pending: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl DispatchError {
    /// Stable machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCapacity { .. } | Self::CapacityAboveRated { .. } => "INVALID_CAPACITY",
            Self::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::StopNotFound { .. } => "STOP_NOT_FOUND",
            Self::OrderAlreadyAssigned { .. } => "ORDER_ALREADY_ASSIGNED",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::RouteNotOpen { .. } => "ROUTE_NOT_OPEN",
            Self::StopAlreadyResolved { .. } => "STOP_ALREADY_RESOLVED",
            Self::InvalidPosition { .. } => "INVALID_POSITION",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::EmptyRoute => "EMPTY_ROUTE",
            Self::IncompleteDelivery { .. } => "INCOMPLETE_DELIVERY",
            Self::Source(_) => "SOURCE_ERROR",
        }
    }
}
