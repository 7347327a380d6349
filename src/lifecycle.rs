//! Route status state machine.
//!
//! `PLANNING → READY → IN_TRANSIT → COMPLETED`, strictly forward, one step
//! at a time. Guards:
//! - `PLANNING → READY` needs at least one stop.
//! - `IN_TRANSIT → COMPLETED` needs every stop outcome recorded.
//!
//! Individual stop outcomes arrive from dispatch-completion events (see
//! [`crate::engine::AssignmentEngine::record_outcome`]); this module only
//! validates the aggregate condition.

use crate::error::DispatchError;
use crate::model::{Route, RouteStatus, StopOutcome};

/// The single legal next state, if any.
pub fn successor(status: RouteStatus) -> Option<RouteStatus> {
    match status {
        RouteStatus::Planning => Some(RouteStatus::Ready),
        RouteStatus::Ready => Some(RouteStatus::InTransit),
        RouteStatus::InTransit => Some(RouteStatus::Completed),
        RouteStatus::Completed => None,
    }
}

/// Whether a route in this status still accepts new stops.
pub fn accepts_stops(status: RouteStatus) -> bool {
    matches!(status, RouteStatus::Planning | RouteStatus::Ready)
}

/// Advance a route to `target`, enforcing the transition guards.
///
/// The route is only written when every guard passes.
pub fn advance(route: &mut Route, target: RouteStatus) -> Result<(), DispatchError> {
    if successor(route.status) != Some(target) {
        return Err(DispatchError::InvalidStatusTransition {
            from: route.status,
            to: target,
        });
    }

    match target {
        RouteStatus::Ready => {
            if route.stops.is_empty() {
                return Err(DispatchError::EmptyRoute);
            }
        }
        RouteStatus::Completed => {
            let pending = route
                .stops
                .iter()
                .filter(|stop| stop.outcome == StopOutcome::Pending)
                .count();
            if pending > 0 {
                return Err(DispatchError::IncompleteDelivery { pending });
            }
        }
        RouteStatus::InTransit | RouteStatus::Planning => {}
    }

    route.status = target;
    Ok(())
}
