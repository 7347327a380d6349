//! Stop sequence bookkeeping within a route.
//!
//! Sequence numbers are 1-based and contiguous: after every mutation the
//! stops of a route carry exactly `1..=N`. The engine routes every stop
//! mutation through here; nothing else writes sequence numbers.

use crate::error::DispatchError;
use crate::model::{OrderRef, Route, Stop, StopId, StopOutcome};

/// Append a new stop at position `N+1` for the given order.
pub fn append(route: &mut Route, order: OrderRef) -> Stop {
    let stop = Stop {
        id: StopId::new(),
        route_id: route.id,
        sequence: route.stops.len() as u32 + 1,
        order,
        outcome: StopOutcome::Pending,
    };
    route.stops.push(stop.clone());
    debug_assert!(is_contiguous(&route.stops));
    stop
}

/// Remove a stop and close the gap: every later stop shifts down by one.
pub fn remove(route: &mut Route, stop_id: StopId) -> Result<Stop, DispatchError> {
    let index = position_of(route, stop_id)?;
    let removed = route.stops.remove(index);
    renumber(&mut route.stops);
    debug_assert!(is_contiguous(&route.stops));
    Ok(removed)
}

/// Move a stop to `new_position` (1-based), shifting intervening stops.
pub fn move_to(route: &mut Route, stop_id: StopId, new_position: u32) -> Result<(), DispatchError> {
    let len = route.stops.len() as u32;
    if new_position < 1 || new_position > len {
        return Err(DispatchError::InvalidPosition {
            requested: new_position,
            len,
        });
    }

    let index = position_of(route, stop_id)?;
    let stop = route.stops.remove(index);
    route.stops.insert(new_position as usize - 1, stop);
    renumber(&mut route.stops);
    debug_assert!(is_contiguous(&route.stops));
    Ok(())
}

/// True when the stops carry exactly the sequence numbers `1..=N` in order.
pub fn is_contiguous(stops: &[Stop]) -> bool {
    stops
        .iter()
        .enumerate()
        .all(|(i, stop)| stop.sequence == i as u32 + 1)
}

fn position_of(route: &Route, stop_id: StopId) -> Result<usize, DispatchError> {
    route
        .stops
        .iter()
        .position(|stop| stop.id == stop_id)
        .ok_or(DispatchError::StopNotFound {
            route: route.id,
            stop: stop_id,
        })
}

fn renumber(stops: &mut [Stop]) {
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.sequence = i as u32 + 1;
    }
}
