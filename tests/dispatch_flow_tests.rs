//! Dispatch flow tests
//!
//! Route lifecycle driven through the engine: planning board to completed
//! run, outcome recording, and order settlement on completion.

mod fixtures;

use dispatch_planner::error::DispatchError;
use dispatch_planner::model::{OrderId, OrderStatus, RouteStatus, StopResolution};

use fixtures::{InMemoryOrders, TestOrder, date, engine_with};

#[test]
fn test_empty_route_cannot_be_dispatched() {
    let (catalog, _orders, engine) = engine_with(InMemoryOrders::new().with(TestOrder::new("A")));
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();

    let err = engine.advance(route.id, RouteStatus::Ready).unwrap_err();
    assert!(matches!(err, DispatchError::EmptyRoute));

    engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    let route = engine.advance(route.id, RouteStatus::Ready).unwrap();
    assert_eq!(route.status, RouteStatus::Ready);
}

#[test]
fn test_completion_requires_every_outcome() {
    let (catalog, _orders, engine) = engine_with(
        InMemoryOrders::new()
            .with(TestOrder::new("A"))
            .with(TestOrder::new("B")),
    );
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop_a = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    let stop_b = engine.assign_by_id(route.id, &OrderId::new("B")).unwrap();
    engine.advance(route.id, RouteStatus::Ready).unwrap();
    engine.advance(route.id, RouteStatus::InTransit).unwrap();

    engine
        .record_outcome(route.id, stop_a.id, StopResolution::Completed)
        .unwrap();
    let err = engine
        .advance(route.id, RouteStatus::Completed)
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::IncompleteDelivery { pending: 1 }
    ));

    engine
        .record_outcome(route.id, stop_b.id, StopResolution::Completed)
        .unwrap();
    let route = engine.advance(route.id, RouteStatus::Completed).unwrap();
    assert_eq!(route.status, RouteStatus::Completed);
}

#[test]
fn test_completion_settles_orders_and_releases_claims() {
    let (catalog, orders, engine) = engine_with(
        InMemoryOrders::new()
            .with(TestOrder::new("A"))
            .with(TestOrder::new("B")),
    );
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop_a = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    let stop_b = engine.assign_by_id(route.id, &OrderId::new("B")).unwrap();
    engine.advance(route.id, RouteStatus::Ready).unwrap();
    engine.advance(route.id, RouteStatus::InTransit).unwrap();
    engine
        .record_outcome(route.id, stop_a.id, StopResolution::Completed)
        .unwrap();
    engine
        .record_outcome(route.id, stop_b.id, StopResolution::Failed)
        .unwrap();
    engine.advance(route.id, RouteStatus::Completed).unwrap();

    // Delivered stop settles the order; the failed drop goes back to the
    // pool and can be planned onto a fresh route.
    assert_eq!(orders.status_of("A"), Some(OrderStatus::Delivered));
    assert_eq!(orders.status_of("B"), Some(OrderStatus::Pending));

    let retry = catalog
        .create_route(date(15), "DP-002", "R. Patel", 800.0)
        .unwrap();
    engine.assign_by_id(retry.id, &OrderId::new("B")).unwrap();
}

#[test]
fn test_outcomes_only_recordable_in_transit() {
    let (catalog, _orders, engine) = engine_with(InMemoryOrders::new().with(TestOrder::new("A")));
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();

    let err = engine
        .record_outcome(route.id, stop.id, StopResolution::Completed)
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::RouteNotOpen {
            status: RouteStatus::Planning
        }
    ));
}

#[test]
fn test_outcome_is_written_once() {
    let (catalog, _orders, engine) = engine_with(InMemoryOrders::new().with(TestOrder::new("A")));
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    engine.advance(route.id, RouteStatus::Ready).unwrap();
    engine.advance(route.id, RouteStatus::InTransit).unwrap();

    engine
        .record_outcome(route.id, stop.id, StopResolution::Failed)
        .unwrap();
    let err = engine
        .record_outcome(route.id, stop.id, StopResolution::Completed)
        .unwrap_err();
    assert!(matches!(err, DispatchError::StopAlreadyResolved { .. }));
}

#[test]
fn test_pending_stop_can_be_skipped_mid_run() {
    // Dispatch can still pull an undelivered stop off an in-transit route;
    // a resolved stop is history.
    let (catalog, orders, engine) = engine_with(
        InMemoryOrders::new()
            .with(TestOrder::new("A"))
            .with(TestOrder::new("B")),
    );
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop_a = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    let stop_b = engine.assign_by_id(route.id, &OrderId::new("B")).unwrap();
    engine.advance(route.id, RouteStatus::Ready).unwrap();
    engine.advance(route.id, RouteStatus::InTransit).unwrap();

    engine
        .record_outcome(route.id, stop_a.id, StopResolution::Completed)
        .unwrap();

    engine.unassign(route.id, stop_b.id).unwrap();
    assert_eq!(orders.status_of("B"), Some(OrderStatus::Pending));

    let err = engine.unassign(route.id, stop_a.id).unwrap_err();
    assert!(matches!(err, DispatchError::StopAlreadyResolved { .. }));

    let route = engine.advance(route.id, RouteStatus::Completed).unwrap();
    assert_eq!(route.status, RouteStatus::Completed);
}

#[test]
fn test_lifecycle_cannot_skip_or_reverse_through_engine() {
    let (catalog, _orders, engine) = engine_with(InMemoryOrders::new().with(TestOrder::new("A")));
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();

    for target in [RouteStatus::InTransit, RouteStatus::Completed] {
        let err = engine.advance(route.id, target).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::InvalidStatusTransition { .. }
        ));
    }

    engine.advance(route.id, RouteStatus::Ready).unwrap();
    let err = engine.advance(route.id, RouteStatus::Planning).unwrap_err();
    assert!(matches!(err, DispatchError::InvalidStatusTransition { .. }));
}

#[test]
fn test_completed_route_is_retained_for_reporting() {
    let (catalog, _orders, engine) = engine_with(InMemoryOrders::new().with(TestOrder::new("A")));
    let route = catalog
        .create_route(date(14), "DP-001", "M. Jensen", 800.0)
        .unwrap();
    let stop = engine.assign_by_id(route.id, &OrderId::new("A")).unwrap();
    engine.advance(route.id, RouteStatus::Ready).unwrap();
    engine.advance(route.id, RouteStatus::InTransit).unwrap();
    engine
        .record_outcome(route.id, stop.id, StopResolution::Completed)
        .unwrap();
    engine.advance(route.id, RouteStatus::Completed).unwrap();

    // Still listed for the day, stops intact.
    let listed = catalog.list_routes(date(14));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, RouteStatus::Completed);
    assert_eq!(listed[0].stops.len(), 1);
}
