//! HTTP surface for the assignment engine.
//!
//! Thin command/query boundary over [`AssignmentEngine`] and
//! [`RouteCatalog`]; every business rule lives below this layer. Collaborator
//! calls block on HTTP, so handlers that touch them hop through
//! `spawn_blocking`.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::RouteCatalog;
use crate::engine::AssignmentEngine;
use crate::error::DispatchError;
use crate::model::{Order, OrderId, Route, RouteId, RouteStatus, Stop, StopId, StopResolution};
use crate::traits::{OrderSource, SourceError, VehicleRegistry};

pub struct AppState<S, V> {
    pub catalog: Arc<RouteCatalog>,
    pub engine: Arc<AssignmentEngine<S>>,
    pub registry: V,
}

pub fn router<S, V>(state: Arc<AppState<S, V>>) -> Router
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/routes",
            post(create_route::<S, V>).get(list_routes::<S, V>),
        )
        .route("/routes/:route_id", get(get_route::<S, V>))
        .route("/routes/:route_id/stops", post(create_stop::<S, V>))
        .route(
            "/routes/:route_id/stops/:stop_id",
            delete(delete_stop::<S, V>),
        )
        .route(
            "/routes/:route_id/stops/:stop_id/position",
            patch(move_stop::<S, V>),
        )
        .route(
            "/routes/:route_id/stops/:stop_id/outcome",
            patch(record_outcome::<S, V>),
        )
        .route("/routes/:route_id/status", patch(set_status::<S, V>))
        .route("/orders/pending", get(pending_orders::<S, V>))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub date: NaiveDate,
    pub vehicle_plate: String,
    pub driver_name: String,
    pub capacity_kg: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStopRequest {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStopRequest {
    pub new_position: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRequest {
    pub outcome: StopResolution,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub target_status: RouteStatus,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

/// Route plus the derived figures the planning board renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteView {
    #[serde(flatten)]
    pub route: Route,
    pub current_load_kg: f64,
    pub utilization_pct: f64,
}

impl From<Route> for RouteView {
    fn from(route: Route) -> Self {
        let current_load_kg = route.current_load_kg();
        let utilization_pct = route.utilization_pct();
        Self {
            route,
            current_load_kg,
            utilization_pct,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

pub struct ApiError(pub DispatchError);

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DispatchError::InvalidCapacity { .. }
            | DispatchError::CapacityAboveRated { .. }
            | DispatchError::InvalidPosition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DispatchError::RouteNotFound(_)
            | DispatchError::OrderNotFound(_)
            | DispatchError::StopNotFound { .. } => StatusCode::NOT_FOUND,
            DispatchError::Source(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::CONFLICT,
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a closure that may block on collaborator HTTP off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DispatchError> + Send + 'static,
{
    let joined = tokio::task::spawn_blocking(f).await.map_err(|err| {
        ApiError(DispatchError::Source(SourceError::Transport(format!(
            "worker task failed: {err}"
        ))))
    })?;
    joined.map_err(ApiError)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_route<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Json(body): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<RouteView>), ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let route = run_blocking({
        let state = Arc::clone(&state);
        move || {
            // A plate the registry knows caps the requested capacity at the
            // vehicle's rated figure.
            if let Some(rated_kg) = state.registry.capacity_for(&body.vehicle_plate)? {
                if body.capacity_kg > rated_kg {
                    return Err(DispatchError::CapacityAboveRated {
                        plate: body.vehicle_plate.clone(),
                        requested_kg: body.capacity_kg,
                        rated_kg,
                    });
                }
            }
            state.catalog.create_route(
                body.date,
                body.vehicle_plate,
                body.driver_name,
                body.capacity_kg,
            )
        }
    })
    .await?;
    Ok((StatusCode::CREATED, Json(route.into())))
}

async fn list_routes<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Query(query): Query<DateQuery>,
) -> Json<Vec<RouteView>>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let views = state
        .catalog
        .list_routes(query.date)
        .into_iter()
        .map(RouteView::from)
        .collect();
    Json(views)
}

async fn get_route<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<RouteView>, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let route = state.catalog.snapshot(RouteId(route_id))?;
    Ok(Json(route.into()))
}

async fn create_stop<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path(route_id): Path<Uuid>,
    Json(body): Json<AssignStopRequest>,
) -> Result<(StatusCode, Json<Stop>), ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let stop = run_blocking({
        let state = Arc::clone(&state);
        move || {
            state
                .engine
                .assign_by_id(RouteId(route_id), &OrderId::new(body.order_id))
        }
    })
    .await?;
    Ok((StatusCode::CREATED, Json(stop)))
}

async fn delete_stop<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path((route_id, stop_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    run_blocking({
        let state = Arc::clone(&state);
        move || state.engine.unassign(RouteId(route_id), StopId(stop_id))
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_stop<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path((route_id, stop_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<MoveStopRequest>,
) -> Result<Json<RouteView>, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let route = state
        .engine
        .reorder(RouteId(route_id), StopId(stop_id), body.new_position)?;
    Ok(Json(route.into()))
}

async fn record_outcome<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path((route_id, stop_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<OutcomeRequest>,
) -> Result<Json<Stop>, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let stop = state
        .engine
        .record_outcome(RouteId(route_id), StopId(stop_id), body.outcome)?;
    Ok(Json(stop))
}

async fn set_status<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Path(route_id): Path<Uuid>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<RouteView>, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let route = run_blocking({
        let state = Arc::clone(&state);
        move || state.engine.advance(RouteId(route_id), body.target_status)
    })
    .await?;
    Ok(Json(route.into()))
}

async fn pending_orders<S, V>(
    State(state): State<Arc<AppState<S, V>>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<Order>>, ApiError>
where
    S: OrderSource + Send + Sync + 'static,
    V: VehicleRegistry + Send + Sync + 'static,
{
    let orders = run_blocking({
        let state = Arc::clone(&state);
        move || state.engine.pending_orders(query.date)
    })
    .await?;
    Ok(Json(orders))
}
