//! Plant backend HTTP adapter for orders and vehicles.
//!
//! Implements [`OrderSource`] and [`VehicleRegistry`] against the plant
//! operations REST API. Calls block; async callers should hop through
//! `spawn_blocking` (the [`crate::api`] handlers do).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Destination, Order, OrderId, OrderStatus};
use crate::traits::{OrderSource, SourceError, VehicleRegistry};

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlantBackend {
    config: BackendConfig,
    client: reqwest::blocking::Client,
}

impl PlantBackend {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl OrderSource for PlantBackend {
    fn list_pending(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError> {
        let url = format!(
            "{}/api/orders?status=PENDING&date={}",
            self.config.base_url, date
        );
        let body: OrderListResponse = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())?
            .json()?;

        Ok(body.orders.into_iter().map(OrderDto::into_order).collect())
    }

    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, SourceError> {
        let url = format!("{}/api/orders/{}", self.config.base_url, id);
        let response = self.client.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: OrderDto = response.error_for_status()?.json()?;
        Ok(Some(body.into_order()))
    }

    fn mark_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), SourceError> {
        let url = format!("{}/api/orders/{}/status", self.config.base_url, id);
        self.client
            .patch(url)
            .json(&StatusBody { status })
            .send()
            .and_then(|resp| resp.error_for_status())?;
        Ok(())
    }
}

impl VehicleRegistry for PlantBackend {
    fn capacity_for(&self, plate: &str) -> Result<Option<f64>, SourceError> {
        let url = format!("{}/api/vehicles/{}", self.config.base_url, plate);
        let response = self.client.get(url).send()?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: VehicleDto = response.error_for_status()?.json()?;
        Ok(Some(body.capacity_kg))
    }
}

#[derive(Debug, Deserialize)]
struct OrderListResponse {
    orders: Vec<OrderDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDto {
    id: String,
    destination_name: String,
    destination_address: String,
    load_kg: f64,
    date: NaiveDate,
    status: OrderStatus,
}

impl OrderDto {
    fn into_order(self) -> Order {
        Order {
            id: OrderId::new(self.id),
            destination: Destination {
                name: self.destination_name,
                address: self.destination_address,
            },
            load_kg: self.load_kg,
            date: self.date,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleDto {
    capacity_kg: f64,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: OrderStatus,
}
