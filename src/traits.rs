//! External collaborator seams.
//!
//! The engine never owns orders or vehicles; it reads them through these
//! traits and flips order status back through [`OrderSource::mark_status`].
//! Concrete apps implement them for their own backends (see
//! [`crate::backend`] for the plant REST adapter, and the test suites for
//! in-memory fixtures).

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Order, OrderId, OrderStatus};

/// Failure while talking to a collaborator backend.
///
/// These are transport-level faults, not business rejections; retrying with
/// backoff is the caller's decision.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// Supplies the day's order pool and accepts status flips.
pub trait OrderSource {
    /// All orders still pending for the given service date.
    fn list_pending(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError>;

    /// Look up a single order by id.
    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, SourceError>;

    /// Flip an order's status. The engine is the only caller and only ever
    /// writes the statuses it owns the transitions for.
    fn mark_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), SourceError>;
}

/// Supplies vehicle identity and rated capacity by plate number.
pub trait VehicleRegistry {
    /// Rated capacity in kilograms, or `None` for an unknown plate.
    fn capacity_for(&self, plate: &str) -> Result<Option<f64>, SourceError>;
}

impl<T: OrderSource + ?Sized> OrderSource for std::sync::Arc<T> {
    fn list_pending(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError> {
        (**self).list_pending(date)
    }

    fn fetch(&self, id: &OrderId) -> Result<Option<Order>, SourceError> {
        (**self).fetch(id)
    }

    fn mark_status(&self, id: &OrderId, status: OrderStatus) -> Result<(), SourceError> {
        (**self).mark_status(id, status)
    }
}

impl<T: VehicleRegistry + ?Sized> VehicleRegistry for std::sync::Arc<T> {
    fn capacity_for(&self, plate: &str) -> Result<Option<f64>, SourceError> {
        (**self).capacity_for(plate)
    }
}
