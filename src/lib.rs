//! dispatch-planner core
//!
//! Delivery route capacity assignment for the plant operations console:
//! route creation and lookup, order↔route assignment under a hard capacity
//! invariant, contiguous stop sequencing, and the route status lifecycle.

pub mod api;
pub mod backend;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod sequence;
pub mod traits;
