//! Inspection template schema validation, fleet targeting and access-profile evaluation.
//!
//! The pure engines live in [`checklists::schema`], [`checklists::items`],
//! [`checklists::targeting`] and [`access::evaluator`]. The service and router modules wrap
//! them with repositories and HTTP endpoints.

pub mod access;
pub mod checklists;
pub mod config;
pub mod error;
pub mod memory;
pub mod store;
pub mod telemetry;
