//! Cross-tenant partnership and property-sharing registries for the brokerage
//! listing network, plus the derived public-site visibility projection.
//!
//! The sharing subsystem is deliberately small: two row registries with guarded
//! status transitions and a pure read-model. Authentication, the company
//! directory, and the property inventory are external collaborators reached
//! through traits so the registries stay testable in isolation.

pub mod config;
pub mod error;
pub mod sharing;
pub mod telemetry;
