//! Types shared between the back end and its clients: aggregates, DTOs and the
//! financial derivation rules.

pub mod dashboards;
pub mod domain;
pub mod shared;
pub mod system;
