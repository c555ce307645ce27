//! Common types and traits for all aggregates

pub mod aggregate_id;
pub mod aggregate_root;
pub mod entity_metadata;
pub mod financials;
pub mod line_items;
pub mod money;
pub mod nullable;
pub mod status;

// Re-exports
pub use aggregate_id::AggregateId;
pub use aggregate_root::AggregateRoot;
pub use entity_metadata::EntityMetadata;
pub use financials::{derive_financials, margin_percent, Financials, LineItem};
pub use line_items::{DerivedFieldGuard, NewLineItemDto};
pub use status::{check_completion, check_transition, DocumentStatus, TransitionError};
