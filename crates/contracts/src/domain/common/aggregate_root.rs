use super::{AggregateId, EntityMetadata};

/// Trait for aggregate roots
///
/// Defines the instance accessors and the static naming metadata shared by
/// every aggregate of the system.
pub trait AggregateRoot {
    /// Aggregate identifier type
    type Id: AggregateId;

    // ============================================================================
    // Instance methods
    // ============================================================================

    /// Record ID
    fn id(&self) -> Self::Id;

    /// Human-readable business code (for example "FIS-000123")
    fn code(&self) -> String;

    /// Lifecycle metadata
    fn metadata(&self) -> &EntityMetadata;

    /// Mutable lifecycle metadata
    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Static aggregate metadata
    // ============================================================================

    /// Aggregate index in the system (for example "a001")
    fn aggregate_index() -> &'static str;

    /// Collection name used for tables (for example "work_order")
    fn collection_name() -> &'static str;

    /// Singular display name (for example "İş Emri")
    fn element_name() -> &'static str;

    /// Plural display name (for example "İş Emirleri")
    fn list_name() -> &'static str;

    // ============================================================================
    // Default implementations
    // ============================================================================

    /// Full system name (for example "a001_work_order"), also the main table name
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }

    /// Prefix for child tables (for example "a001_work_order_")
    fn table_prefix() -> String {
        format!("{}_", Self::full_name())
    }
}
