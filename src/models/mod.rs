//! Core data models for private-ledger

pub mod expense;
pub mod ids;
pub mod record;

pub use expense::{
    now_millis, ExpenseAggregate, ExpenseMetadata, ExpensePayload, DEFAULT_CATEGORY,
    DEFAULT_CURRENCY,
};
pub use ids::RecordId;
pub use record::ExpenseRecord;
