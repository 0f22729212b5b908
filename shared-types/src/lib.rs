pub mod extraction;
pub mod order;

pub use extraction::{ExtractOutcome, SkipReason};
pub use order::{OrderRecord, EXPORT_COLUMNS};
