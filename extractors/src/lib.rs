//! Extractors Crate
//!
//! Turns raw mail messages into structured donation records. The only
//! extractor today is `OrderConfirmationExtractor`, which recovers order
//! fields from the HTML body of order-confirmation emails.
//!
//! # Architecture
//!
//! - **Types**: `OrderRecord` and the outcome/skip taxonomy live in the
//!   `shared-types` crate
//! - **Implementation**: this crate owns MIME traversal, container location,
//!   text flattening, and pattern-based field recovery
//!
//! The flattening and field-recovery steps are plain functions over strings
//! so the extraction rules can be unit-tested without any HTML fixture.

pub mod order_confirmation;

pub use order_confirmation::OrderConfirmationExtractor;
