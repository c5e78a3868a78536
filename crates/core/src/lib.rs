//! `cafeops-core`: shared building blocks for the cafe metrics pipeline.
//!
//! This crate contains **pure** primitives (no infrastructure concerns):
//! the error taxonomy and the fixed calendar used to derive event time fields.

pub mod calendar;
pub mod error;

pub use calendar::{CalendarFields, DayBucket, HourBucket};
pub use error::{DomainError, DomainResult};
