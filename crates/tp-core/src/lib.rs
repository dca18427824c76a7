//! tp-core: numeric foundation for the two-phase flow workspace.
//!
//! Contains:
//! - units (uom SI types + constructors + gravity / temperature constants)
//! - numeric (Real + tolerances + float helpers)
//! - series (scalar-or-array values with broadcasting)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod series;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TpError, TpResult};
pub use numeric::*;
pub use series::Series;
pub use units::*;
