//! Fluid property errors.

use crate::property::PropertyKind;
use thiserror::Error;
use tp_core::TpError;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while resolving fluid properties.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// The property source rejected the request (unsupported state, out of
    /// correlation range, backend failure).
    #[error("Property lookup failed for {property} of {fluid}: {message}")]
    PropertyLookup {
        property: PropertyKind,
        fluid: String,
        message: String,
    },

    /// Fluid name not recognised.
    #[error("Unknown fluid: {name}")]
    UnknownFluid { name: String },

    /// A user-supplied property function returned a non-physical value.
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Scalar/array shape error in T or P.
    #[error(transparent)]
    Core(#[from] TpError),
}

impl From<FluidError> for TpError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::PropertyLookup { .. } => TpError::InvalidArg {
                what: "fluid property lookup failed",
            },
            FluidError::UnknownFluid { .. } => TpError::InvalidArg {
                what: "unknown fluid",
            },
            FluidError::NonPhysical { what, .. } => TpError::Invariant { what },
            FluidError::InvalidArg { what } => TpError::InvalidArg { what },
            FluidError::Core(e) => e,
        }
    }
}
