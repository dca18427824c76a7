//! Flow model errors.

use thiserror::Error;
use tp_core::TpError;
use tp_fluids::FluidError;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    #[error(transparent)]
    Core(#[from] TpError),

    #[error(transparent)]
    Fluid(#[from] FluidError),

    /// A derived quantity cannot be computed from the inputs supplied.
    #[error("Missing input: {what}")]
    MissingInput { what: &'static str },

    #[error("Root finding for {what} did not converge after {iterations} iterations (residual = {residual:e})")]
    RootNotConverged {
        what: String,
        iterations: usize,
        residual: f64,
    },

    /// Physically meaningless input at a point (negative velocity, rho_l <= rho_g, ...).
    #[error("Invalid input: {what}")]
    InvalidInput { what: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_by_zero_passes_through() {
        let err: FlowError = TpError::DivideByZero {
            what: "void fraction",
        }
        .into();
        assert_eq!(err.to_string(), "Division by zero while computing void fraction");
    }

    #[test]
    fn non_convergence_reports_context() {
        let err = FlowError::RootNotConverged {
            what: "F line at v_sg = 0.1".into(),
            iterations: 50,
            residual: 1.5e-3,
        };
        let msg = err.to_string();
        assert!(msg.contains("F line"));
        assert!(msg.contains("50 iterations"));
    }
}
