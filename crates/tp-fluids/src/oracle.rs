//! Thermophysical property oracle contract and input validation helpers.

use crate::error::{FluidError, FluidResult};
use crate::property::PropertyKind;
use crate::species::Species;
use tp_core::Real;

/// One of the two independent variables that fix the thermodynamic state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KnownVariable {
    /// Absolute temperature [K]
    Temperature(Real),
    /// Pressure [Pa]
    Pressure(Real),
    /// Vapour quality [-], 0 = saturated liquid, 1 = saturated vapour
    Quality(Real),
}

impl KnownVariable {
    pub fn name(&self) -> &'static str {
        match self {
            KnownVariable::Temperature(_) => "T",
            KnownVariable::Pressure(_) => "P",
            KnownVariable::Quality(_) => "Q",
        }
    }

    pub fn value(&self) -> Real {
        match self {
            KnownVariable::Temperature(v)
            | KnownVariable::Pressure(v)
            | KnownVariable::Quality(v) => *v,
        }
    }
}

/// External source of thermophysical properties.
///
/// Implementations must be thread-safe (Send + Sync) so one oracle can be
/// shared by the liquid and gas resolvers. An oracle must fail with
/// [`FluidError::PropertyLookup`] when the fluid or the state lies outside the
/// range it can evaluate.
pub trait PropertyOracle: Send + Sync {
    /// Get the oracle name (for debugging/logging).
    fn name(&self) -> &str;

    /// Evaluate `property` of `fluid` at the state fixed by two known variables.
    fn query(
        &self,
        property: PropertyKind,
        first: KnownVariable,
        second: KnownVariable,
        fluid: Species,
    ) -> FluidResult<Real>;
}

/// Validation helpers shared by oracle implementations.
pub(crate) mod validation {
    use super::*;

    fn reject(property: PropertyKind, fluid: Species, message: String) -> FluidError {
        FluidError::PropertyLookup {
            property,
            fluid: fluid.key().to_string(),
            message,
        }
    }

    /// Ensure a known variable is inside its physical domain.
    pub fn validate_known(
        property: PropertyKind,
        fluid: Species,
        var: KnownVariable,
    ) -> FluidResult<()> {
        let ok = match var {
            KnownVariable::Temperature(t) => t.is_finite() && t > 0.0,
            KnownVariable::Pressure(p) => p.is_finite() && p > 0.0,
            KnownVariable::Quality(q) => q.is_finite() && (0.0..=1.0).contains(&q),
        };
        if ok {
            Ok(())
        } else {
            Err(reject(
                property,
                fluid,
                format!("{}={} is outside the valid range", var.name(), var.value()),
            ))
        }
    }

    /// Ensure a returned property is positive and finite.
    pub fn validate_output(property: PropertyKind, fluid: Species, value: Real) -> FluidResult<Real> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(reject(
                property,
                fluid,
                format!("backend returned non-physical value {value}"),
            ))
        }
    }
}
