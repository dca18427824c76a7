//! CoolProp-based property oracle.

use crate::error::{FluidError, FluidResult};
use crate::oracle::{KnownVariable, PropertyOracle, validation};
use crate::property::PropertyKind;
use crate::species::Species;
use rfluids::prelude::*;
use tp_core::Real;

/// CoolProp backend for fluid properties.
///
/// Thread-safe: rfluids Fluid instances are created per query and never shared.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolPropOracle;

impl CoolPropOracle {
    /// Create a new CoolProp oracle.
    pub fn new() -> Self {
        Self
    }

    fn input(var: KnownVariable) -> FluidInput {
        match var {
            KnownVariable::Temperature(t_k) => FluidInput::temperature(t_k),
            KnownVariable::Pressure(p_pa) => FluidInput::pressure(p_pa),
            KnownVariable::Quality(x) => FluidInput::quality(x),
        }
    }

    fn lookup_error(property: PropertyKind, fluid: Species, message: String) -> FluidError {
        FluidError::PropertyLookup {
            property,
            fluid: fluid.key().to_string(),
            message,
        }
    }
}

impl PropertyOracle for CoolPropOracle {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn query(
        &self,
        property: PropertyKind,
        first: KnownVariable,
        second: KnownVariable,
        fluid: Species,
    ) -> FluidResult<Real> {
        validation::validate_known(property, fluid, first)?;
        validation::validate_known(property, fluid, second)?;

        let mut state = Fluid::from(fluid.rfluids_pure())
            .in_state(Self::input(first), Self::input(second))
            .map_err(|e| {
                Self::lookup_error(
                    property,
                    fluid,
                    format!(
                        "rfluids error at {}={}, {}={}: {}",
                        first.name(),
                        first.value(),
                        second.name(),
                        second.value(),
                        e
                    ),
                )
            })?;

        let value = match property {
            PropertyKind::Density => state.density(),
            PropertyKind::Viscosity => state.dynamic_viscosity(),
            PropertyKind::SurfaceTension => state.surface_tension(),
        }
        .map_err(|e| {
            Self::lookup_error(
                property,
                fluid,
                format!("rfluids error getting {}: {}", property, e),
            )
        })?;

        tracing::debug!(
            oracle = "CoolProp",
            %property,
            fluid = fluid.coolprop_name(),
            value,
            "property query"
        );
        validation::validate_output(property, fluid, value)
    }
}
