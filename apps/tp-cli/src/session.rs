//! Build an analysis session from a setup file.

use crate::error::AppResult;
use tp_core::{deg, m};
use tp_flow::{FlowError, TwoPhase};
use tp_fluids::Species;
use tp_project::Setup;

fn species(name: &str) -> AppResult<Species> {
    Ok(name.parse::<Species>().map_err(FlowError::from)?)
}

/// CoolProp-backed session with every operating point of the setup loaded.
pub fn build_session(setup: &Setup) -> AppResult<TwoPhase> {
    let mut tp = TwoPhase::with_coolprop(
        species(&setup.fluids.liquid)?,
        species(&setup.fluids.gas)?,
        m(setup.pipe.diameter_m),
    )?;
    tp.set_length(m(setup.pipe.length_m))?;
    tp.set_inclination(deg(setup.pipe.inclination_deg));
    tp.set_gravity(setup.gravity_mps2)?;

    let points = &setup.operating_points;
    tp.set_temperature_c(points.iter().map(|p| p.t_c).collect::<Vec<_>>());
    tp.set_pressure_pa(points.iter().map(|p| p.p_pa).collect::<Vec<_>>());
    tp.set_v_sl(points.iter().map(|p| p.v_sl).collect::<Vec<_>>())?;
    tp.set_v_sg(points.iter().map(|p| p.v_sg).collect::<Vec<_>>())?;

    tracing::debug!(
        name = %setup.name,
        points = points.len(),
        "session built from setup"
    );
    Ok(tp)
}
