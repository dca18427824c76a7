//! Homogeneous (no-slip) mixture model.

use crate::error::{FlowError, FlowResult};
use tp_core::series::broadcast_len;
use tp_core::{Real, Series, TpResult, checked_div};

/// Gas void fraction `v_sg / (v_sg + v_sl)`.
pub fn void_fraction(v_sg: Real, v_sl: Real) -> TpResult<Real> {
    checked_div(v_sg, v_sg + v_sl, "void fraction")
}

/// Element-wise void fraction over scalar-or-array velocities.
pub fn void_fraction_series(v_sg: &Series, v_sl: &Series) -> TpResult<Series> {
    if let (Some(g), Some(l)) = (v_sg.as_scalar(), v_sl.as_scalar()) {
        return Ok(Series::Scalar(void_fraction(g, l)?));
    }
    let n = broadcast_len(&[v_sg, v_sl], "superficial velocities")?;
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let g = v_sg.get(i).unwrap_or_default();
        let l = v_sl.get(i).unwrap_or_default();
        out.push(void_fraction(g, l)?);
    }
    Ok(Series::Array(out))
}

pub fn mixture_density(gvf: Real, rho_g: Real, rho_l: Real) -> Real {
    gvf * rho_g + (1.0 - gvf) * rho_l
}

pub fn mixture_viscosity(gvf: Real, mu_g: Real, mu_l: Real) -> Real {
    gvf * mu_g + (1.0 - gvf) * mu_l
}

/// Velocity information available for a mixture Reynolds number.
///
/// Either `v_m` or both superficial velocities must be known, and either `gvf`
/// or both superficial velocities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReynoldsInputs {
    pub v_sg: Option<Real>,
    pub v_sl: Option<Real>,
    pub v_m: Option<Real>,
    pub gvf: Option<Real>,
}

impl ReynoldsInputs {
    pub fn from_velocities(v_sg: Real, v_sl: Real) -> Self {
        Self {
            v_sg: Some(v_sg),
            v_sl: Some(v_sl),
            ..Self::default()
        }
    }
}

/// Mixture Reynolds number `rho_m * v_m * d / mu_m`.
pub fn reynolds(
    rho_g: Real,
    rho_l: Real,
    mu_g: Real,
    mu_l: Real,
    d: Real,
    inputs: ReynoldsInputs,
) -> FlowResult<Real> {
    let velocities = inputs.v_sg.zip(inputs.v_sl);

    let v_m = match (inputs.v_m, velocities) {
        (Some(v_m), _) => v_m,
        (None, Some((v_sg, v_sl))) => v_sg + v_sl,
        (None, None) => {
            return Err(FlowError::MissingInput {
                what: "mixture velocity or both superficial velocities",
            });
        }
    };
    let gvf = match (inputs.gvf, velocities) {
        (Some(gvf), _) => gvf,
        (None, Some((v_sg, v_sl))) => void_fraction(v_sg, v_sl)?,
        (None, None) => {
            return Err(FlowError::MissingInput {
                what: "void fraction or both superficial velocities",
            });
        }
    };

    let rho_m = mixture_density(gvf, rho_g, rho_l);
    let mu_m = mixture_viscosity(gvf, mu_g, mu_l);
    Ok(checked_div(rho_m * v_m * d, mu_m, "mixture Reynolds number")?)
}

/// Gravitational pressure gradient [Pa/m]; `theta_deg` measured from horizontal.
pub fn dp_gravity(rho_m: Real, g: Real, theta_deg: Real) -> Real {
    rho_m * g * theta_deg.to_radians().sin()
}

/// Frictional pressure gradient [Pa/m] for a Fanning-type factor `f`.
pub fn dp_friction(f: Real, rho_m: Real, v_m: Real, d: Real) -> TpResult<Real> {
    checked_div(f * rho_m * v_m * v_m, 2.0 * d, "frictional pressure gradient")
}
