//! Drift-flux distribution parameters from measured void fractions.
//!
//! Fits `v_sg / gvf = C0 * v_m + C1` by linear least squares.

use crate::error::{FlowError, FlowResult};
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use tp_core::{Real, TpError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriftFluxFit {
    /// Distribution parameter
    pub c0: Real,
    /// Drift velocity [m/s]
    pub c1: Real,
    /// Coefficient of determination of the fit
    pub r_squared: Real,
}

impl DriftFluxFit {
    pub fn predict(&self, v_m: Real) -> Real {
        self.c0 * v_m + self.c1
    }
}

pub fn fit_drift_flux(v_sg: &[Real], v_m: &[Real], gvf: &[Real]) -> FlowResult<DriftFluxFit> {
    let n = v_sg.len();
    if v_m.len() != n || gvf.len() != n {
        return Err(TpError::LengthMismatch {
            what: "drift-flux fit inputs",
            expected: n,
            found: if v_m.len() != n { v_m.len() } else { gvf.len() },
        }
        .into());
    }
    if n < 2 {
        return Err(FlowError::InvalidInput {
            what: format!("drift-flux fit needs at least 2 points, got {n}"),
        });
    }

    let mut y = DVector::zeros(n);
    for i in 0..n {
        if gvf[i] == 0.0 {
            return Err(TpError::DivideByZero {
                what: "bubble velocity v_sg / gvf",
            }
            .into());
        }
        y[i] = v_sg[i] / gvf[i];
    }
    let a = DMatrix::from_fn(n, 2, |i, j| if j == 0 { v_m[i] } else { 1.0 });

    let svd = a.clone().svd(true, true);
    if svd.rank(1e-12) < 2 {
        return Err(FlowError::InvalidInput {
            what: "drift-flux fit is degenerate (all mixture velocities equal?)".into(),
        });
    }
    let coef = svd.solve(&y, 1e-12).map_err(|msg| FlowError::InvalidInput {
        what: format!("drift-flux least squares failed: {msg}"),
    })?;
    let (c0, c1) = (coef[0], coef[1]);

    let predicted = &a * &coef;
    let mean = y.mean();
    let ss_res = (&y - predicted).norm_squared();
    let ss_tot = y.iter().map(|v| (v - mean).powi(2)).sum::<Real>();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    tracing::debug!(c0, c1, r_squared, points = n, "drift-flux fit");
    Ok(DriftFluxFit { c0, c1, r_squared })
}
