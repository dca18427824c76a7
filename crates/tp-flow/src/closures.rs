//! Closure correlations: elongated-bubble velocity and friction factors.
//!
//! Elongated (Taylor) bubble models follow the comparison by Rodrigues et al.
//! (2007); all have the drift form `v_tb = C0 * v_m + C1 * sqrt(g d)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tp_core::{Real, TpError, TpResult};

/// Critical liquid Froude number separating the Bendiksen and Theron regimes.
pub const CRITICAL_FROUDE: Real = 3.5;

/// Laminar/turbulent switch of the Blasius-type friction factors.
pub const LAMINAR_LIMIT: Real = 2300.0;

/// Operating point for the bubble velocity correlations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EbInputs {
    pub v_sg: Real,
    pub v_sl: Real,
    pub d: Real,
    /// Inclination from horizontal [deg]
    pub theta_deg: Real,
    pub g: Real,
    /// Needed by Petalas & Aziz only, see [`EbModel::needs_liquid`].
    pub liquid: Option<LiquidProperties>,
}

/// Liquid density [kg/m³] and dynamic viscosity [Pa·s].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidProperties {
    pub rho: Real,
    pub mu: Real,
}

impl EbInputs {
    fn v_m(&self) -> Real {
        self.v_sg + self.v_sl
    }

    fn froude_liquid(&self) -> Real {
        self.v_sl / (self.g * self.d).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EbModel {
    Nicklin1962,
    Bendiksen1984,
    Theron1989,
    PetalasAziz2000,
    Dukler1985,
}

impl EbModel {
    pub const ALL: [EbModel; 5] = [
        EbModel::Nicklin1962,
        EbModel::Bendiksen1984,
        EbModel::Theron1989,
        EbModel::PetalasAziz2000,
        EbModel::Dukler1985,
    ];

    pub fn author(self) -> &'static str {
        match self {
            EbModel::Nicklin1962 => "Nicklin (1962)",
            EbModel::Bendiksen1984 => "Bendiksen (1984)",
            EbModel::Theron1989 => "Theron (1989)",
            EbModel::PetalasAziz2000 => "Petalas and Aziz (2000)",
            EbModel::Dukler1985 => "Dukler (1985)",
        }
    }

    /// Whether the model reads [`EbInputs::liquid`].
    pub fn needs_liquid(self) -> bool {
        matches!(self, EbModel::PetalasAziz2000)
    }

    /// Distribution (C0) and drift (C1) coefficients at a point.
    pub fn coefficients(self, p: &EbInputs) -> TpResult<(Real, Real)> {
        let theta = p.theta_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        let coeffs = match self {
            EbModel::Nicklin1962 => (1.2, 0.351),
            EbModel::Bendiksen1984 => {
                if p.froude_liquid() >= CRITICAL_FROUDE {
                    (1.2, 0.35 * sin)
                } else {
                    (1.05 + 0.15 * sin * sin, 0.54 * cos + 0.35 * sin)
                }
            }
            EbModel::Theron1989 => {
                let tt = 1.0 + (p.froude_liquid() / CRITICAL_FROUDE) * cos;
                (
                    1.3 - 0.23 / tt + 0.13 * sin * sin,
                    (-0.5 + 0.8 / tt) * cos + 0.35 * sin,
                )
            }
            EbModel::PetalasAziz2000 => {
                let liquid = p.liquid.ok_or(TpError::InvalidArg {
                    what: "Petalas-Aziz needs liquid density and viscosity",
                })?;
                let re = liquid.rho * p.v_m() * p.d / liquid.mu;
                if !(re.is_finite() && re > 0.0) {
                    return Err(TpError::InvalidArg {
                        what: "Petalas-Aziz needs a positive liquid Reynolds number",
                    });
                }
                ((1.64 + 0.12 * sin) / re.powf(0.031), 0.0)
            }
            EbModel::Dukler1985 => (1.225, 0.0),
        };
        Ok(coeffs)
    }

    /// Translational velocity of the elongated bubble [m/s].
    pub fn velocity(self, p: &EbInputs) -> TpResult<Real> {
        let (c0, c1) = self.coefficients(p)?;
        Ok(c0 * p.v_m() + c1 * (p.g * p.d).sqrt())
    }

    /// Every model at the same point, in [`EbModel::ALL`] order.
    pub fn evaluate_all(p: &EbInputs) -> Vec<(EbModel, TpResult<Real>)> {
        Self::ALL.into_iter().map(|m| (m, m.velocity(p))).collect()
    }
}

impl fmt::Display for EbModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.author())
    }
}

fn check_reynolds(re: Real) -> TpResult<Real> {
    if re.is_finite() && re > 0.0 {
        Ok(re)
    } else {
        Err(TpError::InvalidArg {
            what: "Reynolds number must be positive",
        })
    }
}

/// Blasius Fanning friction factor (16/Re laminar, 0.046 Re^-0.2 turbulent).
pub fn blasius_fanning(re: Real) -> TpResult<Real> {
    let re = check_reynolds(re)?;
    Ok(if re < LAMINAR_LIMIT {
        16.0 / re
    } else {
        0.046 * re.powf(-0.2)
    })
}

/// Blasius Moody (Darcy) friction factor, four times the Fanning value.
pub fn blasius_moody(re: Real) -> TpResult<Real> {
    let re = check_reynolds(re)?;
    Ok(if re < LAMINAR_LIMIT {
        64.0 / re
    } else {
        0.184 * re.powf(-0.2)
    })
}

/// Moody's explicit approximation for rough pipes; `rel_roughness = e / d`.
pub fn moody(re: Real, rel_roughness: Real) -> TpResult<Real> {
    let re = check_reynolds(re)?;
    if !(rel_roughness.is_finite() && rel_roughness >= 0.0) {
        return Err(TpError::InvalidArg {
            what: "relative roughness must be non-negative",
        });
    }
    Ok(0.0055 * (1.0 + (2e4 * rel_roughness + 1e6 / re).cbrt()))
}
