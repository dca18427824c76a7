//! Flow-rate conversions.

use tp_core::units::constants::celsius_to_kelvin;
use tp_core::{Real, Series, TpError, TpResult, checked_div, m, pipe_area};

/// Pipe cross-section [m²] for a diameter in metres.
pub fn area(d: Real) -> TpResult<Real> {
    if !(d.is_finite() && d > 0.0) {
        return Err(TpError::DivideByZero {
            what: "pipe cross-section (diameter must be positive)",
        });
    }
    Ok(pipe_area(m(d)).value)
}

/// Superficial velocity [m/s] of a volumetric rate [m³/s].
pub fn volumetric_to_superficial(q: Real, d: Real) -> TpResult<Real> {
    Ok(q / area(d)?)
}

/// Volumetric rate [m³/s] of a superficial velocity [m/s].
pub fn superficial_to_volumetric(v_s: Real, d: Real) -> TpResult<Real> {
    Ok(v_s * area(d)?)
}

pub fn volumetric_to_superficial_series(q: &Series, d: Real) -> TpResult<Series> {
    let a = area(d)?;
    Ok(q.map(|q| q / a))
}

pub fn superficial_to_volumetric_series(v_s: &Series, d: Real) -> TpResult<Series> {
    let a = area(d)?;
    Ok(v_s.map(|v| v * a))
}

/// Mass rate [kg/min] to volumetric rate [m³/s].
pub fn mass_to_volumetric(m_kg_per_min: Real, rho: Real) -> TpResult<Real> {
    checked_div(m_kg_per_min, 60.0 * rho, "volumetric rate from mass rate")
}

/// Ideal-gas volume rate at `(T_y, P_y)` from a rate measured at `(T_x, P_x)`.
///
/// Temperatures in °C, pressures in Pa (absolute).
pub fn rescale_gas_volume(q_x: Real, from: (Real, Real), to: (Real, Real)) -> TpResult<Real> {
    let (t_x, p_x) = (celsius_to_kelvin(from.0), from.1);
    let (t_y, p_y) = (celsius_to_kelvin(to.0), to.1);
    Ok(q_x * checked_div(p_x * t_y, p_y * t_x, "ideal-gas volume rescale")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superficial_round_trip() {
        let d = 0.0525;
        let q = 1.5e-3;
        let v = volumetric_to_superficial(q, d).unwrap();
        let expected = q / (std::f64::consts::PI * d * d / 4.0);
        assert!((v - expected).abs() < 1e-12);
        assert!((superficial_to_volumetric(v, d).unwrap() - q).abs() < 1e-15);
    }

    #[test]
    fn zero_diameter_is_rejected() {
        assert!(matches!(
            volumetric_to_superficial(1.0, 0.0),
            Err(TpError::DivideByZero { .. })
        ));
    }

    #[test]
    fn mass_rate() {
        let q = mass_to_volumetric(60.0, 1000.0).unwrap();
        assert!((q - 1e-3).abs() < 1e-15);
        assert!(mass_to_volumetric(1.0, 0.0).is_err());
    }

    #[test]
    fn ideal_gas_rescale() {
        // Doubling the pressure at constant temperature halves the volume.
        let q = rescale_gas_volume(2.0, (20.0, 1e5), (20.0, 2e5)).unwrap();
        assert!((q - 1.0).abs() < 1e-12);
        let q = rescale_gas_volume(1.0, (0.0, 1e5), (273.15, 1e5)).unwrap();
        assert!((q - 2.0).abs() < 1e-12);
    }
}
