//! Operating state of a two-phase analysis.
//!
//! Every setter bumps [`PropertyState::version`], which is what the property
//! caches compare against. Quantities derived from the velocities (mixture
//! velocity, volumetric rates, void fraction) are recomputed inside the
//! setter, never lazily.

use crate::convert::{superficial_to_volumetric_series, volumetric_to_superficial_series};
use crate::error::{FlowError, FlowResult};
use crate::homogeneous::void_fraction_series;
use tp_core::units::{Angle, Length};
use tp_core::{Real, Series, TpError, TpResult, deg, m};
use tp_fluids::{Phase, PropertyContext, Species};
use uom::si::angle::degree;
use uom::si::length::meter;

#[derive(Debug, Clone)]
pub struct PropertyState {
    d: Length,
    l: Length,
    theta: Angle,
    t_c: Series,
    p_pa: Series,
    v_sg: Series,
    v_sl: Series,
    q_g: Series,
    q_l: Series,
    v_m: Series,
    /// `None` while some point has no flow at all
    gvf: Option<Series>,
    liquid: Species,
    gas: Species,
    version: u64,
}

impl PropertyState {
    /// Vertical pipe of zero length at 0 °C and zero pressure, both phases at rest.
    pub fn new(liquid: Species, gas: Species, d: Length) -> FlowResult<Self> {
        check_diameter(d)?;
        Ok(Self {
            d,
            l: m(0.0),
            theta: deg(90.0),
            t_c: Series::default(),
            p_pa: Series::default(),
            v_sg: Series::default(),
            v_sl: Series::default(),
            q_g: Series::default(),
            q_l: Series::default(),
            v_m: Series::default(),
            gvf: None,
            liquid,
            gas,
            version: 0,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark the state changed without touching any field.
    pub fn touch(&mut self) {
        self.version += 1;
    }

    pub fn diameter(&self) -> Length {
        self.d
    }

    pub fn d_m(&self) -> Real {
        self.d.get::<meter>()
    }

    pub fn length(&self) -> Length {
        self.l
    }

    pub fn l_m(&self) -> Real {
        self.l.get::<meter>()
    }

    pub fn inclination(&self) -> Angle {
        self.theta
    }

    pub fn theta_deg(&self) -> Real {
        self.theta.get::<degree>()
    }

    pub fn temperature_c(&self) -> &Series {
        &self.t_c
    }

    pub fn pressure_pa(&self) -> &Series {
        &self.p_pa
    }

    pub fn v_sg(&self) -> &Series {
        &self.v_sg
    }

    pub fn v_sl(&self) -> &Series {
        &self.v_sl
    }

    pub fn v_m(&self) -> &Series {
        &self.v_m
    }

    pub fn q_g(&self) -> &Series {
        &self.q_g
    }

    pub fn q_l(&self) -> &Series {
        &self.q_l
    }

    /// Homogeneous void fraction; fails while any point has `v_sg + v_sl == 0`.
    pub fn void_fraction(&self) -> TpResult<&Series> {
        self.gvf.as_ref().ok_or(TpError::DivideByZero {
            what: "void fraction (no flow at some point)",
        })
    }

    pub fn liquid(&self) -> Species {
        self.liquid
    }

    pub fn gas(&self) -> Species {
        self.gas
    }

    pub fn set_temperature_c(&mut self, t_c: impl Into<Series>) {
        self.t_c = t_c.into();
        self.touch();
    }

    pub fn set_pressure_pa(&mut self, p_pa: impl Into<Series>) {
        self.p_pa = p_pa.into();
        self.touch();
    }

    pub fn set_fluids(&mut self, liquid: Species, gas: Species) {
        self.liquid = liquid;
        self.gas = gas;
        self.touch();
    }

    pub fn set_length(&mut self, l: Length) -> FlowResult<()> {
        let l_m = l.get::<meter>();
        if !(l_m.is_finite() && l_m >= 0.0) {
            return Err(FlowError::InvalidInput {
                what: format!("pipe length must be non-negative ({l_m} m)"),
            });
        }
        self.l = l;
        self.touch();
        Ok(())
    }

    pub fn set_inclination(&mut self, theta: Angle) {
        self.theta = theta;
        self.touch();
    }

    /// Set the gas superficial velocity; updates `Q_g`, `v_m` and the void fraction.
    pub fn set_v_sg(&mut self, v_sg: impl Into<Series>) -> FlowResult<()> {
        let v_sg = v_sg.into();
        let q_g = superficial_to_volumetric_series(&v_sg, self.d_m())?;
        self.commit_velocities(v_sg, self.v_sl.clone())?;
        self.q_g = q_g;
        Ok(())
    }

    /// Set the liquid superficial velocity; updates `Q_l`, `v_m` and the void fraction.
    pub fn set_v_sl(&mut self, v_sl: impl Into<Series>) -> FlowResult<()> {
        let v_sl = v_sl.into();
        let q_l = superficial_to_volumetric_series(&v_sl, self.d_m())?;
        self.commit_velocities(self.v_sg.clone(), v_sl)?;
        self.q_l = q_l;
        Ok(())
    }

    /// Set the gas volumetric rate [m³/s]; `v_sg` follows from the diameter.
    pub fn set_q_g(&mut self, q_g: impl Into<Series>) -> FlowResult<()> {
        let q_g = q_g.into();
        let v_sg = volumetric_to_superficial_series(&q_g, self.d_m())?;
        self.commit_velocities(v_sg, self.v_sl.clone())?;
        self.q_g = q_g;
        Ok(())
    }

    /// Set the liquid volumetric rate [m³/s]; `v_sl` follows from the diameter.
    pub fn set_q_l(&mut self, q_l: impl Into<Series>) -> FlowResult<()> {
        let q_l = q_l.into();
        let v_sl = volumetric_to_superficial_series(&q_l, self.d_m())?;
        self.commit_velocities(self.v_sg.clone(), v_sl)?;
        self.q_l = q_l;
        Ok(())
    }

    /// Change the diameter keeping the volumetric rates; both superficial
    /// velocities are recomputed.
    pub fn set_diameter(&mut self, d: Length) -> FlowResult<()> {
        check_diameter(d)?;
        let d_m = d.get::<meter>();
        let v_sg = volumetric_to_superficial_series(&self.q_g, d_m)?;
        let v_sl = volumetric_to_superficial_series(&self.q_l, d_m)?;
        self.commit_velocities(v_sg, v_sl)?;
        self.d = d;
        Ok(())
    }

    fn commit_velocities(&mut self, v_sg: Series, v_sl: Series) -> FlowResult<()> {
        let v_m = v_sg.zip_with(&v_sl, "superficial velocities", |g, l| g + l)?;
        self.gvf = void_fraction_series(&v_sg, &v_sl).ok();
        self.v_sg = v_sg;
        self.v_sl = v_sl;
        self.v_m = v_m;
        self.touch();
        Ok(())
    }

    /// Per-point `(v_sg, v_sl)` pairs after broadcasting.
    pub fn velocity_pairs(&self) -> TpResult<Vec<(Real, Real)>> {
        let n = tp_core::series::broadcast_len(&[&self.v_sg, &self.v_sl], "superficial velocities")?;
        Ok((0..n)
            .map(|i| {
                (
                    self.v_sg.get(i).unwrap_or_default(),
                    self.v_sl.get(i).unwrap_or_default(),
                )
            })
            .collect())
    }
}

fn check_diameter(d: Length) -> FlowResult<()> {
    let d_m = d.get::<meter>();
    if d_m.is_finite() && d_m > 0.0 {
        Ok(())
    } else {
        Err(FlowError::InvalidInput {
            what: format!("pipe diameter must be positive ({d_m} m)"),
        })
    }
}

impl PropertyContext for PropertyState {
    fn version(&self) -> u64 {
        self.version
    }

    fn temperature_c(&self) -> &Series {
        &self.t_c
    }

    fn pressure_pa(&self) -> &Series {
        &self.p_pa
    }

    fn fluid(&self, phase: Phase) -> Species {
        match phase {
            Phase::Liquid => self.liquid,
            Phase::Gas => self.gas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PropertyState {
        PropertyState::new(Species::Water, Species::Air, m(0.0525)).unwrap()
    }

    #[test]
    fn every_setter_bumps_version() {
        let mut s = state();
        let mut last = s.version();
        let mut check = |s: &PropertyState| {
            assert!(s.version() > last);
            last = s.version();
        };
        s.set_temperature_c(25.0);
        check(&s);
        s.set_pressure_pa(151_325.0);
        check(&s);
        s.set_v_sg(0.05).unwrap();
        check(&s);
        s.set_v_sl(1.0).unwrap();
        check(&s);
        s.set_diameter(m(0.05)).unwrap();
        check(&s);
        s.set_fluids(Species::Water, Species::N2);
        check(&s);
    }

    #[test]
    fn velocity_setters_update_derived_fields() {
        let mut s = state();
        s.set_v_sl(vec![1.0, 2.0]).unwrap();
        s.set_v_sg(vec![1.0, 2.0]).unwrap();
        assert_eq!(s.v_m(), &Series::from(vec![2.0, 4.0]));
        assert_eq!(s.void_fraction().unwrap(), &Series::from(vec![0.5, 0.5]));
        let area = std::f64::consts::PI * 0.0525 * 0.0525 / 4.0;
        let q = s.q_g().values();
        assert!((q[1] - 2.0 * area).abs() < 1e-15);
    }

    #[test]
    fn no_flow_has_no_void_fraction() {
        let s = state();
        assert!(matches!(
            s.void_fraction(),
            Err(TpError::DivideByZero { .. })
        ));
    }

    #[test]
    fn diameter_change_keeps_volumetric_rates() {
        let mut s = state();
        s.set_v_sg(1.0).unwrap();
        s.set_v_sl(0.5).unwrap();
        let (q_g, q_l) = (s.q_g().clone(), s.q_l().clone());
        s.set_diameter(m(0.0525 * 2.0)).unwrap();
        assert_eq!(s.q_g(), &q_g);
        assert_eq!(s.q_l(), &q_l);
        assert!((s.v_sg().as_scalar().unwrap() - 0.25).abs() < 1e-12);
        assert!((s.v_sl().as_scalar().unwrap() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn mismatched_velocity_arrays_leave_state_unchanged() {
        let mut s = state();
        s.set_v_sl(vec![1.0, 2.0]).unwrap();
        let version = s.version();
        assert!(s.set_v_sg(vec![0.1, 0.2, 0.3]).is_err());
        assert_eq!(s.version(), version);
        assert!(s.v_sg().is_scalar());
    }

    #[test]
    fn rejects_non_positive_diameter() {
        assert!(PropertyState::new(Species::Water, Species::Air, m(0.0)).is_err());
        let mut s = state();
        assert!(s.set_diameter(m(-1.0)).is_err());
    }

    #[test]
    fn fluid_lookup_is_per_phase() {
        let s = state();
        assert_eq!(PropertyContext::fluid(&s, Phase::Liquid), Species::Water);
        assert_eq!(PropertyContext::fluid(&s, Phase::Gas), Species::Air);
    }
}
