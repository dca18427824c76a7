//! Two-phase analysis session.
//!
//! [`TwoPhase`] owns the operating state, the per-phase property resolvers and
//! the property caches. Reading a property needs `&mut self`, so a state
//! mutation and the cache refresh that follows it can never interleave.

use crate::closures::{EbInputs, EbModel, LiquidProperties};
use crate::drift_flux::{DriftFluxFit, fit_drift_flux};
use crate::error::{FlowError, FlowResult};
use crate::homogeneous::{ReynoldsInputs, reynolds};
use crate::pattern::{Classification, PatternInputs, PointInputs, Taitel1980};
use crate::state::PropertyState;
use crate::sweeps::SweepDefinition;
use crate::transition::{RegimeMap, TransitionLineSolver, TransitionLines};
use std::sync::Arc;
use tp_core::units::Length;
use tp_core::units::constants::G_ENGINEERING_MPS2;
use tp_core::{Real, Series, TpError, mean};
use tp_fluids::{
    CoolPropOracle, ManualValue, Phase, PhaseResolvers, PropertyCaches, PropertyFn, PropertyKind,
    PropertyOracle, Species,
};

/// Phase properties at one evaluation (scalar or per point).
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseProperties {
    pub rho_l: Series,
    pub rho_g: Series,
    pub mu_l: Series,
    pub mu_g: Series,
    pub sigma: Series,
}

pub struct TwoPhase {
    state: PropertyState,
    resolvers: PhaseResolvers,
    caches: PropertyCaches,
    g: Real,
}

impl std::fmt::Debug for TwoPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoPhase")
            .field("state", &self.state)
            .field("resolvers", &self.resolvers)
            .field("g", &self.g)
            .finish()
    }
}

impl TwoPhase {
    pub fn new(
        liquid: Species,
        gas: Species,
        d: Length,
        oracle: Arc<dyn PropertyOracle>,
    ) -> FlowResult<Self> {
        Ok(Self {
            state: PropertyState::new(liquid, gas, d)?,
            resolvers: PhaseResolvers::new(oracle),
            caches: PropertyCaches::new(),
            g: G_ENGINEERING_MPS2,
        })
    }

    /// Session backed by CoolProp.
    pub fn with_coolprop(liquid: Species, gas: Species, d: Length) -> FlowResult<Self> {
        Self::new(liquid, gas, d, Arc::new(CoolPropOracle::new()))
    }

    pub fn state(&self) -> &PropertyState {
        &self.state
    }

    pub fn resolvers(&self) -> &PhaseResolvers {
        &self.resolvers
    }

    pub fn gravity(&self) -> Real {
        self.g
    }

    pub fn set_gravity(&mut self, g: Real) -> FlowResult<()> {
        if !(g.is_finite() && g > 0.0) {
            return Err(FlowError::InvalidInput {
                what: format!("gravitational acceleration must be positive ({g})"),
            });
        }
        self.g = g;
        Ok(())
    }

    pub fn set_temperature_c(&mut self, t_c: impl Into<Series>) {
        self.state.set_temperature_c(t_c);
    }

    pub fn set_pressure_pa(&mut self, p_pa: impl Into<Series>) {
        self.state.set_pressure_pa(p_pa);
    }

    pub fn set_fluids(&mut self, liquid: Species, gas: Species) {
        self.state.set_fluids(liquid, gas);
    }

    pub fn set_v_sg(&mut self, v_sg: impl Into<Series>) -> FlowResult<()> {
        self.state.set_v_sg(v_sg)
    }

    pub fn set_v_sl(&mut self, v_sl: impl Into<Series>) -> FlowResult<()> {
        self.state.set_v_sl(v_sl)
    }

    pub fn set_q_g(&mut self, q_g: impl Into<Series>) -> FlowResult<()> {
        self.state.set_q_g(q_g)
    }

    pub fn set_q_l(&mut self, q_l: impl Into<Series>) -> FlowResult<()> {
        self.state.set_q_l(q_l)
    }

    pub fn set_diameter(&mut self, d: Length) -> FlowResult<()> {
        self.state.set_diameter(d)
    }

    pub fn set_length(&mut self, l: Length) -> FlowResult<()> {
        self.state.set_length(l)
    }

    pub fn set_inclination(&mut self, theta: tp_core::units::Angle) {
        self.state.set_inclination(theta);
    }

    fn property(&mut self, kind: PropertyKind, phase: Phase) -> FlowResult<Series> {
        Ok(self
            .caches
            .get(kind, phase, &self.state, &self.resolvers)?
            .clone())
    }

    pub fn rho_l(&mut self) -> FlowResult<Series> {
        self.property(PropertyKind::Density, Phase::Liquid)
    }

    pub fn rho_g(&mut self) -> FlowResult<Series> {
        self.property(PropertyKind::Density, Phase::Gas)
    }

    pub fn mu_l(&mut self) -> FlowResult<Series> {
        self.property(PropertyKind::Viscosity, Phase::Liquid)
    }

    pub fn mu_g(&mut self) -> FlowResult<Series> {
        self.property(PropertyKind::Viscosity, Phase::Gas)
    }

    /// Liquid surface tension at the configured vapour quality.
    pub fn sigma(&mut self) -> FlowResult<Series> {
        self.property(PropertyKind::SurfaceTension, Phase::Liquid)
    }

    pub fn properties(&mut self) -> FlowResult<PhaseProperties> {
        Ok(PhaseProperties {
            rho_l: self.rho_l()?,
            rho_g: self.rho_g()?,
            mu_l: self.mu_l()?,
            mu_g: self.mu_g()?,
            sigma: self.sigma()?,
        })
    }

    /// Pin (or unpin) a cached property. Surface tension is liquid only.
    pub fn set_property(
        &mut self,
        kind: PropertyKind,
        phase: Phase,
        value: ManualValue,
    ) -> FlowResult<()> {
        let entry = self
            .caches
            .entry_mut(kind, phase)
            .ok_or(TpError::InvalidArg {
                what: "surface tension is only tracked for the liquid phase",
            })?;
        entry.set(value);
        Ok(())
    }

    pub fn set_surface_tension_quality(&mut self, x: Real) -> FlowResult<()> {
        if !(0.0..=1.0).contains(&x) {
            return Err(FlowError::InvalidInput {
                what: format!("vapour quality must lie in [0, 1] ({x})"),
            });
        }
        self.caches.sigma.set_quality(x);
        Ok(())
    }

    pub fn set_density_override(&mut self, phase: Phase, f: PropertyFn) {
        self.set_override(PropertyKind::Density, phase, f);
    }

    pub fn set_viscosity_override(&mut self, phase: Phase, f: PropertyFn) {
        self.set_override(PropertyKind::Viscosity, phase, f);
    }

    /// `f(T [°C], x [-])` for the liquid surface tension.
    pub fn set_surface_tension_override(&mut self, f: PropertyFn) {
        self.set_override(PropertyKind::SurfaceTension, Phase::Liquid, f);
    }

    pub fn set_override(&mut self, kind: PropertyKind, phase: Phase, f: PropertyFn) {
        self.resolvers.for_phase_mut(phase).set_override(kind, f);
        self.state.touch();
    }

    pub fn clear_override(&mut self, kind: PropertyKind, phase: Phase) {
        self.resolvers.for_phase_mut(phase).clear_override(kind);
        self.state.touch();
    }

    pub fn set_density_correlation(&mut self, phase: Phase, f: PropertyFn, use_correlation: bool) {
        self.set_correlation(PropertyKind::Density, phase, f, use_correlation);
    }

    pub fn set_viscosity_correlation(&mut self, phase: Phase, f: PropertyFn, use_correlation: bool) {
        self.set_correlation(PropertyKind::Viscosity, phase, f, use_correlation);
    }

    pub fn set_surface_tension_correlation(&mut self, f: PropertyFn, use_correlation: bool) {
        self.set_correlation(PropertyKind::SurfaceTension, Phase::Liquid, f, use_correlation);
    }

    pub fn set_correlation(
        &mut self,
        kind: PropertyKind,
        phase: Phase,
        f: PropertyFn,
        use_correlation: bool,
    ) {
        self.resolvers
            .for_phase_mut(phase)
            .set_correlation(kind, f, use_correlation);
        self.state.touch();
    }

    /// Classifier inputs filled from the session; fields may be replaced
    /// before calling [`Taitel1980::classify_batch`].
    pub fn pattern_inputs(&mut self) -> FlowResult<PatternInputs> {
        let props = self.properties()?;
        Ok(PatternInputs {
            d: self.state.d_m().into(),
            l: self.state.l_m().into(),
            v_sg: self.state.v_sg().clone(),
            v_sl: self.state.v_sl().clone(),
            rho_g: props.rho_g,
            rho_l: props.rho_l,
            mu_g: props.mu_g,
            mu_l: props.mu_l,
            sigma: props.sigma,
            g: self.g.into(),
        })
    }

    /// Flow pattern of every operating point.
    pub fn classify(&mut self) -> FlowResult<Classification> {
        self.classify_with(|_| {})
    }

    /// Classify after replacing some of the session-derived inputs.
    pub fn classify_with<F>(&mut self, overrides: F) -> FlowResult<Classification>
    where
        F: FnOnce(&mut PatternInputs),
    {
        let mut inputs = self.pattern_inputs()?;
        overrides(&mut inputs);
        let result = Taitel1980::classify_batch(&inputs)?;
        tracing::debug!(
            points = result.len(),
            failed = result.num_failed(),
            "flow pattern classification"
        );
        Ok(result)
    }

    /// Transition-line solver using mean properties and the mean homogeneous
    /// void fraction of the operating points.
    pub fn transition_solver(&mut self) -> FlowResult<TransitionLineSolver> {
        let props = self.properties()?;
        let mean_of = |s: &Series, what: &'static str| {
            s.mean().ok_or(FlowError::MissingInput { what })
        };
        let gvf = mean(&self.state.void_fraction()?.values()).ok_or(FlowError::MissingInput {
            what: "operating points for the mean void fraction",
        })?;
        let point = PointInputs {
            v_sg: 0.0,
            v_sl: 0.0,
            rho_g: mean_of(&props.rho_g, "gas density")?,
            rho_l: mean_of(&props.rho_l, "liquid density")?,
            mu_g: mean_of(&props.mu_g, "gas viscosity")?,
            mu_l: mean_of(&props.mu_l, "liquid viscosity")?,
            sigma: mean_of(&props.sigma, "surface tension")?,
            g: self.g,
            l: self.state.l_m(),
            d: self.state.d_m(),
        };
        Ok(TransitionLineSolver::new(
            point.mixture_with_void_fraction(gvf),
            point.l,
        ))
    }

    pub fn transition_lines(&mut self, sweep: &SweepDefinition) -> FlowResult<TransitionLines> {
        sweep.validate()?;
        self.transition_solver()?.sample(&sweep.generate_points())
    }

    pub fn regime_map(&mut self, sweep: &SweepDefinition) -> FlowResult<RegimeMap> {
        self.transition_lines(sweep)?.cut()
    }

    /// Mixture Reynolds number per operating point.
    pub fn reynolds(&mut self) -> FlowResult<Series> {
        let props = self.properties()?;
        let d = self.state.d_m();
        let pairs = self.state.velocity_pairs()?;
        let n = tp_core::series::broadcast_len(
            &[&props.rho_g, &props.rho_l, &props.mu_g, &props.mu_l],
            "phase properties",
        )?
        .max(pairs.len());

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let (v_sg, v_sl) = pair_at(&pairs, i)?;
            out.push(reynolds(
                series_at(&props.rho_g, i, n)?,
                series_at(&props.rho_l, i, n)?,
                series_at(&props.mu_g, i, n)?,
                series_at(&props.mu_l, i, n)?,
                d,
                ReynoldsInputs::from_velocities(v_sg, v_sl),
            )?);
        }
        Ok(collapse(out))
    }

    /// Elongated-bubble velocity per operating point.
    ///
    /// Liquid properties are only evaluated for models that read them; the
    /// result then broadcasts over them as well as over the velocities.
    pub fn eb_velocity(&mut self, model: EbModel) -> FlowResult<Series> {
        let liquid = if model.needs_liquid() {
            Some((self.rho_l()?, self.mu_l()?))
        } else {
            None
        };
        let pairs = self.state.velocity_pairs()?;
        let n = match &liquid {
            Some((rho_l, mu_l)) => {
                tp_core::series::broadcast_len(&[rho_l, mu_l], "liquid properties")?
                    .max(pairs.len())
            }
            None => pairs.len(),
        };

        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let (v_sg, v_sl) = pair_at(&pairs, i)?;
            let liquid = match &liquid {
                Some((rho_l, mu_l)) => Some(LiquidProperties {
                    rho: series_at(rho_l, i, n)?,
                    mu: series_at(mu_l, i, n)?,
                }),
                None => None,
            };
            let inputs = EbInputs {
                v_sg,
                v_sl,
                d: self.state.d_m(),
                theta_deg: self.state.theta_deg(),
                g: self.g,
                liquid,
            };
            out.push(model.velocity(&inputs)?);
        }
        Ok(collapse(out))
    }

    /// Every elongated-bubble model, in [`EbModel::ALL`] order.
    pub fn eb_velocities(&mut self) -> FlowResult<Vec<(EbModel, Series)>> {
        EbModel::ALL
            .into_iter()
            .map(|model| Ok((model, self.eb_velocity(model)?)))
            .collect()
    }

    /// Fit `C0`, `C1` against measured void fractions of the operating points.
    pub fn drift_flux(&self, measured_gvf: &[Real]) -> FlowResult<DriftFluxFit> {
        let pairs = self.state.velocity_pairs()?;
        let v_sg: Vec<Real> = pairs.iter().map(|p| p.0).collect();
        let v_m: Vec<Real> = pairs.iter().map(|p| p.0 + p.1).collect();
        fit_drift_flux(&v_sg, &v_m, measured_gvf)
    }
}

fn pair_at(pairs: &[(Real, Real)], i: usize) -> FlowResult<(Real, Real)> {
    match pairs {
        [single] => Ok(*single),
        _ => pairs.get(i).copied().ok_or_else(|| {
            TpError::LengthMismatch {
                what: "operating points vs phase properties",
                expected: i + 1,
                found: pairs.len(),
            }
            .into()
        }),
    }
}

fn series_at(s: &Series, i: usize, n: usize) -> FlowResult<Real> {
    s.get(i).ok_or_else(|| {
        TpError::LengthMismatch {
            what: "phase properties vs operating points",
            expected: n,
            found: s.len().unwrap_or(1),
        }
        .into()
    })
}

fn collapse(values: Vec<Real>) -> Series {
    match values.as_slice() {
        [single] => Series::Scalar(*single),
        _ => Series::Array(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tp_core::m;
    use tp_fluids::{FluidResult, KnownVariable};

    struct Fixed;

    impl PropertyOracle for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn query(
            &self,
            property: PropertyKind,
            _first: KnownVariable,
            _second: KnownVariable,
            fluid: Species,
        ) -> FluidResult<Real> {
            Ok(match (property, fluid) {
                (PropertyKind::Density, Species::Water) => 997.0,
                (PropertyKind::Density, _) => 1.77,
                (PropertyKind::Viscosity, Species::Water) => 8.9e-4,
                (PropertyKind::Viscosity, _) => 1.85e-5,
                (PropertyKind::SurfaceTension, _) => 0.072,
            })
        }
    }

    fn session() -> TwoPhase {
        let mut tp = TwoPhase::new(Species::Water, Species::Air, m(0.0525), Arc::new(Fixed)).unwrap();
        tp.set_temperature_c(25.0);
        tp.set_pressure_pa(151_325.0);
        tp.set_length(m(8.1)).unwrap();
        tp
    }

    #[test]
    fn properties_come_from_the_right_phase() {
        let mut tp = session();
        assert_eq!(tp.rho_l().unwrap(), Series::from(997.0));
        assert_eq!(tp.rho_g().unwrap(), Series::from(1.77));
        assert_eq!(tp.sigma().unwrap(), Series::from(0.072));
    }

    #[test]
    fn override_registration_refreshes_cache() {
        let mut tp = session();
        assert_eq!(tp.rho_g().unwrap(), Series::from(1.77));
        tp.set_density_override(Phase::Gas, Arc::new(|_t: f64, p: f64| p / (287.0 * 298.15)));
        let rho = tp.rho_g().unwrap().as_scalar().unwrap();
        assert!((rho - 151_325.0 / (287.0 * 298.15)).abs() < 1e-12);
        assert_eq!(tp.rho_l().unwrap(), Series::from(997.0));

        tp.clear_override(PropertyKind::Density, Phase::Gas);
        assert_eq!(tp.rho_g().unwrap(), Series::from(1.77));
    }

    #[test]
    fn pinned_property_is_used_by_the_classifier() {
        let mut tp = session();
        tp.set_v_sg(0.05).unwrap();
        tp.set_v_sl(1.0).unwrap();
        tp.set_property(PropertyKind::Density, Phase::Gas, ManualValue::Pinned(5.0.into()))
            .unwrap();
        assert_eq!(tp.pattern_inputs().unwrap().rho_g, Series::from(5.0));
        assert!(tp
            .set_property(PropertyKind::SurfaceTension, Phase::Gas, ManualValue::Unset)
            .is_err());
    }

    #[test]
    fn classify_with_replaced_inputs() {
        let mut tp = session();
        tp.set_v_sg(0.05).unwrap();
        tp.set_v_sl(1.0).unwrap();
        assert_eq!(
            tp.classify().unwrap().labels,
            vec![Some(crate::RegimeLabel::Bubbles)]
        );
        let narrow = tp.classify_with(|inputs| inputs.d = 0.050.into()).unwrap();
        assert_eq!(narrow.labels, vec![Some(crate::RegimeLabel::Slug)]);
    }

    #[test]
    fn reynolds_per_point() {
        let mut tp = session();
        tp.set_v_sg(vec![0.5, 1.0]).unwrap();
        tp.set_v_sl(vec![0.5, 1.0]).unwrap();
        let re = tp.reynolds().unwrap().values();
        assert_eq!(re.len(), 2);
        assert!((re[1] / re[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn eb_models_over_points() {
        let mut tp = session();
        tp.set_v_sg(vec![0.5, 1.0, 1.5]).unwrap();
        tp.set_v_sl(0.5).unwrap();
        let all = tp.eb_velocities().unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|(_, v)| v.len() == Some(3)));
        let dukler = tp.eb_velocity(EbModel::Dukler1985).unwrap().values();
        assert!((dukler[0] - 1.225).abs() < 1e-12);
    }

    #[test]
    fn gravity_must_be_positive() {
        let mut tp = session();
        assert!(tp.set_gravity(0.0).is_err());
        tp.set_gravity(9.80665).unwrap();
        assert_eq!(tp.gravity(), 9.80665);
    }
}
