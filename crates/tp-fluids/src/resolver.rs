//! Property resolution strategy.
//!
//! Every phase owns one [`FluidPropertyResolver`]. For each property kind the
//! resolver holds a [`PropertySlot`] describing where values come from:
//!
//! 1. an override function, when one is registered;
//! 2. the phase's default correlation, when it is enabled;
//! 3. otherwise the external [`PropertyOracle`].
//!
//! User functions take the temperature in °C and the pressure in Pa (surface
//! tension functions take °C and vapour quality). The oracle always receives
//! absolute temperature.

use crate::error::{FluidError, FluidResult};
use crate::oracle::{KnownVariable, PropertyOracle};
use crate::property::{Phase, PropertyKind};
use crate::species::Species;
use std::fmt;
use std::sync::Arc;
use tp_core::series::broadcast_len;
use tp_core::units::constants::celsius_to_kelvin;
use tp_core::{Real, Series};

/// User-supplied property function `f(T [°C], P [Pa] or x [-])`.
pub type PropertyFn = Arc<dyn Fn(Real, Real) -> Real + Send + Sync>;

/// Strategy selected for one property of one phase.
#[derive(Clone, Copy)]
pub enum PropertySource<'a> {
    Override(&'a PropertyFn),
    Correlation(&'a PropertyFn),
    Oracle,
}

impl PropertySource<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            PropertySource::Override(_) => "override",
            PropertySource::Correlation(_) => "correlation",
            PropertySource::Oracle => "oracle",
        }
    }
}

impl fmt::Debug for PropertySource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for a single (phase, property) pair.
#[derive(Clone, Default)]
pub struct PropertySlot {
    override_fn: Option<PropertyFn>,
    correlation: Option<PropertyFn>,
    use_correlation: bool,
}

impl PropertySlot {
    pub fn source(&self) -> PropertySource<'_> {
        if let Some(f) = &self.override_fn {
            return PropertySource::Override(f);
        }
        match &self.correlation {
            Some(f) if self.use_correlation => PropertySource::Correlation(f),
            _ => PropertySource::Oracle,
        }
    }
}

impl fmt::Debug for PropertySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySlot")
            .field("source", &self.source())
            .field("has_correlation", &self.correlation.is_some())
            .finish()
    }
}

/// Resolves density, viscosity and surface tension for one phase.
#[derive(Clone)]
pub struct FluidPropertyResolver {
    phase: Phase,
    oracle: Arc<dyn PropertyOracle>,
    density: PropertySlot,
    viscosity: PropertySlot,
    surface_tension: PropertySlot,
}

impl FluidPropertyResolver {
    pub fn new(phase: Phase, oracle: Arc<dyn PropertyOracle>) -> Self {
        Self {
            phase,
            oracle,
            density: PropertySlot::default(),
            viscosity: PropertySlot::default(),
            surface_tension: PropertySlot::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn oracle(&self) -> &dyn PropertyOracle {
        self.oracle.as_ref()
    }

    pub fn slot(&self, kind: PropertyKind) -> &PropertySlot {
        match kind {
            PropertyKind::Density => &self.density,
            PropertyKind::Viscosity => &self.viscosity,
            PropertyKind::SurfaceTension => &self.surface_tension,
        }
    }

    fn slot_mut(&mut self, kind: PropertyKind) -> &mut PropertySlot {
        match kind {
            PropertyKind::Density => &mut self.density,
            PropertyKind::Viscosity => &mut self.viscosity,
            PropertyKind::SurfaceTension => &mut self.surface_tension,
        }
    }

    /// Replace the oracle lookup (and any correlation) until cleared.
    pub fn set_override(&mut self, kind: PropertyKind, f: PropertyFn) {
        self.slot_mut(kind).override_fn = Some(f);
    }

    pub fn clear_override(&mut self, kind: PropertyKind) {
        self.slot_mut(kind).override_fn = None;
    }

    /// Store a default correlation; it is used only while `use_correlation` is set.
    pub fn set_correlation(&mut self, kind: PropertyKind, f: PropertyFn, use_correlation: bool) {
        let slot = self.slot_mut(kind);
        slot.correlation = Some(f);
        slot.use_correlation = use_correlation;
    }

    pub fn use_correlation(&mut self, kind: PropertyKind, enabled: bool) {
        self.slot_mut(kind).use_correlation = enabled;
    }

    /// Resolve one property at one point.
    ///
    /// `second` is the pressure [Pa] for density and viscosity and the vapour
    /// quality [-] for surface tension.
    pub fn resolve_at(
        &self,
        kind: PropertyKind,
        fluid: Species,
        t_c: Real,
        second: Real,
    ) -> FluidResult<Real> {
        let value = match self.slot(kind).source() {
            PropertySource::Override(f) | PropertySource::Correlation(f) => {
                let v = f(t_c, second);
                if !v.is_finite() {
                    return Err(FluidError::NonPhysical {
                        what: "user property function result",
                        value: v,
                    });
                }
                v
            }
            PropertySource::Oracle => {
                let t = KnownVariable::Temperature(celsius_to_kelvin(t_c));
                match kind {
                    PropertyKind::SurfaceTension => self.oracle.query(
                        kind,
                        KnownVariable::Quality(second),
                        t,
                        fluid,
                    )?,
                    PropertyKind::Density | PropertyKind::Viscosity => self.oracle.query(
                        kind,
                        t,
                        KnownVariable::Pressure(second),
                        fluid,
                    )?,
                }
            }
        };
        Ok(value)
    }

    /// Resolve a property over scalar-or-array temperature and pressure.
    pub fn resolve(
        &self,
        kind: PropertyKind,
        fluid: Species,
        t_c: &Series,
        p_pa: &Series,
    ) -> FluidResult<Series> {
        if let (Some(t), Some(p)) = (t_c.as_scalar(), p_pa.as_scalar()) {
            return Ok(Series::Scalar(self.resolve_at(kind, fluid, t, p)?));
        }
        let n = broadcast_len(&[t_c, p_pa], "temperature/pressure")?;
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let (Some(t), Some(p)) = (t_c.get(i), p_pa.get(i)) else {
                return Err(FluidError::InvalidArg {
                    what: "temperature/pressure index out of range",
                });
            };
            out.push(self.resolve_at(kind, fluid, t, p)?);
        }
        Ok(Series::Array(out))
    }

    /// Surface tension at saturation for vapour quality `x`.
    pub fn resolve_surface_tension(
        &self,
        fluid: Species,
        t_c: &Series,
        quality: Real,
    ) -> FluidResult<Series> {
        t_c.try_map(|t| self.resolve_at(PropertyKind::SurfaceTension, fluid, t, quality))
    }
}

impl fmt::Debug for FluidPropertyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FluidPropertyResolver")
            .field("phase", &self.phase)
            .field("oracle", &self.oracle.name())
            .field("density", &self.density)
            .field("viscosity", &self.viscosity)
            .field("surface_tension", &self.surface_tension)
            .finish()
    }
}

/// The pair of per-phase resolvers used by a session.
#[derive(Clone, Debug)]
pub struct PhaseResolvers {
    pub liquid: FluidPropertyResolver,
    pub gas: FluidPropertyResolver,
}

impl PhaseResolvers {
    pub fn new(oracle: Arc<dyn PropertyOracle>) -> Self {
        Self {
            liquid: FluidPropertyResolver::new(Phase::Liquid, Arc::clone(&oracle)),
            gas: FluidPropertyResolver::new(Phase::Gas, oracle),
        }
    }

    pub fn for_phase(&self, phase: Phase) -> &FluidPropertyResolver {
        match phase {
            Phase::Liquid => &self.liquid,
            Phase::Gas => &self.gas,
        }
    }

    pub fn for_phase_mut(&mut self, phase: Phase) -> &mut FluidPropertyResolver {
        match phase {
            Phase::Liquid => &mut self.liquid,
            Phase::Gas => &mut self.gas,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every query and answers with a fixed value per property.
    #[derive(Default)]
    struct RecordingOracle {
        calls: Mutex<Vec<(PropertyKind, KnownVariable, KnownVariable, Species)>>,
    }

    impl PropertyOracle for RecordingOracle {
        fn name(&self) -> &str {
            "recording"
        }

        fn query(
            &self,
            property: PropertyKind,
            first: KnownVariable,
            second: KnownVariable,
            fluid: Species,
        ) -> FluidResult<Real> {
            self.calls
                .lock()
                .unwrap()
                .push((property, first, second, fluid));
            Ok(match property {
                PropertyKind::Density => 1000.0,
                PropertyKind::Viscosity => 1e-3,
                PropertyKind::SurfaceTension => 0.072,
            })
        }
    }

    #[test]
    fn oracle_receives_kelvin_and_pascal() {
        let oracle = Arc::new(RecordingOracle::default());
        let resolver = FluidPropertyResolver::new(Phase::Liquid, oracle.clone());
        let rho = resolver
            .resolve_at(PropertyKind::Density, Species::Water, 25.0, 151_325.0)
            .unwrap();
        assert_eq!(rho, 1000.0);

        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (kind, first, second, fluid) = calls[0];
        assert_eq!(kind, PropertyKind::Density);
        assert_eq!(fluid, Species::Water);
        assert!(matches!(first, KnownVariable::Temperature(t) if (t - 298.15).abs() < 1e-12));
        assert_eq!(second, KnownVariable::Pressure(151_325.0));
    }

    #[test]
    fn surface_tension_queries_saturation() {
        let oracle = Arc::new(RecordingOracle::default());
        let resolver = FluidPropertyResolver::new(Phase::Liquid, oracle.clone());
        resolver
            .resolve_surface_tension(Species::Water, &Series::from(20.0), 0.0)
            .unwrap();
        let calls = oracle.calls.lock().unwrap();
        assert_eq!(calls[0].1, KnownVariable::Quality(0.0));
    }

    #[test]
    fn override_beats_correlation_beats_oracle() {
        let oracle = Arc::new(RecordingOracle::default());
        let mut resolver = FluidPropertyResolver::new(Phase::Gas, oracle.clone());
        let kind = PropertyKind::Density;

        resolver.set_correlation(kind, Arc::new(|_, _| 2.0), true);
        resolver.set_override(kind, Arc::new(|_, _| 3.0));
        assert_eq!(resolver.resolve_at(kind, Species::Air, 20.0, 1e5).unwrap(), 3.0);

        resolver.clear_override(kind);
        assert_eq!(resolver.resolve_at(kind, Species::Air, 20.0, 1e5).unwrap(), 2.0);

        resolver.use_correlation(kind, false);
        assert_eq!(
            resolver.resolve_at(kind, Species::Air, 20.0, 1e5).unwrap(),
            1000.0
        );
        assert_eq!(oracle.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn correlation_without_flag_is_ignored() {
        let oracle = Arc::new(RecordingOracle::default());
        let mut resolver = FluidPropertyResolver::new(Phase::Liquid, oracle);
        resolver.set_correlation(PropertyKind::Viscosity, Arc::new(|_, _| 5.0), false);
        assert!(matches!(
            resolver.slot(PropertyKind::Viscosity).source(),
            PropertySource::Oracle
        ));
    }

    #[test]
    fn phases_have_independent_slots() {
        let oracle = Arc::new(RecordingOracle::default());
        let mut resolvers = PhaseResolvers::new(oracle);
        resolvers
            .for_phase_mut(Phase::Liquid)
            .set_override(PropertyKind::Density, Arc::new(|_, _| 999.0));
        assert!(matches!(
            resolvers.gas.slot(PropertyKind::Density).source(),
            PropertySource::Oracle
        ));
        assert_eq!(
            resolvers
                .gas
                .resolve_at(PropertyKind::Density, Species::Air, 20.0, 1e5)
                .unwrap(),
            1000.0
        );
    }

    #[test]
    fn array_inputs_resolve_element_wise() {
        let oracle = Arc::new(RecordingOracle::default());
        let resolver = FluidPropertyResolver::new(Phase::Liquid, oracle.clone());
        let out = resolver
            .resolve(
                PropertyKind::Density,
                Species::Water,
                &Series::from(vec![20.0, 25.0, 30.0]),
                &Series::from(101_325.0),
            )
            .unwrap();
        assert_eq!(out.len(), Some(3));
        assert_eq!(oracle.calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn non_finite_user_value_is_rejected() {
        let oracle = Arc::new(RecordingOracle::default());
        let mut resolver = FluidPropertyResolver::new(Phase::Liquid, oracle);
        resolver.set_override(PropertyKind::Density, Arc::new(|_, _| f64::NAN));
        assert!(matches!(
            resolver.resolve_at(PropertyKind::Density, Species::Water, 20.0, 1e5),
            Err(FluidError::NonPhysical { .. })
        ));
    }
}
