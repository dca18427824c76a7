//! End-to-end use of a [`TwoPhase`] session against a fake property backend.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tp_core::{Real, Series, m};
use tp_flow::{EbModel, RegimeLabel, SweepDefinition, SweepSpacing, TwoPhase};
use tp_fluids::{FluidResult, KnownVariable, Phase, PropertyKind, PropertyOracle, Species};

#[derive(Default)]
struct TableOracle {
    calls: AtomicUsize,
}

impl PropertyOracle for TableOracle {
    fn name(&self) -> &str {
        "table"
    }

    fn query(
        &self,
        property: PropertyKind,
        _first: KnownVariable,
        _second: KnownVariable,
        fluid: Species,
    ) -> FluidResult<Real> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let liquid = fluid == Species::Water;
        Ok(match property {
            PropertyKind::Density if liquid => 997.0,
            PropertyKind::Density => 1.77,
            PropertyKind::Viscosity if liquid => 8.9e-4,
            PropertyKind::Viscosity => 1.85e-5,
            PropertyKind::SurfaceTension => 0.072,
        })
    }
}

fn session(oracle: Arc<TableOracle>) -> TwoPhase {
    let mut tp = TwoPhase::new(Species::Water, Species::Air, m(0.0525), oracle).unwrap();
    tp.set_temperature_c(25.0);
    tp.set_pressure_pa(101_325.0 + 50_000.0);
    tp.set_length(m(8.1)).unwrap();
    tp
}

#[test]
fn reference_operating_point() {
    let mut tp = session(Arc::default());
    tp.set_v_sl(1.0).unwrap();
    tp.set_v_sg(0.05).unwrap();
    let result = tp.classify().unwrap();
    assert_eq!(result.labels, vec![Some(RegimeLabel::Bubbles)]);

    tp.set_diameter(m(0.050)).unwrap();
    tp.set_v_sl(1.0).unwrap();
    tp.set_v_sg(0.05).unwrap();
    assert_eq!(tp.classify().unwrap().labels, vec![Some(RegimeLabel::Slug)]);
}

#[test]
fn gas_rate_round_trip() {
    let mut tp = session(Arc::default());
    let q_g = 1.234e-3;
    tp.set_q_g(q_g).unwrap();
    let v_sg = tp.state().v_sg().clone();
    tp.set_v_sg(v_sg).unwrap();
    let back = tp.state().q_g().as_scalar().unwrap();
    assert!((back - q_g).abs() <= 1e-15 * q_g.max(1.0));
}

#[test]
fn properties_are_fetched_once_per_state_version() {
    let oracle = Arc::new(TableOracle::default());
    let mut tp = session(oracle.clone());
    tp.set_v_sg(vec![0.05, 1.0, 15.0]).unwrap();
    tp.set_v_sl(1.0).unwrap();

    tp.classify().unwrap();
    let after_first = oracle.calls.load(Ordering::SeqCst);
    assert_eq!(after_first, 5);

    tp.classify().unwrap();
    tp.reynolds().unwrap();
    assert_eq!(oracle.calls.load(Ordering::SeqCst), after_first);

    tp.set_temperature_c(30.0);
    tp.classify().unwrap();
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 2 * after_first);
}

fn read_twice(tp: &mut TwoPhase) {
    for _ in 0..2 {
        tp.rho_l().unwrap();
        tp.mu_g().unwrap();
    }
}

#[test]
fn every_state_change_costs_one_lookup_per_property() {
    let oracle = Arc::new(TableOracle::default());
    let mut tp = session(oracle.clone());
    tp.set_v_sl(vec![1.0, 1.0, 1.0]).unwrap();
    tp.set_v_sg(vec![0.05, 1.0, 15.0]).unwrap();
    tp.rho_l().unwrap();
    tp.mu_g().unwrap();
    let calls = || oracle.calls.load(Ordering::SeqCst);
    let mut expected = calls();
    assert_eq!(expected, 2);

    tp.set_v_sg(vec![0.1, 1.0, 10.0]).unwrap();
    read_twice(&mut tp);
    expected += 2;
    assert_eq!(calls(), expected);

    tp.set_diameter(m(0.05)).unwrap();
    read_twice(&mut tp);
    expected += 2;
    assert_eq!(calls(), expected);

    tp.set_fluids(Species::Water, Species::N2);
    read_twice(&mut tp);
    expected += 2;
    assert_eq!(calls(), expected);

    // A rejected update leaves the state, and its version, untouched.
    assert!(tp.set_v_sg(vec![0.1, 0.2]).is_err());
    read_twice(&mut tp);
    assert_eq!(calls(), expected);
}

#[test]
fn classification_isolates_failing_points() {
    let mut tp = session(Arc::default());
    tp.set_v_sg(vec![0.05, -1.0, 0.0, 15.0]).unwrap();
    tp.set_v_sl(1.0).unwrap();
    let result = tp.classify().unwrap();
    assert_eq!(
        result.labels,
        vec![
            Some(RegimeLabel::Bubbles),
            None,
            Some(RegimeLabel::SinglePhase),
            Some(RegimeLabel::Annular),
        ]
    );
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].index, 1);
}

#[test]
fn gas_override_does_not_touch_liquid() {
    let mut tp = session(Arc::default());
    tp.set_density_override(Phase::Gas, Arc::new(|_t: f64, _p: f64| 3.0));
    assert_eq!(tp.rho_g().unwrap(), Series::from(3.0));
    assert_eq!(tp.rho_l().unwrap(), Series::from(997.0));
}

#[test]
fn regime_map_from_session() {
    let mut tp = session(Arc::default());
    tp.set_v_sg(0.05).unwrap();
    tp.set_v_sl(1.0).unwrap();
    let sweep = SweepDefinition::new(0.01, 10.0, 200, SweepSpacing::Logarithmic).unwrap();
    let map = tp.regime_map(&sweep).unwrap();
    assert!(map.intersections.fg.x > 2.0 && map.intersections.fg.x < 3.5);
    assert!((map.annular_onset - 12.0).abs() < 0.1);
}

#[test]
fn regime_map_needs_flow() {
    let mut tp = session(Arc::default());
    let sweep = SweepDefinition::new(0.01, 10.0, 20, SweepSpacing::Logarithmic).unwrap();
    assert!(tp.regime_map(&sweep).is_err());
}

#[test]
fn closures_and_drift_flux() {
    let mut tp = session(Arc::default());
    tp.set_v_sg(vec![0.5, 1.0, 2.0]).unwrap();
    tp.set_v_sl(0.5).unwrap();

    let nicklin = tp.eb_velocity(EbModel::Nicklin1962).unwrap().values();
    let drift = 0.351 * (9.81_f64 * 0.0525).sqrt();
    assert!((nicklin[0] - (1.2 * 1.0 + drift)).abs() < 1e-12);
    assert!(tp.eb_velocity(EbModel::PetalasAziz2000).is_ok());

    let (c0, c1) = (1.2, 0.3);
    let gvf: Vec<f64> = [(0.5, 1.0), (1.0, 1.5), (2.0, 2.5)]
        .iter()
        .map(|&(v_sg, v_m)| v_sg / (c0 * v_m + c1))
        .collect();
    let fit = tp.drift_flux(&gvf).unwrap();
    assert!((fit.c0 - c0).abs() < 1e-9);
    assert!((fit.c1 - c1).abs() < 1e-9);
}

#[test]
fn bubble_velocity_follows_per_point_liquid_properties() {
    let mut tp = session(Arc::default());
    tp.set_v_sg(0.5).unwrap();
    tp.set_v_sl(0.5).unwrap();
    tp.set_temperature_c(vec![20.0, 60.0]);
    tp.set_viscosity_override(Phase::Liquid, Arc::new(|t: f64, _p: f64| 1e-3 / t));

    let petalas = tp.eb_velocity(EbModel::PetalasAziz2000).unwrap().values();
    assert_eq!(petalas.len(), 2);
    // Lower viscosity, higher Reynolds number, smaller C0.
    assert!(petalas[0] > petalas[1]);

    // Models without liquid properties only see the scalar velocities.
    let nicklin = tp.eb_velocity(EbModel::Nicklin1962).unwrap();
    assert!(nicklin.as_scalar().is_some());
}
