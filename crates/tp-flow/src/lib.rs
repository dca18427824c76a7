//! tp-flow: two-phase gas-liquid pipe flow.
//!
//! Provides:
//! - Homogeneous mixture model (void fraction, mixture properties, Reynolds)
//! - Taitel, Barnea & Dukler (1980) flow-pattern classifier for upward vertical flow
//! - Transition-line sampling and clipping for flow-pattern maps
//! - Elongated-bubble velocity closures and friction factors
//! - Drift-flux parameter fitting
//! - A [`TwoPhase`] session tying state, property caches and models together
//!
//! # Example
//!
//! ```no_run
//! use tp_core::m;
//! use tp_flow::TwoPhase;
//! use tp_fluids::Species;
//!
//! let mut tp = TwoPhase::with_coolprop(Species::Water, Species::Air, m(0.0525))?;
//! tp.set_temperature_c(25.0);
//! tp.set_pressure_pa(151_325.0);
//! tp.set_length(m(8.1))?;
//! tp.set_v_sg(vec![0.05, 1.0, 15.0])?;
//! tp.set_v_sl(1.0)?;
//! for label in tp.classify()?.labels_text() {
//!     println!("{}", label.unwrap_or("-"));
//! }
//! # Ok::<(), tp_flow::FlowError>(())
//! ```

pub mod closures;
pub mod convert;
pub mod drift_flux;
pub mod error;
pub mod homogeneous;
pub mod pattern;
pub mod session;
pub mod solve;
pub mod state;
pub mod sweeps;
pub mod transition;

pub use closures::{EbInputs, EbModel, LiquidProperties};
pub use drift_flux::{DriftFluxFit, fit_drift_flux};
pub use error::{FlowError, FlowResult};
pub use pattern::{
    Boundary, Classification, MixtureProperties, PatternInputs, PointFailure, PointInputs,
    RegimeLabel, Taitel1980, TransitionValues,
};
pub use session::{PhaseProperties, TwoPhase};
pub use solve::{NewtonConfig, NewtonResult};
pub use state::PropertyState;
pub use sweeps::{SweepDefinition, SweepSpacing};
pub use transition::{
    Intersection, MapIntersections, RegimeMap, Segment, TransitionLineSolver, TransitionLines,
};
