//! tp-fluids: phase property resolution for two-phase pipe flow.
//!
//! Provides:
//! - Working fluid definitions (water, air, N2, CH4, ...)
//! - `PropertyOracle` trait isolating the thermophysical backend
//! - CoolProp backend (via `rfluids`)
//! - Per-phase resolvers (override function, default correlation, oracle)
//! - Version-checked property caches with manual pinning
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tp_fluids::{CoolPropOracle, FluidPropertyResolver, Phase, PropertyKind, Species};
//!
//! let resolver = FluidPropertyResolver::new(Phase::Liquid, Arc::new(CoolPropOracle::new()));
//! let rho = resolver
//!     .resolve_at(PropertyKind::Density, Species::Water, 25.0, 101_325.0)
//!     .unwrap();
//! println!("Density: {rho} kg/m³");
//! ```

pub mod cache;
pub mod coolprop;
pub mod error;
pub mod oracle;
pub mod property;
pub mod resolver;
pub mod species;

pub use cache::{CachedProperty, ManualValue, PropertyCaches, PropertyContext};
pub use coolprop::CoolPropOracle;
pub use error::{FluidError, FluidResult};
pub use oracle::{KnownVariable, PropertyOracle};
pub use property::{Phase, PropertyKind};
pub use resolver::{FluidPropertyResolver, PhaseResolvers, PropertyFn, PropertySlot, PropertySource};
pub use species::Species;
