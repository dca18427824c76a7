//! Lazily evaluated, version-checked property values.
//!
//! A [`CachedProperty`] remembers the value it computed together with the
//! version of the state it was computed from. Reading it again returns the
//! stored value until the state version moves on. A manually pinned value is
//! never recomputed until it is unset.

use crate::error::{FluidError, FluidResult};
use crate::property::{Phase, PropertyKind};
use crate::resolver::{FluidPropertyResolver, PhaseResolvers};
use crate::species::Species;
use tp_core::{Real, Series};

/// Read-only view of the operating state needed to evaluate properties.
pub trait PropertyContext {
    /// Monotonic token that changes whenever any input of the state changes.
    fn version(&self) -> u64;
    /// Temperature [°C], scalar or per point.
    fn temperature_c(&self) -> &Series;
    /// Pressure [Pa], scalar or per point.
    fn pressure_pa(&self) -> &Series;
    /// Working fluid of a phase.
    fn fluid(&self, phase: Phase) -> Species;
}

/// Explicit assignment to a cached property.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualValue {
    /// Use this value until unset, regardless of state changes.
    Pinned(Series),
    /// Drop the pin and any stored value; recompute on next read.
    Unset,
}

#[derive(Debug, Clone)]
pub struct CachedProperty {
    kind: PropertyKind,
    phase: Phase,
    quality: Real,
    last_version: Option<u64>,
    value: Option<Series>,
    manual: bool,
}

impl CachedProperty {
    pub fn new(kind: PropertyKind, phase: Phase) -> Self {
        Self {
            kind,
            phase,
            quality: 0.0,
            last_version: None,
            value: None,
            manual: false,
        }
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_pinned(&self) -> bool {
        self.manual
    }

    /// Value currently held, without evaluating anything.
    pub fn peek(&self) -> Option<&Series> {
        self.value.as_ref()
    }

    /// Vapour quality used for surface tension lookups.
    pub fn quality(&self) -> Real {
        self.quality
    }

    pub fn set_quality(&mut self, quality: Real) {
        self.quality = quality;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        if !self.manual {
            self.value = None;
            self.last_version = None;
        }
    }

    pub fn set(&mut self, value: ManualValue) {
        match value {
            ManualValue::Pinned(v) => {
                self.value = Some(v);
                self.manual = true;
            }
            ManualValue::Unset => {
                self.value = None;
                self.manual = false;
                self.last_version = None;
            }
        }
    }

    /// Current value, evaluated through `resolver` if the state changed.
    pub fn get<C>(&mut self, ctx: &C, resolver: &FluidPropertyResolver) -> FluidResult<&Series>
    where
        C: PropertyContext + ?Sized,
    {
        if resolver.phase() != self.phase {
            return Err(FluidError::InvalidArg {
                what: "resolver phase does not match cached property",
            });
        }
        let version = ctx.version();
        let stale = !self.manual && (self.value.is_none() || self.last_version != Some(version));
        if stale {
            let fluid = ctx.fluid(self.phase);
            let value = match self.kind {
                PropertyKind::SurfaceTension => {
                    resolver.resolve_surface_tension(fluid, ctx.temperature_c(), self.quality)?
                }
                PropertyKind::Density | PropertyKind::Viscosity => resolver.resolve(
                    self.kind,
                    fluid,
                    ctx.temperature_c(),
                    ctx.pressure_pa(),
                )?,
            };
            tracing::debug!(
                property = %self.kind,
                phase = %self.phase,
                version,
                "recomputed cached property"
            );
            self.last_version = Some(version);
            self.value = Some(value);
        }
        self.value.as_ref().ok_or(FluidError::InvalidArg {
            what: "cached property has no value",
        })
    }
}

/// The five cached properties of a two-phase analysis.
#[derive(Debug, Clone)]
pub struct PropertyCaches {
    pub rho_l: CachedProperty,
    pub rho_g: CachedProperty,
    pub mu_l: CachedProperty,
    pub mu_g: CachedProperty,
    /// Liquid surface tension.
    pub sigma: CachedProperty,
}

impl Default for PropertyCaches {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyCaches {
    pub fn new() -> Self {
        Self {
            rho_l: CachedProperty::new(PropertyKind::Density, Phase::Liquid),
            rho_g: CachedProperty::new(PropertyKind::Density, Phase::Gas),
            mu_l: CachedProperty::new(PropertyKind::Viscosity, Phase::Liquid),
            mu_g: CachedProperty::new(PropertyKind::Viscosity, Phase::Gas),
            sigma: CachedProperty::new(PropertyKind::SurfaceTension, Phase::Liquid),
        }
    }

    pub fn entry(&self, kind: PropertyKind, phase: Phase) -> Option<&CachedProperty> {
        match (kind, phase) {
            (PropertyKind::Density, Phase::Liquid) => Some(&self.rho_l),
            (PropertyKind::Density, Phase::Gas) => Some(&self.rho_g),
            (PropertyKind::Viscosity, Phase::Liquid) => Some(&self.mu_l),
            (PropertyKind::Viscosity, Phase::Gas) => Some(&self.mu_g),
            (PropertyKind::SurfaceTension, Phase::Liquid) => Some(&self.sigma),
            (PropertyKind::SurfaceTension, Phase::Gas) => None,
        }
    }

    pub fn entry_mut(&mut self, kind: PropertyKind, phase: Phase) -> Option<&mut CachedProperty> {
        match (kind, phase) {
            (PropertyKind::Density, Phase::Liquid) => Some(&mut self.rho_l),
            (PropertyKind::Density, Phase::Gas) => Some(&mut self.rho_g),
            (PropertyKind::Viscosity, Phase::Liquid) => Some(&mut self.mu_l),
            (PropertyKind::Viscosity, Phase::Gas) => Some(&mut self.mu_g),
            (PropertyKind::SurfaceTension, Phase::Liquid) => Some(&mut self.sigma),
            (PropertyKind::SurfaceTension, Phase::Gas) => None,
        }
    }

    /// Read a property, evaluating it through the resolver of its phase.
    pub fn get<C>(
        &mut self,
        kind: PropertyKind,
        phase: Phase,
        ctx: &C,
        resolvers: &PhaseResolvers,
    ) -> FluidResult<&Series>
    where
        C: PropertyContext + ?Sized,
    {
        let entry = self.entry_mut(kind, phase).ok_or(FluidError::InvalidArg {
            what: "surface tension is only tracked for the liquid phase",
        })?;
        entry.get(ctx, resolvers.for_phase(phase))
    }

    pub fn invalidate_all(&mut self) {
        for entry in self.iter_mut() {
            entry.invalidate();
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut CachedProperty> {
        [
            &mut self.rho_l,
            &mut self.rho_g,
            &mut self.mu_l,
            &mut self.mu_g,
            &mut self.sigma,
        ]
        .into_iter()
    }
}
