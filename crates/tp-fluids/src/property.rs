//! Phase and property identifiers.

use std::fmt;

/// Which phase of the two-phase mixture a property belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Liquid,
    Gas,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Liquid, Phase::Gas];

    pub fn label(self) -> &'static str {
        match self {
            Phase::Liquid => "liquid",
            Phase::Gas => "gas",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Thermophysical property resolved by the property layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Density [kg/m³]
    Density,
    /// Dynamic viscosity [Pa·s]
    Viscosity,
    /// Surface tension [N/m], evaluated at saturation
    SurfaceTension,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 3] = [
        PropertyKind::Density,
        PropertyKind::Viscosity,
        PropertyKind::SurfaceTension,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PropertyKind::Density => "density",
            PropertyKind::Viscosity => "viscosity",
            PropertyKind::SurfaceTension => "surface tension",
        }
    }

    /// CoolProp output key.
    pub fn coolprop_code(self) -> &'static str {
        match self {
            PropertyKind::Density => "D",
            PropertyKind::Viscosity => "V",
            PropertyKind::SurfaceTension => "I",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
