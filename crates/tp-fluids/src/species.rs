//! Working fluids for gas-liquid pipe flow.

use crate::error::FluidError;

/// Pure (or pseudo-pure) fluids available as either phase of the mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Water (H₂O)
    Water,
    /// Air (pseudo-pure backend fluid)
    Air,
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Methane (CH₄)
    CH4,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Hydrogen (H₂)
    H2,
    /// Ammonia (NH₃)
    Ammonia,
    /// Propane
    Propane,
    /// n-Butane
    NButane,
    /// n-Hexane
    NHexane,
    /// Refrigerant R134a
    R134a,
}

impl Species {
    pub const ALL: [Species; 14] = [
        Species::Water,
        Species::Air,
        Species::N2,
        Species::O2,
        Species::CO2,
        Species::CH4,
        Species::Ar,
        Species::He,
        Species::H2,
        Species::Ammonia,
        Species::Propane,
        Species::NButane,
        Species::NHexane,
        Species::R134a,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::Water => "water",
            Species::Air => "air",
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::CO2 => "CO2",
            Species::CH4 => "CH4",
            Species::Ar => "Ar",
            Species::He => "He",
            Species::H2 => "H2",
            Species::Ammonia => "NH3",
            Species::Propane => "Propane",
            Species::NButane => "nButane",
            Species::NHexane => "nHexane",
            Species::R134a => "R134a",
        }
    }

    /// Get CoolProp fluid name for this species.
    pub fn coolprop_name(&self) -> &'static str {
        match self {
            Species::Water => "Water",
            Species::Air => "Air",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::CO2 => "CarbonDioxide",
            Species::CH4 => "Methane",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::H2 => "Hydrogen",
            Species::Ammonia => "Ammonia",
            Species::Propane => "n-Propane",
            Species::NButane => "n-Butane",
            Species::NHexane => "n-Hexane",
            Species::R134a => "R134a",
        }
    }

    /// Map to rfluids Pure enum (internal use for CoolProp backend).
    pub(crate) fn rfluids_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::Water => Pure::Water,
            Species::Air => Pure::Air,
            Species::N2 => Pure::Nitrogen,
            Species::O2 => Pure::Oxygen,
            Species::CO2 => Pure::CarbonDioxide,
            Species::CH4 => Pure::Methane,
            Species::Ar => Pure::Argon,
            Species::He => Pure::Helium,
            Species::H2 => Pure::Hydrogen,
            Species::Ammonia => Pure::Ammonia,
            Species::Propane => Pure::nPropane,
            Species::NButane => Pure::nButane,
            Species::NHexane => Pure::nHexane,
            Species::R134a => Pure::R134a,
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::Water => "Water",
            Species::Air => "Air",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::CO2 => "Carbon Dioxide",
            Species::CH4 => "Methane",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::H2 => "Hydrogen",
            Species::Ammonia => "Ammonia",
            Species::Propane => "Propane",
            Species::NButane => "n-Butane",
            Species::NHexane => "n-Hexane",
            Species::R134a => "R134a",
        }
    }
}

impl std::str::FromStr for Species {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WATER" | "H2O" => Ok(Species::Water),
            "AIR" => Ok(Species::Air),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "NH3" | "AMMONIA" => Ok(Species::Ammonia),
            "PROPANE" | "N-PROPANE" | "C3H8" => Ok(Species::Propane),
            "NBUTANE" | "N-BUTANE" | "BUTANE" => Ok(Species::NButane),
            "NHEXANE" | "N-HEXANE" | "HEXANE" => Ok(Species::NHexane),
            "R134A" => Ok(Species::R134a),
            _ => Err(FluidError::UnknownFluid {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolprop_mapping() {
        assert_eq!(Species::Water.coolprop_name(), "Water");
        assert_eq!(Species::CO2.coolprop_name(), "CarbonDioxide");
        assert_eq!(Species::Propane.coolprop_name(), "n-Propane");
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("water".parse::<Species>().unwrap(), Species::Water);
        assert_eq!(" Air ".parse::<Species>().unwrap(), Species::Air);
        assert_eq!("Carbon Dioxide".parse::<Species>().unwrap(), Species::CO2);
        assert_eq!("NH3".parse::<Species>().unwrap(), Species::Ammonia);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "mercury vapour".parse::<Species>().unwrap_err();
        assert_eq!(
            err,
            FluidError::UnknownFluid {
                name: "mercury vapour".into()
            }
        );
    }

    #[test]
    fn canonical_keys_roundtrip() {
        for species in Species::ALL {
            let parsed = species
                .key()
                .parse::<Species>()
                .expect("canonical key should parse");
            assert_eq!(parsed, species);
        }
    }
}
