//! Setup validation.

use crate::LATEST_VERSION;
use crate::schema::{OperatingPointDef, Setup};
use tp_fluids::Species;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown fluid '{name}' for the {phase} phase")]
    UnknownFluid { name: String, phase: &'static str },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

pub fn validate_setup(setup: &Setup) -> Result<(), ValidationError> {
    if setup.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: setup.version,
        });
    }

    positive("pipe.diameter_m", setup.pipe.diameter_m)?;
    non_negative("pipe.length_m", setup.pipe.length_m)?;
    if !setup.pipe.inclination_deg.is_finite() {
        return Err(invalid(
            "pipe.inclination_deg",
            setup.pipe.inclination_deg,
            "must be finite",
        ));
    }
    positive("gravity_mps2", setup.gravity_mps2)?;

    for (name, phase) in [(&setup.fluids.liquid, "liquid"), (&setup.fluids.gas, "gas")] {
        if name.parse::<Species>().is_err() {
            return Err(ValidationError::UnknownFluid {
                name: name.clone(),
                phase,
            });
        }
    }

    for (i, point) in setup.operating_points.iter().enumerate() {
        validate_point(i, point)?;
    }

    if let Some(sweep) = &setup.sweep {
        sweep
            .to_sweep()
            .validate()
            .map_err(|e| ValidationError::InvalidValue {
                field: "sweep".to_string(),
                value: sweep.to_sweep().to_string(),
                reason: e.to_string(),
            })?;
    }

    Ok(())
}

fn validate_point(i: usize, point: &OperatingPointDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("operating_points[{i}].{name}");
    non_negative(field("v_sl"), point.v_sl)?;
    non_negative(field("v_sg"), point.v_sg)?;
    if !point.t_c.is_finite() {
        return Err(invalid(field("t_c"), point.t_c, "must be finite"));
    }
    if !(point.p_pa.is_finite() && point.p_pa > 0.0) {
        return Err(invalid(field("p_pa"), point.p_pa, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FluidsDef, PipeDef, SweepDef};
    use tp_flow::SweepSpacing;

    fn setup() -> Setup {
        Setup {
            version: 1,
            name: "test".into(),
            pipe: PipeDef {
                diameter_m: 0.0525,
                length_m: 8.1,
                inclination_deg: 90.0,
            },
            fluids: FluidsDef {
                liquid: "water".into(),
                gas: "air".into(),
            },
            gravity_mps2: 9.81,
            operating_points: vec![OperatingPointDef {
                label: None,
                v_sl: 1.0,
                v_sg: 0.05,
                t_c: 25.0,
                p_pa: 151_325.0,
            }],
            sweep: None,
        }
    }

    #[test]
    fn accepts_valid_setup() {
        validate_setup(&setup()).unwrap();
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut s = setup();
        s.pipe.diameter_m = 0.0;
        assert!(matches!(
            validate_setup(&s),
            Err(ValidationError::InvalidValue { field, .. }) if field == "pipe.diameter_m"
        ));
    }

    #[test]
    fn rejects_unknown_fluid() {
        let mut s = setup();
        s.fluids.gas = "phlogiston".into();
        assert!(matches!(
            validate_setup(&s),
            Err(ValidationError::UnknownFluid { phase: "gas", .. })
        ));
    }

    #[test]
    fn rejects_negative_velocity() {
        let mut s = setup();
        s.operating_points[0].v_sg = -0.1;
        let err = validate_setup(&s).unwrap_err();
        assert!(err.to_string().contains("operating_points[0].v_sg"));
    }

    #[test]
    fn rejects_bad_sweep() {
        let mut s = setup();
        s.sweep = Some(SweepDef {
            start: 0.0,
            end: 10.0,
            points: 50,
            spacing: SweepSpacing::Logarithmic,
        });
        assert!(validate_setup(&s).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let mut s = setup();
        s.version = LATEST_VERSION + 1;
        assert_eq!(
            validate_setup(&s),
            Err(ValidationError::UnsupportedVersion {
                version: LATEST_VERSION + 1
            })
        );
    }
}
