//! Setup file schema.

use serde::{Deserialize, Serialize};
use tp_flow::{SweepDefinition, SweepSpacing};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setup {
    pub version: u32,
    pub name: String,
    pub pipe: PipeDef,
    pub fluids: FluidsDef,
    /// Gravitational acceleration [m/s²]
    #[serde(default = "default_gravity")]
    pub gravity_mps2: f64,
    #[serde(default)]
    pub operating_points: Vec<OperatingPointDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub diameter_m: f64,
    #[serde(default)]
    pub length_m: f64,
    /// From horizontal; 90 is upward vertical
    #[serde(default = "default_inclination")]
    pub inclination_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidsDef {
    pub liquid: String,
    pub gas: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperatingPointDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub v_sl: f64,
    pub v_sg: f64,
    pub t_c: f64,
    pub p_pa: f64,
}

/// Gas velocity range of the regime map.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub start: f64,
    pub end: f64,
    pub points: usize,
    #[serde(default)]
    pub spacing: SweepSpacing,
}

impl SweepDef {
    pub fn to_sweep(&self) -> SweepDefinition {
        SweepDefinition {
            start: self.start,
            end: self.end,
            num_points: self.points,
            spacing: self.spacing,
        }
    }
}

fn default_gravity() -> f64 {
    9.81
}

fn default_inclination() -> f64 {
    90.0
}
