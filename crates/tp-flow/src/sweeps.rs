//! Gas superficial velocity sweeps for drawing transition lines.

use crate::error::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tp_core::{Real, Tolerances, nearly_equal};

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepSpacing {
    /// Uniformly spaced points
    #[default]
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// A range of gas superficial velocities [m/s].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepDefinition {
    pub start: Real,
    pub end: Real,
    pub num_points: usize,
    pub spacing: SweepSpacing,
}

impl SweepDefinition {
    pub fn new(start: Real, end: Real, num_points: usize, spacing: SweepSpacing) -> FlowResult<Self> {
        let sweep = Self {
            start,
            end,
            num_points,
            spacing,
        };
        sweep.validate()?;
        Ok(sweep)
    }

    pub fn validate(&self) -> FlowResult<()> {
        let invalid = |what: String| Err(FlowError::InvalidInput { what });
        if !(self.start.is_finite() && self.end.is_finite()) {
            return invalid("sweep bounds must be finite".into());
        }
        if self.num_points < 2 {
            return invalid("sweep must have at least 2 points".into());
        }
        if nearly_equal(self.start, self.end, Tolerances::default()) {
            return invalid("start and end values must be different".into());
        }
        if self.spacing == SweepSpacing::Logarithmic && (self.start <= 0.0 || self.end <= 0.0) {
            return invalid(format!(
                "logarithmic sweep needs positive bounds ({} .. {})",
                self.start, self.end
            ));
        }
        Ok(())
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<Real> {
        match self.spacing {
            SweepSpacing::Linear => self.generate_linear(),
            SweepSpacing::Logarithmic => self.generate_logarithmic(),
        }
    }

    fn generate_linear(&self) -> Vec<Real> {
        if self.num_points <= 1 {
            return vec![self.start];
        }
        let delta = (self.end - self.start) / (self.num_points - 1) as Real;
        let mut points: Vec<Real> = (0..self.num_points)
            .map(|i| self.start + i as Real * delta)
            .collect();
        // Ensure exact endpoint
        points[self.num_points - 1] = self.end;
        points
    }

    fn generate_logarithmic(&self) -> Vec<Real> {
        if self.num_points <= 1 || self.start <= 0.0 || self.end <= 0.0 {
            return self.generate_linear();
        }
        let (log_start, log_end) = (self.start.ln(), self.end.ln());
        let log_delta = (log_end - log_start) / (self.num_points - 1) as Real;
        let mut points: Vec<Real> = (0..self.num_points)
            .map(|i| (log_start + i as Real * log_delta).exp())
            .collect();
        points[self.num_points - 1] = self.end;
        points
    }
}

impl fmt::Display for SweepSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for SweepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v_sg sweep from {} to {} m/s ({} points, {})",
            self.start, self.end, self.num_points, self.spacing
        )
    }
}
