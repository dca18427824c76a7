//! Flow-pattern classification for upward gas-liquid pipe flow.
//!
//! Implements the Taitel, Barnea & Dukler (1980) map with the transition
//! equations in the form given by Shoham (2006), chapter 4. Five boundaries are
//! evaluated per operating point:
//!
//! | boundary | quantity | transition |
//! |----------|----------|------------|
//! | E | `v_sl_e` | bubble → slug |
//! | F | implicit residual | dispersed-bubble existence |
//! | G | `v_sl_g` | dispersed bubble → churn |
//! | H | `v_sl_h` | slug → churn |
//! | J | `v_sg_j` | annular onset |
//!
//! The label is then picked by a fixed priority cascade (first match wins):
//! annular, dispersed bubbles, bubbles/slug above E, churn above H, slug.

use crate::error::{FlowError, FlowResult};
use crate::homogeneous::{mixture_density, mixture_viscosity, void_fraction};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tp_core::series::broadcast_len;
use tp_core::{Real, Series, TpResult};

/// Minimum dimensionless diameter for bubble flow to exist.
pub const BUBBLE_EXISTENCE_LIMIT: Real = 4.36;

/// Flow regime predicted for one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegimeLabel {
    SinglePhase,
    DispersedBubbles,
    Bubbles,
    Slug,
    Churn,
    Annular,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 6] = [
        RegimeLabel::SinglePhase,
        RegimeLabel::DispersedBubbles,
        RegimeLabel::Bubbles,
        RegimeLabel::Slug,
        RegimeLabel::Churn,
        RegimeLabel::Annular,
    ];

    /// Numeric code, 0 (single phase) through 5 (annular).
    pub fn code(self) -> u8 {
        match self {
            RegimeLabel::SinglePhase => 0,
            RegimeLabel::DispersedBubbles => 1,
            RegimeLabel::Bubbles => 2,
            RegimeLabel::Slug => 3,
            RegimeLabel::Churn => 4,
            RegimeLabel::Annular => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegimeLabel::SinglePhase => "Single-phase",
            RegimeLabel::DispersedBubbles => "Dispersed bubbles",
            RegimeLabel::Bubbles => "Bubbles",
            RegimeLabel::Slug => "Slug",
            RegimeLabel::Churn => "Churn",
            RegimeLabel::Annular => "Annular",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegimeLabel {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FlowError::InvalidInput {
                what: format!("unknown flow regime '{wanted}'"),
            })
    }
}

/// Named transition boundaries of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    E,
    F,
    G,
    H,
    J,
}

impl Boundary {
    pub const ALL: [Boundary; 5] = [Boundary::E, Boundary::F, Boundary::G, Boundary::H, Boundary::J];

    pub fn description(self) -> &'static str {
        match self {
            Boundary::E => "bubble to slug",
            Boundary::F => "dispersed-bubble existence",
            Boundary::G => "dispersed bubble to churn",
            Boundary::H => "slug to churn",
            Boundary::J => "annular onset",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Boundary::E => "E",
            Boundary::F => "F",
            Boundary::G => "G",
            Boundary::H => "H",
            Boundary::J => "J",
        };
        write!(f, "{name} ({})", self.description())
    }
}

/// Properties entering the dispersed-bubble (F) residual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureProperties {
    pub rho_l: Real,
    pub rho_g: Real,
    /// Homogeneous mixture density [kg/m³]
    pub rho_m: Real,
    /// Homogeneous mixture viscosity [Pa·s]
    pub mu_m: Real,
    pub sigma: Real,
    pub d: Real,
    pub g: Real,
}

/// All inputs of a single operating point, SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointInputs {
    pub v_sg: Real,
    pub v_sl: Real,
    pub rho_g: Real,
    pub rho_l: Real,
    pub mu_g: Real,
    pub mu_l: Real,
    pub sigma: Real,
    pub g: Real,
    pub l: Real,
    pub d: Real,
}

impl PointInputs {
    fn validate(&self) -> FlowResult<()> {
        let fields = [
            ("v_sg", self.v_sg),
            ("v_sl", self.v_sl),
            ("rho_g", self.rho_g),
            ("rho_l", self.rho_l),
            ("mu_g", self.mu_g),
            ("mu_l", self.mu_l),
            ("sigma", self.sigma),
            ("g", self.g),
            ("l", self.l),
            ("d", self.d),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(FlowError::InvalidInput {
                    what: format!("{name} is not finite ({value})"),
                });
            }
        }
        if self.v_sg < 0.0 || self.v_sl < 0.0 {
            return Err(FlowError::InvalidInput {
                what: format!(
                    "superficial velocities must be non-negative (v_sg = {}, v_sl = {})",
                    self.v_sg, self.v_sl
                ),
            });
        }
        let positive = [
            ("rho_g", self.rho_g),
            ("mu_g", self.mu_g),
            ("mu_l", self.mu_l),
            ("sigma", self.sigma),
            ("g", self.g),
            ("d", self.d),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(FlowError::InvalidInput {
                    what: format!("{name} must be positive ({value})"),
                });
            }
        }
        if self.rho_l <= self.rho_g {
            return Err(FlowError::InvalidInput {
                what: format!(
                    "liquid must be denser than gas (rho_l = {}, rho_g = {})",
                    self.rho_l, self.rho_g
                ),
            });
        }
        if self.l < 0.0 {
            return Err(FlowError::InvalidInput {
                what: format!("pipe length must be non-negative ({})", self.l),
            });
        }
        Ok(())
    }

    /// Homogeneous mixture properties at this point.
    pub fn mixture(&self) -> FlowResult<MixtureProperties> {
        let gvf = void_fraction(self.v_sg, self.v_sl)?;
        Ok(self.mixture_with_void_fraction(gvf))
    }

    /// Mixture properties for an externally chosen void fraction.
    pub fn mixture_with_void_fraction(&self, gvf: Real) -> MixtureProperties {
        MixtureProperties {
            rho_l: self.rho_l,
            rho_g: self.rho_g,
            rho_m: mixture_density(gvf, self.rho_g, self.rho_l),
            mu_m: mixture_viscosity(gvf, self.mu_g, self.mu_l),
            sigma: self.sigma,
            d: self.d,
            g: self.g,
        }
    }
}

/// Boundary values evaluated at one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionValues {
    /// Critical liquid velocity of the bubble/slug transition [m/s]
    pub v_sl_e: Real,
    /// Dispersed-bubble residual, dispersed bubbles possible when `>= 0`
    pub f: Real,
    pub v_sl_g: Real,
    pub v_sl_h: Real,
    /// Gas velocity at annular onset [m/s]
    pub v_sg_j: Real,
    pub bubbles_possible: bool,
}

impl TransitionValues {
    fn ensure_finite(&self) -> FlowResult<()> {
        let values = [
            (Boundary::E, self.v_sl_e),
            (Boundary::F, self.f),
            (Boundary::G, self.v_sl_g),
            (Boundary::H, self.v_sl_h),
            (Boundary::J, self.v_sg_j),
        ];
        match values.into_iter().find(|(_, v)| !v.is_finite()) {
            Some((boundary, v)) => Err(FlowError::InvalidInput {
                what: format!("boundary {boundary} evaluated to {v}"),
            }),
            None => Ok(()),
        }
    }

    /// Priority cascade, first match wins.
    pub fn decide(&self, v_sg: Real, v_sl: Real) -> RegimeLabel {
        if v_sg > self.v_sg_j {
            RegimeLabel::Annular
        } else if self.f >= 0.0 && v_sl > self.v_sl_g {
            RegimeLabel::DispersedBubbles
        } else if v_sl > self.v_sl_e {
            if self.bubbles_possible {
                RegimeLabel::Bubbles
            } else {
                RegimeLabel::Slug
            }
        } else if v_sl > self.v_sl_h {
            RegimeLabel::Churn
        } else {
            RegimeLabel::Slug
        }
    }
}

/// Taitel, Barnea & Dukler (1980) transition model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Taitel1980;

impl Taitel1980 {
    /// Bubble flow exists only above a critical diameter.
    pub fn check_bubble(rho_l: Real, rho_g: Real, sigma: Real, d: Real, g: Real) -> bool {
        let group = (rho_l * rho_l * g * d * d) / ((rho_l - rho_g) * sigma);
        group.powf(0.25) >= BUBBLE_EXISTENCE_LIMIT
    }

    pub fn e_transition(v_sg: Real, rho_l: Real, rho_g: Real, sigma: Real, g: Real) -> Real {
        3.0 * v_sg - 1.15 * (g * (rho_l - rho_g) * sigma / (rho_l * rho_l)).powf(0.25)
    }

    /// Dispersed-bubble residual `f_l1 * f_l2 * f_l3 - f_r`.
    pub fn f_transition(v_sl: Real, v_sg: Real, p: &MixtureProperties) -> Real {
        let v_m = v_sl + v_sg;
        let f_l1 = 2.0
            * (0.4 * p.sigma / ((p.rho_l - p.rho_g) * p.g)).sqrt()
            * (p.rho_l / p.sigma).powf(0.6);
        let f_l2 = ((2.0 * 0.046 / p.d) * (p.rho_m * p.d / p.mu_m).powf(-0.2)).powf(0.4);
        let f_l3 = v_m.powf(1.12);
        let f_r = 0.725 + 4.15 * (v_sg / v_m).sqrt();
        f_l1 * f_l2 * f_l3 - f_r
    }

    pub fn g_transition(v_sg: Real) -> Real {
        v_sg / 0.52 - v_sg
    }

    pub fn h_transition(v_sg: Real, g: Real, d: Real, l: Real) -> Real {
        (l / (40.6 * d) - 0.22) * (g * d).sqrt() - v_sg
    }

    pub fn j_transition(rho_l: Real, rho_g: Real, sigma: Real, g: Real) -> Real {
        3.1 * (sigma * g * (rho_l - rho_g)).powf(0.25) / rho_g.sqrt()
    }

    /// Evaluate every boundary at one point. Requires `v_sg > 0`.
    pub fn boundaries(p: &PointInputs) -> FlowResult<TransitionValues> {
        p.validate()?;
        let mix = p.mixture()?;
        let values = TransitionValues {
            v_sl_e: Self::e_transition(p.v_sg, p.rho_l, p.rho_g, p.sigma, p.g),
            f: Self::f_transition(p.v_sl, p.v_sg, &mix),
            v_sl_g: Self::g_transition(p.v_sg),
            v_sl_h: Self::h_transition(p.v_sg, p.g, p.d, p.l),
            v_sg_j: Self::j_transition(p.rho_l, p.rho_g, p.sigma, p.g),
            bubbles_possible: Self::check_bubble(p.rho_l, p.rho_g, p.sigma, p.d, p.g),
        };
        values.ensure_finite()?;
        Ok(values)
    }

    pub fn classify_point(p: &PointInputs) -> FlowResult<RegimeLabel> {
        if p.v_sg == 0.0 {
            return Ok(RegimeLabel::SinglePhase);
        }
        let values = Self::boundaries(p)?;
        Ok(values.decide(p.v_sg, p.v_sl))
    }

    /// Classify every point of a batch.
    ///
    /// Only mismatched array lengths fail the whole call; a point with bad
    /// inputs is reported in [`Classification::failures`] and the rest of the
    /// batch is still classified.
    pub fn classify_batch(inputs: &PatternInputs) -> TpResult<Classification> {
        let n = inputs.len()?;
        let mut labels = Vec::with_capacity(n);
        let mut failures = Vec::new();

        for index in 0..n {
            match inputs.point(index).and_then(|p| Self::classify_point(&p)) {
                Ok(label) => labels.push(Some(label)),
                Err(error) => {
                    tracing::warn!(index, %error, "flow pattern classification failed");
                    labels.push(None);
                    failures.push(PointFailure { index, error });
                }
            }
        }

        tracing::info!(
            points = n,
            failed = failures.len(),
            "classified flow pattern batch"
        );
        Ok(Classification { labels, failures })
    }
}

/// Batch inputs; every field is a scalar or one value per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInputs {
    pub d: Series,
    pub l: Series,
    pub v_sg: Series,
    pub v_sl: Series,
    pub rho_g: Series,
    pub rho_l: Series,
    pub mu_g: Series,
    pub mu_l: Series,
    pub sigma: Series,
    pub g: Series,
}

impl PatternInputs {
    fn fields(&self) -> [&Series; 10] {
        [
            &self.d,
            &self.l,
            &self.v_sg,
            &self.v_sl,
            &self.rho_g,
            &self.rho_l,
            &self.mu_g,
            &self.mu_l,
            &self.sigma,
            &self.g,
        ]
    }

    /// Number of points after broadcasting.
    pub fn len(&self) -> TpResult<usize> {
        broadcast_len(&self.fields(), "flow pattern inputs")
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.len(), Ok(0))
    }

    pub fn point(&self, index: usize) -> FlowResult<PointInputs> {
        let at = |s: &Series, name: &str| {
            s.get(index).ok_or_else(|| FlowError::InvalidInput {
                what: format!("{name} has no value at point {index}"),
            })
        };
        Ok(PointInputs {
            v_sg: at(&self.v_sg, "v_sg")?,
            v_sl: at(&self.v_sl, "v_sl")?,
            rho_g: at(&self.rho_g, "rho_g")?,
            rho_l: at(&self.rho_l, "rho_l")?,
            mu_g: at(&self.mu_g, "mu_g")?,
            mu_l: at(&self.mu_l, "mu_l")?,
            sigma: at(&self.sigma, "sigma")?,
            g: at(&self.g, "g")?,
            l: at(&self.l, "l")?,
            d: at(&self.d, "d")?,
        })
    }
}

impl From<PointInputs> for PatternInputs {
    fn from(p: PointInputs) -> Self {
        Self {
            d: p.d.into(),
            l: p.l.into(),
            v_sg: p.v_sg.into(),
            v_sl: p.v_sl.into(),
            rho_g: p.rho_g.into(),
            rho_l: p.rho_l.into(),
            mu_g: p.mu_g.into(),
            mu_l: p.mu_l.into(),
            sigma: p.sigma.into(),
            g: p.g.into(),
        }
    }
}

/// A point that could not be classified.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFailure {
    pub index: usize,
    pub error: FlowError,
}

/// Result of a batch classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One entry per point; `None` where classification failed
    pub labels: Vec<Option<RegimeLabel>>,
    pub failures: Vec<PointFailure>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_successful(&self) -> usize {
        self.labels.len() - self.failures.len()
    }

    pub fn num_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Numeric codes (see [`RegimeLabel::code`]).
    pub fn codes(&self) -> Vec<Option<u8>> {
        self.labels.iter().map(|l| l.map(RegimeLabel::code)).collect()
    }

    /// Human-readable labels.
    pub fn labels_text(&self) -> Vec<Option<&'static str>> {
        self.labels
            .iter()
            .map(|l| l.map(RegimeLabel::as_str))
            .collect()
    }

    /// All labels, or the first point failure.
    pub fn into_labels(self) -> FlowResult<Vec<RegimeLabel>> {
        if let Some(first) = self.failures.into_iter().next() {
            return Err(first.error);
        }
        Ok(self.labels.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_air() -> PointInputs {
        PointInputs {
            v_sg: 0.05,
            v_sl: 1.0,
            rho_g: 1.77,
            rho_l: 997.0,
            mu_g: 1.85e-5,
            mu_l: 8.9e-4,
            sigma: 0.072,
            g: 9.81,
            l: 8.1,
            d: 0.0525,
        }
    }

    #[test]
    fn label_codes_and_text() {
        for label in RegimeLabel::ALL {
            assert_eq!(RegimeLabel::from_code(label.code()), Some(label));
            assert_eq!(label.as_str().parse::<RegimeLabel>().unwrap(), label);
        }
        assert_eq!(RegimeLabel::DispersedBubbles.to_string(), "Dispersed bubbles");
        assert_eq!(RegimeLabel::from_code(6), None);
        assert!("Stratified".parse::<RegimeLabel>().is_err());
    }

    #[test]
    fn zero_gas_is_single_phase_even_with_bad_properties() {
        let p = PointInputs {
            v_sg: 0.0,
            rho_l: -1.0,
            sigma: f64::NAN,
            ..water_air()
        };
        assert_eq!(Taitel1980::classify_point(&p).unwrap(), RegimeLabel::SinglePhase);
    }

    #[test]
    fn boundary_formulas() {
        let p = water_air();
        assert!((Taitel1980::g_transition(0.52) - 0.48).abs() < 1e-12);
        let j = Taitel1980::j_transition(p.rho_l, p.rho_g, p.sigma, p.g);
        let expected = 3.1 * (0.072_f64 * 9.81 * (997.0 - 1.77)).powf(0.25) / 1.77_f64.sqrt();
        assert!((j - expected).abs() < 1e-12);
        let h = Taitel1980::h_transition(0.1, 9.81, 0.05, 40.6 * 0.05 * 1.22);
        assert!((h - ((9.81_f64 * 0.05).sqrt() - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn annular_wins_over_everything() {
        let p = PointInputs {
            v_sg: 50.0,
            v_sl: 10.0,
            ..water_air()
        };
        assert_eq!(Taitel1980::classify_point(&p).unwrap(), RegimeLabel::Annular);
    }

    #[test]
    fn high_liquid_rate_is_dispersed() {
        let p = PointInputs {
            v_sg: 0.5,
            v_sl: 5.0,
            ..water_air()
        };
        let values = Taitel1980::boundaries(&p).unwrap();
        assert!(values.f >= 0.0);
        assert!(p.v_sl > values.v_sl_g);
        assert_eq!(values.decide(p.v_sg, p.v_sl), RegimeLabel::DispersedBubbles);
    }

    #[test]
    fn cascade_order_is_fixed() {
        let values = TransitionValues {
            v_sl_e: 0.0,
            f: 1.0,
            v_sl_g: 0.0,
            v_sl_h: 0.0,
            v_sg_j: 1.0,
            bubbles_possible: true,
        };
        assert_eq!(values.decide(2.0, 1.0), RegimeLabel::Annular);
        assert_eq!(values.decide(0.5, 1.0), RegimeLabel::DispersedBubbles);

        let no_dispersion = TransitionValues { f: -1.0, ..values };
        assert_eq!(no_dispersion.decide(0.5, 1.0), RegimeLabel::Bubbles);
        let no_bubbles = TransitionValues {
            bubbles_possible: false,
            ..no_dispersion
        };
        assert_eq!(no_bubbles.decide(0.5, 1.0), RegimeLabel::Slug);

        let below_e = TransitionValues {
            v_sl_e: 2.0,
            ..no_dispersion
        };
        assert_eq!(below_e.decide(0.5, 1.0), RegimeLabel::Churn);
        let below_h = TransitionValues {
            v_sl_h: 2.0,
            ..below_e
        };
        assert_eq!(below_h.decide(0.5, 1.0), RegimeLabel::Slug);
    }

    #[test]
    fn invalid_point_is_reported() {
        let p = PointInputs {
            rho_l: 1.0,
            ..water_air()
        };
        assert!(matches!(
            Taitel1980::classify_point(&p),
            Err(FlowError::InvalidInput { .. })
        ));
        let p = PointInputs {
            v_sl: -0.1,
            ..water_air()
        };
        assert!(Taitel1980::classify_point(&p).is_err());
    }

    #[test]
    fn batch_broadcasts_scalars() {
        let mut inputs = PatternInputs::from(water_air());
        inputs.v_sg = Series::from(vec![0.0, 0.05, 50.0]);
        let result = Taitel1980::classify_batch(&inputs).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.is_complete());
        assert_eq!(result.labels[0], Some(RegimeLabel::SinglePhase));
        assert_eq!(result.labels[2], Some(RegimeLabel::Annular));
        assert_eq!(result.labels_text()[2], Some("Annular"));
        assert_eq!(result.codes()[0], Some(0));
    }

    #[test]
    fn batch_length_mismatch_fails_up_front() {
        let mut inputs = PatternInputs::from(water_air());
        inputs.v_sg = Series::from(vec![0.1, 0.2]);
        inputs.v_sl = Series::from(vec![1.0, 1.0, 1.0]);
        assert!(Taitel1980::classify_batch(&inputs).is_err());
    }
}
