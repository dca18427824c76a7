//! Transition lines of the flow-pattern map.
//!
//! Boundaries are sampled over a sequence of gas superficial velocities with
//! fixed (representative) mixture properties. E, G and H are closed form; F is
//! solved for `v_sl` at every sample with Newton's method seeded at 1 m/s.
//! The sampled curves are then intersected and clipped so the map shows
//! non-overlapping segments (see Shoham 2006, figure 4.9).

use crate::error::{FlowError, FlowResult};
use crate::pattern::{MixtureProperties, PointFailure, Taitel1980};
use crate::solve::{NewtonConfig, bisect, newton_scalar};
use serde::Serialize;
use tp_core::Real;

/// Initial liquid velocity guess for the F line [m/s].
pub const F_LINE_SEED: Real = 1.0;

const BISECTION_MAX_ITERS: usize = 200;

/// Sampled boundary curves on a shared `v_sg` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLines {
    pub v_sg: Vec<Real>,
    pub e: Vec<Real>,
    /// `None` where the F solve did not converge
    pub f: Vec<Option<Real>>,
    pub g: Vec<Real>,
    pub h: Vec<Real>,
    /// Annular onset, independent of `v_sl`
    pub v_sg_j: Real,
    pub failures: Vec<PointFailure>,
}

/// A clipped curve ready for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub x: Vec<Real>,
    pub y: Vec<Real>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn first(&self) -> Option<(Real, Real)> {
        Some((*self.x.first()?, *self.y.first()?))
    }

    pub fn last(&self) -> Option<(Real, Real)> {
        Some((*self.x.last()?, *self.y.last()?))
    }
}

/// Crossing of two sampled curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Intersection {
    pub x: Real,
    pub y: Real,
    /// First sample index with `v_sg > x`
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapIntersections {
    pub fg: Intersection,
    pub ef: Intersection,
    /// `None` when the search failed and the first sample was used instead
    pub fh: Option<Intersection>,
    pub eh: Intersection,
}

/// Non-overlapping regime-map segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeMap {
    pub e: Segment,
    pub f: Segment,
    pub g: Segment,
    pub h: Segment,
    /// Vertical J line at this gas velocity
    pub annular_onset: Real,
    pub intersections: MapIntersections,
}

/// Computes and clips the transition lines for fixed mixture properties.
#[derive(Debug, Clone)]
pub struct TransitionLineSolver {
    pub props: MixtureProperties,
    /// Pipe length [m], used by the H boundary
    pub l: Real,
    pub newton: NewtonConfig,
}

impl TransitionLineSolver {
    pub fn new(props: MixtureProperties, l: Real) -> Self {
        Self {
            props,
            l,
            newton: NewtonConfig::default(),
        }
    }

    /// Liquid velocity on the F boundary at one gas velocity.
    pub fn f_line_point(&self, v_sg: Real) -> FlowResult<Real> {
        newton_scalar(
            &format!("F line at v_sg = {v_sg}"),
            F_LINE_SEED,
            |v_sl| Taitel1980::f_transition(v_sl, v_sg, &self.props),
            &self.newton,
        )
    }

    /// Sample every boundary on `v_sg`.
    ///
    /// The grid must hold at least two finite, strictly increasing values.
    /// F samples that fail to converge are recorded and skipped.
    pub fn sample(&self, v_sg: &[Real]) -> FlowResult<TransitionLines> {
        validate_grid(v_sg)?;
        let p = &self.props;

        let mut f = Vec::with_capacity(v_sg.len());
        let mut failures = Vec::new();
        for (index, &x) in v_sg.iter().enumerate() {
            match self.f_line_point(x) {
                Ok(y) => f.push(Some(y)),
                Err(error) => {
                    tracing::warn!(index, v_sg = x, %error, "F line sample failed");
                    f.push(None);
                    failures.push(PointFailure { index, error });
                }
            }
        }

        Ok(TransitionLines {
            v_sg: v_sg.to_vec(),
            e: v_sg
                .iter()
                .map(|&x| Taitel1980::e_transition(x, p.rho_l, p.rho_g, p.sigma, p.g))
                .collect(),
            f,
            g: v_sg.iter().map(|&x| Taitel1980::g_transition(x)).collect(),
            h: v_sg
                .iter()
                .map(|&x| Taitel1980::h_transition(x, p.g, p.d, self.l))
                .collect(),
            v_sg_j: Taitel1980::j_transition(p.rho_l, p.rho_g, p.sigma, p.g),
            failures,
        })
    }

    /// Sample and clip in one go.
    pub fn regime_map(&self, v_sg: &[Real]) -> FlowResult<RegimeMap> {
        self.sample(v_sg)?.cut()
    }
}

fn validate_grid(v_sg: &[Real]) -> FlowResult<()> {
    if v_sg.len() < 2 {
        return Err(FlowError::InvalidInput {
            what: format!("transition lines need at least 2 samples, got {}", v_sg.len()),
        });
    }
    if v_sg.iter().any(|v| !v.is_finite()) || v_sg.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FlowError::InvalidInput {
            what: "gas velocity samples must be finite and strictly increasing".into(),
        });
    }
    Ok(())
}

/// A sampled curve, possibly with gaps, read as a piecewise-linear function.
struct Curve {
    x: Vec<Real>,
    y: Vec<Real>,
}

impl Curve {
    fn full(x: &[Real], y: &[Real]) -> Self {
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }

    fn with_gaps(x: &[Real], y: &[Option<Real>]) -> Self {
        let (x, y) = x
            .iter()
            .zip(y)
            .filter_map(|(&x, y)| y.map(|y| (x, y)))
            .unzip();
        Self { x, y }
    }

    fn domain(&self) -> Option<(Real, Real)> {
        Some((*self.x.first()?, *self.x.last()?))
    }

    /// Linear interpolation, clamped to the end values outside the samples.
    fn at(&self, x: Real) -> Real {
        let n = self.x.len();
        if n == 0 {
            return Real::NAN;
        }
        if x <= self.x[0] {
            return self.y[0];
        }
        if x >= self.x[n - 1] {
            return self.y[n - 1];
        }
        let i = self.x.partition_point(|v| *v <= x);
        let (x0, x1) = (self.x[i - 1], self.x[i]);
        let (y0, y1) = (self.y[i - 1], self.y[i]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

/// Crossing of `a` and `b` closest to `x0`.
///
/// Sign changes of `a - b` are located on the sample grid; the bracket whose
/// interval lies closest to `x0` is refined by bisection on the interpolants.
fn intersect(what: &str, grid: &[Real], a: &Curve, b: &Curve, x0: Real) -> FlowResult<Intersection> {
    let diff = |x: Real| a.at(x) - b.at(x);
    let not_found = || FlowError::RootNotConverged {
        what: format!("{what} intersection"),
        iterations: 0,
        residual: Real::NAN,
    };

    let (lo_a, hi_a) = a.domain().ok_or_else(not_found)?;
    let (lo_b, hi_b) = b.domain().ok_or_else(not_found)?;
    let (lo, hi) = (lo_a.max(lo_b), hi_a.min(hi_b));
    let xs: Vec<Real> = grid.iter().copied().filter(|x| *x >= lo && *x <= hi).collect();

    let distance = |l: Real, r: Real| {
        if x0 < l {
            l - x0
        } else if x0 > r {
            x0 - r
        } else {
            0.0
        }
    };

    let mut brackets: Vec<(Real, Real)> = xs
        .windows(2)
        .filter(|w| {
            let (dl, dr) = (diff(w[0]), diff(w[1]));
            dl.is_finite() && dr.is_finite() && (dl == 0.0 || dl.signum() != dr.signum())
        })
        .map(|w| (w[0], w[1]))
        .collect();
    brackets.sort_by(|p, q| distance(p.0, p.1).total_cmp(&distance(q.0, q.1)));

    let mut last_error = None;
    for (lo, hi) in brackets {
        match bisect(what, diff, lo, hi, BISECTION_MAX_ITERS) {
            Ok(x) => {
                return Ok(Intersection {
                    x,
                    y: a.at(x),
                    index: grid.partition_point(|v| *v <= x),
                });
            }
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(not_found))
}

impl TransitionLines {
    /// Representative seed for the intersection searches (mean `v_sg`).
    pub fn seed(&self) -> Real {
        self.v_sg.iter().sum::<Real>() / self.v_sg.len() as Real
    }

    /// Intersect and clip the sampled curves.
    ///
    /// F runs up to F∩G and G starts there; E runs up to E∩F; H starts at the
    /// larger of F∩H and E∩H. A failed F∩H search falls back to the first
    /// sample before the comparison.
    pub fn cut(&self) -> FlowResult<RegimeMap> {
        let grid = &self.v_sg;
        let x0 = self.seed();
        let e = Curve::full(grid, &self.e);
        let f = Curve::with_gaps(grid, &self.f);
        let g = Curve::full(grid, &self.g);
        let h = Curve::full(grid, &self.h);

        let fg = intersect("F-G", grid, &f, &g, x0)?;
        let ef = intersect("E-F", grid, &e, &f, x0)?;
        let eh = intersect("E-H", grid, &e, &h, x0)?;
        let fh = match intersect("F-H", grid, &f, &h, x0) {
            Ok(fh) => Some(fh),
            Err(error) => {
                tracing::warn!(%error, "F-H intersection not found, using first sample");
                None
            }
        };

        let fh_start = fh.unwrap_or(Intersection {
            x: grid[0],
            y: h.at(grid[0]),
            index: 0,
        });
        let h_start = if fh_start.x > eh.x { fh_start } else { eh };

        let f_segment = {
            let mut seg = Segment::default();
            for (x, y) in grid[..fg.index].iter().zip(&self.f[..fg.index]) {
                if let Some(y) = y {
                    seg.x.push(*x);
                    seg.y.push(*y);
                }
            }
            seg.x.push(fg.x);
            seg.y.push(f.at(fg.x));
            seg
        };

        Ok(RegimeMap {
            e: head(grid, &self.e, ef.index, ef.x, e.at(ef.x)),
            f: f_segment,
            g: tail(grid, &self.g, fg.index, fg.x, f.at(fg.x)),
            h: tail(grid, &self.h, h_start.index, h_start.x, h.at(h_start.x)),
            annular_onset: self.v_sg_j,
            intersections: MapIntersections { fg, ef, fh, eh },
        })
    }
}

fn head(x: &[Real], y: &[Real], index: usize, x_cut: Real, y_cut: Real) -> Segment {
    let mut seg = Segment {
        x: x[..index].to_vec(),
        y: y[..index].to_vec(),
    };
    seg.x.push(x_cut);
    seg.y.push(y_cut);
    seg
}

fn tail(x: &[Real], y: &[Real], index: usize, x_cut: Real, y_cut: Real) -> Segment {
    let mut seg = Segment {
        x: vec![x_cut],
        y: vec![y_cut],
    };
    seg.x.extend_from_slice(&x[index..]);
    seg.y.extend_from_slice(&y[index..]);
    seg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_clamps_and_skips_gaps() {
        let c = Curve::with_gaps(&[0.0, 1.0, 2.0], &[Some(0.0), None, Some(4.0)]);
        assert_eq!(c.at(1.0), 2.0);
        assert_eq!(c.at(-1.0), 0.0);
        assert_eq!(c.at(5.0), 4.0);
    }

    #[test]
    fn intersect_lines() {
        let grid = [0.0, 1.0, 2.0, 3.0];
        let a = Curve::full(&grid, &[0.0, 1.0, 2.0, 3.0]);
        let b = Curve::full(&grid, &[3.0, 2.5, 2.0, 1.5]);
        let cross = intersect("a-b", &grid, &a, &b, 1.5).unwrap();
        assert!((cross.x - 2.0).abs() < 1e-12);
        assert!((cross.y - 2.0).abs() < 1e-12);
        assert_eq!(cross.index, 3);
    }

    #[test]
    fn nearest_crossing_to_seed_is_chosen() {
        let grid = [0.0, 1.0, 2.0, 3.0, 4.0];
        let a = Curve::full(&grid, &[1.0, -1.0, 1.0, -1.0, 1.0]);
        let b = Curve::full(&grid, &[0.0; 5]);
        let cross = intersect("zigzag", &grid, &a, &b, 3.6).unwrap();
        assert!((cross.x - 3.5).abs() < 1e-12);
    }

    #[test]
    fn non_finite_samples_do_not_hide_a_crossing() {
        let grid = [0.0, 1.0, 2.0, 3.0, 4.0];
        let a = Curve::full(&grid, &[1.0, f64::NAN, 1.0, 1.0, -1.0]);
        let b = Curve::full(&grid, &[0.0; 5]);
        let cross = intersect("gap", &grid, &a, &b, 1.0).unwrap();
        assert!((cross.x - 3.5).abs() < 1e-12);
        assert_eq!(cross.index, 4);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let grid = [0.0, 1.0, 2.0];
        let a = Curve::full(&grid, &[0.0, 1.0, 2.0]);
        let b = Curve::full(&grid, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            intersect("parallel", &grid, &a, &b, 1.0),
            Err(FlowError::RootNotConverged { .. })
        ));
    }

    #[test]
    fn grid_is_validated() {
        assert!(validate_grid(&[1.0]).is_err());
        assert!(validate_grid(&[1.0, 1.0]).is_err());
        assert!(validate_grid(&[0.1, f64::NAN]).is_err());
        assert!(validate_grid(&[0.1, 0.2]).is_ok());
    }

    #[test]
    fn head_and_tail_attach_cut_point() {
        let x = [0.0, 1.0, 2.0];
        let y = [5.0, 6.0, 7.0];
        let seg = head(&x, &y, 2, 1.5, 6.5);
        assert_eq!(seg.x, vec![0.0, 1.0, 1.5]);
        let seg = tail(&x, &y, 2, 1.5, 6.5);
        assert_eq!(seg.x, vec![1.5, 2.0]);
        assert_eq!(seg.first(), Some((1.5, 6.5)));
    }
}
