//! Nonlinear root finding: damped Newton and bracketed bisection.

use crate::error::{FlowError, FlowResult};
use nalgebra::{DMatrix, DVector};
use tp_core::Real;

/// Newton solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: Real,
    /// Relative step used by the finite-difference Jacobian
    pub fd_epsilon: Real,
    /// Line search backtracking factor
    pub line_search_beta: Real,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abs_tol: 1e-10,
            fd_epsilon: 1e-7,
            line_search_beta: 0.5,
            max_line_search_iters: 30,
        }
    }
}

/// Newton iteration result.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    pub x: DVector<Real>,
    pub residual_norm: Real,
    pub iterations: usize,
}

/// Forward-difference Jacobian; column j is `(f(x + h e_j) - f(x)) / h`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<Real>,
    f_x: &DVector<Real>,
    f: &F,
    epsilon: Real,
) -> DMatrix<Real>
where
    F: Fn(&DVector<Real>) -> DVector<Real>,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);

    for j in 0..n {
        let mut x_perturbed = x.clone();
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed) - f_x) / dx;
        jac.set_column(j, &df);
    }
    jac
}

fn norm_or_inf(r: &DVector<Real>) -> Real {
    let n = r.norm();
    if n.is_finite() { n } else { Real::INFINITY }
}

/// Damped Newton iteration with a finite-difference Jacobian.
///
/// Trial points whose residual is not finite are rejected by the line search,
/// which keeps the iterate inside the domain of fractional powers.
pub fn newton_solve<F>(
    what: &str,
    x0: DVector<Real>,
    residual_fn: F,
    config: &NewtonConfig,
) -> FlowResult<NewtonResult>
where
    F: Fn(&DVector<Real>) -> DVector<Real>,
{
    let mut x = x0;
    let mut r = residual_fn(&x);
    let mut r_norm = norm_or_inf(&r);

    let not_converged = |iterations: usize, residual: Real| FlowError::RootNotConverged {
        what: what.to_string(),
        iterations,
        residual,
    };

    if !r_norm.is_finite() {
        return Err(not_converged(0, r_norm));
    }

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = finite_difference_jacobian(&x, &r, &residual_fn, config.fd_epsilon);
        let dx = jac
            .lu()
            .solve(&(-&r))
            .filter(|dx| dx.iter().all(|v| v.is_finite()))
            .ok_or_else(|| not_converged(iter, r_norm))?;

        let mut alpha = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = residual_fn(&x_new);
        let mut r_new_norm = norm_or_inf(&r_new);

        for _ in 0..config.max_line_search_iters {
            if r_new_norm < r_norm {
                break;
            }
            alpha *= config.line_search_beta;
            x_new = &x + alpha * &dx;
            r_new = residual_fn(&x_new);
            r_new_norm = norm_or_inf(&r_new);
        }

        if r_new_norm >= r_norm {
            tracing::debug!(what, iter, residual = r_norm, "line search stagnated");
            return Err(not_converged(iter, r_norm));
        }

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    if r_norm < config.abs_tol {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        });
    }
    Err(not_converged(config.max_iterations, r_norm))
}

/// Scalar convenience wrapper around [`newton_solve`].
pub fn newton_scalar<F>(what: &str, x0: Real, f: F, config: &NewtonConfig) -> FlowResult<Real>
where
    F: Fn(Real) -> Real,
{
    let result = newton_solve(
        what,
        DVector::from_element(1, x0),
        |x| DVector::from_element(1, f(x[0])),
        config,
    )?;
    Ok(result.x[0])
}

/// Bisection on `[a, b]`; `f(a)` and `f(b)` must have opposite signs (or be zero).
pub fn bisect<F>(what: &str, f: F, mut a: Real, mut b: Real, max_iterations: usize) -> FlowResult<Real>
where
    F: Fn(Real) -> Real,
{
    let mut fa = f(a);
    let fb = f(b);
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if !(fa.is_finite() && fb.is_finite()) || fa.signum() == fb.signum() {
        return Err(FlowError::RootNotConverged {
            what: format!("{what} (interval not bracketing)"),
            iterations: 0,
            residual: fa.abs().min(fb.abs()),
        });
    }

    for _ in 0..max_iterations {
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm == 0.0 || (b - a).abs() <= 4.0 * Real::EPSILON * mid.abs().max(1.0) {
            return Ok(mid);
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    Ok(0.5 * (a + b))
}
