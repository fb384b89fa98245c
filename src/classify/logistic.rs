// Binary logistic regression: L2-regularized, fit by truncated Newton (Newton-CG).
//
// Objective (same parameterization as scikit-learn's LogisticRegression):
//
//   f(w, b) = 0.5 * ||w||² + C * Σ [ log(1 + e^z_i) - y_i * z_i ],  z_i = w·x_i + b
//
// The intercept b is not penalized. Each Newton step is solved approximately by
// conjugate gradient using Hessian-vector products, so no D×D matrix is ever
// built: memory is O(N + D) and a step costs O(N·D) per CG iteration. The
// iteration starts from zero and uses a backtracking line search, so for a
// fixed training set the fit is fully deterministic. Convergence means the
// largest gradient component is <= tol.

use tracing::debug;

use crate::error::ClassifyError;

/// Ridge added to the intercept's Hessian diagonal so a saturated fit keeps
/// positive curvature along the intercept.
const INTERCEPT_JITTER: f64 = 1e-10;

/// Armijo constant for the backtracking line search.
const ARMIJO: f64 = 1e-4;

/// Smallest step fraction tried before the line search gives up.
const MIN_STEP: f64 = 1e-10;

/// Solver settings for a single fit.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength (default 1.0). Larger = weaker penalty.
    pub c: f64,
    /// Stop when the max-abs gradient component falls to this (default 1e-4).
    pub tol: f64,
    /// Newton iterations before the fit is declared non-convergent (default 100).
    pub max_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-4,
            max_iter: 100,
        }
    }
}

/// A fitted linear decision function. Lives for one prediction request.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Newton iterations it took to converge.
    pub iterations: usize,
}

impl FittedModel {
    /// Raw decision value `w·x + b`. Positive means label 1.
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        dot(&self.weights, x) + self.intercept
    }
}

impl LogisticRegression {
    /// Fit on `samples` with binary `labels` (true = 1).
    ///
    /// Callers are expected to have validated shape already; this still
    /// rejects inconsistent input as a fit failure rather than panicking.
    pub fn fit(&self, samples: &[&[f64]], labels: &[bool]) -> Result<FittedModel, ClassifyError> {
        if samples.is_empty() || samples.len() != labels.len() {
            return Err(fit_error(format!(
                "{} samples with {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(fit_error(format!("C must be positive, got {}", self.c)));
        }

        let dim = samples[0].len();
        if samples.iter().any(|s| s.len() != dim) {
            return Err(fit_error("samples have inconsistent lengths"));
        }

        let targets: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();

        // theta = [w_0 .. w_{dim-1}, b]
        let n_params = dim + 1;
        let mut theta = vec![0.0_f64; n_params];
        let mut loss = self.objective(samples, &targets, &theta);

        for iteration in 0..self.max_iter {
            let (gradient, curvature) = self.gradient_and_curvature(samples, &targets, &theta);

            let max_grad = gradient.iter().fold(0.0_f64, |m, g| m.max(g.abs()));
            if !max_grad.is_finite() {
                return Err(fit_error("gradient is not finite"));
            }
            if max_grad <= self.tol {
                debug!(
                    iterations = iteration,
                    samples = samples.len(),
                    dim = dim,
                    loss = loss,
                    "Logistic regression converged"
                );
                return Ok(split_theta(theta, iteration));
            }

            // Inexact Newton: solve H s = -g to a residual that shrinks with ||g||.
            let grad_norm = dot(&gradient, &gradient).sqrt();
            let cg_tol = grad_norm.sqrt().min(0.5) * grad_norm;
            let neg_grad: Vec<f64> = gradient.iter().map(|g| -g).collect();
            let step = conjugate_gradient(
                |v| hessian_vec(samples, &curvature, v),
                &neg_grad,
                cg_tol,
                n_params,
            )
            .ok_or_else(|| fit_error("Hessian is not positive definite"))?;

            // Directional derivative along the Newton step (negative for a descent direction).
            let slope = dot(&gradient, &step);
            if !slope.is_finite() || slope >= 0.0 {
                return Err(fit_error(format!(
                    "Newton step is not a descent direction at iteration {iteration}"
                )));
            }

            let mut t = 1.0;
            loop {
                let candidate: Vec<f64> = theta
                    .iter()
                    .zip(&step)
                    .map(|(th, s)| th + t * s)
                    .collect();
                let candidate_loss = self.objective(samples, &targets, &candidate);

                if candidate_loss.is_finite() && candidate_loss <= loss + ARMIJO * t * slope {
                    theta = candidate;
                    loss = candidate_loss;
                    break;
                }

                t *= 0.5;
                if t < MIN_STEP {
                    return Err(fit_error(format!(
                        "line search stalled at iteration {iteration} (loss {loss})"
                    )));
                }
            }
        }

        Err(fit_error(format!(
            "did not converge within {} iterations",
            self.max_iter
        )))
    }

    fn objective(&self, samples: &[&[f64]], targets: &[f64], theta: &[f64]) -> f64 {
        let (w, b) = theta.split_at(theta.len() - 1);
        let penalty = 0.5 * dot(w, w);
        let data_loss: f64 = samples
            .iter()
            .zip(targets)
            .map(|(x, &y)| {
                let z = dot(w, x) + b[0];
                softplus(z) - y * z
            })
            .sum();
        penalty + self.c * data_loss
    }

    /// Gradient of the objective at `theta`, plus each sample's curvature
    /// weight `C·p·(1-p)` for Hessian-vector products at the same point.
    fn gradient_and_curvature(
        &self,
        samples: &[&[f64]],
        targets: &[f64],
        theta: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        let dim = theta.len() - 1;
        let (w, b) = theta.split_at(dim);

        // Regularization contributes w to the gradient; the intercept is free.
        let mut gradient: Vec<f64> = w.iter().copied().chain(std::iter::once(0.0)).collect();
        let mut curvature = Vec::with_capacity(samples.len());

        for (x, &y) in samples.iter().zip(targets) {
            let p = sigmoid(dot(w, x) + b[0]);
            let residual = self.c * (p - y);

            for (g, &xi) in gradient[..dim].iter_mut().zip(x.iter()) {
                *g += residual * xi;
            }
            gradient[dim] += residual;
            curvature.push(self.c * p * (1.0 - p));
        }

        (gradient, curvature)
    }
}

/// Hessian of the objective applied to `v = [v_w, v_b]`:
///
///   H v = [ v_w + Σ s_i x_i (x_i·v_w + v_b),  jitter·v_b + Σ s_i (x_i·v_w + v_b) ]
fn hessian_vec(samples: &[&[f64]], curvature: &[f64], v: &[f64]) -> Vec<f64> {
    let dim = v.len() - 1;
    let (v_w, v_b) = v.split_at(dim);

    let mut out = v_w.to_vec();
    out.push(INTERCEPT_JITTER * v_b[0]);

    for (x, &s) in samples.iter().zip(curvature) {
        if s == 0.0 {
            continue;
        }
        let coef = s * (dot(v_w, x) + v_b[0]);
        for (o, &xi) in out[..dim].iter_mut().zip(x.iter()) {
            *o += coef * xi;
        }
        out[dim] += coef;
    }

    out
}

/// Conjugate gradient for `A x = rhs` where `A` is only available as a
/// product `hess_vec(v) = A v`. Stops once the residual norm is <= `tolerance`
/// or after `max_iter` iterations.
///
/// Returns None if `A` shows non-positive curvature before any progress;
/// later on, the iterate reached so far is returned instead.
fn conjugate_gradient(
    hess_vec: impl Fn(&[f64]) -> Vec<f64>,
    rhs: &[f64],
    tolerance: f64,
    max_iter: usize,
) -> Option<Vec<f64>> {
    let mut x = vec![0.0_f64; rhs.len()];
    let mut residual = rhs.to_vec();
    let mut direction = residual.clone();
    let mut rs = dot(&residual, &residual);

    for k in 0..max_iter {
        if rs.sqrt() <= tolerance {
            break;
        }

        let a_dir = hess_vec(direction.as_slice());
        let curv = dot(&direction, &a_dir);
        if !curv.is_finite() || curv <= 0.0 {
            return if k == 0 { None } else { Some(x) };
        }

        let alpha = rs / curv;
        for (xi, di) in x.iter_mut().zip(&direction) {
            *xi += alpha * di;
        }
        for (ri, ai) in residual.iter_mut().zip(&a_dir) {
            *ri -= alpha * ai;
        }

        let rs_next = dot(&residual, &residual);
        let beta = rs_next / rs;
        for (di, ri) in direction.iter_mut().zip(&residual) {
            *di = ri + beta * *di;
        }
        rs = rs_next;
    }

    Some(x)
}

fn split_theta(mut theta: Vec<f64>, iterations: usize) -> FittedModel {
    let intercept = theta.pop().unwrap_or(0.0);
    FittedModel {
        weights: theta,
        intercept,
        iterations,
    }
}

fn fit_error(reason: impl Into<String>) -> ClassifyError {
    ClassifyError::ModelFit {
        reason: reason.into(),
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + e^z)` without overflow for large |z|.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}
