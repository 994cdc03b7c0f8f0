//! Yeo-Johnson power transform
//!
//! One λ per column, chosen by maximizing the profile log-likelihood with
//! Brent's method, then the transformed column is standardized to zero mean
//! and unit (population) variance. Zero and negative inputs are valid.

use crate::error::{PipelineError, PipelineResult};
use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

const GOLDEN: f64 = 1.618_034;
const GROW_LIMIT: f64 = 110.0;
const BRACKET_MAX_ITER: usize = 1000;
const BRENT_TOL: f64 = 1.48e-8;
const BRENT_MIN_TOL: f64 = 1.0e-11;
const BRENT_CGOLD: f64 = 0.381_966_0;
const BRENT_MAX_ITER: usize = 500;

/// Yeo-Johnson transform of a single value
pub fn yeo_johnson(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() < f64::EPSILON {
            x.ln_1p()
        } else {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        }
    } else if (lambda - 2.0).abs() < f64::EPSILON {
        -(-x).ln_1p()
    } else {
        -((1.0 - x).powf(2.0 - lambda) - 1.0) / (2.0 - lambda)
    }
}

fn population_variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count() as f64;
    let mean = values.clone().sum::<f64>() / n;
    values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
}

/// Negative profile log-likelihood of `lambda` for one column
fn neg_log_likelihood(column: ArrayView1<'_, f64>, lambda: f64) -> f64 {
    let n = column.len() as f64;
    let variance = population_variance(column.iter().map(|&x| yeo_johnson(x, lambda)));
    if !variance.is_finite() || variance < f64::MIN_POSITIVE {
        return f64::INFINITY;
    }

    let jacobian: f64 = column
        .iter()
        .map(|&x| x.signum() * x.abs().ln_1p())
        .sum();
    let log_likelihood = -0.5 * n * variance.ln() + (lambda - 1.0) * jacobian;
    -log_likelihood
}

/// Downhill bracket search starting from `(xa, xb)`.
///
/// Returns `(a, b, c)` with `f(b)` below both `f(a)` and `f(c)`.
fn bracket<F: Fn(f64) -> f64>(f: &F, mut xa: f64, mut xb: f64) -> Option<(f64, f64, f64, f64)> {
    let mut fa = f(xa);
    let mut fb = f(xb);
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLDEN * (xb - xa);
    let mut fc = f(xc);

    let mut iter = 0;
    while fc < fb {
        iter += 1;
        if iter > BRACKET_MAX_ITER {
            return None;
        }

        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < 1e-21 { 2.0e-21 } else { 2.0 * val };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + GROW_LIMIT * (xc - xb);
        let mut fw;

        if (w - xc) * (xb - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                return Some((xb, w, xc, fw));
            } else if fw > fb {
                return Some((xa, xb, w, fb));
            }
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLDEN * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
            }
        } else {
            w = xc + GOLDEN * (xc - xb);
            fw = f(w);
        }

        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    Some((xa, xb, xc, fb))
}

/// Brent's parabolic-interpolation minimizer inside a bracket
fn brent<F: Fn(f64) -> f64>(f: &F, (xa, xb, xc, fb): (f64, f64, f64, f64)) -> f64 {
    let (mut a, mut b) = if xa < xc { (xa, xc) } else { (xc, xa) };
    let (mut x, mut w, mut v) = (xb, xb, xb);
    let (mut fx, mut fw, mut fv) = (fb, fb, fb);
    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;

    for _ in 0..BRENT_MAX_ITER {
        let tol1 = BRENT_TOL * x.abs() + BRENT_MIN_TOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = BRENT_CGOLD * deltax;
        } else {
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_temp = deltax;
            deltax = rat;

            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_temp).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = BRENT_CGOLD * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 {
                x + tol1
            } else {
                x - tol1
            }
        } else {
            x + rat
        };
        let fu = f(u);

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }

    x
}

/// Maximum-likelihood λ for one column
pub fn fit_lambda(column: ArrayView1<'_, f64>) -> PipelineResult<f64> {
    let objective = |lambda: f64| neg_log_likelihood(column, lambda);
    let bracketed = bracket(&objective, -2.0, 2.0)
        .filter(|&(a, b, c, fb)| a.is_finite() && b.is_finite() && c.is_finite() && fb.is_finite())
        .ok_or_else(|| {
            PipelineError::Numerical("could not bracket the Yeo-Johnson likelihood".to_string())
        })?;

    let lambda = brent(&objective, bracketed);
    if lambda.is_finite() {
        Ok(lambda)
    } else {
        Err(PipelineError::Numerical(format!(
            "Yeo-Johnson lambda diverged ({})",
            lambda
        )))
    }
}

/// Fitted per-column transform
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTransform {
    lambdas: Vec<f64>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl PowerTransform {
    /// Fit λ, mean and scale for every column of `values`.
    ///
    /// `names` label columns in error messages.
    pub fn fit(values: &Array2<f64>, names: &[String]) -> PipelineResult<Self> {
        if values.nrows() == 0 {
            return Err(PipelineError::validation("rows", 0, "nothing to transform"));
        }
        let mut lambdas = Vec::with_capacity(values.ncols());
        let mut means = Vec::with_capacity(values.ncols());
        let mut scales = Vec::with_capacity(values.ncols());

        for (j, column) in values.axis_iter(Axis(1)).enumerate() {
            let name = names.get(j).map(String::as_str).unwrap_or("?");
            let first = column[0];
            if column.iter().all(|&x| x == first) {
                return Err(PipelineError::Numerical(format!(
                    "column '{}' has zero variance",
                    name
                )));
            }

            let lambda = fit_lambda(column)?;
            let transformed: Vec<f64> = column.iter().map(|&x| yeo_johnson(x, lambda)).collect();
            let mean = transformed.iter().sum::<f64>() / transformed.len() as f64;
            let scale = population_variance(transformed.iter().copied()).sqrt();
            if !(scale.is_finite() && scale > 0.0) {
                return Err(PipelineError::Numerical(format!(
                    "column '{}' collapses to a constant under λ = {}",
                    name, lambda
                )));
            }

            debug!("column '{}': lambda = {:.6}", name, lambda);
            lambdas.push(lambda);
            means.push(mean);
            scales.push(scale);
        }

        Ok(Self {
            lambdas,
            means,
            scales,
        })
    }

    /// Transform and standardize `values` column by column
    pub fn transform(&self, values: &Array2<f64>) -> Array2<f64> {
        let mut out = values.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (lambda, mean, scale) = (self.lambdas[j], self.means[j], self.scales[j]);
            column.mapv_inplace(|x| (yeo_johnson(x, lambda) - mean) / scale);
        }
        out
    }

    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }
}
