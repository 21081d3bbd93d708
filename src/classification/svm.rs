//! C-Support Vector Classification.
//!
//! Multi-class problems are decomposed one-vs-one: one binary machine per
//! class pair, each trained with Sequential Minimal Optimization using the
//! maximal violating pair working set. Prediction is a vote across all
//! pairs. Optional probability estimates use Platt scaling per pair and
//! pairwise coupling across pairs.

use crate::error::{DocrecError, Result};
use crate::primitives::Matrix;
use crate::traits::{argmax, check_fit_input, n_classes, unique_classes, Classifier};
use serde::{Deserialize, Serialize};

const TAU: f64 = 1e-12;
const MIN_PROB: f64 = 1e-7;

/// Kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    /// `<x, y>`
    Linear,
    /// `exp(-gamma * ||x - y||^2)`
    Rbf,
}

/// Sparse row with its squared norm precomputed.
#[derive(Debug, Clone)]
struct SparseRow {
    entries: Vec<(usize, f64)>,
    norm_sq: f64,
}

impl SparseRow {
    fn from_matrix(x: &Matrix<f32>, i: usize) -> Self {
        let entries: Vec<(usize, f64)> = x
            .nonzero_in_row(i)
            .into_iter()
            .map(|(j, v)| (j, f64::from(v)))
            .collect();
        let norm_sq = entries.iter().map(|&(_, v)| v * v).sum();
        Self { entries, norm_sq }
    }

    /// Merge-join dot product over two index-sorted rows.
    fn dot(&self, other: &Self) -> f64 {
        let (mut a, mut b) = (0, 0);
        let mut sum = 0.0;
        while a < self.entries.len() && b < other.entries.len() {
            let (ia, va) = self.entries[a];
            let (ib, vb) = other.entries[b];
            match ia.cmp(&ib) {
                std::cmp::Ordering::Less => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal => {
                    sum += va * vb;
                    a += 1;
                    b += 1;
                }
            }
        }
        sum
    }
}

/// One binary machine of the one-vs-one decomposition.
///
/// `positive` is the lower class id; a positive decision value votes for it.
#[derive(Debug, Clone)]
struct PairModel {
    positive: usize,
    negative: usize,
    /// Training row indices with non-zero dual coefficients
    support: Vec<usize>,
    /// `alpha_i * y_i` for each support row
    coef: Vec<f64>,
    rho: f64,
    /// Platt sigmoid parameters, `P(positive) = 1 / (1 + exp(A f + B))`
    sigmoid: Option<(f64, f64)>,
}

impl PairModel {
    fn decision(&self, kernel_row: &[f64]) -> f64 {
        self.support
            .iter()
            .zip(&self.coef)
            .map(|(&s, &c)| c * kernel_row[s])
            .sum::<f64>()
            - self.rho
    }
}

#[derive(Debug, Clone)]
struct FittedSvc {
    rows: Vec<SparseRow>,
    n_features: usize,
    gamma: f64,
    classes: Vec<usize>,
    n_outputs: usize,
    pairs: Vec<PairModel>,
}

/// Support Vector Classifier.
///
/// # Example
///
/// ```
/// use docrec::classification::SupportVectorClassifier;
/// use docrec::primitives::Matrix;
///
/// let x = Matrix::from_vec(6, 3, vec![
///     1.0, 0.0, 0.0,
///     1.0, 0.0, 0.0,
///     0.0, 1.0, 0.0,
///     0.0, 1.0, 0.0,
///     0.0, 0.0, 1.0,
///     0.0, 0.0, 1.0,
/// ]).expect("6x3 matrix");
/// let y = vec![0, 0, 1, 1, 2, 2];
///
/// let mut svc = SupportVectorClassifier::new();
/// svc.fit(&x, &y).expect("valid training data");
/// assert_eq!(svc.predict(&x).expect("fitted"), y);
/// ```
#[derive(Debug, Clone)]
pub struct SupportVectorClassifier {
    kernel: Kernel,
    c: f64,
    /// `None` selects `1 / (n_features * Var(X))`
    gamma: Option<f64>,
    tol: f64,
    max_iter: usize,
    probability: bool,
    fitted: Option<FittedSvc>,
}

impl SupportVectorClassifier {
    /// Creates an RBF classifier with `C = 1.0`, scaled gamma, `tol = 1e-3`
    /// and probability estimates on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kernel: Kernel::Rbf,
            c: 1.0,
            gamma: None,
            tol: 1e-3,
            max_iter: 100_000,
            probability: true,
            fitted: None,
        }
    }

    /// Sets the kernel.
    #[must_use]
    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Sets the box constraint `C`.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Fixes the RBF gamma instead of deriving it from the data.
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    /// Toggles probability estimates (required by `predict_proba`).
    #[must_use]
    pub fn with_probability(mut self, probability: bool) -> Self {
        self.probability = probability;
        self
    }

    /// Sets the SMO stopping tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Caps SMO iterations per class pair.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Number of support vectors summed over all class pairs.
    #[must_use]
    pub fn n_support(&self) -> usize {
        self.fitted
            .as_ref()
            .map_or(0, |f| f.pairs.iter().map(|p| p.support.len()).sum())
    }

    fn kernel_value(&self, gamma: f64, a: &SparseRow, b: &SparseRow) -> f64 {
        let dot = a.dot(b);
        match self.kernel {
            Kernel::Linear => dot,
            Kernel::Rbf => {
                let dist = (a.norm_sq + b.norm_sq - 2.0 * dot).max(0.0);
                (-gamma * dist).exp()
            }
        }
    }

    /// Fits one machine per class pair.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid input or a non-positive `C`, gamma or
    /// tolerance.
    pub fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.c <= 0.0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "C".to_string(),
                value: self.c.to_string(),
                constraint: ">0".to_string(),
            });
        }
        if let Some(g) = self.gamma {
            if g <= 0.0 {
                return Err(DocrecError::InvalidHyperparameter {
                    param: "gamma".to_string(),
                    value: g.to_string(),
                    constraint: ">0".to_string(),
                });
            }
        }
        if self.tol <= 0.0 {
            return Err(DocrecError::InvalidHyperparameter {
                param: "tol".to_string(),
                value: self.tol.to_string(),
                constraint: ">0".to_string(),
            });
        }

        let n_features = x.n_cols();
        let gamma = self.gamma.unwrap_or_else(|| {
            let var = x.variance();
            if var > 0.0 && n_features > 0 {
                1.0 / (n_features as f64 * var)
            } else {
                1.0
            }
        });

        let rows: Vec<SparseRow> = (0..x.n_rows())
            .map(|i| SparseRow::from_matrix(x, i))
            .collect();
        let classes = unique_classes(y);

        let mut pairs = Vec::new();
        for (a, &positive) in classes.iter().enumerate() {
            for &negative in &classes[a + 1..] {
                let members: Vec<usize> = (0..y.len())
                    .filter(|&i| y[i] == positive || y[i] == negative)
                    .collect();
                let signs: Vec<f64> = members
                    .iter()
                    .map(|&i| if y[i] == positive { 1.0 } else { -1.0 })
                    .collect();
                let kernel: Vec<Vec<f64>> = members
                    .iter()
                    .map(|&i| {
                        members
                            .iter()
                            .map(|&j| self.kernel_value(gamma, &rows[i], &rows[j]))
                            .collect()
                    })
                    .collect();

                let (alpha, rho) = self.solve(&kernel, &signs);
                let decisions: Vec<f64> = (0..members.len())
                    .map(|i| {
                        (0..members.len())
                            .map(|j| alpha[j] * signs[j] * kernel[i][j])
                            .sum::<f64>()
                            - rho
                    })
                    .collect();
                let sigmoid = self
                    .probability
                    .then(|| sigmoid_train(&decisions, &signs));

                let mut support = Vec::new();
                let mut coef = Vec::new();
                for (k, &row) in members.iter().enumerate() {
                    if alpha[k] > 0.0 {
                        support.push(row);
                        coef.push(alpha[k] * signs[k]);
                    }
                }

                pairs.push(PairModel {
                    positive,
                    negative,
                    support,
                    coef,
                    rho,
                    sigmoid,
                });
            }
        }

        self.fitted = Some(FittedSvc {
            rows,
            n_features,
            gamma,
            classes,
            n_outputs: n_classes(y),
            pairs,
        });
        Ok(())
    }

    /// Solves the binary dual problem
    /// `min 0.5 a'Qa - e'a` s.t. `0 <= a <= C`, `y'a = 0`.
    ///
    /// Returns the dual coefficients and the bias term `rho`.
    fn solve(&self, kernel: &[Vec<f64>], y: &[f64]) -> (Vec<f64>, f64) {
        let n = y.len();
        let c = self.c;
        let mut alpha = vec![0.0; n];
        let mut grad = vec![-1.0; n];
        let q = |i: usize, j: usize| y[i] * y[j] * kernel[i][j];

        let mut iter = 0;
        while iter < self.max_iter {
            let mut g_max = f64::NEG_INFINITY;
            let mut g_max2 = f64::NEG_INFINITY;
            let mut i_sel = None;
            let mut j_sel = None;
            for t in 0..n {
                let up = if y[t] > 0.0 { alpha[t] < c } else { alpha[t] > 0.0 };
                if up && -y[t] * grad[t] >= g_max {
                    g_max = -y[t] * grad[t];
                    i_sel = Some(t);
                }
                let low = if y[t] > 0.0 { alpha[t] > 0.0 } else { alpha[t] < c };
                if low && y[t] * grad[t] >= g_max2 {
                    g_max2 = y[t] * grad[t];
                    j_sel = Some(t);
                }
            }
            let (Some(i), Some(j)) = (i_sel, j_sel) else {
                break;
            };
            if g_max + g_max2 < self.tol {
                break;
            }
            iter += 1;

            let old_i = alpha[i];
            let old_j = alpha[j];
            if y[i] == y[j] {
                let quad = (kernel[i][i] + kernel[j][j] - 2.0 * q(i, j)).max(TAU);
                let delta = (grad[i] - grad[j]) / quad;
                let sum = alpha[i] + alpha[j];
                alpha[i] -= delta;
                alpha[j] += delta;
                if sum > c {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = sum - c;
                    }
                    if alpha[j] > c {
                        alpha[j] = c;
                        alpha[i] = sum - c;
                    }
                } else {
                    if alpha[j] < 0.0 {
                        alpha[j] = 0.0;
                        alpha[i] = sum;
                    }
                    if alpha[i] < 0.0 {
                        alpha[i] = 0.0;
                        alpha[j] = sum;
                    }
                }
            } else {
                let quad = (kernel[i][i] + kernel[j][j] + 2.0 * q(i, j)).max(TAU);
                let delta = (-grad[i] - grad[j]) / quad;
                let diff = alpha[i] - alpha[j];
                alpha[i] += delta;
                alpha[j] += delta;
                if diff > 0.0 {
                    if alpha[j] < 0.0 {
                        alpha[j] = 0.0;
                        alpha[i] = diff;
                    }
                } else if alpha[i] < 0.0 {
                    alpha[i] = 0.0;
                    alpha[j] = -diff;
                }
                if diff > 0.0 {
                    if alpha[i] > c {
                        alpha[i] = c;
                        alpha[j] = c - diff;
                    }
                } else if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = c + diff;
                }
            }

            let d_i = alpha[i] - old_i;
            let d_j = alpha[j] - old_j;
            for (k, g) in grad.iter_mut().enumerate() {
                *g += q(i, k) * d_i + q(j, k) * d_j;
            }
        }
        if iter >= self.max_iter {
            tracing::warn!(max_iter = self.max_iter, "SMO reached the iteration limit");
        }

        // Bias: average over free vectors, else midpoint of the feasible range
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        let mut n_free = 0usize;
        let mut sum_free = 0.0;
        for t in 0..n {
            let yg = y[t] * grad[t];
            if alpha[t] >= c {
                if y[t] < 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else if alpha[t] <= 0.0 {
                if y[t] > 0.0 {
                    upper = upper.min(yg);
                } else {
                    lower = lower.max(yg);
                }
            } else {
                n_free += 1;
                sum_free += yg;
            }
        }
        let rho = if n_free > 0 {
            sum_free / n_free as f64
        } else {
            (upper + lower) / 2.0
        };

        (alpha, rho)
    }

    fn fitted(&self) -> Result<&FittedSvc> {
        self.fitted.as_ref().ok_or_else(|| DocrecError::NotFitted {
            model: "SVM".to_string(),
        })
    }

    /// Kernel values between each query row and every training row.
    fn kernel_rows(&self, fitted: &FittedSvc, x: &Matrix<f32>) -> Result<Vec<Vec<f64>>> {
        if x.n_cols() != fitted.n_features {
            return Err(DocrecError::dimension_mismatch(
                "n_features",
                fitted.n_features,
                x.n_cols(),
            ));
        }
        Ok((0..x.n_rows())
            .map(|i| {
                let query = SparseRow::from_matrix(x, i);
                fitted
                    .rows
                    .iter()
                    .map(|row| self.kernel_value(fitted.gamma, &query, row))
                    .collect()
            })
            .collect())
    }

    /// Predicts by one-vs-one majority vote; ties go to the lowest class id.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted or the width differs.
    pub fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let fitted = self.fitted()?;
        let kernel_rows = self.kernel_rows(fitted, x)?;
        Ok(kernel_rows
            .iter()
            .map(|k_row| {
                if fitted.pairs.is_empty() {
                    return fitted.classes[0];
                }
                let mut votes = vec![0.0_f32; fitted.n_outputs];
                for pair in &fitted.pairs {
                    if pair.decision(k_row) > 0.0 {
                        votes[pair.positive] += 1.0;
                    } else {
                        votes[pair.negative] += 1.0;
                    }
                }
                argmax(&votes)
            })
            .collect())
    }

    /// Coupled pairwise probability estimates.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not fitted, was fitted without
    /// probability estimates, or the width differs.
    pub fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        if !self.probability {
            return Err("SVM probability estimates need with_probability(true)".into());
        }
        let fitted = self.fitted()?;
        let kernel_rows = self.kernel_rows(fitted, x)?;
        let k = fitted.classes.len();
        let mut position = vec![0; fitted.n_outputs];
        for (idx, &label) in fitted.classes.iter().enumerate() {
            position[label] = idx;
        }

        let mut out = Vec::with_capacity(kernel_rows.len());
        for k_row in &kernel_rows {
            let mut row = vec![0.0; fitted.n_outputs];
            if k == 1 {
                row[fitted.classes[0]] = 1.0;
                out.push(row);
                continue;
            }
            let mut pairwise = vec![vec![0.0; k]; k];
            for pair in &fitted.pairs {
                let (a, b) = pair.sigmoid.ok_or("SVM was fitted without probability estimates")?;
                let p = sigmoid_predict(pair.decision(k_row), a, b).clamp(MIN_PROB, 1.0 - MIN_PROB);
                let (i, j) = (position[pair.positive], position[pair.negative]);
                pairwise[i][j] = p;
                pairwise[j][i] = 1.0 - p;
            }
            for (&label, p) in fitted.classes.iter().zip(couple_pairwise(&pairwise)) {
                row[label] = p as f32;
            }
            out.push(row);
        }
        Ok(out)
    }
}

impl Default for SupportVectorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for SupportVectorClassifier {
    fn name(&self) -> &str {
        "SVM"
    }

    fn fit(&mut self, x: &Matrix<f32>, y: &[usize]) -> Result<()> {
        SupportVectorClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        SupportVectorClassifier::predict(self, x)
    }

    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Vec<Vec<f32>>> {
        SupportVectorClassifier::predict_proba(self, x)
    }
}

/// Negative log-likelihood term of Platt's sigmoid for one sample.
fn sigmoid_loss(f_ab: f64, target: f64) -> f64 {
    if f_ab >= 0.0 {
        target * f_ab + (-f_ab).exp().ln_1p()
    } else {
        (target - 1.0) * f_ab + f_ab.exp().ln_1p()
    }
}

/// Fits `P(y = 1 | f) = 1 / (1 + exp(A f + B))` by Newton's method with
/// backtracking (Lin, Lin and Weng's formulation of Platt scaling).
pub(crate) fn sigmoid_train(decisions: &[f64], labels: &[f64]) -> (f64, f64) {
    const MAX_ITER: usize = 100;
    const MIN_STEP: f64 = 1e-10;
    const SIGMA: f64 = 1e-12;
    const EPS: f64 = 1e-5;

    let prior1 = labels.iter().filter(|&&l| l > 0.0).count() as f64;
    let prior0 = labels.len() as f64 - prior1;
    let hi_target = (prior1 + 1.0) / (prior1 + 2.0);
    let lo_target = 1.0 / (prior0 + 2.0);
    let targets: Vec<f64> = labels
        .iter()
        .map(|&l| if l > 0.0 { hi_target } else { lo_target })
        .collect();

    let objective = |a: f64, b: f64| -> f64 {
        decisions
            .iter()
            .zip(&targets)
            .map(|(&f, &t)| sigmoid_loss(f * a + b, t))
            .sum()
    };

    let mut a = 0.0;
    let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
    let mut fval = objective(a, b);

    for _ in 0..MAX_ITER {
        let (mut h11, mut h22, mut h21) = (SIGMA, SIGMA, 0.0);
        let (mut g1, mut g2) = (0.0, 0.0);
        for (&f, &t) in decisions.iter().zip(&targets) {
            let f_ab = f * a + b;
            let (p, q) = if f_ab >= 0.0 {
                let e = (-f_ab).exp();
                (e / (1.0 + e), 1.0 / (1.0 + e))
            } else {
                let e = f_ab.exp();
                (1.0 / (1.0 + e), e / (1.0 + e))
            };
            let d2 = p * q;
            h11 += f * f * d2;
            h22 += d2;
            h21 += f * d2;
            let d1 = t - p;
            g1 += f * d1;
            g2 += d1;
        }
        if g1.abs() < EPS && g2.abs() < EPS {
            break;
        }

        let det = h11 * h22 - h21 * h21;
        let d_a = -(h22 * g1 - h21 * g2) / det;
        let d_b = -(-h21 * g1 + h11 * g2) / det;
        let gd = g1 * d_a + g2 * d_b;

        let mut step = 1.0;
        while step >= MIN_STEP {
            let new_a = a + step * d_a;
            let new_b = b + step * d_b;
            let new_f = objective(new_a, new_b);
            if new_f < fval + 1e-4 * step * gd {
                a = new_a;
                b = new_b;
                fval = new_f;
                break;
            }
            step /= 2.0;
        }
        if step < MIN_STEP {
            tracing::debug!("Platt scaling line search failed");
            break;
        }
    }
    (a, b)
}

pub(crate) fn sigmoid_predict(decision: f64, a: f64, b: f64) -> f64 {
    let f_ab = decision * a + b;
    if f_ab >= 0.0 {
        let e = (-f_ab).exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + f_ab.exp())
    }
}

/// Combines pairwise estimates `r[i][j] = P(i | i or j)` into class
/// probabilities (Wu, Lin and Weng, method 2).
pub(crate) fn couple_pairwise(r: &[Vec<f64>]) -> Vec<f64> {
    let k = r.len();
    let max_iter = 100.max(k);
    let eps = 0.005 / k as f64;

    let mut q = vec![vec![0.0; k]; k];
    for t in 0..k {
        for j in 0..k {
            if j != t {
                q[t][t] += r[j][t] * r[j][t];
                q[t][j] = -r[j][t] * r[t][j];
            }
        }
    }

    let mut p = vec![1.0 / k as f64; k];
    let mut qp = vec![0.0; k];
    for _ in 0..max_iter {
        let mut p_qp = 0.0;
        for t in 0..k {
            qp[t] = (0..k).map(|j| q[t][j] * p[j]).sum();
            p_qp += p[t] * qp[t];
        }
        let max_error = qp
            .iter()
            .map(|&v| (v - p_qp).abs())
            .fold(0.0, f64::max);
        if max_error < eps {
            break;
        }
        for t in 0..k {
            let diff = (-qp[t] + p_qp) / q[t][t];
            p[t] += diff;
            p_qp = (p_qp + diff * (diff * q[t][t] + 2.0 * qp[t])) / (1.0 + diff) / (1.0 + diff);
            for j in 0..k {
                qp[j] = (qp[j] + diff * q[t][j]) / (1.0 + diff);
                p[j] /= 1.0 + diff;
            }
        }
    }
    p
}

#[cfg(test)]
#[path = "svm_tests.rs"]
mod tests;
