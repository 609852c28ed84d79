use crate::error::{DcFlowError, DcFlowResult};
use faer::{prelude::*, solvers::PartialPivLu, Mat};

/// Default pivot threshold, relative to the largest `|a_ij|` of the input matrix.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

/// Default bound on the relative residual accepted from the LU backend.
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-9;

/// Trait for solving dense linear systems (Ax = b).
pub trait LinearSystemBackend: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Solve the linear system Ax = b
    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> DcFlowResult<Vec<f64>>;
}

fn check_shape(matrix: &[Vec<f64>], rhs: &[f64]) -> DcFlowResult<()> {
    let n = matrix.len();
    if rhs.len() != n {
        return Err(DcFlowError::Solver(format!(
            "rhs length ({}) does not match matrix dimension {}",
            rhs.len(),
            n
        )));
    }
    if matrix.iter().any(|row| row.len() != n) {
        return Err(DcFlowError::Solver("matrix must be square".to_string()));
    }
    Ok(())
}

/// Smallest pivot magnitude accepted for `matrix`.
///
/// Round-off in a pivot that should be zero grows with the entries, so the
/// threshold scales with the largest `|a_ij|`.
pub fn pivot_floor(matrix: &[Vec<f64>], tolerance: f64) -> f64 {
    let max_abs = matrix
        .iter()
        .flat_map(|row| row.iter())
        .map(|a| a.abs())
        .fold(0.0_f64, f64::max);
    tolerance * max_abs
}

fn check_pivot(pivot: f64, floor: f64, column: usize) -> DcFlowResult<()> {
    if pivot.is_finite() && pivot.abs() > floor {
        return Ok(());
    }
    Err(DcFlowError::SingularSystem(format!(
        "pivot {:e} in column {} is below tolerance {:e}",
        pivot, column, floor
    )))
}

/// Gauss-Jordan elimination with partial pivoting.
///
/// A pivot no larger than `pivot_tolerance * max|a_ij|` aborts the solve
/// with [`DcFlowError::SingularSystem`].
#[derive(Debug, Clone)]
pub struct GaussSolver {
    pub pivot_tolerance: f64,
}

impl Default for GaussSolver {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl GaussSolver {
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }
}

impl LinearSystemBackend for GaussSolver {
    fn name(&self) -> &'static str {
        "gauss"
    }

    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> DcFlowResult<Vec<f64>> {
        check_shape(matrix, rhs)?;
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let floor = pivot_floor(matrix, self.pivot_tolerance);
        let mut a = matrix.to_vec();
        let mut b = rhs.to_vec();

        for i in 0..n {
            let mut pivot = i;
            for row in i + 1..n {
                if a[row][i].abs() > a[pivot][i].abs() {
                    pivot = row;
                }
            }
            if pivot != i {
                a.swap(i, pivot);
                b.swap(i, pivot);
            }

            let diag = a[i][i];
            check_pivot(diag, floor, i)?;

            for value in a[i][i..].iter_mut() {
                *value /= diag;
            }
            b[i] /= diag;

            let pivot_segment = a[i][i..].to_vec();
            for row in 0..n {
                if row == i {
                    continue;
                }
                let factor = a[row][i];
                if factor == 0.0 {
                    continue;
                }
                for (target, &pivot) in a[row][i..].iter_mut().zip(pivot_segment.iter()) {
                    *target -= factor * pivot;
                }
                b[row] -= factor * b[i];
            }
        }

        Ok(b)
    }
}

/// LU with partial pivoting from `faer`.
///
/// faer factors a singular matrix without complaint, so every pivot of the
/// factorization is checked against `pivot_tolerance * max|a_ij|` before the
/// solve. The solution is checked as well: a non-finite entry or a relative
/// residual `‖Ax − b‖∞ / max(‖b‖∞, 1)` above `residual_tolerance` is also
/// reported as [`DcFlowError::SingularSystem`].
#[derive(Debug, Clone)]
pub struct FaerSolver {
    pub pivot_tolerance: f64,
    pub residual_tolerance: f64,
}

impl Default for FaerSolver {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
        }
    }
}

impl FaerSolver {
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }
}

impl LinearSystemBackend for FaerSolver {
    fn name(&self) -> &'static str {
        "faer"
    }

    fn solve(&self, matrix: &[Vec<f64>], rhs: &[f64]) -> DcFlowResult<Vec<f64>> {
        check_shape(matrix, rhs)?;
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mat = Mat::from_fn(n, n, |i, j| matrix[i][j]);
        let rhs_mat = Mat::from_fn(n, 1, |i, _| rhs[i]);
        let lu = PartialPivLu::new(mat.as_ref());

        // One of the two factors carries the pivots on its diagonal, the other ones.
        let floor = pivot_floor(matrix, self.pivot_tolerance);
        let l = lu.compute_l();
        let u = lu.compute_u();
        for i in 0..n {
            check_pivot(l.read(i, i) * u.read(i, i), floor, i)?;
        }

        let sol = lu.solve(&rhs_mat);

        let mut solution = Vec::with_capacity(n);
        for i in 0..n {
            solution.push(sol.read(i, 0));
        }

        if let Some(pos) = solution.iter().position(|x| !x.is_finite()) {
            return Err(DcFlowError::SingularSystem(format!(
                "LU solve produced a non-finite value at index {}",
                pos
            )));
        }
        let residual = relative_residual(matrix, &solution, rhs);
        if residual > self.residual_tolerance {
            return Err(DcFlowError::SingularSystem(format!(
                "relative residual {:e} exceeds tolerance {:e}",
                residual, self.residual_tolerance
            )));
        }
        Ok(solution)
    }
}

/// `‖Ax − b‖∞ / max(‖b‖∞, 1)`
pub fn relative_residual(matrix: &[Vec<f64>], x: &[f64], rhs: &[f64]) -> f64 {
    let max_residual = matrix
        .iter()
        .zip(rhs)
        .map(|(row, &b)| {
            let ax: f64 = row.iter().zip(x).map(|(a, x)| a * x).sum();
            (ax - b).abs()
        })
        .fold(0.0_f64, f64::max);
    let scale = rhs.iter().map(|b| b.abs()).fold(1.0_f64, f64::max);
    max_residual / scale
}
