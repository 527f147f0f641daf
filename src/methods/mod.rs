use faer::solvers::{PartialPivLu, Solver};
use faer_core::{MatMut, MatRef};
use reborrow::*;

use crate::{assembly::LinearSystem, faer_add, method::LinearSolver, Float, SolverError};

/// Dense LU with partial pivoting over the full `N x N` matrix, rebuilt every
/// step. `O(N³)` per solve.
#[derive(Clone, Copy, Debug, Default)]
pub struct DenseLu;

impl LinearSolver for DenseLu {
    fn solve_to(
        &mut self,
        system: &LinearSystem,
        _guess: MatRef<'_, Float>,
        mut out: MatMut<'_, Float>,
    ) -> Result<(), SolverError> {
        let matrix = system.to_dense();
        let lu = PartialPivLu::new(matrix.as_ref());
        let x = lu.solve(system.rhs());

        // a zero pivot surfaces as inf/NaN in the solution
        if !faer_add::all_finite(x.as_ref()) {
            return Err(SolverError::SingularSystem {
                size: system.size(),
            });
        }

        out.rb_mut().clone_from(x.as_ref());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Dense LU"
    }
}

/// Gauss-Seidel sweeps over the five stored stencil coefficients, never
/// forming the dense matrix. Converges for any strictly diagonally dominant
/// system; stops once the largest update falls under
/// `tolerance * max(1, |x|_∞)`.
#[derive(Clone, Copy, Debug)]
pub struct GaussSeidel {
    pub tolerance: Float,
    pub max_iterations: usize,
}

impl Default for GaussSeidel {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 20_000,
        }
    }
}

impl GaussSeidel {
    pub fn new(tolerance: Float, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }
}

impl LinearSolver for GaussSeidel {
    fn solve_to(
        &mut self,
        system: &LinearSystem,
        guess: MatRef<'_, Float>,
        mut out: MatMut<'_, Float>,
    ) -> Result<(), SolverError> {
        let diagonal = system.diagonal();
        if diagonal == 0.0 || !diagonal.is_finite() {
            return Err(SolverError::SingularSystem {
                size: system.size(),
            });
        }

        let mesh = *system.mesh();
        let rhs = system.rhs();
        out.rb_mut().clone_from(guess);

        let mut change = Float::INFINITY;
        for sweep in 1..=self.max_iterations {
            change = 0.0;
            let mut scale = 1.0 as Float;

            for i in 0..mesh.rows() {
                for j in 0..mesh.cols() {
                    let k = mesh.index(i, j);
                    let coupled: Float = system
                        .off_diagonal(i, j)
                        .map(|(l, a)| a * out.rb().read(l, 0))
                        .sum();
                    let next = (rhs.read(k, 0) - coupled) / diagonal;
                    // `max` skips NaN, so a poisoned update must be caught here
                    if !next.is_finite() {
                        return Err(SolverError::SingularSystem {
                            size: system.size(),
                        });
                    }

                    change = change.max((next - out.rb().read(k, 0)).abs());
                    scale = scale.max(next.abs());
                    out.write(k, 0, next);
                }
            }

            if !change.is_finite() {
                return Err(SolverError::SingularSystem {
                    size: system.size(),
                });
            }

            if change <= self.tolerance * scale {
                tracing::trace!(sweep, change, "gauss-seidel converged");
                return Ok(());
            }
        }

        Err(SolverError::NotConverged {
            iterations: self.max_iterations,
            change,
        })
    }

    fn name(&self) -> &'static str {
        "Gauss-Seidel (five-point)"
    }
}
