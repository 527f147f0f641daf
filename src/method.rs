use faer_core::{Mat, MatMut, MatRef};

use crate::{assembly::LinearSystem, Float, SolverError};

/// Solves one assembled step system.
pub trait LinearSolver {
    /// Writes the solution of `system` into `out`. `guess` holds the field the
    /// system was assembled from, in the same column layout.
    fn solve_to(
        &mut self,
        system: &LinearSystem,
        guess: MatRef<'_, Float>,
        out: MatMut<'_, Float>,
    ) -> Result<(), SolverError>;

    fn solve(
        &mut self,
        system: &LinearSystem,
        guess: MatRef<'_, Float>,
    ) -> Result<Mat<Float>, SolverError> {
        let mut out = guess.to_owned();
        self.solve_to(system, guess, out.as_mut())?;
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Unspecified"
    }
}
