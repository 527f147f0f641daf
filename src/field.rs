use faer_core::{Mat, MatRef};

use crate::{faer_add, mesh::Mesh, Float, SolverError};

/// Per-cell dye concentration together with the pinned source cell.
///
/// Values are percentage-like and are never clamped: whatever the linear
/// solve produces is stored as is.
#[derive(Clone, Debug)]
pub struct MeshField {
    mesh: Mesh,
    concentration: Mat<Float>,
    source: (usize, usize),
    source_concentration: Float,
}

impl MeshField {
    /// All zero except the centre cell, which holds `source_concentration`.
    pub fn new(mesh: Mesh, source_concentration: Float) -> Self {
        let (rows, cols) = mesh.shape();
        let mut field = Self {
            mesh,
            concentration: Mat::zeros(rows, cols),
            source: mesh.centre_cell(),
            source_concentration,
        };
        field.pin_source();
        field
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn rows(&self) -> usize {
        self.mesh.rows()
    }

    pub fn cols(&self) -> usize {
        self.mesh.cols()
    }

    pub fn source_cell(&self) -> (usize, usize) {
        self.source
    }

    pub fn source_concentration(&self) -> Float {
        self.source_concentration
    }

    pub fn get(&self, i: usize, j: usize) -> Result<Float, SolverError> {
        self.mesh.check(i, j)?;
        Ok(self.concentration.read(i, j))
    }

    pub fn set(&mut self, i: usize, j: usize, value: Float) -> Result<(), SolverError> {
        self.mesh.check(i, j)?;
        // finite values are stored as given, without clamping
        if !value.is_finite() {
            return Err(SolverError::InvalidParameter {
                name: "concentration",
                value,
            });
        }
        self.concentration.write(i, j, value);
        Ok(())
    }

    pub fn as_ref(&self) -> MatRef<'_, Float> {
        self.concentration.as_ref()
    }

    pub fn to_column(&self) -> Mat<Float> {
        faer_add::field_to_column(self.concentration.as_ref())
    }

    /// Replaces the whole field from a solution column, then re-pins the
    /// source.
    pub(crate) fn commit(&mut self, solution: MatRef<'_, Float>) {
        faer_add::column_to_field(solution, self.concentration.as_mut());
        self.pin_source();
    }

    pub(crate) fn pin_source(&mut self) {
        let (i, j) = self.source;
        self.concentration.write(i, j, self.source_concentration);
    }

    pub fn reset(&mut self) {
        faer_add::fill(self.concentration.as_mut(), 0.0);
        self.pin_source();
    }

    pub fn max(&self) -> Float {
        let m = self.concentration.as_ref();
        (0..m.nrows())
            .flat_map(|i| (0..m.ncols()).map(move |j| m.read(i, j)))
            .fold(Float::NEG_INFINITY, Float::max)
    }

    pub fn min(&self) -> Float {
        let m = self.concentration.as_ref();
        (0..m.nrows())
            .flat_map(|i| (0..m.ncols()).map(move |j| m.read(i, j)))
            .fold(Float::INFINITY, Float::min)
    }
}
