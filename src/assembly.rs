use faer_core::{Mat, MatRef};

use crate::{field::MeshField, mesh::Mesh, params::Physics, Float, SolverError};

/// Convective (`f`) and diffusive (`d`) face strengths of the current flow,
/// `(x, y)` each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceTransport {
    pub convection: (Float, Float),
    pub diffusion: (Float, Float),
}

impl FaceTransport {
    pub fn new(mesh: &Mesh, physics: &Physics, velocity: (Float, Float)) -> Self {
        let (w, h) = (mesh.cell_width(), mesh.cell_height());
        let (vx, vy) = velocity;

        Self {
            convection: (physics.density * vx * h, physics.density * vy * w),
            diffusion: (physics.diffusivity * h / w, physics.diffusivity * w / h),
        }
    }
}

/// Neighbour and accumulation coefficients of the upwind finite-volume
/// balance. The flow and cell sizes are uniform, so every cell shares them;
/// edge cells simply lack some neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// `j + 1`
    pub east: Float,
    /// `j - 1`
    pub west: Float,
    /// `i + 1`
    pub north: Float,
    /// `i - 1`
    pub south: Float,
    pub accumulation: Float,
}

impl Coefficients {
    pub fn new(
        mesh: &Mesh,
        physics: &Physics,
        velocity: (Float, Float),
        dt: Float,
    ) -> Result<Self, SolverError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SolverError::InvalidTimeStep(dt));
        }

        let FaceTransport {
            convection: (fx, fy),
            diffusion: (dx, dy),
        } = FaceTransport::new(mesh, physics, velocity);

        let accumulation = if dt == 0.0 {
            physics.steady_coefficient
        } else {
            physics.density * mesh.cell_width() * mesh.cell_height() / dt
        };

        Ok(Self {
            east: dx + (-fx).max(0.0),
            west: dx + fx.max(0.0),
            north: dy + (-fy).max(0.0),
            south: dy + fy.max(0.0),
            accumulation,
        })
    }

    pub fn neighbours(&self) -> Float {
        self.east + self.west + self.north + self.south
    }

    // missing neighbours still count: the ghost cell beyond an edge holds 0
    pub fn centre(&self) -> Float {
        self.neighbours() + self.accumulation
    }
}

/// `A · x = b` for one step, stored as the five-point stencil. Row
/// `index(i, j)` reads `a_p x_P - Σ a_nb x_nb = a_p0 φ_P`.
#[derive(Clone, Debug)]
pub struct LinearSystem {
    mesh: Mesh,
    coefficients: Coefficients,
    rhs: Mat<Float>,
}

impl LinearSystem {
    pub fn assemble(
        field: &MeshField,
        physics: &Physics,
        velocity: (Float, Float),
        dt: Float,
    ) -> Result<Self, SolverError> {
        let mesh = *field.mesh();
        let coefficients = Coefficients::new(&mesh, physics, velocity, dt)?;

        let mut rhs = field.to_column();
        for k in 0..rhs.nrows() {
            rhs[(k, 0)] *= coefficients.accumulation;
        }

        Ok(Self {
            mesh,
            coefficients,
            rhs,
        })
    }

    /// Raw parts, skipping the upwind assembly; for degenerate systems in tests.
    #[cfg(test)]
    pub(crate) fn from_parts(mesh: Mesh, coefficients: Coefficients, rhs: Mat<Float>) -> Self {
        Self {
            mesh,
            coefficients,
            rhs,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn size(&self) -> usize {
        self.mesh.cell_count()
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn diagonal(&self) -> Float {
        self.coefficients.centre()
    }

    pub fn rhs(&self) -> MatRef<'_, Float> {
        self.rhs.as_ref()
    }

    /// Off-diagonal entries `(column, value)` of row `index(i, j)`; neighbours
    /// beyond the mesh edge are left out.
    pub fn off_diagonal(&self, i: usize, j: usize) -> impl Iterator<Item = (usize, Float)> + '_ {
        let (rows, cols) = self.mesh.shape();
        let c = &self.coefficients;

        [
            (j + 1 < cols).then(|| (self.mesh.index(i, j + 1), -c.east)),
            (j > 0).then(|| (self.mesh.index(i, j - 1), -c.west)),
            (i + 1 < rows).then(|| (self.mesh.index(i + 1, j), -c.north)),
            (i > 0).then(|| (self.mesh.index(i - 1, j), -c.south)),
        ]
        .into_iter()
        .flatten()
    }

    /// Dense `N x N` matrix, rebuilt from scratch on every call.
    pub fn to_dense(&self) -> Mat<Float> {
        let n = self.size();
        let mut matrix = Mat::zeros(n, n);

        for i in 0..self.mesh.rows() {
            for j in 0..self.mesh.cols() {
                let row = self.mesh.index(i, j);
                matrix[(row, row)] = self.diagonal();
                for (col, value) in self.off_diagonal(i, j) {
                    matrix[(row, col)] = value;
                }
            }
        }

        matrix
    }
}

/// `|a_kk| > Σ_{l≠k} |a_kl|` for every row.
pub fn is_strictly_diagonally_dominant(matrix: MatRef<'_, Float>) -> bool {
    (0..matrix.nrows()).all(|k| {
        let off: Float = (0..matrix.ncols())
            .filter(|&l| l != k)
            .map(|l| matrix.read(k, l).abs())
            .sum();
        matrix.read(k, k).abs() > off
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(shape: (usize, usize), dims: (Float, Float)) -> MeshField {
        MeshField::new(Mesh::new(shape, dims).unwrap(), 100.0)
    }

    #[test]
    fn still_flow_is_pure_diffusion() {
        let mesh = Mesh::new((3, 3), (30.0, 30.0)).unwrap();
        let c = Coefficients::new(&mesh, &Physics::default(), (0.0, 0.0), 1.0).unwrap();

        assert!((c.east - 1e-4).abs() < 1e-18);
        assert_eq!(c.east, c.west);
        assert_eq!(c.north, c.south);
        assert!((c.accumulation - 2.55 * 0.01 * 0.01).abs() < 1e-15);
    }

    #[test]
    fn upwind_favours_the_upstream_side() {
        let mesh = Mesh::new((5, 5), (50.0, 50.0)).unwrap();
        let physics = Physics::default();
        let c = Coefficients::new(&mesh, &physics, (0.1, -0.2), 0.5).unwrap();
        let FaceTransport {
            convection: (fx, fy),
            diffusion: (dx, dy),
        } = FaceTransport::new(&mesh, &physics, (0.1, -0.2));

        // flow towards +x: the west cell is upstream
        assert_eq!(c.east, dx);
        assert_eq!(c.west, dx + fx);
        // flow towards -i: the north cell is upstream
        assert_eq!(c.north, dy - fy);
        assert_eq!(c.south, dy);
    }

    #[test]
    fn zero_dt_uses_the_steady_coefficient() {
        let mesh = Mesh::new((2, 2), (10.0, 10.0)).unwrap();
        let physics = Physics::default();
        let c = Coefficients::new(&mesh, &physics, (0.15, 0.1), 0.0).unwrap();
        assert_eq!(c.accumulation, physics.steady_coefficient);
        assert!(c.accumulation > 1e6 * c.neighbours());
    }

    #[test]
    fn negative_or_nan_dt_is_rejected() {
        let mesh = Mesh::new((2, 2), (10.0, 10.0)).unwrap();
        let physics = Physics::default();
        assert_eq!(
            Coefficients::new(&mesh, &physics, (0.0, 0.0), -0.1),
            Err(SolverError::InvalidTimeStep(-0.1))
        );
        assert!(Coefficients::new(&mesh, &physics, (0.0, 0.0), Float::NAN).is_err());
    }

    #[test]
    fn edge_rows_omit_missing_neighbours() {
        let f = field((3, 4), (40.0, 30.0));
        let system = LinearSystem::assemble(&f, &Physics::default(), (0.05, 0.02), 0.1).unwrap();
        let c = *system.coefficients();

        let corner: Vec<_> = system.off_diagonal(0, 0).collect();
        assert_eq!(corner, vec![(1, -c.east), (4, -c.north)]);

        let far_corner: Vec<_> = system.off_diagonal(2, 3).collect();
        assert_eq!(far_corner, vec![(10, -c.west), (7, -c.south)]);

        assert_eq!(system.off_diagonal(1, 1).count(), 4);
    }

    #[test]
    fn dense_matrix_places_coefficients_by_index() {
        let f = field((3, 3), (30.0, 30.0));
        let system = LinearSystem::assemble(&f, &Physics::default(), (0.1, 0.1), 1.0).unwrap();
        let a = system.to_dense();
        let c = *system.coefficients();

        assert_eq!(a.nrows(), 9);
        assert_eq!(a[(4, 4)], c.centre());
        assert_eq!(a[(4, 5)], -c.east);
        assert_eq!(a[(4, 3)], -c.west);
        assert_eq!(a[(4, 7)], -c.north);
        assert_eq!(a[(4, 1)], -c.south);
        assert_eq!(a[(4, 0)], 0.0);
        // (0, 2) and (1, 0) are not neighbours despite adjacent indices
        assert_eq!(a[(2, 3)], 0.0);
    }

    #[test]
    fn rhs_scales_the_previous_field() {
        let mut f = field((3, 3), (30.0, 30.0));
        f.set(0, 0, 40.0).unwrap();
        let system = LinearSystem::assemble(&f, &Physics::default(), (0.0, 0.0), 2.0).unwrap();
        let a0 = system.coefficients().accumulation;

        assert_eq!(system.rhs()[(0, 0)], 40.0 * a0);
        assert_eq!(system.rhs()[(4, 0)], 100.0 * a0);
        assert_eq!(system.rhs()[(8, 0)], 0.0);
    }

    #[test]
    fn dominant_for_any_velocity() {
        let f = field((4, 3), (20.0, 50.0));
        for velocity in [(0.0, 0.0), (0.15, -0.1), (-3.0, 7.5), (1e3, -1e3)] {
            for dt in [1e-3, 0.033, 1.0, 60.0] {
                let system =
                    LinearSystem::assemble(&f, &Physics::default(), velocity, dt).unwrap();
                assert!(is_strictly_diagonally_dominant(system.to_dense().as_ref()));
            }
        }
    }

    #[test]
    fn single_cell_has_only_the_diagonal() {
        let f = field((1, 1), (10.0, 10.0));
        let system = LinearSystem::assemble(&f, &Physics::default(), (0.15, 0.1), 0.5).unwrap();
        let a = system.to_dense();

        assert_eq!((a.nrows(), a.ncols()), (1, 1));
        assert_eq!(system.off_diagonal(0, 0).count(), 0);
        assert_eq!(a[(0, 0)], system.diagonal());
    }
}
