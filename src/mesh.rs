use crate::{grid::Axis, Float, SolverError};

/// Geometry of a rectangular mesh. Rows run along the height axis, columns
/// along the width axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mesh {
    width: Axis,
    height: Axis,
}

impl Mesh {
    pub fn new(shape: (usize, usize), dims_mm: (Float, Float)) -> Result<Self, SolverError> {
        let (rows, cols) = shape;
        let (width_mm, height_mm) = dims_mm;

        let mesh = Mesh {
            width: Axis::from_cells(width_mm, cols),
            height: Axis::from_cells(height_mm, rows),
        };

        if mesh.width.is_valid() && mesh.height.is_valid() {
            Ok(mesh)
        } else {
            Err(SolverError::InvalidDimension {
                rows,
                cols,
                width_mm,
                height_mm,
            })
        }
    }

    pub fn width(&self) -> Axis {
        self.width
    }

    pub fn height(&self) -> Axis {
        self.height
    }

    pub fn rows(&self) -> usize {
        self.height.cells()
    }

    pub fn cols(&self) -> usize {
        self.width.cells()
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    /// `(width_mm, height_mm)`
    pub fn domain_size(&self) -> (Float, Float) {
        (self.width.extent_mm(), self.height.extent_mm())
    }

    pub fn cell_width(&self) -> Float {
        self.width.cell_size()
    }

    pub fn cell_height(&self) -> Float {
        self.height.cell_size()
    }

    pub fn cell_count(&self) -> usize {
        self.rows() * self.cols()
    }

    // row-major: index(i, j) = i * cols + j
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.cols() + j
    }

    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index / self.cols(), index % self.cols())
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        i < self.rows() && j < self.cols()
    }

    pub fn check(&self, i: usize, j: usize) -> Result<(), SolverError> {
        if self.contains(i, j) {
            Ok(())
        } else {
            Err(SolverError::OutOfRange {
                i,
                j,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    /// Centre of cell `(i, j)` as `(x, y)` in metres, measured from the corner
    /// of cell `(0, 0)`.
    pub fn centroid(&self, i: usize, j: usize) -> (Float, Float) {
        (self.width.centre(j), self.height.centre(i))
    }

    /// Cell holding the physical point `(x, y)` (metres), if any.
    pub fn locate(&self, x: Float, y: Float) -> Option<(usize, usize)> {
        Some((self.height.locate(y)?, self.width.locate(x)?))
    }

    pub fn centre_cell(&self) -> (usize, usize) {
        (self.rows() / 2, self.cols() / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_follows_shape_and_domain() {
        let mesh = Mesh::new((21, 21), (100.0, 100.0)).unwrap();
        assert_eq!(mesh.shape(), (21, 21));
        assert_eq!(mesh.domain_size(), (100.0, 100.0));
        assert!((mesh.cell_width() - 0.1 / 21.0).abs() < 1e-15);
        assert_eq!(mesh.centre_cell(), (10, 10));
    }

    #[test]
    fn width_maps_to_columns_and_height_to_rows() {
        let mesh = Mesh::new((2, 4), (40.0, 10.0)).unwrap();
        assert_eq!(mesh.cell_width(), 0.01);
        assert_eq!(mesh.cell_height(), 0.005);
    }

    #[test]
    fn index_is_a_row_major_bijection() {
        let mesh = Mesh::new((3, 5), (10.0, 10.0)).unwrap();
        for i in 0..3 {
            for j in 0..5 {
                let k = mesh.index(i, j);
                assert_eq!(k, i * 5 + j);
                assert_eq!(mesh.cell_of(k), (i, j));
            }
        }
    }

    #[test]
    fn rejects_empty_or_degenerate_meshes() {
        assert!(matches!(
            Mesh::new((0, 3), (10.0, 10.0)),
            Err(SolverError::InvalidDimension { rows: 0, .. })
        ));
        assert!(Mesh::new((3, 0), (10.0, 10.0)).is_err());
        assert!(Mesh::new((3, 3), (0.0, 10.0)).is_err());
        assert!(Mesh::new((3, 3), (10.0, -1.0)).is_err());
    }

    #[test]
    fn locate_inverts_centroid() {
        let mesh = Mesh::new((4, 6), (60.0, 40.0)).unwrap();
        for i in 0..4 {
            for j in 0..6 {
                let (x, y) = mesh.centroid(i, j);
                assert_eq!(mesh.locate(x, y), Some((i, j)));
            }
        }
        assert_eq!(mesh.locate(0.061, 0.0), None);
    }

    #[test]
    fn check_reports_offending_cell() {
        let mesh = Mesh::new((2, 2), (10.0, 10.0)).unwrap();
        assert_eq!(
            mesh.check(2, 1),
            Err(SolverError::OutOfRange {
                i: 2,
                j: 1,
                rows: 2,
                cols: 2
            })
        );
        assert!(mesh.check(1, 1).is_ok());
    }
}
