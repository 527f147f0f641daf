use crate::Float;
use faer_core::Mat;

const MM_PER_M: Float = 1000.0;

// cell[0] <-> [0, cell_size)
// cell[k] <-> [k * cell_size, (k + 1) * cell_size)
// cell[cells - 1] ends at extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    extent_mm: Float,
    cells: usize,
    cell_size: Float,
}

impl Axis {
    /// Splits `extent_mm` millimetres into `cells` equal cells. Cell sizes are
    /// kept in metres.
    pub fn from_cells(extent_mm: Float, cells: usize) -> Self {
        let cell_size = (extent_mm / MM_PER_M) / cells as Float;
        Axis {
            extent_mm,
            cells,
            cell_size,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.cells > 0 && self.extent_mm.is_finite() && self.extent_mm > 0.0
    }

    pub fn extent_mm(&self) -> Float {
        self.extent_mm
    }

    pub fn extent(&self) -> Float {
        self.extent_mm / MM_PER_M
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn cell_size(&self) -> Float {
        self.cell_size
    }

    pub fn centre(&self, k: usize) -> Float {
        self.cell_size * (k as Float + 0.5)
    }

    // `None` for positions left of 0 or at/after the far edge
    pub fn locate(&self, position: Float) -> Option<usize> {
        if !position.is_finite() || position < 0.0 {
            return None;
        }

        let k = (position / self.cell_size).floor() as usize;
        (k < self.cells).then_some(k)
    }

    pub fn centres(&self) -> Mat<Float> {
        Mat::from_fn(self.cells, 1, |k, _| self.centre(k))
    }
}
