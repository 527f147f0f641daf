//! Transient advection-diffusion of a dye concentration over a 2D rectangular
//! mesh, discretised with finite volumes and first-order upwind differencing.

use thiserror::Error;

pub mod faer_add;

pub mod assembly;
pub mod diagnostics;
pub mod driver;
pub mod field;
pub mod flow;
pub mod grid;
pub mod mesh;
pub mod method;
pub mod methods;
pub mod params;
pub mod sim;

pub type Float = f64;

pub use assembly::{Coefficients, LinearSystem};
pub use diagnostics::Diagnostics;
pub use driver::{Driver, FrameRecorder, Logger, ObsCtx, Observer, VelocityRecorder};
pub use field::MeshField;
pub use flow::{FlowSchedule, FlowState};
pub use grid::Axis;
pub use mesh::Mesh;
pub use method::LinearSolver;
pub use params::Physics;
pub use sim::Simulation;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid mesh: {rows}x{cols} cells over {width_mm}mm x {height_mm}mm")]
    InvalidDimension {
        rows: usize,
        cols: usize,
        width_mm: Float,
        height_mm: Float,
    },
    #[error("cell ({i}, {j}) is outside the {rows}x{cols} mesh")]
    OutOfRange {
        i: usize,
        j: usize,
        rows: usize,
        cols: usize,
    },
    #[error("singular linear system of size {size}")]
    SingularSystem { size: usize },
    #[error("invalid time step: {0}s")]
    InvalidTimeStep(Float),
    #[error("iterative solve did not converge after {iterations} sweeps (last change {change:e})")]
    NotConverged { iterations: usize, change: Float },
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: Float },
}
