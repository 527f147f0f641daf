use std::fmt;

use faer_core::MatRef;

use crate::{
    assembly::LinearSystem,
    diagnostics::{self, Diagnostics},
    field::MeshField,
    flow::{FlowSchedule, FlowState},
    mesh::Mesh,
    method::LinearSolver,
    methods,
    params::Physics,
    Float, SolverError,
};

/// One dye simulation: the field, the live flow and the solver that advances
/// them. Not synchronised; callers sharing it across threads must wrap the
/// whole instance in a single lock.
pub struct Simulation {
    pub(crate) mesh: Mesh,
    pub(crate) physics: Physics,
    pub(crate) field: MeshField,
    pub(crate) flow: FlowState,
    pub(crate) solver: Box<dyn LinearSolver>,
}

impl Simulation {
    /// `shape` is `(rows, cols)`, `dims_mm` is `(width, height)` in
    /// millimetres.
    pub fn new(shape: (usize, usize), dims_mm: (Float, Float)) -> Result<Self, SolverError> {
        let mesh = Mesh::new(shape, dims_mm)?;
        let physics = Physics::default();

        tracing::debug!(
            rows = mesh.rows(),
            cols = mesh.cols(),
            cell_width = mesh.cell_width(),
            cell_height = mesh.cell_height(),
            "created dye mesh"
        );

        Ok(Self {
            mesh,
            physics,
            field: MeshField::new(mesh, physics.source_concentration),
            flow: FlowState::default(),
            solver: Box::new(methods::DenseLu),
        })
    }

    /// Replaces the physical constants and restarts the field from its
    /// initial state.
    pub fn with_physics(mut self, physics: Physics) -> Result<Self, SolverError> {
        physics.validate()?;
        self.physics = physics;
        self.field = MeshField::new(self.mesh, physics.source_concentration);
        Ok(self)
    }

    pub fn with_schedule(mut self, schedule: FlowSchedule) -> Result<Self, SolverError> {
        schedule.validate()?;
        self.flow = FlowState::new(schedule);
        Ok(self)
    }

    pub fn with_solver<S: LinearSolver + Default + 'static>(self) -> Self {
        self.with_solver_instance(S::default())
    }

    pub fn with_solver_instance(mut self, solver: impl LinearSolver + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Advances the field by `dt` seconds under the current velocity; `dt == 0`
    /// asks for a pseudo-steady solve. On error the field is left untouched.
    pub fn step(&mut self, dt: Float) -> Result<MatRef<'_, Float>, SolverError> {
        let velocity = self.flow.velocity();
        let system = LinearSystem::assemble(&self.field, &self.physics, velocity, dt)?;

        tracing::trace!(
            dt,
            vx = velocity.0,
            vy = velocity.1,
            solver = self.solver.name(),
            "assembled system of size {}",
            system.size()
        );

        let guess = self.field.to_column();
        let solution = match self.solver.solve(&system, guess.as_ref()) {
            Ok(solution) => solution,
            Err(err) => {
                tracing::warn!(dt, "step rejected: {err}");
                return Err(err);
            }
        };

        self.field.commit(solution.as_ref());
        Ok(self.field.as_ref())
    }

    pub fn set_velocity(&mut self, vx: Float, vy: Float) {
        self.flow.set_velocity(vx, vy);
    }

    pub fn set_velocity_from_time(&mut self, time_millis: Float) -> (Float, Float) {
        self.flow.sinusoidal_update(time_millis)
    }

    pub fn velocity(&self) -> (Float, Float) {
        self.flow.velocity()
    }

    pub fn get_cell(&self, i: usize, j: usize) -> Result<Float, SolverError> {
        self.field.get(i, j)
    }

    pub fn set_cell(&mut self, i: usize, j: usize, value: Float) -> Result<(), SolverError> {
        self.field.set(i, j, value)
    }

    /// Drops a full-strength blob of dye into cell `(i, j)`.
    pub fn inject(&mut self, i: usize, j: usize) -> Result<(), SolverError> {
        self.field.set(i, j, self.physics.source_concentration)
    }

    pub fn reset(&mut self) {
        self.field.reset();
    }

    pub fn field(&self) -> &MeshField {
        &self.field
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    pub fn mesh_shape(&self) -> (usize, usize) {
        self.mesh.shape()
    }

    pub fn domain_size(&self) -> (Float, Float) {
        self.mesh.domain_size()
    }

    pub fn cell_width(&self) -> Float {
        self.mesh.cell_width()
    }

    pub fn cell_height(&self) -> Float {
        self.mesh.cell_height()
    }

    pub fn velocity_magnitude(&self) -> Float {
        diagnostics::velocity_magnitude(self.flow.velocity())
    }

    pub fn velocity_angle(&self) -> Float {
        diagnostics::velocity_angle(self.flow.velocity())
    }

    pub fn peclet_x(&self) -> Float {
        diagnostics::peclet(&self.mesh, &self.physics, self.flow.velocity()).0
    }

    pub fn peclet_y(&self) -> Float {
        diagnostics::peclet(&self.mesh, &self.physics, self.flow.velocity()).1
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(&self.mesh, &self.physics, self.flow.velocity())
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dye simulation:\n\t- `{}` method\n\t- {}x{} cells over {}mm x {}mm\n\t- Δx = {:e} m, Δy = {:e} m",
            self.solver.name(),
            self.mesh.rows(),
            self.mesh.cols(),
            self.mesh.width().extent_mm(),
            self.mesh.height().extent_mm(),
            self.mesh.cell_width(),
            self.mesh.cell_height(),
        )
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("mesh", &self.mesh)
            .field("physics", &self.physics)
            .field("flow", &self.flow)
            .field("solver", &self.solver.name())
            .finish_non_exhaustive()
    }
}
