use faer_core::{Mat, MatRef};

use crate::{diagnostics::Diagnostics, sim::Simulation, Float, SolverError};

pub struct ObsCtx<'ctx> {
    // Meta
    sim: &'ctx Simulation,
    frames: usize,
    sampling: usize,

    // Iteration info
    frame: usize,
    time_millis: Float,
}

impl<'ctx> ObsCtx<'ctx> {
    pub fn simulation(&self) -> &Simulation {
        self.sim
    }

    /// Frames completed so far; 0 at startup.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn time_millis(&self) -> Float {
        self.time_millis
    }

    pub fn field(&self) -> MatRef<'_, Float> {
        self.sim.field().as_ref()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.sim.diagnostics()
    }

    pub fn sampling_period(&self) -> usize {
        self.sampling
    }
}

#[allow(unused_variables)]
pub trait Observer {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        Ok(())
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        (**self).at_startup(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        (**self).at_each_iteration(ctx)
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        (**self).at_cleanup(ctx)
    }
}

/// Steps a simulation at a fixed frame rate, driving the velocity from the
/// frame clock.
pub struct Driver<'d> {
    pub(crate) sim: Simulation,
    pub(crate) observers: Vec<Box<dyn Observer + 'd>>,
    pub(crate) frame_rate: Float,
    pub(crate) sampling: usize,
}

impl<'d> Driver<'d> {
    pub const DEFAULT_FRAME_RATE: Float = 30.0;

    pub fn new(sim: Simulation) -> Self {
        Self {
            sim,
            observers: Vec::new(),
            frame_rate: Self::DEFAULT_FRAME_RATE,
            sampling: 1,
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: Float) -> Result<Self, SolverError> {
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(SolverError::InvalidParameter {
                name: "frame_rate",
                value: frame_rate,
            });
        }
        self.frame_rate = frame_rate;
        Ok(self)
    }

    /// Observers see every `sampling_period`-th frame.
    pub fn with_sampling(mut self, sampling_period: usize) -> Result<Self, SolverError> {
        if sampling_period == 0 {
            return Err(SolverError::InvalidParameter {
                name: "sampling_period",
                value: 0.0,
            });
        }
        self.sampling = sampling_period;
        Ok(self)
    }

    pub fn with_observer(mut self, observer: impl Observer + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn frame_period_millis(&self) -> Float {
        1000.0 / self.frame_rate
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    // frame k (0-based) ends at (k + 1) frame periods
    fn frame_time(&self, k: usize) -> Float {
        (k + 1) as Float * self.frame_period_millis()
    }

    pub fn run(&mut self, frames: usize) -> Result<(), SolverError> {
        let period = self.frame_period_millis();

        for o in self.observers.iter_mut() {
            o.at_startup(ObsCtx {
                sim: &self.sim,
                frames,
                sampling: self.sampling,
                frame: 0,
                time_millis: 0.0,
            })?;
        }

        for k in 0..frames {
            let time_millis = self.frame_time(k);
            self.sim.set_velocity_from_time(time_millis);
            self.sim.step(period / 1000.0)?;

            if (k + 1) % self.sampling == 0 {
                for o in self.observers.iter_mut() {
                    o.at_each_iteration(ObsCtx {
                        sim: &self.sim,
                        frames,
                        sampling: self.sampling,
                        frame: k + 1,
                        time_millis,
                    })?;
                }
            }
        }

        let time_millis = frames as Float * period;
        for o in self.observers.iter_mut() {
            o.at_cleanup(ObsCtx {
                sim: &self.sim,
                frames,
                sampling: self.sampling,
                frame: frames,
                time_millis,
            })?;
        }

        Ok(())
    }

    /// `(angle, magnitude)` of the driving velocity for each of `frames`
    /// frames, without solving. Leaves the last frame's velocity live.
    pub fn velocity_history(&mut self, frames: usize) -> Vec<(Float, Float)> {
        (0..frames)
            .map(|k| {
                let time_millis = self.frame_time(k);
                self.sim.set_velocity_from_time(time_millis);
                (self.sim.velocity_angle(), self.sim.velocity_magnitude())
            })
            .collect()
    }
}

pub struct Logger;

impl Observer for Logger {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        tracing::event!(
            tracing::Level::INFO,
            "start of {} frames ({})",
            ctx.frames(),
            ctx.simulation()
        );
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        let d = ctx.diagnostics();
        tracing::event!(
            tracing::Level::TRACE,
            "frame {} at {:.0}ms: |v|={:.4} m/s, θ={:.3} rad, Pe=({:.2}, {:.2})",
            ctx.frame(),
            ctx.time_millis(),
            d.magnitude,
            d.angle,
            d.peclet_x,
            d.peclet_y
        );
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        tracing::event!(
            tracing::Level::INFO,
            "finished after {} frames (peak concentration {:.3})",
            ctx.frame(),
            ctx.simulation().field().max()
        );
        Ok(())
    }
}

/// Keeps a copy of the field at every observed frame, initial state
/// included.
#[derive(Default)]
pub struct FrameRecorder {
    frames: Vec<Mat<Float>>,
    times: Vec<Float>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Mat<Float>] {
        &self.frames
    }

    pub fn times_millis(&self) -> &[Float] {
        &self.times
    }

    fn record(&mut self, ctx: &ObsCtx) {
        self.frames.push(ctx.field().to_owned());
        self.times.push(ctx.time_millis());
    }
}

impl Observer for FrameRecorder {
    fn at_startup(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        self.frames.reserve(ctx.frames() / ctx.sampling_period() + 1);
        self.record(&ctx);
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        self.record(&ctx);
        Ok(())
    }
}

/// `(angle, magnitude)` of the velocity each observed frame was solved with.
#[derive(Default)]
pub struct VelocityRecorder {
    samples: Vec<(Float, Float)>,
}

impl VelocityRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[(Float, Float)] {
        &self.samples
    }
}

impl Observer for VelocityRecorder {
    fn at_each_iteration(&mut self, ctx: ObsCtx) -> Result<(), SolverError> {
        let d = ctx.diagnostics();
        self.samples.push((d.angle, d.magnitude));
        Ok(())
    }
}
