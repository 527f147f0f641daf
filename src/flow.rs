use std::f64::consts::TAU;

use crate::{Float, SolverError};

/// Sinusoidal driving velocity, one sine per axis:
/// `v = amplitude * sin(2π·t/period + phase)` with `t` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowSchedule {
    /// m/s, `(x, y)`
    pub amplitude: (Float, Float),
    /// s, `(x, y)`
    pub period: (Float, Float),
    /// rad, `(x, y)`
    pub phase: (Float, Float),
}

impl Default for FlowSchedule {
    fn default() -> Self {
        Self {
            amplitude: (0.15, 0.10),
            period: (23.0, 10.0),
            phase: (0.0, 3.0),
        }
    }
}

impl FlowSchedule {
    pub fn validate(&self) -> Result<(), SolverError> {
        for value in [self.period.0, self.period.1] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::InvalidParameter {
                    name: "period",
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn velocity_at(&self, time_millis: Float) -> (Float, Float) {
        let t = time_millis / 1000.0;
        let wave = |amplitude: Float, period: Float, phase: Float| {
            amplitude * (TAU * t / period + phase).sin()
        };

        (
            wave(self.amplitude.0, self.period.0, self.phase.0),
            wave(self.amplitude.1, self.period.1, self.phase.1),
        )
    }
}

/// The single live flow velocity, in m/s.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowState {
    velocity: (Float, Float),
    schedule: FlowSchedule,
}

impl FlowState {
    pub fn new(schedule: FlowSchedule) -> Self {
        Self {
            velocity: (0.0, 0.0),
            schedule,
        }
    }

    pub fn velocity(&self) -> (Float, Float) {
        self.velocity
    }

    pub fn set_velocity(&mut self, vx: Float, vy: Float) {
        self.velocity = (vx, vy);
    }

    pub fn schedule(&self) -> &FlowSchedule {
        &self.schedule
    }

    /// Overwrites the velocity with the schedule's value at `time_millis`.
    /// Depends on nothing but its argument.
    pub fn sinusoidal_update(&mut self, time_millis: Float) -> (Float, Float) {
        self.velocity = self.schedule.velocity_at(time_millis);
        self.velocity
    }
}
