use crate::{assembly::FaceTransport, mesh::Mesh, params::Physics, Float};

/// Cell Péclet magnitude above which central differencing stops being
/// bounded and upwinding is needed.
pub const CRITICAL_PECLET: Float = 2.0;

pub fn velocity_magnitude(velocity: (Float, Float)) -> Float {
    velocity.0.hypot(velocity.1)
}

/// Radians, measured from +x towards +y.
pub fn velocity_angle(velocity: (Float, Float)) -> Float {
    velocity.1.atan2(velocity.0)
}

/// Cell Péclet numbers `(f_x / d_x, f_y / d_y)`.
pub fn peclet(mesh: &Mesh, physics: &Physics, velocity: (Float, Float)) -> (Float, Float) {
    let FaceTransport {
        convection: (fx, fy),
        diffusion: (dx, dy),
    } = FaceTransport::new(mesh, physics, velocity);
    (fx / dx, fy / dy)
}

/// Flow quantities for display, sampled at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diagnostics {
    pub magnitude: Float,
    pub angle: Float,
    pub peclet_x: Float,
    pub peclet_y: Float,
}

impl Diagnostics {
    pub fn new(mesh: &Mesh, physics: &Physics, velocity: (Float, Float)) -> Self {
        let (peclet_x, peclet_y) = peclet(mesh, physics, velocity);
        Self {
            magnitude: velocity_magnitude(velocity),
            angle: velocity_angle(velocity),
            peclet_x,
            peclet_y,
        }
    }

    pub fn requires_upwind(&self) -> bool {
        self.peclet_x.abs() > CRITICAL_PECLET || self.peclet_y.abs() > CRITICAL_PECLET
    }
}
