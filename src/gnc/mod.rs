pub mod altitude;
pub mod attitude;
pub mod horizontal;
pub mod pid;

pub use altitude::{AltitudeControlMode, AltitudeController};
pub use attitude::{delta_angle, heading_deg, AttitudeController, TiltMode, YawControlMode};
pub use horizontal::{HorizontalControlMode, HorizontalController};
pub use pid::{Pid, VectorPid};

/// Exogenous height query for altitude-above-surface control (water surface,
/// terrain). Injected explicitly at construction; the controllers never look
/// it up themselves.
pub trait SurfaceQuery {
    /// Surface height (world z) at the given horizontal position.
    fn surface_height(&self, x: f64, y: f64) -> f64;
}

/// A flat surface at a fixed height.
#[derive(Debug, Clone, Copy)]
pub struct FlatSurface(pub f64);

impl SurfaceQuery for FlatSurface {
    fn surface_height(&self, _x: f64, _y: f64) -> f64 {
        self.0
    }
}
