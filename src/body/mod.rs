use nalgebra::{UnitQuaternion, Vector3};
use thiserror::Error;

pub mod chain;
pub mod free;

pub use chain::{Link, LinkChain};
pub use free::FreeBody;

// ---------------------------------------------------------------------------
// Mixed body: one facade over two actuation representations
// ---------------------------------------------------------------------------

/// Errors from operations that only one body representation supports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BodyError {
    #[error("`{op}` requires an articulated chain, but this body is a free rigid body")]
    UnsupportedOperation { op: &'static str },
    #[error("no link at index {index} in this chain")]
    InvalidLink { index: usize },
}

/// Kinematic state of a rigid body. World frame is ENU (z up); the body
/// frame is FLU (x forward, y left, z up).
#[derive(Debug, Clone)]
pub struct BodyState {
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    /// Body-to-world rotation.
    pub quat: UnitQuaternion<f64>,
    /// Angular velocity, world frame, rad/s.
    pub omega: Vector3<f64>,
}

impl BodyState {
    pub fn at_rest(pos: Vector3<f64>) -> Self {
        Self {
            pos,
            vel: Vector3::zeros(),
            quat: UnitQuaternion::identity(),
            omega: Vector3::zeros(),
        }
    }
}

/// Uniform facade over the two rigid-body actuation representations: an
/// articulated multi-body chain or a single free body. The variant is fixed
/// at construction; exactly one representation backs every instance.
///
/// Chain-only operations (joint state, drive targets) return
/// [`BodyError::UnsupportedOperation`] on a free body.
#[derive(Debug, Clone)]
pub enum MixedBody {
    Chain(LinkChain),
    Free(FreeBody),
}

impl MixedBody {
    /// The free body carrying the 6DOF state (the chain's base, or the free
    /// body itself).
    pub fn base(&self) -> &FreeBody {
        match self {
            MixedBody::Chain(c) => &c.base,
            MixedBody::Free(b) => b,
        }
    }

    pub fn base_mut(&mut self) -> &mut FreeBody {
        match self {
            MixedBody::Chain(c) => &mut c.base,
            MixedBody::Free(b) => b,
        }
    }

    pub fn mass(&self) -> f64 {
        self.base().mass
    }

    pub fn position(&self) -> Vector3<f64> {
        self.base().position()
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.base().orientation()
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.base().velocity()
    }

    pub fn set_velocity(&mut self, vel: Vector3<f64>) {
        self.base_mut().set_velocity(vel);
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.base().angular_velocity()
    }

    pub fn set_angular_velocity(&mut self, omega: Vector3<f64>) {
        self.base_mut().set_angular_velocity(omega);
    }

    pub fn up(&self) -> Vector3<f64> {
        self.base().up()
    }

    pub fn local_velocity(&self) -> Vector3<f64> {
        self.base().local_velocity()
    }

    pub fn set_local_velocity(&mut self, local: Vector3<f64>) {
        self.base_mut().set_local_velocity(local);
    }

    pub fn world_center_of_mass(&self) -> Vector3<f64> {
        self.base().world_center_of_mass()
    }

    pub fn add_force_at_position(&mut self, force: Vector3<f64>, position: Vector3<f64>) {
        self.base_mut().add_force_at_position(force, position);
    }

    pub fn add_torque(&mut self, torque: Vector3<f64>) {
        self.base_mut().add_torque(torque);
    }

    /// Total mass of the connected chain (just the body mass for a free
    /// body). Walks the chain; call at initialization, not per tick.
    pub fn total_connected_mass(&self) -> f64 {
        match self {
            MixedBody::Chain(c) => c.total_connected_mass(),
            MixedBody::Free(b) => b.mass,
        }
    }

    /// Aggregate center of mass of the connected chain in world coordinates.
    /// Walks the chain; call at initialization, not per tick.
    pub fn total_connected_center_of_mass(&self) -> Vector3<f64> {
        match self {
            MixedBody::Chain(c) => c.total_connected_center_of_mass(),
            MixedBody::Free(b) => b.world_center_of_mass(),
        }
    }

    pub fn joint_position(&self, index: usize) -> Result<f64, BodyError> {
        match self {
            MixedBody::Chain(c) => c.joint_position(index),
            MixedBody::Free(_) => Err(BodyError::UnsupportedOperation { op: "joint_position" }),
        }
    }

    pub fn set_drive_target(&mut self, index: usize, target: f64) -> Result<(), BodyError> {
        match self {
            MixedBody::Chain(c) => c.set_drive_target(index, target),
            MixedBody::Free(_) => Err(BodyError::UnsupportedOperation { op: "set_drive_target" }),
        }
    }

    pub fn set_drive_target_velocity(&mut self, index: usize, velocity: f64) -> Result<(), BodyError> {
        match self {
            MixedBody::Chain(c) => c.set_drive_target_velocity(index, velocity),
            MixedBody::Free(_) => Err(BodyError::UnsupportedOperation {
                op: "set_drive_target_velocity",
            }),
        }
    }
}
