use nalgebra::{UnitQuaternion, Vector3};

use super::BodyState;

// ---------------------------------------------------------------------------
// Free rigid body: single 6DOF body with force/torque accumulators
// ---------------------------------------------------------------------------

/// A single free rigid body.
///
/// Forces and torques applied through the accessors accumulate until the
/// physics step consumes and clears them. All vectors are world-frame unless
/// noted otherwise.
#[derive(Debug, Clone)]
pub struct FreeBody {
    pub mass: f64,
    /// Scalar moment of inertia [kg m²], isotropic.
    pub inertia: f64,
    /// Center of mass in the body-local frame.
    pub center_of_mass: Vector3<f64>,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub use_gravity: bool,
    pub state: BodyState,
    force: Vector3<f64>,
    torque: Vector3<f64>,
}

impl FreeBody {
    pub fn new(mass: f64, position: Vector3<f64>) -> Self {
        Self {
            mass,
            inertia: 1.0,
            center_of_mass: Vector3::zeros(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            use_gravity: true,
            state: BodyState::at_rest(position),
            force: Vector3::zeros(),
            torque: Vector3::zeros(),
        }
    }

    pub fn with_inertia(mut self, inertia: f64) -> Self {
        self.inertia = inertia;
        self
    }

    pub fn with_center_of_mass(mut self, com: Vector3<f64>) -> Self {
        self.center_of_mass = com;
        self
    }

    pub fn with_damping(mut self, linear: f64, angular: f64) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state.pos
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        self.state.quat
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.state.vel
    }

    pub fn set_velocity(&mut self, vel: Vector3<f64>) {
        self.state.vel = vel;
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.state.omega
    }

    pub fn set_angular_velocity(&mut self, omega: Vector3<f64>) {
        self.state.omega = omega;
    }

    /// Body up axis in the world frame.
    pub fn up(&self) -> Vector3<f64> {
        self.state.quat * Vector3::z()
    }

    /// Velocity expressed in the body-local frame.
    pub fn local_velocity(&self) -> Vector3<f64> {
        self.state.quat.inverse() * self.state.vel
    }

    pub fn set_local_velocity(&mut self, local: Vector3<f64>) {
        self.state.vel = self.state.quat * local;
    }

    /// Center of mass in world coordinates.
    pub fn world_center_of_mass(&self) -> Vector3<f64> {
        self.state.pos + self.state.quat * self.center_of_mass
    }

    /// Accumulate a world-frame force acting at a world-space point.
    /// Off-center application also accumulates the induced torque.
    pub fn add_force_at_position(&mut self, force: Vector3<f64>, position: Vector3<f64>) {
        self.force += force;
        self.torque += (position - self.world_center_of_mass()).cross(&force);
    }

    pub fn add_force(&mut self, force: Vector3<f64>) {
        self.force += force;
    }

    pub fn add_torque(&mut self, torque: Vector3<f64>) {
        self.torque += torque;
    }

    pub fn accumulated_force(&self) -> Vector3<f64> {
        self.force
    }

    pub fn accumulated_torque(&self) -> Vector3<f64> {
        self.torque
    }

    pub fn clear_accumulators(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
}
