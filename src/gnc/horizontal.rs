use log::debug;
use nalgebra::Vector3;

use super::pid::VectorPid;
use crate::body::MixedBody;
use crate::config::HorizontalConfig;

// ---------------------------------------------------------------------------
// Horizontal controller: planar position/velocity force control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalControlMode {
    /// Hold a world-frame position.
    PositionHold,
    /// Track a body-frame planar velocity.
    Velocity,
}

/// Planar controller producing a horizontal force at the vehicle's aggregate
/// center of mass. The applied force is recorded for the attitude
/// controller's reactive tilt coupling.
///
/// Safety gates: no force is applied while the vehicle is tilted past the
/// upright limit or moving faster than 1.1x the speed limit.
#[derive(Debug)]
pub struct HorizontalController {
    pub enabled: bool,
    pub mode: HorizontalControlMode,
    /// Body-frame velocity setpoint; overwritten each tick in position mode.
    pub target_velocity: Vector3<f64>,
    /// World-frame position setpoint.
    pub target_position: Vector3<f64>,
    pub max_force: f64,
    pub max_speed: f64,
    pub position_tolerance: f64,
    vel_pid: VectorPid,
    /// Aggregate center of mass in the body frame, cached at construction
    /// (the chain walk is too expensive per tick).
    com_local: Vector3<f64>,
    last_applied_force: Vector3<f64>,
    last_applied_force_local: Vector3<f64>,
}

impl HorizontalController {
    pub fn new(config: HorizontalConfig, body: &MixedBody) -> Self {
        let com_world = body.total_connected_center_of_mass();
        let com_local = body.orientation().inverse() * (com_world - body.position());
        Self {
            enabled: true,
            mode: HorizontalControlMode::Velocity,
            target_velocity: Vector3::zeros(),
            // Hold the current position until told otherwise, so a freshly
            // built position-hold controller doesn't fly off toward origin.
            target_position: com_world,
            max_force: config.max_force,
            max_speed: config.max_speed,
            position_tolerance: config.position_tolerance,
            vel_pid: config.vel_pid.to_vector_pid().with_max_output(config.max_force),
            com_local,
            last_applied_force: Vector3::zeros(),
            last_applied_force_local: Vector3::zeros(),
        }
    }

    /// Planar force applied last tick, world frame.
    pub fn last_applied_force(&self) -> Vector3<f64> {
        self.last_applied_force
    }

    /// Planar force applied last tick, body frame.
    pub fn last_applied_force_local(&self) -> Vector3<f64> {
        self.last_applied_force_local
    }

    pub fn reset(&mut self) {
        self.vel_pid.reset();
        self.last_applied_force = Vector3::zeros();
        self.last_applied_force_local = Vector3::zeros();
    }

    fn world_com(&self, body: &MixedBody) -> Vector3<f64> {
        body.position() + body.orientation() * self.com_local
    }

    /// Run one control tick. Skipped when disabled or dt <= 0.
    pub fn update(&mut self, body: &mut MixedBody, dt: f64) {
        if !self.enabled || dt <= 0.0 {
            self.last_applied_force = Vector3::zeros();
            self.last_applied_force_local = Vector3::zeros();
            return;
        }

        let up_dot = body.up().dot(&Vector3::z());
        if up_dot < 0.5 {
            debug!("too tilted for horizontal control, up_dot {up_dot:.2}");
            self.last_applied_force = Vector3::zeros();
            self.last_applied_force_local = Vector3::zeros();
            return;
        }

        let current_speed = body.local_velocity().norm();
        if current_speed > self.max_speed * 1.1 {
            debug!("moving too fast for horizontal control, speed {current_speed:.2}");
            self.last_applied_force = Vector3::zeros();
            self.last_applied_force_local = Vector3::zeros();
            return;
        }

        if self.mode == HorizontalControlMode::PositionHold {
            let mut diff = self.target_position - self.world_com(body);
            diff.z = 0.0;
            let world_vel = if diff.norm() <= self.position_tolerance {
                Vector3::zeros()
            } else {
                diff.normalize() * self.max_speed
            };
            // The velocity loop runs in the body frame.
            self.target_velocity = body.orientation().inverse() * world_vel;
        }
        self.target_velocity.z = 0.0;
        if self.target_velocity.norm() > self.max_speed {
            self.target_velocity = self.target_velocity.normalize() * self.max_speed;
        }

        let mut current_velocity = body.local_velocity();
        current_velocity.z = 0.0;

        let mut force = self.vel_pid.update(self.target_velocity, current_velocity, dt);
        force.z = 0.0;
        self.last_applied_force_local = force;

        let world_force = body.orientation() * force;
        let com = self.world_com(body);
        body.add_force_at_position(world_force, com);
        self.last_applied_force = world_force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::FreeBody;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    fn body_at(pos: Vector3<f64>) -> MixedBody {
        MixedBody::Free(FreeBody::new(2.0, pos))
    }

    fn controller(body: &MixedBody) -> HorizontalController {
        HorizontalController::new(HorizontalConfig::default(), body)
    }

    #[test]
    fn velocity_mode_pushes_toward_setpoint() {
        let mut body = body_at(Vector3::new(0.0, 0.0, 2.0));
        let mut ctrl = controller(&body);
        ctrl.mode = HorizontalControlMode::Velocity;
        ctrl.target_velocity = Vector3::new(2.0, 0.0, 0.0);
        ctrl.update(&mut body, 0.02);

        let force = ctrl.last_applied_force();
        assert!(force.x > 0.0);
        assert_relative_eq!(force.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(force.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(body.base().accumulated_force(), force, epsilon = 1e-12);
    }

    #[test]
    fn vertical_component_of_setpoint_is_dropped() {
        let mut body = body_at(Vector3::new(0.0, 0.0, 2.0));
        let mut ctrl = controller(&body);
        ctrl.target_velocity = Vector3::new(0.0, 0.0, 3.0);
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.last_applied_force(), Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn position_mode_caps_speed_and_stops_inside_tolerance() {
        let mut body = body_at(Vector3::new(0.0, 0.0, 2.0));
        let mut ctrl = controller(&body);
        ctrl.mode = HorizontalControlMode::PositionHold;

        ctrl.target_position = Vector3::new(100.0, 0.0, 2.0);
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.target_velocity.norm(), ctrl.max_speed, epsilon = 1e-9);

        ctrl.target_position = Vector3::new(0.1, 0.0, 2.0);
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.target_velocity, Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn position_error_is_rotated_into_body_frame() {
        // Body yawed 90 deg: world +x error becomes body -y.
        let mut free = FreeBody::new(2.0, Vector3::new(0.0, 0.0, 2.0));
        free.state.quat =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        let mut body = MixedBody::Free(free);
        let mut ctrl = controller(&body);
        ctrl.mode = HorizontalControlMode::PositionHold;
        ctrl.target_position = Vector3::new(100.0, 0.0, 2.0);
        ctrl.update(&mut body, 0.02);

        assert_relative_eq!(ctrl.target_velocity.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ctrl.target_velocity.y, -ctrl.max_speed, epsilon = 1e-9);
        // The applied world force still points along +x.
        assert!(ctrl.last_applied_force().x > 0.0);
        assert_relative_eq!(ctrl.last_applied_force().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn tilted_vehicle_gets_no_horizontal_force() {
        let mut free = FreeBody::new(2.0, Vector3::new(0.0, 0.0, 2.0));
        free.state.quat =
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 80.0_f64.to_radians());
        let mut body = MixedBody::Free(free);
        let mut ctrl = controller(&body);
        ctrl.target_velocity = Vector3::new(3.0, 0.0, 0.0);
        ctrl.update(&mut body, 0.02);

        assert_eq!(body.base().accumulated_force(), Vector3::zeros());
        assert_eq!(ctrl.last_applied_force(), Vector3::zeros());
    }

    #[test]
    fn overspeed_gate_refuses_authority() {
        let mut body = body_at(Vector3::new(0.0, 0.0, 2.0));
        body.set_velocity(Vector3::new(10.0, 0.0, 0.0)); // 2x max speed
        let mut ctrl = controller(&body);
        ctrl.target_velocity = Vector3::new(1.0, 0.0, 0.0);
        ctrl.update(&mut body, 0.02);
        assert_eq!(body.base().accumulated_force(), Vector3::zeros());
    }

    #[test]
    fn force_cap_limits_output() {
        let mut body = body_at(Vector3::new(0.0, 0.0, 2.0));
        let config = HorizontalConfig {
            max_force: 1.0,
            ..HorizontalConfig::default()
        };
        let mut ctrl = HorizontalController::new(config, &body);
        ctrl.target_velocity = Vector3::new(5.0, 0.0, 0.0);
        ctrl.update(&mut body, 0.02);
        assert!(ctrl.last_applied_force().norm() <= 1.0 + 1e-9);
    }
}
