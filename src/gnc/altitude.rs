use log::warn;
use nalgebra::Vector3;

use super::pid::Pid;
use super::SurfaceQuery;
use crate::body::MixedBody;
use crate::config::AltitudeConfig;

// ---------------------------------------------------------------------------
// Altitude controller: single-axis vertical force control
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeControlMode {
    /// Track an absolute altitude above the configured ground level.
    AbsoluteAltitude,
    /// Track a commanded vertical velocity.
    VerticalVelocity,
    /// Track an altitude above an injected surface (water, terrain).
    AltitudeAboveSurface,
}

/// Vertical-axis controller. In the position modes the altitude error is
/// turned into a velocity setpoint at the configured ascent/descent rate;
/// the velocity loop then produces an acceleration which is limited so a
/// single tick can never push the vertical speed past those rates.
pub struct AltitudeController {
    pub enabled: bool,
    pub mode: AltitudeControlMode,
    pub target_altitude: f64,
    /// Vertical velocity setpoint [m/s]; overwritten each tick by the
    /// position modes.
    pub target_velocity: f64,
    pub compensate_gravity: bool,
    pub ascent_rate: f64,
    pub descent_rate: f64,
    pub max_force: f64,
    pub altitude_tolerance: f64,
    pub ground_level: f64,
    gravity: f64,
    /// Total connected mass plus configured extra masses, cached at
    /// construction (the chain walk is too expensive per tick).
    compensated_mass: f64,
    vel_pid: Pid,
    surface: Option<Box<dyn SurfaceQuery>>,
}

impl AltitudeController {
    pub fn new(config: AltitudeConfig, body: &MixedBody) -> Self {
        let compensated_mass =
            body.total_connected_mass() + config.extra_masses.iter().sum::<f64>();
        Self {
            enabled: true,
            mode: AltitudeControlMode::AbsoluteAltitude,
            target_altitude: 0.0,
            target_velocity: 0.0,
            compensate_gravity: config.compensate_gravity,
            ascent_rate: config.ascent_rate,
            descent_rate: config.descent_rate,
            max_force: config.max_force,
            altitude_tolerance: config.altitude_tolerance,
            ground_level: config.ground_level,
            gravity: config.gravity,
            compensated_mass,
            vel_pid: config.vel_pid.to_pid(),
            surface: None,
        }
    }

    /// Inject the surface query used by [`AltitudeControlMode::AltitudeAboveSurface`].
    pub fn with_surface_query(mut self, surface: Box<dyn SurfaceQuery>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn reset(&mut self) {
        self.vel_pid.reset();
    }

    /// Current altitude relative to the active reference.
    pub fn altitude_of(&self, body: &MixedBody) -> f64 {
        let pos = body.position();
        match self.mode {
            AltitudeControlMode::AltitudeAboveSurface => match &self.surface {
                Some(surface) => pos.z - surface.surface_height(pos.x, pos.y),
                None => {
                    warn!("altitude-above-surface mode without a surface query, using ground level");
                    pos.z - self.ground_level
                }
            },
            _ => pos.z - self.ground_level,
        }
    }

    /// Run one control tick. Skipped when disabled or dt <= 0.
    pub fn update(&mut self, body: &mut MixedBody, dt: f64) {
        if !self.enabled || dt <= 0.0 {
            return;
        }

        if self.mode != AltitudeControlMode::VerticalVelocity {
            let diff = self.target_altitude - self.altitude_of(body);
            if diff.abs() <= self.altitude_tolerance {
                self.target_velocity = 0.0;
            } else if diff > 0.0 {
                self.target_velocity = self.ascent_rate;
            } else {
                self.target_velocity = -self.descent_rate;
            }
        }

        let current_vel = body.velocity().z;
        let pid_acc = self.vel_pid.update(self.target_velocity, current_vel, dt);
        let pid_acc = self.limit_acceleration(pid_acc, current_vel, dt);

        let mut required_force = if self.compensate_gravity {
            pid_acc + self.weight()
        } else {
            pid_acc
        };
        // Cap after the gravity term so the cap bounds the actual actuator output.
        if self.max_force > 0.0 {
            required_force = required_force.clamp(-self.max_force, self.max_force);
        }

        let position = body.position();
        body.add_force_at_position(Vector3::z() * required_force, position);
    }

    /// Limit acceleration so this tick cannot push the vertical velocity
    /// past the configured ascent/descent rates.
    fn limit_acceleration(&self, desired_acc: f64, current_vel: f64, dt: f64) -> f64 {
        let acc_to_ascent_rate = (self.ascent_rate - current_vel) / dt;
        let acc_to_descent_rate = (-self.descent_rate - current_vel) / dt;
        let min_acc = acc_to_descent_rate.min(acc_to_ascent_rate);
        let max_acc = acc_to_descent_rate.max(acc_to_ascent_rate);
        desired_acc.clamp(min_acc, max_acc)
    }

    /// Lift needed to counteract gravity on the vehicle and its extra masses.
    fn weight(&self) -> f64 {
        self.compensated_mass * self.gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::FreeBody;
    use approx::assert_relative_eq;

    fn hovering_body() -> MixedBody {
        MixedBody::Free(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 5.0)))
    }

    fn controller(body: &MixedBody) -> AltitudeController {
        AltitudeController::new(AltitudeConfig::default(), body)
    }

    #[test]
    fn acceleration_limit_never_overshoots_rates() {
        let body = hovering_body();
        let ctrl = controller(&body);
        let dt = 0.02;
        for current in [-5.0, -2.0, -0.5, 0.0, 0.5, 1.9, 2.0, 4.0] {
            for desired in [-1000.0, -10.0, 0.0, 10.0, 1000.0] {
                let acc = ctrl.limit_acceleration(desired, current, dt);
                let next_vel = current + acc * dt;
                assert!(next_vel <= ctrl.ascent_rate + 1e-9, "next_vel {}", next_vel);
                assert!(next_vel >= -ctrl.descent_rate - 1e-9, "next_vel {}", next_vel);
            }
        }
    }

    #[test]
    fn absolute_mode_derives_velocity_setpoint() {
        let mut body = hovering_body();
        let mut ctrl = controller(&body);
        ctrl.mode = AltitudeControlMode::AbsoluteAltitude;

        ctrl.target_altitude = 10.0; // 5 m below target
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.target_velocity, ctrl.ascent_rate);

        ctrl.target_altitude = 1.0; // above target
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.target_velocity, -ctrl.descent_rate);

        ctrl.target_altitude = 5.05; // within tolerance
        ctrl.update(&mut body, 0.02);
        assert_relative_eq!(ctrl.target_velocity, 0.0);
    }

    #[test]
    fn gravity_compensation_holds_hover_force() {
        let mut body = hovering_body();
        let mut ctrl = controller(&body);
        ctrl.mode = AltitudeControlMode::VerticalVelocity;
        ctrl.target_velocity = 0.0;

        ctrl.update(&mut body, 0.02);
        // At rest with zero setpoint, the applied force is exactly the weight.
        let force = body.base().accumulated_force();
        assert_relative_eq!(force.z, 1.0 * 9.81, epsilon = 1e-9);
    }

    #[test]
    fn extra_masses_increase_compensation() {
        let mut body = hovering_body();
        let config = AltitudeConfig {
            extra_masses: vec![0.5, 0.25],
            ..AltitudeConfig::default()
        };
        let mut ctrl = AltitudeController::new(config, &body);
        ctrl.mode = AltitudeControlMode::VerticalVelocity;
        ctrl.update(&mut body, 0.02);
        let force = body.base().accumulated_force();
        assert_relative_eq!(force.z, 1.75 * 9.81, epsilon = 1e-9);
    }

    #[test]
    fn force_cap_applies_after_gravity_term() {
        let mut body = hovering_body();
        let config = AltitudeConfig {
            max_force: 5.0, // below the ~9.81 N weight
            ..AltitudeConfig::default()
        };
        let mut ctrl = AltitudeController::new(config, &body);
        ctrl.mode = AltitudeControlMode::VerticalVelocity;
        ctrl.target_velocity = 2.0;
        ctrl.update(&mut body, 0.02);
        let force = body.base().accumulated_force();
        assert!(force.z.abs() <= 5.0 + 1e-12);
    }

    #[test]
    fn disabled_controller_applies_nothing() {
        let mut body = hovering_body();
        let mut ctrl = controller(&body);
        ctrl.enabled = false;
        ctrl.update(&mut body, 0.02);
        assert_eq!(body.base().accumulated_force(), Vector3::zeros());
    }

    #[test]
    fn zero_dt_is_skipped() {
        let mut body = hovering_body();
        let mut ctrl = controller(&body);
        ctrl.update(&mut body, 0.0);
        assert_eq!(body.base().accumulated_force(), Vector3::zeros());
    }

    #[test]
    fn surface_mode_measures_above_surface() {
        use crate::gnc::FlatSurface;
        let body = hovering_body(); // z = 5
        let mut ctrl = AltitudeController::new(AltitudeConfig::default(), &body)
            .with_surface_query(Box::new(FlatSurface(3.0)));
        ctrl.mode = AltitudeControlMode::AltitudeAboveSurface;
        assert_relative_eq!(ctrl.altitude_of(&body), 2.0);
    }
}
