use log::debug;
use nalgebra::{UnitQuaternion, Vector3};

use crate::body::MixedBody;
use crate::config::AttitudeConfig;

// ---------------------------------------------------------------------------
// Attitude controller: tilt alignment + yaw, via angular velocity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YawControlMode {
    /// Hold a compass heading, turning the short way around.
    CompassHeading,
    /// Track a commanded yaw rate.
    YawRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltMode {
    /// Align the body up axis with an externally set target up vector.
    TargetUp,
    /// Derive the target up from the horizontal controller's applied force,
    /// faking the lean a real multirotor uses to generate lateral thrust.
    ReactToAcceleration,
}

/// Yaw suspension threshold: below this up-dot the vehicle only uprights.
const UP_DOT_LIMIT: f64 = 0.5;

/// Shortest signed angle from `current` to `target`, degrees, in (-180, 180].
pub fn delta_angle(current: f64, target: f64) -> f64 {
    let mut diff = (target - current) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    }
    if diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

/// Yaw of the body in degrees: angle of the projected forward axis in the
/// world x/y plane.
pub fn heading_deg(body: &MixedBody) -> f64 {
    let fwd = body.orientation() * Vector3::x();
    fwd.y.atan2(fwd.x).to_degrees()
}

/// Controls tilt (align body up with a target up) and yaw, by writing the
/// body's angular velocity directly. Yaw authority is suspended while the
/// vehicle is tilted past [`UP_DOT_LIMIT`]; only the uprighting correction
/// is applied then.
#[derive(Debug)]
pub struct AttitudeController {
    pub enabled: bool,
    pub yaw_mode: YawControlMode,
    pub tilt_mode: TiltMode,
    /// Commanded yaw rate [deg/s]; overwritten each tick in heading mode.
    pub target_yaw_rate: f64,
    /// Commanded heading [deg].
    pub target_heading: f64,
    pub target_up: Vector3<f64>,
    pub yaw_tolerance: f64,
    pub desired_yaw_rate: f64,
    pub tilt_kp: f64,
    pub max_tilt_angle: f64,
    pub expected_max_accel: f64,
}

impl AttitudeController {
    pub fn new(config: AttitudeConfig) -> Self {
        Self {
            enabled: true,
            yaw_mode: YawControlMode::YawRate,
            tilt_mode: TiltMode::TargetUp,
            target_yaw_rate: 0.0,
            target_heading: 0.0,
            target_up: Vector3::z(),
            yaw_tolerance: config.yaw_tolerance,
            desired_yaw_rate: config.desired_yaw_rate,
            tilt_kp: config.tilt_kp,
            max_tilt_angle: config.max_tilt_angle,
            expected_max_accel: config.expected_max_accel,
        }
    }

    /// Run one control tick. `horizontal_force` is the planar force the
    /// horizontal controller applied this tick (world frame), used by the
    /// reactive tilt mode. Skipped when disabled or dt <= 0.
    pub fn update(&mut self, body: &mut MixedBody, horizontal_force: Vector3<f64>, dt: f64) {
        if !self.enabled || dt <= 0.0 {
            return;
        }

        let up_dot = body.up().dot(&Vector3::z());

        if self.tilt_mode == TiltMode::ReactToAcceleration && up_dot >= UP_DOT_LIMIT {
            self.target_up = self.reactive_target_up(horizontal_force);
        }

        // Too tilted: forget everything else and upright first.
        if up_dot < UP_DOT_LIMIT {
            self.target_up = Vector3::z();
        }

        let mut ang_vel = self.tilt_control(body);

        if up_dot < UP_DOT_LIMIT {
            debug!("too tilted for yaw control, up_dot {up_dot:.2}");
            body.set_angular_velocity(ang_vel);
            return;
        }

        if self.yaw_mode == YawControlMode::CompassHeading {
            let diff = delta_angle(heading_deg(body), self.target_heading);
            if diff.abs() <= self.yaw_tolerance {
                self.target_yaw_rate = 0.0;
            } else {
                self.target_yaw_rate = diff.signum() * self.desired_yaw_rate;
            }
        }

        ang_vel += self.target_yaw_rate.to_radians() * Vector3::z();
        body.set_angular_velocity(ang_vel);
    }

    /// Target up vector leaning into the applied horizontal force.
    fn reactive_target_up(&self, applied_force: Vector3<f64>) -> Vector3<f64> {
        let mut force = applied_force;
        force.z = 0.0; // should already be planar, but make sure
        let mag = force.norm();
        if mag <= 0.05 {
            return Vector3::z();
        }

        let tilt_deg =
            mag.clamp(-self.expected_max_accel, self.expected_max_accel) / self.expected_max_accel
                * self.max_tilt_angle;
        let axis = Vector3::z().cross(&(force / mag));
        match nalgebra::Unit::try_new(axis, 1e-9) {
            Some(axis) => {
                UnitQuaternion::from_axis_angle(&axis, tilt_deg.to_radians()) * Vector3::z()
            }
            None => Vector3::z(),
        }
    }

    /// Angular velocity rotating the current up vector toward the target up.
    /// Near-parallel vectors produce zero; antiparallel vectors fall back to
    /// a stable perpendicular axis so the correction never stalls.
    fn tilt_control(&self, body: &MixedBody) -> Vector3<f64> {
        let current_up = body.up();
        let target_up = self.target_up.normalize();
        let mut axis = current_up.cross(&target_up);

        if axis.norm_squared() < 1e-12 {
            if current_up.dot(&target_up) > 0.0 {
                // Already aligned (or numerically very close).
                return Vector3::zeros();
            }
            // Opposite direction (180 deg): pick a stable perpendicular axis.
            axis = current_up.cross(&(body.orientation() * Vector3::x()));
            if axis.norm_squared() < 1e-12 {
                axis = current_up.cross(&(body.orientation() * Vector3::y()));
            }
        }

        let axis_mag = axis.norm();
        if axis_mag < 1e-9 {
            return Vector3::zeros();
        }
        let corrective_axis = axis / axis_mag;

        let dot = current_up.dot(&target_up).clamp(-1.0, 1.0);
        let error_rad = dot.acos();
        self.tilt_kp * error_rad * corrective_axis
    }
}
