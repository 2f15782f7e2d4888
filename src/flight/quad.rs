use log::{info, warn};
use nalgebra::Vector3;

use super::propeller::Propeller;
use super::FlightState;
use crate::body::MixedBody;
use crate::config::{LandingMode, QuadConfig};
use crate::gnc::{
    AltitudeControlMode, AltitudeController, AttitudeController, HorizontalControlMode,
    HorizontalController, TiltMode, YawControlMode,
};

// ---------------------------------------------------------------------------
// Quadrotor flight state machine
// ---------------------------------------------------------------------------

/// Vertical speed below which the vehicle counts as stopped while landing.
const LANDED_SPEED: f64 = 0.2;
/// How long the vehicle must stay stopped before landing completes.
const LANDED_DEBOUNCE: f64 = 1.0;
/// Reference hub speed for the per-propeller RPM heuristic.
const PROP_REF_SPEED: f64 = 5.0;

/// Yaw setpoint commanded from outside.
#[derive(Debug, Clone, Copy)]
enum YawSetpoint {
    Rate(f64),
    Heading(f64),
}

/// Composes the three axis controllers into the Idle → TakingOff → Flying →
/// Landing cycle and arbitrates control authority.
///
/// Per-tick ordering: the state machine writes all controller setpoints
/// first, then the controllers run horizontal → attitude → altitude, so the
/// reactive tilt sees the horizontal force applied in the same tick.
pub struct QuadController {
    body: MixedBody,
    pub altitude: AltitudeController,
    pub attitude: AttitudeController,
    pub horizontal: HorizontalController,
    propellers: Vec<Propeller>,
    flight_state: FlightState,
    got_control: bool,
    ignited: bool,
    float_rpm: f64,
    takeoff_altitude: f64,
    landing_mode: LandingMode,
    /// Altitude at which the vehicle last took off.
    home_altitude: f64,
    /// Body-frame FLU velocity command.
    commanded_velocity: Vector3<f64>,
    commanded_yaw: YawSetpoint,
    stopped_for: f64,
}

impl QuadController {
    pub fn new(body: MixedBody, config: QuadConfig) -> Self {
        let mut altitude = AltitudeController::new(config.altitude, &body);
        altitude.mode = AltitudeControlMode::VerticalVelocity;
        altitude.target_velocity = 0.0;

        let mut attitude = AttitudeController::new(config.attitude);
        attitude.yaw_mode = YawControlMode::YawRate;
        attitude.target_yaw_rate = 0.0;
        attitude.tilt_mode = TiltMode::ReactToAcceleration;

        let mut horizontal = HorizontalController::new(config.horizontal, &body);
        horizontal.mode = HorizontalControlMode::Velocity;

        let propellers = config
            .propellers
            .iter()
            .map(Propeller::from_config)
            .collect();

        let home_altitude = body.position().z;
        let mut ctrl = Self {
            body,
            altitude,
            attitude,
            horizontal,
            propellers,
            flight_state: FlightState::Idle,
            got_control: true,
            ignited: false,
            float_rpm: config.float_rpm,
            takeoff_altitude: config.takeoff_altitude,
            landing_mode: config.landing_mode,
            home_altitude,
            commanded_velocity: Vector3::zeros(),
            commanded_yaw: YawSetpoint::Rate(0.0),
            stopped_for: 0.0,
        };

        ctrl.ignition(config.start_in_air);
        if config.start_in_air {
            ctrl.flight_state = FlightState::Flying;
            ctrl.altitude.mode = AltitudeControlMode::AbsoluteAltitude;
            ctrl.altitude.target_altitude = home_altitude;
        }
        ctrl
    }

    pub fn body(&self) -> &MixedBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut MixedBody {
        &mut self.body
    }

    pub fn flight_state(&self) -> FlightState {
        self.flight_state
    }

    pub fn got_control(&self) -> bool {
        self.got_control
    }

    pub fn propellers(&self) -> &[Propeller] {
        &self.propellers
    }

    /// Run one fixed-timestep control tick. Skipped when dt <= 0.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        self.rpms_from_motion();

        if self.got_control {
            self.update_state_machine(dt);
        }

        // Horizontal first: the reactive tilt wants this tick's force.
        self.horizontal.update(&mut self.body, dt);
        let horizontal_force = self.horizontal.last_applied_force();
        self.attitude.update(&mut self.body, horizontal_force, dt);
        self.altitude.update(&mut self.body, dt);
    }

    fn update_state_machine(&mut self, dt: f64) {
        match self.flight_state {
            FlightState::TakingOff => {
                self.altitude.mode = AltitudeControlMode::AbsoluteAltitude;
                self.altitude.target_altitude = self.home_altitude + self.takeoff_altitude;
                let reached = self.body.position().z
                    >= self.altitude.target_altitude - self.altitude.altitude_tolerance;
                if reached {
                    self.flight_state = FlightState::Flying;
                    info!("takeoff complete, now flying");
                }
            }

            FlightState::Landing => {
                let done = match self.landing_mode {
                    LandingMode::DescentRate => {
                        self.altitude.mode = AltitudeControlMode::VerticalVelocity;
                        self.altitude.target_velocity = -self.altitude.descent_rate;
                        let stopped = self.body.velocity().z.abs() <= LANDED_SPEED;
                        if stopped {
                            self.stopped_for += dt;
                        } else {
                            self.stopped_for = 0.0;
                        }
                        self.stopped_for >= LANDED_DEBOUNCE
                    }
                    LandingMode::ReturnToHome => {
                        self.altitude.mode = AltitudeControlMode::AbsoluteAltitude;
                        self.altitude.target_altitude = self.home_altitude;
                        self.body.position().z
                            <= self.home_altitude + self.altitude.altitude_tolerance
                    }
                };
                if done {
                    self.flight_state = FlightState::Idle;
                    info!("landing complete, now idle");
                    self.ignition(false);
                }
            }

            FlightState::Flying => {
                self.horizontal.mode = HorizontalControlMode::Velocity;
                self.horizontal.target_velocity = self.commanded_velocity;

                self.altitude.mode = AltitudeControlMode::VerticalVelocity;
                self.altitude.target_velocity = self.commanded_velocity.z;

                match self.commanded_yaw {
                    YawSetpoint::Rate(rate) => {
                        self.attitude.yaw_mode = YawControlMode::YawRate;
                        self.attitude.target_yaw_rate = rate;
                    }
                    YawSetpoint::Heading(heading) => {
                        self.attitude.yaw_mode = YawControlMode::CompassHeading;
                        self.attitude.target_heading = heading;
                    }
                }
            }

            FlightState::Idle => {}
        }
    }

    /// Begin the takeoff sequence. Fails unless idle and holding authority.
    pub fn take_off(&mut self) -> bool {
        if !self.got_control {
            info!("cannot take off, no control authority");
            return false;
        }
        if self.flight_state != FlightState::Idle {
            info!("cannot take off, vehicle not idle");
            return false;
        }
        info!("taking off");
        self.flight_state = FlightState::TakingOff;
        self.home_altitude = self.body.position().z;
        self.ignition(true);
        true
    }

    /// Begin the landing sequence. Fails unless flying and holding authority.
    pub fn land(&mut self) -> bool {
        if !self.got_control {
            info!("cannot land, no control authority");
            return false;
        }
        if self.flight_state != FlightState::Flying {
            info!("cannot land, vehicle not flying");
            return false;
        }
        info!("landing");
        self.flight_state = FlightState::Landing;
        self.stopped_for = 0.0;
        true
    }

    pub fn take_control(&mut self) -> bool {
        if self.got_control {
            info!("already have control");
            return true;
        }
        info!("taking control");
        self.got_control = true;
        true
    }

    /// Give up control authority. Commanded setpoints are zeroed in the same
    /// tick so the vehicle stops maneuvering rather than chasing stale
    /// commands.
    pub fn release_control(&mut self) -> bool {
        if !self.got_control {
            info!("no control to release");
            return false;
        }
        info!("releasing control");
        self.got_control = false;
        self.commanded_velocity = Vector3::zeros();
        self.commanded_yaw = YawSetpoint::Rate(0.0);
        self.horizontal.target_velocity = Vector3::zeros();
        self.altitude.mode = AltitudeControlMode::VerticalVelocity;
        self.altitude.target_velocity = 0.0;
        self.attitude.yaw_mode = YawControlMode::YawRate;
        self.attitude.target_yaw_rate = 0.0;
        true
    }

    /// Command a body-frame FLU velocity and yaw rate [deg/s].
    pub fn command_body_velocity(&mut self, forward: f64, left: f64, up: f64, yaw_rate: f64) -> bool {
        if !self.got_control {
            info!("cannot command velocity, no control authority");
            return false;
        }
        self.commanded_velocity = Vector3::new(forward, left, up);
        self.commanded_yaw = YawSetpoint::Rate(yaw_rate);
        true
    }

    /// Command a heading hold [deg] while keeping the current velocity
    /// command.
    pub fn command_heading(&mut self, heading: f64) -> bool {
        if !self.got_control {
            info!("cannot command heading, no control authority");
            return false;
        }
        self.commanded_yaw = YawSetpoint::Heading(heading);
        true
    }

    fn ignition(&mut self, on: bool) {
        if !self.got_control {
            info!("cannot change ignition state, no control authority");
            return;
        }
        self.ignited = on;
        let rpm = if on { self.float_rpm } else { 0.0 };
        for prop in &mut self.propellers {
            prop.set_rpm(rpm);
        }
        self.apply_drive_velocities();
        self.altitude.enabled = on;
        self.altitude.compensate_gravity = on;
        self.attitude.enabled = on;
        self.horizontal.enabled = on;
    }

    /// Recompute per-propeller RPM from the vehicle's tilt and each hub's
    /// vertical speed. A scaling heuristic for telemetry realism, not a
    /// rotor model.
    fn rpms_from_motion(&mut self) {
        if !self.ignited {
            return;
        }

        let up_dot = self.body.up().dot(&Vector3::z()).clamp(-1.0, 1.0);
        let tilt_deg = up_dot.acos().to_degrees();
        // More tilt means every prop works harder: scales 1.0 to 1.5.
        let tilt_factor = 1.0 + (tilt_deg / 90.0) * 0.5;

        let vel = self.body.velocity();
        let omega = self.body.angular_velocity();
        let rot = self.body.orientation();

        for prop in &mut self.propellers {
            let hub_offset = rot * prop.mount;
            let hub_velocity = vel + omega.cross(&hub_offset);
            // A hub moving up needs more RPM, one moving down needs less.
            let speed_factor = 1.0 + hub_velocity.z / PROP_REF_SPEED;
            prop.set_rpm(self.float_rpm * tilt_factor * speed_factor);
        }
        self.apply_drive_velocities();
    }

    /// Spin the propeller joints on chain bodies.
    fn apply_drive_velocities(&mut self) {
        if !matches!(self.body, MixedBody::Chain(_)) {
            return;
        }
        for prop in &self.propellers {
            if let Some(link) = prop.link {
                if let Err(e) = self.body.set_drive_target_velocity(link, prop.drive_velocity()) {
                    warn!("propeller {} cannot drive its joint: {e}", prop.name);
                }
            }
        }
    }
}
