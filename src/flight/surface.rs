use log::info;
use nalgebra::Vector3;

use crate::body::MixedBody;
use crate::config::SurfaceCraftConfig;
use crate::gnc::{
    AltitudeControlMode, AltitudeController, AttitudeController, HorizontalControlMode,
    HorizontalController, SurfaceQuery, TiltMode, YawControlMode,
};

// ---------------------------------------------------------------------------
// Surface craft: foiling boat riding a height above the water
// ---------------------------------------------------------------------------

/// Controller for a foiling surface craft. Reuses the same three axis
/// controllers as the quadrotor but rides a commanded height above an
/// injected surface instead of an absolute altitude, and takes planar
/// speed/yaw-rate commands clamped to the craft's limits.
pub struct SurfaceCraftController {
    body: MixedBody,
    pub altitude: AltitudeController,
    pub attitude: AttitudeController,
    pub horizontal: HorizontalController,
    max_speed: f64,
    max_yaw_rate: f64,
    max_altitude: f64,
}

impl SurfaceCraftController {
    pub fn new(
        body: MixedBody,
        config: SurfaceCraftConfig,
        surface: Box<dyn SurfaceQuery>,
    ) -> Self {
        let mut altitude =
            AltitudeController::new(config.altitude, &body).with_surface_query(surface);
        altitude.mode = AltitudeControlMode::AltitudeAboveSurface;
        altitude.target_altitude = 0.0;

        let mut attitude = AttitudeController::new(config.attitude);
        attitude.yaw_mode = YawControlMode::YawRate;
        attitude.tilt_mode = TiltMode::ReactToAcceleration;

        let mut horizontal = HorizontalController::new(config.horizontal, &body);
        horizontal.mode = HorizontalControlMode::Velocity;

        Self {
            body,
            altitude,
            attitude,
            horizontal,
            max_speed: config.max_speed,
            max_yaw_rate: config.max_yaw_rate,
            max_altitude: config.max_altitude,
        }
    }

    pub fn body(&self) -> &MixedBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut MixedBody {
        &mut self.body
    }

    /// Command a forward speed [m/s], clamped to the craft's limit. Negative
    /// commands are refused; this hull does not reverse.
    pub fn set_speed(&mut self, speed: f64) {
        if speed < 0.0 {
            info!("refusing negative speed command {speed:.2}");
            return;
        }
        let speed = speed.min(self.max_speed);
        self.horizontal.target_velocity = Vector3::new(speed, 0.0, 0.0);
    }

    /// Command a yaw rate [deg/s], clamped to +/- the craft's limit.
    pub fn set_yaw_rate(&mut self, yaw_rate: f64) {
        self.attitude.target_yaw_rate = yaw_rate.clamp(-self.max_yaw_rate, self.max_yaw_rate);
    }

    /// Command a ride height above the surface [m], clamped to [0, max].
    pub fn set_ride_height(&mut self, height: f64) {
        self.altitude.target_altitude = height.clamp(0.0, self.max_altitude);
    }

    pub fn speed(&self) -> f64 {
        self.body.local_velocity().x
    }

    pub fn ride_height(&self) -> f64 {
        self.altitude.altitude_of(&self.body)
    }

    /// Run one fixed-timestep control tick. Skipped when dt <= 0.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.horizontal.update(&mut self.body, dt);
        let horizontal_force = self.horizontal.last_applied_force();
        self.attitude.update(&mut self.body, horizontal_force, dt);
        self.altitude.update(&mut self.body, dt);
    }
}
