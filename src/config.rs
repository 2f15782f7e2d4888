use std::io;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gnc::pid::{Pid, VectorPid};

// ---------------------------------------------------------------------------
// Tuning configuration for the control stack
// ---------------------------------------------------------------------------

/// Gains for one PID loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Integral accumulator clamp.
    pub integrator_limit: f64,
    /// Dead-band; errors below this produce no output.
    pub tolerance: f64,
    /// Output clamp; 0 disables clamping.
    pub max_output: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 5.0,
            ki: 0.0,
            kd: 0.0,
            integrator_limit: 5.0,
            tolerance: 0.0,
            max_output: 0.0,
        }
    }
}

impl PidConfig {
    pub fn to_pid(&self) -> Pid {
        Pid::new(self.kp, self.ki, self.kd, self.integrator_limit)
            .with_tolerance(self.tolerance)
            .with_max_output(self.max_output)
    }

    pub fn to_vector_pid(&self) -> VectorPid {
        VectorPid::new(self.kp, self.ki, self.kd, self.integrator_limit)
            .with_tolerance(self.tolerance)
            .with_max_output(self.max_output)
    }
}

/// Vertical-axis controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltitudeConfig {
    /// Maximum climb rate [m/s].
    pub ascent_rate: f64,
    /// Maximum descent rate [m/s], positive.
    pub descent_rate: f64,
    /// Vertical force cap [N]; 0 disables capping.
    pub max_force: f64,
    pub altitude_tolerance: f64,
    /// Reference height subtracted from world z in absolute-altitude mode.
    pub ground_level: f64,
    /// Add lift equal to total weight so the vehicle floats by default.
    pub compensate_gravity: bool,
    /// Additional masses [kg] included in the gravity-compensation term.
    pub extra_masses: Vec<f64>,
    /// Gravity magnitude [m/s²] used for compensation.
    pub gravity: f64,
    pub vel_pid: PidConfig,
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            ascent_rate: 2.0,
            descent_rate: 2.0,
            max_force: 0.0,
            altitude_tolerance: 0.1,
            ground_level: 0.0,
            compensate_gravity: true,
            extra_masses: Vec::new(),
            gravity: 9.81,
            vel_pid: PidConfig::default(),
        }
    }
}

/// Yaw and tilt controller tuning. Angles in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttitudeConfig {
    pub yaw_tolerance: f64,
    /// Yaw rate used to close a heading error [deg/s].
    pub desired_yaw_rate: f64,
    pub tilt_kp: f64,
    /// Tilt commanded at the expected maximum horizontal force [deg].
    pub max_tilt_angle: f64,
    /// Horizontal force magnitude mapped to full tilt.
    pub expected_max_accel: f64,
}

impl Default for AttitudeConfig {
    fn default() -> Self {
        Self {
            yaw_tolerance: 2.0,
            desired_yaw_rate: 10.0,
            tilt_kp: 1.5,
            max_tilt_angle: 20.0,
            expected_max_accel: 10.0,
        }
    }
}

/// Planar controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizontalConfig {
    /// Horizontal force cap [N]; 0 disables capping.
    pub max_force: f64,
    pub max_speed: f64,
    pub position_tolerance: f64,
    pub vel_pid: PidConfig,
}

impl Default for HorizontalConfig {
    fn default() -> Self {
        Self {
            max_force: 0.0,
            max_speed: 5.0,
            position_tolerance: 0.5,
            vel_pid: PidConfig::default(),
        }
    }
}

/// One propeller of the vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropellerConfig {
    pub name: String,
    /// Hub position in the body frame.
    pub mount: Vector3<f64>,
    pub rpm_max: f64,
    /// RPM magnitudes below this snap to zero.
    pub rpm_min: f64,
    pub rpm_to_force: f64,
    pub reverse: bool,
    /// Chain link index driven by this propeller, if the body is a chain.
    pub link: Option<usize>,
}

impl PropellerConfig {
    pub fn new(name: impl Into<String>, mount: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            mount,
            rpm_max: 100_000.0,
            rpm_min: 0.0,
            rpm_to_force: 0.005,
            reverse: false,
            link: None,
        }
    }
}

/// How the landing phase decides it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingMode {
    /// Descend at the configured rate until vertical motion has stopped for
    /// a debounce interval.
    DescentRate,
    /// Track absolute altitude back to the takeoff point.
    ReturnToHome,
}

/// Full quadrotor controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadConfig {
    /// Baseline hover RPM commanded while ignited.
    pub float_rpm: f64,
    /// Height above the takeoff point targeted by take_off() [m].
    pub takeoff_altitude: f64,
    /// Begin already flying, holding the initial altitude.
    pub start_in_air: bool,
    pub landing_mode: LandingMode,
    pub altitude: AltitudeConfig,
    pub attitude: AttitudeConfig,
    pub horizontal: HorizontalConfig,
    pub propellers: Vec<PropellerConfig>,
}

impl Default for QuadConfig {
    fn default() -> Self {
        let arm = 0.2;
        let h = 0.05;
        Self {
            float_rpm: 1000.0,
            takeoff_altitude: 1.5,
            start_in_air: false,
            landing_mode: LandingMode::DescentRate,
            altitude: AltitudeConfig::default(),
            attitude: AttitudeConfig::default(),
            horizontal: HorizontalConfig::default(),
            propellers: vec![
                PropellerConfig::new("front_left", Vector3::new(arm, arm, h)),
                PropellerConfig::new("front_right", Vector3::new(arm, -arm, h)),
                PropellerConfig::new("back_left", Vector3::new(-arm, arm, h)),
                PropellerConfig::new("back_right", Vector3::new(-arm, -arm, h)),
            ],
        }
    }
}

/// Surface-craft (hydrofoil) controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceCraftConfig {
    pub max_speed: f64,
    /// Maximum commanded yaw rate [deg/s].
    pub max_yaw_rate: f64,
    /// Maximum ride height above the surface [m].
    pub max_altitude: f64,
    pub altitude: AltitudeConfig,
    pub attitude: AttitudeConfig,
    pub horizontal: HorizontalConfig,
}

impl Default for SurfaceCraftConfig {
    fn default() -> Self {
        Self {
            max_speed: 7.0,
            max_yaw_rate: 5.0,
            max_altitude: 2.0,
            altitude: AltitudeConfig::default(),
            attitude: AttitudeConfig::default(),
            horizontal: HorizontalConfig {
                max_speed: 7.0,
                ..HorizontalConfig::default()
            },
        }
    }
}

/// Fixed-timestep simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Physics timestep [s].
    pub dt: f64,
    /// Total simulated time [s].
    pub duration: f64,
    /// Gravity magnitude [m/s²], applied along -z.
    pub gravity: f64,
    /// World z of the ground plane.
    pub ground_level: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02, // 50 Hz physics tick
            duration: 30.0,
            gravity: 9.81,
            ground_level: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loading
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl QuadConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
