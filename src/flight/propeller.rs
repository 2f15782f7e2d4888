use nalgebra::Vector3;

use crate::config::PropellerConfig;

// ---------------------------------------------------------------------------
// Propeller: RPM bookkeeping for one rotor
// ---------------------------------------------------------------------------

/// One rotor of the vehicle. Holds RPM state and the hub mount point; the
/// lift itself comes from the axis controllers, so this is bookkeeping for
/// telemetry and joint spinning, not a rotor aerodynamics model.
#[derive(Debug, Clone)]
pub struct Propeller {
    pub name: String,
    /// Hub position in the body frame.
    pub mount: Vector3<f64>,
    pub rpm_max: f64,
    pub rpm_min: f64,
    pub rpm_to_force: f64,
    pub reverse: bool,
    /// Chain link index driven by this propeller, if any.
    pub link: Option<usize>,
    rpm: f64,
}

impl Propeller {
    pub fn from_config(config: &PropellerConfig) -> Self {
        Self {
            name: config.name.clone(),
            mount: config.mount,
            rpm_max: config.rpm_max,
            rpm_min: config.rpm_min,
            rpm_to_force: config.rpm_to_force,
            reverse: config.reverse,
            link: config.link,
            rpm: 0.0,
        }
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    /// Set the rotor speed. Magnitudes below the minimum snap to zero, the
    /// rest clamps to the +/- maximum.
    pub fn set_rpm(&mut self, rpm: f64) {
        let rpm = if rpm.abs() < self.rpm_min { 0.0 } else { rpm };
        self.rpm = rpm.clamp(-self.rpm_max, self.rpm_max);
    }

    /// RPM this propeller needs to carry its share of the vehicle weight.
    pub fn hover_rpm(&self, total_mass: f64, gravity: f64, num_propellers: f64) -> f64 {
        let required_force = total_mass * gravity;
        required_force / num_propellers / self.rpm_to_force
    }

    /// Signed joint drive velocity for the current RPM.
    pub fn drive_velocity(&self) -> f64 {
        if self.reverse {
            -self.rpm
        } else {
            self.rpm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prop() -> Propeller {
        let mut config = PropellerConfig::new("test", Vector3::zeros());
        config.rpm_min = 50.0;
        config.rpm_max = 2000.0;
        Propeller::from_config(&config)
    }

    #[test]
    fn rpm_below_minimum_snaps_to_zero() {
        let mut p = prop();
        p.set_rpm(20.0);
        assert_eq!(p.rpm(), 0.0);
        p.set_rpm(-20.0);
        assert_eq!(p.rpm(), 0.0);
    }

    #[test]
    fn rpm_clamps_to_maximum() {
        let mut p = prop();
        p.set_rpm(1e6);
        assert_eq!(p.rpm(), 2000.0);
        p.set_rpm(-1e6);
        assert_eq!(p.rpm(), -2000.0);
    }

    #[test]
    fn hover_rpm_carries_the_weight() {
        let p = prop();
        let rpm = p.hover_rpm(2.0, 9.81, 4.0);
        // force per prop = rpm * rpm_to_force
        assert_relative_eq!(rpm * p.rpm_to_force * 4.0, 2.0 * 9.81, epsilon = 1e-9);
    }

    #[test]
    fn reverse_flips_drive_velocity() {
        let mut p = prop();
        p.reverse = true;
        p.set_rpm(100.0);
        assert_eq!(p.drive_velocity(), -100.0);
    }
}
