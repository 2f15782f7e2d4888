use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// PID controllers (single axis and planar vector)
// ---------------------------------------------------------------------------

/// Single-axis PID controller with integrator clamping, a dead-band tolerance
/// and an optional output clamp.
///
/// Callers are expected to skip the update entirely when dt <= 0; the
/// derivative term guards against division by zero regardless.
#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Clamp for the integral accumulator (always active).
    pub integrator_limit: f64,
    /// Errors smaller than this produce zero output and do not advance
    /// the integrator.
    pub tolerance: f64,
    /// Output clamp; 0 disables clamping.
    pub max_output: f64,
    integrator: f64,
    last_error: f64,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64, integrator_limit: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integrator_limit,
            tolerance: 0.0,
            max_output: 0.0,
            integrator: 0.0,
            last_error: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_output(mut self, max_output: f64) -> Self {
        self.max_output = max_output;
        self
    }

    /// Compute the control output for the given target/current pair.
    pub fn update(&mut self, target: f64, current: f64, dt: f64) -> f64 {
        let error = target - current;
        if error.abs() < self.tolerance {
            return 0.0;
        }

        let p = self.kp * error;

        self.integrator += error * dt;
        self.integrator = self
            .integrator
            .clamp(-self.integrator_limit, self.integrator_limit);
        let i = self.ki * self.integrator;

        let derivative = if dt > 0.0 {
            (error - self.last_error) / dt
        } else {
            0.0
        };
        let d = self.kd * derivative;

        self.last_error = error;

        let output = p + i + d;
        if self.max_output > 0.0 && output.abs() > self.max_output {
            output.signum() * self.max_output
        } else {
            output
        }
    }

    /// Zero the integrator and the stored last error.
    pub fn reset(&mut self) {
        self.integrator = 0.0;
        self.last_error = 0.0;
    }

    #[cfg(test)]
    pub(crate) fn integrator(&self) -> f64 {
        self.integrator
    }
}

/// Vector PID sharing a single set of gains across axes.
///
/// The integrator and derivative act on the error magnitude; their
/// contributions are applied along the current error direction. Below the
/// dead-band tolerance the output is zero and nothing is accumulated.
#[derive(Debug, Clone)]
pub struct VectorPid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integrator_limit: f64,
    pub tolerance: f64,
    pub max_output: f64,
    integrator: f64,
    last_error: f64,
}

impl VectorPid {
    pub fn new(kp: f64, ki: f64, kd: f64, integrator_limit: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integrator_limit,
            tolerance: 0.0,
            max_output: 0.0,
            integrator: 0.0,
            last_error: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_output(mut self, max_output: f64) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn update(&mut self, target: Vector3<f64>, current: Vector3<f64>, dt: f64) -> Vector3<f64> {
        let error = target - current;
        let mag = error.norm();
        if mag < self.tolerance {
            return Vector3::zeros();
        }

        self.integrator += mag * dt;
        self.integrator = self
            .integrator
            .clamp(-self.integrator_limit, self.integrator_limit);

        let derivative = if dt > 0.0 {
            (mag - self.last_error) / dt
        } else {
            0.0
        };
        self.last_error = mag;

        let direction = if mag > 0.0 { error / mag } else { Vector3::zeros() };
        let output = self.kp * error
            + self.ki * self.integrator * direction
            + self.kd * derivative * direction;

        if self.max_output > 0.0 && output.norm() > self.max_output {
            output.normalize() * self.max_output
        } else {
            output
        }
    }

    pub fn reset(&mut self) {
        self.integrator = 0.0;
        self.last_error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pid_proportional() {
        let mut pid = Pid::new(2.0, 0.0, 0.0, 5.0);
        let out = pid.update(1.0, 0.5, 0.01);
        assert_relative_eq!(out, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pid_dead_band_returns_zero() {
        let mut pid = Pid::new(2.0, 1.0, 0.0, 5.0).with_tolerance(0.1);
        for _ in 0..100 {
            assert_eq!(pid.update(1.0, 0.95, 0.01), 0.0);
        }
        // Dead-band must not advance the integrator either.
        assert_eq!(pid.integrator(), 0.0);
    }

    #[test]
    fn pid_zero_error_zero_output() {
        let mut pid = Pid::new(5.0, 1.0, 1.0, 5.0);
        let out = pid.update(3.0, 3.0, 0.02);
        assert_relative_eq!(out, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pid_integrator_stays_clamped() {
        let mut pid = Pid::new(0.0, 1.0, 0.0, 2.0);
        for _ in 0..10_000 {
            pid.update(100.0, 0.0, 0.1);
            assert!(pid.integrator().abs() <= 2.0 + 1e-12);
        }
    }

    #[test]
    fn pid_output_clamped() {
        let mut pid = Pid::new(1000.0, 0.0, 0.0, 5.0).with_max_output(3.0);
        for step in 0..50 {
            let out = pid.update(10.0, step as f64 * 0.1, 0.01);
            assert!(out.abs() <= 3.0);
        }
    }

    #[test]
    fn pid_reset_clears_state() {
        let mut pid = Pid::new(1.0, 1.0, 1.0, 5.0);
        pid.update(1.0, 0.0, 0.1);
        pid.reset();
        assert_eq!(pid.integrator(), 0.0);
        // After reset, a pure-P configuration behaves like a fresh controller.
        let out = pid.update(1.0, 1.0, 0.1);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn vector_pid_points_toward_target() {
        let mut pid = VectorPid::new(2.0, 0.0, 0.0, 5.0);
        let out = pid.update(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros(), 0.01);
        assert!(out.x > 0.0);
        assert_relative_eq!(out.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(out.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn vector_pid_dead_band() {
        let mut pid = VectorPid::new(2.0, 1.0, 0.0, 5.0).with_tolerance(0.5);
        let out = pid.update(Vector3::new(0.1, 0.1, 0.0), Vector3::zeros(), 0.01);
        assert_eq!(out, Vector3::zeros());
    }

    #[test]
    fn vector_pid_output_magnitude_clamped() {
        let mut pid = VectorPid::new(100.0, 0.0, 0.0, 5.0).with_max_output(4.0);
        let out = pid.update(Vector3::new(10.0, -10.0, 0.0), Vector3::zeros(), 0.01);
        assert!(out.norm() <= 4.0 + 1e-9);
    }
}
