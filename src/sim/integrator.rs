use nalgebra::UnitQuaternion;

use crate::body::MixedBody;
use crate::config::SimConfig;

// ---------------------------------------------------------------------------
// Semi-implicit Euler integrator with ground contact
// ---------------------------------------------------------------------------

/// Advance a body by one physics tick: consume the force/torque
/// accumulators, apply gravity and damping, integrate velocity first and
/// position from the updated velocity, then resolve ground contact.
///
/// Controllers that write velocities directly (the attitude loop) still work
/// because the accumulators only add on top of whatever state they set.
pub fn step(body: &mut MixedBody, config: &SimConfig, dt: f64) {
    if dt <= 0.0 {
        return;
    }

    if let MixedBody::Chain(chain) = body {
        chain.advance_joints(dt);
    }

    let base = body.base_mut();

    let mut accel = base.accumulated_force() / base.mass;
    if base.use_gravity {
        accel.z -= config.gravity;
    }
    let alpha = base.accumulated_torque() / base.inertia;

    let mut vel = base.velocity() + accel * dt;
    vel /= 1.0 + base.linear_damping * dt;
    let mut omega = base.angular_velocity() + alpha * dt;
    omega /= 1.0 + base.angular_damping * dt;

    base.state.vel = vel;
    base.state.omega = omega;
    base.state.pos += vel * dt;
    base.state.quat = UnitQuaternion::from_scaled_axis(omega * dt) * base.state.quat;

    // Ground plane: clamp position, kill downward motion.
    if base.state.pos.z < config.ground_level {
        base.state.pos.z = config.ground_level;
        if base.state.vel.z < 0.0 {
            base.state.vel.z = 0.0;
        }
    }

    base.clear_accumulators();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::FreeBody;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn config() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn free_body_falls_under_gravity() {
        let mut body = MixedBody::Free(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 10.0)));
        let config = config();
        for _ in 0..50 {
            step(&mut body, &config, config.dt);
        }
        // One second of free fall: v = -g t, z = 10 - g t^2 / 2 (roughly).
        assert_relative_eq!(body.velocity().z, -9.81, epsilon = 1e-9);
        assert!(body.position().z < 10.0 - 4.5 && body.position().z > 10.0 - 5.5);
    }

    #[test]
    fn hover_force_cancels_gravity() {
        let mut body = MixedBody::Free(FreeBody::new(2.0, Vector3::new(0.0, 0.0, 5.0)));
        let config = config();
        for _ in 0..100 {
            let pos = body.position();
            body.add_force_at_position(Vector3::new(0.0, 0.0, 2.0 * 9.81), pos);
            step(&mut body, &config, config.dt);
        }
        assert_relative_eq!(body.position().z, 5.0, epsilon = 1e-9);
        assert_relative_eq!(body.velocity().z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn ground_plane_stops_the_fall() {
        let mut body = MixedBody::Free(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 0.5)));
        let config = config();
        for _ in 0..200 {
            step(&mut body, &config, config.dt);
        }
        assert_relative_eq!(body.position().z, 0.0, epsilon = 1e-12);
        assert!(body.velocity().z >= 0.0);
    }

    #[test]
    fn accumulators_are_consumed() {
        let mut body = MixedBody::Free(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 5.0)));
        let config = config();
        let pos = body.position();
        body.add_force_at_position(Vector3::new(100.0, 0.0, 0.0), pos);
        step(&mut body, &config, config.dt);
        assert_eq!(body.base().accumulated_force(), Vector3::zeros());

        let vx_after_one = body.velocity().x;
        step(&mut body, &config, config.dt);
        // No new force, so x velocity stays where the first tick put it.
        assert_relative_eq!(body.velocity().x, vx_after_one, epsilon = 1e-12);
    }

    #[test]
    fn angular_velocity_rotates_the_body() {
        let mut body = MixedBody::Free(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 5.0)));
        body.set_angular_velocity(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        let config = config();
        for _ in 0..50 {
            step(&mut body, &config, config.dt);
        }
        // Quarter turn about z after one second.
        let fwd = body.orientation() * Vector3::x();
        assert_relative_eq!(fwd.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn damping_bleeds_velocity() {
        let mut free = FreeBody::new(1.0, Vector3::new(0.0, 0.0, 5.0)).with_damping(1.0, 0.0);
        free.use_gravity = false;
        free.set_velocity(Vector3::new(4.0, 0.0, 0.0));
        let mut body = MixedBody::Free(free);
        let config = config();
        for _ in 0..100 {
            step(&mut body, &config, config.dt);
        }
        assert!(body.velocity().x < 2.0, "damping should roughly halve 4 m/s over 2 s");
        assert!(body.velocity().x > 0.0);
    }

    #[test]
    fn chain_joints_advance_with_the_step() {
        use crate::body::{Link, LinkChain};
        let chain = LinkChain::new(FreeBody::new(1.0, Vector3::new(0.0, 0.0, 5.0)))
            .with_link(Link::new("prop", 0.05, Vector3::new(0.2, 0.0, 0.0)));
        let mut body = MixedBody::Chain(chain);
        body.set_drive_target_velocity(0, 100.0).unwrap();
        let config = config();
        step(&mut body, &config, config.dt);
        assert_relative_eq!(body.joint_position(0).unwrap(), 2.0, epsilon = 1e-12);
    }
}
