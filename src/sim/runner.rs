use nalgebra::{UnitQuaternion, Vector3};

use super::integrator;
use super::mission::{Command, MissionScript};
use crate::config::SimConfig;
use crate::flight::{FlightState, QuadController};
use crate::gnc::attitude::heading_deg;

// ---------------------------------------------------------------------------
// Closed-loop mission runner
// ---------------------------------------------------------------------------

/// One telemetry row recorded per physics tick.
#[derive(Debug, Clone)]
pub struct TelemetrySample {
    pub time: f64,
    pub pos: Vector3<f64>,
    pub vel: Vector3<f64>,
    pub quat: UnitQuaternion<f64>,
    pub omega: Vector3<f64>,
    pub heading_deg: f64,
    pub flight_state: FlightState,
    pub mean_rpm: f64,
}

fn sample(quad: &QuadController, time: f64) -> TelemetrySample {
    let body = quad.body();
    let props = quad.propellers();
    let mean_rpm = if props.is_empty() {
        0.0
    } else {
        props.iter().map(|p| p.rpm()).sum::<f64>() / props.len() as f64
    };
    TelemetrySample {
        time,
        pos: body.position(),
        vel: body.velocity(),
        quat: body.orientation(),
        omega: body.angular_velocity(),
        heading_deg: heading_deg(body),
        flight_state: quad.flight_state(),
        mean_rpm,
    }
}

fn apply(quad: &mut QuadController, command: &Command) {
    // Refusals log their reason inside the controller.
    match command {
        Command::TakeOff => {
            quad.take_off();
        }
        Command::Land => {
            quad.land();
        }
        Command::TakeControl => {
            quad.take_control();
        }
        Command::ReleaseControl => {
            quad.release_control();
        }
        Command::BodyVelocity {
            forward,
            left,
            up,
            yaw_rate,
        } => {
            quad.command_body_velocity(*forward, *left, *up, *yaw_rate);
        }
        Command::Heading(heading) => {
            quad.command_heading(*heading);
        }
    }
}

/// Run a scripted mission: feed due commands to the controller, tick the
/// control loop, integrate the body, record telemetry. Returns one sample
/// per tick plus the initial state.
pub fn run_mission(
    quad: &mut QuadController,
    mut script: MissionScript,
    config: &SimConfig,
) -> Vec<TelemetrySample> {
    let steps = (config.duration / config.dt).ceil() as usize;
    let mut telemetry = Vec::with_capacity(steps + 1);
    telemetry.push(sample(quad, 0.0));

    let mut time = 0.0;
    for _ in 0..steps {
        while let Some(command) = script.pop_due(time) {
            let command = command.clone();
            apply(quad, &command);
        }
        quad.step(config.dt);
        integrator::step(quad.body_mut(), config, config.dt);
        time += config.dt;
        telemetry.push(sample(quad, time));
    }
    telemetry
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
