use nalgebra::Vector3;

use drone_ctl::io::{csv, json};
use drone_ctl::sim::{run_mission, Command, MissionScript};
use drone_ctl::types::{FlightState, FreeBody, MixedBody, QuadConfig, QuadController, SimConfig};

fn main() {
    env_logger::init();

    // -----------------------------------------------------------------------
    // Vehicle: stock quadrotor, 2 kg, sitting on the ground
    // -----------------------------------------------------------------------
    let config = QuadConfig::default();
    let body = MixedBody::Free(
        FreeBody::new(2.0, Vector3::zeros()).with_damping(0.2, 0.5),
    );
    let mut quad = QuadController::new(body, config.clone());

    // -----------------------------------------------------------------------
    // Mission: take off, fly a leg, turn, come home vertically
    // -----------------------------------------------------------------------
    let script = MissionScript::new()
        .at(0.5, Command::TakeOff)
        .at(4.0, Command::BodyVelocity { forward: 1.5, left: 0.0, up: 0.0, yaw_rate: 0.0 })
        .at(8.0, Command::Heading(90.0))
        .at(12.0, Command::BodyVelocity { forward: 0.0, left: 0.0, up: 0.0, yaw_rate: 0.0 })
        .at(14.0, Command::Land);

    let sim = SimConfig {
        duration: 25.0,
        ..SimConfig::default()
    };

    // -----------------------------------------------------------------------
    // Run the closed loop
    // -----------------------------------------------------------------------
    let telemetry = run_mission(&mut quad, script, &sim);
    let summary = json::FlightSummary::from_telemetry(&telemetry);

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  QUADROTOR FLIGHT SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.1} kg    Propellers:   {:>8}",
        quad.body().total_connected_mass(),
        quad.propellers().len()
    );
    println!(
        "  Float RPM:     {:>8.0}       Takeoff alt:  {:>8.1} m",
        config.float_rpm, config.takeoff_altitude
    );
    println!(
        "  Ascent rate:   {:>8.1} m/s   Descent rate: {:>8.1} m/s",
        config.altitude.ascent_rate, config.altitude.descent_rate
    );
    println!(
        "  Max speed:     {:>8.1} m/s   Max tilt:     {:>8.1} deg",
        config.horizontal.max_speed, config.attitude.max_tilt_angle
    );
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    for pair in telemetry.windows(2) {
        if pair[0].flight_state != pair[1].flight_state {
            let s = &pair[1];
            println!(
                "  {:>10}  t={:>6.2}s   alt={:>6.2}m   vel={:>6.2}m/s   hdg={:>6.1}°",
                s.flight_state.as_str().to_uppercase(),
                s.time,
                s.pos.z,
                s.vel.norm(),
                s.heading_deg,
            );
        }
    }
    println!();

    println!("  Performance Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Max altitude:  {:>8.2} m   (t={:.1} s)",
        summary.max_altitude_m, summary.max_altitude_time_s
    );
    println!("  Max speed:     {:>8.2} m/s", summary.max_speed_ms);
    println!("  Max tilt:      {:>8.1} deg", summary.max_tilt_deg);
    println!("  Distance:      {:>8.1} m", summary.distance_travelled_m);
    println!("  Touchdown:     {:>8.2} m/s", summary.touchdown_speed_ms);
    println!(
        "  Final state:   {:>8}   (alt {:.2} m after {:.1} s)",
        summary.final_state, summary.final_altitude_m, summary.flight_time_s
    );
    println!();

    // -----------------------------------------------------------------------
    // Telemetry table (sampled)
    // -----------------------------------------------------------------------
    println!("  Telemetry");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>9}  {:>8}  {:>9}  {:>10}",
        "t (s)", "alt (m)", "vel (m/s)", "hdg (°)", "rpm", "state"
    );
    println!("  {}", "─".repeat(62));

    let sample_interval = (telemetry.len() / 25).max(1);
    for (i, s) in telemetry.iter().enumerate() {
        if i % sample_interval != 0 && i != telemetry.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>8.2}  {:>9.2}  {:>8.1}  {:>9.0}  {:>10}",
            s.time,
            s.pos.z,
            s.vel.norm(),
            s.heading_deg,
            s.mean_rpm,
            s.flight_state.as_str()
        );
    }
    println!();

    if quad.flight_state() != FlightState::Idle {
        eprintln!("  warning: mission ended without returning to idle");
    }

    // -----------------------------------------------------------------------
    // Write artifacts
    // -----------------------------------------------------------------------
    if let Err(e) = csv::write_telemetry_file("telemetry.csv", &telemetry) {
        eprintln!("  failed to write telemetry.csv: {e}");
    } else {
        println!("  Wrote telemetry.csv ({} rows)", telemetry.len());
    }
    if let Err(e) = json::write_summary_file("summary.json", &summary) {
        eprintln!("  failed to write summary.json: {e}");
    } else {
        println!("  Wrote summary.json");
    }

    println!();
    println!("  Simulation: {} steps, dt={} s", telemetry.len() - 1, sim.dt);
    println!("====================================================================");
    println!();
}
