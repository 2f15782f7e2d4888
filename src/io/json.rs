use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::flight::FlightState;
use crate::sim::TelemetrySample;

/// Summary statistics computed from a flight's telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSummary {
    pub max_altitude_m: f64,
    pub max_altitude_time_s: f64,
    pub max_speed_ms: f64,
    pub max_tilt_deg: f64,
    pub distance_travelled_m: f64,
    pub flight_time_s: f64,
    pub final_altitude_m: f64,
    pub final_state: String,
    pub touchdown_speed_ms: f64,
}

impl FlightSummary {
    /// Compute summary from telemetry. Empty telemetry yields all zeros.
    pub fn from_telemetry(telemetry: &[TelemetrySample]) -> Self {
        let Some(last) = telemetry.last() else {
            return Self::empty();
        };

        let top = telemetry
            .iter()
            .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))
            .unwrap_or(last);

        let max_speed = telemetry
            .iter()
            .map(|s| s.vel.norm())
            .fold(0.0_f64, f64::max);

        let max_tilt = telemetry
            .iter()
            .map(|s| {
                let up = s.quat * nalgebra::Vector3::z();
                up.z.clamp(-1.0, 1.0).acos().to_degrees()
            })
            .fold(0.0_f64, f64::max);

        let distance = telemetry
            .windows(2)
            .map(|w| (w[1].pos - w[0].pos).norm())
            .sum();

        // Speed at the last touch of the ground, if the flight ended there.
        let touchdown_speed = telemetry
            .iter()
            .rev()
            .find(|s| s.flight_state == FlightState::Landing)
            .map_or(0.0, |s| s.vel.norm());

        FlightSummary {
            max_altitude_m: top.pos.z,
            max_altitude_time_s: top.time,
            max_speed_ms: max_speed,
            max_tilt_deg: max_tilt,
            distance_travelled_m: distance,
            flight_time_s: last.time,
            final_altitude_m: last.pos.z,
            final_state: last.flight_state.as_str().to_owned(),
            touchdown_speed_ms: touchdown_speed,
        }
    }

    fn empty() -> Self {
        FlightSummary {
            max_altitude_m: 0.0,
            max_altitude_time_s: 0.0,
            max_speed_ms: 0.0,
            max_tilt_deg: 0.0,
            distance_travelled_m: 0.0,
            flight_time_s: 0.0,
            final_altitude_m: 0.0,
            final_state: FlightState::Idle.as_str().to_owned(),
            touchdown_speed_ms: 0.0,
        }
    }
}

/// Write a flight summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a flight summary JSON to a file.
pub fn write_summary_file(path: &str, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
