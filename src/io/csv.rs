use std::io::{self, Write};

use crate::sim::TelemetrySample;

/// Write telemetry to CSV format.
///
/// Columns: time, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z,
///          quat_w, quat_x, quat_y, quat_z, omega_x, omega_y, omega_z,
///          heading_deg, mean_rpm, flight_state
pub fn write_telemetry<W: Write>(writer: &mut W, telemetry: &[TelemetrySample]) -> io::Result<()> {
    writeln!(
        writer,
        "time,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z,\
         quat_w,quat_x,quat_y,quat_z,omega_x,omega_y,omega_z,\
         heading_deg,mean_rpm,flight_state"
    )?;

    for s in telemetry {
        let q = s.quat.quaternion();
        writeln!(
            writer,
            "{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},\
             {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
             {:.2},{:.1},{}",
            s.time,
            s.pos.x, s.pos.y, s.pos.z,
            s.vel.x, s.vel.y, s.vel.z,
            q.w, q.i, q.j, q.k,
            s.omega.x, s.omega.y, s.omega.z,
            s.heading_deg,
            s.mean_rpm,
            s.flight_state.as_str(),
        )?;
    }

    Ok(())
}

/// Write telemetry to a CSV file at the given path.
pub fn write_telemetry_file(path: &str, telemetry: &[TelemetrySample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_telemetry(&mut file, telemetry)
}
