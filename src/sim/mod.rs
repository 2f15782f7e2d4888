pub mod integrator;
pub mod mission;
pub mod runner;

pub use integrator::step;
pub use mission::{Command, MissionScript, TimedCommand};
pub use runner::{run_mission, TelemetrySample};
