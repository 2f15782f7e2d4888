pub mod body;
pub mod config;
pub mod flight;
pub mod gnc;
pub mod io;
pub mod sim;

// Convenience re-exports for the common surface of the crate.
pub mod types {
    pub use crate::body::{BodyError, BodyState, FreeBody, Link, LinkChain, MixedBody};
    pub use crate::config::{
        AltitudeConfig, AttitudeConfig, HorizontalConfig, LandingMode, PidConfig,
        PropellerConfig, QuadConfig, SimConfig, SurfaceCraftConfig,
    };
    pub use crate::flight::{FlightState, Propeller, QuadController, SurfaceCraftController};
    pub use crate::gnc::{
        AltitudeControlMode, AltitudeController, AttitudeController, FlatSurface,
        HorizontalControlMode, HorizontalController, SurfaceQuery, TiltMode, YawControlMode,
    };
    pub use crate::sim::{Command, MissionScript, TelemetrySample};
}
