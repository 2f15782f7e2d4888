pub mod propeller;
pub mod quad;
pub mod surface;

pub use propeller::Propeller;
pub use quad::QuadController;
pub use surface::SurfaceCraftController;

/// Phase of a takeoff/landing cycle. Transitions are monotonic within one
/// cycle and gated by the control-authority flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Idle,
    TakingOff,
    Flying,
    Landing,
}

impl FlightState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightState::Idle => "idle",
            FlightState::TakingOff => "taking_off",
            FlightState::Flying => "flying",
            FlightState::Landing => "landing",
        }
    }
}
